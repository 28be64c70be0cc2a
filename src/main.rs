//! Binary entrypoint for the meshmud CLI.
//!
//! Commands:
//! - `init` - write a starter `config.toml`
//! - `seed` - write the starter area into the world store if it has none
//! - `status` - load the stored world and print a summary
//! - `create-character <name> [--password <pw>]` - add a character in the start room
//!
//! See the library crate docs for module-level details: `meshmud::`.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::info;

use meshmud::config::Config;
use meshmud::world::{World, WorldSettings, WorldStore, WorldStoreBuilder};

#[derive(Parser)]
#[command(name = "meshmud")]
#[command(about = "Live-world state engine for a persistent multiplayer text world")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// Seed the starter area into an empty world store
    Seed,
    /// Show world statistics
    Status,
    /// Create a character in the start room
    CreateCharacter {
        name: String,
        /// Password; prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            init_logging(&None, cli.verbose);
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
        }
        Commands::Seed => {
            let config = load_config(&cli.config, cli.verbose).await?;
            let store = open_store(&config, false)?;
            let written = store.seed_if_needed()?;
            if written == 0 {
                println!("World store already has areas; nothing seeded.");
            } else {
                println!("Seeded {} area(s).", written);
            }
        }
        Commands::Status => {
            let config = load_config(&cli.config, cli.verbose).await?;
            let store = open_store(&config, false)?;
            let world = World::restore(WorldSettings::from_config(&config), &store.load_world()?)?;
            println!("World: {}", world.settings().name);
            println!("Areas: {}", world.area_count());
            for area in world.areas() {
                println!("  {} ({} rooms)", area.name(), area.room_count());
            }
            println!("Characters: {}", world.characters().len());
            println!("Items: {}", world.item_count());
            match world.start_room() {
                Some(room) => println!("Start room: {} at {}", room.title(), world.settings().start),
                None => println!("Start room: missing ({})", world.settings().start),
            }
        }
        Commands::CreateCharacter { name, password } => {
            let password = match password {
                Some(p) => p,
                None => {
                    let first = rpassword::prompt_password("Password: ")?;
                    let second = rpassword::prompt_password("Confirm password: ")?;
                    if first != second {
                        return Err(anyhow!("passwords do not match"));
                    }
                    first
                }
            };
            let config = load_config(&cli.config, cli.verbose).await?;
            if password.len() < 8 {
                return Err(anyhow!("password too short (min 8)"));
            }
            let store = open_store(&config, true)?;
            let world = World::restore(WorldSettings::from_config(&config), &store.load_world()?)?;
            let character = world.create_character(&name, &password)?;
            store.save_world(&world.snapshot())?;
            let place = character
                .room()
                .map(|r| r.title())
                .unwrap_or_else(|| "nowhere".to_string());
            println!("Created {} in {}.", character.name(), place);
        }
    }
    Ok(())
}

/// Load and validate the config, falling back to defaults when the file is
/// missing, then start logging.
async fn load_config(path: &str, verbosity: u8) -> Result<Config> {
    let config = match Config::load(path).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} (using defaults)", e);
            Config::default()
        }
    };
    config.validate()?;
    init_logging(&Some(config.clone()), verbosity);
    Ok(config)
}

fn open_store(config: &Config, seed: bool) -> Result<WorldStore> {
    let mut builder = WorldStoreBuilder::new(config.world.store_path());
    if !seed {
        builder = builder.without_seed();
    }
    Ok(builder.open()?)
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|c| c.logging.level.parse().ok())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|c| c.logging.file.as_ref())
        .and_then(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });
    match log_file {
        Some(f) => {
            let file = std::sync::Mutex::new(f);
            // Echo to the console only when someone is watching it
            let is_tty = atty::is(atty::Stream::Stdout);
            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());
                if let Ok(mut guard) = file.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
        None => {
            builder.format(|fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
            });
        }
    }
    let _ = builder.try_init();
}
