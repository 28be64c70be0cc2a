//! # Meshmud - Live World State Engine
//!
//! Meshmud keeps the live state of a persistent multiplayer text world: areas
//! made of rooms on an integer grid, characters with inventories and equipment,
//! items, the containers that hold them, movement between rooms, and chat
//! channels. Client transports plug in through the
//! [`ClientActions`](world::ClientActions) trait.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use meshmud::config::Config;
//! use meshmud::world::{World, WorldSettings, WorldStoreBuilder};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let store = WorldStoreBuilder::new(config.world.store_path()).open()?;
//!     let world = World::restore(WorldSettings::from_config(&config), &store.load_world()?)?;
//!
//!     let aria = world.create_character("Aria", "correct horse battery")?;
//!     world.walk(&aria, meshmud::world::Direction::North)?;
//!
//!     store.save_world(&world.snapshot())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`world`] - Live objects, containers, movement, channels and persistence
//! - [`config`] - Configuration management and validation
//! - [`logutil`] - Log-safe rendering of user-authored text
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │     World       │ ← Areas, characters, items, movement
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │    Registry     │ ← Object handles and container membership
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │   WorldStore    │ ← Sled snapshots
//! └─────────────────┘
//! ```

pub mod config;
pub mod logutil;
pub mod world;
