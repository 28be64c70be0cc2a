//! # Configuration Management Module
//!
//! Loads and writes the TOML configuration for a meshmud world.
//!
//! ## Configuration Structure
//!
//! - [`WorldConfig`] - World name, data directory, start room and inventory size
//! - [`LoggingConfig`] - Log level and optional log file
//! - [`SecurityConfig`] - Optional Argon2 cost parameters for password hashing
//!
//! ## Usage
//!
//! ```rust,no_run
//! use meshmud::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     config.validate()?;
//!     println!("World: {}", config.world.name);
//!
//!     Config::create_default("config.toml").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [world]
//! name = "Meshmud"
//! data_dir = "./data"
//! start_area = "Homeland"
//! start_coords = { x = 0, y = 0, z = 0 }
//! inventory_capacity = 35
//!
//! [logging]
//! level = "info"
//! file = "meshmud.log"
//! ```
//!
//! Every field has a default, so a partial file (or an empty one) is valid.

use anyhow::{anyhow, Result};
use argon2::Params;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::world::character::DEFAULT_INVENTORY_CAPACITY;
use crate::world::coords::Coords;
use crate::world::seed::STARTER_AREA;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub world: WorldConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: Option<SecurityConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    #[serde(default = "default_world_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Area new characters start in.
    #[serde(default = "default_start_area")]
    pub start_area: String,
    #[serde(default)]
    pub start_coords: Coords,
    #[serde(default = "default_inventory_capacity")]
    pub inventory_capacity: usize,
}

fn default_world_name() -> String {
    "Meshmud".to_string()
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_start_area() -> String {
    STARTER_AREA.to_string()
}

fn default_inventory_capacity() -> usize {
    DEFAULT_INVENTORY_CAPACITY
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            data_dir: default_data_dir(),
            start_area: default_start_area(),
            start_coords: Coords::default(),
            inventory_capacity: default_inventory_capacity(),
        }
    }
}

impl WorldConfig {
    /// Sled directory for the world store.
    pub fn store_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.data_dir).join("world")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: Some("meshmud.log".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Argon2Config {
    #[serde(default)]
    pub memory_kib: Option<u32>,
    #[serde(default)]
    pub time_cost: Option<u32>,
    #[serde(default)]
    pub parallelism: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SecurityConfig {
    #[serde(default)]
    pub argon2: Option<Argon2Config>,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.world.name.trim().is_empty() {
            return Err(anyhow!("world.name must not be empty"));
        }
        if self.world.start_area.trim().is_empty() {
            return Err(anyhow!("world.start_area must not be empty"));
        }
        if self.world.inventory_capacity == 0 {
            return Err(anyhow!("world.inventory_capacity must be at least 1"));
        }
        if let Some(a) = self.security.as_ref().and_then(|s| s.argon2.as_ref()) {
            let d = Params::DEFAULT;
            Params::new(
                a.memory_kib.unwrap_or(d.m_cost()),
                a.time_cost.unwrap_or(d.t_cost()),
                a.parallelism.unwrap_or(d.p_cost()),
                None,
            )
            .map_err(|e| anyhow!("invalid security.argon2 parameters: {}", e))?;
        }
        Ok(())
    }

    /// Argon2 parameters from `[security.argon2]`, unset fields taking library defaults.
    /// `None` when the section is absent or the values are rejected.
    pub fn argon2_params(&self) -> Option<Params> {
        let a = self.security.as_ref()?.argon2.as_ref()?;
        let builder = Params::DEFAULT;
        let mem = a.memory_kib.unwrap_or(builder.m_cost());
        let time = a.time_cost.unwrap_or(builder.t_cost());
        let para = a.parallelism.unwrap_or(builder.p_cost());
        Params::new(mem, time, para, None).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.world.name, "Meshmud");
        assert_eq!(config.world.start_area, STARTER_AREA);
        assert_eq!(config.world.inventory_capacity, 35);
        assert!(config.argon2_params().is_none());
        config.validate().unwrap();
    }

    #[test]
    fn partial_world_section() {
        let config: Config = toml::from_str(
            r#"
            [world]
            name = "Test Realm"
            start_coords = { x = 1, y = 2, z = 0 }
            "#,
        )
        .unwrap();
        assert_eq!(config.world.name, "Test Realm");
        assert_eq!(config.world.start_coords, Coords::new(1, 2, 0, 0));
        assert_eq!(config.world.data_dir, "./data");
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = Config::default();
        config.world.inventory_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.world.name = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.security = Some(SecurityConfig {
            argon2: Some(Argon2Config {
                memory_kib: Some(1),
                time_cost: None,
                parallelism: None,
            }),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn argon2_overrides_are_applied() {
        let config: Config = toml::from_str(
            r#"
            [security.argon2]
            memory_kib = 4096
            time_cost = 2
            "#,
        )
        .unwrap();
        let params = config.argon2_params().unwrap();
        assert_eq!(params.m_cost(), 4096);
        assert_eq!(params.t_cost(), 2);
    }

    #[tokio::test]
    async fn default_file_round_trips() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("config.toml");
        let path = path.to_str().expect("utf-8 path");
        Config::create_default(path).await.unwrap();
        let loaded = Config::load(path).await.unwrap();
        assert_eq!(loaded.world.name, "Meshmud");
        assert_eq!(loaded.logging.file.as_deref(), Some("meshmud.log"));
    }
}
