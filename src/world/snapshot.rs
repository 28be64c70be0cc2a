//! Plain-data snapshots of live world state, used by the persistence layer.
//! Live handles convert to these with `snapshot()` and are rebuilt by
//! [`World::restore`](super::state::World::restore).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::attributes::{Attribute, Setting};
use super::container::Slot;
use super::coords::Coords;

pub const AREA_SCHEMA_VERSION: u8 = 1;
pub const CHARACTER_SCHEMA_VERSION: u8 = 1;
pub const ITEM_SCHEMA_VERSION: u8 = 1;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContainerSnapshot {
    pub capacity: usize,
    pub slots: Vec<(Slot, String)>,
}

impl ContainerSnapshot {
    pub fn empty(capacity: usize) -> Self {
        Self {
            capacity,
            slots: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub coords: Coords,
    #[serde(default)]
    pub attributes: HashMap<Attribute, String>,
    #[serde(default)]
    pub contents: ContainerSnapshot,
}

impl RoomSnapshot {
    pub fn new(coords: Coords, title: &str, description: &str) -> Self {
        let mut attributes = HashMap::new();
        attributes.insert(Attribute::Title, title.to_string());
        attributes.insert(Attribute::Description, description.to_string());
        Self {
            coords,
            attributes,
            contents: ContainerSnapshot::empty(0),
        }
    }

    pub fn with_attribute(mut self, attr: Attribute, value: &str) -> Self {
        self.attributes.insert(attr, value.to_string());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AreaSnapshot {
    pub id: String,
    pub name: String,
    pub rooms: Vec<RoomSnapshot>,
    pub schema_version: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CharacterSnapshot {
    pub id: String,
    pub name: String,
    pub password_hash: String,
    #[serde(default)]
    pub attributes: HashMap<Attribute, String>,
    #[serde(default)]
    pub settings: HashMap<Setting, String>,
    pub inventory: ContainerSnapshot,
    pub equipment: ContainerSnapshot,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    pub schema_version: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemSnapshot {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub attributes: HashMap<Attribute, String>,
    pub schema_version: u8,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorldSnapshot {
    pub areas: Vec<AreaSnapshot>,
    pub characters: Vec<CharacterSnapshot>,
    pub items: Vec<ItemSnapshot>,
}
