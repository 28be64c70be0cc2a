//! Validated attribute bags.
//!
//! Every entity kind has a fixed whitelist of permanent attributes. Names are
//! parsed into [`Attribute`] at the boundary; anything outside the whitelist for
//! the bag's [`EntityKind`] is rejected with [`WorldError::InvalidAttribute`].
//! Reads of unset or empty attributes fall back to a per-kind default.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::coords::Direction;
use super::errors::WorldError;

/// Transient attribute: an object editor is open on the character's room.
pub const TEMP_EDITOR_OPEN: &str = "editorOpen";
/// Transient attribute: movement restrictions are bypassed.
pub const TEMP_GHOST: &str = "ghost";
/// Transient attribute: last character who whispered to this one.
pub const TEMP_REPLY_TO: &str = "replyTo";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Channels,
    Color,
    Description,
    EquipSlot,
    Gender,
    Money,
    Permissions,
    Picture,
    Rarity,
    Script,
    Title,
    Type,
    North,
    East,
    South,
    West,
    Up,
    Down,
}

impl Attribute {
    pub const ALL: [Attribute; 18] = [
        Attribute::Channels,
        Attribute::Color,
        Attribute::Description,
        Attribute::EquipSlot,
        Attribute::Gender,
        Attribute::Money,
        Attribute::Permissions,
        Attribute::Picture,
        Attribute::Rarity,
        Attribute::Script,
        Attribute::Title,
        Attribute::Type,
        Attribute::North,
        Attribute::East,
        Attribute::South,
        Attribute::West,
        Attribute::Up,
        Attribute::Down,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Channels => "channels",
            Attribute::Color => "color",
            Attribute::Description => "description",
            Attribute::EquipSlot => "equip_slot",
            Attribute::Gender => "gender",
            Attribute::Money => "money",
            Attribute::Permissions => "permissions",
            Attribute::Picture => "picture",
            Attribute::Rarity => "rarity",
            Attribute::Script => "script",
            Attribute::Title => "title",
            Attribute::Type => "type",
            Attribute::North => "north",
            Attribute::East => "east",
            Attribute::South => "south",
            Attribute::West => "west",
            Attribute::Up => "up",
            Attribute::Down => "down",
        }
    }

    /// Case-insensitive lookup by attribute name.
    pub fn parse(name: &str) -> Option<Attribute> {
        let name = name.trim();
        Attribute::ALL
            .into_iter()
            .find(|attr| attr.as_str().eq_ignore_ascii_case(name))
    }

    /// Per-direction exit attribute on rooms.
    pub fn exit(direction: Direction) -> Attribute {
        match direction {
            Direction::North => Attribute::North,
            Direction::East => Attribute::East,
            Direction::South => Attribute::South,
            Direction::West => Attribute::West,
            Direction::Up => Attribute::Up,
            Direction::Down => Attribute::Down,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity kinds that carry an attribute bag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Area,
    Character,
    Item,
    Mob,
    Room,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Area => "area",
            EntityKind::Character => "character",
            EntityKind::Item => "item",
            EntityKind::Mob => "mob",
            EntityKind::Room => "room",
        }
    }

    pub fn valid_attributes(&self) -> &'static [Attribute] {
        match self {
            EntityKind::Area => &[],
            EntityKind::Character => &[
                Attribute::Picture,
                Attribute::Title,
                Attribute::Permissions,
                Attribute::Channels,
                Attribute::Money,
                Attribute::Gender,
            ],
            EntityKind::Item => &[Attribute::Picture, Attribute::Rarity, Attribute::EquipSlot],
            EntityKind::Mob => &[Attribute::Picture, Attribute::Script],
            EntityKind::Room => &[
                Attribute::Title,
                Attribute::Description,
                Attribute::Color,
                Attribute::Type,
                Attribute::North,
                Attribute::East,
                Attribute::South,
                Attribute::West,
                Attribute::Up,
                Attribute::Down,
            ],
        }
    }

    pub fn allows(&self, attr: Attribute) -> bool {
        self.valid_attributes().contains(&attr)
    }

    pub fn attribute_default(&self, attr: Attribute) -> &'static str {
        match (self, attr) {
            (EntityKind::Character, Attribute::Money) => "0",
            (EntityKind::Item, Attribute::Rarity) => "0",
            (EntityKind::Room, Attribute::Title) => "Empty Room",
            (EntityKind::Room, Attribute::Description) => {
                "You are in a newly created empty room. Make it a good one!"
            }
            (EntityKind::Room, Attribute::Color) => "190,190,190",
            _ => "",
        }
    }
}

/// Per-character client settings. Validated like attributes, stored separately.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Setting {
    Brightness,
    ScreenReader,
}

impl Setting {
    pub const ALL: [Setting; 2] = [Setting::Brightness, Setting::ScreenReader];

    pub fn as_str(&self) -> &'static str {
        match self {
            Setting::Brightness => "brightness",
            Setting::ScreenReader => "screenreader",
        }
    }

    pub fn parse(name: &str) -> Option<Setting> {
        let name = name.trim();
        Setting::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(name))
    }

    pub fn default_value(&self) -> &'static str {
        match self {
            Setting::Brightness => "100",
            Setting::ScreenReader => "false",
        }
    }
}

/// Whitelisted permanent attributes of one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeBag {
    kind: EntityKind,
    values: HashMap<Attribute, String>,
}

impl AttributeBag {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            values: HashMap::new(),
        }
    }

    /// Rebuild a bag from stored values, dropping anything the kind no longer allows.
    pub fn from_values(kind: EntityKind, values: HashMap<Attribute, String>) -> Self {
        let mut bag = Self::new(kind);
        for (attr, value) in values {
            if kind.allows(attr) {
                bag.values.insert(attr, value);
            } else {
                log::warn!(
                    "dropping stored attribute '{}' not valid for {}",
                    attr,
                    kind.as_str()
                );
            }
        }
        bag
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Value or the kind's default when unset or empty.
    pub fn get(&self, attr: Attribute) -> String {
        match self.values.get(&attr) {
            Some(v) if !v.is_empty() => v.clone(),
            _ => self.kind.attribute_default(attr).to_string(),
        }
    }

    /// Name-based read. Unknown names read as empty.
    pub fn get_by_name(&self, name: &str) -> String {
        Attribute::parse(name)
            .map(|attr| self.get(attr))
            .unwrap_or_default()
    }

    pub fn set(&mut self, attr: Attribute, value: impl Into<String>) -> Result<(), WorldError> {
        if !self.kind.allows(attr) {
            return Err(WorldError::InvalidAttribute {
                kind: self.kind.as_str(),
                name: attr.as_str().to_string(),
            });
        }
        self.values.insert(attr, value.into());
        Ok(())
    }

    pub fn set_by_name(&mut self, name: &str, value: impl Into<String>) -> Result<(), WorldError> {
        let attr = Attribute::parse(name).ok_or_else(|| WorldError::InvalidAttribute {
            kind: self.kind.as_str(),
            name: name.to_string(),
        })?;
        self.set(attr, value)
    }

    pub fn values(&self) -> &HashMap<Attribute, String> {
        &self.values
    }
}
