//! Outbound client capability.
//!
//! The engine never formats terminal output or talks to a transport. It hands
//! notifications to whatever implements [`ClientActions`] for a session. Every
//! call returns a [`Delivery`]; a failed delivery is logged and skipped so one
//! disconnecting session never blocks the others.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use super::container::Slot;
use super::coords::Coords;
use super::text::Color;
use crate::logutil::escape_log;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("session disconnected")]
    Disconnected,
    #[error("delivery failed: {0}")]
    Failed(String),
}

pub type Delivery = Result<(), ClientError>;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SoundEffect {
    Footsteps,
    Teleport,
}

impl SoundEffect {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundEffect::Footsteps => "footsteps",
            SoundEffect::Teleport => "teleport",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LocationData {
    pub area: String,
    pub coords: Coords,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MinimapRoom {
    pub title: String,
    pub coords: Coords,
    pub color: String,
    pub room_type: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Minimap {
    pub area: String,
    pub rooms: Vec<MinimapRoom>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InventoryEntry {
    pub id: String,
    pub name: String,
    pub picture: String,
    pub slot: Slot,
    pub equip_slot: Option<String>,
    pub rarity: u8,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PlayerInfo {
    pub name: String,
    pub title: String,
    pub picture: String,
    pub password_fingerprint: String,
}

/// Full client state pushed in one batch after login.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClientSync {
    pub inventory: Vec<InventoryEntry>,
    pub equipment: Vec<InventoryEntry>,
    pub permissions: Vec<String>,
    pub player: PlayerInfo,
    pub money: f64,
    pub settings: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EditorProperty {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ObjectEditorData {
    pub id: String,
    pub name: String,
    pub object_type: &'static str,
    pub properties: Vec<EditorProperty>,
}

pub trait ClientActions: Send + Sync {
    fn show_text(&self, text: &str) -> Delivery;
    fn show_colorized_text(&self, text: &str, color: Color) -> Delivery;
    fn play_sfx(&self, sfx: SoundEffect) -> Delivery;
    fn render_map(&self, map: &Minimap) -> Delivery;
    fn set_location(&self, location: &LocationData) -> Delivery;
    fn sync_inventory(&self, inventory: &[InventoryEntry], equipment: &[InventoryEntry]) -> Delivery;
    fn sync_permissions(&self, permissions: &[String]) -> Delivery;
    fn sync_player_info(&self, info: &PlayerInfo) -> Delivery;
    fn sync_money(&self, money: f64) -> Delivery;
    /// Ask the client to refresh the command list allowed by `permissions`.
    fn sync_commands(&self, permissions: &[String]) -> Delivery;
    fn sync_settings(&self, settings_json: &str) -> Delivery;
    fn show_object_editor(&self, data: &ObjectEditorData) -> Delivery;

    /// Push the whole client state. Transports that can batch should override this.
    fn sync_all(&self, state: &ClientSync) -> Delivery {
        self.sync_inventory(&state.inventory, &state.equipment)?;
        self.sync_permissions(&state.permissions)?;
        self.sync_player_info(&state.player)?;
        self.sync_money(state.money)?;
        self.sync_commands(&state.permissions)?;
        self.sync_settings(&state.settings)
    }
}

/// A connected player's session as seen by the engine.
#[derive(Clone)]
pub struct Session {
    id: Uuid,
    client: Arc<dyn ClientActions>,
}

impl Session {
    pub fn new(client: Arc<dyn ClientActions>) -> Self {
        Self {
            id: Uuid::new_v4(),
            client,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn client(&self) -> &Arc<dyn ClientActions> {
        &self.client
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("id", &self.id).finish()
    }
}

pub(crate) fn log_delivery(recipient: &str, what: &str, result: Delivery) {
    if let Err(e) = result {
        log::warn!(
            "failed to deliver {} to {}: {}",
            what,
            escape_log(recipient),
            e
        );
    }
}
