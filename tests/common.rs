//! Test utilities & fixtures.
//! A world built on the starter area and a client that records what it is sent.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use argon2::Params;
use meshmud::world::{
    starter_area, Character, CharacterDefaults, ClientActions, ClientError, Color, Delivery,
    InventoryEntry, LocationData, Minimap, ObjectEditorData, PlayerInfo, Session, SoundEffect,
    World, WorldSettings, WorldSnapshot,
};

/// Settings with Argon2 costs low enough for tests.
pub fn test_settings() -> WorldSettings {
    WorldSettings {
        characters: CharacterDefaults {
            inventory_capacity: 35,
            argon2: Some(Params::new(1024, 1, 1, None).expect("argon2 params")),
        },
        ..WorldSettings::default()
    }
}

/// A fresh world holding only the starter area.
pub fn starter_world() -> World {
    let snapshot = WorldSnapshot {
        areas: vec![starter_area()],
        ..WorldSnapshot::default()
    };
    World::restore(test_settings(), &snapshot).expect("restore starter world")
}

/// Create `name` in the start room and log them in with a recording client.
#[allow(dead_code)]
pub fn online(world: &World, name: &str) -> (Character, Arc<RecordingClient>) {
    let character = world
        .create_character(name, "correct horse")
        .expect("create character");
    let client = RecordingClient::new();
    character
        .login(Session::new(client.clone()))
        .expect("login");
    (character, client)
}

#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub enum Event {
    Text(String),
    Colored(String, Color),
    Sfx(SoundEffect),
    Map(String),
    Location(LocationData),
    Sync(&'static str),
    Editor(String),
}

#[derive(Default)]
pub struct RecordingClient {
    events: Mutex<Vec<Event>>,
    broken: AtomicBool,
}

#[allow(dead_code)]
impl RecordingClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fail every delivery from now on.
    pub fn break_connection(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Plain and colored text, in delivery order.
    pub fn texts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Text(t) | Event::Colored(t, _) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    fn record(&self, event: Event) -> Delivery {
        if self.broken.load(Ordering::SeqCst) {
            return Err(ClientError::Disconnected);
        }
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

impl ClientActions for RecordingClient {
    fn show_text(&self, text: &str) -> Delivery {
        self.record(Event::Text(text.to_string()))
    }

    fn show_colorized_text(&self, text: &str, color: Color) -> Delivery {
        self.record(Event::Colored(text.to_string(), color))
    }

    fn play_sfx(&self, sfx: SoundEffect) -> Delivery {
        self.record(Event::Sfx(sfx))
    }

    fn render_map(&self, map: &Minimap) -> Delivery {
        self.record(Event::Map(map.area.clone()))
    }

    fn set_location(&self, location: &LocationData) -> Delivery {
        self.record(Event::Location(location.clone()))
    }

    fn sync_inventory(&self, _inventory: &[InventoryEntry], _equipment: &[InventoryEntry]) -> Delivery {
        self.record(Event::Sync("inventory"))
    }

    fn sync_permissions(&self, _permissions: &[String]) -> Delivery {
        self.record(Event::Sync("permissions"))
    }

    fn sync_player_info(&self, _info: &PlayerInfo) -> Delivery {
        self.record(Event::Sync("player"))
    }

    fn sync_money(&self, _money: f64) -> Delivery {
        self.record(Event::Sync("money"))
    }

    fn sync_commands(&self, _permissions: &[String]) -> Delivery {
        self.record(Event::Sync("commands"))
    }

    fn sync_settings(&self, _settings_json: &str) -> Delivery {
        self.record(Event::Sync("settings"))
    }

    fn show_object_editor(&self, data: &ObjectEditorData) -> Delivery {
        self.record(Event::Editor(data.name.clone()))
    }
}
