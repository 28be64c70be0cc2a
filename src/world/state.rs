//! The live world: areas, characters and items, plus the compound operations
//! that relocate objects between them.

use chrono::{DateTime, Utc};
use log::{error, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::area::{Area, Room};
use super::character::{Character, CharacterDefaults};
use super::characters::CharacterManager;
use super::client::SoundEffect;
use super::container::{KeyedInsert, ObjectContainer, Slot};
use super::coords::{Coords, Direction, Location};
use super::errors::WorldError;
use super::guard::{read, write};
use super::items::Item;
use super::movement::{relocate, MoveMessages, MoveVerdict};
use super::registry::{Registry, WorldObject};
use super::seed::STARTER_AREA;
use super::snapshot::WorldSnapshot;
use crate::config::Config;
use crate::logutil::escape_log;

fn index_out_of_step(id: &str) -> WorldError {
    WorldError::DataIntegrity(format!("object {} is not where the index says", id))
}

#[derive(Debug, Clone)]
pub struct WorldSettings {
    pub name: String,
    /// Where new characters appear.
    pub start: Location,
    pub characters: CharacterDefaults,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            name: "Meshmud".to_string(),
            start: Location::new(STARTER_AREA, Coords::default()),
            characters: CharacterDefaults::default(),
        }
    }
}

impl WorldSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            name: config.world.name.clone(),
            start: Location::new(config.world.start_area.clone(), config.world.start_coords),
            characters: CharacterDefaults {
                inventory_capacity: config.world.inventory_capacity,
                argon2: config.argon2_params(),
            },
        }
    }
}

pub struct World {
    settings: WorldSettings,
    registry: Arc<Registry>,
    areas: RwLock<Vec<Area>>,
    characters: CharacterManager,
    items: RwLock<HashMap<String, Item>>,
    started_at: DateTime<Utc>,
}

impl World {
    pub fn new(settings: WorldSettings) -> Self {
        let registry = Arc::new(Registry::new());
        let characters = CharacterManager::new(registry.clone(), settings.characters.clone());
        Self {
            settings,
            registry,
            areas: RwLock::new(Vec::new()),
            characters,
            items: RwLock::new(HashMap::new()),
            started_at: Utc::now(),
        }
    }

    /// Rebuild a world from stored snapshots. Objects are registered first;
    /// container contents are then indexed, so an object listed in two
    /// containers is caught as a data-integrity error.
    pub fn restore(settings: WorldSettings, snapshot: &WorldSnapshot) -> Result<Self, WorldError> {
        let world = Self::new(settings);
        for stored in &snapshot.items {
            let item = Item::from_snapshot(stored)?;
            world.track_item(item);
        }
        for stored in &snapshot.characters {
            world.characters.restore(stored)?;
        }
        for stored in &snapshot.areas {
            world.insert_area(Area::from_snapshot(stored, world.registry.clone())?)?;
        }

        for area in world.areas() {
            for room in area.rooms() {
                world.registry.index_container(room.here())?;
            }
        }
        for character in world.characters.characters() {
            world.registry.index_container(character.inventory())?;
            world.registry.index_container(character.equipment())?;
        }
        info!(
            "restored world {}: {} areas, {} characters, {} items",
            world.settings.name,
            world.area_count(),
            world.characters.len(),
            world.item_count()
        );
        Ok(world)
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            areas: self.areas().iter().map(Area::snapshot).collect(),
            characters: self
                .characters
                .characters()
                .iter()
                .map(Character::snapshot)
                .collect(),
            items: read(&self.items).values().map(Item::snapshot).collect(),
        }
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn characters(&self) -> &CharacterManager {
        &self.characters
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn add_area(&self, name: &str) -> Result<Area, WorldError> {
        let area = Area::new(name.trim(), self.registry.clone());
        self.insert_area(area.clone())?;
        Ok(area)
    }

    fn insert_area(&self, area: Area) -> Result<(), WorldError> {
        let name = area.name();
        let mut areas = write(&self.areas);
        if areas.iter().any(|a| a.name().eq_ignore_ascii_case(&name)) {
            return Err(WorldError::DuplicateArea(name));
        }
        areas.push(area);
        Ok(())
    }

    pub fn areas(&self) -> Vec<Area> {
        read(&self.areas).clone()
    }

    pub fn area_count(&self) -> usize {
        read(&self.areas).len()
    }

    pub fn area_by_name(&self, name: &str) -> Option<Area> {
        let name = name.trim();
        read(&self.areas)
            .iter()
            .find(|a| a.name().eq_ignore_ascii_case(name))
            .cloned()
    }

    pub fn find_room(&self, location: &Location) -> Option<Room> {
        self.area_by_name(&location.area)?.find_room(&location.coords)
    }

    pub fn start_room(&self) -> Option<Room> {
        self.find_room(&self.settings.start)
    }

    /// Create a character standing in the start room.
    pub fn create_character(&self, name: &str, password: &str) -> Result<Character, WorldError> {
        let start = self.start_room().ok_or_else(|| {
            WorldError::NotFound(format!("start room {}", self.settings.start))
        })?;
        let character = self.characters.create(name, password)?;
        relocate(
            &self.registry,
            character.id(),
            start.here(),
            false,
        )?;
        Ok(character)
    }

    fn track_item(&self, item: Item) {
        self.registry.register(&WorldObject::Item(item.clone()));
        write(&self.items).insert(item.id().to_string(), item);
    }

    /// New item, registered but in no container.
    pub fn create_item(&self, name: &str) -> Item {
        let item = Item::new(name);
        self.track_item(item.clone());
        item
    }

    pub fn item(&self, id: &str) -> Option<Item> {
        read(&self.items).get(id).cloned()
    }

    pub fn item_count(&self) -> usize {
        read(&self.items).len()
    }

    /// Move an item into any container, back into its old slot if refused.
    pub fn move_item(&self, item_id: &str, to: &ObjectContainer) -> Result<Slot, WorldError> {
        if self.item(item_id).is_none() {
            return Err(WorldError::NotFound(format!("item {}", item_id)));
        }
        relocate(&self.registry, item_id, to, true)
    }

    fn require_in(&self, item_id: &str, container: &ObjectContainer, place: &str) -> Result<(), WorldError> {
        match self.registry.container_of(item_id) {
            Some(c) if c.same_as(container) && self.item(item_id).is_some() => Ok(()),
            _ => Err(WorldError::NotFound(format!("item {} in {}", item_id, place))),
        }
    }

    fn current_room(&self, character: &Character) -> Result<Room, WorldError> {
        character.room().ok_or_else(|| {
            error!("character {} is not in any room", escape_log(&character.name()));
            WorldError::DataIntegrity(format!("character {} has no room", character.name()))
        })
    }

    pub fn give_item(&self, character: &Character, item_id: &str) -> Result<Slot, WorldError> {
        let slot = self.move_item(item_id, character.inventory())?;
        character.sync_inventory();
        Ok(slot)
    }

    pub fn drop_item(&self, character: &Character, item_id: &str) -> Result<Slot, WorldError> {
        self.require_in(item_id, character.inventory(), "inventory")?;
        let room = self.current_room(character)?;
        let slot = self.move_item(item_id, room.here())?;
        character.sync_inventory();
        Ok(slot)
    }

    pub fn pick_up(&self, character: &Character, item_id: &str) -> Result<Slot, WorldError> {
        let room = self.current_room(character)?;
        self.require_in(item_id, room.here(), "room")?;
        let slot = self.move_item(item_id, character.inventory())?;
        character.sync_inventory();
        Ok(slot)
    }

    /// Wear an inventory item in its equip slot. Whatever was in that slot
    /// takes the item's place in the inventory and is returned.
    ///
    /// Both items are claimed for the whole swap, so neither can be moved by
    /// anyone else and the two slots involved cannot be taken in between.
    pub fn equip(&self, character: &Character, item_id: &str) -> Result<Option<Item>, WorldError> {
        let item = self
            .item(item_id)
            .ok_or_else(|| WorldError::NotFound(format!("item {}", item_id)))?;
        let key = item
            .equip_slot()
            .ok_or_else(|| WorldError::InvalidSlot(format!("{} cannot be equipped", item.name())))?;
        let inventory = character.inventory();
        let equipment = character.equipment();

        let claim = self.registry.begin_transit(item_id)?;
        if !claim.from().is_some_and(|c| c.same_as(inventory)) {
            return Err(WorldError::NotFound(format!("item {} in inventory", item_id)));
        }
        let inventory_slot = inventory
            .slot_of(item_id)
            .ok_or_else(|| index_out_of_step(item_id))?;
        let key_slot = Slot::Key(key);

        let Some(old) = equipment.object_at(&key_slot) else {
            // Take the equipment slot first; the inventory copy only goes once that holds.
            equipment.insert_at(item_id, key_slot, KeyedInsert::Reject)?;
            if let Err(e) = inventory.remove(item_id) {
                warn!("equipped item {} was already out of the inventory: {}", item_id, e);
            }
            self.registry.set_container(item_id, Some(equipment));
            character.sync_inventory();
            return Ok(None);
        };

        let old_claim = self.registry.begin_transit(&old)?;
        if !old_claim.from().is_some_and(|c| c.same_as(equipment))
            || equipment.object_at(&key_slot).as_deref() != Some(old.as_str())
        {
            return Err(WorldError::InTransit(old));
        }

        // Each step displaces an item this swap holds the claim for.
        let pushed = equipment.insert_at(item_id, key_slot.clone(), KeyedInsert::Displace)?;
        if pushed.as_deref() != Some(old.as_str()) {
            error!("equipment slot {} changed under a claimed swap", key_slot);
            return Err(index_out_of_step(&old));
        }
        if let Err(e) = inventory.insert_at(&old, inventory_slot, KeyedInsert::Displace) {
            // Put the old item back on; the new one never left the inventory.
            if let Err(restore) = equipment.insert_at(&old, key_slot, KeyedInsert::Displace) {
                error!("could not restore {} to equipment: {}", old, restore);
                return Err(index_out_of_step(&old));
            }
            return Err(e);
        }
        self.registry.set_container(item_id, Some(equipment));
        self.registry.set_container(&old, Some(inventory));
        drop(old_claim);
        drop(claim);

        character.sync_inventory();
        Ok(self.item(&old))
    }

    pub fn unequip(&self, character: &Character, item_id: &str) -> Result<Slot, WorldError> {
        self.require_in(item_id, character.equipment(), "equipment")?;
        let slot = self.move_item(item_id, character.inventory())?;
        character.sync_inventory();
        Ok(slot)
    }

    /// Step one room in `direction`, subject to the movement policy.
    pub fn walk(&self, character: &Character, direction: Direction) -> Result<Room, WorldError> {
        let origin = self.current_room(character)?;
        let destination = origin.neighbor(direction);
        if let MoveVerdict::Denied(reason) = character.move_allowed(destination.as_ref()) {
            return Err(WorldError::MoveDenied(reason));
        }
        let Some(destination) = destination else {
            return Err(WorldError::MoveDenied(super::movement::CANNOT_MOVE_THAT_WAY.to_string()));
        };
        let messages = MoveMessages::walk(&character.name(), direction);
        character.move_to(&destination, &messages, Some(SoundEffect::Footsteps))?;
        Ok(destination)
    }

    /// Move straight to `location`. Works even when the character's room is gone.
    pub fn teleport(&self, character: &Character, location: &Location) -> Result<Room, WorldError> {
        let destination = self
            .find_room(location)
            .ok_or_else(|| WorldError::NotFound(format!("room {}", location)))?;
        let messages = MoveMessages::teleport(&character.name());
        character.move_to(&destination, &messages, Some(SoundEffect::Teleport))?;
        Ok(destination)
    }
}
