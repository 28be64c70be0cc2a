//! Areas and the rooms they own.
//!
//! An [`Area`] guards its room list with one lock; each [`Room`] guards its
//! own attributes with another. Room coordinates never change after creation
//! and are read without locking. Lookups copy handles out of the area lock
//! before touching any room.

use log::debug;
use std::fmt;
use std::sync::{Arc, Mutex, Weak};
use uuid::Uuid;

use super::attributes::{Attribute, AttributeBag, EntityKind};
use super::character::Character;
use super::client::{
    log_delivery, EditorProperty, LocationData, Minimap, MinimapRoom, ObjectEditorData,
};
use super::container::{ContainerParent, ObjectContainer};
use super::coords::{Coords, Direction, Location};
use super::errors::WorldError;
use super::guard::lock;
use super::items::Item;
use super::registry::Registry;
use super::snapshot::{AreaSnapshot, RoomSnapshot, AREA_SCHEMA_VERSION};
use crate::logutil::escape_log;

struct AreaState {
    name: String,
    rooms: Vec<Room>,
}

pub(crate) struct AreaInner {
    id: Uuid,
    registry: Arc<Registry>,
    state: Mutex<AreaState>,
}

/// Named collection of rooms.
#[derive(Clone)]
pub struct Area {
    inner: Arc<AreaInner>,
}

impl Area {
    pub fn new(name: &str, registry: Arc<Registry>) -> Self {
        Self::with_id(Uuid::new_v4(), name, registry)
    }

    fn with_id(id: Uuid, name: &str, registry: Arc<Registry>) -> Self {
        Self {
            inner: Arc::new(AreaInner {
                id,
                registry,
                state: Mutex::new(AreaState {
                    name: name.to_string(),
                    rooms: Vec::new(),
                }),
            }),
        }
    }

    /// Rebuild an area and its rooms. Room contents are restored as stored;
    /// indexing them in the registry is left to the caller, once every object
    /// is registered.
    pub fn from_snapshot(snapshot: &AreaSnapshot, registry: Arc<Registry>) -> Result<Self, WorldError> {
        if snapshot.schema_version != AREA_SCHEMA_VERSION {
            return Err(WorldError::SchemaMismatch {
                entity: "area",
                expected: AREA_SCHEMA_VERSION,
                found: snapshot.schema_version,
            });
        }
        let id = Uuid::parse_str(&snapshot.id).map_err(|e| {
            WorldError::DataIntegrity(format!("area '{}' has a bad id: {}", snapshot.name, e))
        })?;
        let area = Self::with_id(id, &snapshot.name, registry);
        for room in &snapshot.rooms {
            let attributes = AttributeBag::from_values(EntityKind::Room, room.attributes.clone());
            let contents = ObjectContainer::from_snapshot(&room.contents)?;
            area.insert_room(room.coords, attributes, contents)?;
        }
        Ok(area)
    }

    pub fn snapshot(&self) -> AreaSnapshot {
        AreaSnapshot {
            id: self.inner.id.to_string(),
            name: self.name(),
            rooms: self.rooms().iter().map(Room::snapshot).collect(),
            schema_version: AREA_SCHEMA_VERSION,
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn name(&self) -> String {
        lock(&self.inner.state).name.clone()
    }

    /// Rooms in creation order.
    pub fn rooms(&self) -> Vec<Room> {
        lock(&self.inner.state).rooms.clone()
    }

    pub fn room_count(&self) -> usize {
        lock(&self.inner.state).rooms.len()
    }

    /// Linear scan comparing all four coordinate components.
    pub fn find_room(&self, coords: &Coords) -> Option<Room> {
        lock(&self.inner.state)
            .rooms
            .iter()
            .find(|room| room.coords() == *coords)
            .cloned()
    }

    pub fn add_room(&self, coords: Coords) -> Result<Room, WorldError> {
        self.insert_room(coords, AttributeBag::new(EntityKind::Room), ObjectContainer::new(0))
    }

    fn insert_room(
        &self,
        coords: Coords,
        attributes: AttributeBag,
        here: ObjectContainer,
    ) -> Result<Room, WorldError> {
        let mut state = lock(&self.inner.state);
        if state.rooms.iter().any(|room| room.coords() == coords) {
            return Err(WorldError::DuplicateRoom(format!("{} {}", state.name, coords)));
        }
        let room = Room {
            inner: Arc::new(RoomInner {
                coords,
                here,
                area: Arc::downgrade(&self.inner),
                registry: self.inner.registry.clone(),
                state: Mutex::new(RoomState { attributes }),
            }),
        };
        room.inner
            .here
            .attach_parent(ContainerParent::Room(room.downgrade()));
        state.rooms.push(room.clone());
        Ok(room)
    }

    /// Detach a room from the area. Objects still inside it lose their room.
    pub fn remove_room(&self, coords: &Coords) -> Option<Room> {
        let mut state = lock(&self.inner.state);
        let index = state.rooms.iter().position(|room| room.coords() == *coords)?;
        Some(state.rooms.remove(index))
    }

    pub fn minimap(&self) -> Minimap {
        let area = self.name();
        let rooms = self
            .rooms()
            .iter()
            .map(|room| MinimapRoom {
                title: room.title(),
                coords: room.coords(),
                color: room.attribute(Attribute::Color),
                room_type: room.attribute(Attribute::Type),
            })
            .collect();
        Minimap { area, rooms }
    }

    pub fn on_character_entered(&self, character: &Character) {
        if let Some(client) = character.client() {
            log_delivery(&character.name(), "minimap", client.render_map(&self.minimap()));
        }
    }

    pub fn on_character_left(&self, character: &Character) {
        debug!("{} left area {}", escape_log(&character.name()), self.name());
    }
}

impl PartialEq for Area {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Area")
            .field("id", &self.inner.id)
            .field("name", &self.name())
            .finish()
    }
}

struct RoomState {
    attributes: AttributeBag,
}

pub(crate) struct RoomInner {
    coords: Coords,
    here: ObjectContainer,
    area: Weak<AreaInner>,
    registry: Arc<Registry>,
    state: Mutex<RoomState>,
}

#[derive(Clone)]
pub struct Room {
    inner: Arc<RoomInner>,
}

#[derive(Clone)]
pub struct WeakRoom(Weak<RoomInner>);

impl WeakRoom {
    pub fn upgrade(&self) -> Option<Room> {
        self.0.upgrade().map(|inner| Room { inner })
    }
}

impl Room {
    pub fn coords(&self) -> Coords {
        self.inner.coords
    }

    /// Contents of the room: characters and loose items.
    pub fn here(&self) -> &ObjectContainer {
        &self.inner.here
    }

    pub fn area(&self) -> Option<Area> {
        self.inner.area.upgrade().map(|inner| Area { inner })
    }

    pub fn location(&self) -> Option<Location> {
        self.area().map(|area| Location::new(area.name(), self.coords()))
    }

    pub fn title(&self) -> String {
        self.attribute(Attribute::Title)
    }

    pub fn set_title(&self, title: &str) {
        // Title and description are always whitelisted for rooms.
        let _ = lock(&self.inner.state).attributes.set(Attribute::Title, title);
    }

    pub fn description(&self) -> String {
        self.attribute(Attribute::Description)
    }

    pub fn set_description(&self, description: &str) {
        let _ = lock(&self.inner.state)
            .attributes
            .set(Attribute::Description, description);
    }

    pub fn attribute(&self, attr: Attribute) -> String {
        lock(&self.inner.state).attributes.get(attr)
    }

    pub fn attribute_by_name(&self, name: &str) -> String {
        lock(&self.inner.state).attributes.get_by_name(name)
    }

    pub fn set_attribute(&self, name: &str, value: &str) -> Result<(), WorldError> {
        lock(&self.inner.state).attributes.set_by_name(name, value)
    }

    pub fn room_type(&self) -> String {
        self.attribute(Attribute::Type)
    }

    /// Room one step away in `direction`, if the area has one there.
    pub fn neighbor(&self, direction: Direction) -> Option<Room> {
        self.area()?.find_room(&self.coords().offset(direction)?)
    }

    pub fn exits(&self) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|d| self.neighbor(*d).is_some())
            .collect()
    }

    /// Characters currently in the room, optionally leaving one out.
    pub fn characters(&self, except: Option<&Character>) -> Vec<Character> {
        self.inner
            .here
            .items()
            .iter()
            .filter_map(|id| self.inner.registry.character(id))
            .filter(|c| except.map_or(true, |e| e != c))
            .collect()
    }

    pub fn online_characters(&self, except: Option<&Character>) -> Vec<Character> {
        self.characters(except)
            .into_iter()
            .filter(Character::online)
            .collect()
    }

    pub fn items(&self) -> Vec<Item> {
        self.inner
            .here
            .items()
            .iter()
            .filter_map(|id| self.inner.registry.item(id))
            .collect()
    }

    /// What `viewer` sees on entering or looking around.
    pub fn look(&self, viewer: &Character) -> String {
        let mut lines = vec![self.title(), self.description()];
        let exits = self.exits();
        if exits.is_empty() {
            lines.push("There are no obvious exits.".to_string());
        } else {
            let names: Vec<&str> = exits.iter().map(Direction::as_str).collect();
            lines.push(format!("Exits: {}", names.join(", ")));
        }
        let others: Vec<String> = self
            .characters(Some(viewer))
            .iter()
            .map(Character::name)
            .collect();
        if !others.is_empty() {
            lines.push(format!("Here: {}", others.join(", ")));
        }
        let items: Vec<String> = self.items().iter().map(Item::name).collect();
        if !items.is_empty() {
            lines.push(format!("You see: {}", items.join(", ")));
        }
        lines.join("\n")
    }

    pub fn location_data(&self) -> LocationData {
        LocationData {
            area: self.area().map(|a| a.name()).unwrap_or_default(),
            coords: self.coords(),
            title: self.title(),
        }
    }

    pub fn editor_data(&self) -> ObjectEditorData {
        let state = lock(&self.inner.state);
        let properties = EntityKind::Room
            .valid_attributes()
            .iter()
            .map(|attr| EditorProperty {
                name: attr.as_str().to_string(),
                value: state.attributes.get(*attr),
            })
            .collect();
        ObjectEditorData {
            id: self.coords().to_string(),
            name: state.attributes.get(Attribute::Title),
            object_type: EntityKind::Room.as_str(),
            properties,
        }
    }

    pub fn on_character_entered(&self, character: &Character) {
        if let Some(client) = character.client() {
            log_delivery(&character.name(), "location", client.set_location(&self.location_data()));
        }
    }

    pub fn on_character_left(&self, _character: &Character) {}

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            coords: self.coords(),
            attributes: lock(&self.inner.state).attributes.values().clone(),
            contents: self.inner.here.snapshot(),
        }
    }

    pub(crate) fn downgrade(&self) -> WeakRoom {
        WeakRoom(Arc::downgrade(&self.inner))
    }
}

impl PartialEq for Room {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Room")
            .field("coords", &self.inner.coords)
            .field("title", &self.title())
            .finish()
    }
}
