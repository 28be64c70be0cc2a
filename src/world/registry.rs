//! Object registry and room-membership index.
//!
//! Maps every live object id to a weak handle on the object and to the
//! container currently holding it, so "which room is this character in" is a
//! single map lookup instead of a scan over every room. The map has its own
//! lock; each method holds it for one lookup or one update and never calls
//! into a container or entity while holding it.

use log::{debug, warn};
use std::collections::HashMap;
use std::sync::RwLock;

use super::area::Room;
use super::character::{Character, WeakCharacter};
use super::container::ObjectContainer;
use super::errors::WorldError;
use super::guard::{read, write};
use super::items::{Item, WeakItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Character,
    Item,
}

/// Anything that can sit in an [`ObjectContainer`].
#[derive(Clone)]
pub enum WorldObject {
    Character(Character),
    Item(Item),
}

impl WorldObject {
    pub fn id(&self) -> String {
        match self {
            WorldObject::Character(c) => c.id().to_string(),
            WorldObject::Item(i) => i.id().to_string(),
        }
    }

    pub fn name(&self) -> String {
        match self {
            WorldObject::Character(c) => c.name(),
            WorldObject::Item(i) => i.name(),
        }
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            WorldObject::Character(_) => ObjectType::Character,
            WorldObject::Item(_) => ObjectType::Item,
        }
    }

    fn downgrade(&self) -> WeakObject {
        match self {
            WorldObject::Character(c) => WeakObject::Character(c.downgrade()),
            WorldObject::Item(i) => WeakObject::Item(i.downgrade()),
        }
    }
}

impl From<Character> for WorldObject {
    fn from(c: Character) -> Self {
        WorldObject::Character(c)
    }
}

impl From<Item> for WorldObject {
    fn from(i: Item) -> Self {
        WorldObject::Item(i)
    }
}

#[derive(Clone)]
enum WeakObject {
    Character(WeakCharacter),
    Item(WeakItem),
}

impl WeakObject {
    fn upgrade(&self) -> Option<WorldObject> {
        match self {
            WeakObject::Character(c) => c.upgrade().map(WorldObject::Character),
            WeakObject::Item(i) => i.upgrade().map(WorldObject::Item),
        }
    }

    fn object_type(&self) -> ObjectType {
        match self {
            WeakObject::Character(_) => ObjectType::Character,
            WeakObject::Item(_) => ObjectType::Item,
        }
    }
}

struct Entry {
    object: WeakObject,
    container: Option<ObjectContainer>,
    in_transit: bool,
}

/// Exclusive claim on one object's relocation, released on drop.
pub(crate) struct Transit<'a> {
    registry: &'a Registry,
    id: Option<String>,
    from: Option<ObjectContainer>,
}

impl Transit<'_> {
    /// Container the object was indexed in when the claim was taken.
    pub(crate) fn from(&self) -> Option<&ObjectContainer> {
        self.from.as_ref()
    }
}

impl Drop for Transit<'_> {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            if let Some(entry) = write(&self.registry.entries).get_mut(&id) {
                entry.in_transit = false;
            }
        }
    }
}

#[derive(Default)]
pub struct Registry {
    entries: RwLock<HashMap<String, Entry>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or re-register) an object. An existing container link is kept.
    pub fn register(&self, object: &WorldObject) {
        let id = object.id();
        let weak = object.downgrade();
        let mut entries = write(&self.entries);
        match entries.get_mut(&id) {
            Some(entry) => entry.object = weak,
            None => {
                entries.insert(
                    id,
                    Entry {
                        object: weak,
                        container: None,
                        in_transit: false,
                    },
                );
            }
        }
    }

    /// Forget an object, returning the container it was last recorded in.
    pub fn unregister(&self, id: &str) -> Option<ObjectContainer> {
        write(&self.entries).remove(id).and_then(|e| e.container)
    }

    pub fn object(&self, id: &str) -> Option<WorldObject> {
        let weak = read(&self.entries).get(id).map(|e| e.object.clone())?;
        weak.upgrade()
    }

    pub fn character(&self, id: &str) -> Option<Character> {
        match self.object(id)? {
            WorldObject::Character(c) => Some(c),
            WorldObject::Item(_) => None,
        }
    }

    pub fn item(&self, id: &str) -> Option<Item> {
        match self.object(id)? {
            WorldObject::Item(i) => Some(i),
            WorldObject::Character(_) => None,
        }
    }

    pub fn object_type(&self, id: &str) -> Option<ObjectType> {
        read(&self.entries).get(id).map(|e| e.object.object_type())
    }

    pub fn container_of(&self, id: &str) -> Option<ObjectContainer> {
        read(&self.entries).get(id).and_then(|e| e.container.clone())
    }

    /// Room whose contents currently hold `id`. `None` when the object is in an
    /// inventory, nowhere, or its room has been deleted.
    pub fn room_of(&self, id: &str) -> Option<Room> {
        self.container_of(id)?.parent_room()
    }

    /// Claim `id` for a relocation and read its current container. Fails while
    /// another relocation of the same object holds the claim. Unregistered ids
    /// are not tracked and always succeed with no container.
    pub(crate) fn begin_transit(&self, id: &str) -> Result<Transit<'_>, WorldError> {
        let mut entries = write(&self.entries);
        match entries.get_mut(id) {
            Some(entry) if entry.in_transit => Err(WorldError::InTransit(id.to_string())),
            Some(entry) => {
                entry.in_transit = true;
                Ok(Transit {
                    registry: self,
                    id: Some(id.to_string()),
                    from: entry.container.clone(),
                })
            }
            None => Ok(Transit {
                registry: self,
                id: None,
                from: None,
            }),
        }
    }

    /// Point the index at a new container. Returns false for unknown ids.
    pub(crate) fn set_container(&self, id: &str, container: Option<&ObjectContainer>) -> bool {
        let mut entries = write(&self.entries);
        match entries.get_mut(id) {
            Some(entry) => {
                entry.container = container.cloned();
                true
            }
            None => {
                debug!("membership update for unregistered object {}", id);
                false
            }
        }
    }

    /// Index every object already held by `container` (used when rebuilding
    /// from snapshots). Unknown ids are dropped from the container; an object
    /// already indexed in another container is a data-integrity violation.
    pub(crate) fn index_container(&self, container: &ObjectContainer) -> Result<(), WorldError> {
        for id in container.items() {
            let known = {
                let entries = read(&self.entries);
                entries.get(&id).map(|e| e.container.clone())
            };
            match known {
                None => {
                    warn!("dropping unknown object {} from stored container", id);
                    let _ = container.remove(&id);
                }
                Some(Some(existing)) if !existing.same_as(container) => {
                    return Err(WorldError::DataIntegrity(format!(
                        "object {} stored in two containers",
                        id
                    )));
                }
                Some(_) => {
                    self.set_container(&id, Some(container));
                }
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        read(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
