//! Slot-addressable object containers.
//!
//! One abstraction covers room contents, inventories and equipment:
//!
//! - capacity `N > 0`: `N` sequential slots, `add` takes the lowest free index
//!   and fails with [`WorldError::CapacityExceeded`] when all are taken;
//! - capacity `0`: unbounded. `add` appends at the lowest free index, and
//!   [`ObjectContainer::insert_at`] places objects under caller-supplied keys
//!   (equipment slot names).
//!
//! Containers hold object ids only. Which container an object is in is tracked
//! by the [`Registry`](super::registry::Registry); callers that move objects go
//! through [`relocate`](super::movement::relocate) so both stay in step.
//! Every operation takes this container's lock and nothing else.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use super::area::{Room, WeakRoom};
use super::character::{Character, WeakCharacter};
use super::errors::WorldError;
use super::guard::lock;
use super::snapshot::ContainerSnapshot;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Slot {
    Index(usize),
    Key(String),
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Index(i) => write!(f, "#{}", i),
            Slot::Key(k) => f.write_str(k),
        }
    }
}

/// What to do when a keyed insert targets an occupied slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyedInsert {
    Reject,
    /// Replace the occupant and hand its id back to the caller.
    Displace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerParentKind {
    Room,
    Character,
}

/// Non-owning back-reference to the entity that owns a container.
#[derive(Clone)]
pub enum ContainerParent {
    Room(WeakRoom),
    Character(WeakCharacter),
}

impl ContainerParent {
    pub fn kind(&self) -> ContainerParentKind {
        match self {
            ContainerParent::Room(_) => ContainerParentKind::Room,
            ContainerParent::Character(_) => ContainerParentKind::Character,
        }
    }
}

struct ContainerState {
    capacity: usize,
    slots: BTreeMap<Slot, String>,
    parent: Option<ContainerParent>,
}

impl ContainerState {
    fn slot_of(&self, object_id: &str) -> Option<Slot> {
        self.slots
            .iter()
            .find(|(_, id)| id.as_str() == object_id)
            .map(|(slot, _)| slot.clone())
    }

    fn lowest_free_index(&self) -> Option<usize> {
        if self.capacity > 0 {
            (0..self.capacity).find(|i| !self.slots.contains_key(&Slot::Index(*i)))
        } else {
            (0..).find(|i| !self.slots.contains_key(&Slot::Index(*i)))
        }
    }

    fn check_slot(&self, slot: &Slot) -> Result<(), WorldError> {
        match slot {
            Slot::Index(i) if self.capacity > 0 && *i >= self.capacity => Err(
                WorldError::InvalidSlot(format!("{} out of range for {} slots", slot, self.capacity)),
            ),
            Slot::Key(k) if self.capacity > 0 => Err(WorldError::InvalidSlot(format!(
                "key '{}' on a slotted container",
                k
            ))),
            _ => Ok(()),
        }
    }
}

struct ContainerInner {
    id: Uuid,
    state: Mutex<ContainerState>,
}

/// Shared handle to one container. Clones refer to the same container.
#[derive(Clone)]
pub struct ObjectContainer {
    inner: Arc<ContainerInner>,
}

impl ObjectContainer {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                id: Uuid::new_v4(),
                state: Mutex::new(ContainerState {
                    capacity,
                    slots: BTreeMap::new(),
                    parent: None,
                }),
            }),
        }
    }

    /// Rebuild a container from a snapshot. Fails on out-of-range slots or an
    /// object listed twice.
    pub fn from_snapshot(snapshot: &ContainerSnapshot) -> Result<Self, WorldError> {
        let container = Self::new(snapshot.capacity);
        for (slot, id) in &snapshot.slots {
            if container.contains(id) {
                return Err(WorldError::DataIntegrity(format!(
                    "object {} listed twice in one container",
                    id
                )));
            }
            container.insert_at(id, slot.clone(), KeyedInsert::Reject)?;
        }
        Ok(container)
    }

    pub fn snapshot(&self) -> ContainerSnapshot {
        let state = lock(&self.inner.state);
        ContainerSnapshot {
            capacity: state.capacity,
            slots: state
                .slots
                .iter()
                .map(|(slot, id)| (slot.clone(), id.clone()))
                .collect(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn capacity(&self) -> usize {
        lock(&self.inner.state).capacity
    }

    /// Add at the lowest free index. Adding an object already present returns its slot.
    pub fn add(&self, object_id: &str) -> Result<Slot, WorldError> {
        let mut state = lock(&self.inner.state);
        if let Some(existing) = state.slot_of(object_id) {
            return Ok(existing);
        }
        let index = state
            .lowest_free_index()
            .ok_or(WorldError::CapacityExceeded {
                capacity: state.capacity,
            })?;
        let slot = Slot::Index(index);
        state.slots.insert(slot.clone(), object_id.to_string());
        Ok(slot)
    }

    /// Place an object at a specific slot. Returns the displaced occupant under
    /// [`KeyedInsert::Displace`]. An object already held elsewhere in this
    /// container is moved to the new slot.
    pub fn insert_at(
        &self,
        object_id: &str,
        slot: Slot,
        policy: KeyedInsert,
    ) -> Result<Option<String>, WorldError> {
        let mut state = lock(&self.inner.state);
        state.check_slot(&slot)?;
        match state.slots.get(&slot) {
            Some(occupant) if occupant == object_id => return Ok(None),
            Some(_) if policy == KeyedInsert::Reject => {
                return Err(WorldError::SlotOccupied(slot.to_string()));
            }
            _ => {}
        }
        if let Some(previous) = state.slot_of(object_id) {
            state.slots.remove(&previous);
        }
        Ok(state.slots.insert(slot, object_id.to_string()))
    }

    /// Remove an object, returning the slot it occupied.
    pub fn remove(&self, object_id: &str) -> Result<Slot, WorldError> {
        let mut state = lock(&self.inner.state);
        let slot = state
            .slot_of(object_id)
            .ok_or_else(|| WorldError::NotFound(format!("object {} in container", object_id)))?;
        state.slots.remove(&slot);
        Ok(slot)
    }

    pub fn contains(&self, object_id: &str) -> bool {
        lock(&self.inner.state).slot_of(object_id).is_some()
    }

    /// Object ids in slot order.
    pub fn items(&self) -> Vec<String> {
        lock(&self.inner.state).slots.values().cloned().collect()
    }

    pub fn slot_of(&self, object_id: &str) -> Option<Slot> {
        lock(&self.inner.state).slot_of(object_id)
    }

    pub fn object_at(&self, slot: &Slot) -> Option<String> {
        lock(&self.inner.state).slots.get(slot).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.inner.state).slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Always false for unbounded (capacity 0) containers.
    pub fn is_full(&self) -> bool {
        let state = lock(&self.inner.state);
        state.capacity > 0 && state.slots.len() >= state.capacity
    }

    pub fn attach_parent(&self, parent: ContainerParent) {
        lock(&self.inner.state).parent = Some(parent);
    }

    pub fn parent_kind(&self) -> Option<ContainerParentKind> {
        lock(&self.inner.state).parent.as_ref().map(|p| p.kind())
    }

    pub fn parent_room(&self) -> Option<Room> {
        let parent = lock(&self.inner.state).parent.clone();
        match parent {
            Some(ContainerParent::Room(room)) => room.upgrade(),
            _ => None,
        }
    }

    pub fn parent_character(&self) -> Option<Character> {
        let parent = lock(&self.inner.state).parent.clone();
        match parent {
            Some(ContainerParent::Character(character)) => character.upgrade(),
            _ => None,
        }
    }

    pub fn same_as(&self, other: &ObjectContainer) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for ObjectContainer {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl Eq for ObjectContainer {}

impl fmt::Debug for ObjectContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.inner.state);
        f.debug_struct("ObjectContainer")
            .field("id", &self.inner.id)
            .field("capacity", &state.capacity)
            .field("len", &state.slots.len())
            .field("parent", &state.parent.as_ref().map(|p| p.kind()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_takes_lowest_free_slot() {
        let c = ObjectContainer::new(3);
        assert_eq!(c.add("a").unwrap(), Slot::Index(0));
        assert_eq!(c.add("b").unwrap(), Slot::Index(1));
        c.remove("a").unwrap();
        assert_eq!(c.add("c").unwrap(), Slot::Index(0));
        assert_eq!(c.items(), vec!["c".to_string(), "b".to_string()]);
    }

    #[test]
    fn full_container_rejects_and_stays_unchanged() {
        let c = ObjectContainer::new(35);
        for i in 0..35 {
            c.add(&format!("obj-{}", i)).unwrap();
        }
        let before = c.items();
        let err = c.add("one-too-many").unwrap_err();
        assert!(matches!(err, WorldError::CapacityExceeded { capacity: 35 }));
        assert_eq!(c.items(), before);
        assert!(c.is_full());
        assert!(!c.contains("one-too-many"));
    }

    #[test]
    fn add_is_idempotent_for_present_objects() {
        let c = ObjectContainer::new(2);
        let slot = c.add("a").unwrap();
        assert_eq!(c.add("a").unwrap(), slot);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn unbounded_container_never_fills() {
        let c = ObjectContainer::new(0);
        for i in 0..500 {
            c.add(&i.to_string()).unwrap();
        }
        assert_eq!(c.len(), 500);
        assert!(!c.is_full());
    }

    #[test]
    fn keyed_insert_policies() {
        let c = ObjectContainer::new(0);
        assert_eq!(
            c.insert_at("helm-1", Slot::Key("head".into()), KeyedInsert::Reject)
                .unwrap(),
            None
        );
        let err = c
            .insert_at("helm-2", Slot::Key("head".into()), KeyedInsert::Reject)
            .unwrap_err();
        assert!(matches!(err, WorldError::SlotOccupied(_)));
        assert_eq!(c.object_at(&Slot::Key("head".into())).as_deref(), Some("helm-1"));

        let displaced = c
            .insert_at("helm-2", Slot::Key("head".into()), KeyedInsert::Displace)
            .unwrap();
        assert_eq!(displaced.as_deref(), Some("helm-1"));
        assert_eq!(c.items(), vec!["helm-2".to_string()]);
    }

    #[test]
    fn slotted_container_rejects_keys_and_out_of_range() {
        let c = ObjectContainer::new(2);
        assert!(matches!(
            c.insert_at("a", Slot::Key("head".into()), KeyedInsert::Reject),
            Err(WorldError::InvalidSlot(_))
        ));
        assert!(matches!(
            c.insert_at("a", Slot::Index(2), KeyedInsert::Reject),
            Err(WorldError::InvalidSlot(_))
        ));
        c.insert_at("a", Slot::Index(1), KeyedInsert::Reject).unwrap();
        assert_eq!(c.slot_of("a"), Some(Slot::Index(1)));
    }

    #[test]
    fn remove_missing_is_not_found() {
        let c = ObjectContainer::new(0);
        assert!(matches!(c.remove("ghost"), Err(WorldError::NotFound(_))));
    }

    #[test]
    fn snapshot_restores_slots() {
        let c = ObjectContainer::new(0);
        c.add("a").unwrap();
        c.insert_at("b", Slot::Key("hands".into()), KeyedInsert::Reject)
            .unwrap();
        let restored = ObjectContainer::from_snapshot(&c.snapshot()).unwrap();
        assert_eq!(restored.slot_of("a"), Some(Slot::Index(0)));
        assert_eq!(restored.slot_of("b"), Some(Slot::Key("hands".into())));
        assert_ne!(restored, c);
    }

    #[test]
    fn snapshot_with_duplicate_object_is_rejected() {
        let snapshot = ContainerSnapshot {
            capacity: 0,
            slots: vec![
                (Slot::Index(0), "a".to_string()),
                (Slot::Index(1), "a".to_string()),
            ],
        };
        assert!(matches!(
            ObjectContainer::from_snapshot(&snapshot),
            Err(WorldError::DataIntegrity(_))
        ));
    }
}
