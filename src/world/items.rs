use std::fmt;
use std::sync::{Arc, Mutex, Weak};
use uuid::Uuid;

use super::attributes::{Attribute, AttributeBag, EntityKind};
use super::errors::WorldError;
use super::guard::lock;
use super::snapshot::{ItemSnapshot, ITEM_SCHEMA_VERSION};

struct ItemState {
    name: String,
    attributes: AttributeBag,
}

pub(crate) struct ItemInner {
    id: String,
    state: Mutex<ItemState>,
}

/// Shared handle to an item instance.
#[derive(Clone)]
pub struct Item {
    inner: Arc<ItemInner>,
}

#[derive(Clone)]
pub struct WeakItem(Weak<ItemInner>);

impl WeakItem {
    pub fn upgrade(&self) -> Option<Item> {
        self.0.upgrade().map(|inner| Item { inner })
    }
}

impl Item {
    pub fn new(name: &str) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), name, AttributeBag::new(EntityKind::Item))
    }

    fn with_id(id: String, name: &str, attributes: AttributeBag) -> Self {
        Self {
            inner: Arc::new(ItemInner {
                id,
                state: Mutex::new(ItemState {
                    name: name.to_string(),
                    attributes,
                }),
            }),
        }
    }

    pub fn from_snapshot(snapshot: &ItemSnapshot) -> Result<Self, WorldError> {
        if snapshot.schema_version != ITEM_SCHEMA_VERSION {
            return Err(WorldError::SchemaMismatch {
                entity: "item",
                expected: ITEM_SCHEMA_VERSION,
                found: snapshot.schema_version,
            });
        }
        let attributes = AttributeBag::from_values(EntityKind::Item, snapshot.attributes.clone());
        Ok(Self::with_id(snapshot.id.clone(), &snapshot.name, attributes))
    }

    pub fn snapshot(&self) -> ItemSnapshot {
        let state = lock(&self.inner.state);
        ItemSnapshot {
            id: self.inner.id.clone(),
            name: state.name.clone(),
            attributes: state.attributes.values().clone(),
            schema_version: ITEM_SCHEMA_VERSION,
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn name(&self) -> String {
        lock(&self.inner.state).name.clone()
    }

    pub fn attribute(&self, name: &str) -> String {
        lock(&self.inner.state).attributes.get_by_name(name)
    }

    pub fn set_attribute(&self, name: &str, value: &str) -> Result<(), WorldError> {
        lock(&self.inner.state).attributes.set_by_name(name, value)
    }

    /// Equipment slot this item occupies when equipped, if it is wearable at all.
    pub fn equip_slot(&self) -> Option<String> {
        let slot = lock(&self.inner.state).attributes.get(Attribute::EquipSlot);
        if slot.is_empty() {
            None
        } else {
            Some(slot)
        }
    }

    pub fn rarity(&self) -> u8 {
        lock(&self.inner.state)
            .attributes
            .get(Attribute::Rarity)
            .parse()
            .unwrap_or(0)
    }

    pub(crate) fn downgrade(&self) -> WeakItem {
        WeakItem(Arc::downgrade(&self.inner))
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("id", &self.inner.id)
            .field("name", &self.name())
            .finish()
    }
}
