//! Sled-backed persistence for world snapshots.
//!
//! One tree per record kind, bincode-encoded values, and a schema version on
//! every record. The store only ever sees plain snapshots; live handles are
//! converted by [`World::snapshot`](super::state::World::snapshot) and
//! [`World::restore`](super::state::World::restore).

use log::{debug, info};
use sled::IVec;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::errors::WorldError;
use super::seed::starter_area;
use super::snapshot::{
    AreaSnapshot, CharacterSnapshot, ItemSnapshot, WorldSnapshot, AREA_SCHEMA_VERSION,
    CHARACTER_SCHEMA_VERSION, ITEM_SCHEMA_VERSION,
};

const TREE_AREAS: &str = "world_areas";
const TREE_CHARACTERS: &str = "world_characters";
const TREE_ITEMS: &str = "world_items";

/// Helper builder so tests can easily create throwaway stores with custom paths.
pub struct WorldStoreBuilder {
    path: PathBuf,
    seed: bool,
}

impl WorldStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            seed: true,
        }
    }

    /// Skip writing the starter area on open.
    pub fn without_seed(mut self) -> Self {
        self.seed = false;
        self
    }

    pub fn open(self) -> Result<WorldStore, WorldError> {
        WorldStore::open_with_options(self.path, self.seed)
    }
}

pub struct WorldStore {
    _db: sled::Db,
    areas: sled::Tree,
    characters: sled::Tree,
    items: sled::Tree,
}

impl WorldStore {
    /// Open (or create) the store at `path`, seeding the starter area into an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, WorldError> {
        Self::open_with_options(path, true)
    }

    fn open_with_options<P: AsRef<Path>>(path: P, seed: bool) -> Result<Self, WorldError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let store = Self {
            areas: db.open_tree(TREE_AREAS)?,
            characters: db.open_tree(TREE_CHARACTERS)?,
            items: db.open_tree(TREE_ITEMS)?,
            _db: db,
        };
        if seed {
            store.seed_if_needed()?;
        }
        Ok(store)
    }

    fn area_key(name: &str) -> Vec<u8> {
        format!("areas:{}", name.to_ascii_lowercase()).into_bytes()
    }

    fn character_key(name: &str) -> Vec<u8> {
        format!("characters:{}", name.to_ascii_lowercase()).into_bytes()
    }

    fn item_key(id: &str) -> Vec<u8> {
        format!("items:{}", id).into_bytes()
    }

    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, WorldError> {
        Ok(bincode::serialize(value)?)
    }

    fn deserialize<T: serde::de::DeserializeOwned>(bytes: IVec) -> Result<T, WorldError> {
        Ok(bincode::deserialize::<T>(&bytes)?)
    }

    fn check_version(entity: &'static str, expected: u8, found: u8) -> Result<(), WorldError> {
        if expected != found {
            return Err(WorldError::SchemaMismatch {
                entity,
                expected,
                found,
            });
        }
        Ok(())
    }

    pub fn put_area(&self, mut area: AreaSnapshot) -> Result<(), WorldError> {
        area.schema_version = AREA_SCHEMA_VERSION;
        self.areas
            .insert(Self::area_key(&area.name), Self::serialize(&area)?)?;
        self.areas.flush()?;
        Ok(())
    }

    pub fn get_area(&self, name: &str) -> Result<AreaSnapshot, WorldError> {
        let Some(bytes) = self.areas.get(Self::area_key(name))? else {
            return Err(WorldError::NotFound(format!("area: {}", name)));
        };
        let record: AreaSnapshot = Self::deserialize(bytes)?;
        Self::check_version("area", AREA_SCHEMA_VERSION, record.schema_version)?;
        Ok(record)
    }

    pub fn put_character(&self, mut character: CharacterSnapshot) -> Result<(), WorldError> {
        character.schema_version = CHARACTER_SCHEMA_VERSION;
        self.characters.insert(
            Self::character_key(&character.name),
            Self::serialize(&character)?,
        )?;
        self.characters.flush()?;
        Ok(())
    }

    pub fn get_character(&self, name: &str) -> Result<CharacterSnapshot, WorldError> {
        let Some(bytes) = self.characters.get(Self::character_key(name))? else {
            return Err(WorldError::NotFound(format!("character: {}", name)));
        };
        let record: CharacterSnapshot = Self::deserialize(bytes)?;
        Self::check_version("character", CHARACTER_SCHEMA_VERSION, record.schema_version)?;
        Ok(record)
    }

    pub fn put_item(&self, mut item: ItemSnapshot) -> Result<(), WorldError> {
        item.schema_version = ITEM_SCHEMA_VERSION;
        self.items
            .insert(Self::item_key(&item.id), Self::serialize(&item)?)?;
        self.items.flush()?;
        Ok(())
    }

    fn load_tree<T: serde::de::DeserializeOwned>(tree: &sled::Tree) -> Result<Vec<T>, WorldError> {
        let mut records = Vec::new();
        for entry in tree.iter() {
            let (_, bytes) = entry?;
            records.push(Self::deserialize(bytes)?);
        }
        Ok(records)
    }

    pub fn list_character_names(&self) -> Result<Vec<String>, WorldError> {
        let mut names = Vec::new();
        for entry in self.characters.scan_prefix(b"characters:") {
            let (key, _) = entry?;
            let text = String::from_utf8_lossy(&key);
            if let Some(name) = text.strip_prefix("characters:") {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    /// Replace the stored world with `snapshot`. Records missing from the
    /// snapshot are deleted.
    pub fn save_world(&self, snapshot: &WorldSnapshot) -> Result<(), WorldError> {
        let area_keys: HashSet<Vec<u8>> = snapshot
            .areas
            .iter()
            .map(|a| Self::area_key(&a.name))
            .collect();
        let character_keys: HashSet<Vec<u8>> = snapshot
            .characters
            .iter()
            .map(|c| Self::character_key(&c.name))
            .collect();
        let item_keys: HashSet<Vec<u8>> = snapshot
            .items
            .iter()
            .map(|i| Self::item_key(&i.id))
            .collect();

        for area in &snapshot.areas {
            self.put_area(area.clone())?;
        }
        for character in &snapshot.characters {
            self.put_character(character.clone())?;
        }
        for item in &snapshot.items {
            self.put_item(item.clone())?;
        }
        for (tree, keep) in [
            (&self.areas, &area_keys),
            (&self.characters, &character_keys),
            (&self.items, &item_keys),
        ] {
            Self::prune(tree, keep)?;
        }
        info!(
            "saved world: {} areas, {} characters, {} items",
            snapshot.areas.len(),
            snapshot.characters.len(),
            snapshot.items.len()
        );
        Ok(())
    }

    fn prune(tree: &sled::Tree, keep: &HashSet<Vec<u8>>) -> Result<(), WorldError> {
        let mut stale = Vec::new();
        for entry in tree.iter() {
            let (key, _) = entry?;
            let bytes: &[u8] = &key;
            if !keep.contains(bytes) {
                stale.push(key);
            }
        }
        for key in stale {
            debug!("removing stale record {}", String::from_utf8_lossy(&key));
            tree.remove(key)?;
        }
        tree.flush()?;
        Ok(())
    }

    pub fn load_world(&self) -> Result<WorldSnapshot, WorldError> {
        let areas: Vec<AreaSnapshot> = Self::load_tree(&self.areas)?;
        for area in &areas {
            Self::check_version("area", AREA_SCHEMA_VERSION, area.schema_version)?;
        }
        let characters: Vec<CharacterSnapshot> = Self::load_tree(&self.characters)?;
        for character in &characters {
            Self::check_version("character", CHARACTER_SCHEMA_VERSION, character.schema_version)?;
        }
        let items: Vec<ItemSnapshot> = Self::load_tree(&self.items)?;
        for item in &items {
            Self::check_version("item", ITEM_SCHEMA_VERSION, item.schema_version)?;
        }
        Ok(WorldSnapshot {
            areas,
            characters,
            items,
        })
    }

    /// Write the starter area if the store has no areas yet. Returns the number written.
    pub fn seed_if_needed(&self) -> Result<usize, WorldError> {
        if self.areas.iter().next().is_some() {
            return Ok(0);
        }
        let area = starter_area();
        info!("seeding starter area {}", area.name);
        self.put_area(area)?;
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::seed::STARTER_AREA;
    use tempfile::TempDir;

    #[test]
    fn seeding_only_happens_once() {
        let dir = TempDir::new().expect("tempdir");
        {
            let store = WorldStoreBuilder::new(dir.path()).open().expect("store");
            store.get_area(STARTER_AREA).expect("starter area present");
        }
        let store = WorldStoreBuilder::new(dir.path())
            .without_seed()
            .open()
            .expect("reopen store");
        assert_eq!(store.seed_if_needed().expect("seed check"), 0);
        assert_eq!(store.load_world().expect("load").areas.len(), 1);
    }

    #[test]
    fn unseeded_store_is_empty() {
        let dir = TempDir::new().expect("tempdir");
        let store = WorldStoreBuilder::new(dir.path())
            .without_seed()
            .open()
            .expect("store");
        assert_eq!(store.load_world().expect("load"), WorldSnapshot::default());
        assert!(matches!(
            store.get_area(STARTER_AREA),
            Err(WorldError::NotFound(_))
        ));
    }

    #[test]
    fn schema_mismatch_is_reported() {
        let dir = TempDir::new().expect("tempdir");
        let store = WorldStoreBuilder::new(dir.path())
            .without_seed()
            .open()
            .expect("store");
        let mut area = starter_area();
        area.schema_version = 99;
        store
            .areas
            .insert(WorldStore::area_key(&area.name), WorldStore::serialize(&area).unwrap())
            .unwrap();
        assert!(matches!(
            store.get_area(STARTER_AREA),
            Err(WorldError::SchemaMismatch { entity: "area", found: 99, .. })
        ));
    }

    #[test]
    fn save_world_prunes_missing_records() {
        let dir = TempDir::new().expect("tempdir");
        let store = WorldStoreBuilder::new(dir.path()).open().expect("store");
        store
            .save_world(&WorldSnapshot::default())
            .expect("save empty world");
        assert!(store.load_world().expect("load").areas.is_empty());
    }
}
