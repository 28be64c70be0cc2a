use std::sync::{Arc, RwLock};

use super::character::{Character, CharacterDefaults};
use super::errors::WorldError;
use super::guard::{read, write};
use super::registry::Registry;
use super::snapshot::CharacterSnapshot;

/// A character with its lookup key, fixed at insert. Name searches compare
/// keys and never take a character's own lock under the manager's.
struct Entry {
    key: String,
    character: Character,
}

/// Owns every character known to the world. Names are unique ignoring case.
pub struct CharacterManager {
    registry: Arc<Registry>,
    defaults: CharacterDefaults,
    characters: RwLock<Vec<Entry>>,
}

impl CharacterManager {
    pub fn new(registry: Arc<Registry>, defaults: CharacterDefaults) -> Self {
        Self {
            registry,
            defaults,
            characters: RwLock::new(Vec::new()),
        }
    }

    pub fn defaults(&self) -> &CharacterDefaults {
        &self.defaults
    }

    pub fn create(&self, name: &str, password: &str) -> Result<Character, WorldError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WorldError::InvalidAttribute {
                kind: "character",
                name: "name".to_string(),
            });
        }
        // Hashing is slow; check first, then again when inserting.
        if self.by_name(name).is_some() {
            return Err(WorldError::DuplicateCharacter(name.to_string()));
        }
        let character = Character::create(name, password, &self.defaults, self.registry.clone())?;
        if let Err(e) = self.insert(character.clone()) {
            self.registry.unregister(character.id());
            return Err(e);
        }
        Ok(character)
    }

    pub fn restore(&self, snapshot: &CharacterSnapshot) -> Result<Character, WorldError> {
        let character = Character::from_snapshot(snapshot, &self.defaults, self.registry.clone())?;
        self.insert(character.clone())?;
        Ok(character)
    }

    fn insert(&self, character: Character) -> Result<(), WorldError> {
        let name = character.name();
        let key = name.to_lowercase();
        let mut characters = write(&self.characters);
        if characters
            .iter()
            .any(|e| e.key == key || e.character.id() == character.id())
        {
            return Err(WorldError::DuplicateCharacter(name));
        }
        characters.push(Entry { key, character });
        Ok(())
    }

    pub fn by_name(&self, name: &str) -> Option<Character> {
        let key = name.trim().to_lowercase();
        read(&self.characters)
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.character.clone())
    }

    pub fn by_id(&self, id: &str) -> Option<Character> {
        read(&self.characters)
            .iter()
            .find(|e| e.character.id() == id)
            .map(|e| e.character.clone())
    }

    pub fn characters(&self) -> Vec<Character> {
        read(&self.characters)
            .iter()
            .map(|e| e.character.clone())
            .collect()
    }

    pub fn online_characters(&self) -> Vec<Character> {
        self.characters()
            .into_iter()
            .filter(Character::online)
            .collect()
    }

    pub fn len(&self) -> usize {
        read(&self.characters).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
