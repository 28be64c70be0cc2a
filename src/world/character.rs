//! Player characters.
//!
//! All mutable character state sits behind one `RwLock`. Accessors take the
//! lock for their own fields only and drop it before calling into a room, an
//! area, a container or a client. The inventory and equipment containers are
//! fixed for the character's lifetime and carry their own locks.

use argon2::Params;
use chrono::{DateTime, Utc};
use log::{error, info};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, Weak};
use uuid::Uuid;

use super::area::Room;
use super::attributes::{Attribute, AttributeBag, EntityKind, Setting};
use super::channel::{channel_by_name, Channel};
use super::client::{
    log_delivery, ClientActions, ClientSync, EditorProperty, InventoryEntry, ObjectEditorData,
    PlayerInfo, Session,
};
use super::container::{ContainerParent, ObjectContainer};
use super::conversation::Conversation;
use super::credentials;
use super::errors::WorldError;
use super::guard::{read, write};
use super::registry::{Registry, WorldObject};
use super::snapshot::{CharacterSnapshot, CHARACTER_SCHEMA_VERSION};
use crate::logutil::escape_log;

pub const PERMISSION_BUILD: &str = "CAN_BUILD";
pub const PERMISSION_SYSOP: &str = "CAN_SYSOP";

pub const DEFAULT_INVENTORY_CAPACITY: usize = 35;
const DEFAULT_CHANNELS: &str = "General";

/// Settings applied to characters created or restored by one world.
#[derive(Debug, Clone)]
pub struct CharacterDefaults {
    pub inventory_capacity: usize,
    /// Argon2 cost parameters for new hashes; `None` uses the library defaults.
    pub argon2: Option<Params>,
}

impl Default for CharacterDefaults {
    fn default() -> Self {
        Self {
            inventory_capacity: DEFAULT_INVENTORY_CAPACITY,
            argon2: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PronounType {
    Subjective,
    Objective,
    PossessiveAdjective,
    PossessiveAbsolute,
}

struct CharacterState {
    name: String,
    password_hash: String,
    attributes: AttributeBag,
    settings: HashMap<Setting, String>,
    temp: HashMap<String, String>,
    last_seen: Option<DateTime<Utc>>,
    conversation: Option<Conversation>,
    session: Option<Session>,
}

pub(crate) struct CharacterInner {
    id: String,
    registry: Arc<Registry>,
    argon2: Option<Params>,
    inventory: ObjectContainer,
    equipment: ObjectContainer,
    state: RwLock<CharacterState>,
}

/// Shared handle to a character. Clones refer to the same character.
#[derive(Clone)]
pub struct Character {
    inner: Arc<CharacterInner>,
}

#[derive(Clone)]
pub struct WeakCharacter(Weak<CharacterInner>);

impl WeakCharacter {
    pub fn upgrade(&self) -> Option<Character> {
        self.0.upgrade().map(|inner| Character { inner })
    }
}

fn parse_money(raw: &str) -> Result<f64, WorldError> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(WorldError::InvalidMoney(raw.to_string())),
    }
}

/// Largest cent count an `f64` holds exactly.
const MAX_CENTS: i64 = 1 << 53;

fn to_cents(amount: f64) -> Option<i64> {
    let cents = (amount * 100.0).round();
    if (amount * 100.0 - cents).abs() > 1e-6 || cents > MAX_CENTS as f64 {
        return None;
    }
    Some(cents as i64)
}

/// Amounts are whole cents, non-negative and finite.
fn check_amount(amount: f64) -> Result<i64, WorldError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(WorldError::InvalidMoney(amount.to_string()));
    }
    to_cents(amount).ok_or_else(|| WorldError::InvalidMoney(amount.to_string()))
}

/// Stored balance in cents, rounded the way it is displayed.
fn balance_cents(raw: &str) -> Result<i64, WorldError> {
    let balance = parse_money(raw)?;
    let cents = (balance * 100.0).round();
    if cents > MAX_CENTS as f64 {
        return Err(WorldError::InvalidMoney(raw.to_string()));
    }
    Ok(cents as i64)
}

fn format_cents(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

impl Character {
    /// New offline character, registered but not yet placed in any room.
    pub fn create(
        name: &str,
        password: &str,
        defaults: &CharacterDefaults,
        registry: Arc<Registry>,
    ) -> Result<Self, WorldError> {
        let password_hash = credentials::hash_password(password, defaults.argon2.as_ref())?;
        let mut attributes = AttributeBag::new(EntityKind::Character);
        attributes.set(Attribute::Channels, DEFAULT_CHANNELS)?;
        let character = Self::build(
            Uuid::new_v4().to_string(),
            CharacterState {
                name: name.trim().to_string(),
                password_hash,
                attributes,
                settings: HashMap::new(),
                temp: HashMap::new(),
                last_seen: None,
                conversation: None,
                session: None,
            },
            ObjectContainer::new(defaults.inventory_capacity),
            ObjectContainer::new(0),
            defaults.argon2.clone(),
            registry,
        );
        info!("character {} created", escape_log(&character.name()));
        Ok(character)
    }

    /// Rebuild a character from storage. Container contents are restored as
    /// stored; the caller indexes them once every object is registered.
    pub fn from_snapshot(
        snapshot: &CharacterSnapshot,
        defaults: &CharacterDefaults,
        registry: Arc<Registry>,
    ) -> Result<Self, WorldError> {
        if snapshot.schema_version != CHARACTER_SCHEMA_VERSION {
            return Err(WorldError::SchemaMismatch {
                entity: "character",
                expected: CHARACTER_SCHEMA_VERSION,
                found: snapshot.schema_version,
            });
        }
        Ok(Self::build(
            snapshot.id.clone(),
            CharacterState {
                name: snapshot.name.clone(),
                password_hash: snapshot.password_hash.clone(),
                attributes: AttributeBag::from_values(
                    EntityKind::Character,
                    snapshot.attributes.clone(),
                ),
                settings: snapshot.settings.clone(),
                temp: HashMap::new(),
                last_seen: snapshot.last_seen,
                conversation: None,
                session: None,
            },
            ObjectContainer::from_snapshot(&snapshot.inventory)?,
            ObjectContainer::from_snapshot(&snapshot.equipment)?,
            defaults.argon2.clone(),
            registry,
        ))
    }

    fn build(
        id: String,
        state: CharacterState,
        inventory: ObjectContainer,
        equipment: ObjectContainer,
        argon2: Option<Params>,
        registry: Arc<Registry>,
    ) -> Self {
        let character = Character {
            inner: Arc::new(CharacterInner {
                id,
                registry,
                argon2,
                inventory,
                equipment,
                state: RwLock::new(state),
            }),
        };
        for container in [&character.inner.inventory, &character.inner.equipment] {
            container.attach_parent(ContainerParent::Character(character.downgrade()));
        }
        character
            .inner
            .registry
            .register(&WorldObject::Character(character.clone()));
        character
    }

    pub fn snapshot(&self) -> CharacterSnapshot {
        let state = read(&self.inner.state);
        CharacterSnapshot {
            id: self.inner.id.clone(),
            name: state.name.clone(),
            password_hash: state.password_hash.clone(),
            attributes: state.attributes.values().clone(),
            settings: state.settings.clone(),
            inventory: self.inner.inventory.snapshot(),
            equipment: self.inner.equipment.snapshot(),
            last_seen: state.last_seen,
            schema_version: CHARACTER_SCHEMA_VERSION,
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn name(&self) -> String {
        read(&self.inner.state).name.clone()
    }

    /// "Aria <the Bold>" when a title is set, otherwise just the name.
    pub fn formatted_name_with_title(&self) -> String {
        let state = read(&self.inner.state);
        let title = state.attributes.get(Attribute::Title);
        if title.is_empty() {
            state.name.clone()
        } else {
            format!("{} <{}>", state.name, title)
        }
    }

    pub fn check_password(&self, password: &str) -> bool {
        let stored = read(&self.inner.state).password_hash.clone();
        credentials::verify_password(&stored, password)
    }

    pub fn set_password(&self, password: &str) -> Result<(), WorldError> {
        let hash = credentials::hash_password(password, self.inner.argon2.as_ref())?;
        write(&self.inner.state).password_hash = hash;
        Ok(())
    }

    pub fn password_fingerprint(&self) -> String {
        credentials::fingerprint(&read(&self.inner.state).password_hash)
    }

    pub fn inventory(&self) -> &ObjectContainer {
        &self.inner.inventory
    }

    pub fn equipment(&self) -> &ObjectContainer {
        &self.inner.equipment
    }

    pub(crate) fn registry(&self) -> &Arc<Registry> {
        &self.inner.registry
    }

    pub fn session(&self) -> Option<Session> {
        read(&self.inner.state).session.clone()
    }

    pub fn client(&self) -> Option<Arc<dyn ClientActions>> {
        read(&self.inner.state)
            .session
            .as_ref()
            .map(|s| s.client().clone())
    }

    pub fn online(&self) -> bool {
        read(&self.inner.state).session.is_some()
    }

    pub fn conversation(&self) -> Option<Conversation> {
        read(&self.inner.state).conversation.clone()
    }

    /// Start a conversation, cancelling any previous one.
    pub fn set_conversation(&self, conversation: Conversation) {
        let previous = write(&self.inner.state).conversation.replace(conversation);
        if let Some(previous) = previous {
            previous.cancel();
        }
    }

    pub fn cancel_conversation(&self) {
        let current = write(&self.inner.state).conversation.take();
        if let Some(current) = current {
            current.cancel();
        }
    }

    /// Room this character is standing in, via the membership index.
    pub fn room(&self) -> Option<Room> {
        self.inner.registry.room_of(&self.inner.id)
    }

    pub fn last_seen(&self) -> Option<DateTime<Utc>> {
        read(&self.inner.state).last_seen
    }

    pub fn set_last_seen(&self, seen: DateTime<Utc>) {
        write(&self.inner.state).last_seen = Some(seen);
    }

    /// Attach `session` and run the entry sequence. Fails without attaching
    /// when the character's room cannot be resolved.
    pub fn login(&self, session: Session) -> Result<(), WorldError> {
        let name = self.name();
        let room = self.room();
        let Some((room, area)) = room.and_then(|r| r.area().map(|a| (r, a))) else {
            error!("character {} logged into a missing room", escape_log(&name));
            return Err(WorldError::DataIntegrity(format!(
                "character {} has no room to log into",
                name
            )));
        };

        let previous = {
            let mut state = write(&self.inner.state);
            state.session = Some(session.clone());
            state.last_seen.replace(Utc::now())
        };
        let client = session.client();
        let seen = match previous {
            Some(at) => format!(
                "You last logged in at {} (server time).",
                at.format("%a %b %-d %Y %H:%M:%S UTC")
            ),
            None => "Welcome! This is your first time here.".to_string(),
        };
        log_delivery(&name, "last-seen notice", client.show_text(&seen));
        log_delivery(&name, "room description", client.show_text(&room.look(self)));

        let notice = format!("{} connected and appeared here with you.", name);
        for other in room.online_characters(Some(self)) {
            if let Some(c) = other.client() {
                log_delivery(&other.name(), "connect notice", c.show_text(&notice));
            }
        }

        area.on_character_entered(self);
        room.on_character_entered(self);
        log_delivery(&name, "client sync", client.sync_all(&self.client_sync()));

        info!("character {} entered the game", escape_log(&name));
        Ok(())
    }

    /// Detach the session. Transient state is cleared even when the room is
    /// missing, in which case occupants are not notified and an error is returned.
    pub fn logout(&self) -> Result<(), WorldError> {
        let name = self.name();
        let located = self.room().and_then(|r| r.area().map(|a| (r, a)));
        let result = match located {
            Some((room, area)) => {
                let notice = format!("{} disconnected and is no longer here with you.", name);
                for other in room.online_characters(Some(self)) {
                    if let Some(c) = other.client() {
                        log_delivery(&other.name(), "disconnect notice", c.show_text(&notice));
                    }
                }
                area.on_character_left(self);
                room.on_character_left(self);
                Ok(())
            }
            None => {
                error!("character {} logged out of a missing room", escape_log(&name));
                Err(WorldError::DataIntegrity(format!(
                    "character {} has no room to log out of",
                    name
                )))
            }
        };

        let conversation = {
            let mut state = write(&self.inner.state);
            state.temp.clear();
            state.session = None;
            state.conversation.take()
        };
        if let Some(conversation) = conversation {
            conversation.cancel();
        }
        info!("character {} left the game", escape_log(&name));
        result
    }

    /// Transient attribute, empty when unset.
    pub fn temp_attribute(&self, name: &str) -> String {
        read(&self.inner.state)
            .temp
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_temp_attribute(&self, name: &str, value: &str) {
        write(&self.inner.state)
            .temp
            .insert(name.to_string(), value.to_string());
    }

    pub fn remove_temp_attribute(&self, name: &str) -> Option<String> {
        write(&self.inner.state).temp.remove(name)
    }

    pub fn attribute(&self, name: &str) -> String {
        read(&self.inner.state).attributes.get_by_name(name)
    }

    /// Whitelisted write. Money must be a non-negative number.
    pub fn set_attribute(&self, name: &str, value: &str) -> Result<(), WorldError> {
        if Attribute::parse(name) == Some(Attribute::Money) {
            let amount = parse_money(value)?;
            return write(&self.inner.state)
                .attributes
                .set(Attribute::Money, format!("{:.2}", amount));
        }
        write(&self.inner.state).attributes.set_by_name(name, value)
    }

    pub fn money(&self) -> f64 {
        let raw = read(&self.inner.state).attributes.get(Attribute::Money);
        match parse_money(&raw) {
            Ok(v) => v,
            Err(e) => {
                error!("character {}: {}", escape_log(&self.name()), e);
                0.0
            }
        }
    }

    /// Debit `amount` if the balance covers it. Check and write happen under one lock.
    pub fn debit(&self, amount: f64) -> Result<f64, WorldError> {
        let amount = check_amount(amount)?;
        let balance = {
            let mut state = write(&self.inner.state);
            let current = balance_cents(&state.attributes.get(Attribute::Money))?;
            if amount > current {
                return Err(WorldError::InsufficientFunds);
            }
            let balance = current - amount;
            state.attributes.set(Attribute::Money, format_cents(balance))?;
            balance as f64 / 100.0
        };
        self.push_money(balance);
        Ok(balance)
    }

    /// True when the character could afford `amount` and it was taken.
    pub fn remove_money(&self, amount: f64) -> bool {
        self.debit(amount).is_ok()
    }

    pub fn add_money(&self, amount: f64) -> Result<f64, WorldError> {
        let amount = check_amount(amount)?;
        let balance = {
            let mut state = write(&self.inner.state);
            let current = balance_cents(&state.attributes.get(Attribute::Money))?;
            let balance = current
                .checked_add(amount)
                .filter(|b| *b <= MAX_CENTS)
                .ok_or_else(|| {
                    WorldError::InvalidMoney(format!("balance over {}", format_cents(MAX_CENTS)))
                })?;
            state.attributes.set(Attribute::Money, format_cents(balance))?;
            balance as f64 / 100.0
        };
        self.push_money(balance);
        Ok(balance)
    }

    fn push_money(&self, balance: f64) {
        if let Some(client) = self.client() {
            log_delivery(&self.name(), "money", client.sync_money(balance));
        }
    }

    pub fn setting(&self, setting: Setting) -> String {
        read(&self.inner.state)
            .settings
            .get(&setting)
            .filter(|v| !v.is_empty())
            .cloned()
            .unwrap_or_else(|| setting.default_value().to_string())
    }

    pub fn set_setting(&self, name: &str, value: &str) -> Result<(), WorldError> {
        let setting =
            Setting::parse(name).ok_or_else(|| WorldError::InvalidSetting(name.to_string()))?;
        write(&self.inner.state)
            .settings
            .insert(setting, value.to_string());
        Ok(())
    }

    /// Every setting with defaults filled in, as a JSON object.
    pub fn settings_json(&self) -> String {
        let map: serde_json::Map<String, serde_json::Value> = Setting::ALL
            .into_iter()
            .map(|s| (s.as_str().to_string(), serde_json::Value::String(self.setting(s))))
            .collect();
        serde_json::Value::Object(map).to_string()
    }

    pub fn permissions(&self) -> Vec<String> {
        read(&self.inner.state)
            .attributes
            .get(Attribute::Permissions)
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions()
            .iter()
            .any(|p| p.eq_ignore_ascii_case(permission))
    }

    fn channel_names(attributes: &AttributeBag) -> Vec<String> {
        attributes
            .get(Attribute::Channels)
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn channels(&self) -> Vec<&'static Channel> {
        let names = Self::channel_names(&read(&self.inner.state).attributes);
        names.iter().filter_map(|n| channel_by_name(n)).collect()
    }

    pub fn in_channel(&self, channel: &Channel) -> bool {
        Self::channel_names(&read(&self.inner.state).attributes)
            .iter()
            .any(|n| n.eq_ignore_ascii_case(channel.name))
    }

    /// Returns false if already a member.
    pub fn join_channel(&self, channel: &Channel) -> bool {
        let mut state = write(&self.inner.state);
        let mut names = Self::channel_names(&state.attributes);
        if names.iter().any(|n| n.eq_ignore_ascii_case(channel.name)) {
            return false;
        }
        names.push(channel.name.to_string());
        state
            .attributes
            .set(Attribute::Channels, names.join(","))
            .is_ok()
    }

    /// Returns false if not a member.
    pub fn leave_channel(&self, channel: &Channel) -> bool {
        let mut state = write(&self.inner.state);
        let mut names = Self::channel_names(&state.attributes);
        let before = names.len();
        names.retain(|n| !n.eq_ignore_ascii_case(channel.name));
        if names.len() == before {
            return false;
        }
        state
            .attributes
            .set(Attribute::Channels, names.join(","))
            .is_ok()
    }

    pub fn pronoun(&self, kind: PronounType) -> &'static str {
        let gender = read(&self.inner.state).attributes.get(Attribute::Gender);
        match (gender.to_ascii_lowercase().as_str(), kind) {
            ("male", PronounType::Subjective) => "he",
            ("male", PronounType::Objective) => "him",
            ("male", _) => "his",
            ("female", PronounType::Subjective) => "she",
            ("female", PronounType::PossessiveAbsolute) => "hers",
            ("female", _) => "her",
            (_, PronounType::Subjective) => "they",
            (_, PronounType::Objective) => "them",
            (_, PronounType::PossessiveAdjective) => "their",
            (_, PronounType::PossessiveAbsolute) => "theirs",
        }
    }

    fn entries(&self, container: &ObjectContainer) -> Vec<InventoryEntry> {
        container
            .items()
            .iter()
            .filter_map(|id| {
                let item = self.inner.registry.item(id)?;
                let slot = container.slot_of(id)?;
                Some(InventoryEntry {
                    id: id.clone(),
                    name: item.name(),
                    picture: item.attribute("picture"),
                    slot,
                    equip_slot: item.equip_slot(),
                    rarity: item.rarity(),
                })
            })
            .collect()
    }

    pub fn inventory_entries(&self) -> Vec<InventoryEntry> {
        self.entries(&self.inner.inventory)
    }

    pub fn equipment_entries(&self) -> Vec<InventoryEntry> {
        self.entries(&self.inner.equipment)
    }

    pub fn player_info(&self) -> PlayerInfo {
        let (name, title, picture) = {
            let state = read(&self.inner.state);
            (
                state.name.clone(),
                state.attributes.get(Attribute::Title),
                state.attributes.get(Attribute::Picture),
            )
        };
        PlayerInfo {
            name,
            title,
            picture,
            password_fingerprint: self.password_fingerprint(),
        }
    }

    pub fn client_sync(&self) -> ClientSync {
        ClientSync {
            inventory: self.inventory_entries(),
            equipment: self.equipment_entries(),
            permissions: self.permissions(),
            player: self.player_info(),
            money: self.money(),
            settings: self.settings_json(),
        }
    }

    /// Push inventory and equipment to the client, if online.
    pub fn sync_inventory(&self) {
        if let Some(client) = self.client() {
            log_delivery(
                &self.name(),
                "inventory",
                client.sync_inventory(&self.inventory_entries(), &self.equipment_entries()),
            );
        }
    }

    pub fn editor_data(&self) -> ObjectEditorData {
        let state = read(&self.inner.state);
        ObjectEditorData {
            id: self.inner.id.clone(),
            name: state.name.clone(),
            object_type: EntityKind::Character.as_str(),
            properties: EntityKind::Character
                .valid_attributes()
                .iter()
                .map(|attr| EditorProperty {
                    name: attr.as_str().to_string(),
                    value: state.attributes.get(*attr),
                })
                .collect(),
        }
    }

    pub(crate) fn downgrade(&self) -> WeakCharacter {
        WeakCharacter(Arc::downgrade(&self.inner))
    }
}

impl PartialEq for Character {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Character")
            .field("id", &self.inner.id)
            .field("name", &self.name())
            .field("online", &self.online())
            .finish()
    }
}
