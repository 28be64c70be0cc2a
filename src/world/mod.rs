//! Live world state: areas and rooms, characters, items, the containers that
//! hold them, movement between rooms, and chat channels.
//!
//! Every live object is a cheap cloneable handle over shared state, so the
//! same character can be reached from its room, the character manager and the
//! object registry at once. The [`Registry`] records which container each
//! object currently sits in; [`World`] ties the pieces together and converts
//! to and from the plain snapshots persisted by [`WorldStore`].

pub mod area;
pub mod attributes;
pub mod channel;
pub mod character;
pub mod characters;
pub mod client;
pub mod container;
pub mod conversation;
pub mod coords;
pub mod credentials;
pub mod errors;
pub(crate) mod guard;
pub mod items;
pub mod movement;
pub mod registry;
pub mod seed;
pub mod snapshot;
pub mod state;
pub mod storage;
pub mod text;

pub use area::{Area, Room, WeakRoom};
pub use attributes::{Attribute, AttributeBag, EntityKind, Setting};
pub use channel::{channel_by_name, channels, BroadcastReport, Channel};
pub use character::{
    Character, CharacterDefaults, PronounType, WeakCharacter, PERMISSION_BUILD, PERMISSION_SYSOP,
};
pub use characters::CharacterManager;
pub use client::{
    ClientActions, ClientError, ClientSync, Delivery, EditorProperty, InventoryEntry,
    LocationData, Minimap, MinimapRoom, ObjectEditorData, PlayerInfo, Session, SoundEffect,
};
pub use container::{ContainerParent, ContainerParentKind, KeyedInsert, ObjectContainer, Slot};
pub use conversation::Conversation;
pub use coords::{Coords, Direction, Location};
pub use errors::WorldError;
pub use items::{Item, WeakItem};
pub use movement::{MoveMessages, MoveVerdict, CANNOT_MOVE_THAT_WAY, TRAIN_TRACKS};
pub use registry::{ObjectType, Registry, WorldObject};
pub use seed::{starter_area, STARTER_AREA};
pub use snapshot::{
    AreaSnapshot, CharacterSnapshot, ContainerSnapshot, ItemSnapshot, RoomSnapshot,
    WorldSnapshot,
};
pub use state::{World, WorldSettings};
pub use storage::{WorldStore, WorldStoreBuilder};
pub use text::{Color, TextType};
