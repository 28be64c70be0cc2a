use thiserror::Error;

/// Errors that can arise while mutating live world state or its snapshot store.
#[derive(Debug, Error)]
pub enum WorldError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around bincode serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Wrapper around IO errors (directory creation, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A slotted container has no free slot left.
    #[error("container is full ({capacity} slots)")]
    CapacityExceeded { capacity: usize },

    /// Keyed insert rejected because the slot already holds an object.
    #[error("slot already occupied: {0}")]
    SlotOccupied(String),

    /// Slot kind does not match the container (key on a slotted container, index out of range).
    #[error("invalid slot: {0}")]
    InvalidSlot(String),

    /// Returned when an object, room, area or character is not present.
    #[error("not found: {0}")]
    NotFound(String),

    /// Permanent attribute write outside the per-kind whitelist.
    #[error("attribute name is invalid for {kind}: {name}")]
    InvalidAttribute { kind: &'static str, name: String },

    /// Setting write outside the settings whitelist.
    #[error("setting name is invalid: {0}")]
    InvalidSetting(String),

    /// Debit larger than the current balance.
    #[error("insufficient funds")]
    InsufficientFunds,

    /// Money attribute could not be parsed, or a negative amount was supplied.
    #[error("invalid money value: {0}")]
    InvalidMoney(String),

    /// Movement policy refused the move; carries the user-facing reason.
    #[error("{0}")]
    MoveDenied(String),

    /// Another relocation of the same object has not finished yet.
    #[error("object is already being moved: {0}")]
    InTransit(String),

    /// Character name already taken.
    #[error("character already exists: {0}")]
    DuplicateCharacter(String),

    /// Area name already taken.
    #[error("area already exists: {0}")]
    DuplicateArea(String),

    /// Another room already sits at these coordinates in the area.
    #[error("room already exists at {0}")]
    DuplicateRoom(String),

    /// Stored state contradicts itself (missing login room, object lost between containers).
    #[error("data integrity violation: {0}")]
    DataIntegrity(String),

    /// Argon2 hashing or PHC-string parsing failure.
    #[error("password hash failure: {0}")]
    PasswordHash(String),

    /// Returned when deserializing a record with an unexpected schema version.
    #[error("schema mismatch for {entity}: expected {expected}, got {found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },
}

impl WorldError {
    /// True for errors that mean stored or in-memory state is corrupt rather than
    /// a caller mistake.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, WorldError::DataIntegrity(_))
    }
}
