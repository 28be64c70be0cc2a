//! Cross-container relocation.
//!
//! A move is two independently locked container steps followed by one
//! membership-index update, all under the object's transit claim. The steps
//! are not a transaction: another thread can see the object in both or neither
//! container for the instant between them. Item moves take the destination
//! slot first, so a full destination leaves them where they were; a character
//! that cannot be added after leaving its room is a data-integrity failure.

use log::{debug, error, warn};

use super::area::Room;
use super::attributes::{TEMP_EDITOR_OPEN, TEMP_GHOST};
use super::character::Character;
use super::client::{log_delivery, SoundEffect};
use super::container::{ObjectContainer, Slot};
use super::coords::Direction;
use super::errors::WorldError;
use super::registry::Registry;
use crate::logutil::escape_log;

pub const CANNOT_MOVE_THAT_WAY: &str = "You cannot move that way.";
pub const TRAIN_TRACKS: &str = "You cannot walk onto the train tracks!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveVerdict {
    Allowed,
    Denied(String),
}

impl MoveVerdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, MoveVerdict::Allowed)
    }
}

/// The three lines a move produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveMessages {
    pub to_mover: String,
    pub to_origin: String,
    pub to_destination: String,
}

impl MoveMessages {
    pub fn walk(name: &str, direction: Direction) -> Self {
        let toward = direction.toward_phrase("to the");
        Self {
            to_mover: format!("You walk {}.", toward),
            to_origin: format!("{} walks {}.", name, toward),
            to_destination: format!(
                "{} walked in {}.",
                name,
                direction.opposite().from_phrase("from the")
            ),
        }
    }

    pub fn teleport(name: &str) -> Self {
        Self {
            to_mover: "You teleported.".to_string(),
            to_origin: format!("{} teleported away.", name),
            to_destination: format!("{} teleported in and appeared here with you.", name),
        }
    }
}

fn index_out_of_step(id: &str, e: &WorldError) -> WorldError {
    error!("membership index out of step for {}: {}", id, e);
    WorldError::DataIntegrity(format!("object {} is not in its indexed container", id))
}

/// Move object `id` into the lowest free slot of `to`.
///
/// With `reserve` the destination slot is reserved before the object leaves
/// its origin, so a refusal changes nothing and is returned as is. Without it
/// the object leaves first, and a refusal is a data-integrity error that
/// leaves the object unindexed. Concurrent moves of the same object are
/// refused with [`WorldError::InTransit`] until this one finishes.
pub(crate) fn relocate(
    registry: &Registry,
    id: &str,
    to: &ObjectContainer,
    reserve: bool,
) -> Result<Slot, WorldError> {
    let transit = registry.begin_transit(id)?;
    let origin = transit.from().filter(|c| !c.same_as(to));

    let slot = if reserve {
        let slot = to.add(id)?;
        if let Some(origin) = origin {
            if let Err(e) = origin.remove(id) {
                if let Err(undo) = to.remove(id) {
                    warn!("could not release reserved slot for {}: {}", id, undo);
                }
                return Err(index_out_of_step(id, &e));
            }
        }
        slot
    } else {
        if let Some(origin) = origin {
            origin.remove(id).map_err(|e| index_out_of_step(id, &e))?;
        }
        match to.add(id) {
            Ok(slot) => slot,
            Err(e) => {
                error!("could not add {} to its destination: {}", id, e);
                registry.set_container(id, None);
                return Err(WorldError::DataIntegrity(format!(
                    "object {} removed from its origin but refused by its destination: {}",
                    id, e
                )));
            }
        }
    };

    registry.set_container(id, Some(to));
    debug!("relocated {} to {:?} at {}", id, to.id(), slot);
    Ok(slot)
}

impl Character {
    /// Movement policy. `None` means there is nothing in that direction.
    pub fn move_allowed(&self, destination: Option<&Room>) -> MoveVerdict {
        let Some(room) = destination else {
            return MoveVerdict::Denied(CANNOT_MOVE_THAT_WAY.to_string());
        };
        if !self.temp_attribute(TEMP_GHOST).is_empty() {
            return MoveVerdict::Allowed;
        }
        if room.room_type() == "track" {
            return MoveVerdict::Denied(TRAIN_TRACKS.to_string());
        }
        MoveVerdict::Allowed
    }

    /// Move into `to` without policy checks and tell everyone who should know.
    /// A character whose room no longer exists is moved as if it were already
    /// standing in `to`, so staff can always rescue it.
    pub fn move_to(
        &self,
        to: &Room,
        messages: &MoveMessages,
        sfx: Option<SoundEffect>,
    ) -> Result<(), WorldError> {
        let (origin, recovered) = match self.room() {
            Some(room) => (room, false),
            None => {
                warn!(
                    "character {} has no current room; moving from destination",
                    escape_log(&self.name())
                );
                (to.clone(), true)
            }
        };

        relocate(self.registry(), self.id(), to.here(), false)?;

        let Some(client) = self.client() else {
            return Ok(());
        };

        if !recovered {
            for other in origin.online_characters(Some(self)) {
                if let Some(c) = other.client() {
                    log_delivery(&other.name(), "departure", c.show_text(&messages.to_origin));
                    if let Some(s) = sfx {
                        log_delivery(&other.name(), "departure cue", c.play_sfx(s));
                    }
                }
            }
        }
        for other in to.online_characters(Some(self)) {
            if let Some(c) = other.client() {
                log_delivery(&other.name(), "arrival", c.show_text(&messages.to_destination));
                if let Some(s) = sfx {
                    log_delivery(&other.name(), "arrival cue", c.play_sfx(s));
                }
            }
        }
        let name = self.name();
        log_delivery(&name, "move confirmation", client.show_text(&messages.to_mover));
        if let Some(s) = sfx {
            log_delivery(&name, "move cue", client.play_sfx(s));
        }

        match (origin.area(), to.area()) {
            (Some(old), Some(new)) if old == new => {}
            (old, new) => {
                if let Some(old) = old {
                    old.on_character_left(self);
                }
                if let Some(new) = new {
                    new.on_character_entered(self);
                }
            }
        }
        if !recovered {
            origin.on_character_left(self);
        }
        to.on_character_entered(self);

        self.cancel_conversation();
        if self.temp_attribute(TEMP_EDITOR_OPEN) == "true" {
            log_delivery(&name, "object editor", client.show_object_editor(&to.editor_data()));
        }
        Ok(())
    }
}
