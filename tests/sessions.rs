//! Login and logout sequences.
mod common;

use common::{online, starter_world, Event, RecordingClient};
use meshmud::world::{Conversation, Session, WorldError};

#[test]
fn first_login_welcomes_and_syncs() {
    let world = starter_world();
    let (_bram, bram_client) = online(&world, "Bram");
    bram_client.clear();

    let (aria, aria_client) = online(&world, "Aria");

    assert!(aria.online());
    assert!(aria.last_seen().is_some());
    let texts = aria_client.texts();
    assert_eq!(texts[0], "Welcome! This is your first time here.");
    assert!(texts[1].starts_with("Town Square"));
    assert!(texts[1].contains("Bram"));
    assert_eq!(
        bram_client.texts(),
        vec!["Aria connected and appeared here with you.".to_string()]
    );

    let events = aria_client.events();
    assert!(events.contains(&Event::Map("Homeland".to_string())));
    for part in ["inventory", "permissions", "player", "money", "commands", "settings"] {
        assert!(events.contains(&Event::Sync(part)), "missing {} sync", part);
    }
}

#[test]
fn returning_login_reports_last_visit() {
    let world = starter_world();
    let (aria, _client) = online(&world, "Aria");
    aria.logout().unwrap();

    let client = RecordingClient::new();
    aria.login(Session::new(client.clone())).unwrap();

    assert!(client.texts()[0].starts_with("You last logged in at "));
}

#[test]
fn logout_notifies_and_clears_transient_state() {
    let world = starter_world();
    let (aria, _aria_client) = online(&world, "Aria");
    let (bram, bram_client) = online(&world, "Bram");
    let conversation = Conversation::new(bram.id());
    aria.set_conversation(conversation.clone());
    aria.set_temp_attribute("replyTo", "Bram");
    bram_client.clear();

    aria.logout().unwrap();

    assert!(!aria.online());
    assert!(aria.conversation().is_none());
    assert!(conversation.is_cancelled());
    assert_eq!(aria.temp_attribute("replyTo"), "");
    assert_eq!(
        bram_client.texts(),
        vec!["Aria disconnected and is no longer here with you.".to_string()]
    );
    // Still standing in the room while offline.
    assert!(aria.room().is_some());
}

#[test]
fn login_without_a_room_is_refused() {
    let world = starter_world();
    let drifter = world.characters().create("Drifter", "correct horse").unwrap();
    let client = RecordingClient::new();

    let err = drifter.login(Session::new(client.clone())).unwrap_err();

    assert!(matches!(err, WorldError::DataIntegrity(_)));
    assert!(err.is_integrity_violation());
    assert!(!drifter.online());
    assert!(client.events().is_empty());
}

#[test]
fn duplicate_names_are_rejected_case_insensitively() {
    let world = starter_world();
    world.create_character("Aria", "correct horse").unwrap();
    let err = world.create_character("aria", "correct horse").unwrap_err();
    assert!(matches!(err, WorldError::DuplicateCharacter(_)));
    assert_eq!(world.characters().len(), 1);
    assert!(world.characters().by_name("ARIA").is_some());
}
