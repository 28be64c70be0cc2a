//! Walking and teleporting through the starter area with observers online.
mod common;

use common::{online, starter_world, Event, RecordingClient};
use meshmud::world::{
    Coords, Direction, Location, Session, SoundEffect, WorldError, STARTER_AREA, TRAIN_TRACKS,
};

fn north_road() -> Location {
    Location::new(STARTER_AREA, Coords::new(0, 1, 0, 0))
}

#[test]
fn walking_notifies_origin_destination_and_mover() {
    let world = starter_world();
    let (aria, aria_client) = online(&world, "Aria");
    let (bram, bram_client) = online(&world, "Bram");

    let cole = world.create_character("Cole", "correct horse").unwrap();
    world.teleport(&cole, &north_road()).unwrap();
    let cole_client = RecordingClient::new();
    cole.login(Session::new(cole_client.clone())).unwrap();

    aria_client.clear();
    bram_client.clear();
    cole_client.clear();

    let road = world.walk(&aria, Direction::North).unwrap();

    assert_eq!(road.title(), "North Road");
    assert_eq!(aria.room(), Some(road.clone()));
    assert_eq!(bram_client.texts(), vec!["Aria walks to the north.".to_string()]);
    assert_eq!(
        cole_client.texts(),
        vec!["Aria walked in from the south.".to_string()]
    );
    assert_eq!(aria_client.texts(), vec!["You walk to the north.".to_string()]);
    assert!(bram_client
        .events()
        .contains(&Event::Sfx(SoundEffect::Footsteps)));
    assert!(aria_client
        .events()
        .iter()
        .any(|e| matches!(e, Event::Location(l) if l.title == "North Road")));
}

#[test]
fn offline_observers_and_movers_are_silent() {
    let world = starter_world();
    let (_bram, bram_client) = online(&world, "Bram");
    let dara = world.create_character("Dara", "correct horse").unwrap();
    bram_client.clear();

    world.walk(&dara, Direction::East).unwrap();

    assert_eq!(dara.room().map(|r| r.title()), Some("Market Street".to_string()));
    assert!(bram_client.events().is_empty());
}

#[test]
fn tracks_and_missing_exits_are_refused() {
    let world = starter_world();
    let (aria, aria_client) = online(&world, "Aria");
    let start = aria.room().unwrap();
    aria_client.clear();

    let err = world.walk(&aria, Direction::South).unwrap_err();
    assert!(matches!(err, WorldError::MoveDenied(ref reason) if reason == TRAIN_TRACKS));

    let err = world.walk(&aria, Direction::West).unwrap_err();
    assert!(matches!(err, WorldError::MoveDenied(_)));

    assert_eq!(aria.room(), Some(start));
    assert!(aria_client.events().is_empty());
}

#[test]
fn ghosts_may_cross_the_tracks() {
    let world = starter_world();
    let (aria, _client) = online(&world, "Aria");
    aria.set_temp_attribute("ghost", "true");

    let room = world.walk(&aria, Direction::South).unwrap();
    assert_eq!(room.title(), "Railway Crossing");
}

#[test]
fn walking_up_uses_vertical_phrasing() {
    let world = starter_world();
    let (aria, _aria_client) = online(&world, "Aria");
    let (_bram, bram_client) = online(&world, "Bram");
    bram_client.clear();

    world.walk(&aria, Direction::Up).unwrap();

    assert_eq!(bram_client.texts(), vec!["Aria walks up.".to_string()]);
}

#[test]
fn teleport_announces_in_both_rooms() {
    let world = starter_world();
    let (aria, aria_client) = online(&world, "Aria");
    let (_bram, bram_client) = online(&world, "Bram");
    aria_client.clear();
    bram_client.clear();

    world.teleport(&aria, &north_road()).unwrap();

    assert_eq!(bram_client.texts(), vec!["Aria teleported away.".to_string()]);
    assert_eq!(aria_client.texts(), vec!["You teleported.".to_string()]);
    assert!(aria_client.events().contains(&Event::Sfx(SoundEffect::Teleport)));

    let err = world
        .teleport(&aria, &Location::new("Nowhere", Coords::default()))
        .unwrap_err();
    assert!(matches!(err, WorldError::NotFound(_)));
}

#[test]
fn open_editor_follows_the_mover() {
    let world = starter_world();
    let (aria, aria_client) = online(&world, "Aria");
    aria.set_temp_attribute("editorOpen", "true");
    aria_client.clear();

    world.walk(&aria, Direction::North).unwrap();

    assert!(aria_client
        .events()
        .iter()
        .any(|e| matches!(e, Event::Editor(_))));
}
