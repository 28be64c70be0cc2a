//! Channel fan-out and character balances as seen by connected clients.
mod common;

use common::{online, starter_world, Event};
use meshmud::world::{channel_by_name, Color, WorldError};

#[test]
fn general_broadcast_reaches_only_online_subscribers() {
    let world = starter_world();
    let general = channel_by_name("general").unwrap();

    let (aria, aria_client) = online(&world, "Aria");
    let (_bram, bram_client) = online(&world, "Bram");
    let (cole, cole_client) = online(&world, "Cole");
    let (_eve, eve_client) = online(&world, "Eve");
    let dara = world.create_character("Dara", "correct horse").unwrap();
    assert!(cole.leave_channel(general));
    eve_client.break_connection();
    for c in [&aria_client, &bram_client, &cole_client] {
        c.clear();
    }

    let report = general.broadcast(world.characters(), Some(&aria), "hello there");

    assert_eq!(report.delivered, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(
        bram_client.events(),
        vec![Event::Colored(
            "[General] Aria says, \"Hello there.\"".to_string(),
            Color::Yellow
        )]
    );
    assert_eq!(
        aria_client.texts(),
        vec!["[General] You say, \"Hello there.\"".to_string()]
    );
    assert!(cole_client.events().is_empty());
    assert!(!dara.online());
}

#[test]
fn titles_and_questions_shape_the_line() {
    let world = starter_world();
    let general = channel_by_name("General").unwrap();
    let (aria, _aria_client) = online(&world, "Aria");
    let (_bram, bram_client) = online(&world, "Bram");
    aria.set_attribute("title", "the Bold").unwrap();
    bram_client.clear();

    general.broadcast(world.characters(), Some(&aria), "anyone around?");

    assert_eq!(
        bram_client.texts(),
        vec!["[General] Aria <the Bold> asks, \"Anyone around?\"".to_string()]
    );
}

#[test]
fn system_announcement_has_no_sender_echo() {
    let world = starter_world();
    let general = channel_by_name("General").unwrap();
    let (_aria, aria_client) = online(&world, "Aria");
    aria_client.clear();

    let report = general.broadcast(world.characters(), None, "The server restarts soon.");

    assert_eq!(report.delivered, 1);
    assert_eq!(
        aria_client.texts(),
        vec!["[General] The server restarts soon.".to_string()]
    );
}

#[test]
fn restricted_channels_need_permission() {
    let world = starter_world();
    let core = channel_by_name("core").unwrap();
    let (aria, _client) = online(&world, "Aria");

    assert!(!core.has_permission(&aria));
    aria.set_attribute("permissions", "CAN_SYSOP").unwrap();
    assert!(core.has_permission(&aria));
    assert!(aria.join_channel(core));
    assert!(!aria.join_channel(core));
    assert!(aria.in_channel(core));
}

#[test]
fn balance_changes_are_pushed_to_the_client() {
    let world = starter_world();
    let (aria, client) = online(&world, "Aria");
    assert_eq!(aria.money(), 0.0);
    client.clear();

    aria.set_attribute("money", "10").unwrap();
    assert_eq!(aria.attribute("money"), "10.00");

    assert_eq!(aria.add_money(5.0).unwrap(), 15.0);
    assert!(aria.remove_money(10.0));
    assert_eq!(aria.money(), 5.0);
    assert!(!aria.remove_money(20.0));
    assert_eq!(aria.money(), 5.0);
    assert!(matches!(aria.debit(-1.0), Err(WorldError::InvalidMoney(_))));
    assert!(matches!(aria.debit(6.0), Err(WorldError::InsufficientFunds)));

    let pushes = client
        .events()
        .into_iter()
        .filter(|e| *e == Event::Sync("money"))
        .count();
    assert_eq!(pushes, 2);
}
