//! Many threads shuffling characters and items at once must never leave an
//! object in two containers, or out of step with the membership index.
mod common;

use std::sync::Arc;
use std::thread;

use common::{online, starter_world, test_settings};
use meshmud::world::{
    starter_area, Character, Direction, Item, ObjectContainer, World, WorldError, WorldSnapshot,
};
use rand::Rng;

const WALKERS: usize = 4;
const ITEMS: usize = 12;
const ROUNDS: usize = 150;

fn containers(world: &World) -> Vec<ObjectContainer> {
    let mut all: Vec<ObjectContainer> = world
        .areas()
        .iter()
        .flat_map(|a| a.rooms())
        .map(|r| r.here().clone())
        .collect();
    for c in world.characters().characters() {
        all.push(c.inventory().clone());
        all.push(c.equipment().clone());
    }
    all
}

fn holders(world: &World, id: &str) -> Vec<ObjectContainer> {
    containers(world)
        .into_iter()
        .filter(|c| c.contains(id))
        .collect()
}

#[test]
fn concurrent_walks_and_transfers_keep_containment() {
    let world = Arc::new(starter_world());
    let walkers: Vec<Character> = (0..WALKERS)
        .map(|i| online(&world, &format!("Walker{}", i)).0)
        .collect();
    let start = world.start_room().unwrap();
    let items: Vec<Item> = (0..ITEMS)
        .map(|i| {
            let item = world.create_item(&format!("Pebble {}", i));
            world.move_item(item.id(), start.here()).unwrap();
            item
        })
        .collect();

    let handles: Vec<_> = walkers
        .iter()
        .cloned()
        .map(|me| {
            let world = Arc::clone(&world);
            let items = items.clone();
            thread::spawn(move || {
                let mut rng = rand::thread_rng();
                let dirs = [Direction::North, Direction::East, Direction::Up];
                for _ in 0..ROUNDS {
                    let dir = dirs[rng.gen_range(0..dirs.len())];
                    if world.walk(&me, dir).is_ok() {
                        world.walk(&me, dir.opposite()).unwrap();
                    }
                    let item = &items[rng.gen_range(0..items.len())];
                    let result = if rng.gen_bool(0.5) {
                        world.pick_up(&me, item.id()).map(|_| ())
                    } else {
                        world.drop_item(&me, item.id()).map(|_| ())
                    };
                    match result {
                        Ok(())
                        | Err(WorldError::NotFound(_))
                        | Err(WorldError::InTransit(_)) => {}
                        Err(e) => panic!("unexpected relocation failure: {}", e),
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().expect("walker thread");
    }

    for walker in &walkers {
        let rooms = holders(&world, walker.id());
        assert_eq!(rooms.len(), 1, "{} must be in exactly one room", walker.name());
        assert_eq!(walker.room().map(|r| r.here().clone()), Some(rooms[0].clone()));
        assert_eq!(rooms[0], start.here().clone());
    }
    for item in &items {
        let held = holders(&world, item.id());
        assert_eq!(held.len(), 1, "{} must be held exactly once", item.name());
        assert_eq!(world.registry().container_of(item.id()), Some(held[0].clone()));
    }
}

#[test]
fn racing_pickups_of_one_item_have_a_single_winner() {
    let world = Arc::new(starter_world());
    let pickers: Vec<Character> = (0..6)
        .map(|i| online(&world, &format!("Picker{}", i)).0)
        .collect();
    let start = world.start_room().unwrap();
    let gem = world.create_item("Gem");
    world.move_item(gem.id(), start.here()).unwrap();

    let handles: Vec<_> = pickers
        .iter()
        .cloned()
        .map(|me| {
            let world = Arc::clone(&world);
            let id = gem.id().to_string();
            thread::spawn(move || world.pick_up(&me, &id).is_ok())
        })
        .collect();
    let wins = handles
        .into_iter()
        .map(|h| h.join().expect("picker thread"))
        .filter(|won| *won)
        .count();

    assert!(wins >= 1);
    let held = holders(&world, gem.id());
    assert_eq!(held.len(), 1);
    assert!(held[0].parent_character().is_some());
    assert!(!start.here().contains(gem.id()));
}

#[test]
fn swapping_gear_while_the_inventory_fills_loses_nothing() {
    let mut settings = test_settings();
    settings.characters.inventory_capacity = 2;
    let snapshot = WorldSnapshot {
        areas: vec![starter_area()],
        ..WorldSnapshot::default()
    };
    let world = Arc::new(World::restore(settings, &snapshot).expect("restore"));
    let (aria, _client) = online(&world, "Aria");
    let cap = world.create_item("Wool Cap");
    let helm = world.create_item("Iron Helm");
    for item in [&cap, &helm] {
        item.set_attribute("equip_slot", "head").unwrap();
        world.give_item(&aria, item.id()).unwrap();
    }
    world.equip(&aria, cap.id()).unwrap();
    let fillers: Vec<Item> = (0..3)
        .map(|i| {
            let item = world.create_item(&format!("Stone {}", i));
            world.move_item(item.id(), aria.room().unwrap().here()).unwrap();
            item
        })
        .collect();

    let swapper = {
        let world = Arc::clone(&world);
        let aria = aria.clone();
        let ids = [cap.id().to_string(), helm.id().to_string()];
        thread::spawn(move || {
            for round in 0..ROUNDS {
                match world.equip(&aria, &ids[round % 2]) {
                    Ok(_) | Err(WorldError::NotFound(_)) | Err(WorldError::InTransit(_)) => {}
                    Err(e) => panic!("unexpected equip failure: {}", e),
                }
            }
        })
    };
    let filler = {
        let world = Arc::clone(&world);
        let aria = aria.clone();
        let ids: Vec<String> = fillers.iter().map(|i| i.id().to_string()).collect();
        thread::spawn(move || {
            let mut rng = rand::thread_rng();
            for _ in 0..ROUNDS {
                let id = &ids[rng.gen_range(0..ids.len())];
                let result = if rng.gen_bool(0.5) {
                    world.pick_up(&aria, id).map(|_| ())
                } else {
                    world.drop_item(&aria, id).map(|_| ())
                };
                match result {
                    Ok(())
                    | Err(WorldError::NotFound(_))
                    | Err(WorldError::InTransit(_))
                    | Err(WorldError::CapacityExceeded { .. }) => {}
                    Err(e) => panic!("unexpected transfer failure: {}", e),
                }
            }
        })
    };
    swapper.join().expect("swapper thread");
    filler.join().expect("filler thread");

    for item in [&cap, &helm].into_iter().chain(fillers.iter()) {
        let held = holders(&world, item.id());
        assert_eq!(held.len(), 1, "{} must be held exactly once", item.name());
        assert_eq!(world.registry().container_of(item.id()), Some(held[0].clone()));
    }
    assert_eq!(aria.equipment().len(), 1);
    assert!(aria.inventory().len() <= 2);
}
