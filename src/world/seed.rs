//! Starter content written to a fresh store.

use uuid::Uuid;

use super::attributes::Attribute;
use super::coords::Coords;
use super::snapshot::{AreaSnapshot, RoomSnapshot, AREA_SCHEMA_VERSION};

pub const STARTER_AREA: &str = "Homeland";

/// A small crossroads around the default start room at the origin.
pub fn starter_area() -> AreaSnapshot {
    let rooms = vec![
        RoomSnapshot::new(
            Coords::new(0, 0, 0, 0),
            "Town Square",
            "Cobblestones ring a dry fountain. Roads lead north and east; a railway crosses to the south.",
        )
        .with_attribute(Attribute::Type, "square"),
        RoomSnapshot::new(
            Coords::new(0, 1, 0, 0),
            "North Road",
            "A rutted road runs out of town between low stone walls.",
        ),
        RoomSnapshot::new(
            Coords::new(1, 0, 0, 0),
            "Market Street",
            "Stalls crowd both sides of the street, most of them shuttered.",
        )
        .with_attribute(Attribute::Color, "214,170,90"),
        RoomSnapshot::new(
            Coords::new(0, -1, 0, 0),
            "Railway Crossing",
            "Twin rails gleam in the gravel. A sign warns travellers to keep clear.",
        )
        .with_attribute(Attribute::Type, "track"),
        RoomSnapshot::new(
            Coords::new(0, 0, 1, 0),
            "Clock Tower",
            "Gears tick overhead. Through the slats you can see the whole square below.",
        ),
    ];
    AreaSnapshot {
        id: Uuid::new_v4().to_string(),
        name: STARTER_AREA.to_string(),
        rooms,
        schema_version: AREA_SCHEMA_VERSION,
    }
}
