use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a room inside its area. Compared componentwise; `instance`
/// separates copies of the same layout.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Coords {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    #[serde(default)]
    pub instance: i32,
}

impl Coords {
    pub const fn new(x: i32, y: i32, z: i32, instance: i32) -> Self {
        Self { x, y, z, instance }
    }

    /// Coordinates one step away in `direction`, same instance. `None` at the
    /// edge of the grid.
    pub fn offset(&self, direction: Direction) -> Option<Coords> {
        let (dx, dy, dz) = direction.offsets();
        Some(Coords {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
            z: self.z.checked_add(dz)?,
            instance: self.instance,
        })
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, #{})", self.x, self.y, self.z, self.instance)
    }
}

/// Portable room reference that survives save/load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Location {
    pub area: String,
    pub coords: Coords,
}

impl Location {
    pub fn new(area: impl Into<String>, coords: Coords) -> Self {
        Self {
            area: area.into(),
            coords,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.area, self.coords)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    South,
    East,
    West,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::Up,
        Direction::Down,
    ];

    /// Accepts full names and single-letter abbreviations, any case.
    pub fn parse(input: &str) -> Option<Direction> {
        match input.trim().to_ascii_lowercase().as_str() {
            "north" | "n" => Some(Direction::North),
            "south" | "s" => Some(Direction::South),
            "east" | "e" => Some(Direction::East),
            "west" | "w" => Some(Direction::West),
            "up" | "u" => Some(Direction::Up),
            "down" | "d" => Some(Direction::Down),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// (x, y, z) deltas. North is +y, east is +x, up is +z.
    pub fn offsets(&self) -> (i32, i32, i32) {
        match self {
            Direction::North => (0, 1, 0),
            Direction::South => (0, -1, 0),
            Direction::East => (1, 0, 0),
            Direction::West => (-1, 0, 0),
            Direction::Up => (0, 0, 1),
            Direction::Down => (0, 0, -1),
        }
    }

    /// "to the north", but plain "up"/"down" for vertical moves.
    pub fn toward_phrase(&self, prefix: &str) -> String {
        match self {
            Direction::Up | Direction::Down => self.as_str().to_string(),
            _ => format!("{} {}", prefix, self.as_str()),
        }
    }

    /// "from the south", but "above"/"below" for vertical moves.
    pub fn from_phrase(&self, prefix: &str) -> String {
        match self {
            Direction::Up => "above".to_string(),
            Direction::Down => "below".to_string(),
            _ => format!("{} {}", prefix, self.as_str()),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coords_compare_all_four_components() {
        let a = Coords::new(1, 2, 3, 0);
        assert_eq!(a, Coords::new(1, 2, 3, 0));
        assert_ne!(a, Coords::new(1, 2, 3, 1));
        assert_ne!(a, Coords::new(1, 2, 4, 0));
    }

    #[test]
    fn offset_keeps_instance() {
        let c = Coords::new(0, 0, 0, 7).offset(Direction::North).unwrap();
        assert_eq!(c, Coords::new(0, 1, 0, 7));
        let c = c.offset(Direction::Down).unwrap();
        assert_eq!(c, Coords::new(0, 1, -1, 7));
    }

    #[test]
    fn offset_stops_at_the_grid_edge() {
        let edge = Coords::new(i32::MAX, 0, i32::MIN, 0);
        assert_eq!(edge.offset(Direction::East), None);
        assert_eq!(edge.offset(Direction::Down), None);
        assert_eq!(
            edge.offset(Direction::West),
            Some(Coords::new(i32::MAX - 1, 0, i32::MIN, 0))
        );
    }

    #[test]
    fn parse_accepts_abbreviations() {
        assert_eq!(Direction::parse("N"), Some(Direction::North));
        assert_eq!(Direction::parse(" west "), Some(Direction::West));
        assert_eq!(Direction::parse("d"), Some(Direction::Down));
        assert_eq!(Direction::parse("sideways"), None);
    }

    #[test]
    fn vertical_phrases_are_special() {
        assert_eq!(Direction::North.toward_phrase("to the"), "to the north");
        assert_eq!(Direction::Up.toward_phrase("to the"), "up");
        assert_eq!(Direction::South.from_phrase("from the"), "from the south");
        assert_eq!(Direction::Down.from_phrase("from the"), "below");
    }

    #[test]
    fn opposite_round_trips() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
        }
    }
}
