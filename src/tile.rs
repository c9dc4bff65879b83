use std::{
    fmt::{self, Display},
    ops::Neg,
    str::FromStr,
    sync::Arc,
};

use crate::ParseDirectionError;

/// A named rectangular block. Tiles never change shape once created.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tile {
    name: Arc<str>,
    width: usize,
    height: usize,
}

impl Tile {
    pub fn new(name: impl Into<Arc<str>>, width: usize, height: usize) -> Tile {
        Tile {
            name: name.into(),
            width,
            height,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`; tiles with equal shapes are interchangeable
    /// under [`TileMode::Interchangeable`](crate::TileMode::Interchangeable).
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub(crate) fn shared_name(&self) -> &Arc<str> {
        &self.name
    }
}

/// One unit step on the grid. The origin is the top-left cell and `y` grows downward.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// Every direction, in the order moves are generated.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// `(dx, dy)` of a single step.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Direction::North => 'N',
            Direction::East => 'E',
            Direction::South => 'S',
            Direction::West => 'W',
        }
    }
}

impl Neg for Direction {
    type Output = Direction;

    fn neg(self) -> Direction {
        self.opposite()
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "N" | "n" => Ok(Direction::North),
            "E" | "e" => Ok(Direction::East),
            "S" | "s" => Ok(Direction::South),
            "W" | "w" => Ok(Direction::West),
            _ => Err(ParseDirectionError::new(s)),
        }
    }
}

/// A single action: one tile, one step.
///
/// Displays as `<tile>-<letter>`, e.g. `cao-E`, which is the label used
/// between consecutive boards of a solution trace.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub tile: Arc<str>,
    pub direction: Direction,
}

impl Move {
    pub fn new(tile: impl Into<Arc<str>>, direction: Direction) -> Move {
        Move {
            tile: tile.into(),
            direction,
        }
    }

    /// The move that undoes this one.
    pub fn reversed(&self) -> Move {
        Move {
            tile: self.tile.clone(),
            direction: -self.direction,
        }
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.tile, self.direction)
    }
}
