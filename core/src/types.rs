use alloc::string::String;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::UnknownDirection;

/// Single coordinate axis, also used for the board side length.
pub type Coord = u8;

/// Numeric value carried by a non-empty tile.
pub type Value = u32;

/// Accumulated score.
pub type Score = u64;

pub const MIN_BOARD_SIZE: Coord = 3;
pub const MAX_BOARD_SIZE: Coord = 8;
pub const DEFAULT_BOARD_SIZE: Coord = 4;

/// Cell coordinates `(row, col)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    row: Coord,
    col: Coord,
}

impl Position {
    pub const fn new(row: Coord, col: Coord) -> Self {
        Self { row, col }
    }

    pub const fn row(self) -> Coord {
        self.row
    }

    pub const fn col(self) -> Coord {
        self.col
    }

    /// Offset of this position in a row-major grid of side `size`.
    pub const fn index(self, size: Coord) -> usize {
        (self.row as usize) * (size as usize) + (self.col as usize)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Position {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.row.into(), self.col.into()]
    }
}

/// Direction tiles travel in; merging happens toward that side of the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Self::North, Self::South, Self::East, Self::West];

    pub const fn name(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::South => "south",
            Self::East => "east",
            Self::West => "west",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = UnknownDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|direction| direction.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownDirection(String::from(s)))
    }
}
