use alloc::string::String;
use thiserror::Error;

use crate::{Coord, Direction, Value};

/// Reasons a board could not be built. Construction never partially applies.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("Board size {0} is outside the supported range")]
    InvalidSize(Coord),
    #[error("Board is too small, found {0} rows")]
    TooSmall(usize),
    #[error("Board is too big, found {0} rows")]
    TooBig(usize),
    #[error("Wrong number of values on line {line}, expected {expected} but found {found}")]
    WrongFieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Invalid tile value on line {line}: {value:?}")]
    InvalidTileValue { line: usize, value: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error(transparent)]
    Construction(#[from] ConstructionError),
    #[error("Cannot move {0}, nothing would change")]
    InvalidMove(Direction),
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Board is full, no tile can be spawned")]
    BoardFull,
    #[error("Merging two {0} tiles would overflow")]
    TileOverflow(Value),
}

impl GameError {
    /// Whether the caller may simply try another direction
    pub const fn is_invalid_move(&self) -> bool {
        matches!(self, Self::InvalidMove(_))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown direction: {0:?}")]
pub struct UnknownDirection(pub String);

pub type Result<T> = core::result::Result<T, GameError>;
