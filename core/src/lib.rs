#![no_std]

extern crate alloc;

use serde::{Deserialize, Serialize};

pub use board::*;
pub use error::*;
pub use slice::*;
pub use spawner::*;
pub use tile::*;
pub use types::*;

mod board;
mod error;
mod slice;
mod spawner;
mod text;
mod tile;
mod types;

/// Parameters needed to build a fresh board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub size: Coord,
    pub seed: u64,
}

impl BoardConfig {
    pub const fn new_unchecked(size: Coord, seed: u64) -> Self {
        Self { size, seed }
    }

    /// Clamps `size` into the supported range.
    pub fn new(size: Coord, seed: u64) -> Self {
        let size = size.clamp(MIN_BOARD_SIZE, MAX_BOARD_SIZE);
        Self::new_unchecked(size, seed)
    }

    pub const fn total_cells(&self) -> usize {
        (self.size as usize) * (self.size as usize)
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::new_unchecked(DEFAULT_BOARD_SIZE, 0)
    }
}

/// Outcome of a move that changed the board
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOutcome {
    /// Tiles moved and the game continues
    Moved { gained: Score },
    /// Tiles moved, but no direction can change the board anymore
    GameOver { gained: Score },
}

impl MoveOutcome {
    /// Score gained from merges during this move
    pub const fn gained(self) -> Score {
        match self {
            Self::Moved { gained } => gained,
            Self::GameOver { gained } => gained,
        }
    }

    pub const fn is_game_over(self) -> bool {
        matches!(self, Self::GameOver { .. })
    }
}
