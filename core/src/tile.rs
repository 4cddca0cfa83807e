use core::fmt;
use serde::{Deserialize, Serialize};

use crate::{Position, Value};

/// A single grid cell, `value == None` means the cell is empty.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    position: Position,
    value: Option<Value>,
}

impl Tile {
    pub const fn new(position: Position, value: Option<Value>) -> Self {
        Self { position, value }
    }

    pub const fn empty(position: Position) -> Self {
        Self::new(position, None)
    }

    pub const fn with_value(position: Position, value: Value) -> Self {
        Self::new(position, Some(value))
    }

    pub const fn position(&self) -> Position {
        self.position
    }

    pub const fn value(&self) -> Option<Value> {
        self.value
    }

    pub const fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    pub fn set_value(&mut self, value: Option<Value>) {
        self.value = value;
    }

    pub fn clear(&mut self) {
        self.value = None;
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(value) => write!(f, "{} {}", value, self.position),
            None => write!(f, "_ {}", self.position),
        }
    }
}
