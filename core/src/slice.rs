use alloc::vec::Vec;
use core::ops::{Deref, DerefMut};

use crate::{GameError, Position, Result, Score, Tile, Value};

/// One row or column of a board, ordered so that index 0 is the side tiles travel toward.
///
/// A slice holds references into the board's storage (`&Tile` to inspect, `&mut Tile` to mash), so
/// changes made by [`Slice::mash`] land directly on the owning grid.
#[derive(Debug)]
pub struct Slice<T> {
    tiles: Vec<T>,
}

impl<T> Slice<T> {
    pub fn new(tiles: impl IntoIterator<Item = T>) -> Self {
        tiles.into_iter().collect()
    }
}

impl<T> FromIterator<T> for Slice<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            tiles: iter.into_iter().collect(),
        }
    }
}

impl<T> From<Vec<T>> for Slice<T> {
    fn from(tiles: Vec<T>) -> Self {
        Self { tiles }
    }
}

impl<T: Deref<Target = Tile>> Slice<T> {
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().map(Deref::deref)
    }

    pub fn values(&self) -> impl Iterator<Item = Option<Value>> {
        self.iter().map(Tile::value)
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> {
        self.iter().map(Tile::position)
    }

    /// Whether [`Slice::mash`] would change anything.
    ///
    /// True once a tile is found after an empty cell (it would slide), or when two neighboring
    /// tiles hold the same value (they would merge).
    pub fn can_mash(&self) -> bool {
        let mut seen_gap = false;
        let mut previous = None;
        for value in self.values() {
            match value {
                None => seen_gap = true,
                Some(_) if seen_gap => return true,
                Some(_) if value == previous => return true,
                Some(_) => {}
            }
            previous = value;
        }
        false
    }

    /// The packed values [`Slice::mash`] would leave behind, and the score it would gain.
    pub(crate) fn merged(&self) -> Result<(Vec<Value>, Score)> {
        let mut packed: Vec<Value> = self.values().flatten().collect();
        let mut score = 0;

        let mut cursor = 0;
        while cursor + 1 < packed.len() {
            if packed[cursor] == packed[cursor + 1] {
                let merged = packed[cursor]
                    .checked_mul(2)
                    .ok_or(GameError::TileOverflow(packed[cursor]))?;
                packed[cursor] = merged;
                packed.remove(cursor + 1);
                score += Score::from(merged);
            }
            cursor += 1;
        }

        Ok((packed, score))
    }
}

impl<T: DerefMut<Target = Tile>> Slice<T> {
    /// Slides every tile toward the front of the slice, merging equal neighbors, and returns the
    /// sum of the merged values.
    ///
    /// A merged tile never merges again during the same call, so `[2, 2, 2, 2]` becomes
    /// `[4, 4, _, _]` rather than `[8, _, _, _]`. Fails with [`GameError::TileOverflow`] and leaves
    /// the slice untouched when a merged value would not fit in a [`Value`].
    pub fn mash(&mut self) -> Result<Score> {
        let merged = self.merged()?;
        Ok(self.fill(merged))
    }

    /// Writes values computed by [`Slice::merged`] back, left aligned.
    pub(crate) fn fill(&mut self, (packed, score): (Vec<Value>, Score)) -> Score {
        for (i, tile) in self.tiles.iter_mut().enumerate() {
            tile.set_value(packed.get(i).copied());
        }
        score
    }
}

/// Slices are equal when their tiles match pairwise in position and value.
impl<T, U> PartialEq<Slice<U>> for Slice<T>
where
    T: Deref<Target = Tile>,
    U: Deref<Target = Tile>,
{
    fn eq(&self, other: &Slice<U>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}
