pub use random::*;

mod random;

/// Source of randomness for placing new tiles.
pub trait TileSpawner {
    /// Picks one of `len` candidate cells, `len` is never zero.
    fn pick_index(&mut self, len: usize) -> usize;

    /// Draws a number in `[0, 1)` used to decide the value of the new tile.
    fn draw(&mut self) -> f64;
}

