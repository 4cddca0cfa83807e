use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;
use ndarray::{Array2, Axis};

use crate::*;

/// Number of tiles placed by [`GameBoard::reset`] when asked to spawn.
pub const INITIAL_TILES: usize = 2;

/// Chance that a spawned tile is a 2 rather than a 4.
pub const SPAWN_TWO_PROBABILITY: f64 = 0.9;

/// A square grid of tiles together with the running score.
#[derive(Clone, Debug)]
pub struct GameBoard<S = RandomSpawner> {
    size: Coord,
    grid: Array2<Tile>,
    score: Score,
    spawner: S,
}

impl GameBoard<RandomSpawner> {
    /// Empty board, no tiles are spawned until [`GameBoard::reset`] is called.
    pub fn new(config: BoardConfig) -> Result<Self> {
        Self::with_spawner(config.size, RandomSpawner::new(config.seed))
    }

    /// Parses the comma separated text format, see [`GameBoard::parse_with`].
    pub fn from_text(text: &str) -> Result<Self> {
        Self::parse_with(text, RandomSpawner::new(BoardConfig::default().seed))
    }
}

impl FromStr for GameBoard<RandomSpawner> {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_text(s)
    }
}

impl<S: TileSpawner> GameBoard<S> {
    pub fn with_spawner(size: Coord, spawner: S) -> Result<Self> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
            return Err(ConstructionError::InvalidSize(size).into());
        }

        let side = usize::from(size);
        let grid = Array2::from_shape_fn((side, side), |(row, col)| {
            Tile::empty(Position::new(row as Coord, col as Coord))
        });

        Ok(Self {
            size,
            grid,
            score: 0,
            spawner,
        })
    }

    /// Builds a board from one line per row, comma separated, blank fields being empty tiles.
    ///
    /// The row count sets the board size and must be within `3..=8`. No tiles are spawned.
    pub fn parse_with(input: &str, spawner: S) -> Result<Self> {
        let (size, values) = text::parse_grid(input)?;
        let mut board = Self::with_spawner(size, spawner)?;
        for (tile, value) in board.grid.iter_mut().zip(values) {
            tile.set_value(value);
        }
        Ok(board)
    }

    pub fn size(&self) -> Coord {
        self.size
    }

    pub fn score(&self) -> Score {
        self.score
    }

    /// All tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.grid.iter()
    }

    pub fn empty_count(&self) -> usize {
        self.grid.iter().filter(|tile| tile.is_empty()).count()
    }

    pub fn max_value(&self) -> Option<Value> {
        self.grid.iter().filter_map(Tile::value).max()
    }

    pub fn validate_position(&self, position: Position) -> Result<Position> {
        if position.row() < self.size && position.col() < self.size {
            Ok(position)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn tile(&self, row: Coord, col: Coord) -> Result<&Tile> {
        self.tile_at(Position::new(row, col))
    }

    pub fn tile_at(&self, position: Position) -> Result<&Tile> {
        let position = self.validate_position(position)?;
        Ok(&self.grid[position.to_nd_index()])
    }

    /// Clears the score and every tile, then optionally spawns the two starting tiles.
    pub fn reset(&mut self, spawn_initial: bool) -> Result<()> {
        self.score = 0;
        self.grid.iter_mut().for_each(Tile::clear);
        if spawn_initial {
            for _ in 0..INITIAL_TILES {
                self.spawn()?;
            }
        }
        log::debug!("Board reset, {} tiles on board", self.tile_count());
        Ok(())
    }

    /// One slice per row or column, each ordered toward the side `direction` points at.
    pub fn slices(&self, direction: Direction) -> Vec<Slice<&Tile>> {
        let (axis, reversed) = lane_layout(direction);
        self.grid
            .axis_iter(axis)
            .map(|lane| {
                let mut tiles: Vec<&Tile> = lane.into_iter().collect();
                if reversed {
                    tiles.reverse();
                }
                Slice::from(tiles)
            })
            .collect()
    }

    /// Same as [`GameBoard::slices`], but the slices can mash the board in place.
    pub fn slices_mut(&mut self, direction: Direction) -> Vec<Slice<&mut Tile>> {
        let (axis, reversed) = lane_layout(direction);
        self.grid
            .axis_iter_mut(axis)
            .map(|lane| {
                let mut tiles: Vec<&mut Tile> = lane.into_iter().collect();
                if reversed {
                    tiles.reverse();
                }
                Slice::from(tiles)
            })
            .collect()
    }

    pub fn can_mash(&self, direction: Direction) -> bool {
        self.slices(direction).iter().any(Slice::can_mash)
    }

    /// Whether any direction would change the board, the game goes on while this holds.
    pub fn has_move(&self) -> bool {
        Direction::ALL
            .into_iter()
            .any(|direction| self.can_mash(direction))
    }

    /// Mashes every slice for `direction`, returning the score gained. Does not touch the score
    /// or spawn anything.
    ///
    /// Fails with [`GameError::TileOverflow`] when a merge would not fit in a [`Value`], in which
    /// case no slice is changed.
    pub fn mash(&mut self, direction: Direction) -> Result<Score> {
        self.mash_leaving(direction, 0)
    }

    /// Mashes only if at least `free` cells are empty afterwards, otherwise the board is untouched.
    fn mash_leaving(&mut self, direction: Direction, free: usize) -> Result<Score> {
        let cells = self.grid.len();
        let mut slices = self.slices_mut(direction);
        let merged = slices
            .iter()
            .map(Slice::merged)
            .collect::<Result<Vec<_>>>()?;

        let filled: usize = merged.iter().map(|(packed, _)| packed.len()).sum();
        if cells - filled < free {
            log::warn!("Cannot move {}, no cell would be left for a new tile", direction);
            return Err(GameError::BoardFull);
        }

        Ok(slices
            .iter_mut()
            .zip(merged)
            .map(|(slice, merged)| slice.fill(merged))
            .sum())
    }

    /// Places a 2 (or, less often, a 4) on a random empty cell.
    pub fn spawn(&mut self) -> Result<Position> {
        let empty: Vec<Position> = self
            .grid
            .iter()
            .filter(|tile| tile.is_empty())
            .map(Tile::position)
            .collect();
        if empty.is_empty() {
            log::warn!("Cannot spawn a tile, board is full");
            return Err(GameError::BoardFull);
        }

        let pick = self.spawner.pick_index(empty.len()).min(empty.len() - 1);
        let position = empty[pick];
        let value = if self.spawner.draw() < SPAWN_TWO_PROBABILITY {
            2
        } else {
            4
        };

        let tile = &mut self.grid[position.to_nd_index()];
        tile.set_value(Some(value));
        log::trace!("Spawned {}", tile);
        Ok(position)
    }

    /// Plays one turn: mash toward `direction`, add the gained score, spawn a tile.
    ///
    /// Fails with [`GameError::InvalidMove`] and leaves the board untouched when nothing would
    /// move. Every other error is also raised before the board changes. A move that leaves no
    /// further moves reports [`MoveOutcome::GameOver`].
    pub fn move_tiles(&mut self, direction: Direction) -> Result<MoveOutcome> {
        if !self.can_mash(direction) {
            log::debug!("Rejected move {}, nothing would change", direction);
            return Err(GameError::InvalidMove(direction));
        }

        let gained = self.mash_leaving(direction, 1)?;
        self.score += gained;
        self.spawn()?;
        log::debug!(
            "Moved {}, gained {}, score {}",
            direction,
            gained,
            self.score
        );

        if self.has_move() {
            Ok(MoveOutcome::Moved { gained })
        } else {
            log::debug!("Game over, final score {}", self.score);
            Ok(MoveOutcome::GameOver { gained })
        }
    }

    /// The bordered table rendering, same as the [`Display`](fmt::Display) output.
    pub fn pretty(&self) -> String {
        self.to_string()
    }

    /// Writes the board back in the format read by [`GameBoard::parse_with`].
    pub fn to_text(&self) -> String {
        text::write_grid(&self.grid)
    }

    fn tile_count(&self) -> usize {
        self.grid.len() - self.empty_count()
    }
}

impl<S> fmt::Display for GameBoard<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        text::write_pretty(f, &self.grid)
    }
}

/// Axis to iterate for `direction` and whether each lane is walked backwards.
fn lane_layout(direction: Direction) -> (Axis, bool) {
    match direction {
        Direction::West => (Axis(0), false),
        Direction::East => (Axis(0), true),
        Direction::North => (Axis(1), false),
        Direction::South => (Axis(1), true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    /// Always picks the same candidate and draws the same number.
    #[derive(Clone, Debug)]
    struct FixedSpawner {
        index: usize,
        draw: f64,
    }

    impl TileSpawner for FixedSpawner {
        fn pick_index(&mut self, _len: usize) -> usize {
            self.index
        }

        fn draw(&mut self) -> f64 {
            self.draw
        }
    }

    fn fixed(index: usize, draw: f64) -> FixedSpawner {
        FixedSpawner { index, draw }
    }

    fn board(text: &str) -> GameBoard<FixedSpawner> {
        GameBoard::parse_with(text, fixed(0, 0.0)).unwrap()
    }

    fn values(board: &GameBoard<impl TileSpawner>) -> Vec<Option<Value>> {
        board.tiles().map(Tile::value).collect()
    }

    fn positions(slice: &Slice<&Tile>) -> Vec<(Coord, Coord)> {
        slice.positions().map(|p| (p.row(), p.col())).collect()
    }

    #[test]
    fn new_board_is_empty() {
        let board = GameBoard::new(BoardConfig::default()).unwrap();
        assert_eq!(board.size(), DEFAULT_BOARD_SIZE);
        assert_eq!(board.score(), 0);
        assert_eq!(board.empty_count(), 16);
        assert!(!board.has_move());
    }

    #[test]
    fn new_rejects_unsupported_sizes() {
        for size in [0, 2, 9, 64] {
            assert_eq!(
                GameBoard::new(BoardConfig::new_unchecked(size, 0)).unwrap_err(),
                GameError::Construction(ConstructionError::InvalidSize(size))
            );
        }
    }

    #[test]
    fn grid_positions_match_indices() {
        let board = GameBoard::with_spawner(5, fixed(0, 0.0)).unwrap();
        for (i, tile) in board.tiles().enumerate() {
            assert_eq!(tile.position().index(5), i);
        }
        assert_eq!(board.tile(3, 1).unwrap().position(), Position::new(3, 1));
    }

    #[test]
    fn tile_rejects_out_of_range() {
        let board = board("2,,\n,,\n,,4");
        assert_eq!(board.tile(0, 0).unwrap().value(), Some(2));
        assert_eq!(board.tile(2, 2).unwrap().value(), Some(4));
        assert_eq!(board.tile(3, 0), Err(GameError::InvalidCoords));
        assert_eq!(board.tile(0, 3), Err(GameError::InvalidCoords));
    }

    #[test]
    fn slice_orderings_on_3x3() {
        let board = GameBoard::with_spawner(3, fixed(0, 0.0)).unwrap();

        let north: Vec<_> = board.slices(Direction::North).iter().map(positions).collect();
        assert_eq!(
            north,
            vec![
                vec![(0, 0), (1, 0), (2, 0)],
                vec![(0, 1), (1, 1), (2, 1)],
                vec![(0, 2), (1, 2), (2, 2)],
            ]
        );

        let south: Vec<_> = board.slices(Direction::South).iter().map(positions).collect();
        assert_eq!(
            south,
            vec![
                vec![(2, 0), (1, 0), (0, 0)],
                vec![(2, 1), (1, 1), (0, 1)],
                vec![(2, 2), (1, 2), (0, 2)],
            ]
        );

        let east: Vec<_> = board.slices(Direction::East).iter().map(positions).collect();
        assert_eq!(
            east,
            vec![
                vec![(0, 2), (0, 1), (0, 0)],
                vec![(1, 2), (1, 1), (1, 0)],
                vec![(2, 2), (2, 1), (2, 0)],
            ]
        );

        let west: Vec<_> = board.slices(Direction::West).iter().map(positions).collect();
        assert_eq!(
            west,
            vec![
                vec![(0, 0), (0, 1), (0, 2)],
                vec![(1, 0), (1, 1), (1, 2)],
                vec![(2, 0), (2, 1), (2, 2)],
            ]
        );
    }

    #[test]
    fn mash_locked_board_changes_nothing() {
        let mut board = board("2,4,8\n16,32,64\n128,256,512");
        let before = values(&board);

        assert!(!board.can_mash(Direction::North));
        assert_eq!(board.mash(Direction::North), Ok(0));
        assert_eq!(values(&board), before);
        assert_eq!(board.score(), 0);
    }

    #[test]
    fn mash_north_merges_column() {
        let mut board = board("2,,\n2,,\n8,,");

        assert_eq!(board.mash(Direction::North), Ok(4));
        assert_eq!(
            values(&board),
            vec![Some(4), None, None, Some(8), None, None, None, None, None]
        );
    }

    #[test]
    fn mash_west_merges_each_tile_once() {
        let mut board = board("2,2,2,2,2\n,,,,\n,,,,\n,,,,\n,,,,");

        assert_eq!(board.mash(Direction::West), Ok(8));
        let row: Vec<_> = (0..5).map(|col| board.tile(0, col).unwrap().value()).collect();
        assert_eq!(row, vec![Some(4), Some(4), Some(2), None, None]);
    }

    #[test]
    fn mash_sums_all_slices() {
        let mut board = board("2,2,\n4,,4\n,8,8");

        assert_eq!(board.mash(Direction::East), Ok(4 + 8 + 16));
        assert_eq!(board.to_text(), ",,4\n,,8\n,,16");
    }

    #[test]
    fn mash_south_and_east_gravitate_to_far_side() {
        let mut board = board("2,,\n,,\n2,,4");
        board.mash(Direction::South).unwrap();
        assert_eq!(board.to_text(), ",,\n,,\n4,,4");

        board.mash(Direction::East).unwrap();
        assert_eq!(board.to_text(), ",,\n,,\n,,8");
    }

    #[test]
    fn spawn_on_empty_board_places_a_two() {
        let mut board = GameBoard::with_spawner(3, fixed(4, 0.5)).unwrap();

        let position = board.spawn().unwrap();

        assert_eq!(position, Position::new(1, 1));
        assert_eq!(board.tile(1, 1).unwrap().value(), Some(2));
        assert_eq!(board.empty_count(), 8);
    }

    #[test]
    fn spawn_places_a_four_on_high_draw() {
        for draw in [SPAWN_TWO_PROBABILITY, 0.95, 0.999] {
            let mut board = GameBoard::with_spawner(3, fixed(0, draw)).unwrap();

            let position = board.spawn().unwrap();

            assert_eq!(board.tile_at(position).unwrap().value(), Some(4));
            assert_eq!(board.empty_count(), 8);
        }
    }

    #[test]
    fn spawn_only_considers_empty_cells() {
        // the first row is full, so the second empty cell is (1, 1)
        let mut board = GameBoard::parse_with("2,4,8\n,,\n,,", fixed(1, 0.0)).unwrap();

        assert_eq!(board.spawn().unwrap(), Position::new(1, 1));
        assert_eq!(board.to_text(), "2,4,8\n,2,\n,,");
    }

    #[test]
    fn spawn_fails_on_full_board() {
        let mut board = board("2,4,2\n4,2,4\n2,4,2");
        assert_eq!(board.spawn(), Err(GameError::BoardFull));
    }

    #[test]
    fn reset_clears_and_spawns() {
        let mut board = board("2,4,2\n4,2,4\n2,4,2");
        board.reset(false).unwrap();
        assert_eq!(board.empty_count(), 9);
        assert_eq!(board.score(), 0);

        board.reset(true).unwrap();
        assert_eq!(board.empty_count(), 9 - INITIAL_TILES);
        assert_eq!(board.score(), 0);
    }

    #[test]
    fn reset_with_random_spawner_places_two_valid_tiles() {
        let mut board = GameBoard::new(BoardConfig::new(4, 1234)).unwrap();
        board.reset(true).unwrap();

        let spawned: Vec<Value> = board.tiles().filter_map(Tile::value).collect();
        assert_eq!(spawned.len(), 2);
        assert!(spawned.iter().all(|&v| v == 2 || v == 4));
    }

    #[test]
    fn move_adds_score_and_spawns() {
        let mut board = board("2,2,\n,,\n,,");

        let outcome = board.move_tiles(Direction::West).unwrap();

        assert_eq!(outcome, MoveOutcome::Moved { gained: 4 });
        assert_eq!(board.score(), 4);
        // the merge freed two cells, the first empty one got the new tile
        assert_eq!(board.to_text(), "4,2,\n,,\n,,");
    }

    #[test]
    fn move_accumulates_score() {
        let mut board = board("2,2,\n4,4,\n,,");

        assert_eq!(board.move_tiles(Direction::West).unwrap().gained(), 12);
        assert_eq!(board.to_text(), "4,2,\n8,,\n,,");
        assert_eq!(board.move_tiles(Direction::East).unwrap().gained(), 0);
        assert_eq!(board.score(), 12);
    }

    #[test]
    fn invalid_move_leaves_board_untouched() {
        let mut board = board("2,,\n,,\n,,");

        for direction in [Direction::West, Direction::North] {
            assert_eq!(
                board.move_tiles(direction),
                Err(GameError::InvalidMove(direction))
            );
        }
        assert!(board.move_tiles(Direction::West).unwrap_err().is_invalid_move());
        assert_eq!(board.to_text(), "2,,\n,,\n,,");
        assert_eq!(board.score(), 0);
    }

    #[test]
    fn locked_board_has_no_move() {
        let mut board = board("2,4,2\n4,2,4\n2,4,2");

        assert!(!board.has_move());
        for direction in Direction::ALL {
            assert_eq!(
                board.move_tiles(direction),
                Err(GameError::InvalidMove(direction))
            );
        }
    }

    #[test]
    fn move_that_locks_the_board_reports_game_over() {
        let mut board = board("2,4,2\n4,2,4\n4,,2");

        let outcome = board.move_tiles(Direction::East).unwrap();

        assert_eq!(outcome, MoveOutcome::GameOver { gained: 0 });
        assert_eq!(board.to_text(), "2,4,2\n4,2,4\n2,4,2");
        assert!(!board.has_move());
    }

    #[test]
    fn slide_without_merge_still_frees_a_cell() {
        let mut board = board("2,4,8\n16,32,64\n,128,256");

        assert!(board.can_mash(Direction::West));
        board.mash(Direction::West).unwrap();
        assert_eq!(board.empty_count(), 1);
        assert_eq!(board.tile(2, 2).unwrap().value(), None);
    }

    #[test]
    fn mash_without_room_to_spawn_changes_nothing() {
        let mut board = board("2,2,\n,,\n,,");

        assert_eq!(board.mash_leaving(Direction::West, 9), Err(GameError::BoardFull));
        assert_eq!(board.to_text(), "2,2,\n,,\n,,");

        assert_eq!(board.mash_leaving(Direction::West, 8), Ok(4));
        assert_eq!(board.to_text(), "4,,\n,,\n,,");
    }

    #[test]
    fn overflowing_merge_leaves_board_untouched() {
        let text = "3000000000,3000000000,\n,,\n,,2";
        let mut board = board(text);

        assert!(board.can_mash(Direction::West));
        assert_eq!(
            board.move_tiles(Direction::West),
            Err(GameError::TileOverflow(3_000_000_000))
        );
        assert_eq!(board.to_text(), text);
        assert_eq!(board.score(), 0);

        // the other slices are not mashed either
        assert_eq!(
            board.mash(Direction::West),
            Err(GameError::TileOverflow(3_000_000_000))
        );
        assert_eq!(board.to_text(), text);

        assert!(board.move_tiles(Direction::South).is_ok());
    }

    #[test]
    fn pretty_width_follows_largest_value() {
        let board = board("2,,256\n,,4\n,,");
        let pretty = board.pretty();
        let lines: Vec<&str> = pretty.lines().collect();

        let border = "═".repeat(3 * 7);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], ["╔", border.as_str(), "╗"].concat());
        assert_eq!(lines[1], ["║", "    2  ", "       ", "  256  ", "║"].concat());
        assert_eq!(lines[2], ["║", "       ", "       ", "    4  ", "║"].concat());
        assert_eq!(lines[3], ["║", " ".repeat(21).as_str(), "║"].concat());
        assert_eq!(lines[4], ["╚", border.as_str(), "╝"].concat());
    }

    #[test]
    fn pretty_empty_board_uses_single_width_cells() {
        let board = GameBoard::with_spawner(3, fixed(0, 0.0)).unwrap();
        let pretty = alloc::format!("{board}");

        let blank_row = ["║", " ".repeat(3 * 5).as_str(), "║"].concat();
        assert_eq!(pretty, board.pretty());
        assert_eq!(pretty.lines().nth(1), Some(blank_row.as_str()));
    }

    #[test]
    fn from_text_validates_shape() {
        assert_eq!(
            GameBoard::from_text("2,2\n2,2").unwrap_err(),
            GameError::Construction(ConstructionError::TooSmall(2))
        );
        assert!(matches!(
            GameBoard::from_text("2,2,2\n2,2\n2,2,2"),
            Err(GameError::Construction(ConstructionError::WrongFieldCount { .. }))
        ));
        assert!(matches!(
            "2,2,2\n2,two,2\n2,2,2".parse::<GameBoard>(),
            Err(GameError::Construction(ConstructionError::InvalidTileValue { .. }))
        ));
    }

    #[test]
    fn text_format_survives_a_round_trip() {
        let text = "2,,4,\n,8,,16\n,,,\n1024,,,2";
        let board: GameBoard = text.parse().unwrap();

        assert_eq!(board.size(), 4);
        assert_eq!(board.to_text(), text);
        assert_eq!(board.max_value(), Some(1024));
    }

    #[test]
    fn random_playout_keeps_invariants() {
        let mut board = GameBoard::new(BoardConfig::new(4, 99)).unwrap();
        board.reset(true).unwrap();

        let mut last_score = 0;
        for turn in 0..10_000 {
            let direction = Direction::ALL[turn % 4];
            match board.move_tiles(direction) {
                Ok(MoveOutcome::Moved { gained }) => {
                    assert_eq!(board.score(), last_score + gained);
                }
                Ok(MoveOutcome::GameOver { .. }) => {
                    assert!(!board.has_move());
                    break;
                }
                Err(GameError::InvalidMove(_)) => assert_eq!(board.score(), last_score),
                Err(err) => panic!("unexpected error: {err}"),
            }
            last_score = board.score();
            assert!(board.tiles().all(|tile| tile.value().is_none_or(|v| v.is_power_of_two())));
        }
    }
}
