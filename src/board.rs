//! Board and occupancy grid.
//!
//! The board is a staggered parallelogram of hex cells: row `x` in
//! `0..rows` holds the cells `(x, y)` with `y` in
//! `-⌊x/2⌋..cols - ⌊x/2⌋`. Every board cell has exactly one state record;
//! cells off the board have none and are never occupiable.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::IntegrityError;
use crate::geometry::translate;
use crate::shape::{Color, Coord};

/// Occupancy of a single board cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CellState {
    #[default]
    Free,
    Taken { owner: String, color: Color },
}

impl CellState {
    pub fn occupied(&self) -> bool {
        matches!(self, Self::Taken { .. })
    }

    /// Colour of the occupying shape, grey when free.
    pub fn color(&self) -> Color {
        match self {
            Self::Free => Color::GRAY,
            Self::Taken { color, .. } => *color,
        }
    }

    /// Name of the occupying shape, empty when free.
    pub fn owner(&self) -> &str {
        match self {
            Self::Free => "",
            Self::Taken { owner, .. } => owner,
        }
    }
}

/// Flat, serializable view of one cell: `occupied` iff `owner` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRecord {
    pub q: i32,
    pub r: i32,
    pub occupied: bool,
    pub color: Color,
    pub owner: String,
}

/// Board cells and their occupancy.
#[derive(Debug, Clone)]
pub struct Board {
    rows: usize,
    cols: usize,
    /// Board cells in row-major construction order.
    cells: Vec<Coord>,
    /// Position of each cell in `cells` and `states`.
    index: FxHashMap<Coord, usize>,
    states: Vec<CellState>,
}

impl Board {
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut board = Self {
            rows: 0,
            cols: 0,
            cells: Vec::new(),
            index: FxHashMap::default(),
            states: Vec::new(),
        };
        board.init(rows, cols);
        board
    }

    /// Rebuilds the board for new dimensions, discarding all occupancy.
    pub fn init(&mut self, rows: usize, cols: usize) {
        self.rows = rows;
        self.cols = cols;
        self.cells.clear();
        self.index.clear();
        self.states.clear();

        for x in 0..rows as i32 {
            let row_shift = x / 2;
            for y in -row_shift..cols as i32 - row_shift {
                self.index.insert((x, y), self.cells.len());
                self.cells.push((x, y));
                self.states.push(CellState::Free);
            }
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cells on the board.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.index.contains_key(&coord)
    }

    /// State of a board cell, `None` for cells off the board.
    pub fn state(&self, coord: Coord) -> Option<&CellState> {
        self.index.get(&coord).map(|&i| &self.states[i])
    }

    /// True iff `coord` is on the board and free.
    #[inline]
    pub fn is_occupiable(&self, coord: Coord) -> bool {
        matches!(self.state(coord), Some(CellState::Free))
    }

    /// Places `cells` translated by the offset, all or nothing.
    ///
    /// Returns false without touching the board if any translated cell is
    /// off the board or occupied. `cells` must not repeat a coordinate.
    pub fn place(
        &mut self,
        cells: &[Coord],
        offset_x: i32,
        offset_y: i32,
        color: Color,
        owner: &str,
    ) -> bool {
        if !translate(cells, offset_x, offset_y).all(|coord| self.is_occupiable(coord)) {
            return false;
        }

        for coord in translate(cells, offset_x, offset_y) {
            let i = self.index[&coord];
            self.states[i] = CellState::Taken {
                owner: owner.to_string(),
                color,
            };
        }
        true
    }

    /// Frees `cells` translated by the offset.
    ///
    /// Must only be used to undo a successful [`Board::place`] with the same
    /// arguments. Every board cell in the translated set is reset either
    /// way; cells that were free or off the board are reported as an
    /// [`IntegrityError`].
    pub fn unplace(
        &mut self,
        cells: &[Coord],
        offset_x: i32,
        offset_y: i32,
    ) -> Result<(), IntegrityError> {
        let mut violations = Vec::new();

        for coord in translate(cells, offset_x, offset_y) {
            match self.index.get(&coord) {
                Some(&i) => {
                    if !self.states[i].occupied() {
                        violations.push(coord);
                    }
                    self.states[i] = CellState::Free;
                }
                None => violations.push(coord),
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            tracing::error!(cells = ?violations, "unplace on cells that were not occupied");
            Err(IntegrityError { cells: violations })
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.states.iter().filter(|state| state.occupied()).count()
    }

    /// True when no cell is occupied.
    pub fn is_clear(&self) -> bool {
        self.states.iter().all(|state| !state.occupied())
    }

    /// Board cells paired with their states, in board order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &CellState)> {
        self.cells.iter().copied().zip(self.states.iter())
    }

    /// A copy of every cell record, in board order.
    pub fn records(&self) -> Vec<CellRecord> {
        self.iter()
            .map(|((q, r), state)| CellRecord {
                q,
                r,
                occupied: state.occupied(),
                color: state.color(),
                owner: state.owner().to_string(),
            })
            .collect()
    }
}

/// Symbol for the shape at `index` in a legend: 1-9, then A-Z.
fn owner_symbol(index: usize) -> char {
    match index {
        0..=8 => char::from(b'1' + index as u8),
        9..=34 => char::from(b'A' + (index - 9) as u8),
        _ => '#',
    }
}

/// Formats the board as text, one line per row.
///
/// Odd rows are indented by one column so neighbouring rows interlock like
/// the hexagons do. Free cells show as '.', occupied cells as the symbol of
/// the owner's position in `owners` ('?' if the owner is not listed).
pub fn format_board(board: &Board, owners: &[&str]) -> String {
    let mut output = String::new();
    let mut current_row = None;

    for ((x, _), state) in board.iter() {
        if current_row != Some(x) {
            if current_row.is_some() {
                output.push('\n');
            }
            if x % 2 == 1 {
                output.push(' ');
            }
            current_row = Some(x);
        } else {
            output.push(' ');
        }

        let symbol = match state {
            CellState::Free => '.',
            CellState::Taken { owner, .. } => owners
                .iter()
                .position(|name| *name == owner.as_str())
                .map_or('?', owner_symbol),
        };
        output.push(symbol);
    }

    if current_row.is_some() {
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::hsl(0, 100, 50);

    #[test]
    fn test_two_by_two_board_cells() {
        let board = Board::new(2, 2);
        assert_eq!(board.cells(), &[(0, 0), (0, 1), (1, 0), (1, 1)]);
        assert!(board.is_clear());
    }

    #[test]
    fn test_rows_are_staggered() {
        let board = Board::new(4, 3);
        assert_eq!(board.len(), 12);
        assert!(board.contains((2, -1)) && board.contains((2, 1)));
        assert!(!board.contains((2, 2)));
        assert!(board.contains((3, -1)) && !board.contains((3, 2)));
        assert!(!board.contains((4, 0)) && !board.contains((-1, 0)));
    }

    #[test]
    fn test_place_marks_every_cell() {
        let mut board = Board::new(3, 3);
        assert!(board.place(&[(0, 0), (0, 1)], 1, 0, RED, "bar"));

        for coord in [(1, 0), (1, 1)] {
            let state = board.state(coord).unwrap();
            assert!(state.occupied());
            assert_eq!(state.owner(), "bar");
            assert_eq!(state.color(), RED);
            assert!(!board.is_occupiable(coord));
        }
        assert_eq!(board.occupied_count(), 2);
    }

    #[test]
    fn test_place_is_all_or_nothing() {
        let mut board = Board::new(2, 2);
        assert!(board.place(&[(0, 0)], 1, 1, RED, "dot"));
        let before = board.records();

        // second cell overlaps the dot
        assert!(!board.place(&[(0, 0), (0, 1)], 1, 0, RED, "bar"));
        // second cell is off the board
        assert!(!board.place(&[(0, 0), (0, 1)], 0, 1, RED, "bar"));

        assert_eq!(board.records(), before);
    }

    #[test]
    fn test_unplace_restores_previous_state() {
        let mut board = Board::new(3, 3);
        let before = board.records();
        let cells = [(0, 0), (1, 0), (1, -1)];

        assert!(board.place(&cells, 1, 1, RED, "tri"));
        board.unplace(&cells, 1, 1).unwrap();

        assert_eq!(board.records(), before);
    }

    #[test]
    fn test_unplace_free_cell_is_integrity_error() {
        let mut board = Board::new(2, 2);
        assert!(board.place(&[(0, 0)], 0, 0, RED, "dot"));

        let err = board.unplace(&[(0, 0), (0, 1), (5, 5)], 0, 0).unwrap_err();
        assert_eq!(err.cells, vec![(0, 1), (5, 5)]);
        // the occupied cell is still reset
        assert!(board.is_clear());
        assert!(!board.contains((5, 5)));
    }

    #[test]
    fn test_init_discards_occupancy() {
        let mut board = Board::new(2, 2);
        assert!(board.place(&[(0, 0)], 0, 0, RED, "dot"));
        board.init(3, 1);
        assert_eq!(board.cells(), &[(0, 0), (1, 0), (2, -1)]);
        assert!(board.is_clear());
    }

    #[test]
    fn test_free_record_has_default_color_and_no_owner() {
        let board = Board::new(1, 1);
        let records = board.records();
        assert_eq!(
            records,
            vec![CellRecord {
                q: 0,
                r: 0,
                occupied: false,
                color: Color::GRAY,
                owner: String::new(),
            }]
        );
    }

    #[test]
    fn test_format_board_with_legend() {
        let mut board = Board::new(3, 3);
        assert!(board.place(&[(0, 0), (0, 1), (0, 2)], 0, 0, RED, "top"));
        assert!(board.place(&[(0, 0)], 1, 1, RED, "mid"));
        assert!(board.place(&[(0, 0)], 2, -1, RED, "stray"));

        insta::assert_snapshot!(format_board(&board, &["top", "mid"]), @r"
        1 1 1
         . 2 .
        ? . .
        ");
    }

    #[test]
    fn test_owner_symbols() {
        assert_eq!(owner_symbol(0), '1');
        assert_eq!(owner_symbol(8), '9');
        assert_eq!(owner_symbol(9), 'A');
        assert_eq!(owner_symbol(34), 'Z');
        assert_eq!(owner_symbol(35), '#');
    }
}
