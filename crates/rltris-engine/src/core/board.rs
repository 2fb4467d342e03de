use std::fmt;

use serde::{Deserialize, Serialize};

use super::piece::RotationVariant;

const BOARD_WIDTH: usize = 10;
const BOARD_HEIGHT: usize = 20;

// Full row (all playable cells occupied)
const FULL_ROW_MASK: u16 = (1 << BOARD_WIDTH) - 1;

/// Single row of the board as a bitmask.
///
/// Bit `x` (LSB first) is column `x`. Bits 10-15 are always zero, so every
/// cell is either 0 or 1 by construction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardRow {
    bits: u16,
}

impl BoardRow {
    pub const EMPTY: Self = Self { bits: 0 };
    pub const FULL: Self = Self {
        bits: FULL_ROW_MASK,
    };

    /// Checks if every cell in the row is occupied.
    #[inline]
    #[must_use]
    pub fn is_full(self) -> bool {
        self.bits == FULL_ROW_MASK
    }

    /// Checks if no cell in the row is occupied.
    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.bits == 0
    }

    #[inline]
    #[must_use]
    pub fn is_cell_occupied(self, x: usize) -> bool {
        (self.bits & (1 << x)) != 0
    }

    #[inline]
    fn occupy_cell(&mut self, x: usize) {
        self.bits |= 1 << x;
    }

    /// Number of occupied cells in the row.
    #[inline]
    #[must_use]
    pub fn count_occupied(self) -> u32 {
        self.bits.count_ones()
    }

    /// Iterates over the cells of the row from left to right.
    #[inline]
    pub fn iter_cells(self) -> impl Iterator<Item = bool> {
        (0..BOARD_WIDTH).map(move |x| self.is_cell_occupied(x))
    }
}

/// Fixed-size binary occupancy grid.
///
/// `HEIGHT` rows by `WIDTH` columns, row 0 at the top. Pieces may hang above
/// row 0 while being placed (negative rows), but nothing is ever stored there.
///
/// Serialises as a list of row strings using `#` for occupied and `.` for empty
/// cells, top row first.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<String>", try_from = "Vec<String>")]
pub struct Board {
    rows: [BoardRow; BOARD_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Board {
    /// Number of columns.
    pub const WIDTH: usize = BOARD_WIDTH;
    /// Number of rows.
    pub const HEIGHT: usize = BOARD_HEIGHT;

    /// A board with no occupied cells.
    pub const EMPTY: Self = Self {
        rows: [BoardRow::EMPTY; BOARD_HEIGHT],
    };

    /// Returns row `y`, counting from the top.
    #[must_use]
    pub fn row(&self, y: usize) -> BoardRow {
        self.rows[y]
    }

    /// Iterates over the rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = BoardRow> + '_ {
        self.rows.iter().copied()
    }

    /// Checks whether the cell at row `y`, column `x` is occupied.
    #[must_use]
    pub fn is_occupied(&self, y: usize, x: usize) -> bool {
        self.rows[y].is_cell_occupied(x)
    }

    /// Marks a single cell as occupied.
    ///
    /// # Panics
    ///
    /// Panics if the cell lies outside the board.
    pub fn occupy(&mut self, y: usize, x: usize) {
        assert!(
            y < Self::HEIGHT && x < Self::WIDTH,
            "cell ({y}, {x}) is outside the board"
        );
        self.rows[y].occupy_cell(x);
    }

    /// Total number of occupied cells.
    #[must_use]
    pub fn count_occupied(&self) -> u32 {
        self.rows.iter().map(|row| row.count_occupied()).sum()
    }

    /// Checks whether any cell of the top row is occupied (the game-over condition).
    #[must_use]
    pub fn is_top_row_occupied(&self) -> bool {
        !self.rows[0].is_empty()
    }

    /// Checks whether a rotation variant fits with its origin at `(row, col)`.
    ///
    /// Fails if any resulting cell lies left or right of the board, below the
    /// bottom row, or on an occupied cell. Cells above the top row are allowed
    /// and never checked against occupancy.
    #[must_use]
    pub fn is_valid_placement(&self, variant: &RotationVariant, row: i32, col: i32) -> bool {
        variant.iter().all(|&(dr, dc)| {
            let r = row + i32::from(dr);
            let c = col + i32::from(dc);
            let Ok(x) = usize::try_from(c) else {
                return false;
            };
            if x >= Self::WIDTH {
                return false;
            }
            match usize::try_from(r) {
                Ok(y) => y < Self::HEIGHT && !self.rows[y].is_cell_occupied(x),
                Err(_) => true,
            }
        })
    }

    /// Returns a copy of the board with the variant stamped at `(row, col)`.
    ///
    /// Returns `None` if any cell of the variant falls outside the grid,
    /// including above the top row.
    #[must_use]
    pub fn with_piece(&self, variant: &RotationVariant, row: i32, col: i32) -> Option<Self> {
        let mut board = *self;
        for &(dr, dc) in variant {
            let y = usize::try_from(row + i32::from(dr)).ok()?;
            let x = usize::try_from(col + i32::from(dc)).ok()?;
            if y >= Self::HEIGHT || x >= Self::WIDTH {
                return None;
            }
            board.rows[y].occupy_cell(x);
        }
        Some(board)
    }

    /// Clears filled lines and returns the number of lines cleared.
    ///
    /// Remaining rows keep their relative order and the same number of empty
    /// rows are inserted at the top. A board without full rows is unchanged.
    pub fn clear_lines(&mut self) -> usize {
        let mut count = 0;

        for y in (0..Self::HEIGHT).rev() {
            if self.rows[y].is_full() {
                count += 1;
                continue;
            }
            if count > 0 {
                self.rows[y + count] = self.rows[y];
            }
        }

        self.rows[..count].fill(BoardRow::EMPTY);
        count
    }

    /// Creates a `Board` from ASCII art for testing.
    ///
    /// `#` is an occupied cell and `.` an empty one. Each line must describe
    /// exactly 10 cells. Fewer than 20 lines may be given; they are aligned to
    /// the bottom of the board so fixtures only need to draw the stack.
    ///
    /// # Panics
    ///
    /// Panics on malformed rows or more than 20 lines.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let lines: Vec<&str> = art.lines().filter(|line| !line.trim().is_empty()).collect();
        assert!(
            lines.len() <= Self::HEIGHT,
            "at most {} rows expected, got {}",
            Self::HEIGHT,
            lines.len()
        );

        let mut board = Self::EMPTY;
        let top = Self::HEIGHT - lines.len();
        for (i, line) in lines.iter().enumerate() {
            board.rows[top + i] = parse_row(line)
                .unwrap_or_else(|e| panic!("invalid row {}: {e}", top + i));
        }
        board
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum BoardParseError {
    #[display("expected {} rows, got {_0}", Board::HEIGHT)]
    RowCount(#[error(not(source))] usize),
    #[display("expected {} cells, got {_0}", Board::WIDTH)]
    CellCount(#[error(not(source))] usize),
    #[display("unexpected cell character {_0:?}")]
    InvalidCell(#[error(not(source))] char),
}

fn parse_row(line: &str) -> Result<BoardRow, BoardParseError> {
    let mut row = BoardRow::EMPTY;
    let mut width = 0;
    for ch in line.chars().filter(|c| !c.is_whitespace()) {
        match ch {
            '#' => {
                if width < Board::WIDTH {
                    row.occupy_cell(width);
                }
            }
            '.' => {}
            _ => return Err(BoardParseError::InvalidCell(ch)),
        }
        width += 1;
    }
    if width != Board::WIDTH {
        return Err(BoardParseError::CellCount(width));
    }
    Ok(row)
}

fn format_row(row: BoardRow) -> String {
    row.iter_cells()
        .map(|occupied| if occupied { '#' } else { '.' })
        .collect()
}

impl From<Board> for Vec<String> {
    fn from(board: Board) -> Self {
        board.rows().map(format_row).collect()
    }
}

impl TryFrom<Vec<String>> for Board {
    type Error = BoardParseError;

    fn try_from(lines: Vec<String>) -> Result<Self, Self::Error> {
        if lines.len() != Board::HEIGHT {
            return Err(BoardParseError::RowCount(lines.len()));
        }
        let mut board = Board::EMPTY;
        for (row, line) in board.rows.iter_mut().zip(&lines) {
            *row = parse_row(line)?;
        }
        Ok(board)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            writeln!(f, "{}", format_row(row))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board {{")?;
        for row in self.rows() {
            writeln!(f, "    {}", format_row(row))?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use crate::PieceKind;

    use super::*;

    const O: RotationVariant = [(0, 0), (0, 1), (1, 0), (1, 1)];

    #[test]
    fn test_empty_board() {
        let board = Board::EMPTY;
        assert_eq!(board.count_occupied(), 0);
        assert!(!board.is_top_row_occupied());
        assert!(board.rows().all(BoardRow::is_empty));
    }

    #[test]
    fn test_from_ascii_aligns_to_bottom() {
        let board = Board::from_ascii(
            r"
            #.........
            ##........
            ",
        );
        assert!(board.is_occupied(18, 0));
        assert!(board.is_occupied(19, 0));
        assert!(board.is_occupied(19, 1));
        assert!(!board.is_occupied(18, 1));
        assert_eq!(board.count_occupied(), 3);
    }

    #[test]
    fn test_bit_row_full_and_empty() {
        let mut row = BoardRow::EMPTY;
        assert!(row.is_empty());
        assert!(!row.is_full());
        for x in 0..Board::WIDTH {
            row.occupy_cell(x);
        }
        assert!(row.is_full());
        assert_eq!(row, BoardRow::FULL);
        assert_eq!(row.count_occupied(), 10);
    }

    #[test]
    fn test_valid_placement_rejects_walls_and_floor() {
        let board = Board::EMPTY;
        assert!(board.is_valid_placement(&O, 0, 0));
        assert!(board.is_valid_placement(&O, 18, 8));
        assert!(!board.is_valid_placement(&O, 0, -1));
        assert!(!board.is_valid_placement(&O, 0, 9));
        assert!(!board.is_valid_placement(&O, 19, 0));
    }

    #[test]
    fn test_valid_placement_allows_cells_above_board() {
        let board = Board::from_ascii(
            r"
            ##########
            ",
        );
        // Two cells above the top row are never checked against occupancy.
        assert!(board.is_valid_placement(&O, -1, 4));
        assert!(board.is_valid_placement(&O, -2, 4));
    }

    #[test]
    fn test_valid_placement_rejects_overlap() {
        let board = Board::from_ascii(
            r"
            .#........
            ",
        );
        assert!(!board.is_valid_placement(&O, 18, 0));
        assert!(!board.is_valid_placement(&O, 18, 1));
        assert!(board.is_valid_placement(&O, 17, 0));
        assert!(board.is_valid_placement(&O, 18, 2));
    }

    #[test]
    fn test_with_piece_stamps_cells() {
        let board = Board::EMPTY.with_piece(&O, 18, 0).unwrap();
        assert_eq!(
            board,
            Board::from_ascii(
                r"
                ##........
                ##........
                ",
            )
        );
    }

    #[test]
    fn test_with_piece_discards_out_of_bounds() {
        let vertical_i = PieceKind::I.variants()[1];
        assert!(Board::EMPTY.with_piece(&vertical_i, 0, 3).is_none());
        assert!(Board::EMPTY.with_piece(&vertical_i, 1, 3).is_some());
        assert!(Board::EMPTY.with_piece(&O, 0, 9).is_none());
    }

    #[test]
    fn test_clear_lines_single_line() {
        let mut board = Board::from_ascii(
            r"
            #.........
            ##########
            ",
        );
        let cleared = board.clear_lines();
        assert_eq!(cleared, 1);
        assert_eq!(
            board,
            Board::from_ascii(
                r"
                #.........
                ",
            )
        );
    }

    #[test]
    fn test_clear_lines_keeps_relative_order() {
        let mut board = Board::from_ascii(
            r"
            #.........
            ##########
            .#........
            ##########
            ..#.......
            ",
        );
        let cleared = board.clear_lines();
        assert_eq!(cleared, 2);
        assert_eq!(
            board,
            Board::from_ascii(
                r"
                #.........
                .#........
                ..#.......
                ",
            )
        );
    }

    #[test]
    fn test_clear_lines_with_partial_lines() {
        let original = Board::from_ascii(
            r"
            #########.
            .#########
            ",
        );
        let mut board = original;
        assert_eq!(board.clear_lines(), 0);
        assert_eq!(board, original);
    }

    #[test]
    fn test_clear_lines_all_filled() {
        let mut board = Board::EMPTY;
        for y in 0..Board::HEIGHT {
            for x in 0..Board::WIDTH {
                board.occupy(y, x);
            }
        }
        assert_eq!(board.clear_lines(), Board::HEIGHT);
        assert_eq!(board, Board::EMPTY);
    }

    #[test]
    fn test_clear_lines_is_idempotent() {
        let mut board = Board::from_ascii(
            r"
            ##########
            ###.######
            ##########
            ",
        );
        assert_eq!(board.clear_lines(), 2);
        let once = board;
        assert_eq!(board.clear_lines(), 0);
        assert_eq!(board, once);
    }

    #[test]
    fn test_board_serialization() {
        let board = Board::from_ascii(
            r"
            ..#.......
            ##........
            ",
        );
        let serialized = serde_json::to_string(&board).unwrap();
        assert!(serialized.starts_with("[\"..........\""));
        assert!(serialized.ends_with("\"..#.......\",\"##........\"]"));

        let deserialized: Board = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, board);
    }

    #[test]
    fn test_board_deserialization_error_cases() {
        assert!(serde_json::from_str::<Board>("[\"..........\"]").is_err());

        let mut rows = vec![".........."; Board::HEIGHT];
        rows[3] = "....x.....";
        let json = serde_json::to_string(&rows).unwrap();
        assert!(serde_json::from_str::<Board>(&json).is_err());

        rows[3] = ".........";
        let json = serde_json::to_string(&rows).unwrap();
        assert!(serde_json::from_str::<Board>(&json).is_err());
    }

    #[test]
    fn test_display_matches_ascii() {
        let board = Board::from_ascii(
            r"
            #........#
            ",
        );
        let text = board.to_string();
        assert_eq!(text.lines().count(), Board::HEIGHT);
        assert_eq!(text.lines().last(), Some("#........#"));
    }
}
