use std::{cell::OnceCell, iter};

use rltris_engine::Board;

use crate::FeatureVector;

/// Lazily evaluated board measures.
///
/// Column heights are computed once on first use and shared by every measure
/// that needs them.
#[derive(Debug)]
pub struct BoardAnalysis {
    board: Board,
    column_heights: OnceCell<[u8; Board::WIDTH]>,
    column_occupied_cells: OnceCell<[u8; Board::WIDTH]>,
}

impl BoardAnalysis {
    #[must_use]
    pub fn from_board(board: &Board) -> Self {
        Self {
            board: *board,
            column_heights: OnceCell::new(),
            column_occupied_cells: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Height of each column: `HEIGHT - y` of its topmost occupied cell, or 0
    /// for an empty column.
    #[must_use]
    pub fn column_heights(&self) -> &[u8; Board::WIDTH] {
        self.column_heights.get_or_init(|| {
            let mut column_heights = [0; Board::WIDTH];
            for (x, h) in column_heights.iter_mut().enumerate() {
                let min_y = self.board.rows().position(|row| row.is_cell_occupied(x));
                let Some(min_y) = min_y else {
                    continue;
                };
                *h = u8::try_from(Board::HEIGHT - min_y).unwrap();
            }
            column_heights
        })
    }

    fn column_occupied_cells(&self) -> &[u8; Board::WIDTH] {
        self.column_occupied_cells.get_or_init(|| {
            let mut column_occupied_cells = [0; Board::WIDTH];
            for row in self.board.rows() {
                for (occupied, count) in iter::zip(row.iter_cells(), &mut column_occupied_cells) {
                    if occupied {
                        *count += 1;
                    }
                }
            }
            column_occupied_cells
        })
    }

    /// Sum of all column heights.
    #[must_use]
    pub fn aggregate_height(&self) -> u32 {
        self.column_heights().iter().copied().map(u32::from).sum()
    }

    /// Empty cells at or below the topmost occupied cell of each column.
    ///
    /// Equal to the column height minus the occupied cells of that column.
    #[must_use]
    pub fn holes(&self) -> u32 {
        iter::zip(self.column_heights(), self.column_occupied_cells())
            .map(|(h, occ)| u32::from(h - occ))
            .sum()
    }

    /// Sum of absolute height differences between adjacent columns.
    #[must_use]
    pub fn bumpiness(&self) -> u32 {
        self.column_heights()
            .windows(2)
            .map(|w| u32::from(w[0].abs_diff(w[1])))
            .sum()
    }

    #[must_use]
    pub fn max_height(&self) -> u32 {
        self.column_heights()
            .iter()
            .copied()
            .max()
            .map_or(0, u32::from)
    }

    /// Collects the four measures in `FeatureVector` order.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn features(&self) -> FeatureVector {
        FeatureVector::new(
            self.aggregate_height() as f32,
            self.holes() as f32,
            self.bumpiness() as f32,
            self.max_height() as f32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board() {
        let analysis = BoardAnalysis::from_board(&Board::EMPTY);
        assert_eq!(analysis.column_heights(), &[0; Board::WIDTH]);
        assert_eq!(analysis.features().to_array(), [0.0; 4]);
    }

    #[test]
    fn test_reference_board() {
        // Column 0: rows 18-19. Column 1: rows 17 and 19.
        let mut board = Board::EMPTY;
        board.occupy(18, 0);
        board.occupy(19, 0);
        board.occupy(17, 1);
        board.occupy(19, 1);

        let analysis = BoardAnalysis::from_board(&board);
        assert_eq!(analysis.column_heights()[..3], [2, 3, 0]);
        assert_eq!(analysis.aggregate_height(), 5);
        assert_eq!(analysis.holes(), 1);
        assert_eq!(analysis.bumpiness(), 4);
        assert_eq!(analysis.max_height(), 3);
        assert_eq!(analysis.features().to_array(), [5.0, 1.0, 4.0, 3.0]);
    }

    #[test]
    fn test_holes_count_every_gap_below_top() {
        let board = Board::from_ascii(
            r"
            #.........
            ..........
            #.........
            ..........
            #........#
            ",
        );
        let analysis = BoardAnalysis::from_board(&board);
        assert_eq!(analysis.column_heights()[0], 5);
        assert_eq!(analysis.column_heights()[9], 1);
        assert_eq!(analysis.holes(), 2);
    }

    #[test]
    fn test_empty_cells_above_stack_are_not_holes() {
        let board = Board::from_ascii(
            r"
            ....#.....
            ...###....
            ",
        );
        let analysis = BoardAnalysis::from_board(&board);
        assert_eq!(analysis.holes(), 0);
        assert_eq!(analysis.aggregate_height(), 4);
        assert_eq!(analysis.bumpiness(), 1 + 1 + 1 + 1);
        assert_eq!(analysis.max_height(), 2);
    }

    #[test]
    fn test_full_height_column() {
        let mut board = Board::EMPTY;
        for y in 0..Board::HEIGHT {
            board.occupy(y, 9);
        }
        let analysis = BoardAnalysis::from_board(&board);
        assert_eq!(analysis.max_height(), 20);
        assert_eq!(analysis.bumpiness(), 20);
        assert_eq!(analysis.holes(), 0);
    }
}
