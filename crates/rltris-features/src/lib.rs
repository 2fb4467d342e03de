//! Compact state descriptors for learning agents.
//!
//! A board is summarised by four numbers, always in this order:
//!
//! 1. **Aggregate height** - sum of the column heights
//! 2. **Holes** - empty cells at or below the topmost block of each column
//! 3. **Bumpiness** - sum of absolute height differences of adjacent columns
//! 4. **Max height** - tallest column
//!
//! [`extract`] computes the [`FeatureVector`] in one call; [`BoardAnalysis`]
//! exposes the individual measures and caches the column heights they share.
//!
//! # Example
//!
//! ```
//! use rltris_engine::Board;
//! use rltris_features::extract;
//!
//! let board = Board::from_ascii(
//!     r"
//!     .#........
//!     #.........
//!     ###........
//!     ",
//! );
//! assert_eq!(extract(&board).to_array(), [5.0, 1.0, 4.0, 3.0]);
//! ```

pub use self::{board_analysis::BoardAnalysis, feature_vector::FeatureVector};

mod board_analysis;
mod feature_vector;

use rltris_engine::Board;

/// Extracts `[aggregate height, holes, bumpiness, max height]` from a board.
#[must_use]
pub fn extract(board: &Board) -> FeatureVector {
    BoardAnalysis::from_board(board).features()
}
