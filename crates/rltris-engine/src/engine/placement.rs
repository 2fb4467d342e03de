use std::collections::{BTreeMap, btree_map};

use serde::{Deserialize, Serialize};

use crate::core::{
    board::Board,
    piece::{ActivePiece, RotationVariant},
};

/// Reward granted for every piece that lands.
pub const SURVIVAL_REWARD: f32 = 1.0;
/// Multiplier of the squared line count.
pub const LINE_CLEAR_BONUS: f32 = 10.0;
/// Subtracted from the reward of a placement that ends the game.
pub const GAME_OVER_PENALTY: f32 = 25.0;
/// Reward of a `step` with an action that is not currently legal.
pub const ILLEGAL_ACTION_REWARD: f32 = -10.0;

/// Columns scanned beyond each side of the board.
pub const COLUMN_MARGIN: i32 = 2;

/// One placement choice: which rotation variant, and which column the origin
/// lands in.
///
/// Ordering is rotation-major, then column, which is also the enumeration order
/// of [`NextStates`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Action {
    pub rotation: usize,
    pub column: i32,
}

impl Action {
    #[must_use]
    pub const fn new(rotation: usize, column: i32) -> Self {
        Self { rotation, column }
    }
}

/// Deterministic consequence of hard-dropping a piece with a given action.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementOutcome {
    /// Board after the piece locked and full rows were cleared.
    pub board: Board,
    pub reward: f32,
    /// Whether the cleared board has an occupied top row.
    pub terminal: bool,
    pub lines_cleared: usize,
    /// Row of the piece origin where it came to rest.
    pub landing_row: i32,
}

/// Computes the reward for a placement.
///
/// `1 + 10 * lines²`, minus the game-over penalty when the placement tops out.
///
/// ```
/// use rltris_engine::placement_reward;
///
/// assert_eq!(placement_reward(0, false), 1.0);
/// assert_eq!(placement_reward(2, false), 41.0);
/// assert_eq!(placement_reward(0, true), -24.0);
/// ```
#[must_use]
pub fn placement_reward(lines_cleared: usize, terminal: bool) -> f32 {
    #[expect(clippy::cast_precision_loss)]
    let lines = lines_cleared as f32;
    let reward = SURVIVAL_REWARD + LINE_CLEAR_BONUS * lines * lines;
    if terminal {
        reward - GAME_OVER_PENALTY
    } else {
        reward
    }
}

/// Every legal action for the active piece mapped to its outcome.
///
/// Iteration follows [`Action`] ordering, so greedy selections that keep the
/// first best candidate are deterministic.
#[derive(Debug, Clone, Default)]
pub struct NextStates {
    outcomes: BTreeMap<Action, PlacementOutcome>,
}

impl NextStates {
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    #[must_use]
    pub fn get(&self, action: Action) -> Option<&PlacementOutcome> {
        self.outcomes.get(&action)
    }

    #[must_use]
    pub fn contains(&self, action: Action) -> bool {
        self.outcomes.contains_key(&action)
    }

    /// Removes and returns the outcome of `action`.
    pub fn take(&mut self, action: Action) -> Option<PlacementOutcome> {
        self.outcomes.remove(&action)
    }

    pub fn actions(&self) -> impl ExactSizeIterator<Item = Action> + '_ {
        self.outcomes.keys().copied()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (Action, &PlacementOutcome)> + '_ {
        self.outcomes.iter().map(|(action, outcome)| (*action, outcome))
    }

    /// Returns the `index`-th action in iteration order.
    #[must_use]
    pub fn nth_action(&self, index: usize) -> Option<Action> {
        self.outcomes.keys().nth(index).copied()
    }
}

impl<'a> IntoIterator for &'a NextStates {
    type Item = (&'a Action, &'a PlacementOutcome);
    type IntoIter = btree_map::Iter<'a, Action, PlacementOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}

/// Resolves the landing row of a variant dropped in `col`.
///
/// Returns `None` if the variant cannot occupy row 0 in that column. Otherwise
/// descends greedily until the next row down would be invalid.
#[must_use]
pub fn drop_row(board: &Board, variant: &RotationVariant, col: i32) -> Option<i32> {
    if !board.is_valid_placement(variant, 0, col) {
        return None;
    }
    let mut row = 0;
    while board.is_valid_placement(variant, row + 1, col) {
        row += 1;
    }
    Some(row)
}

/// Simulates dropping `variant` in `col`: gravity, locking, line clears and reward.
#[must_use]
pub fn simulate_placement(
    board: &Board,
    variant: &RotationVariant,
    col: i32,
) -> Option<PlacementOutcome> {
    let landing_row = drop_row(board, variant, col)?;
    let mut board = board.with_piece(variant, landing_row, col)?;
    let lines_cleared = board.clear_lines();
    let terminal = board.is_top_row_occupied();
    Some(PlacementOutcome {
        board,
        reward: placement_reward(lines_cleared, terminal),
        terminal,
        lines_cleared,
        landing_row,
    })
}

/// Enumerates every legal placement of `piece` on `board`.
///
/// Each rotation variant is tried in every column from `-2` to `WIDTH + 1`.
/// Columns where the variant cannot spawn in row 0, or where it would lock
/// partly outside the grid, are absent from the result.
#[must_use]
pub fn enumerate_next_states(board: &Board, piece: ActivePiece) -> NextStates {
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let columns = -COLUMN_MARGIN..=(Board::WIDTH as i32 + COLUMN_MARGIN - 1);

    let mut outcomes = BTreeMap::new();
    for (rotation, variant) in piece.variants().iter().enumerate() {
        for column in columns.clone() {
            if let Some(outcome) = simulate_placement(board, variant, column) {
                outcomes.insert(Action::new(rotation, column), outcome);
            }
        }
    }
    NextStates { outcomes }
}
