use serde::{Deserialize, Serialize};

/// Per-episode statistics: accumulated reward, pieces and line clears.
///
/// The score is the sum of rewards of every successful placement. Illegal
/// actions end the episode without touching these counters.
///
/// # Example
///
/// ```
/// use rltris_engine::EpisodeStats;
///
/// let mut stats = EpisodeStats::new();
/// stats.complete_placement(4, 161.0);
///
/// assert_eq!(stats.score(), 161.0);
/// assert_eq!(stats.total_cleared_lines(), 4);
/// assert_eq!(stats.line_cleared_counter()[4], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeStats {
    score: f32,
    completed_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; 5],
}

impl Default for EpisodeStats {
    fn default() -> Self {
        Self::new()
    }
}

impl EpisodeStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0.0,
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
        }
    }

    /// Returns the accumulated reward of all placements so far.
    #[must_use]
    pub const fn score(&self) -> f32 {
        self.score
    }

    /// Returns the total number of pieces that have been locked into place.
    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Returns a histogram of placements by number of lines cleared.
    ///
    /// Index `n` counts the placements that cleared exactly `n` lines.
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    /// Records a successful placement.
    pub fn complete_placement(&mut self, cleared_lines: usize, reward: f32) {
        self.completed_pieces += 1;
        self.total_cleared_lines += cleared_lines;
        if let Some(count) = self.line_cleared_counter.get_mut(cleared_lines) {
            *count += 1;
        }
        self.score += reward;
    }
}
