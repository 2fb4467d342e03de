use std::collections::VecDeque;

/// Rolling window over the most recent episode scores.
#[derive(Debug, Clone)]
pub struct ScoreWindow {
    capacity: usize,
    scores: VecDeque<f32>,
}

impl ScoreWindow {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "score window must hold at least one score");
        Self {
            capacity,
            scores: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, score: f32) {
        if self.scores.len() == self.capacity {
            self.scores.pop_front();
        }
        self.scores.push_back(score);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Mean of the scores currently in the window, or 0 if it is empty.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn average(&self) -> f32 {
        if self.scores.is_empty() {
            return 0.0;
        }
        self.scores.iter().sum::<f32>() / self.scores.len() as f32
    }

    #[must_use]
    pub fn max(&self) -> Option<f32> {
        self.scores.iter().copied().reduce(f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_window() {
        let window = ScoreWindow::new(3);
        assert!(window.is_empty());
        assert_eq!(window.average(), 0.0);
        assert_eq!(window.max(), None);
    }

    #[test]
    fn test_average_over_most_recent() {
        let mut window = ScoreWindow::new(3);
        for score in [10.0, 1.0, 2.0, 3.0] {
            window.push(score);
        }
        assert_eq!(window.len(), 3);
        assert_eq!(window.average(), 2.0);
        assert_eq!(window.max(), Some(3.0));
    }

    #[test]
    fn test_partial_window() {
        let mut window = ScoreWindow::new(100);
        window.push(4.0);
        window.push(-2.0);
        assert_eq!(window.average(), 1.0);
    }
}
