use std::collections::VecDeque;

use rand::{Rng, seq::index};
use rltris_features::FeatureVector;
use serde::{Deserialize, Serialize};

/// One step of experience: the features before an action, its reward, the
/// features after it resolved, and whether it ended the episode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub before: FeatureVector,
    pub reward: f32,
    pub after: FeatureVector,
    pub terminal: bool,
}

impl Transition {
    #[must_use]
    pub const fn new(before: FeatureVector, reward: f32, after: FeatureVector, terminal: bool) -> Self {
        Self {
            before,
            reward,
            after,
            terminal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SampleError {
    #[display("cannot sample {requested} distinct transitions from a memory holding {available}")]
    BatchTooLarge { requested: usize, available: usize },
}

/// Fixed-capacity FIFO buffer of transitions.
///
/// Once full, every [`save`](Self::save) evicts the oldest transition.
#[derive(Debug, Clone)]
pub struct ReplayMemory {
    capacity: usize,
    transitions: VecDeque<Transition>,
}

impl ReplayMemory {
    /// Creates an empty memory holding at most `capacity` transitions.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "replay memory capacity must be positive");
        Self {
            capacity,
            transitions: VecDeque::with_capacity(capacity.min(4096)),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn save(&mut self, transition: Transition) {
        if self.transitions.len() == self.capacity {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    /// Draws `batch_size` distinct transitions uniformly at random.
    pub fn sample<R>(&self, batch_size: usize, rng: &mut R) -> Result<Vec<Transition>, SampleError>
    where
        R: Rng + ?Sized,
    {
        if batch_size > self.transitions.len() {
            return Err(SampleError::BatchTooLarge {
                requested: batch_size,
                available: self.transitions.len(),
            });
        }
        let batch = index::sample(rng, self.transitions.len(), batch_size)
            .into_iter()
            .map(|i| self.transitions[i])
            .collect();
        Ok(batch)
    }

    /// Iterates from the oldest to the newest transition.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Transition> + '_ {
        self.transitions.iter()
    }
}
