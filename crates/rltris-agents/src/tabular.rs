//! Discretized tabular TD(0) learner.
//!
//! Feature vectors are mapped to a [`BucketKey`] of four small integers and a
//! sparse [`QTable`] stores one value estimate per key.
//!
//! | feature          | bucket                     |
//! |------------------|----------------------------|
//! | aggregate height | `min(7, ⌊agg / 15⌋)`       |
//! | holes            | `min(7, ⌊holes⌋)`          |
//! | bumpiness        | `min(6, ⌊bumpiness / 4⌋)`  |
//! | max height       | `min(7, ⌊max / 3⌋)`        |

use std::collections::BTreeMap;

use rand::Rng;
use rltris_engine::{Action, NextStates};
use rltris_features::{FeatureVector, extract};
use serde::{Deserialize, Deserializer, Serialize};

use crate::exploration::{EpsilonGreedy, ExplorationConfig};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabularConfig {
    /// Initial step size α.
    pub learning_rate: f32,
    pub min_learning_rate: f32,
    /// Per-episode multiplicative decay of α.
    pub learning_rate_decay: f32,
    /// Discount factor γ.
    pub gamma: f32,
    #[serde(deserialize_with = "deserialize_exploration")]
    pub exploration: ExplorationConfig,
}

impl Default for TabularConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.2,
            min_learning_rate: 0.02,
            learning_rate_decay: 0.99995,
            gamma: 0.98,
            exploration: ExplorationConfig {
                epsilon: 0.5,
                min_epsilon: 0.02,
                decay: 0.9997,
            },
        }
    }
}

fn deserialize_exploration<'de, D>(deserializer: D) -> Result<ExplorationConfig, D::Error>
where
    D: Deserializer<'de>,
{
    ExplorationConfig::deserialize_over(deserializer, TabularConfig::default().exploration)
}

/// Discretized state: bucket indices of the four features.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BucketKey([u8; 4]);

impl BucketKey {
    pub const MAX_BUCKETS: [u8; 4] = [7, 7, 6, 7];
    const BUCKET_WIDTHS: [f32; 4] = [15.0, 1.0, 4.0, 3.0];

    #[must_use]
    pub const fn new(buckets: [u8; 4]) -> Self {
        Self(buckets)
    }

    #[must_use]
    pub fn from_features(features: &FeatureVector) -> Self {
        let values = features.to_array();
        Self(std::array::from_fn(|i| {
            bucket(values[i], Self::BUCKET_WIDTHS[i], Self::MAX_BUCKETS[i])
        }))
    }

    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        self.0
    }
}

#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn bucket(value: f32, width: f32, max: u8) -> u8 {
    let index = (value / width).floor();
    if index >= f32::from(max) {
        max
    } else if index > 0.0 {
        index as u8
    } else {
        0
    }
}

/// Sparse value table. Keys that were never written read as `0.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<QTableEntry>", into = "Vec<QTableEntry>")]
pub struct QTable {
    values: BTreeMap<BucketKey, f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct QTableEntry {
    key: BucketKey,
    value: f32,
}

impl From<Vec<QTableEntry>> for QTable {
    fn from(entries: Vec<QTableEntry>) -> Self {
        Self {
            values: entries.into_iter().map(|e| (e.key, e.value)).collect(),
        }
    }
}

impl From<QTable> for Vec<QTableEntry> {
    fn from(table: QTable) -> Self {
        table
            .values
            .into_iter()
            .map(|(key, value)| QTableEntry { key, value })
            .collect()
    }
}

impl QTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get_or_default(&self, key: BucketKey) -> f32 {
        self.values.get(&key).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, key: BucketKey, value: f32) {
        self.values.insert(key, value);
    }

    /// Number of keys written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (BucketKey, f32)> + '_ {
        self.values.iter().map(|(key, value)| (*key, *value))
    }
}

/// Epsilon-greedy agent over a [`QTable`], trained with one-step TD updates.
#[derive(Debug, Clone)]
pub struct TabularAgent {
    config: TabularConfig,
    table: QTable,
    learning_rate: f32,
    exploration: EpsilonGreedy,
}

impl TabularAgent {
    #[must_use]
    pub fn new(config: TabularConfig) -> Self {
        Self::with_table(config, QTable::new())
    }

    /// Resumes from a previously learned table.
    #[must_use]
    pub fn with_table(config: TabularConfig, table: QTable) -> Self {
        Self {
            config,
            table,
            learning_rate: config.learning_rate,
            exploration: EpsilonGreedy::new(&config.exploration),
        }
    }

    #[must_use]
    pub fn discretize(features: &FeatureVector) -> BucketKey {
        BucketKey::from_features(features)
    }

    #[must_use]
    pub fn config(&self) -> &TabularConfig {
        &self.config
    }

    #[must_use]
    pub fn table(&self) -> &QTable {
        &self.table
    }

    #[must_use]
    pub fn into_table(self) -> QTable {
        self.table
    }

    /// Current α.
    #[must_use]
    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    #[must_use]
    pub fn exploration(&self) -> &EpsilonGreedy {
        &self.exploration
    }

    pub fn exploration_mut(&mut self) -> &mut EpsilonGreedy {
        &mut self.exploration
    }

    #[must_use]
    pub fn state_value(&self, features: &FeatureVector) -> f32 {
        self.table.get_or_default(Self::discretize(features))
    }

    /// Picks an action, scoring each candidate as `reward + γ · Q(next)`.
    pub fn select_action<R>(&self, next_states: &NextStates, rng: &mut R) -> Option<Action>
    where
        R: Rng + ?Sized,
    {
        self.exploration.select(next_states, rng, |outcome| {
            outcome.reward + self.config.gamma * self.state_value(&extract(&outcome.board))
        })
    }

    /// TD(0) update of the value of `before`. Returns the new value.
    pub fn update(
        &mut self,
        before: &FeatureVector,
        reward: f32,
        after: &FeatureVector,
        terminal: bool,
    ) -> f32 {
        let key = Self::discretize(before);
        let value = self.table.get_or_default(key);
        let next_value = if terminal {
            0.0
        } else {
            self.state_value(after)
        };
        let target = reward + self.config.gamma * next_value;
        let updated = value + self.learning_rate * (target - value);
        self.table.set(key, updated);
        updated
    }

    /// `α ← max(α_min, α · decay)`
    pub fn decay_learning_rate(&mut self) {
        self.learning_rate = f32::max(
            self.config.min_learning_rate,
            self.learning_rate * self.config.learning_rate_decay,
        );
    }
}
