use rand::Rng;
use rltris_engine::{Action, NextStates, PlacementOutcome};
use serde::{Deserialize, Deserializer, Serialize};

/// Epsilon schedule: start value, floor, and per-episode multiplicative decay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorationConfig {
    pub epsilon: f32,
    pub min_epsilon: f32,
    pub decay: f32,
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.5,
            min_epsilon: 0.01,
            decay: 0.995,
        }
    }
}

impl ExplorationConfig {
    /// Deserializes a possibly partial schedule, taking missing fields from
    /// `base`. Agent configs use this so each agent keeps its own defaults.
    pub(crate) fn deserialize_over<'de, D>(deserializer: D, base: Self) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Partial {
            epsilon: Option<f32>,
            min_epsilon: Option<f32>,
            decay: Option<f32>,
        }

        let partial = Partial::deserialize(deserializer)?;
        Ok(Self {
            epsilon: partial.epsilon.unwrap_or(base.epsilon),
            min_epsilon: partial.min_epsilon.unwrap_or(base.min_epsilon),
            decay: partial.decay.unwrap_or(base.decay),
        })
    }
}

/// Epsilon-greedy policy shared by all agents.
///
/// With probability ε a uniformly random candidate is chosen, otherwise the
/// candidate with the strictly greatest score. Ties keep the candidate that
/// comes first in [`NextStates`] order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpsilonGreedy {
    epsilon: f32,
    min_epsilon: f32,
    decay: f32,
    enabled: bool,
}

impl EpsilonGreedy {
    #[must_use]
    pub fn new(config: &ExplorationConfig) -> Self {
        Self {
            epsilon: config.epsilon,
            min_epsilon: config.min_epsilon,
            decay: config.decay,
            enabled: true,
        }
    }

    /// Current ε, ignoring whether exploration is enabled.
    #[must_use]
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling exploration makes every selection greedy without touching ε.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// `ε ← max(ε_min, ε · decay)`
    pub fn decay(&mut self) {
        self.epsilon = f32::max(self.min_epsilon, self.epsilon * self.decay);
    }

    pub fn select<R, F>(&self, next_states: &NextStates, rng: &mut R, score: F) -> Option<Action>
    where
        R: Rng + ?Sized,
        F: FnMut(&PlacementOutcome) -> f32,
    {
        if next_states.is_empty() {
            return None;
        }
        if self.enabled && rng.random::<f32>() < self.epsilon {
            let index = rng.random_range(0..next_states.len());
            return next_states.nth_action(index);
        }
        greedy_action(next_states, score)
    }
}

/// Returns the action whose outcome scores strictly highest, keeping the first
/// one on ties. `score` runs once per candidate, in [`NextStates`] order.
pub fn greedy_action<F>(next_states: &NextStates, mut score: F) -> Option<Action>
where
    F: FnMut(&PlacementOutcome) -> f32,
{
    let mut best: Option<(Action, f32)> = None;
    for (action, outcome) in next_states {
        let value = score(outcome);
        if best.is_none_or(|(_, best_value)| value > best_value) {
            best = Some((*action, value));
        }
    }
    best.map(|(action, _)| action)
}
