//! Experience-replay value learner with a periodically synchronised target.
//!
//! The agent keeps two approximators of identical structure:
//!
//! - the **online** approximator scores candidate actions in [`ValueAgent::act`]
//!   and is the one trained by [`ValueAgent::learn`]
//! - the **target** approximator only evaluates next states when TD targets are
//!   computed, and is overwritten with the online parameters every
//!   `target_sync_interval` learning steps

use std::iter;

use rand::Rng;
use rltris_engine::{Action, NextStates};
use rltris_features::extract;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::{
    approximator::{ApproximatorError, ValueApproximator},
    exploration::{EpsilonGreedy, ExplorationConfig},
    replay_memory::{ReplayMemory, SampleError, Transition},
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueAgentConfig {
    /// Discount factor γ.
    pub gamma: f32,
    pub batch_size: usize,
    pub memory_capacity: usize,
    /// Learning steps between two target synchronisations.
    pub target_sync_interval: usize,
    #[serde(deserialize_with = "deserialize_exploration")]
    pub exploration: ExplorationConfig,
}

impl Default for ValueAgentConfig {
    fn default() -> Self {
        Self {
            gamma: 0.98,
            batch_size: 64,
            memory_capacity: 100_000,
            target_sync_interval: 500,
            exploration: ExplorationConfig::default(),
        }
    }
}

fn deserialize_exploration<'de, D>(deserializer: D) -> Result<ExplorationConfig, D::Error>
where
    D: Deserializer<'de>,
{
    ExplorationConfig::deserialize_over(deserializer, ValueAgentConfig::default().exploration)
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ValueAgentError {
    Sample(SampleError),
    Approximator(ApproximatorError),
}

#[derive(Debug)]
pub struct ValueAgent<A> {
    config: ValueAgentConfig,
    online: A,
    target: A,
    memory: ReplayMemory,
    exploration: EpsilonGreedy,
    learn_steps: usize,
}

impl<A> ValueAgent<A>
where
    A: ValueApproximator,
{
    /// Creates an agent whose target starts as a copy of `approximator`.
    ///
    /// # Panics
    ///
    /// Panics if `batch_size`, `memory_capacity` or `target_sync_interval` is
    /// zero.
    pub fn new(config: ValueAgentConfig, approximator: A) -> Result<Self, ApproximatorError> {
        assert!(config.batch_size > 0, "batch size must be positive");
        assert!(
            config.target_sync_interval > 0,
            "target sync interval must be positive"
        );
        Ok(Self {
            config,
            target: approximator.try_clone()?,
            online: approximator,
            memory: ReplayMemory::new(config.memory_capacity),
            exploration: EpsilonGreedy::new(&config.exploration),
            learn_steps: 0,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ValueAgentConfig {
        &self.config
    }

    #[must_use]
    pub fn online(&self) -> &A {
        &self.online
    }

    #[must_use]
    pub fn target(&self) -> &A {
        &self.target
    }

    #[must_use]
    pub fn into_online(self) -> A {
        self.online
    }

    #[must_use]
    pub fn memory(&self) -> &ReplayMemory {
        &self.memory
    }

    /// Number of completed learning steps.
    #[must_use]
    pub fn learn_steps(&self) -> usize {
        self.learn_steps
    }

    #[must_use]
    pub fn exploration(&self) -> &EpsilonGreedy {
        &self.exploration
    }

    pub fn exploration_mut(&mut self) -> &mut EpsilonGreedy {
        &mut self.exploration
    }

    /// Epsilon-greedy choice, scoring candidates with the online approximator.
    ///
    /// Non-terminal candidates score `reward + γ · online(next)`, terminal ones
    /// their reward alone.
    pub fn act<R>(
        &self,
        next_states: &NextStates,
        rng: &mut R,
    ) -> Result<Option<Action>, ApproximatorError>
    where
        R: Rng + ?Sized,
    {
        let next_features = next_states
            .iter()
            .map(|(_, outcome)| extract(&outcome.board))
            .collect::<Vec<_>>();
        let mut next_values = self.online.predict_batch(&next_features)?.into_iter();
        Ok(self.exploration.select(next_states, rng, |outcome| {
            let next_value = next_values.next().unwrap_or_default();
            if outcome.terminal {
                outcome.reward
            } else {
                outcome.reward + self.config.gamma * next_value
            }
        }))
    }

    pub fn remember(&mut self, transition: Transition) {
        self.memory.save(transition);
    }

    /// Trains the online approximator on one sampled batch.
    ///
    /// Returns `Ok(None)` without doing anything while the memory holds fewer
    /// than `batch_size` transitions, otherwise the batch loss.
    pub fn learn<R>(&mut self, rng: &mut R) -> Result<Option<f32>, ValueAgentError>
    where
        R: Rng + ?Sized,
    {
        if self.memory.len() < self.config.batch_size {
            return Ok(None);
        }
        let batch = self.memory.sample(self.config.batch_size, rng)?;

        let features = batch.iter().map(|t| t.before).collect::<Vec<_>>();
        let next_features = batch.iter().map(|t| t.after).collect::<Vec<_>>();
        let next_values = self.target.predict_batch(&next_features)?;
        let targets = iter::zip(&batch, next_values)
            .map(|(t, next_value)| {
                if t.terminal {
                    t.reward
                } else {
                    t.reward + self.config.gamma * next_value
                }
            })
            .collect::<Vec<_>>();
        let loss = self.online.train_step(&features, &targets)?;

        self.learn_steps += 1;
        if self.learn_steps % self.config.target_sync_interval == 0 {
            self.target.load_parameters(&self.online.clone_parameters()?)?;
            debug!(learn_steps = self.learn_steps, "synchronised target approximator");
        }
        Ok(Some(loss))
    }

    /// `ε ← max(ε_min, ε · decay)`, once per finished episode.
    pub fn update_epsilon(&mut self) {
        self.exploration.decay();
    }
}
