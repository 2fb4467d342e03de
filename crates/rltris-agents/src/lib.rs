//! Learning agents that choose placements from enumerated next states.
//!
//! Two agents share the same epsilon-greedy policy ([`EpsilonGreedy`]) and the
//! same [`Agent`] contract used by the training loop:
//!
//! - [`TabularAgent`] - discretizes features into a [`BucketKey`] and learns a
//!   sparse [`QTable`] with one-step TD updates applied immediately
//! - [`ValueAgent`] - stores [`Transition`]s in a [`ReplayMemory`] and trains a
//!   [`ValueApproximator`] on random batches, computing TD targets with a
//!   target copy that is hard-synchronised every few learning steps
//!
//! [`Mlp`] is the bundled [`ValueApproximator`].
//!
//! # Candidate Scoring
//!
//! Both agents score a candidate placement by its immediate reward plus the
//! discounted value of the board it produces:
//!
//! ```text
//! tabular: reward + γ · Q(bucket(features(board)))
//! value:   reward                                     if terminal
//!          reward + γ · online.predict(features(board)) otherwise
//! ```
//!
//! The first candidate with the strictly greatest score wins, so selection is
//! deterministic for a fixed enumeration order when exploration is off.
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg32;
//! use rltris_agents::{Agent, TabularAgent, TabularConfig, Transition};
//! use rltris_engine::{Seed, Simulator};
//! use rltris_features::extract;
//!
//! let mut rng = Pcg32::seed_from_u64(0);
//! let mut sim = Simulator::with_seed(Seed::from(0));
//! let mut agent = TabularAgent::new(TabularConfig::default());
//!
//! let before = extract(sim.board());
//! let states = sim.enumerate_next_states();
//! let action = agent.select_action(&states, &mut rng).unwrap();
//! let step = sim.step(action);
//! let after = extract(sim.board());
//! agent
//!     .observe(Transition::new(before, step.reward, after, step.terminal), &mut rng)
//!     .unwrap();
//! assert_eq!(agent.table().len(), 1);
//! ```

pub use self::{
    agent::Agent,
    approximator::{ApproximatorError, ValueApproximator},
    exploration::{EpsilonGreedy, ExplorationConfig, greedy_action},
    mlp::{Mlp, MlpConfig, MlpParameters},
    replay_memory::{ReplayMemory, SampleError, Transition},
    tabular::{BucketKey, QTable, TabularAgent, TabularConfig},
    value_agent::{ValueAgent, ValueAgentConfig, ValueAgentError},
};

mod agent;
mod approximator;
mod exploration;
mod mlp;
mod replay_memory;
mod tabular;
mod value_agent;
