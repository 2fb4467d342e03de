//! Falling-block puzzle simulator used as a reinforcement learning environment.
//!
//! - [`core`] holds the static piece registry and the occupancy [`Board`].
//! - [`engine`] enumerates every legal landing of the active piece and drives
//!   episodes through the [`Simulator`].
//!
//! # Example
//!
//! ```
//! use rltris_engine::{Seed, Simulator};
//!
//! let mut sim = Simulator::with_seed(Seed::from(7));
//! let next_states = sim.enumerate_next_states();
//! let (action, _outcome) = next_states.iter().next().unwrap();
//! let outcome = sim.step(action);
//! assert!(!outcome.terminal);
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;
