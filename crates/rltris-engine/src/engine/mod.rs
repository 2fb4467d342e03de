//! Placement enumeration and episode simulation.
//!
//! - [`enumerate_next_states`] - every legal landing of a piece, with reward and
//!   terminal status
//! - [`Simulator`] - owns the board and active piece for one episode at a time
//! - [`EpisodeStats`] - accumulated score, pieces and line clears
//! - [`Seed`] - seed for deterministic piece draws
//!
//! # Episode Flow
//!
//! 1. [`Simulator::reset`] empties the board and draws a piece
//! 2. [`Simulator::enumerate_next_states`] lists every `(rotation, column)` action
//! 3. The caller picks one and plays it with [`Simulator::step`]
//! 4. Repeat until the step reports a terminal outcome or no action is left
//!
//! # Rewards
//!
//! Every landed piece earns `1 + 10 * lines²`. A placement that leaves any cell
//! of the top row occupied ends the episode and costs an extra 25. Playing an
//! action that is not currently legal ends the episode with a reward of -10.

pub use self::{episode_stats::*, placement::*, seed::*, simulator::*};

mod episode_stats;
mod placement;
mod seed;
mod simulator;
