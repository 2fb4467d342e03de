//! Episode loop and training driver.
//!
//! # How Training Works
//!
//! 1. **Reset** - the simulator starts an empty board with a random piece
//! 2. **Enumerate** - every legal placement of the piece is listed with its outcome
//! 3. **Select** - the agent picks one placement (epsilon-greedy)
//! 4. **Step** - the simulator plays it and reports reward and terminal status
//! 5. **Observe** - the agent learns from `(features before, reward, features after, terminal)`
//! 6. **Repeat** - until game over, no legal placement, or the step bound
//!
//! After each episode [`Agent::end_episode`](rltris_agents::Agent::end_episode)
//! decays exploration (and, for the tabular agent, the learning rate). A
//! rolling [`ScoreWindow`] tracks the average score reported every
//! `report_interval` episodes through `tracing`.
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg32;
//! use rltris_agents::{TabularAgent, TabularConfig};
//! use rltris_engine::{Seed, Simulator};
//! use rltris_training::{TrainingConfig, train};
//!
//! let mut rng = Pcg32::seed_from_u64(0);
//! let mut sim = Simulator::with_seed(Seed::from(0));
//! let mut agent = TabularAgent::new(TabularConfig::default());
//! let config = TrainingConfig {
//!     episodes: 3,
//!     max_steps_per_episode: 20,
//!     ..TrainingConfig::default()
//! };
//! let summary = train(&mut sim, &mut agent, &config, &mut rng).unwrap();
//! assert_eq!(summary.episodes, 3);
//! ```

pub use self::{
    episode::{EpisodeEnd, EpisodeReport, play_episode, run_episode},
    score_window::ScoreWindow,
    trainer::{EvaluationSummary, TrainingConfig, TrainingSummary, evaluate, train},
};

mod episode;
mod score_window;
mod trainer;
