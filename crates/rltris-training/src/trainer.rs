use rand::Rng;
use rltris_agents::Agent;
use rltris_engine::Simulator;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    episode::{self, EpisodeReport},
    score_window::ScoreWindow,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub episodes: usize,
    /// Upper bound on placements per episode.
    pub max_steps_per_episode: usize,
    /// Episodes between two progress reports.
    pub report_interval: usize,
    /// Number of recent episodes in the rolling average.
    pub score_window: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 10_000,
            max_steps_per_episode: 5_000,
            report_interval: 100,
            score_window: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub episodes: usize,
    /// Rolling average score over the last `score_window` episodes.
    pub final_average_score: f32,
    pub best_score: f32,
    pub total_steps: usize,
}

/// Trains `agent` for `config.episodes` episodes.
///
/// After every episode the agent's per-episode schedules advance through
/// [`Agent::end_episode`]. Progress is logged every `report_interval` episodes.
pub fn train<A, R>(
    sim: &mut Simulator,
    agent: &mut A,
    config: &TrainingConfig,
    rng: &mut R,
) -> Result<TrainingSummary, A::Error>
where
    A: Agent,
    R: Rng + ?Sized,
{
    let mut window = ScoreWindow::new(config.score_window.max(1));
    let mut best_score = f32::NEG_INFINITY;
    let mut total_steps = 0;

    for episode in 1..=config.episodes {
        let report = episode::run_episode(sim, agent, config.max_steps_per_episode, rng)?;
        agent.end_episode();

        window.push(report.score);
        best_score = best_score.max(report.score);
        total_steps += report.steps;
        debug!(
            episode,
            score = report.score,
            steps = report.steps,
            end = ?report.end,
            "episode finished"
        );

        if config.report_interval > 0 && episode % config.report_interval == 0 {
            info!(
                episode,
                average_score = format_args!("{:.2}", window.average()),
                best_score,
                epsilon = format_args!("{:.4}", agent.epsilon()),
                "training progress"
            );
        }
    }

    Ok(TrainingSummary {
        episodes: config.episodes,
        final_average_score: window.average(),
        best_score: if config.episodes == 0 { 0.0 } else { best_score },
        total_steps,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub reports: Vec<EpisodeReport>,
    pub average_score: f32,
    pub average_lines_cleared: f32,
}

/// Plays `episodes` greedy episodes with exploration turned off.
pub fn evaluate<A, R>(
    sim: &mut Simulator,
    agent: &mut A,
    episodes: usize,
    max_steps: usize,
    rng: &mut R,
) -> Result<EvaluationSummary, A::Error>
where
    A: Agent,
    R: Rng + ?Sized,
{
    agent.set_exploration(false);
    let reports = (0..episodes)
        .map(|_| episode::play_episode(sim, agent, max_steps, rng))
        .collect::<Result<Vec<_>, _>>()?;

    #[expect(clippy::cast_precision_loss)]
    let n = reports.len().max(1) as f32;
    #[expect(clippy::cast_precision_loss)]
    let lines = reports.iter().map(|r| r.lines_cleared).sum::<usize>() as f32;
    Ok(EvaluationSummary {
        average_score: reports.iter().map(|r| r.score).sum::<f32>() / n,
        average_lines_cleared: lines / n,
        reports,
    })
}
