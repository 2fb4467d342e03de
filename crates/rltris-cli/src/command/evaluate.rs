use std::path::PathBuf;

use anyhow::Context as _;
use chrono::Utc;
use rand::Rng as _;
use rltris_engine::{Seed, Simulator};
use rltris_training::EvaluationSummary;
use tracing::info;

use crate::{
    schema::{checkpoint::Checkpoint, evaluation::EvaluationRecord},
    util,
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    /// Checkpoint written by a training command
    pub(crate) checkpoint: PathBuf,
    /// Number of greedy episodes to play
    #[arg(long, default_value_t = 10)]
    pub(crate) episodes: usize,
    /// Upper bound on placements per episode
    #[arg(long, default_value_t = 5_000)]
    pub(crate) max_steps: usize,
    /// Seed for piece draws and tie-breaking; random if omitted
    #[arg(long)]
    pub(crate) seed: Option<Seed>,
    /// Output file path for the evaluation summary (stdout if omitted)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    let EvaluateArg {
        checkpoint,
        episodes,
        max_steps,
        seed,
        output,
    } = arg;

    let checkpoint: Checkpoint = util::read_json_file("checkpoint", checkpoint)?;
    let (seed, mut rng) = util::seeded_rng(*seed);
    let mut sim = Simulator::with_seed(rng.random());

    info!(name = checkpoint.name(), episodes, "evaluating checkpoint");
    let summary: EvaluationSummary = match &checkpoint {
        Checkpoint::Tabular(checkpoint) => {
            let mut agent = checkpoint.to_agent();
            let Ok(summary) =
                rltris_training::evaluate(&mut sim, &mut agent, *episodes, *max_steps, &mut rng);
            summary
        }
        Checkpoint::Value(checkpoint) => {
            let mut agent = checkpoint
                .to_agent()
                .context("Checkpoint parameters do not match its network config")?;
            rltris_training::evaluate(&mut sim, &mut agent, *episodes, *max_steps, &mut rng)?
        }
    };
    info!(
        average_score = summary.average_score,
        average_lines_cleared = summary.average_lines_cleared,
        "evaluation completed"
    );

    let record = EvaluationRecord {
        checkpoint: checkpoint.name().to_owned(),
        training_seed: checkpoint.seed(),
        seed,
        evaluated_at: Utc::now(),
        summary,
    };
    util::save_json(&record, output.as_deref())
}
