use anyhow::Context as _;
use rand::Rng as _;
use rltris_agents::{Mlp, ValueAgent};
use rltris_engine::Simulator;
use tracing::info;

use crate::{
    command::TrainCommonArg,
    schema::{
        checkpoint::{Checkpoint, ValueCheckpoint},
        run_config::ValueRunConfig,
    },
    util,
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainValueArg {
    #[clap(flatten)]
    pub(crate) common: TrainCommonArg,
}

pub(crate) fn run(arg: &TrainValueArg) -> anyhow::Result<()> {
    let TrainCommonArg {
        config,
        episodes,
        seed,
        output,
        name,
    } = &arg.common;

    let mut run_config: ValueRunConfig = util::read_config(config.as_ref())?;
    if let Some(episodes) = episodes {
        run_config.training.episodes = *episodes;
    }
    anyhow::ensure!(
        run_config.agent.batch_size > 0 && run_config.agent.target_sync_interval > 0,
        "batch_size and target_sync_interval must be positive"
    );
    anyhow::ensure!(
        run_config.agent.memory_capacity >= run_config.agent.batch_size,
        "memory_capacity must be at least batch_size"
    );
    anyhow::ensure!(run_config.mlp.hidden_size > 0, "hidden_size must be positive");

    let (seed, mut rng) = util::seeded_rng(*seed);
    let mut sim = Simulator::with_seed(rng.random());
    let mlp = Mlp::new(run_config.mlp, &mut rng).context("Failed to build the value network")?;
    let mut agent = ValueAgent::new(run_config.agent, mlp)?;

    info!(
        episodes = run_config.training.episodes,
        hidden_size = run_config.mlp.hidden_size,
        hidden_layers = run_config.mlp.hidden_layers,
        "training value agent"
    );
    let summary = rltris_training::train(&mut sim, &mut agent, &run_config.training, &mut rng)?;
    info!(
        final_average_score = summary.final_average_score,
        best_score = summary.best_score,
        learn_steps = agent.learn_steps(),
        "value training completed"
    );

    let checkpoint = ValueCheckpoint::new(
        name.clone().unwrap_or_else(|| "value".to_owned()),
        seed,
        summary.episodes,
        summary.final_average_score,
        &agent,
    )?;
    util::save_json(&Checkpoint::Value(checkpoint), output.as_deref())?;
    if let Some(path) = output {
        info!(path = %path.display(), "checkpoint saved");
    }
    Ok(())
}
