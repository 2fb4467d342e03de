use rand::Rng as _;
use rltris_agents::TabularAgent;
use rltris_engine::Simulator;
use tracing::info;

use crate::{
    command::TrainCommonArg,
    schema::{
        checkpoint::{Checkpoint, TabularCheckpoint},
        run_config::TabularRunConfig,
    },
    util,
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainTabularArg {
    #[clap(flatten)]
    pub(crate) common: TrainCommonArg,
}

pub(crate) fn run(arg: &TrainTabularArg) -> anyhow::Result<()> {
    let TrainCommonArg {
        config,
        episodes,
        seed,
        output,
        name,
    } = &arg.common;

    let mut run_config: TabularRunConfig = util::read_config(config.as_ref())?;
    if let Some(episodes) = episodes {
        run_config.training.episodes = *episodes;
    }
    let (seed, mut rng) = util::seeded_rng(*seed);
    let mut sim = Simulator::with_seed(rng.random());
    let mut agent = TabularAgent::new(run_config.agent);

    info!(
        episodes = run_config.training.episodes,
        "training tabular agent"
    );
    let Ok(summary) = rltris_training::train(&mut sim, &mut agent, &run_config.training, &mut rng);
    info!(
        final_average_score = summary.final_average_score,
        best_score = summary.best_score,
        states = agent.table().len(),
        learning_rate = agent.learning_rate(),
        "tabular training completed"
    );

    let checkpoint = TabularCheckpoint::new(
        name.clone().unwrap_or_else(|| "tabular".to_owned()),
        seed,
        summary.episodes,
        summary.final_average_score,
        &agent,
    );
    util::save_json(&Checkpoint::Tabular(checkpoint), output.as_deref())?;
    if let Some(path) = output {
        info!(path = %path.display(), "checkpoint saved");
    }
    Ok(())
}
