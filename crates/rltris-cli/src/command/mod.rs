use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use rltris_engine::Seed;
use tracing::Level;
use tracing_subscriber::prelude::*;

use self::{evaluate::EvaluateArg, train_tabular::TrainTabularArg, train_value::TrainValueArg};

mod evaluate;
mod train_tabular;
mod train_value;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Train the discretized tabular TD(0) agent
    TrainTabular(#[clap(flatten)] TrainTabularArg),
    /// Train the replay-based value-approximation agent
    TrainValue(#[clap(flatten)] TrainValueArg),
    /// Play greedy episodes with a saved checkpoint
    Evaluate(#[clap(flatten)] EvaluateArg),
}

/// Options shared by the training commands.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainCommonArg {
    /// JSON config file; missing fields keep their defaults
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    /// Number of episodes, overriding the config file
    #[arg(long)]
    pub(crate) episodes: Option<usize>,
    /// Run seed (32 hex characters or a decimal u64); random if omitted
    #[arg(long)]
    pub(crate) seed: Option<Seed>,
    /// Checkpoint output file path (stdout if omitted)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Name stored in the checkpoint
    #[arg(long)]
    pub(crate) name: Option<String>,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(level))
        .init();
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_tracing(args.verbose);
    match args.mode {
        Mode::TrainTabular(arg) => train_tabular::run(&arg)?,
        Mode::TrainValue(arg) => train_value::run(&arg)?,
        Mode::Evaluate(arg) => evaluate::run(&arg)?,
    }
    Ok(())
}
