use chrono::{DateTime, Utc};
use rltris_agents::{
    ApproximatorError, Mlp, MlpConfig, MlpParameters, QTable, TabularAgent, TabularConfig,
    ValueAgent, ValueAgentConfig, ValueApproximator as _,
};
use rltris_engine::Seed;
use serde::{Deserialize, Serialize};

/// A trained agent saved to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum Checkpoint {
    Tabular(TabularCheckpoint),
    Value(ValueCheckpoint),
}

impl Checkpoint {
    pub(crate) fn name(&self) -> &str {
        match self {
            Self::Tabular(checkpoint) => &checkpoint.name,
            Self::Value(checkpoint) => &checkpoint.name,
        }
    }

    /// Seed of the training run that produced this checkpoint.
    pub(crate) fn seed(&self) -> Seed {
        match self {
            Self::Tabular(checkpoint) => checkpoint.seed,
            Self::Value(checkpoint) => checkpoint.seed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct TabularCheckpoint {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    /// Run seed; retraining with it reproduces this checkpoint.
    pub seed: Seed,
    pub episodes: usize,
    pub final_average_score: f32,
    pub config: TabularConfig,
    pub table: QTable,
}

impl TabularCheckpoint {
    pub(crate) fn new(
        name: String,
        seed: Seed,
        episodes: usize,
        final_average_score: f32,
        agent: &TabularAgent,
    ) -> Self {
        Self {
            name,
            trained_at: Utc::now(),
            seed,
            episodes,
            final_average_score,
            config: *agent.config(),
            table: agent.table().clone(),
        }
    }

    pub(crate) fn to_agent(&self) -> TabularAgent {
        TabularAgent::with_table(self.config, self.table.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ValueCheckpoint {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    /// Run seed; retraining with it reproduces this checkpoint.
    pub seed: Seed,
    pub episodes: usize,
    pub final_average_score: f32,
    pub config: ValueAgentConfig,
    pub mlp: MlpConfig,
    /// Online approximator parameters.
    pub parameters: MlpParameters,
}

impl ValueCheckpoint {
    pub(crate) fn new(
        name: String,
        seed: Seed,
        episodes: usize,
        final_average_score: f32,
        agent: &ValueAgent<Mlp>,
    ) -> Result<Self, ApproximatorError> {
        Ok(Self {
            name,
            trained_at: Utc::now(),
            seed,
            episodes,
            final_average_score,
            config: *agent.config(),
            mlp: *agent.online().config(),
            parameters: agent.online().clone_parameters()?,
        })
    }

    pub(crate) fn to_agent(&self) -> Result<ValueAgent<Mlp>, ApproximatorError> {
        let mlp = Mlp::from_parameters(self.mlp, &self.parameters)?;
        ValueAgent::new(self.config, mlp)
    }
}
