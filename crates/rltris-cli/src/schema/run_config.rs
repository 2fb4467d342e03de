use rltris_agents::{MlpConfig, TabularConfig, ValueAgentConfig};
use rltris_training::TrainingConfig;
use serde::{Deserialize, Serialize};

/// Contents of a `train-tabular --config` file. Every field is optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct TabularRunConfig {
    pub training: TrainingConfig,
    pub agent: TabularConfig,
}

/// Contents of a `train-value --config` file. Every field is optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ValueRunConfig {
    pub training: TrainingConfig,
    pub agent: ValueAgentConfig,
    pub mlp: MlpConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_fields_fall_back_to_defaults() {
        let config: ValueRunConfig = serde_json::from_str(
            r#"{ "training": { "episodes": 20 }, "mlp": { "hidden_size": 32 } }"#,
        )
        .unwrap();
        assert_eq!(config.training.episodes, 20);
        assert_eq!(config.training.max_steps_per_episode, 5_000);
        assert_eq!(config.mlp.hidden_size, 32);
        assert_eq!(config.mlp.hidden_layers, 3);
        assert_eq!(config.agent, ValueAgentConfig::default());
    }

    #[test]
    fn test_empty_tabular_config() {
        let config: TabularRunConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, TabularRunConfig::default());
    }
}
