use chrono::{DateTime, Utc};
use rltris_engine::Seed;
use rltris_training::EvaluationSummary;
use serde::{Deserialize, Serialize};

/// Greedy episodes played with a saved checkpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct EvaluationRecord {
    pub checkpoint: String,
    /// Seed of the run that trained the checkpoint.
    pub training_seed: Seed,
    /// Seed of the evaluation episodes.
    pub seed: Seed,
    pub evaluated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub summary: EvaluationSummary,
}

#[cfg(test)]
mod tests {
    use rltris_training::{EpisodeEnd, EpisodeReport};

    use super::*;

    #[test]
    fn test_record_flattens_summary() {
        let record = EvaluationRecord {
            checkpoint: "value".to_owned(),
            training_seed: Seed::from(1),
            seed: Seed::from(255),
            evaluated_at: Utc::now(),
            summary: EvaluationSummary {
                reports: vec![EpisodeReport {
                    score: 12.0,
                    steps: 4,
                    lines_cleared: 1,
                    end: EpisodeEnd::GameOver,
                }],
                average_score: 12.0,
                average_lines_cleared: 1.0,
            },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["seed"], "000000000000000000000000000000ff");
        assert_eq!(json["average_score"], 12.0);
        assert_eq!(json["reports"][0]["end"], "GameOver");

        let restored: EvaluationRecord = serde_json::from_value(json).unwrap();
        assert_eq!(restored, record);
    }
}
