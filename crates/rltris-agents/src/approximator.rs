use std::slice;

use rltris_features::FeatureVector;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ApproximatorError {
    #[display("batch has {features} feature rows but {targets} targets")]
    BatchLengthMismatch { features: usize, targets: usize },
    #[display("cannot train on an empty batch")]
    EmptyBatch,
    #[display("parameter shape {found:?} does not match approximator shape {expected:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    #[display("tensor operation failed: {_0}")]
    Tensor(candle_core::Error),
}

impl From<candle_core::Error> for ApproximatorError {
    fn from(err: candle_core::Error) -> Self {
        Self::Tensor(err)
    }
}

/// A trainable estimate of the value of a board, given its features.
///
/// Parameters can be copied out as an opaque snapshot and loaded back, which
/// is how a frozen target copy is kept in sync with the online approximator.
pub trait ValueApproximator: Sized {
    type Snapshot;

    /// Values of every row of `features`, in order.
    fn predict_batch(&self, features: &[FeatureVector]) -> Result<Vec<f32>, ApproximatorError>;

    fn predict(&self, features: &FeatureVector) -> Result<f32, ApproximatorError> {
        let values = self.predict_batch(slice::from_ref(features))?;
        Ok(values.first().copied().unwrap_or_default())
    }

    /// Performs one gradient-based update minimizing the mean squared error
    /// between `predict(features[i])` and `targets[i]`. Returns the loss
    /// measured before the update.
    fn train_step(
        &mut self,
        features: &[FeatureVector],
        targets: &[f32],
    ) -> Result<f32, ApproximatorError>;

    fn clone_parameters(&self) -> Result<Self::Snapshot, ApproximatorError>;

    fn load_parameters(&mut self, snapshot: &Self::Snapshot) -> Result<(), ApproximatorError>;

    /// An independent approximator with the same parameters. Training either
    /// copy leaves the other untouched.
    fn try_clone(&self) -> Result<Self, ApproximatorError>;
}

pub(crate) fn check_batch(features: &[FeatureVector], targets: &[f32]) -> Result<(), ApproximatorError> {
    if features.len() != targets.len() {
        return Err(ApproximatorError::BatchLengthMismatch {
            features: features.len(),
            targets: targets.len(),
        });
    }
    if features.is_empty() {
        return Err(ApproximatorError::EmptyBatch);
    }
    Ok(())
}
