//! Small fully connected network used as the value approximator.
//!
//! Topology is `4 → hidden × N (ReLU) → 1`, built from `candle_nn` linear
//! layers whose variables live in a [`VarMap`]. Weights start He-normal and the
//! output layer is additionally scaled by [`MlpConfig::output_gain`] so that
//! initial value estimates start near zero. Initial values are drawn from the
//! caller's RNG, which keeps seeded runs reproducible. Training minimizes the
//! batch mean squared error with Adam (`AdamW` without weight decay).

use std::{fmt, iter};

use candle_core::{DType, Device, Tensor};
use candle_nn::{
    AdamW, Init, Linear, Module as _, Optimizer as _, ParamsAdamW, VarBuilder, VarMap,
};
use rand::Rng;
use rand_distr::StandardNormal;
use rltris_features::FeatureVector;
use serde::{Deserialize, Serialize};

use crate::approximator::{self, ApproximatorError, ValueApproximator};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MlpConfig {
    pub hidden_size: usize,
    pub hidden_layers: usize,
    pub learning_rate: f32,
    /// Scale of the output layer's initial weights.
    pub output_gain: f32,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            hidden_size: 64,
            hidden_layers: 3,
            learning_rate: 1e-3,
            output_gain: 0.01,
        }
    }
}

impl MlpConfig {
    /// Layer widths from input to output, e.g. `[4, 64, 64, 64, 1]`.
    #[must_use]
    pub fn shape(&self) -> Vec<usize> {
        iter::once(FeatureVector::LEN)
            .chain(iter::repeat_n(self.hidden_size, self.hidden_layers))
            .chain(iter::once(1))
            .collect()
    }
}

/// Weights (row-major, `outputs × inputs`) and biases of one linear layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct LayerParameters {
    inputs: usize,
    outputs: usize,
    weights: Vec<f32>,
    biases: Vec<f32>,
}

impl LayerParameters {
    #[expect(clippy::cast_precision_loss)]
    fn he_normal<R>(inputs: usize, outputs: usize, gain: f32, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let std_dev = gain * (2.0 / inputs as f32).sqrt();
        let weights = (0..inputs * outputs)
            .map(|_| rng.sample::<f32, _>(StandardNormal) * std_dev)
            .collect();
        Self {
            inputs,
            outputs,
            weights,
            biases: vec![0.0; outputs],
        }
    }

    fn read(layer: &Linear) -> candle_core::Result<Self> {
        let (outputs, inputs) = layer.weight().dims2()?;
        let weights = layer.weight().flatten_all()?.to_vec1::<f32>()?;
        let biases = match layer.bias() {
            Some(bias) => bias.to_vec1::<f32>()?,
            None => vec![0.0; outputs],
        };
        Ok(Self {
            inputs,
            outputs,
            weights,
            biases,
        })
    }

    fn is_consistent(&self) -> bool {
        self.weights.len() == self.inputs * self.outputs && self.biases.len() == self.outputs
    }
}

/// Snapshot of every network parameter. Serialisable for checkpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MlpParameters {
    layers: Vec<LayerParameters>,
}

impl MlpParameters {
    fn he_normal<R>(config: &MlpConfig, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let shape = config.shape();
        let last = shape.len() - 2;
        let layers = shape
            .windows(2)
            .enumerate()
            .map(|(i, w)| {
                let gain = if i == last { config.output_gain } else { 1.0 };
                LayerParameters::he_normal(w[0], w[1], gain, rng)
            })
            .collect();
        Self { layers }
    }

    /// Layer widths from input to output.
    #[must_use]
    pub fn shape(&self) -> Vec<usize> {
        self.layers
            .first()
            .map(|layer| layer.inputs)
            .into_iter()
            .chain(self.layers.iter().map(|layer| layer.outputs))
            .collect()
    }

    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|layer| layer.weights.len() + layer.biases.len())
            .sum()
    }

    fn check_shape(&self, expected: &[usize]) -> Result<(), ApproximatorError> {
        let found = self.shape();
        if found != expected || !self.layers.iter().all(LayerParameters::is_consistent) {
            return Err(ApproximatorError::ShapeMismatch {
                expected: expected.to_vec(),
                found,
            });
        }
        Ok(())
    }
}

fn variable_name(layer: usize, tensor: &str) -> String {
    format!("layer_{layer}.{tensor}")
}

/// Multilayer perceptron value approximator.
pub struct Mlp {
    config: MlpConfig,
    device: Device,
    varmap: VarMap,
    layers: Vec<Linear>,
    optimizer: AdamW,
}

impl fmt::Debug for Mlp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mlp")
            .field("config", &self.config)
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

impl Mlp {
    /// Creates a randomly initialised network.
    ///
    /// # Panics
    ///
    /// Panics if `hidden_size` is zero.
    pub fn new<R>(config: MlpConfig, rng: &mut R) -> Result<Self, ApproximatorError>
    where
        R: Rng + ?Sized,
    {
        assert!(config.hidden_size > 0, "hidden layers must not be empty");
        let params = MlpParameters::he_normal(&config, rng);
        let mut mlp = Self::zeroed(config)?;
        mlp.load_parameters(&params)?;
        Ok(mlp)
    }

    /// Restores a network from saved parameters with a fresh optimizer state.
    pub fn from_parameters(
        config: MlpConfig,
        params: &MlpParameters,
    ) -> Result<Self, ApproximatorError> {
        params.check_shape(&config.shape())?;
        let mut mlp = Self::zeroed(config)?;
        mlp.load_parameters(params)?;
        Ok(mlp)
    }

    fn zeroed(config: MlpConfig) -> Result<Self, ApproximatorError> {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let layers = config
            .shape()
            .windows(2)
            .enumerate()
            .map(|(i, w)| {
                let vb = vb.pp(format!("layer_{i}"));
                let weight = vb.get_with_hints((w[1], w[0]), "weight", Init::Const(0.0))?;
                let bias = vb.get_with_hints(w[1], "bias", Init::Const(0.0))?;
                Ok(Linear::new(weight, Some(bias)))
            })
            .collect::<candle_core::Result<Vec<_>>>()?;
        let optimizer = AdamW::new(
            varmap.all_vars(),
            ParamsAdamW {
                lr: f64::from(config.learning_rate),
                weight_decay: 0.0,
                ..ParamsAdamW::default()
            },
        )?;
        Ok(Self {
            config,
            device,
            varmap,
            layers,
            optimizer,
        })
    }

    #[must_use]
    pub fn config(&self) -> &MlpConfig {
        &self.config
    }

    /// Network output for a `batch × 4` input, flattened to `batch`.
    fn forward(&self, features: &[FeatureVector]) -> candle_core::Result<Tensor> {
        let values = features
            .iter()
            .flat_map(|f| f.to_array())
            .collect::<Vec<f32>>();
        let mut x = Tensor::from_vec(values, (features.len(), FeatureVector::LEN), &self.device)?;
        for (i, layer) in self.layers.iter().enumerate() {
            x = layer.forward(&x)?;
            if i + 1 < self.layers.len() {
                x = x.relu()?;
            }
        }
        x.squeeze(1)
    }
}

impl ValueApproximator for Mlp {
    type Snapshot = MlpParameters;

    fn predict_batch(&self, features: &[FeatureVector]) -> Result<Vec<f32>, ApproximatorError> {
        if features.is_empty() {
            return Ok(vec![]);
        }
        Ok(self.forward(features)?.to_vec1::<f32>()?)
    }

    fn train_step(
        &mut self,
        features: &[FeatureVector],
        targets: &[f32],
    ) -> Result<f32, ApproximatorError> {
        approximator::check_batch(features, targets)?;
        let predictions = self.forward(features)?;
        let target_tensor = Tensor::from_slice(targets, targets.len(), &self.device)?;
        let loss = candle_nn::loss::mse(&predictions, &target_tensor)?;
        self.optimizer.backward_step(&loss)?;
        Ok(loss.to_scalar::<f32>()?)
    }

    fn clone_parameters(&self) -> Result<MlpParameters, ApproximatorError> {
        let layers = self
            .layers
            .iter()
            .map(LayerParameters::read)
            .collect::<candle_core::Result<Vec<_>>>()?;
        Ok(MlpParameters { layers })
    }

    /// Overwrites every variable in place. The optimizer keeps its moments.
    fn load_parameters(&mut self, snapshot: &MlpParameters) -> Result<(), ApproximatorError> {
        snapshot.check_shape(&self.config.shape())?;
        for (i, layer) in snapshot.layers.iter().enumerate() {
            let weight =
                Tensor::from_slice(&layer.weights, (layer.outputs, layer.inputs), &self.device)?;
            let bias = Tensor::from_slice(&layer.biases, layer.outputs, &self.device)?;
            self.varmap.set_one(variable_name(i, "weight"), weight)?;
            self.varmap.set_one(variable_name(i, "bias"), bias)?;
        }
        Ok(())
    }

    fn try_clone(&self) -> Result<Self, ApproximatorError> {
        let mut copy = Self::zeroed(self.config)?;
        copy.load_parameters(&self.clone_parameters()?)?;
        Ok(copy)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn small_config() -> MlpConfig {
        MlpConfig {
            hidden_size: 8,
            hidden_layers: 2,
            learning_rate: 1e-2,
            output_gain: 0.01,
        }
    }

    fn small_mlp(seed: u64) -> Mlp {
        let mut rng = Pcg32::seed_from_u64(seed);
        Mlp::new(small_config(), &mut rng).unwrap()
    }

    #[test]
    fn test_shape_and_parameter_count() {
        let mut rng = Pcg32::seed_from_u64(0);
        let mlp = Mlp::new(MlpConfig::default(), &mut rng).unwrap();
        let params = mlp.clone_parameters().unwrap();
        assert_eq!(params.shape(), [4, 64, 64, 64, 1]);
        assert_eq!(
            params.parameter_count(),
            (4 * 64 + 64) + 2 * (64 * 64 + 64) + (64 + 1)
        );
    }

    #[test]
    fn test_same_seed_same_parameters() {
        let a = small_mlp(9).clone_parameters().unwrap();
        let b = small_mlp(9).clone_parameters().unwrap();
        let c = small_mlp(10).clone_parameters().unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_initial_predictions_are_small() {
        let mlp = small_mlp(1);
        let prediction = mlp.predict(&FeatureVector::new(5.0, 1.0, 4.0, 3.0)).unwrap();
        assert!(prediction.abs() < 1.0, "prediction: {prediction}");
    }

    #[test]
    fn test_predict_batch_matches_single_predictions() {
        let mlp = small_mlp(11);
        let features = [
            FeatureVector::new(0.0, 0.0, 0.0, 0.0),
            FeatureVector::new(12.0, 2.0, 5.0, 4.0),
        ];
        let batch = mlp.predict_batch(&features).unwrap();
        assert_eq!(batch.len(), 2);
        for (value, f) in iter::zip(&batch, &features) {
            assert!((value - mlp.predict(f).unwrap()).abs() < 1e-5);
        }
        assert!(mlp.predict_batch(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_training_reduces_loss() {
        let mut mlp = small_mlp(2);
        let features = [
            FeatureVector::new(0.0, 0.0, 0.0, 0.0),
            FeatureVector::new(4.0, 1.0, 2.0, 2.0),
            FeatureVector::new(10.0, 2.0, 6.0, 4.0),
        ];
        let targets = [1.0, 2.0, 3.0];

        let first = mlp.train_step(&features, &targets).unwrap();
        let mut last = first;
        for _ in 0..2000 {
            last = mlp.train_step(&features, &targets).unwrap();
        }
        assert!(last < first * 0.1, "first: {first}, last: {last}");
    }

    #[test]
    fn test_zero_learning_rate_keeps_parameters() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut mlp = Mlp::new(
            MlpConfig {
                learning_rate: 0.0,
                ..small_config()
            },
            &mut rng,
        )
        .unwrap();
        let before = mlp.clone_parameters().unwrap();
        mlp.train_step(&[FeatureVector::new(1.0, 1.0, 1.0, 1.0)], &[5.0])
            .unwrap();
        assert_eq!(mlp.clone_parameters().unwrap(), before);
    }

    #[test]
    fn test_loss_is_mean_squared_error() {
        let mut mlp = small_mlp(4);
        let features = [
            FeatureVector::new(1.0, 0.0, 0.0, 1.0),
            FeatureVector::new(2.0, 0.0, 1.0, 1.0),
        ];
        let predictions = mlp.predict_batch(&features).unwrap();
        let expected = ((predictions[0] - 3.0).powi(2) + (predictions[1] + 1.0).powi(2)) / 2.0;
        let loss = mlp.train_step(&features, &[3.0, -1.0]).unwrap();
        assert!((loss - expected).abs() < 1e-4);
    }

    #[test]
    fn test_load_parameters_copies_predictions() {
        let source = small_mlp(5);
        let mut copy = small_mlp(6);
        let features = FeatureVector::new(7.0, 1.0, 3.0, 2.0);
        assert_ne!(source.predict(&features).unwrap(), copy.predict(&features).unwrap());

        copy.load_parameters(&source.clone_parameters().unwrap())
            .unwrap();
        assert_eq!(source.predict(&features).unwrap(), copy.predict(&features).unwrap());
    }

    #[test]
    fn test_try_clone_is_independent() {
        let mut online = small_mlp(12);
        let frozen = online.try_clone().unwrap();
        let features = FeatureVector::new(6.0, 1.0, 2.0, 3.0);
        let before = frozen.predict(&features).unwrap();
        assert_eq!(online.predict(&features).unwrap(), before);

        for _ in 0..10 {
            online.train_step(&[features], &[50.0]).unwrap();
        }
        assert_ne!(online.predict(&features).unwrap(), before);
        assert_eq!(frozen.predict(&features).unwrap(), before);
    }

    #[test]
    fn test_load_parameters_rejects_other_shapes() {
        let mut rng = Pcg32::seed_from_u64(6);
        let wide = Mlp::new(MlpConfig::default(), &mut rng).unwrap();
        let mut narrow = small_mlp(7);
        let err = narrow
            .load_parameters(&wide.clone_parameters().unwrap())
            .unwrap_err();
        assert!(
            matches!(
                &err,
                ApproximatorError::ShapeMismatch { expected, found }
                    if *expected == [4, 8, 8, 1] && *found == [4, 64, 64, 64, 1]
            ),
            "{err}"
        );
    }

    #[test]
    fn test_train_step_rejects_bad_batches() {
        let mut mlp = small_mlp(7);
        assert!(matches!(
            mlp.train_step(&[], &[]),
            Err(ApproximatorError::EmptyBatch)
        ));
        assert!(matches!(
            mlp.train_step(&[FeatureVector::default()], &[1.0, 2.0]),
            Err(ApproximatorError::BatchLengthMismatch {
                features: 1,
                targets: 2
            })
        ));
    }

    #[test]
    fn test_parameters_round_trip_through_json() {
        let mlp = small_mlp(8);
        let json = serde_json::to_string(&mlp.clone_parameters().unwrap()).unwrap();
        let params: MlpParameters = serde_json::from_str(&json).unwrap();
        let restored = Mlp::from_parameters(small_config(), &params).unwrap();
        let features = FeatureVector::new(3.0, 0.0, 2.0, 1.0);
        assert_eq!(
            restored.predict(&features).unwrap(),
            mlp.predict(&features).unwrap()
        );
    }
}
