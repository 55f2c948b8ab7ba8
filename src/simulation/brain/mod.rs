//! Feed-forward neural network used as an organism's movement policy.
//!
//! Networks never learn by gradient descent. They change only through
//! mutation (additive Gaussian noise) and crossover (per-output-unit mixing of
//! two parents with the same architecture).

use ndarray::Array1;
use ndarray_rand::rand_distr::Normal;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::NetworkError;

pub mod layer;

pub use layer::Layer;

/// Default standard deviation of mutation noise.
pub const DEFAULT_MUTATION_STDEV: f64 = 0.03;

/// Builds a zero-mean normal distribution, rejecting unusable deviations.
pub(crate) fn noise(stdev: f64) -> Result<Normal<f64>, NetworkError> {
    if !stdev.is_finite() || stdev < 0.0 {
        return Err(NetworkError::InvalidStdev(stdev));
    }
    Normal::new(0.0, stdev).map_err(|_| NetworkError::InvalidStdev(stdev))
}

/// Activation applied to the last layer's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// Output passed through unchanged.
    #[serde(alias = "linear")]
    Identity,
    /// Logistic function, squashing every output into `(0, 1)`.
    #[default]
    Sigmoid,
    /// Normalized exponential; outputs sum to one.
    Softmax,
}

impl Activation {
    fn apply(self, mut output: Array1<f64>) -> Array1<f64> {
        match self {
            Activation::Identity => output,
            Activation::Sigmoid => {
                output.mapv_inplace(|x| 1.0 / (1.0 + (-x).exp()));
                output
            }
            Activation::Softmax => {
                let max = output.fold(f64::NEG_INFINITY, |acc, &x| acc.max(x));
                output.mapv_inplace(|x| (x - max).exp());
                let sum = output.sum();
                output / sum
            }
        }
    }
}

/// Layer dimensions plus bias usage. Two networks can only mate if their
/// architectures are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Architecture {
    dimensions: Vec<usize>,
    use_bias: bool,
}

impl Architecture {
    /// Creates an architecture from the sizes of every layer, input first.
    pub fn new(dimensions: Vec<usize>, use_bias: bool) -> Result<Self, NetworkError> {
        if dimensions.len() < 2 || dimensions.contains(&0) {
            return Err(NetworkError::InvalidArchitecture(dimensions));
        }
        Ok(Self {
            dimensions,
            use_bias,
        })
    }

    /// Layer sizes, input first.
    pub fn dimensions(&self) -> &[usize] {
        &self.dimensions
    }

    /// Whether layers carry biases.
    pub fn use_bias(&self) -> bool {
        self.use_bias
    }

    /// Width of the input row.
    pub fn input_size(&self) -> usize {
        self.dimensions.first().copied().unwrap_or(0)
    }

    /// Width of the output row.
    pub fn output_size(&self) -> usize {
        self.dimensions.last().copied().unwrap_or(0)
    }
}

/// A fixed-topology multi-layer perceptron.
///
/// Hidden layers use ReLU; the last layer uses the configured [`Activation`].
/// Only built through [`NeuralNetwork::new`] and [`NeuralNetwork::mate`], so
/// the layers always chain and match the architecture.
#[derive(Debug, Clone, PartialEq)]
pub struct NeuralNetwork {
    architecture: Architecture,
    output: Activation,
    /// Ordered layers from input to output.
    layers: Vec<Layer>,
}

impl NeuralNetwork {
    /// Creates a network with random weights.
    pub fn new<R: Rng + ?Sized>(
        architecture: Architecture,
        output: Activation,
        rng: &mut R,
    ) -> Result<Self, NetworkError> {
        let layers = architecture
            .dimensions
            .windows(2)
            .map(|pair| Layer::new_random(pair[0], pair[1], architecture.use_bias, rng))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            architecture,
            output,
            layers,
        })
    }

    /// Network architecture.
    pub fn architecture(&self) -> &Architecture {
        &self.architecture
    }

    /// Output activation.
    pub fn output(&self) -> Activation {
        self.output
    }

    /// Layers from input to output.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Runs a forward pass for a single input row.
    pub fn predict(&self, input: &[f64]) -> Result<Array1<f64>, NetworkError> {
        let expected = self.architecture.input_size();
        if input.len() != expected {
            return Err(NetworkError::InputShape {
                expected,
                actual: input.len(),
            });
        }

        let mut output = Array1::from_vec(input.to_vec());
        let Some((last, hidden)) = self.layers.split_last() else {
            return Ok(self.output.apply(output));
        };
        for layer in hidden {
            output = layer.forward(&output);
            output.mapv_inplace(|x| x.max(0.0));
        }
        Ok(self.output.apply(last.forward(&output)))
    }

    /// Adds `N(0, stdev)` noise to every weight and, if enabled, every bias.
    pub fn mutate<R: Rng + ?Sized>(&mut self, stdev: f64, rng: &mut R) -> Result<(), NetworkError> {
        let normal = noise(stdev)?;
        let use_bias = self.architecture.use_bias;
        for layer in &mut self.layers {
            layer.mutate(normal, use_bias, rng);
        }
        Ok(())
    }

    /// Creates a child by per-output-unit crossover with `other`.
    ///
    /// When `mutation_stdev` is given the child is mutated before it is
    /// returned. The child keeps this network's output activation.
    pub fn mate<R: Rng + ?Sized>(
        &self,
        other: &NeuralNetwork,
        mutation_stdev: Option<f64>,
        rng: &mut R,
    ) -> Result<Self, NetworkError> {
        if self.architecture != other.architecture {
            return Err(NetworkError::ShapeMismatch);
        }

        let layers = self
            .layers
            .iter()
            .zip(&other.layers)
            .map(|(layer1, layer2)| Layer::crossover(layer1, layer2, rng))
            .collect();
        let mut child = Self {
            architecture: self.architecture.clone(),
            output: self.output,
            layers,
        };
        if let Some(stdev) = mutation_stdev {
            child.mutate(stdev, rng)?;
        }
        Ok(child)
    }

    /// RGB tint derived from the first weight of the first three layers.
    pub fn color(&self) -> [u8; 3] {
        let mut color = [0; 3];
        for (channel, layer) in color.iter_mut().zip(&self.layers) {
            let value = ((layer.weights[[0, 0]] + 2.0).round() * 100.0).clamp(0.0, 255.0);
            *channel = value as u8;
        }
        color
    }
}
