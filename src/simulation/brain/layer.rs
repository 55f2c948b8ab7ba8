//! A single dense layer.

use ndarray::{Array1, Array2};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Normal;
use rand::Rng;

use super::noise;
use crate::simulation::error::NetworkError;

/// A dense layer computing `x·W + b`.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Weight matrix (`input_size` × `output_size`). Column `j` holds every
    /// incoming weight of output unit `j`.
    pub weights: Array2<f64>,
    /// Bias vector (`output_size`). All zeros when biases are disabled.
    pub biases: Array1<f64>,
}

impl Layer {
    /// Creates a layer with weights drawn from `N(0, sqrt(2 / (in + out)))`.
    pub fn new_random<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        use_bias: bool,
        rng: &mut R,
    ) -> Result<Self, NetworkError> {
        let normal = noise((2.0 / (input_size + output_size) as f64).sqrt())?;
        let weights = Array2::random_using((input_size, output_size), normal, rng);
        let biases = if use_bias {
            Array1::random_using(output_size, normal, rng)
        } else {
            Array1::zeros(output_size)
        };
        Ok(Self { weights, biases })
    }

    /// Input dimension.
    pub fn input_size(&self) -> usize {
        self.weights.nrows()
    }

    /// Output dimension.
    pub fn output_size(&self) -> usize {
        self.weights.ncols()
    }

    /// Affine part of the forward pass, before any activation.
    #[inline]
    pub fn forward(&self, inputs: &Array1<f64>) -> Array1<f64> {
        let mut output = inputs.dot(&self.weights);
        output += &self.biases;
        output
    }

    /// Adds independent noise from `normal` to every weight, and to every
    /// bias when `use_bias` is set.
    pub fn mutate<R: Rng + ?Sized>(&mut self, normal: Normal<f64>, use_bias: bool, rng: &mut R) {
        self.weights += &Array2::random_using(self.weights.dim(), normal, rng);
        if use_bias {
            self.biases += &Array1::random_using(self.biases.len(), normal, rng);
        }
    }

    /// Per-output-unit uniform crossover.
    ///
    /// A fair coin per output unit decides which parent the whole weight
    /// column and bias entry come from.
    pub fn crossover<R: Rng + ?Sized>(parent1: &Layer, parent2: &Layer, rng: &mut R) -> Self {
        let mut child = parent1.clone();
        for unit in 0..child.output_size() {
            if !rng.gen_bool(0.5) {
                child
                    .weights
                    .column_mut(unit)
                    .assign(&parent2.weights.column(unit));
                child.biases[unit] = parent2.biases[unit];
            }
        }
        child
    }
}
