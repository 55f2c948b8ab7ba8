//! Organisms: agents whose moves come from a neural network.

use std::sync::Arc;

use rand::Rng;

use super::agent::{Agent, AgentId};
use super::brain::{Activation, Architecture, NeuralNetwork};
use super::coordinate::{Coordinate, Geometry};
use super::error::{Error, NetworkError};
use super::evolution::Mate;
use super::params::Params;

/// Number of network inputs: blocked flag, x, y and age.
pub const INPUT_SIZE: usize = 4;
/// Number of network outputs: one per axis.
pub const OUTPUT_SIZE: usize = 2;

/// A network-driven agent.
///
/// The network is shared between the copies of an organism that successive
/// grids hold; it never changes during a generation.
#[derive(Debug, Clone)]
pub struct Organism {
    id: AgentId,
    brain: Arc<NeuralNetwork>,
    age: u32,
    blocked: bool,
    /// Age that maps to an input of 1.0.
    max_age: u32,
}

impl Organism {
    /// Creates an organism around `brain`.
    ///
    /// The network must take [`INPUT_SIZE`] inputs and produce
    /// [`OUTPUT_SIZE`] outputs.
    pub fn new(brain: NeuralNetwork, max_age: u32) -> Result<Self, NetworkError> {
        let architecture = brain.architecture();
        if architecture.input_size() != INPUT_SIZE || architecture.output_size() != OUTPUT_SIZE {
            return Err(NetworkError::InvalidArchitecture(
                architecture.dimensions().to_vec(),
            ));
        }
        Ok(Self {
            id: AgentId::next(),
            brain: Arc::new(brain),
            age: 0,
            blocked: false,
            max_age: max_age.max(1),
        })
    }

    /// Creates an organism with a freshly initialised network.
    pub fn random<R: Rng + ?Sized>(
        architecture: Architecture,
        output: Activation,
        max_age: u32,
        rng: &mut R,
    ) -> Result<Self, NetworkError> {
        Self::new(NeuralNetwork::new(architecture, output, rng)?, max_age)
    }

    /// Creates the initial population described by `params`.
    pub fn spawn<R: Rng + ?Sized>(params: &Params, rng: &mut R) -> Result<Vec<Self>, NetworkError> {
        let architecture = params.architecture()?;
        (0..params.population_size)
            .map(|_| Self::random(architecture.clone(), params.output, params.max_age(), rng))
            .collect()
    }

    /// The organism's network.
    pub fn brain(&self) -> &NeuralNetwork {
        &self.brain
    }

    /// Network input for an organism standing on `coordinate`.
    pub fn inputs(&self, coordinate: Coordinate, geometry: Geometry) -> [f64; INPUT_SIZE] {
        let size = f64::from(geometry.size);
        [
            if self.blocked { 1.0 } else { 0.0 },
            f64::from(coordinate.x) / size,
            f64::from(coordinate.y) / size,
            f64::from(self.age) / f64::from(self.max_age),
        ]
    }
}

/// Maps a network output in `[0, 1]` to a step in `{-1, 0, 1}`.
///
/// Rounds half up (`floor(o * 2 + 0.5) - 1`); outputs outside `[0, 1]`
/// saturate.
pub fn output_to_step(output: f64) -> i32 {
    ((output * 2.0 + 0.5).floor() as i32 - 1).clamp(-1, 1)
}

impl Agent for Organism {
    fn id(&self) -> AgentId {
        self.id
    }

    fn age(&self) -> u32 {
        self.age
    }

    fn is_blocked(&self) -> bool {
        self.blocked
    }

    fn choose_offset<R: Rng + ?Sized>(
        &self,
        coordinate: Coordinate,
        geometry: Geometry,
        _rng: &mut R,
    ) -> Result<(i32, i32), Error> {
        let output = self.brain.predict(&self.inputs(coordinate, geometry))?;
        Ok((output_to_step(output[0]), output_to_step(output[1])))
    }

    fn advanced(&self, blocked: bool) -> Self {
        Self {
            age: self.age + 1,
            blocked,
            ..self.clone()
        }
    }

    fn color(&self) -> [u8; 3] {
        self.brain.color()
    }
}

impl Mate for Organism {
    fn mate<R: Rng + ?Sized>(
        &self,
        other: &Self,
        mutation_stdev: Option<f64>,
        rng: &mut R,
    ) -> Result<Self, Error> {
        let brain = self.brain.mate(&other.brain, mutation_stdev, rng)?;
        Ok(Self::new(brain, self.max_age)?)
    }
}
