use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::brain::{Activation, Architecture, DEFAULT_MUTATION_STDEV};
use super::coordinate::{Edges, Geometry};
use super::error::{ConfigError, NetworkError};
use super::evaluation::Strategy;
use super::organism::{INPUT_SIZE, OUTPUT_SIZE};

/// Which kind of agent populates the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Random walkers.
    Creature,
    /// Network-driven organisms.
    #[default]
    Organism,
}

/// Parameters of an evolution run.
///
/// Every field has a default, so a config file only needs the values it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Agents per generation.
    pub population_size: usize,
    /// Ticks per generation.
    pub ticks: usize,
    /// Number of generations to run.
    pub generations: usize,
    /// Grid edge length.
    pub grid_size: i32,
    /// Edge policy of the grid.
    pub edges: Edges,
    /// Agent kind.
    pub agent: AgentKind,
    /// Neural network layer dimensions, input first.
    pub layer_sizes: Vec<usize>,
    /// Whether network layers carry biases.
    pub use_bias: bool,
    /// Output activation of the networks.
    pub output: Activation,
    /// Standard deviation of the noise added to every child network.
    pub mutation_stdev: f64,
    /// Age that maps to a network input of 1.0. Defaults to `ticks`.
    pub max_age: Option<u32>,
    /// Survivor selection strategy.
    pub strategy: Strategy,
    /// Record an animated GIF every this many generations; 0 disables.
    pub record_every: usize,
    /// Directory GIFs are written to.
    pub output_dir: PathBuf,
    /// Seed of the run's random source; drawn from entropy when absent.
    pub seed: Option<u64>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            population_size: 200,
            ticks: 300,
            generations: 100_000,
            grid_size: 200,
            edges: Edges::Wrap,
            agent: AgentKind::Organism,
            layer_sizes: vec![INPUT_SIZE, 5, 5, OUTPUT_SIZE],
            use_bias: true,
            output: Activation::Sigmoid,
            mutation_stdev: DEFAULT_MUTATION_STDEV,
            max_age: None,
            strategy: Strategy::CenterSeeking,
            record_every: 100,
            output_dir: PathBuf::from("."),
            seed: None,
        }
    }
}

impl Params {
    /// Loads parameters from a JSON file, filling in defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Checks that a run with these parameters can start.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size <= 0 {
            return Err(ConfigError::Invalid(format!(
                "grid_size must be positive, got {}",
                self.grid_size
            )));
        }
        let capacity = self.geometry().capacity();
        if self.population_size > capacity {
            return Err(ConfigError::Invalid(format!(
                "population of {} does not fit on a {}x{} grid",
                self.population_size, self.grid_size, self.grid_size
            )));
        }
        if !self.mutation_stdev.is_finite() || self.mutation_stdev < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "mutation_stdev must be a non-negative number, got {}",
                self.mutation_stdev
            )));
        }
        if self.agent == AgentKind::Organism {
            let architecture = self
                .architecture()
                .map_err(|err| ConfigError::Invalid(err.to_string()))?;
            if architecture.input_size() != INPUT_SIZE || architecture.output_size() != OUTPUT_SIZE
            {
                return Err(ConfigError::Invalid(format!(
                    "organism networks need {} inputs and {} outputs, got {:?}",
                    INPUT_SIZE, OUTPUT_SIZE, self.layer_sizes
                )));
            }
        }
        Ok(())
    }

    /// Grid geometry.
    pub fn geometry(&self) -> Geometry {
        Geometry {
            size: self.grid_size,
            edges: self.edges,
        }
    }

    /// Network architecture shared by every organism of the run.
    pub fn architecture(&self) -> Result<Architecture, NetworkError> {
        Architecture::new(self.layer_sizes.clone(), self.use_bias)
    }

    /// Age normalisation constant for organism inputs.
    pub fn max_age(&self) -> u32 {
        self.max_age
            .unwrap_or_else(|| u32::try_from(self.ticks).unwrap_or(u32::MAX))
    }
}
