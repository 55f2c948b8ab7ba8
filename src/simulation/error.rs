//! Error types for the grid, the networks, the evolution driver and the outer
//! surfaces (configuration and rendering).

use std::path::PathBuf;

use thiserror::Error;

use super::agent::AgentId;
use super::coordinate::Coordinate;

/// Violations of the grid's occupancy contract.
///
/// These indicate a logic bug upstream and are never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Placement into a cell that already holds an agent.
    #[error("coordinate {0} already occupied")]
    Occupied(Coordinate),
    /// Placement outside a bounded world.
    #[error("coordinate {coordinate} lies outside a grid of size {size}")]
    OutOfBounds {
        /// Offending coordinate.
        coordinate: Coordinate,
        /// Grid edge length.
        size: i32,
    },
    /// Lookup of an empty cell.
    #[error("no agent at coordinate {0}")]
    EmptyCell(Coordinate),
    /// Reverse lookup of an agent that is not on the grid.
    #[error("could not find the coordinate of agent {0}")]
    AgentNotFound(AgentId),
    /// More agents than free cells.
    #[error("cannot place {agents} agents on a grid with {free} free cells")]
    Overcrowded {
        /// Agents requested.
        agents: usize,
        /// Free cells available.
        free: usize,
    },
}

/// Errors raised by neural network construction and operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum NetworkError {
    /// Layer dimensions that cannot form a network.
    #[error("invalid architecture {0:?}: need at least two non-zero dimensions")]
    InvalidArchitecture(Vec<usize>),
    /// Input row of the wrong length.
    #[error("input has {actual} features, expected {expected}")]
    InputShape {
        /// First layer's input dimension.
        expected: usize,
        /// Length of the given row.
        actual: usize,
    },
    /// Parents with different layer shapes or bias usage.
    #[error("cannot mate networks with different architectures")]
    ShapeMismatch,
    /// Standard deviation that is negative or not finite.
    #[error("invalid mutation standard deviation {0}")]
    InvalidStdev(f64),
}

/// Failures of the reproduction step.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvolutionError {
    /// Fewer than two parents available. Ends a run cleanly.
    #[error("only {found} survivor(s), need at least 2 to reproduce")]
    InsufficientSurvivors {
        /// Number of selected agents.
        found: usize,
    },
    /// The resample loop exhausted its attempts before filling the population.
    #[error("population stalled at {size}/{target} after {attempts} attempts")]
    Stalled {
        /// Members collected.
        size: usize,
        /// Desired population size.
        target: usize,
        /// Mate calls made.
        attempts: usize,
    },
}

/// Errors while loading or validating a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Config path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file is not valid JSON for [`super::params::Params`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors produced by the GIF recorder.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Encoding failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    /// The output file could not be created.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The encoder thread panicked.
    #[error("encoder worker panicked")]
    WorkerPanicked,
}

/// Any error the simulation can raise.
#[derive(Debug, Error)]
pub enum Error {
    /// See [`GridError`].
    #[error(transparent)]
    Grid(#[from] GridError),
    /// See [`NetworkError`].
    #[error(transparent)]
    Network(#[from] NetworkError),
    /// See [`EvolutionError`].
    #[error(transparent)]
    Evolution(#[from] EvolutionError),
    /// See [`ConfigError`].
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// See [`RenderError`].
    #[error(transparent)]
    Render(#[from] RenderError),
}
