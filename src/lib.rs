//! # Gridlife - Grid Neuroevolution
//!
//! Agents live on a square grid and move one cell per tick. Each organism's
//! moves come from a small feed-forward network; after a fixed number of ticks
//! the survivors of a selection strategy breed the next generation through
//! crossover and mutation of their networks.
//!
//! ## Features
//!
//! - Toroidal or walled grid with O(1) occupancy and reverse lookups
//! - Double-buffered ticks: agents read the previous grid, write a fresh one
//! - MLP brains (ReLU hidden layers, sigmoid/softmax/identity output)
//! - Per-output-unit crossover and Gaussian mutation
//! - Center-seeking, region and neighbor-count selection strategies
//! - Animated GIF recording on a background thread
//! - Seedable, reproducible runs
//!
//! ## Core Modules
//!
//! - [`simulation::grid`] - Spatial index
//! - [`simulation::brain`] - Neural network implementation
//! - [`simulation::agent`] - Tick protocol shared by all agents
//! - [`simulation::generation`] - Generation loop
//! - [`simulation::evolution`] - Breeding and the multi-generation driver

/// Core simulation logic and data structures.
pub mod simulation {
    /// Agent identity and the per-tick decision protocol.
    pub mod agent;
    /// Neural network implementation for organism brains.
    pub mod brain;
    /// Integer coordinates and grid geometry.
    pub mod coordinate;
    /// Random-walk agents.
    pub mod creature;
    /// Error types.
    pub mod error;
    /// Survivor selection strategies.
    pub mod evaluation;
    /// Breeding and the multi-generation driver.
    pub mod evolution;
    /// A single generation's tick loop.
    pub mod generation;
    /// Spatial index with one agent per cell.
    pub mod grid;
    /// Network-driven agents.
    pub mod organism;
    /// Run parameters.
    pub mod params;
    /// Seedable random source.
    pub mod rng;
    /// Grid snapshots and the observer interface.
    pub mod snapshot;
}

/// Animated GIF recording of generations.
pub mod graphics;
