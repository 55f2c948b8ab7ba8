//! One generation: random placement, a fixed number of synchronous ticks and
//! a final evaluation.

use rand::Rng;
use tracing::{debug, trace};

use super::agent::Agent;
use super::coordinate::Geometry;
use super::error::Error;
use super::evaluation::{Selection, Strategy};
use super::grid::Grid;
use super::snapshot::{Observer, Snapshot};

/// Lifecycle of a [`Generation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Agents placed, no tick run yet.
    Initialized,
    /// `tick` ticks completed out of the configured total.
    Running {
        /// Ticks completed.
        tick: usize,
    },
    /// All ticks completed.
    Finished,
}

/// A population living on a grid for a fixed number of ticks.
pub struct Generation<A> {
    index: usize,
    grid: Grid<A>,
    ticks: usize,
    elapsed: usize,
}

impl<A: Agent> Generation<A> {
    /// Places `population` randomly on a fresh grid.
    pub fn new<R: Rng + ?Sized>(
        geometry: Geometry,
        population: impl IntoIterator<Item = A>,
        ticks: usize,
        rng: &mut R,
    ) -> Result<Self, Error> {
        let mut grid = Grid::new(geometry);
        grid.place_randomly(population, rng)?;
        Ok(Self::from_grid(grid, ticks))
    }

    /// Starts a generation from an already populated grid.
    pub fn from_grid(grid: Grid<A>, ticks: usize) -> Self {
        Self {
            index: 0,
            grid,
            ticks,
            elapsed: 0,
        }
    }

    /// Sets the generation index reported in snapshots.
    #[must_use]
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Generation index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        if self.elapsed >= self.ticks {
            Phase::Finished
        } else if self.elapsed == 0 {
            Phase::Initialized
        } else {
            Phase::Running { tick: self.elapsed }
        }
    }

    /// The current grid; the final grid once finished.
    pub fn grid(&self) -> &Grid<A> {
        &self.grid
    }

    /// Consumes the generation, returning its current grid.
    pub fn into_grid(self) -> Grid<A> {
        self.grid
    }

    /// Advances every agent by one tick.
    ///
    /// Agents read the current grid and write into a fresh one, which then
    /// replaces it.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), Error> {
        let mut next = self.grid.empty_copy();
        let mut blocked = 0;
        for agent in self.grid.agents() {
            if agent.tick(&self.grid, &mut next, rng)?.blocked {
                blocked += 1;
            }
        }
        debug_assert_eq!(next.len(), self.grid.len());
        trace!(tick = self.elapsed + 1, blocked, "tick complete");

        self.grid = next;
        self.elapsed += 1;
        Ok(())
    }

    /// Runs the remaining ticks, notifying `observer` before each tick and
    /// after the last one.
    pub fn run<R: Rng + ?Sized>(
        &mut self,
        mut observer: Option<&mut (dyn Observer + '_)>,
        rng: &mut R,
    ) -> Result<(), Error> {
        while self.elapsed < self.ticks {
            if let Some(observer) = observer.as_deref_mut() {
                observer.notify(Snapshot::capture(&self.grid, self.index), false);
            }
            self.step(rng)?;
        }
        if let Some(observer) = observer {
            observer.notify(Snapshot::capture(&self.grid, self.index), true);
        }
        debug!(
            generation = self.index,
            ticks = self.ticks,
            agents = self.grid.len(),
            "generation finished"
        );
        Ok(())
    }

    /// Applies `strategy` to the current grid.
    pub fn evaluate(&self, strategy: &Strategy) -> Selection<A> {
        strategy.select(&self.grid)
    }
}
