//! Owned copies of grid occupancy handed to observers.

use super::agent::Agent;
use super::coordinate::Coordinate;
use super::grid::Grid;

/// Occupancy of a grid at one instant.
///
/// Holds no references into the grid, so it can be sent to another thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Index of the generation the grid belongs to.
    pub generation: usize,
    /// Grid edge length.
    pub size: i32,
    /// Occupied cells with the occupant's display tint.
    pub occupants: Vec<(Coordinate, [u8; 3])>,
}

impl Snapshot {
    /// Copies the occupancy of `grid`.
    pub fn capture<A: Agent>(grid: &Grid<A>, generation: usize) -> Self {
        Self {
            generation,
            size: grid.size(),
            occupants: grid
                .iter()
                .map(|(coordinate, agent)| (coordinate, agent.color()))
                .collect(),
        }
    }
}

/// Receives the state of a running generation.
///
/// Called once before every tick and once after the last tick, with
/// `is_last` set only on that final call.
pub trait Observer {
    /// Takes ownership of one snapshot.
    fn notify(&mut self, snapshot: Snapshot, is_last: bool);
}

/// Collects every snapshot in order.
impl Observer for Vec<Snapshot> {
    fn notify(&mut self, snapshot: Snapshot, _is_last: bool) {
        self.push(snapshot);
    }
}
