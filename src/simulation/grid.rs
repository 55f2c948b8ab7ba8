//! Spatial index for agents on a square grid.
//!
//! The grid keeps a bijection between occupied cells and agents. Both
//! directions are hash lookups, so occupancy tests, `agent_at` and
//! `coordinate_of` are O(1). Agents are stored in insertion order, which is
//! the order a tick processes them in.

use std::collections::HashMap;

use rand::Rng;

use super::agent::{Agent, AgentId};
use super::coordinate::{Coordinate, Edges, Geometry};
use super::error::GridError;

/// A square grid holding at most one agent per cell.
#[derive(Debug, Clone)]
pub struct Grid<A> {
    geometry: Geometry,
    /// Occupants in insertion order.
    entries: Vec<(Coordinate, A)>,
    by_coordinate: HashMap<Coordinate, usize>,
    by_agent: HashMap<AgentId, usize>,
}

impl<A: Agent> Grid<A> {
    /// Creates an empty grid.
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            entries: Vec::new(),
            by_coordinate: HashMap::new(),
            by_agent: HashMap::new(),
        }
    }

    /// Returns an empty grid with the same geometry, sized for as many
    /// agents as this one holds.
    pub fn empty_copy(&self) -> Self {
        Self {
            geometry: self.geometry,
            entries: Vec::with_capacity(self.entries.len()),
            by_coordinate: HashMap::with_capacity(self.entries.len()),
            by_agent: HashMap::with_capacity(self.entries.len()),
        }
    }

    /// Grid geometry.
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Edge length.
    pub fn size(&self) -> i32 {
        self.geometry.size
    }

    /// Number of agents on the grid.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the grid holds no agents.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of cells.
    pub fn capacity(&self) -> usize {
        self.geometry.capacity()
    }

    /// Puts `agent` on `coordinate`. Never overwrites.
    pub fn place(&mut self, coordinate: Coordinate, agent: A) -> Result<(), GridError> {
        if !self.geometry.contains(coordinate) {
            return Err(GridError::OutOfBounds {
                coordinate,
                size: self.geometry.size,
            });
        }
        if self.by_coordinate.contains_key(&coordinate) {
            return Err(GridError::Occupied(coordinate));
        }
        let index = self.entries.len();
        self.by_coordinate.insert(coordinate, index);
        self.by_agent.insert(agent.id(), index);
        self.entries.push((coordinate, agent));
        Ok(())
    }

    /// Whether an agent cannot move into `coordinate`.
    ///
    /// In a bounded world everything outside the grid counts as occupied.
    pub fn is_occupied(&self, coordinate: Coordinate) -> bool {
        match self.geometry.edges {
            Edges::Clamp if !self.geometry.contains(coordinate) => true,
            _ => self.by_coordinate.contains_key(&coordinate),
        }
    }

    /// Returns the agent on `coordinate`.
    pub fn agent_at(&self, coordinate: Coordinate) -> Result<&A, GridError> {
        self.by_coordinate
            .get(&coordinate)
            .map(|&index| &self.entries[index].1)
            .ok_or(GridError::EmptyCell(coordinate))
    }

    /// Returns the coordinate of the agent with identity `id`.
    pub fn coordinate_of(&self, id: AgentId) -> Result<Coordinate, GridError> {
        self.by_agent
            .get(&id)
            .map(|&index| self.entries[index].0)
            .ok_or(GridError::AgentNotFound(id))
    }

    /// Agents in insertion order.
    pub fn agents(&self) -> impl Iterator<Item = &A> {
        self.entries.iter().map(|(_, agent)| agent)
    }

    /// `(coordinate, agent)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, &A)> {
        self.entries
            .iter()
            .map(|(coordinate, agent)| (*coordinate, agent))
    }

    /// Consumes the grid, returning its agents in insertion order.
    pub fn into_agents(self) -> Vec<A> {
        self.entries.into_iter().map(|(_, agent)| agent).collect()
    }

    /// Agents in the 8 cells around the agent with identity `id`.
    pub fn neighbors_of(&self, id: AgentId) -> Result<impl Iterator<Item = &A>, GridError> {
        let coordinate = self.coordinate_of(id)?;
        Ok(coordinate
            .neighbors(self.geometry)
            .filter_map(move |neighbor| self.agent_at(neighbor).ok()))
    }

    /// Places every agent on a uniformly random free cell.
    ///
    /// Fails up front if the agents do not fit, so the rejection sampling
    /// always terminates.
    pub fn place_randomly<R: Rng + ?Sized>(
        &mut self,
        agents: impl IntoIterator<Item = A>,
        rng: &mut R,
    ) -> Result<(), GridError> {
        let agents: Vec<A> = agents.into_iter().collect();
        let free = self.capacity() - self.len();
        if agents.len() > free {
            return Err(GridError::Overcrowded {
                agents: agents.len(),
                free,
            });
        }
        for agent in agents {
            let coordinate = self.random_free_coordinate(rng);
            self.place(coordinate, agent)?;
        }
        Ok(())
    }

    fn random_free_coordinate<R: Rng + ?Sized>(&self, rng: &mut R) -> Coordinate {
        let size = self.geometry.size;
        loop {
            let coordinate = Coordinate::new(rng.gen_range(0..size), rng.gen_range(0..size));
            if !self.is_occupied(coordinate) {
                return coordinate;
            }
        }
    }
}
