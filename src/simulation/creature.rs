//! Creatures: agents that take a random walk.

use rand::Rng;

use super::agent::{Agent, AgentId};
use super::coordinate::{Coordinate, Geometry};
use super::error::Error;
use super::evolution::Mate;

/// A fixed-policy agent that steps in a uniformly random direction.
#[derive(Debug, Clone)]
pub struct Creature {
    id: AgentId,
    age: u32,
    blocked: bool,
}

impl Creature {
    /// Creates a newborn creature.
    pub fn new() -> Self {
        Self {
            id: AgentId::next(),
            age: 0,
            blocked: false,
        }
    }
}

impl Default for Creature {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for Creature {
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
        _coordinate: Coordinate,
        _geometry: Geometry,
        rng: &mut R,
    ) -> Result<(i32, i32), Error> {
        Ok((rng.gen_range(-1..=1), rng.gen_range(-1..=1)))
    }

    fn advanced(&self, blocked: bool) -> Self {
        Self {
            id: self.id,
            age: self.age + 1,
            blocked,
        }
    }
}

/// Creatures carry no genome; a child is simply a new creature.
impl Mate for Creature {
    fn mate<R: Rng + ?Sized>(
        &self,
        _other: &Self,
        _mutation_stdev: Option<f64>,
        _rng: &mut R,
    ) -> Result<Self, Error> {
        Ok(Self::new())
    }
}
