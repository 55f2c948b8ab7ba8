//! Agent identity and the per-tick decision protocol shared by all agents.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;

use super::coordinate::{Coordinate, Geometry};
use super::error::Error;
use super::grid::Grid;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of an agent.
///
/// Assigned once at creation and kept across ticks; two agents with equal
/// state are still different agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(u64);

impl AgentId {
    /// Allocates a fresh, process-wide unique identity.
    pub fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of one agent's tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    /// Coordinate before the tick.
    pub from: Coordinate,
    /// Coordinate after the tick.
    pub to: Coordinate,
    /// Whether a non-zero move was denied.
    pub blocked: bool,
}

/// Something that lives on a [`Grid`] and moves once per tick.
///
/// Implementors choose an offset; [`Agent::tick`] resolves it against the old
/// and new grids, so every agent follows the same occupancy rules.
pub trait Agent: Clone {
    /// Identity used by the grid's reverse lookup.
    fn id(&self) -> AgentId;

    /// Ticks lived.
    fn age(&self) -> u32;

    /// Whether the last move attempt was denied.
    fn is_blocked(&self) -> bool;

    /// Picks a move offset in `{-1, 0, 1}²`.
    fn choose_offset<R: Rng + ?Sized>(
        &self,
        coordinate: Coordinate,
        geometry: Geometry,
        rng: &mut R,
    ) -> Result<(i32, i32), Error>;

    /// Returns this agent one tick older with the given blocked flag.
    fn advanced(&self, blocked: bool) -> Self;

    /// Display tint.
    fn color(&self) -> [u8; 3] {
        [255, 255, 255]
    }

    /// Moves the agent from `old` into `new`.
    ///
    /// The agent stays put and becomes blocked when its offset is non-zero
    /// and the target is occupied in either grid. It is inserted into `new`
    /// exactly once.
    fn tick<R: Rng + ?Sized>(
        &self,
        old: &Grid<Self>,
        new: &mut Grid<Self>,
        rng: &mut R,
    ) -> Result<Move, Error> {
        let from = old.coordinate_of(self.id())?;
        let geometry = old.geometry();
        let (dx, dy) = self.choose_offset(from, geometry, rng)?;
        let target = from.relative(dx, dy, geometry);

        let blocked =
            (dx, dy) != (0, 0) && (old.is_occupied(target) || new.is_occupied(target));
        let to = if blocked { from } else { target };

        new.place(to, self.advanced(blocked))?;
        Ok(Move { from, to, blocked })
    }
}
