//! Selection strategies applied to the final grid of a generation.

use serde::{Deserialize, Serialize};

use super::agent::Agent;
use super::grid::Grid;

/// Agents chosen to parent the next generation.
#[derive(Debug, Clone)]
pub struct Selection<A> {
    /// Selected agents.
    pub agents: Vec<A>,
    /// Sampling weights parallel to `agents`; uniform sampling when absent.
    pub weights: Option<Vec<f64>>,
    /// Summary statistic of the generation, if the strategy defines one.
    pub score: Option<f64>,
}

impl<A> Selection<A> {
    /// Number of selected agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether nothing was selected.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// A pure function from a grid to a [`Selection`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    /// Keeps the half of the population closest to the grid center, weighted
    /// by how much closer than the worst kept agent each one is. The score is
    /// the mean squared distance of the kept half.
    #[default]
    CenterSeeking,
    /// Keeps agents inside the half-open rectangle
    /// `[x_min, x_max) × [y_min, y_max)`. The score is the survivor count.
    Region {
        /// Inclusive left edge.
        x_min: i32,
        /// Exclusive right edge.
        x_max: i32,
        /// Inclusive top edge.
        y_min: i32,
        /// Exclusive bottom edge.
        y_max: i32,
    },
    /// Keeps agents with between `min` and `max` (inclusive) occupied
    /// neighboring cells. The score is the survivor count.
    NeighborCount {
        /// Fewest neighbors allowed.
        min: usize,
        /// Most neighbors allowed.
        max: usize,
    },
}

impl Strategy {
    /// Selects agents from `grid`. Never modifies the grid.
    pub fn select<A: Agent>(&self, grid: &Grid<A>) -> Selection<A> {
        match *self {
            Strategy::CenterSeeking => center_seeking(grid),
            Strategy::Region {
                x_min,
                x_max,
                y_min,
                y_max,
            } => counted(
                grid.iter()
                    .filter(|(c, _)| (x_min..x_max).contains(&c.x) && (y_min..y_max).contains(&c.y))
                    .map(|(_, agent)| agent.clone())
                    .collect(),
            ),
            Strategy::NeighborCount { min, max } => {
                let geometry = grid.geometry();
                counted(
                    grid.iter()
                        .filter(|(coordinate, _)| {
                            let count = coordinate
                                .neighbors(geometry)
                                .filter(|neighbor| grid.agent_at(*neighbor).is_ok())
                                .count();
                            (min..=max).contains(&count)
                        })
                        .map(|(_, agent)| agent.clone())
                        .collect(),
                )
            }
        }
    }
}

/// Unweighted selection scored by its size.
fn counted<A>(agents: Vec<A>) -> Selection<A> {
    let score = Some(agents.len() as f64);
    Selection {
        agents,
        weights: None,
        score,
    }
}

fn center_seeking<A: Agent>(grid: &Grid<A>) -> Selection<A> {
    let center = f64::from(grid.size()) / 2.0;

    // Grid order breaks ties between equal distances
    let mut decorated: Vec<(f64, &A)> = grid
        .iter()
        .map(|(coordinate, agent)| {
            let dx = center - f64::from(coordinate.x);
            let dy = center - f64::from(coordinate.y);
            (dx * dx + dy * dy, agent)
        })
        .collect();
    decorated.sort_by(|a, b| a.0.total_cmp(&b.0));
    decorated.truncate(decorated.len() / 2);

    let max_distance = decorated.last().map_or(0.0, |&(distance, _)| distance);
    let weights = decorated
        .iter()
        .map(|&(distance, _)| max_distance - distance)
        .collect();
    let score = (!decorated.is_empty())
        .then(|| decorated.iter().map(|&(d, _)| d).sum::<f64>() / decorated.len() as f64);

    Selection {
        agents: decorated.into_iter().map(|(_, agent)| agent.clone()).collect(),
        weights: Some(weights),
        score,
    }
}
