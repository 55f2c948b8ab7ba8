//! Evolution driver: breeds each generation's survivors into the next
//! population and runs generations back to back.

use std::collections::HashSet;

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use tracing::{info, warn};

use super::agent::{Agent, AgentId};
use super::error::{Error, EvolutionError};
use super::evaluation::Selection;
use super::generation::Generation;
use super::params::Params;
use super::snapshot::Observer;

/// Mate calls allowed per population slot before breeding gives up.
const ATTEMPTS_PER_MEMBER: usize = 100;

/// Agents that can produce offspring.
pub trait Mate: Sized {
    /// Creates a child from `self` and `other`, mutated with
    /// `mutation_stdev` when given.
    fn mate<R: Rng + ?Sized>(
        &self,
        other: &Self,
        mutation_stdev: Option<f64>,
        rng: &mut R,
    ) -> Result<Self, Error>;
}

/// A set of agents keyed by identity, kept in insertion order.
#[derive(Debug, Clone)]
pub struct Population<A> {
    members: Vec<A>,
    ids: HashSet<AgentId>,
}

impl<A: Agent> Population<A> {
    /// Creates an empty population with room for `capacity` agents.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            members: Vec::with_capacity(capacity),
            ids: HashSet::with_capacity(capacity),
        }
    }

    /// Adds `agent` unless an agent with the same identity is present.
    /// Returns whether it was added.
    pub fn insert(&mut self, agent: A) -> bool {
        if !self.ids.insert(agent.id()) {
            return false;
        }
        self.members.push(agent);
        true
    }

    /// Whether an agent with identity `id` is present.
    pub fn contains(&self, id: AgentId) -> bool {
        self.ids.contains(&id)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the population is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &A> {
        self.members.iter()
    }

    /// Consumes the population, returning its members.
    pub fn into_vec(self) -> Vec<A> {
        self.members
    }
}

impl<A: Agent> FromIterator<A> for Population<A> {
    fn from_iter<I: IntoIterator<Item = A>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut population = Self::with_capacity(iter.size_hint().0);
        for agent in iter {
            population.insert(agent);
        }
        population
    }
}

/// Picks parent indices, weighted when usable weights exist.
enum ParentSampler {
    Weighted(WeightedIndex<f64>),
    Uniform(usize),
}

impl ParentSampler {
    fn new<A>(selection: &Selection<A>) -> Self {
        selection
            .weights
            .as_ref()
            .filter(|weights| weights.len() == selection.len())
            .and_then(|weights| WeightedIndex::new(weights).ok())
            .map_or(Self::Uniform(selection.len()), Self::Weighted)
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        match self {
            Self::Weighted(index) => index.sample(rng),
            Self::Uniform(len) => rng.gen_range(0..*len),
        }
    }
}

/// Breeds `selection` into a population of `target` agents.
///
/// Parents are drawn in pairs with replacement; each pair yields one child.
/// Sampling continues until the population holds `target` distinct agents,
/// giving up after a bounded number of attempts.
pub fn breed<A, R>(
    selection: &Selection<A>,
    target: usize,
    mutation_stdev: Option<f64>,
    rng: &mut R,
) -> Result<Population<A>, Error>
where
    A: Agent + Mate,
    R: Rng + ?Sized,
{
    if selection.len() < 2 {
        return Err(EvolutionError::InsufficientSurvivors {
            found: selection.len(),
        }
        .into());
    }

    let sampler = ParentSampler::new(selection);
    let max_attempts = target.saturating_mul(ATTEMPTS_PER_MEMBER);
    let mut population = Population::with_capacity(target);
    let mut attempts = 0;
    while population.len() < target {
        if attempts >= max_attempts {
            return Err(EvolutionError::Stalled {
                size: population.len(),
                target,
                attempts,
            }
            .into());
        }
        attempts += 1;

        let parent1 = &selection.agents[sampler.sample(rng)];
        let parent2 = &selection.agents[sampler.sample(rng)];
        population.insert(parent1.mate(parent2, mutation_stdev, rng)?);
    }
    Ok(population)
}

/// Summary of one simulated generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Generation index.
    pub generation: usize,
    /// Number of selected agents.
    pub survivors: usize,
    /// The strategy's summary statistic, if any.
    pub score: Option<f64>,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// All requested generations ran.
    Completed {
        /// Generations simulated.
        generations: usize,
    },
    /// Too few survivors to breed after `generation`.
    Extinct {
        /// Last simulated generation.
        generation: usize,
        /// Survivors it left.
        survivors: usize,
    },
}

/// Runs generations back to back, breeding each one's survivors.
pub struct Evolution<A> {
    params: Params,
    population: Vec<A>,
    generation: usize,
}

impl<A: Agent + Mate> Evolution<A> {
    /// Starts a run from an initial population.
    pub fn new(params: Params, population: Vec<A>) -> Result<Self, Error> {
        params.validate()?;
        Ok(Self {
            params,
            population,
            generation: 0,
        })
    }

    /// Index of the next generation to simulate.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// The population the next generation starts with.
    pub fn population(&self) -> &[A] {
        &self.population
    }

    /// Run parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Whether the current generation should be shown to the observer.
    fn records(&self) -> bool {
        self.params.record_every > 0 && self.generation % self.params.record_every == 0
    }

    /// Simulates the current population for one generation and evaluates it.
    pub fn simulate<R: Rng + ?Sized>(
        &mut self,
        observer: Option<&mut (dyn Observer + '_)>,
        rng: &mut R,
    ) -> Result<(Report, Selection<A>), Error> {
        let population = std::mem::take(&mut self.population);
        let mut generation = Generation::new(
            self.params.geometry(),
            population,
            self.params.ticks,
            rng,
        )?
        .with_index(self.generation);
        generation.run(observer, rng)?;

        let selection = generation.evaluate(&self.params.strategy);
        let report = Report {
            generation: self.generation,
            survivors: selection.len(),
            score: selection.score,
        };
        info!(
            generation = report.generation,
            survivors = report.survivors,
            score = report.score,
            "generation evaluated"
        );
        Ok((report, selection))
    }

    /// Breeds `selection` into the next population and advances the
    /// generation counter.
    pub fn reproduce<R: Rng + ?Sized>(
        &mut self,
        selection: &Selection<A>,
        rng: &mut R,
    ) -> Result<(), Error> {
        let next = breed(
            selection,
            self.params.population_size,
            Some(self.params.mutation_stdev),
            rng,
        )?;
        self.population = next.into_vec();
        self.generation += 1;
        Ok(())
    }

    /// Runs up to `generations` generations.
    ///
    /// `observer` sees every `record_every`-th generation. `on_report` is
    /// called after each evaluation. A generation that leaves fewer than two
    /// survivors ends the run with [`Outcome::Extinct`].
    pub fn run<R: Rng + ?Sized>(
        &mut self,
        generations: usize,
        mut observer: Option<&mut (dyn Observer + '_)>,
        mut on_report: impl FnMut(&Report),
        rng: &mut R,
    ) -> Result<Outcome, Error> {
        for _ in 0..generations {
            let recording = if self.records() {
                observer.as_deref_mut()
            } else {
                None
            };
            let (report, selection) = self.simulate(recording, rng)?;
            on_report(&report);

            match self.reproduce(&selection, rng) {
                Ok(()) => {}
                Err(Error::Evolution(EvolutionError::InsufficientSurvivors { found })) => {
                    warn!(
                        generation = report.generation,
                        survivors = found,
                        "not enough survivors to reproduce, ending run"
                    );
                    return Ok(Outcome::Extinct {
                        generation: report.generation,
                        survivors: found,
                    });
                }
                Err(err) => return Err(err),
            }
        }
        Ok(Outcome::Completed {
            generations: self.generation,
        })
    }
}
