#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;

use gridlife::simulation::agent::{Agent, AgentId};
use gridlife::simulation::brain::Activation;
use gridlife::simulation::coordinate::{Coordinate, Edges, Geometry};
use gridlife::simulation::creature::Creature;
use gridlife::simulation::error::{Error, EvolutionError};
use gridlife::simulation::evaluation::{Selection, Strategy};
use gridlife::simulation::evolution::{Evolution, Mate, Outcome, Population, breed};
use gridlife::simulation::grid::Grid;
use gridlife::simulation::organism::Organism;
use gridlife::simulation::params::{AgentKind, Params};
use gridlife::simulation::rng::create_rng;
use gridlife::simulation::snapshot::Snapshot;

static MATINGS: AtomicUsize = AtomicUsize::new(0);

/// Creature that counts how often it is bred.
#[derive(Debug, Clone)]
struct Counted {
    inner: Creature,
}

impl Counted {
    fn new() -> Self {
        Self {
            inner: Creature::new(),
        }
    }
}

impl Agent for Counted {
    fn id(&self) -> AgentId {
        self.inner.id()
    }

    fn age(&self) -> u32 {
        self.inner.age()
    }

    fn is_blocked(&self) -> bool {
        self.inner.is_blocked()
    }

    fn choose_offset<R: Rng + ?Sized>(
        &self,
        coordinate: Coordinate,
        geometry: Geometry,
        rng: &mut R,
    ) -> Result<(i32, i32), Error> {
        self.inner.choose_offset(coordinate, geometry, rng)
    }

    fn advanced(&self, blocked: bool) -> Self {
        Self {
            inner: self.inner.advanced(blocked),
        }
    }
}

impl Mate for Counted {
    fn mate<R: Rng + ?Sized>(
        &self,
        _other: &Self,
        _mutation_stdev: Option<f64>,
        _rng: &mut R,
    ) -> Result<Self, Error> {
        MATINGS.fetch_add(1, Ordering::SeqCst);
        Ok(Self::new())
    }
}

fn small_params() -> Params {
    Params {
        population_size: 20,
        ticks: 5,
        generations: 3,
        grid_size: 12,
        record_every: 0,
        ..Params::default()
    }
}

#[test]
fn test_breed_requires_two_survivors() {
    let mut rng = create_rng(1);
    let selection = Selection {
        agents: vec![Counted::new()],
        weights: None,
        score: None,
    };
    let before = MATINGS.load(Ordering::SeqCst);

    let result = breed(&selection, 10, None, &mut rng);
    assert!(matches!(
        result,
        Err(Error::Evolution(EvolutionError::InsufficientSurvivors {
            found: 1
        }))
    ));
    assert_eq!(MATINGS.load(Ordering::SeqCst), before);
}

#[test]
fn test_breed_fills_population_with_distinct_children() {
    let mut rng = create_rng(2);
    let parents: Vec<Creature> = (0..4).map(|_| Creature::new()).collect();
    let selection = Selection {
        agents: parents.clone(),
        weights: None,
        score: None,
    };

    let population = breed(&selection, 25, None, &mut rng).unwrap();
    assert_eq!(population.len(), 25);
    for parent in &parents {
        assert!(!population.contains(parent.id()));
    }
}

#[test]
fn test_zero_weight_parents_are_never_sampled() {
    let mut rng = create_rng(3);
    let architecture = small_params().architecture().unwrap();
    let parents: Vec<Organism> = (0..3)
        .map(|_| {
            Organism::random(
                architecture.clone(),
                Activation::Sigmoid,
                10,
                &mut rng,
            )
            .unwrap()
        })
        .collect();
    let selection = Selection {
        agents: parents.clone(),
        weights: Some(vec![1.0, 0.0, 0.0]),
        score: None,
    };

    // Only the first parent can be drawn, so every child is its clone
    let population = breed(&selection, 5, None, &mut rng).unwrap();
    for child in population.iter() {
        assert_eq!(child.brain(), parents[0].brain());
    }
}

#[test]
fn test_all_zero_weights_fall_back_to_uniform() {
    let mut rng = create_rng(4);
    let selection = Selection {
        agents: vec![Creature::new(), Creature::new()],
        weights: Some(vec![0.0, 0.0]),
        score: None,
    };
    assert_eq!(breed(&selection, 3, None, &mut rng).unwrap().len(), 3);
}

#[test]
fn test_population_is_identity_keyed() {
    let agent = Creature::new();
    let mut population = Population::with_capacity(2);
    assert!(population.insert(agent.clone()));
    assert!(!population.insert(agent.advanced(true)));
    assert!(population.insert(Creature::new()));
    assert_eq!(population.len(), 2);

    let collected: Population<Creature> = vec![agent.clone(), agent].into_iter().collect();
    assert_eq!(collected.len(), 1);
}

#[test]
fn test_center_seeking_keeps_closest_half() {
    let mut grid = Grid::new(Geometry::toroidal(10));
    let cells = [(5, 5), (0, 0), (4, 5), (9, 9), (5, 7), (1, 8)];
    let agents: Vec<Creature> = cells.iter().map(|_| Creature::new()).collect();
    for (&(x, y), agent) in cells.iter().zip(&agents) {
        grid.place(Coordinate::new(x, y), agent.clone()).unwrap();
    }

    let selection = Strategy::CenterSeeking.select(&grid);
    let ids: Vec<_> = selection.agents.iter().map(Agent::id).collect();
    assert_eq!(ids, vec![agents[0].id(), agents[2].id(), agents[4].id()]);
    // Squared distances 0, 1 and 4
    assert_eq!(selection.weights, Some(vec![4.0, 3.0, 0.0]));
    assert_eq!(selection.score, Some(5.0 / 3.0));
}

#[test]
fn test_region_and_neighbor_strategies() {
    let mut grid = Grid::new(Geometry::bounded(10));
    let lonely = Creature::new();
    let pair = [Creature::new(), Creature::new()];
    grid.place(Coordinate::new(8, 8), lonely.clone()).unwrap();
    grid.place(Coordinate::new(1, 1), pair[0].clone()).unwrap();
    grid.place(Coordinate::new(2, 2), pair[1].clone()).unwrap();

    let east = Strategy::Region {
        x_min: 5,
        x_max: 10,
        y_min: 0,
        y_max: 10,
    }
    .select(&grid);
    assert_eq!(east.len(), 1);
    assert_eq!(east.agents[0].id(), lonely.id());
    assert!(east.weights.is_none());
    assert_eq!(east.score, Some(1.0));

    let social = Strategy::NeighborCount { min: 1, max: 8 }.select(&grid);
    let mut ids: Vec<_> = social.agents.iter().map(Agent::id).collect();
    ids.sort();
    let mut expected = vec![pair[0].id(), pair[1].id()];
    expected.sort();
    assert_eq!(ids, expected);
    assert_eq!(social.score, Some(2.0));
}

#[test]
fn test_run_completes_with_creatures() {
    let mut rng = create_rng(5);
    let params = small_params();
    let population: Vec<Creature> = (0..params.population_size).map(|_| Creature::new()).collect();
    let mut evolution = Evolution::new(params, population).unwrap();

    let mut reports = Vec::new();
    let outcome = evolution
        .run(3, None, |report| reports.push(report.clone()), &mut rng)
        .unwrap();

    assert_eq!(outcome, Outcome::Completed { generations: 3 });
    assert_eq!(reports.len(), 3);
    for (index, report) in reports.iter().enumerate() {
        assert_eq!(report.generation, index);
        assert_eq!(report.survivors, 10);
        assert!(report.score.is_some());
    }
    assert_eq!(evolution.population().len(), 20);
}

#[test]
fn test_run_evolves_organisms() {
    let mut rng = create_rng(6);
    let params = Params {
        edges: Edges::Clamp,
        ..small_params()
    };
    let population = Organism::spawn(&params, &mut rng).unwrap();
    let mut evolution = Evolution::new(params, population).unwrap();

    let outcome = evolution.run(2, None, |_| {}, &mut rng).unwrap();
    assert_eq!(outcome, Outcome::Completed { generations: 2 });
    assert_eq!(evolution.generation(), 2);
    assert_eq!(evolution.population().len(), 20);
}

#[test]
fn test_run_stops_without_survivors() {
    let mut rng = create_rng(7);
    let params = Params {
        strategy: Strategy::Region {
            x_min: 0,
            x_max: 0,
            y_min: 0,
            y_max: 0,
        },
        ..small_params()
    };
    let population: Vec<Counted> = (0..params.population_size).map(|_| Counted::new()).collect();
    let mut evolution = Evolution::new(params, population).unwrap();

    let before = MATINGS.load(Ordering::SeqCst);
    let outcome = evolution.run(5, None, |_| {}, &mut rng).unwrap();
    assert_eq!(
        outcome,
        Outcome::Extinct {
            generation: 0,
            survivors: 0
        }
    );
    assert_eq!(evolution.generation(), 0);
    assert_eq!(MATINGS.load(Ordering::SeqCst), before);
}

#[test]
fn test_single_survivor_does_not_reproduce() {
    let mut rng = create_rng(8);
    let params = small_params();
    let population: Vec<Creature> = (0..params.population_size).map(|_| Creature::new()).collect();
    let mut evolution = Evolution::new(params, population).unwrap();

    let (_, mut selection) = evolution.simulate(None, &mut rng).unwrap();
    selection.agents.truncate(1);
    selection.weights = None;

    let result = evolution.reproduce(&selection, &mut rng);
    assert!(matches!(
        result,
        Err(Error::Evolution(EvolutionError::InsufficientSurvivors {
            found: 1
        }))
    ));
    assert_eq!(evolution.generation(), 0);
}

#[test]
fn test_observer_records_every_kth_generation() {
    let mut rng = create_rng(9);
    let params = Params {
        record_every: 2,
        ..small_params()
    };
    let ticks = params.ticks;
    let population: Vec<Creature> = (0..params.population_size).map(|_| Creature::new()).collect();
    let mut evolution = Evolution::new(params, population).unwrap();

    let mut snapshots: Vec<Snapshot> = Vec::new();
    evolution
        .run(3, Some(&mut snapshots), |_| {}, &mut rng)
        .unwrap();

    // Generations 0 and 2, each with one snapshot per tick plus the final one
    assert_eq!(snapshots.len(), 2 * (ticks + 1));
    assert!(snapshots[..=ticks].iter().all(|s| s.generation == 0));
    assert!(snapshots[ticks + 1..].iter().all(|s| s.generation == 2));
}

#[test]
fn test_params_defaults_are_valid() {
    let params = Params::default();
    params.validate().unwrap();
    assert_eq!(params.population_size, 200);
    assert_eq!(params.ticks, 300);
    assert_eq!(params.grid_size, 200);
    assert_eq!(params.layer_sizes, vec![4, 5, 5, 2]);
    assert_eq!(params.mutation_stdev, 0.03);
    assert_eq!(params.max_age(), 300);
    assert_eq!(params.agent, AgentKind::Organism);
}

#[test]
fn test_params_validation() {
    let crowded = Params {
        population_size: 101,
        grid_size: 10,
        ..Params::default()
    };
    assert!(crowded.validate().is_err());

    let bad_network = Params {
        layer_sizes: vec![3, 2],
        ..Params::default()
    };
    assert!(bad_network.validate().is_err());

    let creatures = Params {
        agent: AgentKind::Creature,
        ..bad_network
    };
    creatures.validate().unwrap();

    assert!(Evolution::<Creature>::new(crowded, Vec::new()).is_err());
}

#[test]
fn test_params_from_json_file() {
    let path = std::env::temp_dir().join(format!("gridlife_params_{}.json", std::process::id()));
    std::fs::write(
        &path,
        r#"{
            "population_size": 10,
            "grid_size": 8,
            "edges": "clamp",
            "agent": "creature",
            "strategy": { "kind": "region", "x_min": 0, "x_max": 4, "y_min": 0, "y_max": 8 }
        }"#,
    )
    .unwrap();

    let params = Params::from_json_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(params.population_size, 10);
    assert_eq!(params.geometry(), Geometry::bounded(8));
    assert_eq!(params.agent, AgentKind::Creature);
    assert_eq!(
        params.strategy,
        Strategy::Region {
            x_min: 0,
            x_max: 4,
            y_min: 0,
            y_max: 8
        }
    );
    // Untouched fields keep their defaults
    assert_eq!(params.ticks, 300);
    params.validate().unwrap();
}

#[test]
fn test_params_from_missing_file() {
    assert!(Params::from_json_file("/nonexistent/gridlife.json").is_err());
}

/// Agent whose offspring may repeat an identity already in the population.
#[derive(Debug, Clone)]
struct Litter {
    id: AgentId,
    /// Identity every child gets; a coin flip between a parent clone and a
    /// fresh agent when absent.
    child_id: Option<AgentId>,
}

impl Litter {
    fn new(child_id: Option<AgentId>) -> Self {
        Self {
            id: AgentId::next(),
            child_id,
        }
    }
}

impl Agent for Litter {
    fn id(&self) -> AgentId {
        self.id
    }

    fn age(&self) -> u32 {
        0
    }

    fn is_blocked(&self) -> bool {
        false
    }

    fn choose_offset<R: Rng + ?Sized>(
        &self,
        _coordinate: Coordinate,
        _geometry: Geometry,
        _rng: &mut R,
    ) -> Result<(i32, i32), Error> {
        Ok((0, 0))
    }

    fn advanced(&self, _blocked: bool) -> Self {
        self.clone()
    }
}

impl Mate for Litter {
    fn mate<R: Rng + ?Sized>(
        &self,
        _other: &Self,
        _mutation_stdev: Option<f64>,
        rng: &mut R,
    ) -> Result<Self, Error> {
        Ok(match self.child_id {
            Some(id) => Self {
                id,
                child_id: self.child_id,
            },
            None if rng.gen_bool(0.5) => self.clone(),
            None => Self::new(None),
        })
    }
}

#[test]
fn test_breed_resamples_until_identities_are_distinct() {
    let mut rng = create_rng(10);
    let selection = Selection {
        agents: vec![Litter::new(None), Litter::new(None)],
        weights: None,
        score: None,
    };

    let population = breed(&selection, 20, None, &mut rng).unwrap();
    assert_eq!(population.len(), 20);
    let ids: HashSet<_> = population.iter().map(Agent::id).collect();
    assert_eq!(ids.len(), 20);
}

#[test]
fn test_breed_stalls_when_children_repeat() {
    let mut rng = create_rng(11);
    let shared = AgentId::next();
    let selection = Selection {
        agents: vec![Litter::new(Some(shared)), Litter::new(Some(shared))],
        weights: None,
        score: None,
    };

    let target = 7;
    let result = breed(&selection, target, None, &mut rng);
    assert!(matches!(
        result,
        Err(Error::Evolution(EvolutionError::Stalled {
            size: 1,
            target: 7,
            attempts: 700
        }))
    ));
}
