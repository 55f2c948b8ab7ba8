use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};

use gridlife::graphics::GifRecorder;
use gridlife::simulation::agent::Agent;
use gridlife::simulation::creature::Creature;
use gridlife::simulation::evolution::{Evolution, Mate, Outcome, Report};
use gridlife::simulation::organism::Organism;
use gridlife::simulation::params::{AgentKind, Params};
use gridlife::simulation::rng::{SimRng, create_rng, resolve_seed};

#[derive(Clone, Copy, ValueEnum)]
enum AgentArg {
    Creature,
    Organism,
}

#[derive(Parser)]
#[command(name = "gridlife")]
#[command(version)]
#[command(about = "Neuroevolution of grid-walking organisms")]
struct Cli {
    /// Configuration file (JSON); defaults are used for missing fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of generations to simulate
    #[arg(short, long)]
    generations: Option<usize>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Directory for recorded GIFs
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Record every K-th generation (0 disables recording)
    #[arg(long)]
    record_every: Option<usize>,

    /// Kind of agent to evolve
    #[arg(long, value_enum)]
    agent: Option<AgentArg>,
}

impl Cli {
    fn params(&self) -> Result<Params> {
        let mut params = match &self.config {
            Some(path) => Params::from_json_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => Params::default(),
        };
        if let Some(generations) = self.generations {
            params.generations = generations;
        }
        if let Some(seed) = self.seed {
            params.seed = Some(seed);
        }
        if let Some(output) = &self.output {
            params.output_dir.clone_from(output);
        }
        if let Some(record_every) = self.record_every {
            params.record_every = record_every;
        }
        if let Some(agent) = self.agent {
            params.agent = match agent {
                AgentArg::Creature => AgentKind::Creature,
                AgentArg::Organism => AgentKind::Organism,
            };
        }
        params.validate()?;
        Ok(params)
    }
}

fn main() -> Result<()> {
    init_tracing();
    let params = Cli::parse().params()?;

    let seed = resolve_seed(params.seed);
    let mut rng = create_rng(seed);
    info!(seed, agent = ?params.agent, "starting evolution");

    match params.agent {
        AgentKind::Organism => {
            let population = Organism::spawn(&params, &mut rng)?;
            evolve(params, population, &mut rng)
        }
        AgentKind::Creature => {
            let population: Vec<Creature> =
                (0..params.population_size).map(|_| Creature::new()).collect();
            evolve(params, population, &mut rng)
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn evolve<A: Agent + Mate>(params: Params, population: Vec<A>, rng: &mut SimRng) -> Result<()> {
    std::fs::create_dir_all(&params.output_dir)
        .with_context(|| format!("creating {}", params.output_dir.display()))?;
    let mut recorder = GifRecorder::new(params.output_dir.clone());
    let generations = params.generations;

    let mut evolution = Evolution::new(params, population)?;
    let result = evolution.run(generations, Some(&mut recorder), print_report, rng);

    if recorder.pending() > 0 {
        info!(pending = recorder.pending(), "waiting for gif encoders");
    }
    let recorded = recorder.finish();

    match result? {
        Outcome::Completed { generations } => info!(generations, "run completed"),
        Outcome::Extinct {
            generation,
            survivors,
        } => warn!(generation, survivors, "run ended without enough survivors"),
    }

    recorded?;
    Ok(())
}

fn print_report(report: &Report) {
    match report.score {
        Some(score) => println!("Generation {}: {:.1}", report.generation, score),
        None => println!(
            "Generation {}: {} survivors",
            report.generation, report.survivors
        ),
    }
}
