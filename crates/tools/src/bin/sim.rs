use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use game_core::{
    AiProfile, Arena, Config, Difficulty, LoadedScenario, MatchOutcome, Personality, classic_arena,
    load_scenario,
};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Run a seeded headless match and report how it ended.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// Scenario file to play instead of a generated arena
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Tiers of the generated arena's agents, one per corner
    #[arg(long, value_delimiter = ',', default_value = "easy,normal,hard,hard")]
    tiers: Vec<String>,
    /// Simulation step in milliseconds
    #[arg(long, default_value_t = 10)]
    step_ms: u64,
    /// Match time after which the run stops undecided
    #[arg(long, default_value_t = 180_000)]
    limit_ms: u64,
}

fn parse_tier(name: &str) -> Result<Difficulty> {
    match name.trim() {
        "easy" => Ok(Difficulty::Easy),
        "normal" => Ok(Difficulty::Normal),
        "hard" => Ok(Difficulty::Hard),
        other => bail!("unknown tier `{other}`, expected easy, normal or hard"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let loaded: LoadedScenario = match &args.scenario {
        Some(path) => load_scenario(path)?
            .into_world()
            .with_context(|| format!("Failed to build scenario {}", path.display()))?,
        None => {
            let profiles = args
                .tiers
                .iter()
                .map(|name| {
                    let difficulty = parse_tier(name)?;
                    Ok(Some(AiProfile { difficulty, personality: Personality::Balanced }))
                })
                .collect::<Result<Vec<_>>>()?;
            classic_arena(Config::default(), args.seed, &profiles)
                .context("Failed to generate arena")?
        }
    };

    println!("Starting match on seed {} with {} agents...", args.seed, loaded.agents.len());
    let mut arena = Arena::new(loaded.world, loaded.config, args.seed)
        .context("Scenario config is invalid")?;
    let outcome = arena.run(args.step_ms, args.limit_ms);

    let world = arena.world();
    match outcome {
        Some(MatchOutcome::Winner(id)) => {
            let index = loaded.agents.iter().position(|agent| *agent == id).unwrap_or_default();
            let tier = world.agents[id].difficulty();
            println!("Winner: agent {index} ({tier:?})");
        }
        Some(MatchOutcome::Draw) => println!("Outcome: draw"),
        None => println!("Outcome: undecided, {} agents alive", world.alive_count()),
    }
    println!("Match time: {} ms", world.elapsed_ms());
    println!("Snapshot Hash: {}", world.snapshot_hash());
    Ok(())
}
