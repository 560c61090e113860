use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use game_core::ai::{Brain, is_target_trapped, think};
use game_core::host::CommandQueue;
use game_core::pathfinding::{PathQuery, find_path};
use game_core::threat::{
    Field, danger_map, find_chokepoints, influence_map, risk_map, time_danger_map,
};
use game_core::{
    Agent, AgentId, CellKind, Difficulty, Goal, LoadedScenario, Pos, SeededRandom, load_scenario,
};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Inspect what the decision core sees in a scenario file.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct ScenarioArgs {
    /// Path to the scenario JSON file
    #[arg(short, long)]
    scenario: PathBuf,
    /// Index into the scenario's agent list
    #[arg(short, long)]
    agent: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Risk per cell as a 0-9 digit, from the agent's point of view when one is given
    Risk(ScenarioArgs),
    /// Cells that are unsafe to enter right now
    Danger(ScenarioArgs),
    /// Future burn windows per cell
    Timeline(ScenarioArgs),
    /// Positioning field for an agent
    Influence(ScenarioArgs),
    /// Narrow floor cells
    Chokepoints(ScenarioArgs),
    /// Route an agent to a cell
    Path {
        #[command(flatten)]
        scenario: ScenarioArgs,
        /// Goal cell as `x,y`
        #[arg(long, value_parser = parse_cell)]
        to: Pos,
        /// Ignore hazards while searching
        #[arg(long)]
        reckless: bool,
        /// Allow routes through soft walls
        #[arg(long)]
        soft_walls: bool,
    },
    /// Run one think cycle and print the decision and requests
    Think {
        #[command(flatten)]
        scenario: ScenarioArgs,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

fn parse_cell(text: &str) -> Result<Pos, String> {
    let (x, y) = text.split_once(',').ok_or_else(|| format!("expected x,y but got `{text}`"))?;
    let x = x.trim().parse().map_err(|_| format!("bad x coordinate `{x}`"))?;
    let y = y.trim().parse().map_err(|_| format!("bad y coordinate `{y}`"))?;
    Ok(Pos { y, x })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(io::stderr)
        .init();

    match Cli::parse().command {
        Command::Risk(args) => {
            let loaded = load(&args)?;
            let viewer = optional_agent(&loaded, args.agent)?;
            let risk = risk_map(&loaded.world, &loaded.config, viewer);
            print_grid(&loaded, |pos| {
                let level = (risk.risk_at(pos) * 9.0).round().clamp(0.0, 9.0) as u32;
                char::from_digit(level, 10).map_or_else(|| "?".to_owned(), String::from)
            });
        }
        Command::Danger(args) => {
            let loaded = load(&args)?;
            let viewer = optional_agent(&loaded, args.agent)?;
            let danger = danger_map(&loaded.world, &loaded.config, viewer);
            print_grid(&loaded, |pos| {
                if danger.value_or(pos, true) { "X".to_owned() } else { ".".to_owned() }
            });
        }
        Command::Timeline(args) => {
            let loaded = load(&args)?;
            let now = loaded.world.now_ms;
            let timeline = time_danger_map(&loaded.world, &loaded.config);
            for (pos, windows) in timeline.iter().filter(|(_, windows)| !windows.is_empty()) {
                let spans: Vec<String> = windows
                    .iter()
                    .map(|w| {
                        let source = if w.projectile { "rocket" } else { "bomb" };
                        format!(
                            "{source} +{}..+{} ms",
                            w.start_ms.saturating_sub(now),
                            w.end_ms.saturating_sub(now)
                        )
                    })
                    .collect();
                println!("({}, {}): {}", pos.x, pos.y, spans.join(", "));
            }
        }
        Command::Influence(args) => {
            let loaded = load(&args)?;
            let id = required_agent(&loaded, args.agent)?;
            let (world, config) = (&loaded.world, &loaded.config);
            let tier = world.agents[id].difficulty().unwrap_or(Difficulty::Normal);
            let is_trapped = |target: &Agent| is_target_trapped(world, config, target, tier);
            let influence = influence_map(world, config, id, &is_trapped);
            print_field(&loaded, &influence);
        }
        Command::Chokepoints(args) => {
            let loaded = load(&args)?;
            let chokepoints = find_chokepoints(&loaded.world.grid);
            print_grid(&loaded, |pos| {
                if chokepoints.contains(&pos) { "+".to_owned() } else { ".".to_owned() }
            });
            println!("{} chokepoints", chokepoints.len());
        }
        Command::Path { scenario, to, reckless, soft_walls } => {
            let loaded = load(&scenario)?;
            let id = required_agent(&loaded, scenario.agent)?;
            let start = loaded.world.agents[id].pos;
            let query = PathQuery::new(start, Goal::Fixed(to))
                .for_agent(id)
                .avoiding_danger(!reckless)
                .through_soft_walls(soft_walls);
            match find_path(&loaded.world, &loaded.config, &query) {
                Some(path) => {
                    println!("{} steps from ({}, {})", path.len(), start.x, start.y);
                    for step in path {
                        println!("  ({}, {}) {:?}", step.pos.x, step.pos.y, step.cell);
                    }
                }
                None => println!("no admissible path to ({}, {})", to.x, to.y),
            }
        }
        Command::Think { scenario, seed } => {
            let loaded = load(&scenario)?;
            let id = required_agent(&loaded, scenario.agent)?;
            let (world, config) = (&loaded.world, &loaded.config);
            let Some(profile) = world.agents[id].profile else {
                bail!("agent {} is human-controlled", scenario.agent.unwrap_or_default());
            };
            let mut brain = Brain::new(profile, &config.ai);
            let mut rng = SeededRandom::new(seed);
            let mut queue = CommandQueue::new(world, id);
            let decision = think(&mut brain, world, id, config, &mut rng, &mut queue)?;
            println!("decision: {decision:?}");
            for command in queue.commands() {
                println!("  {command:?}");
            }
        }
    }
    Ok(())
}

fn load(args: &ScenarioArgs) -> Result<LoadedScenario> {
    load_scenario(&args.scenario)?
        .into_world()
        .with_context(|| format!("Failed to build scenario {}", args.scenario.display()))
}

fn optional_agent(loaded: &LoadedScenario, index: Option<usize>) -> Result<Option<AgentId>> {
    index.map(|index| required_agent(loaded, Some(index))).transpose()
}

fn required_agent(loaded: &LoadedScenario, index: Option<usize>) -> Result<AgentId> {
    let index = index.context("this command needs --agent")?;
    loaded
        .agents
        .get(index)
        .copied()
        .with_context(|| format!("scenario has {} agents, no index {index}", loaded.agents.len()))
}

fn wall_glyph(cell: CellKind) -> Option<&'static str> {
    match cell {
        CellKind::HardWall => Some("#"),
        CellKind::SoftWall => Some("*"),
        CellKind::Floor => None,
    }
}

fn print_grid(loaded: &LoadedScenario, floor: impl Fn(Pos) -> String) {
    let grid = &loaded.world.grid;
    for y in 0..grid.height as i32 {
        let row: String = (0..grid.width as i32)
            .map(|x| {
                let pos = Pos { y, x };
                if let Some(agent) = loaded.world.alive_agent_at(pos) {
                    let index = loaded.agents.iter().position(|id| *id == agent.id).unwrap_or(0);
                    return index.to_string();
                }
                wall_glyph(grid.cell_at(pos)).map_or_else(|| floor(pos), str::to_owned)
            })
            .collect();
        println!("{row}");
    }
}

fn print_field(loaded: &LoadedScenario, field: &Field<f32>) {
    let grid = &loaded.world.grid;
    for y in 0..grid.height as i32 {
        let row: Vec<String> = (0..grid.width as i32)
            .map(|x| {
                let pos = Pos { y, x };
                match wall_glyph(grid.cell_at(pos)) {
                    Some(glyph) => format!("{glyph:>6}"),
                    None => format!("{:>+6.1}", field.value_or(pos, 0.0)),
                }
            })
            .collect();
        println!("{}", row.join(""));
    }
}
