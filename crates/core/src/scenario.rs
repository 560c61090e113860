//! JSON scenario files: an ASCII arena plus the entities placed on it.
//!
//! The grid is a list of equal-width rows of `#` (hard wall), `*` (soft wall) and
//! `.` (floor). Entities are listed by `x`/`y` cell; bomb, mine and rocket owners
//! refer to agents by their index in the `agents` list. An optional `config` object
//! overrides any subset of the defaults.
//!
//! ```json
//! {
//!   "grid": ["#####", "#...#", "#####"],
//!   "agents": [{ "x": 1, "y": 1, "profile": { "difficulty": "hard" } }],
//!   "bombs": [{ "x": 3, "y": 1, "owner": 0, "range": 2 }]
//! }
//! ```

mod layout;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::ScenarioError;
use crate::state::{Agent, Bomb, Grid, Landmine, PowerUp, Rocket, World};
use crate::types::{AgentId, AiProfile, CellKind, Direction, Pos, PowerUpKind, Weapon};

pub use layout::classic_arena;

// ---------------------------------------------------------------------------
// File format
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scenario {
    pub config: Config,
    pub grid: Vec<String>,
    pub now_ms: u64,
    pub started_at_ms: u64,
    pub agents: Vec<AgentSpec>,
    pub bombs: Vec<BombSpec>,
    pub landmines: Vec<LandmineSpec>,
    pub rockets: Vec<RocketSpec>,
    pub power_ups: Vec<PowerUpSpec>,
}

/// Agent stats not given fall back to the arena's starting values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentSpec {
    pub x: i32,
    pub y: i32,
    /// Absent for a human-controlled agent.
    pub profile: Option<AiProfile>,
    pub alive: Option<bool>,
    pub facing: Option<Direction>,
    pub explosion_range: Option<u32>,
    pub max_bombs: Option<u32>,
    pub move_cooldown_ms: Option<u64>,
    pub last_move_ms: Option<u64>,
    pub weapon: Option<Weapon>,
    pub landmines: Option<u32>,
    pub rockets: Option<u32>,
    /// Recent `(dx, dy)` moves, oldest first.
    pub history: Vec<(i32, i32)>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BombSpec {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub owner: Option<usize>,
    #[serde(default = "default_range")]
    pub range: u32,
    #[serde(default)]
    pub placed_at_ms: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LandmineSpec {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub owner: Option<usize>,
    #[serde(default)]
    pub armed: bool,
    #[serde(default)]
    pub placed_at_ms: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RocketSpec {
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
    #[serde(default)]
    pub owner: Option<usize>,
    #[serde(default)]
    pub launched_at_ms: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PowerUpSpec {
    pub x: i32,
    pub y: i32,
    pub kind: PowerUpKind,
}

fn default_range() -> u32 {
    1
}

/// A scenario turned into a live world.
#[derive(Clone, Debug)]
pub struct LoadedScenario {
    pub world: World,
    pub config: Config,
    /// World ids in the order the agents were listed.
    pub agents: Vec<AgentId>,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

pub fn load_scenario(path: &Path) -> Result<Scenario, ScenarioError> {
    let text = fs::read_to_string(path)
        .map_err(|source| ScenarioError::Io { path: path.to_path_buf(), source })?;
    Scenario::from_json(&text)
}

impl Scenario {
    pub fn from_json(text: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn into_world(self) -> Result<LoadedScenario, ScenarioError> {
        self.config.validate()?;
        let rows: Vec<&str> = self.grid.iter().map(String::as_str).collect();
        let grid = Grid::from_ascii(&rows)?;
        let mut world = World::new(grid);
        world.now_ms = self.now_ms;
        world.started_at_ms = self.started_at_ms;

        let mut agents = Vec::with_capacity(self.agents.len());
        for entry in &self.agents {
            let pos = floor_cell(&world.grid, "agent", entry.x, entry.y)?;
            let id = world.add_agent(build_agent(entry, pos, &self.config));
            agents.push(id);
        }
        let owner_of = |index: Option<usize>| -> Result<Option<AgentId>, ScenarioError> {
            index
                .map(|index| {
                    agents.get(index).copied().ok_or(ScenarioError::UnknownOwner { index })
                })
                .transpose()
        };

        for entry in &self.bombs {
            let pos = floor_cell(&world.grid, "bomb", entry.x, entry.y)?;
            let owner = owner_of(entry.owner)?;
            let placed_at_ms = entry.placed_at_ms;
            world.bombs.push(Bomb { pos, owner, range: entry.range, placed_at_ms });
            if let Some(agent) = owner.and_then(|id| world.agents.get_mut(id)) {
                agent.active_bombs += 1;
            }
        }
        for entry in &self.landmines {
            let pos = floor_cell(&world.grid, "landmine", entry.x, entry.y)?;
            world.landmines.push(Landmine {
                pos,
                owner: owner_of(entry.owner)?,
                armed: entry.armed,
                placed_at_ms: entry.placed_at_ms,
            });
        }
        for entry in &self.rockets {
            let pos = in_bounds(&world.grid, "rocket", entry.x, entry.y)?;
            world.rockets.push(Rocket {
                pos,
                dir: entry.dir,
                owner: owner_of(entry.owner)?,
                exploded: false,
                launched_at_ms: entry.launched_at_ms.unwrap_or(self.now_ms),
                cells_travelled: 0,
            });
        }
        for entry in &self.power_ups {
            let pos = floor_cell(&world.grid, "power-up", entry.x, entry.y)?;
            world.power_ups.push(PowerUp { pos, kind: entry.kind });
        }

        Ok(LoadedScenario { world, config: self.config, agents })
    }
}

fn build_agent(entry: &AgentSpec, pos: Pos, config: &Config) -> Agent {
    let mut agent = Agent::new(pos, &config.arena, entry.profile);
    if let Some(alive) = entry.alive {
        agent.alive = alive;
    }
    if let Some(range) = entry.explosion_range {
        agent.explosion_range = range;
    }
    if let Some(max_bombs) = entry.max_bombs {
        agent.max_bombs = max_bombs;
    }
    if let Some(cooldown) = entry.move_cooldown_ms {
        agent.move_cooldown_ms = cooldown;
    }
    agent.last_move_ms = entry.last_move_ms;
    if let Some(weapon) = entry.weapon {
        agent.active_weapon = weapon;
    }
    agent.landmines = entry.landmines.unwrap_or(0);
    agent.rockets = entry.rockets.unwrap_or(0);
    for (dx, dy) in &entry.history {
        agent.record_move(*dx, *dy);
    }
    // An explicit facing wins over the one implied by the history.
    if let Some(facing) = entry.facing {
        agent.facing = facing;
    }
    agent
}

fn in_bounds(grid: &Grid, what: &'static str, x: i32, y: i32) -> Result<Pos, ScenarioError> {
    let pos = Pos { y, x };
    if grid.in_bounds(pos) { Ok(pos) } else { Err(ScenarioError::OutOfBounds { what, x, y }) }
}

fn floor_cell(grid: &Grid, what: &'static str, x: i32, y: i32) -> Result<Pos, ScenarioError> {
    let pos = in_bounds(grid, what, x, y)?;
    if grid.cell_at(pos) == CellKind::Floor {
        Ok(pos)
    } else {
        Err(ScenarioError::NotOnFloor { what, x, y })
    }
}
