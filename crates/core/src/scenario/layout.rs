//! Seeded classic arena: a hard-wall border, a pillar on every even interior cell,
//! soft walls scattered over the rest, and spawns in the corners.

use crate::config::Config;
use crate::error::ScenarioError;
use crate::state::{Agent, Grid, PowerUp, World};
use crate::types::{AiProfile, CellKind, Pos, PowerUpKind, manhattan};

use super::LoadedScenario;

const SOFT_WALL_PERCENT: u64 = 60;
const POWER_UP_PERCENT: u64 = 8;
const POWER_UP_KINDS: [PowerUpKind; 5] = [
    PowerUpKind::Range,
    PowerUpKind::Speed,
    PowerUpKind::BombCount,
    PowerUpKind::Landmine,
    PowerUpKind::Rocket,
];

/// Builds an arena of `config.arena` size with one agent per entry of `profiles`,
/// placed clockwise from the top-left corner.
///
/// Each spawn keeps its own cell and the two cells next to it clear so an agent can
/// always drop its first bomb and step out of line.
pub fn classic_arena(
    config: Config,
    seed: u64,
    profiles: &[Option<AiProfile>],
) -> Result<LoadedScenario, ScenarioError> {
    config.validate()?;
    let (cols, rows) = (config.arena.cols, config.arena.rows);
    let spawns = spawn_cells(cols, rows);
    if profiles.len() > spawns.len() {
        return Err(ScenarioError::TooManyAgents { count: profiles.len(), max: spawns.len() });
    }

    let mut grid = Grid::new(cols, rows);
    let mut power_ups = Vec::new();
    for (index, pos) in grid.positions().collect::<Vec<_>>().into_iter().enumerate() {
        let (x, y) = (pos.x as usize, pos.y as usize);
        let border = x == 0 || y == 0 || x == cols - 1 || y == rows - 1;
        if border || (x % 2 == 0 && y % 2 == 0) {
            grid.set_cell(pos, CellKind::HardWall);
            continue;
        }
        if spawns.iter().any(|spawn| manhattan(*spawn, pos) <= 1) {
            continue;
        }
        let roll = mix_seed_stream(seed, index as u64);
        if roll % 100 < SOFT_WALL_PERCENT {
            grid.set_cell(pos, CellKind::SoftWall);
        } else if (roll >> 8) % 100 < POWER_UP_PERCENT {
            let kind = POWER_UP_KINDS[(roll >> 16) as usize % POWER_UP_KINDS.len()];
            power_ups.push(PowerUp { pos, kind });
        }
    }

    let mut world = World::new(grid);
    world.power_ups = power_ups;
    let agents = profiles
        .iter()
        .zip(&spawns)
        .map(|(profile, spawn)| world.add_agent(Agent::new(*spawn, &config.arena, *profile)))
        .collect();
    Ok(LoadedScenario { world, config, agents })
}

fn spawn_cells(cols: usize, rows: usize) -> Vec<Pos> {
    let (right, bottom) = (cols as i32 - 2, rows as i32 - 2);
    let mut cells = Vec::with_capacity(4);
    for pos in [
        Pos { y: 1, x: 1 },
        Pos { y: 1, x: right },
        Pos { y: bottom, x: right },
        Pos { y: bottom, x: 1 },
    ] {
        if !cells.contains(&pos) {
            cells.push(pos);
        }
    }
    cells
}

fn mix_seed_stream(seed: u64, stream: u64) -> u64 {
    let mut mixed = seed ^ stream.wrapping_mul(0xD6E8_FD9A_5B89_7A4D);
    mixed ^= mixed >> 33;
    mixed = mixed.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    mixed ^= mixed >> 33;
    mixed = mixed.wrapping_mul(0xC4CE_B9FE_1A85_EC53);
    mixed ^ (mixed >> 33)
}
