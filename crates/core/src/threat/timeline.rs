use crate::blast::compute_blast_cells;
use crate::config::Config;
use crate::state::World;
use crate::types::{AgentId, CellKind};

use super::Field;

/// Interval during which a cell will burn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DangerWindow {
    pub start_ms: u64,
    pub end_ms: u64,
    pub owner: Option<AgentId>,
    pub projectile: bool,
}

impl DangerWindow {
    /// Whether arriving at `arrival_ms` collides with this window widened by `buffer_ms`.
    pub fn overlaps(&self, arrival_ms: u64, buffer_ms: u64) -> bool {
        arrival_ms + buffer_ms >= self.start_ms && arrival_ms <= self.end_ms + buffer_ms
    }
}

pub type TimeDangerMap = Field<Vec<DangerWindow>>;

/// Future burn windows per cell from bombs and in-flight rockets.
///
/// A bomb caught in an earlier blast is assumed to go off with it, so chained bombs
/// share the earliest detonation time of their chain.
pub fn time_danger_map(world: &World, config: &Config) -> TimeDangerMap {
    let arena = &config.arena;
    let mut map: TimeDangerMap = Field::filled(world.grid.width, world.grid.height, Vec::new());

    let blasts: Vec<_> = world
        .bombs
        .iter()
        .map(|bomb| compute_blast_cells(bomb.pos, bomb.range, &world.grid))
        .collect();
    let mut detonations: Vec<u64> = world
        .bombs
        .iter()
        .map(|bomb| bomb.detonates_at(world.now_ms, arena.bomb_timer_ms))
        .collect();
    let mut changed = true;
    while changed {
        changed = false;
        for (i, blast) in blasts.iter().enumerate() {
            for (j, other) in world.bombs.iter().enumerate() {
                if detonations[i] < detonations[j]
                    && blast.iter().any(|cell| cell.pos == other.pos)
                {
                    detonations[j] = detonations[i];
                    changed = true;
                }
            }
        }
    }

    for ((bomb, blast), start_ms) in world.bombs.iter().zip(&blasts).zip(&detonations) {
        for cell in blast {
            if let Some(windows) = map.get_mut(cell.pos) {
                windows.push(DangerWindow {
                    start_ms: *start_ms,
                    end_ms: start_ms + arena.explosion_duration_ms,
                    owner: bomb.owner,
                    projectile: false,
                });
            }
        }
    }

    let ai = &config.ai;
    let ms_per_cell = if ai.rocket_assumed_cells_per_sec > 0.0 {
        (1000.0 / ai.rocket_assumed_cells_per_sec) as u64
    } else {
        arena.rocket_step_ms
    };
    for rocket in world.rockets.iter().filter(|rocket| !rocket.exploded) {
        let mut pos = rocket.pos;
        for step in 1..=u64::from(ai.rocket_projection_cells) {
            pos = pos.step(rocket.dir);
            let cell = world.grid.cell_at(pos);
            if !world.grid.in_bounds(pos) || cell == CellKind::HardWall {
                break;
            }
            let arrival = world.now_ms + step * ms_per_cell;
            if let Some(windows) = map.get_mut(pos) {
                windows.push(DangerWindow {
                    start_ms: arrival.saturating_sub(ai.rocket_window_lead_ms),
                    end_ms: arrival + ai.rocket_window_tail_ms,
                    owner: rocket.owner,
                    projectile: true,
                });
            }
            if cell == CellKind::SoftWall {
                break;
            }
        }
    }
    map
}
