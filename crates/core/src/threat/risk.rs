use crate::blast::compute_blast_cells;
use crate::config::Config;
use crate::state::{Bomb, Landmine, World};
use crate::types::{AgentId, Difficulty, manhattan};

use super::Field;

/// Graded hazard per cell in `[0, 1]`, combined across threats by maximum.
pub type RiskMap = Field<f32>;

/// Binary hazard per cell, the risk map thresholded at the legacy cutoff.
pub type DangerMap = Field<bool>;

/// Rises from `min_risk` when the fuse is lit to 1.0 at detonation.
pub fn bomb_risk_weight(bomb: &Bomb, now_ms: u64, fuse_ms: u64, min_risk: f32) -> f32 {
    let Some(placed_at) = bomb.placed_at_ms else {
        return 1.0;
    };
    if fuse_ms == 0 {
        return 1.0;
    }
    let time_left = (placed_at + fuse_ms).saturating_sub(now_ms);
    let fraction_left = time_left as f32 / fuse_ms as f32;
    (1.0 - fraction_left * (1.0 - min_risk)).clamp(min_risk, 1.0)
}

/// Whether `viewer` knows about `mine`.
///
/// Owners always know their own mines. Everyone sees a mine while it flashes after
/// placement; hard-tier viewers also sense hidden mines within the sensing radius. With
/// no viewer only flashing mines are visible.
pub fn is_landmine_visible(
    world: &World,
    config: &Config,
    mine: &Landmine,
    viewer: Option<AgentId>,
) -> bool {
    if mine.is_flashing(world.now_ms, config.arena.landmine_reveal_ms) {
        return true;
    }
    let Some(viewer) = viewer.and_then(|id| world.agent(id)) else {
        return false;
    };
    if mine.owner == Some(viewer.id) {
        return true;
    }
    viewer.difficulty() == Some(Difficulty::Hard)
        && manhattan(viewer.pos, mine.pos) <= config.ai.mine_sensing_radius
}

pub fn risk_map(world: &World, config: &Config, viewer: Option<AgentId>) -> RiskMap {
    let mut risk = Field::filled(world.grid.width, world.grid.height, 0.0);
    for bomb in &world.bombs {
        let weight = bomb_risk_weight(
            bomb,
            world.now_ms,
            config.arena.bomb_timer_ms,
            config.ai.min_bomb_risk,
        );
        for cell in compute_blast_cells(bomb.pos, bomb.range, &world.grid) {
            risk.raise_to(cell.pos, weight);
        }
    }
    for mine in &world.landmines {
        // An unarmed mine never fires on its owner.
        if viewer.is_some() && mine.owner == viewer && !mine.armed {
            continue;
        }
        if is_landmine_visible(world, config, mine, viewer) {
            risk.raise_to(mine.pos, 1.0);
        }
    }
    risk
}

pub fn danger_map(world: &World, config: &Config, viewer: Option<AgentId>) -> DangerMap {
    let risk = risk_map(world, config, viewer);
    let mut danger = Field::filled(risk.width, risk.height, false);
    for (pos, value) in risk.iter() {
        if *value >= config.ai.legacy_danger_threshold
            && let Some(cell) = danger.get_mut(pos)
        {
            *cell = true;
        }
    }
    danger
}
