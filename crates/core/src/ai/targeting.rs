use crate::blast::{BlastReach, compute_blast_cells};
use crate::config::Config;
use crate::pathfinding::{PathQuery, find_path};
use crate::state::{Agent, World};
use crate::threat::risk_map;
use crate::types::*;

use super::AgentCommands;
use super::situation::Situation;

/// Whether a straight, unobstructed line joins `from` and `to`.
///
/// The two cells must share exactly one axis; every cell strictly between them must be
/// floor without a bomb.
pub fn has_clear_shot(world: &World, from: Pos, to: Pos) -> bool {
    let Some(dir) = shot_direction(from, to) else {
        return false;
    };
    let mut pos = from.step(dir);
    while pos != to {
        if !world.grid.is_floor(pos) || world.bomb_at(pos).is_some() {
            return false;
        }
        pos = pos.step(dir);
    }
    true
}

/// Direction from `from` to `to` when they share exactly one axis.
pub fn shot_direction(from: Pos, to: Pos) -> Option<Direction> {
    if (from.x == to.x) == (from.y == to.y) {
        return None;
    }
    Direction::from_delta(to.x - from.x, to.y - from.y)
}

/// Whether a bomb of `range` at `origin` would burn `target`.
pub fn in_blast_line(world: &World, origin: Pos, target: Pos, range: u32) -> bool {
    compute_blast_cells(origin, range, &world.grid).iter().any(|cell| cell.pos == target)
}

/// Whether a bomb dropped where `me` stands would hit a soft wall, an opponent, or either.
pub fn is_bomb_useful(world: &World, me: &Agent, kind: BombUse) -> bool {
    let wants_wall = matches!(kind, BombUse::Wall | BombUse::Any);
    let wants_target = matches!(kind, BombUse::Target | BombUse::Any);
    let cells = compute_blast_cells(me.pos, me.explosion_range, &world.grid);
    cells.iter().any(|cell| match cell.reach {
        BlastReach::Origin => false,
        BlastReach::Absorbed => wants_wall,
        BlastReach::Open => {
            wants_target && world.opponents_of(me.id).any(|other| other.pos == cell.pos)
        }
    })
}

pub fn count_exits(world: &World, pos: Pos) -> usize {
    neighbors(pos).iter().filter(|n| world.can_move_to(**n)).count()
}

/// Whether `target` is cornered from the point of view of an attacker of `tier`.
pub fn is_target_trapped(world: &World, config: &Config, target: &Agent, tier: Difficulty) -> bool {
    if count_exits(world, target.pos) <= config.ai.trapped_exit_limit(tier) {
        return true;
    }
    let risk = risk_map(world, config, Some(target.id));
    if risk.risk_at(target.pos) == 0.0 {
        return false;
    }
    let safe = |pos: Pos| world.grid.is_floor(pos) && risk.risk_at(pos) == 0.0;
    let query = PathQuery::new(target.pos, Goal::Predicate(&safe))
        .for_agent(target.id)
        .avoiding_danger(false);
    find_path(world, config, &query).is_none()
}

/// Where `target` is expected to be shortly, extrapolated from its recent moves.
pub fn predict_target_position(
    world: &World,
    config: &Config,
    target: &Agent,
    tier: Difficulty,
) -> Pos {
    let steps = match tier {
        Difficulty::Easy => return target.pos,
        Difficulty::Normal => config.ai.normal_prediction_steps,
        Difficulty::Hard => config.ai.hard_prediction_steps,
    };

    if tier == Difficulty::Hard {
        let risk = risk_map(world, config, Some(target.id));
        if risk.risk_at(target.pos) > 0.0 {
            let safe = |pos: Pos| world.grid.is_floor(pos) && risk.risk_at(pos) == 0.0;
            let query = PathQuery::new(target.pos, Goal::Predicate(&safe))
                .for_agent(target.id)
                .avoiding_danger(false);
            let first = find_path(world, config, &query).and_then(|path| path.first().copied());
            if let Some(first) = first {
                return first.pos;
            }
        }
    }

    let (tx, ty) = target
        .move_history
        .iter()
        .fold((0, 0), |(ax, ay), (dx, dy)| (ax + dx, ay + dy));
    let dir = if tx.abs() > ty.abs() {
        Direction::from_delta(tx, 0)
    } else {
        Direction::from_delta(0, ty)
    };
    let Some(dir) = dir else {
        return target.pos;
    };
    let mut predicted = target.pos;
    let mut pos = target.pos;
    for _ in 0..steps {
        pos = pos.step(dir);
        if !world.can_move_to(pos) {
            break;
        }
        predicted = pos;
    }
    predicted
}

/// Fires the rocket when already facing `aim`; otherwise steps along the line to turn.
pub(super) fn fire_rocket_at(
    sit: &Situation<'_>,
    commands: &mut dyn AgentCommands,
    aim: Pos,
) -> Option<Decision> {
    let dir = shot_direction(sit.me.pos, aim)?;
    if sit.me.facing == dir {
        return commands.perform_action().then_some(Decision::Attack(Weapon::Rocket));
    }
    let next = sit.me.pos.step(dir);
    if next != aim && sit.step_is_safe(next, 1) {
        let (dx, dy) = dir.delta();
        if commands.attempt_move(dx, dy) {
            return Some(Decision::Chase);
        }
    }
    None
}
