use tracing::debug;

use crate::blast::{BlastReach, compute_blast_cells};
use crate::config::Config;
use crate::pathfinding::{ArrivalModel, PathQuery, find_path_with};
use crate::state::{Agent, Bomb, World};
use crate::threat::Hazards;
use crate::types::*;

/// Whether `me` can drop a bomb where it stands and still get out in time.
///
/// The check simulates the world with the bomb added and requires an escape route to a
/// zero-risk cell that is safe at every estimated arrival, finishing before detonation
/// with the tier's margin to spare. Hard agents also refuse to seal anyone else in.
pub fn can_place_bomb_safely(world: &World, config: &Config, me: &Agent, tier: Difficulty) -> bool {
    let Some(sim) = with_own_bomb(world, me) else {
        return false;
    };
    judge_placement(world, &sim, config, me, tier)
}

/// Same judgement as [`can_place_bomb_safely`], made on the arena as it will be once the
/// bomb has burned away the soft walls it reaches.
///
/// For an agent with no way out, this is what makes blasting a wall open worth trying.
pub fn can_blast_escape_route(
    world: &World,
    config: &Config,
    me: &Agent,
    tier: Difficulty,
) -> bool {
    let Some(mut sim) = with_own_bomb(world, me) else {
        return false;
    };
    let opened: Vec<Pos> = compute_blast_cells(me.pos, me.explosion_range, &world.grid)
        .into_iter()
        .filter(|cell| cell.reach == BlastReach::Absorbed)
        .map(|cell| cell.pos)
        .collect();
    if opened.is_empty() {
        return false;
    }
    for pos in opened {
        sim.grid.set_cell(pos, CellKind::Floor);
    }
    judge_placement(world, &sim, config, me, tier)
}

fn with_own_bomb(world: &World, me: &Agent) -> Option<World> {
    if me.active_bombs >= me.max_bombs {
        return None;
    }
    if world.bomb_at(me.pos).is_some() || world.landmine_at(me.pos).is_some() {
        return None;
    }

    let mut sim = world.clone();
    sim.bombs.push(Bomb {
        pos: me.pos,
        owner: Some(me.id),
        range: me.explosion_range,
        placed_at_ms: Some(world.now_ms),
    });
    if let Some(agent) = sim.agents.get_mut(me.id) {
        agent.active_bombs += 1;
    }
    Some(sim)
}

fn judge_placement(
    world: &World,
    sim: &World,
    config: &Config,
    me: &Agent,
    tier: Difficulty,
) -> bool {
    let hazards = Hazards::assess(sim, config, Some(me.id));
    let Some(path) = escape_route(sim, config, &hazards, me) else {
        debug!(agent = ?me.id, "bomb refused: no escape route");
        return false;
    };
    if path.is_empty() {
        return false;
    }

    let arrival = ArrivalModel::for_agent(sim, config, Some(me));
    for (i, step) in path.iter().enumerate() {
        if !arrival.is_safe(hazards.windows_at(step.pos), i as u32 + 1) {
            debug!(agent = ?me.id, step = ?step.pos, "bomb refused: escape step burns on arrival");
            return false;
        }
    }

    let escape_ms = arrival.arrival_ms(path.len() as u32).saturating_sub(world.now_ms);
    let margin_ms = safety_margin_ms(world, config, me, tier);
    if escape_ms + margin_ms >= config.arena.bomb_timer_ms {
        debug!(agent = ?me.id, escape_ms, margin_ms, "bomb refused: escape too slow");
        return false;
    }

    if tier == Difficulty::Hard && seals_in_bystander(sim, config, me) {
        debug!(agent = ?me.id, "bomb refused: would trap another agent");
        return false;
    }
    true
}

/// Tier buffer, widened while another of our bombs is ticking and early in the match.
pub fn safety_margin_ms(world: &World, config: &Config, me: &Agent, tier: Difficulty) -> u64 {
    let ai = &config.ai;
    let mut margin = ai.bomb_buffer_ms(tier);
    if me.active_bombs > 0 {
        margin += ai.extra_bomb_buffer_ms;
    }
    if world.elapsed_ms() < ai.early_match_window_ms {
        margin += ai.early_match_buffer_ms;
    }
    margin
}

fn escape_route(sim: &World, config: &Config, hazards: &Hazards, agent: &Agent) -> Option<Path> {
    let safe = |pos: Pos| sim.grid.is_floor(pos) && hazards.risk_at(pos) == 0.0;
    let query = PathQuery::new(agent.pos, Goal::Predicate(&safe))
        .for_agent(agent.id)
        .avoiding_danger(false);
    find_path_with(sim, config, hazards, &query)
}

/// Whether the simulated bomb (the last one in `sim`) leaves another live agent in its
/// blast with nowhere to go.
fn seals_in_bystander(sim: &World, config: &Config, me: &Agent) -> bool {
    let blast = compute_blast_cells(me.pos, me.explosion_range, &sim.grid);
    sim.opponents_of(me.id)
        .filter(|other| blast.iter().any(|cell| cell.pos == other.pos))
        .any(|other| {
            let hazards = Hazards::assess(sim, config, Some(other.id));
            escape_route(sim, config, &hazards, other).is_none()
        })
}
