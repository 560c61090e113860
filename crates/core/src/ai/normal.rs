use crate::random::RandomSource;
use crate::state::Agent;
use crate::types::*;

use super::movement::{commit_and_step, escape, follow_committed, seek_power_up, wander};
use super::safety::can_place_bomb_safely;
use super::situation::Situation;
use super::targeting::{
    fire_rocket_at, has_clear_shot, in_blast_line, is_bomb_useful, predict_target_position,
};
use super::{AgentCommands, Brain};

pub(super) fn decide(
    sit: &Situation<'_>,
    brain: &mut Brain,
    commands: &mut dyn AgentCommands,
    rng: &mut dyn RandomSource,
) -> Decision {
    let ai = &sit.config.ai;
    if sit.my_risk() > ai.normal_escape_risk {
        return escape(sit, brain, commands, rng);
    }
    if let Some(decision) = follow_committed(sit, brain, commands, false) {
        return decision;
    }

    if let Some(target) = sit.nearest_opponent() {
        let predicted = predict_target_position(sit.world, sit.config, target, sit.tier);
        if let Some(decision) = attack(sit, commands, rng, target, predicted) {
            return decision;
        }
        if predicted != sit.me.pos {
            let query = sit.query(Goal::Fixed(predicted));
            if let Some(path) = sit.find_path(&mut brain.cache, &query)
                && commit_and_step(sit, brain, commands, path)
            {
                return Decision::Chase;
            }
        }
    }

    if let Some(decision) = seek_power_up(sit, brain, commands) {
        return decision;
    }
    if let Some(decision) = demolish(sit, brain, commands, rng) {
        return decision;
    }
    wander(sit, commands, rng, sit.stand_still_chance(ai.normal_stand_still_chance))
}

fn attack(
    sit: &Situation<'_>,
    commands: &mut dyn AgentCommands,
    rng: &mut dyn RandomSource,
    target: &Agent,
    predicted: Pos,
) -> Option<Decision> {
    let ai = &sit.config.ai;
    let me = sit.me;
    let chance = sit.attack_chance(ai.normal_attack_chance);
    match me.effective_weapon() {
        Weapon::Rocket => {
            let aim = [predicted, target.pos].into_iter().find(|aim| {
                manhattan(me.pos, *aim) <= ai.normal_rocket_range
                    && has_clear_shot(sit.world, me.pos, *aim)
            })?;
            if !rng.chance(chance) {
                return None;
            }
            fire_rocket_at(sit, commands, aim)
        }
        Weapon::Bomb => {
            let lined_up = in_blast_line(sit.world, me.pos, predicted, me.explosion_range)
                || in_blast_line(sit.world, me.pos, target.pos, me.explosion_range);
            if !lined_up || !is_bomb_useful(sit.world, me, BombUse::Target) {
                return None;
            }
            if !rng.chance(sit.bomb_throttle(ai.normal_repeat_bomb_chance)) || !rng.chance(chance) {
                return None;
            }
            (can_place_bomb_safely(sit.world, sit.config, me, sit.tier)
                && commands.perform_action())
                .then_some(Decision::Attack(Weapon::Bomb))
        }
        Weapon::Landmine => {
            let free_cell =
                sit.world.bomb_at(me.pos).is_none() && sit.world.landmine_at(me.pos).is_none();
            if free_cell && manhattan(me.pos, predicted) <= 2 && rng.chance(chance) {
                return commands.perform_action().then_some(Decision::Attack(Weapon::Landmine));
            }
            None
        }
    }
}

/// Bombs an adjacent soft wall, or heads for the nearest cell next to one.
fn demolish(
    sit: &Situation<'_>,
    brain: &mut Brain,
    commands: &mut dyn AgentCommands,
    rng: &mut dyn RandomSource,
) -> Option<Decision> {
    let ai = &sit.config.ai;
    let me = sit.me;
    if me.effective_weapon() == Weapon::Bomb
        && is_bomb_useful(sit.world, me, BombUse::Wall)
        && rng.chance(sit.bomb_throttle(ai.normal_repeat_bomb_chance))
        && can_place_bomb_safely(sit.world, sit.config, me, sit.tier)
        && commands.perform_action()
    {
        return Some(Decision::Demolish);
    }

    let grid = &sit.world.grid;
    let breach = |pos: Pos| {
        pos != me.pos
            && sit.world.can_move_to(pos)
            && neighbors(pos).iter().any(|n| grid.cell_at(*n) == CellKind::SoftWall)
    };
    let path = sit.find_path(&mut brain.cache, &sit.query(Goal::Predicate(&breach)))?;
    commit_and_step(sit, brain, commands, path).then_some(Decision::Reposition)
}
