use tracing::trace;

use crate::random::RandomSource;
use crate::state::Agent;
use crate::threat::{InfluenceMap, influence_map, is_chokepoint};
use crate::types::*;

use super::movement::{commit_and_step, escape, follow_committed, wander};
use super::safety::can_place_bomb_safely;
use super::situation::Situation;
use super::targeting::{
    fire_rocket_at, has_clear_shot, in_blast_line, is_bomb_useful, is_target_trapped,
    predict_target_position,
};
use super::{AgentCommands, Brain};

/// Best cell of the local scan and how much it beats standing still.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Vantage {
    pos: Pos,
    gain: f32,
}

pub(super) fn decide(
    sit: &Situation<'_>,
    brain: &mut Brain,
    commands: &mut dyn AgentCommands,
    rng: &mut dyn RandomSource,
) -> Decision {
    let ai = &sit.config.ai;
    if sit.my_risk() > ai.hard_escape_risk {
        return escape(sit, brain, commands, rng);
    }
    if let Some(decision) = follow_committed(sit, brain, commands, true) {
        return decision;
    }

    let trapped = |agent: &Agent| is_target_trapped(sit.world, sit.config, agent, Difficulty::Hard);
    let influence = influence_map(sit.world, sit.config, sit.me.id, &trapped);
    let vantage = best_vantage(sit, &influence);

    if let Some(target) = sit.nearest_opponent() {
        let predicted = predict_target_position(sit.world, sit.config, target, sit.tier);
        if let Some(decision) = attack(sit, commands, rng, target, predicted) {
            return decision;
        }
    }

    if vantage.pos != sit.me.pos && vantage.gain > ai.hard_hysteresis {
        trace!(agent = ?sit.me.id, to = ?vantage.pos, gain = vantage.gain, "repositioning");
        let query = sit.query(Goal::Fixed(vantage.pos));
        if let Some(path) = sit.find_path(&mut brain.cache, &query)
            && commit_and_step(sit, brain, commands, path)
        {
            return Decision::Reposition;
        }
    }

    if let Some(decision) = demolish(sit, commands, rng) {
        return decision;
    }
    wander(sit, commands, rng, sit.stand_still_chance(ai.hard_stand_still_chance))
}

/// Scores every walkable cell within the scan radius. Staying put earns the idle bonus;
/// risk is penalised steeply enough to rule out anything but a zero-risk cell.
fn best_vantage(sit: &Situation<'_>, influence: &InfluenceMap) -> Vantage {
    let ai = &sit.config.ai;
    let here = sit.me.pos;
    let score = |pos: Pos| {
        let mut value = influence.value_or(pos, 0.0)
            - sit.risk_at(pos) * ai.hard_risk_penalty
            - manhattan(here, pos) as f32 * ai.hard_distance_penalty;
        if pos == here {
            value += ai.hard_idle_bonus;
        }
        value
    };

    let current = score(here);
    let mut best = Vantage { pos: here, gain: 0.0 };
    let r = ai.hard_scan_radius as i32;
    for dy in -r..=r {
        for dx in -r..=r {
            let pos = here.offset(dx, dy);
            if pos == here
                || manhattan(here, pos) > ai.hard_scan_radius
                || !sit.world.can_move_to(pos)
            {
                continue;
            }
            let gain = score(pos) - current;
            if gain > best.gain {
                best = Vantage { pos, gain };
            }
        }
    }
    best
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
    let world = sit.world;
    match me.effective_weapon() {
        Weapon::Bomb => {
            let lined_up = in_blast_line(world, me.pos, predicted, me.explosion_range)
                || in_blast_line(world, me.pos, target.pos, me.explosion_range);
            if !lined_up || !is_bomb_useful(world, me, BombUse::Target) {
                return None;
            }
            let cornered = is_target_trapped(world, sit.config, target, Difficulty::Hard);
            if !cornered {
                let chance = if me.active_bombs > 0 {
                    ai.hard_repeat_bomb_chance
                } else {
                    ai.hard_attack_chance
                };
                if !rng.chance(sit.attack_chance(chance)) {
                    return None;
                }
            }
            (can_place_bomb_safely(world, sit.config, me, sit.tier) && commands.perform_action())
                .then_some(Decision::Attack(Weapon::Bomb))
        }
        Weapon::Rocket => {
            let aim = [predicted, target.pos].into_iter().find(|aim| {
                manhattan(me.pos, *aim) <= ai.hard_rocket_range
                    && has_clear_shot(world, me.pos, *aim)
            })?;
            if !rng.chance(sit.attack_chance(ai.hard_attack_chance)) {
                return None;
            }
            fire_rocket_at(sit, commands, aim)
        }
        Weapon::Landmine => {
            let ambush = is_chokepoint(&world.grid, me.pos)
                && manhattan(me.pos, predicted) < ai.hard_mine_target_distance
                && world.bomb_at(me.pos).is_none()
                && world.landmine_at(me.pos).is_none();
            (ambush && commands.perform_action()).then_some(Decision::Attack(Weapon::Landmine))
        }
    }
}

fn demolish(
    sit: &Situation<'_>,
    commands: &mut dyn AgentCommands,
    rng: &mut dyn RandomSource,
) -> Option<Decision> {
    let me = sit.me;
    let fired = match me.effective_weapon() {
        Weapon::Bomb => {
            is_bomb_useful(sit.world, me, BombUse::Wall)
                && rng.chance(sit.bomb_throttle(sit.config.ai.hard_repeat_bomb_chance))
                && can_place_bomb_safely(sit.world, sit.config, me, sit.tier)
                && commands.perform_action()
        }
        Weapon::Rocket => {
            sit.world.grid.cell_at(me.pos.step(me.facing)) == CellKind::SoftWall
                && commands.perform_action()
        }
        Weapon::Landmine => false,
    };
    fired.then_some(Decision::Demolish)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::test_support::*;
    use crate::config::Config;
    use crate::random::ScriptedRandom;
    use crate::state::{Bomb, PowerUp, World};

    fn decide_with(
        world: &World,
        config: &Config,
        me: AgentId,
        sample: f64,
    ) -> (Decision, RecordingCommands, Brain) {
        let mut brain = brain_for(world, me);
        let mut commands = RecordingCommands::default();
        let sit = situation(world, config, me);
        let mut rng = ScriptedRandom::constant(sample);
        let decision = decide(&sit, &mut brain, &mut commands, &mut rng);
        (decision, commands, brain)
    }

    #[test]
    fn flees_even_the_faintest_risk() {
        let config = Config::default();
        let mut world = arena(&[".......", ".......", "......."]);
        let me = add_agent(&mut world, at(1, 1), Some(Difficulty::Hard));
        world.bombs.push(Bomb {
            pos: at(3, 1),
            owner: None,
            range: 2,
            placed_at_ms: Some(world.now_ms),
        });
        let (decision, commands, brain) = decide_with(&world, &config, me, 0.5);
        assert_eq!(decision, Decision::Escape);
        assert_eq!(commands.moves.len(), 1);
        assert!(brain.committed.is_none());
    }

    #[test]
    fn scenario_c_fires_a_rocket_down_the_row() {
        let config = Config::default();
        let mut world = arena(&[".......", ".......", "......."]);
        let me = add_agent(&mut world, at(0, 1), Some(Difficulty::Hard));
        add_agent(&mut world, at(5, 1), None);
        world.agents[me].active_weapon = Weapon::Rocket;
        world.agents[me].rockets = 2;
        world.agents[me].facing = Direction::Right;
        let (decision, commands, _) = decide_with(&world, &config, me, 0.0);
        assert_eq!(decision, Decision::Attack(Weapon::Rocket));
        assert_eq!(commands.actions, 1);
    }

    #[test]
    fn bombs_a_cornered_target_without_rolling_the_dice() {
        let config = Config::default();
        let mut world = arena(&["#######", "###.###", "#.....#", "#.....#", "#.....#", "#######"]);
        let me = add_agent(&mut world, at(3, 3), Some(Difficulty::Hard));
        let target = add_agent(&mut world, at(3, 1), None);
        world.agents[me].explosion_range = 2;
        assert!(is_target_trapped(&world, &config, &world.agents[target], Difficulty::Hard));
        let (decision, commands, _) = decide_with(&world, &config, me, 0.999);
        assert_eq!(decision, Decision::Attack(Weapon::Bomb));
        assert_eq!(commands.actions, 1);
    }

    #[test]
    fn lays_a_mine_at_a_chokepoint_near_the_target() {
        let config = Config::default();
        let mut world = arena(&["#######", "#.....#", "#######"]);
        let me = add_agent(&mut world, at(2, 1), Some(Difficulty::Hard));
        add_agent(&mut world, at(5, 1), None);
        world.agents[me].active_weapon = Weapon::Landmine;
        world.agents[me].landmines = 1;
        let (decision, commands, _) = decide_with(&world, &config, me, 0.5);
        assert_eq!(decision, Decision::Attack(Weapon::Landmine));
        assert_eq!(commands.actions, 1);
    }

    #[test]
    fn moves_to_a_clearly_better_cell() {
        let mut config = Config::default();
        config.ai.power_up_strength = 6.0;
        let mut world = arena(&[".........", ".........", "........."]);
        let me = add_agent(&mut world, at(0, 1), Some(Difficulty::Hard));
        world.power_ups.push(PowerUp { pos: at(3, 1), kind: PowerUpKind::Range });
        let (decision, commands, brain) = decide_with(&world, &config, me, 0.5);
        assert_eq!(decision, Decision::Reposition);
        assert_eq!(commands.moves, vec![(1, 0)]);
        assert_eq!(brain.committed.map(|plan| plan.destination), Some(at(3, 1)));
    }

    #[test]
    fn small_gains_do_not_beat_the_hysteresis() {
        let config = Config::default();
        let mut world = arena(&[".........", ".........", "........."]);
        let me = add_agent(&mut world, at(0, 1), Some(Difficulty::Hard));
        world.power_ups.push(PowerUp { pos: at(3, 1), kind: PowerUpKind::Range });
        let (decision, commands, _) = decide_with(&world, &config, me, 0.1);
        assert_eq!(decision, Decision::Idle);
        assert!(commands.moves.is_empty());
    }

    #[test]
    fn rockets_a_soft_wall_it_is_facing() {
        let config = Config::default();
        let mut world = arena(&["...", "..*", "..."]);
        let me = add_agent(&mut world, at(1, 1), Some(Difficulty::Hard));
        world.agents[me].active_weapon = Weapon::Rocket;
        world.agents[me].rockets = 1;
        world.agents[me].facing = Direction::Right;
        let (decision, commands, _) = decide_with(&world, &config, me, 0.5);
        assert_eq!(decision, Decision::Demolish);
        assert_eq!(commands.actions, 1);
    }

    #[test]
    fn vantage_scan_never_prefers_a_risky_cell() {
        let mut config = Config::default();
        config.ai.power_up_strength = 6.0;
        let mut world = arena(&[".........", ".........", "........."]);
        let me = add_agent(&mut world, at(0, 1), Some(Difficulty::Hard));
        world.power_ups.push(PowerUp { pos: at(3, 1), kind: PowerUpKind::Range });
        world.bombs.push(Bomb { pos: at(3, 0), owner: None, range: 1, placed_at_ms: None });
        let sit = situation(&world, &config, me);
        let influence = influence_map(&world, &config, me, &|_| false);
        let vantage = best_vantage(&sit, &influence);
        assert_eq!(sit.risk_at(vantage.pos), 0.0);
        assert_ne!(vantage.pos, at(3, 1));
    }
}
