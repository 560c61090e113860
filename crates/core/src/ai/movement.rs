use std::collections::VecDeque;

use tracing::debug;

use crate::random::{RandomSource, shuffle};
use crate::types::*;

use super::safety::can_blast_escape_route;
use super::situation::Situation;
use super::{AgentCommands, Brain};

/// A path the agent has committed to following across think cycles.
#[derive(Clone, Debug, PartialEq)]
pub struct CommittedPath {
    pub destination: Pos,
    pub steps: VecDeque<PathStep>,
}

/// Gets off unsafe ground: along the shortest route to a zero-risk cell when one exists,
/// otherwise by the best local step.
pub(super) fn escape(
    sit: &Situation<'_>,
    brain: &mut Brain,
    commands: &mut dyn AgentCommands,
    rng: &mut dyn RandomSource,
) -> Decision {
    brain.committed = None;
    if let Some(path) = sit.path_to_safety(&mut brain.cache)
        && let Some(first) = path.first()
    {
        commands.attempt_move(first.dx, first.dy);
        return Decision::Escape;
    }

    if sit.tier == Difficulty::Hard
        && sit.me.effective_weapon() == Weapon::Bomb
        && neighbors(sit.me.pos).iter().any(|n| sit.world.grid.cell_at(*n) == CellKind::SoftWall)
        && can_blast_escape_route(sit.world, sit.config, sit.me, sit.tier)
        && commands.perform_action()
    {
        debug!(agent = ?sit.me.id, "blasting an escape route through a soft wall");
        return Decision::Escape;
    }

    step_to_lowest_risk(sit, commands, rng);
    Decision::Escape
}

fn step_to_lowest_risk(
    sit: &Situation<'_>,
    commands: &mut dyn AgentCommands,
    rng: &mut dyn RandomSource,
) -> bool {
    let here = sit.my_risk();
    let mut dirs = Direction::ALL;
    shuffle(&mut dirs, rng);
    let best = dirs
        .into_iter()
        .map(|dir| (dir, sit.me.pos.step(dir)))
        .filter(|(_, pos)| sit.world.can_move_to(*pos) && sit.risk_at(*pos) <= here)
        .min_by(|a, b| sit.risk_at(a.1).total_cmp(&sit.risk_at(b.1)));
    match best {
        Some((dir, _)) => {
            let (dx, dy) = dir.delta();
            commands.attempt_move(dx, dy)
        }
        None => false,
    }
}

/// Random safe step, or standing still with probability `stand_still` when already safe.
pub(super) fn wander(
    sit: &Situation<'_>,
    commands: &mut dyn AgentCommands,
    rng: &mut dyn RandomSource,
    stand_still: f64,
) -> Decision {
    let here = sit.my_risk();
    if here == 0.0 && rng.chance(stand_still) {
        return Decision::Idle;
    }
    let mut dirs = Direction::ALL;
    shuffle(&mut dirs, rng);
    for dir in dirs {
        let next = sit.me.pos.step(dir);
        if !sit.step_is_safe(next, 1) || sit.risk_at(next) > here {
            continue;
        }
        let (dx, dy) = dir.delta();
        if commands.attempt_move(dx, dy) {
            return Decision::Wander;
        }
    }
    Decision::Idle
}

/// Keeps walking a committed path while it stays valid.
///
/// `strict` demands exactly zero risk at the destination and the next step; otherwise
/// the destination must stay under the escape threshold and the next step under the
/// static ceiling. Returns `None` once the path is finished or abandoned.
pub(super) fn follow_committed(
    sit: &Situation<'_>,
    brain: &mut Brain,
    commands: &mut dyn AgentCommands,
    strict: bool,
) -> Option<Decision> {
    let plan = brain.committed.as_mut()?;
    if let Some(reached) = plan.steps.iter().position(|step| step.pos == sit.me.pos) {
        plan.steps.drain(..=reached);
    }
    let Some(next) = plan.steps.front().copied() else {
        brain.committed = None;
        return None;
    };

    let ai = &sit.config.ai;
    let destination_risk = sit.risk_at(plan.destination);
    let next_risk = sit.risk_at(next.pos);
    let still_valid = manhattan(next.pos, sit.me.pos) == 1
        && sit.step_is_safe(next.pos, 1)
        && if strict {
            destination_risk == 0.0 && next_risk == 0.0
        } else {
            destination_risk < ai.normal_escape_risk && next_risk < ai.static_risk_ceiling
        };
    if !still_valid {
        debug!(agent = ?sit.me.id, destination = ?plan.destination, "abandoning committed path");
        brain.committed = None;
        return None;
    }

    commands.attempt_move(next.pos.x - sit.me.pos.x, next.pos.y - sit.me.pos.y);
    Some(Decision::FollowPath)
}

/// Heads for the nearest power-up that has a safe route.
pub(super) fn seek_power_up(
    sit: &Situation<'_>,
    brain: &mut Brain,
    commands: &mut dyn AgentCommands,
) -> Option<Decision> {
    let here = sit.me.pos;
    let mut targets: Vec<Pos> = sit.world.power_ups.iter().map(|power_up| power_up.pos).collect();
    targets.sort_by_key(|pos| (manhattan(here, *pos), *pos));
    for target in targets.into_iter().filter(|pos| *pos != here) {
        let query = sit.query(Goal::Fixed(target));
        if let Some(path) = sit.find_path(&mut brain.cache, &query) {
            return commit_and_step(sit, brain, commands, path).then_some(Decision::Reposition);
        }
    }
    None
}

/// Commits to `path` and takes its first step. Empty paths are not committed.
pub(super) fn commit_and_step(
    sit: &Situation<'_>,
    brain: &mut Brain,
    commands: &mut dyn AgentCommands,
    path: Path,
) -> bool {
    let (Some(first), Some(last)) = (path.first().copied(), path.last().copied()) else {
        return false;
    };
    if !sit.step_is_safe(first.pos, 1) {
        return false;
    }
    brain.committed = Some(CommittedPath { destination: last.pos, steps: path.into() });
    commands.attempt_move(first.dx, first.dy);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::test_support::*;
    use crate::config::Config;
    use crate::random::ScriptedRandom;
    use crate::state::Bomb;

    #[test]
    fn scenario_a_escape_leaves_the_blast_row() {
        let config = Config::default();
        let mut world = arena(&[".....", ".....", "....."]);
        let me = add_agent(&mut world, at(0, 0), Some(Difficulty::Normal));
        world.bombs.push(Bomb {
            pos: at(2, 0),
            owner: None,
            range: 2,
            placed_at_ms: Some(world.now_ms - 2_990),
        });
        let mut brain = brain_for(&world, me);
        let mut commands = RecordingCommands::default();
        let sit = situation(&world, &config, me);
        let decision = escape(&sit, &mut brain, &mut commands, &mut ScriptedRandom::constant(0.5));
        assert_eq!(decision, Decision::Escape);
        assert_eq!(commands.moves, vec![(0, 1)], "must move off row 0");
    }

    #[test]
    fn escape_without_a_route_takes_the_least_risky_step() {
        let config = Config::default();
        let mut world = arena(&["#####", "#...#", "#####"]);
        let me = add_agent(&mut world, at(2, 1), Some(Difficulty::Normal));
        world.bombs.push(Bomb {
            pos: at(1, 1),
            owner: None,
            range: 1,
            placed_at_ms: Some(world.now_ms),
        });
        world.bombs.push(Bomb { pos: at(3, 1), owner: None, range: 2, placed_at_ms: None });
        let mut brain = brain_for(&world, me);
        let mut commands = RecordingCommands::default();
        let sit = situation(&world, &config, me);
        escape(&sit, &mut brain, &mut commands, &mut ScriptedRandom::constant(0.5));
        assert!(commands.moves.is_empty(), "both exits hold bombs, nothing to step onto");
    }

    #[test]
    fn walled_in_hard_agent_bombs_the_soft_wall_beside_it() {
        let config = Config::default();
        let mut world = arena(&["#######", "#..*..#", "#######"]);
        let me = add_agent(&mut world, at(2, 1), Some(Difficulty::Hard));
        world.bombs.push(Bomb {
            pos: at(1, 1),
            owner: None,
            range: 1,
            placed_at_ms: Some(world.now_ms - 1_000),
        });
        let mut brain = brain_for(&world, me);
        let mut commands = RecordingCommands::default();
        let sit = situation(&world, &config, me);
        let decision = escape(&sit, &mut brain, &mut commands, &mut ScriptedRandom::constant(0.5));
        assert_eq!(decision, Decision::Escape);
        assert_eq!(commands.actions, 1);
        assert!(commands.moves.is_empty());

        world.agents[me].profile = Some(AiProfile {
            difficulty: Difficulty::Normal,
            personality: Personality::Balanced,
        });
        let mut commands = RecordingCommands::default();
        let sit = situation(&world, &config, me);
        escape(&sit, &mut brain, &mut commands, &mut ScriptedRandom::constant(0.5));
        assert_eq!(commands.actions, 0, "only the hard tier blasts its way out");
    }

    #[test]
    fn wander_stays_put_when_safe_and_the_dice_say_so() {
        let config = Config::default();
        let mut world = arena(&["...", "...", "..."]);
        let me = add_agent(&mut world, at(1, 1), Some(Difficulty::Easy));
        let sit = situation(&world, &config, me);
        let mut commands = RecordingCommands::default();
        let decision = wander(&sit, &mut commands, &mut ScriptedRandom::constant(0.1), 0.5);
        assert_eq!(decision, Decision::Idle);
        assert!(commands.moves.is_empty());
        let decision = wander(&sit, &mut commands, &mut ScriptedRandom::constant(0.9), 0.5);
        assert_eq!(decision, Decision::Wander);
        assert_eq!(commands.moves.len(), 1);
    }

    #[test]
    fn wander_never_steps_into_risk() {
        let config = Config::default();
        let mut world = arena(&["#####", "#...#", "#####"]);
        let me = add_agent(&mut world, at(1, 1), Some(Difficulty::Easy));
        world.bombs.push(Bomb {
            pos: at(3, 1),
            owner: None,
            range: 1,
            placed_at_ms: Some(world.now_ms),
        });
        let sit = situation(&world, &config, me);
        let mut commands = RecordingCommands::default();
        let decision = wander(&sit, &mut commands, &mut ScriptedRandom::constant(0.9), 0.0);
        assert_eq!(decision, Decision::Idle);
        assert!(commands.moves.is_empty());
    }

    #[test]
    fn committed_path_is_followed_then_abandoned_when_it_turns_risky() {
        let config = Config::default();
        let mut world = arena(&[".....", ".....", "....."]);
        let me = add_agent(&mut world, at(0, 1), Some(Difficulty::Hard));
        let mut brain = brain_for(&world, me);
        let path = {
            let sit = situation(&world, &config, me);
            sit.find_path(&mut brain.cache, &sit.query(Goal::Fixed(at(4, 1)))).expect("open grid")
        };
        let mut commands = RecordingCommands::default();
        {
            let sit = situation(&world, &config, me);
            assert!(commit_and_step(&sit, &mut brain, &mut commands, path));
        }
        world.agents[me].pos = at(1, 1);
        {
            let sit = situation(&world, &config, me);
            assert_eq!(
                follow_committed(&sit, &mut brain, &mut commands, true),
                Some(Decision::FollowPath)
            );
        }
        assert_eq!(commands.moves, vec![(1, 0), (1, 0)]);

        world.bombs.push(Bomb {
            pos: at(4, 2),
            owner: None,
            range: 1,
            placed_at_ms: Some(world.now_ms),
        });
        let sit = situation(&world, &config, me);
        assert_eq!(follow_committed(&sit, &mut brain, &mut commands, true), None);
        assert!(brain.committed.is_none());
    }
}
