//! Per-tier decision policies run once per think cycle.
//! This module exists to turn a world snapshot into at most one move and one action for an agent.
//! It does not own movement validation, weapon effects or think scheduling; the host does.

mod easy;
mod hard;
mod movement;
mod normal;
mod safety;
mod situation;
mod targeting;

#[cfg(test)]
mod test_support;

use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{debug, warn};

use crate::config::{AiTuning, Config};
use crate::error::ThinkError;
use crate::pathfinding::PathCache;
use crate::random::RandomSource;
use crate::state::World;
use crate::types::{AgentId, AiProfile, Decision, Difficulty};

pub use movement::CommittedPath;
pub use safety::{can_blast_escape_route, can_place_bomb_safely, safety_margin_ms};
pub use situation::Situation;
pub use targeting::{
    count_exits, has_clear_shot, in_blast_line, is_bomb_useful, is_target_trapped,
    predict_target_position, shot_direction,
};

/// The two requests a strategy may make of the entity layer.
///
/// Both return whether the request was honoured. Movement is subject to the agent's
/// cooldown; actions use whichever weapon is active and are never rate limited.
pub trait AgentCommands {
    fn attempt_move(&mut self, dx: i32, dy: i32) -> bool;
    fn perform_action(&mut self) -> bool;
}

/// Memory a computer-controlled agent keeps between think cycles.
#[derive(Clone, Debug)]
pub struct Brain {
    pub profile: AiProfile,
    pub committed: Option<CommittedPath>,
    pub cache: PathCache,
}

impl Brain {
    pub fn new(profile: AiProfile, tuning: &AiTuning) -> Self {
        Self { profile, committed: None, cache: PathCache::new(tuning) }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.profile.difficulty
    }
}

/// Runs one think cycle for `me` against a fresh snapshot.
pub fn think(
    brain: &mut Brain,
    world: &World,
    me: AgentId,
    config: &Config,
    rng: &mut dyn RandomSource,
    commands: &mut dyn AgentCommands,
) -> Result<Decision, ThinkError> {
    let agent = world.agent(me).ok_or(ThinkError::UnknownAgent(me))?;
    if !agent.alive {
        brain.committed = None;
        return Err(ThinkError::DeadAgent(me));
    }

    let sit = Situation::new(world, config, agent, brain.profile);
    let decision = match sit.tier {
        Difficulty::Easy => easy::decide(&sit, brain, commands, rng),
        Difficulty::Normal => normal::decide(&sit, brain, commands, rng),
        Difficulty::Hard => hard::decide(&sit, brain, commands, rng),
    };
    debug!(agent = ?me, tier = ?sit.tier, ?decision, pos = ?agent.pos, "think");
    Ok(decision)
}

/// `think`, with a panic inside the cycle turned into an error.
///
/// The committed path is dropped after a panic so the next cycle plans from scratch.
pub fn think_isolated(
    brain: &mut Brain,
    world: &World,
    me: AgentId,
    config: &Config,
    rng: &mut dyn RandomSource,
    commands: &mut dyn AgentCommands,
) -> Result<Decision, ThinkError> {
    let outcome = catch_unwind(AssertUnwindSafe(|| think(brain, world, me, config, rng, commands)));
    match outcome {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|text| (*text).to_owned())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_owned());
            warn!(agent = ?me, %message, "think cycle panicked");
            brain.committed = None;
            Err(ThinkError::Panicked { agent: me, message })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::test_support::*;
    use crate::random::ScriptedRandom;
    use crate::types::Personality;

    struct PanickingCommands;

    impl AgentCommands for PanickingCommands {
        fn attempt_move(&mut self, _dx: i32, _dy: i32) -> bool {
            panic!("input device unplugged");
        }

        fn perform_action(&mut self) -> bool {
            panic!("input device unplugged");
        }
    }

    #[test]
    fn dispatches_on_the_brain_tier() {
        let config = Config::default();
        let mut world = arena(&[".....", ".....", "....."]);
        let me = add_agent(&mut world, at(2, 1), Some(Difficulty::Easy));
        let mut brain = brain_for(&world, me);
        let mut commands = RecordingCommands::default();
        let mut rng = ScriptedRandom::constant(0.1);
        let decision = think(&mut brain, &world, me, &config, &mut rng, &mut commands);
        assert_eq!(decision, Ok(Decision::Idle));
    }

    #[test]
    fn unknown_and_dead_agents_are_errors() {
        let config = Config::default();
        let mut world = arena(&["..."]);
        let me = add_agent(&mut world, at(0, 0), Some(Difficulty::Normal));
        let mut brain = Brain::new(
            AiProfile { difficulty: Difficulty::Normal, personality: Personality::Balanced },
            &config.ai,
        );
        let mut commands = RecordingCommands::default();
        let mut rng = ScriptedRandom::constant(0.5);

        world.agents[me].alive = false;
        assert_eq!(
            think(&mut brain, &world, me, &config, &mut rng, &mut commands),
            Err(ThinkError::DeadAgent(me))
        );
        world.agents.remove(me);
        assert_eq!(
            think(&mut brain, &world, me, &config, &mut rng, &mut commands),
            Err(ThinkError::UnknownAgent(me))
        );
    }

    #[test]
    fn panics_are_contained_and_reported() {
        let config = Config::default();
        let mut world = arena(&[".....", ".....", "....."]);
        let me = add_agent(&mut world, at(2, 1), Some(Difficulty::Easy));
        let mut brain = brain_for(&world, me);
        let result = think_isolated(
            &mut brain,
            &world,
            me,
            &config,
            &mut ScriptedRandom::constant(0.99),
            &mut PanickingCommands,
        );
        match result {
            Err(ThinkError::Panicked { agent, message }) => {
                assert_eq!(agent, me);
                assert_eq!(message, "input device unplugged");
            }
            other => panic!("expected an isolated panic, got {other:?}"),
        }
        assert!(brain.committed.is_none());
    }
}
