use crate::random::RandomSource;
use crate::types::*;

use super::movement::{escape, wander};
use super::safety::can_place_bomb_safely;
use super::situation::Situation;
use super::targeting::is_bomb_useful;
use super::{AgentCommands, Brain};

/// Sluggish play: flee danger, mostly idle, occasionally clear a wall, otherwise drift.
pub(super) fn decide(
    sit: &Situation<'_>,
    brain: &mut Brain,
    commands: &mut dyn AgentCommands,
    rng: &mut dyn RandomSource,
) -> Decision {
    let ai = &sit.config.ai;
    if sit.my_risk() > ai.easy_escape_risk {
        return escape(sit, brain, commands, rng);
    }
    if rng.chance(ai.easy_idle_chance) {
        return Decision::Idle;
    }
    if rng.chance(ai.easy_demolish_chance)
        && sit.me.effective_weapon() == Weapon::Bomb
        && is_bomb_useful(sit.world, sit.me, BombUse::Wall)
        && can_place_bomb_safely(sit.world, sit.config, sit.me, sit.tier)
        && commands.perform_action()
    {
        return Decision::Demolish;
    }
    wander(sit, commands, rng, sit.stand_still_chance(ai.easy_stand_still_chance))
}
