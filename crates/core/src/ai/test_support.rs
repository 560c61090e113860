use crate::config::{ArenaConfig, Config};
use crate::pathfinding::PathCache;
use crate::state::{Agent, Grid, World};
use crate::types::{AgentId, AiProfile, Difficulty, Personality, Pos};

use super::situation::Situation;
use super::{AgentCommands, Brain};

/// World built from ASCII rows, sixty seconds into a match that started at zero.
pub(crate) fn arena(rows: &[&str]) -> World {
    let mut world = World::new(Grid::from_ascii(rows).expect("test grid must parse"));
    world.now_ms = 60_000;
    world.started_at_ms = 0;
    world
}

pub(crate) fn at(x: i32, y: i32) -> Pos {
    Pos { y, x }
}

/// Adds an agent with default stats. `None` means a human-controlled agent.
pub(crate) fn add_agent(world: &mut World, pos: Pos, difficulty: Option<Difficulty>) -> AgentId {
    let profile =
        difficulty.map(|difficulty| AiProfile { difficulty, personality: Personality::Balanced });
    world.add_agent(Agent::new(pos, &ArenaConfig::default(), profile))
}

/// Brain for `me` with path caching disabled so tests see fresh searches.
pub(crate) fn brain_for(world: &World, me: AgentId) -> Brain {
    let profile = world.agents[me].profile.unwrap_or(AiProfile {
        difficulty: Difficulty::Normal,
        personality: Personality::Balanced,
    });
    Brain { profile, committed: None, cache: PathCache::disabled() }
}

pub(crate) fn situation<'a>(world: &'a World, config: &'a Config, me: AgentId) -> Situation<'a> {
    let agent = &world.agents[me];
    let profile = agent.profile.unwrap_or(AiProfile {
        difficulty: Difficulty::Normal,
        personality: Personality::Balanced,
    });
    Situation::new(world, config, agent, profile)
}

/// Accepts every request and records it.
#[derive(Debug, Default)]
pub(crate) struct RecordingCommands {
    pub moves: Vec<(i32, i32)>,
    pub actions: usize,
}

impl AgentCommands for RecordingCommands {
    fn attempt_move(&mut self, dx: i32, dy: i32) -> bool {
        self.moves.push((dx, dy));
        true
    }

    fn perform_action(&mut self) -> bool {
        self.actions += 1;
        true
    }
}
