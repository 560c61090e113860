use slotmap::SecondaryMap;
use tracing::{debug, info};

use crate::ai::{AgentCommands, Brain, think_isolated};
use crate::config::Config;
use crate::error::{ConfigError, ThinkError};
use crate::random::SeededRandom;
use crate::state::World;
use crate::types::{AgentId, Decision, MatchOutcome};

use super::commands::{CommandQueue, apply_commands};
use super::lifecycle::{LifecycleEvent, advance_lifecycle};
use super::scheduler::ThinkScheduler;

/// One think cycle as seen by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThinkRecord {
    pub at_ms: u64,
    pub agent: AgentId,
    pub result: Result<Decision, ThinkError>,
}

/// A headless match: the world, one brain per computer agent, and the clock.
pub struct Arena {
    world: World,
    config: Config,
    brains: SecondaryMap<AgentId, Brain>,
    scheduler: ThinkScheduler,
    rng: SeededRandom,
}

impl Arena {
    /// Bombs without a placement time are treated as lit when the match starts.
    pub fn new(mut world: World, config: Config, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let now = world.now_ms;
        for bomb in world.bombs.iter_mut().filter(|bomb| bomb.placed_at_ms.is_none()) {
            bomb.placed_at_ms = Some(now);
        }
        let mut brains = SecondaryMap::new();
        for agent in world.agents.values() {
            if let Some(profile) = agent.profile {
                brains.insert(agent.id, Brain::new(profile, &config.ai));
            }
        }
        let (scheduler, rng) = (ThinkScheduler::new(), SeededRandom::new(seed));
        Ok(Self { world, config, brains, scheduler, rng })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Advances the clock by `dt_ms`, runs the lifecycle, then every due think cycle.
    ///
    /// Each agent's requests are applied as soon as its cycle ends, so later agents in
    /// the same step see the result.
    pub fn advance(&mut self, dt_ms: u64) -> (Vec<LifecycleEvent>, Vec<ThinkRecord>) {
        self.world.now_ms += dt_ms;
        let mut events = advance_lifecycle(&mut self.world, &self.config);
        let mut thoughts = Vec::new();

        for id in self.scheduler.due_agents(&self.world) {
            let Some(brain) = self.brains.get_mut(id) else {
                continue;
            };
            let (result, commands) = {
                let mut queue = CommandQueue::new(&self.world, id);
                let result =
                    think_isolated(brain, &self.world, id, &self.config, &mut self.rng, &mut queue);
                (result, queue.into_commands())
            };
            if let Err(err) = &result {
                debug!(agent = ?id, %err, "think cycle failed");
            }
            events.extend(apply_commands(&mut self.world, &self.config, id, &commands));
            if let Some(agent) = self.world.agent(id) {
                self.scheduler.mark_thought(agent, &self.config, self.world.now_ms);
            }
            thoughts.push(ThinkRecord { at_ms: self.world.now_ms, agent: id, result });
        }

        for event in &events {
            if let LifecycleEvent::AgentKilled { agent, .. } = event {
                self.scheduler.forget(*agent);
                if let Some(brain) = self.brains.get_mut(*agent) {
                    brain.committed = None;
                }
            }
        }
        (events, thoughts)
    }

    /// The winner once at most one agent is left standing, `Draw` when nobody is.
    pub fn outcome(&self) -> Option<MatchOutcome> {
        if self.world.agents.len() < 2 {
            return None;
        }
        let mut alive = self.world.alive_agents();
        match (alive.next(), alive.next()) {
            (None, _) => Some(MatchOutcome::Draw),
            (Some(winner), None) => Some(MatchOutcome::Winner(winner.id)),
            (Some(_), Some(_)) => None,
        }
    }

    /// Steps in `dt_ms` increments until the match ends or `limit_ms` of match time passes.
    pub fn run(&mut self, dt_ms: u64, limit_ms: u64) -> Option<MatchOutcome> {
        let deadline = self.world.now_ms + limit_ms;
        while self.world.now_ms < deadline {
            if let Some(outcome) = self.outcome() {
                info!(?outcome, at_ms = self.world.now_ms, "match finished");
                return Some(outcome);
            }
            self.advance(dt_ms.max(1));
        }
        let outcome = self.outcome();
        if outcome.is_none() {
            info!(at_ms = self.world.now_ms, "match hit its time limit");
        }
        outcome
    }

    /// Issues requests for a human-controlled agent through the same validation path.
    pub fn command(
        &mut self,
        id: AgentId,
        issue: impl FnOnce(&mut dyn AgentCommands),
    ) -> Vec<LifecycleEvent> {
        let commands = {
            let mut queue = CommandQueue::new(&self.world, id);
            issue(&mut queue);
            queue.into_commands()
        };
        apply_commands(&mut self.world, &self.config, id, &commands)
    }
}
