use slotmap::SecondaryMap;

use crate::config::Config;
use crate::state::{Agent, World};
use crate::types::AgentId;

/// Think cadence for `agent`, or `None` for a human-controlled agent.
///
/// The tier interval shrinks in proportion to the agent's move cooldown, so faster
/// agents also think faster, down to the configured floor.
pub fn think_interval_ms(agent: &Agent, config: &Config) -> Option<u64> {
    let tier = agent.difficulty()?;
    let base = config.ai.think_interval_ms(tier);
    let initial = config.arena.initial_move_cooldown_ms.max(1);
    let scaled = base * agent.move_cooldown_ms / initial;
    Some(scaled.max(config.ai.min_think_interval_ms))
}

/// Next think time per computer-controlled agent.
#[derive(Clone, Debug, Default)]
pub struct ThinkScheduler {
    next_due_ms: SecondaryMap<AgentId, u64>,
}

impl ThinkScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live computer agents whose think time has come, in world order.
    /// Agents never scheduled are due immediately.
    pub fn due_agents(&self, world: &World) -> Vec<AgentId> {
        world
            .alive_agents()
            .filter(|agent| agent.profile.is_some())
            .filter(|agent| self.next_due_ms.get(agent.id).is_none_or(|due| *due <= world.now_ms))
            .map(|agent| agent.id)
            .collect()
    }

    pub fn mark_thought(&mut self, agent: &Agent, config: &Config, now_ms: u64) {
        if let Some(interval) = think_interval_ms(agent, config) {
            self.next_due_ms.insert(agent.id, now_ms + interval);
        }
    }

    pub fn next_due_ms(&self, id: AgentId) -> Option<u64> {
        self.next_due_ms.get(id).copied()
    }

    pub fn forget(&mut self, id: AgentId) {
        self.next_due_ms.remove(id);
    }
}
