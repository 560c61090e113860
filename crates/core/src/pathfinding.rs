//! Time- and risk-aware A* over the arena grid.
//! This module exists so strategies and debugging tools ask the same routing question the same way.
//! It does not own hazard estimation or any choice of where an agent should go.

mod cache;
mod search;

pub use cache::PathCache;
pub use search::{ArrivalModel, find_path, find_path_with};

use crate::types::{AgentId, Goal, Pos};

#[derive(Clone, Copy, Debug)]
pub struct PathQuery<'g> {
    pub start: Pos,
    pub goal: Goal<'g>,
    /// Skip cells above the static risk ceiling and cells that burn on arrival.
    pub avoid_danger: bool,
    /// Allow routing through soft walls at a steep cost.
    pub include_soft_walls: bool,
    /// Agent whose timing, mine knowledge and body the search accounts for.
    pub asker: Option<AgentId>,
}

impl<'g> PathQuery<'g> {
    pub fn new(start: Pos, goal: Goal<'g>) -> Self {
        Self { start, goal, avoid_danger: true, include_soft_walls: false, asker: None }
    }

    pub fn for_agent(mut self, asker: AgentId) -> Self {
        self.asker = Some(asker);
        self
    }

    pub fn avoiding_danger(mut self, avoid_danger: bool) -> Self {
        self.avoid_danger = avoid_danger;
        self
    }

    pub fn through_soft_walls(mut self, include_soft_walls: bool) -> Self {
        self.include_soft_walls = include_soft_walls;
        self
    }
}
