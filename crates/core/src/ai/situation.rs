use crate::config::Config;
use crate::pathfinding::{ArrivalModel, PathCache, PathQuery};
use crate::state::{Agent, World};
use crate::threat::Hazards;
use crate::types::*;

/// Everything one think cycle reads, assessed once from the acting agent's point of view.
pub struct Situation<'a> {
    pub world: &'a World,
    pub config: &'a Config,
    pub me: &'a Agent,
    pub tier: Difficulty,
    pub personality: Personality,
    pub hazards: Hazards,
    pub arrival: ArrivalModel,
}

impl<'a> Situation<'a> {
    pub fn new(world: &'a World, config: &'a Config, me: &'a Agent, profile: AiProfile) -> Self {
        Self {
            world,
            config,
            me,
            tier: profile.difficulty,
            personality: profile.personality,
            hazards: Hazards::assess(world, config, Some(me.id)),
            arrival: ArrivalModel::for_agent(world, config, Some(me)),
        }
    }

    pub fn risk_at(&self, pos: Pos) -> f32 {
        self.hazards.risk_at(pos)
    }

    pub fn my_risk(&self) -> f32 {
        self.risk_at(self.me.pos)
    }

    pub fn is_safe_cell(&self, pos: Pos) -> bool {
        self.world.grid.is_floor(pos) && self.risk_at(pos) == 0.0
    }

    /// Whether moving into `pos` as the `steps`-th move keeps the agent alive.
    pub fn step_is_safe(&self, pos: Pos, steps: u32) -> bool {
        self.world.can_move_to(pos)
            && self.risk_at(pos) < self.config.ai.static_risk_ceiling
            && self.arrival.is_safe(self.hazards.windows_at(pos), steps)
    }

    pub fn query<'g>(&self, goal: Goal<'g>) -> PathQuery<'g> {
        PathQuery::new(self.me.pos, goal).for_agent(self.me.id)
    }

    pub fn find_path(&self, cache: &mut PathCache, query: &PathQuery<'_>) -> Option<Path> {
        cache.find_path(self.world, self.config, &self.hazards, query)
    }

    /// Route to the nearest zero-risk floor cell, ignoring danger gating on the way out.
    pub fn path_to_safety(&self, cache: &mut PathCache) -> Option<Path> {
        let safe = |pos: Pos| self.is_safe_cell(pos);
        self.find_path(cache, &self.query(Goal::Predicate(&safe)).avoiding_danger(false))
    }

    pub fn nearest_opponent(&self) -> Option<&'a Agent> {
        let me = self.me;
        self.world.opponents_of(me.id).min_by_key(|other| manhattan(me.pos, other.pos))
    }

    pub fn attack_chance(&self, base: f64) -> f64 {
        (base * self.personality.aggression()).clamp(0.0, 1.0)
    }

    pub fn stand_still_chance(&self, base: f64) -> f64 {
        (base + self.personality.patience()).clamp(0.0, 1.0)
    }

    /// Probability gate for another bomb while one of ours is still ticking.
    pub fn bomb_throttle(&self, repeat_chance: f64) -> f64 {
        if self.me.active_bombs > 0 { repeat_chance } else { 1.0 }
    }
}
