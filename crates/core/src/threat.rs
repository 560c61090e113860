//! Per-tick hazard and opportunity fields derived from a world snapshot.
//! This module exists so pathfinding and strategies share one reading of bombs, mines and rockets.
//! It does not own any decision about what an agent should do with these fields.

mod chokepoints;
mod field;
mod influence;
mod risk;
mod timeline;

pub use chokepoints::{find_chokepoints, is_chokepoint};
pub use field::Field;
pub use influence::{InfluenceMap, influence_map};
pub use risk::{DangerMap, RiskMap, bomb_risk_weight, danger_map, is_landmine_visible, risk_map};
pub use timeline::{DangerWindow, TimeDangerMap, time_danger_map};

pub use crate::types::manhattan as distance;

use crate::config::Config;
use crate::state::World;
use crate::types::{AgentId, Pos};

/// Risk and time-danger maps computed together for one viewer.
#[derive(Clone, Debug)]
pub struct Hazards {
    pub risk: RiskMap,
    pub timeline: TimeDangerMap,
}

impl Hazards {
    pub fn assess(world: &World, config: &Config, viewer: Option<AgentId>) -> Self {
        Self { risk: risk_map(world, config, viewer), timeline: time_danger_map(world, config) }
    }

    pub fn risk_at(&self, pos: Pos) -> f32 {
        self.risk.risk_at(pos)
    }

    pub fn windows_at(&self, pos: Pos) -> &[DangerWindow] {
        self.timeline.get(pos).map_or(&[], Vec::as_slice)
    }
}
