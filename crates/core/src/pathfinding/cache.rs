use std::collections::HashMap;

use tracing::trace;

use crate::config::{AiTuning, Config};
use crate::state::World;
use crate::threat::Hazards;
use crate::types::{AgentId, Path, Pos, manhattan};

use super::{PathQuery, find_path_with};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct CacheKey {
    start: Pos,
    goal: Pos,
    avoid_danger: bool,
    include_soft_walls: bool,
    asker: Option<AgentId>,
    /// Snapshot hash, so a changed world never reuses a stale answer.
    world: u64,
}

#[derive(Clone, Debug)]
struct CachedPath {
    path: Option<Path>,
    stored_at_ms: u64,
}

/// Short-lived memo of fixed-goal searches between nearby cells.
#[derive(Clone, Debug)]
pub struct PathCache {
    entries: HashMap<CacheKey, CachedPath>,
    ttl_ms: u64,
    max_distance: u32,
}

impl PathCache {
    pub fn new(tuning: &AiTuning) -> Self {
        Self {
            entries: HashMap::new(),
            ttl_ms: tuning.path_cache_ttl_ms,
            max_distance: tuning.path_cache_max_distance,
        }
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self { entries: HashMap::new(), ttl_ms: 0, max_distance: 0 }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn find_path(
        &mut self,
        world: &World,
        config: &Config,
        hazards: &Hazards,
        query: &PathQuery<'_>,
    ) -> Option<Path> {
        let Some(goal) = query.goal.fixed() else {
            return find_path_with(world, config, hazards, query);
        };
        if self.ttl_ms == 0 || manhattan(query.start, goal) > self.max_distance {
            return find_path_with(world, config, hazards, query);
        }

        let now = world.now_ms;
        let ttl = self.ttl_ms;
        self.entries.retain(|_, entry| now < entry.stored_at_ms + ttl);

        let key = CacheKey {
            start: query.start,
            goal,
            avoid_danger: query.avoid_danger,
            include_soft_walls: query.include_soft_walls,
            asker: query.asker,
            world: world.snapshot_hash(),
        };
        if let Some(hit) = self.entries.get(&key) {
            trace!(start = ?query.start, goal = ?goal, "path cache hit");
            return hit.path.clone();
        }
        let path = find_path_with(world, config, hazards, query);
        self.entries.insert(key, CachedPath { path: path.clone(), stored_at_ms: now });
        path
    }
}
