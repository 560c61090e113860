use tracing::trace;

use crate::config::Config;
use crate::heap::PriorityQueue;
use crate::state::{Agent, Grid, World};
use crate::threat::{DangerWindow, Field, Hazards};
use crate::types::*;

use super::PathQuery;

/// Estimates when an agent would reach a cell a given number of steps away.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArrivalModel {
    pub depart_ms: u64,
    pub step_ms: u64,
    pub buffer_ms: u64,
}

impl ArrivalModel {
    /// Without an agent the search assumes a full default cooldown is still pending.
    pub fn for_agent(world: &World, config: &Config, agent: Option<&Agent>) -> Self {
        let (step_ms, pending_ms) = match agent {
            Some(agent) => (agent.move_cooldown_ms, agent.cooldown_remaining_ms(world.now_ms)),
            None => {
                let cooldown = config.arena.initial_move_cooldown_ms;
                (cooldown, cooldown)
            }
        };
        let buffer_ms = if world.alive_count() > config.ai.crowded_agent_count {
            config.ai.crowded_safety_buffer_ms
        } else {
            config.ai.safety_buffer_ms
        };
        let depart_ms = world.now_ms + pending_ms + config.ai.reaction_time_ms;
        Self { depart_ms, step_ms, buffer_ms }
    }

    pub fn arrival_ms(&self, steps: u32) -> u64 {
        self.depart_ms + u64::from(steps) * self.step_ms
    }

    /// Whether standing in a cell `steps` moves away avoids every window.
    pub fn is_safe(&self, windows: &[DangerWindow], steps: u32) -> bool {
        let arrival = self.arrival_ms(steps);
        !windows.iter().any(|window| window.overlaps(arrival, self.buffer_ms))
    }
}

#[derive(Clone, Copy, Debug)]
struct Node {
    pos: Pos,
    g: f32,
    steps: u32,
    parent: Option<usize>,
}

#[derive(Clone, Copy, Debug)]
struct OpenEntry {
    f: f32,
    h: f32,
    node: usize,
}

/// Finds a path after assessing hazards from the asker's point of view.
pub fn find_path(world: &World, config: &Config, query: &PathQuery<'_>) -> Option<Path> {
    let hazards = Hazards::assess(world, config, query.asker);
    find_path_with(world, config, &hazards, query)
}

/// Finds a path against precomputed hazards.
///
/// Returns `Some(vec![])` when the start already satisfies the goal and `None` when
/// no admissible route exists.
pub fn find_path_with(
    world: &World,
    config: &Config,
    hazards: &Hazards,
    query: &PathQuery<'_>,
) -> Option<Path> {
    if query.goal.fixed() == Some(query.start) {
        return Some(Vec::new());
    }
    if !world.grid.in_bounds(query.start) {
        return None;
    }

    let ai = &config.ai;
    let asker = query.asker.and_then(|id| world.agent(id));
    let arrival = ArrivalModel::for_agent(world, config, asker);
    let heuristic = |pos: Pos| match query.goal {
        Goal::Fixed(goal) => manhattan(pos, goal) as f32,
        Goal::Predicate(_) => 0.0,
    };

    let (width, height) = (world.grid.width, world.grid.height);
    let mut best_g = Field::filled(width, height, f32::INFINITY);
    let mut closed = Field::filled(width, height, false);
    let mut nodes = vec![Node { pos: query.start, g: 0.0, steps: 0, parent: None }];
    let mut open = PriorityQueue::new(|a: &OpenEntry, b: &OpenEntry| {
        a.f < b.f || (a.f == b.f && a.h < b.h)
    });
    let start_h = heuristic(query.start);
    open.push(OpenEntry { f: start_h, h: start_h, node: 0 });
    if let Some(g) = best_g.get_mut(query.start) {
        *g = 0.0;
    }

    let mut expanded = 0usize;
    while !open.is_empty() {
        let entry = open.pop();
        let current = nodes[entry.node];
        match closed.get_mut(current.pos) {
            Some(done) if !*done => *done = true,
            _ => continue,
        }
        expanded += 1;

        if query.goal.is_reached(current.pos) {
            trace!(expanded, steps = current.steps, "path found");
            return Some(reconstruct(&nodes, entry.node, &world.grid));
        }

        for next in neighbors(current.pos) {
            if closed.value_or(next, true) {
                continue;
            }
            let cell = world.grid.cell_at(next);
            let base_cost = match cell {
                CellKind::HardWall => continue,
                CellKind::SoftWall if !query.include_soft_walls => continue,
                CellKind::SoftWall => ai.soft_wall_step_cost,
                CellKind::Floor => 1.0,
            };
            if world.bomb_at(next).is_some() {
                continue;
            }
            let risk = hazards.risk_at(next);
            let steps = current.steps + 1;
            if query.avoid_danger
                && (risk >= ai.static_risk_ceiling
                    || !arrival.is_safe(hazards.windows_at(next), steps))
            {
                continue;
            }

            let mut cost = base_cost;
            if world
                .alive_agents()
                .any(|agent| agent.pos == next && Some(agent.id) != query.asker)
            {
                cost += ai.occupied_cell_penalty;
            }
            if risk > 0.0 {
                cost += risk * ai.risk_cost_scale;
            }

            let g = current.g + cost;
            if g < best_g.value_or(next, f32::INFINITY) {
                if let Some(best) = best_g.get_mut(next) {
                    *best = g;
                }
                nodes.push(Node { pos: next, g, steps, parent: Some(entry.node) });
                let h = heuristic(next);
                open.push(OpenEntry { f: g + h, h, node: nodes.len() - 1 });
            }
        }
    }
    trace!(expanded, "no path");
    None
}

fn reconstruct(nodes: &[Node], goal: usize, grid: &Grid) -> Path {
    let mut path = Vec::new();
    let mut idx = goal;
    while let Some(parent) = nodes[idx].parent {
        let (from, to) = (nodes[parent].pos, nodes[idx].pos);
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        path.push(PathStep { pos: to, dx, dy, cell: grid.cell_at(to) });
        idx = parent;
    }
    path.reverse();
    path
}
