use std::collections::VecDeque;

use tracing::debug;

use crate::blast::{BlastCell, compute_blast_cells};
use crate::config::Config;
use crate::state::World;
use crate::types::{AgentId, CellKind, Pos};

/// Something the lifecycle did to the world this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleEvent {
    BombDetonated { pos: Pos, owner: Option<AgentId> },
    RocketExploded { pos: Pos, owner: Option<AgentId> },
    LandmineTriggered { pos: Pos, owner: Option<AgentId> },
    WallDestroyed { pos: Pos },
    AgentKilled { agent: AgentId, pos: Pos },
}

/// Moves rockets and sets off every bomb whose fuse has burnt down at `world.now_ms`.
///
/// Bombs without a placement time never detonate here; hosts stamp them on entry.
pub fn advance_lifecycle(world: &mut World, config: &Config) -> Vec<LifecycleEvent> {
    let mut events = Vec::new();
    fly_rockets(world, config, &mut events);

    let now = world.now_ms;
    let fuse = config.arena.bomb_timer_ms;
    while let Some(index) = world
        .bombs
        .iter()
        .position(|bomb| bomb.placed_at_ms.is_some() && bomb.detonates_at(now, fuse) <= now)
    {
        let bomb = world.bombs.remove(index);
        release_bomb(world, bomb.owner);
        events.push(LifecycleEvent::BombDetonated { pos: bomb.pos, owner: bomb.owner });
        explode(world, bomb.pos, bomb.range, &mut events);
    }
    events
}

/// Removes the mine at `index` and burns its cell.
pub(crate) fn trigger_landmine(world: &mut World, index: usize, events: &mut Vec<LifecycleEvent>) {
    let mine = world.landmines.remove(index);
    events.push(LifecycleEvent::LandmineTriggered { pos: mine.pos, owner: mine.owner });
    explode(world, mine.pos, 0, events);
}

fn fly_rockets(world: &mut World, config: &Config, events: &mut Vec<LifecycleEvent>) {
    let step_ms = config.arena.rocket_step_ms;
    for index in 0..world.rockets.len() {
        loop {
            let rocket = &world.rockets[index];
            let next_step_at =
                rocket.launched_at_ms + u64::from(rocket.cells_travelled + 1) * step_ms;
            if rocket.exploded || next_step_at > world.now_ms {
                break;
            }
            let owner = rocket.owner;
            let next = rocket.pos.step(rocket.dir);
            let blocked = match world.grid.cell_at(next) {
                CellKind::HardWall | CellKind::SoftWall => true,
                CellKind::Floor => {
                    world.bomb_at(next).is_some()
                        || world.landmine_at(next).is_some()
                        || world.alive_agent_at(next).is_some()
                }
            };
            if !blocked {
                let rocket = &mut world.rockets[index];
                rocket.pos = next;
                rocket.cells_travelled += 1;
                continue;
            }

            world.rockets[index].exploded = true;
            // Impacts touching the shooter, diagonals included, only burn the impact cell.
            let near_owner = owner.and_then(|id| world.agent(id)).is_some_and(|shooter| {
                shooter.alive
                    && shooter.pos.x.abs_diff(next.x) <= 1
                    && shooter.pos.y.abs_diff(next.y) <= 1
            });
            events.push(LifecycleEvent::RocketExploded { pos: next, owner });
            explode(world, next, if near_owner { 0 } else { 1 }, events);
        }
    }
    world.rockets.retain(|rocket| !rocket.exploded);
}

/// Burns a blast and every bomb it reaches, breadth first.
fn explode(world: &mut World, origin: Pos, range: u32, events: &mut Vec<LifecycleEvent>) {
    let mut queue = VecDeque::from([(origin, range)]);
    while let Some((origin, range)) = queue.pop_front() {
        let cells = compute_blast_cells(origin, range, &world.grid);
        for cell in &cells {
            if let Some(index) = world.bombs.iter().position(|bomb| bomb.pos == cell.pos) {
                let bomb = world.bombs.remove(index);
                release_bomb(world, bomb.owner);
                events.push(LifecycleEvent::BombDetonated { pos: bomb.pos, owner: bomb.owner });
                queue.push_back((bomb.pos, bomb.range));
            }
        }
        burn(world, &cells, events);
    }
}

fn burn(world: &mut World, cells: &[BlastCell], events: &mut Vec<LifecycleEvent>) {
    for cell in cells {
        if world.grid.cell_at(cell.pos) == CellKind::SoftWall {
            world.grid.set_cell(cell.pos, CellKind::Floor);
            events.push(LifecycleEvent::WallDestroyed { pos: cell.pos });
        }
        let caught = world.agents.values_mut().filter(|agent| agent.alive && agent.pos == cell.pos);
        for agent in caught {
            agent.alive = false;
            debug!(agent = ?agent.id, pos = ?cell.pos, "agent caught in blast");
            events.push(LifecycleEvent::AgentKilled { agent: agent.id, pos: cell.pos });
        }
        world.landmines.retain(|mine| mine.pos != cell.pos);
    }
}

fn release_bomb(world: &mut World, owner: Option<AgentId>) {
    if let Some(agent) = owner.and_then(|id| world.agents.get_mut(id)) {
        agent.active_bombs = agent.active_bombs.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArenaConfig;
    use crate::state::{Agent, Bomb, Grid, Landmine, Rocket};
    use crate::types::Direction;

    fn world(rows: &[&str]) -> World {
        let mut world = World::new(Grid::from_ascii(rows).expect("grid"));
        world.now_ms = 10_000;
        world
    }

    fn at(x: i32, y: i32) -> Pos {
        Pos { y, x }
    }

    #[test]
    fn bomb_detonates_when_its_fuse_runs_out() {
        let config = Config::default();
        let mut world = world(&[".....", "..*..", "....."]);
        let me = world.add_agent(Agent::new(at(0, 0), &ArenaConfig::default(), None));
        world.agents[me].active_bombs = 1;
        world.bombs.push(Bomb {
            pos: at(2, 2),
            owner: Some(me),
            range: 1,
            placed_at_ms: Some(7_001),
        });

        assert!(advance_lifecycle(&mut world, &config).is_empty(), "one millisecond left");
        world.now_ms = 10_001;
        let events = advance_lifecycle(&mut world, &config);
        assert!(events.contains(&LifecycleEvent::BombDetonated { pos: at(2, 2), owner: Some(me) }));
        assert!(events.contains(&LifecycleEvent::WallDestroyed { pos: at(2, 1) }));
        assert_eq!(world.grid.cell_at(at(2, 1)), CellKind::Floor);
        assert!(world.bombs.is_empty());
        assert_eq!(world.agents[me].active_bombs, 0);
    }

    #[test]
    fn untimed_bombs_wait_for_a_placement_time() {
        let config = Config::default();
        let mut world = world(&["..."]);
        world.bombs.push(Bomb { pos: at(1, 0), owner: None, range: 1, placed_at_ms: None });
        world.now_ms = u64::MAX / 2;
        assert!(advance_lifecycle(&mut world, &config).is_empty());
    }

    #[test]
    fn blasts_chain_into_other_bombs_and_kill_agents() {
        let config = Config::default();
        let mut world = world(&["#######", "#.....#", "#######"]);
        let victim = world.add_agent(Agent::new(at(5, 1), &ArenaConfig::default(), None));
        world.bombs.push(Bomb { pos: at(1, 1), owner: None, range: 2, placed_at_ms: Some(7_000) });
        world.bombs.push(Bomb { pos: at(3, 1), owner: None, range: 2, placed_at_ms: Some(9_999) });
        let events = advance_lifecycle(&mut world, &config);
        assert!(events.contains(&LifecycleEvent::BombDetonated { pos: at(3, 1), owner: None }));
        assert!(events.contains(&LifecycleEvent::AgentKilled { agent: victim, pos: at(5, 1) }));
        assert!(!world.agents[victim].alive);
        assert!(world.bombs.is_empty());
    }

    #[test]
    fn blasts_clear_landmines() {
        let config = Config::default();
        let mut world = world(&["....."]);
        world.bombs.push(Bomb { pos: at(0, 0), owner: None, range: 1, placed_at_ms: Some(7_000) });
        world.landmines.push(Landmine {
            pos: at(1, 0),
            owner: None,
            armed: true,
            placed_at_ms: Some(0),
        });
        world.landmines.push(Landmine {
            pos: at(3, 0),
            owner: None,
            armed: true,
            placed_at_ms: Some(0),
        });
        advance_lifecycle(&mut world, &config);
        assert_eq!(world.landmines.len(), 1);
        assert_eq!(world.landmines[0].pos, at(3, 0));
    }

    #[test]
    fn rocket_flies_one_cell_per_step_and_hits_the_first_agent() {
        let config = Config::default();
        let mut world = world(&["........", "........", "........"]);
        let arena = ArenaConfig::default();
        let shooter = world.add_agent(Agent::new(at(0, 1), &arena, None));
        let target = world.add_agent(Agent::new(at(5, 1), &arena, None));
        let bystander = world.add_agent(Agent::new(at(4, 0), &arena, None));
        world.rockets.push(Rocket {
            pos: at(0, 1),
            dir: Direction::Right,
            owner: Some(shooter),
            exploded: false,
            launched_at_ms: 10_000,
            cells_travelled: 0,
        });

        world.now_ms = 10_300;
        assert!(advance_lifecycle(&mut world, &config).is_empty());
        assert_eq!(world.rockets[0].pos, at(3, 1));

        world.now_ms = 10_500;
        let events = advance_lifecycle(&mut world, &config);
        let impact = LifecycleEvent::RocketExploded { pos: at(5, 1), owner: Some(shooter) };
        assert!(events.contains(&impact));
        assert!(!world.agents[target].alive);
        assert!(world.agents[bystander].alive, "cross blast does not reach diagonals");
        assert!(world.agents[shooter].alive);
        assert!(world.rockets.is_empty());
    }

    #[test]
    fn point_blank_rocket_spares_its_shooter() {
        let config = Config::default();
        let mut world = world(&["...*."]);
        let shooter = world.add_agent(Agent::new(at(2, 0), &ArenaConfig::default(), None));
        world.rockets.push(Rocket {
            pos: at(2, 0),
            dir: Direction::Right,
            owner: Some(shooter),
            exploded: false,
            launched_at_ms: 10_000,
            cells_travelled: 0,
        });
        world.now_ms = 10_100;
        let events = advance_lifecycle(&mut world, &config);
        assert!(events.contains(&LifecycleEvent::WallDestroyed { pos: at(3, 0) }));
        assert!(world.agents[shooter].alive);
    }

    #[test]
    fn triggered_mine_burns_only_its_cell() {
        let mut world = world(&["..."]);
        let arena = ArenaConfig::default();
        let victim = world.add_agent(Agent::new(at(1, 0), &arena, None));
        let neighbour = world.add_agent(Agent::new(at(2, 0), &arena, None));
        world.landmines.push(Landmine {
            pos: at(1, 0),
            owner: None,
            armed: true,
            placed_at_ms: Some(0),
        });
        let mut events = Vec::new();
        trigger_landmine(&mut world, 0, &mut events);
        assert!(!world.agents[victim].alive);
        assert!(world.agents[neighbour].alive);
        assert!(world.landmines.is_empty());
    }
}
