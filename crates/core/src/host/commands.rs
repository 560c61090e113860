use tracing::trace;

use crate::ai::AgentCommands;
use crate::config::Config;
use crate::state::{Bomb, Landmine, Rocket, World};
use crate::types::{AgentId, Direction, Weapon};

use super::lifecycle::{LifecycleEvent, trigger_landmine};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Move { dx: i32, dy: i32 },
    Action,
}

/// Collects one agent's requests during a think cycle.
///
/// Requests are checked against the snapshot the agent is thinking about and recorded;
/// nothing touches the world until `apply_commands` runs after the cycle. At most one
/// move and one action are accepted per cycle.
pub struct CommandQueue<'w> {
    world: &'w World,
    agent: AgentId,
    commands: Vec<Command>,
}

impl<'w> CommandQueue<'w> {
    pub fn new(world: &'w World, agent: AgentId) -> Self {
        Self { world, agent, commands: Vec::new() }
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<Command> {
        self.commands
    }

    fn has(&self, matches: impl Fn(&Command) -> bool) -> bool {
        self.commands.iter().any(matches)
    }
}

impl AgentCommands for CommandQueue<'_> {
    fn attempt_move(&mut self, dx: i32, dy: i32) -> bool {
        if self.has(|command| matches!(command, Command::Move { .. })) {
            return false;
        }
        let accepted = can_move(self.world, self.agent, dx, dy);
        if accepted {
            self.commands.push(Command::Move { dx, dy });
        }
        accepted
    }

    fn perform_action(&mut self) -> bool {
        if self.has(|command| *command == Command::Action) {
            return false;
        }
        let accepted = can_act(self.world, self.agent);
        if accepted {
            self.commands.push(Command::Action);
        }
        accepted
    }
}

fn can_move(world: &World, id: AgentId, dx: i32, dy: i32) -> bool {
    let Some(agent) = world.agent(id) else {
        return false;
    };
    agent.alive
        && Direction::from_delta(dx, dy).is_some()
        && dx.abs() + dy.abs() == 1
        && agent.cooldown_remaining_ms(world.now_ms) == 0
        && world.can_move_to(agent.pos.offset(dx, dy))
}

fn can_act(world: &World, id: AgentId) -> bool {
    let Some(agent) = world.agent(id) else {
        return false;
    };
    if !agent.alive {
        return false;
    }
    let cell_taken = world.bomb_at(agent.pos).is_some() || world.landmine_at(agent.pos).is_some();
    match agent.effective_weapon() {
        Weapon::Bomb => agent.active_bombs < agent.max_bombs && !cell_taken,
        Weapon::Landmine => !cell_taken,
        Weapon::Rocket => world.grid.in_bounds(agent.pos.step(agent.facing)),
    }
}

/// Applies recorded requests to the live world, re-checking each against it.
pub fn apply_commands(
    world: &mut World,
    config: &Config,
    id: AgentId,
    commands: &[Command],
) -> Vec<LifecycleEvent> {
    let mut events = Vec::new();
    for command in commands {
        let applied = match *command {
            Command::Move { dx, dy } => apply_move(world, config, id, dx, dy, &mut events),
            Command::Action => apply_action(world, id),
        };
        trace!(agent = ?id, ?command, applied, "command");
    }
    events
}

fn apply_move(
    world: &mut World,
    config: &Config,
    id: AgentId,
    dx: i32,
    dy: i32,
    events: &mut Vec<LifecycleEvent>,
) -> bool {
    if !can_move(world, id, dx, dy) {
        return false;
    }
    let now = world.now_ms;
    let Some(agent) = world.agents.get_mut(id) else {
        return false;
    };
    let from = agent.pos;
    let to = from.offset(dx, dy);
    agent.pos = to;
    agent.last_move_ms = Some(now);
    agent.record_move(dx, dy);

    // Own mines arm once their owner steps off them.
    let own_mines = world.landmines.iter_mut().filter(|mine| mine.owner == Some(id));
    for mine in own_mines.filter(|mine| mine.pos == from) {
        mine.armed = true;
    }

    if let Some(index) = world.power_ups.iter().position(|power_up| power_up.pos == to) {
        let power_up = world.power_ups.remove(index);
        world.agents[id].apply_power_up(power_up.kind, &config.arena);
    }

    if let Some(index) = world
        .landmines
        .iter()
        .position(|mine| mine.pos == to && (mine.owner != Some(id) || mine.armed))
    {
        trigger_landmine(world, index, events);
    }
    true
}

fn apply_action(world: &mut World, id: AgentId) -> bool {
    if !can_act(world, id) {
        return false;
    }
    let now = world.now_ms;
    let Some(agent) = world.agents.get_mut(id) else {
        return false;
    };
    let pos = agent.pos;
    match agent.ready_weapon() {
        Weapon::Bomb => {
            agent.active_bombs += 1;
            let range = agent.explosion_range;
            world.bombs.push(Bomb { pos, owner: Some(id), range, placed_at_ms: Some(now) });
        }
        Weapon::Landmine => {
            agent.landmines -= 1;
            agent.ready_weapon();
            let mine = Landmine { pos, owner: Some(id), armed: false, placed_at_ms: Some(now) };
            world.landmines.push(mine);
        }
        Weapon::Rocket => {
            agent.rockets -= 1;
            let dir = agent.facing;
            agent.ready_weapon();
            world.rockets.push(Rocket {
                pos,
                dir,
                owner: Some(id),
                exploded: false,
                launched_at_ms: now,
                cells_travelled: 0,
            });
        }
    }
    true
}
