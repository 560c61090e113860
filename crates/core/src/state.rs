use std::collections::VecDeque;
use std::hash::Hasher;

use slotmap::SlotMap;
use xxhash_rust::xxh3::Xxh3;

use crate::config::ArenaConfig;
use crate::error::ScenarioError;
use crate::types::*;

pub const MOVE_HISTORY_LEN: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<CellKind>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, cells: vec![CellKind::Floor; width * height] }
    }

    /// Parses rows of `#` (hard wall), `*` (soft wall) and `.` (floor).
    pub fn from_ascii(rows: &[&str]) -> Result<Self, ScenarioError> {
        let Some(first) = rows.first() else {
            return Err(ScenarioError::EmptyGrid);
        };
        let width = first.chars().count();
        let mut cells = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(ScenarioError::RaggedGrid { row: y, found, expected: width });
            }
            for (x, glyph) in row.chars().enumerate() {
                cells.push(match glyph {
                    '.' => CellKind::Floor,
                    '*' => CellKind::SoftWall,
                    '#' => CellKind::HardWall,
                    _ => return Err(ScenarioError::UnknownGlyph { glyph, x, y }),
                });
            }
        }
        Ok(Self { width, height: rows.len(), cells })
    }

    /// Out-of-bounds reads are hard walls.
    pub fn cell_at(&self, pos: Pos) -> CellKind {
        match self.index(pos) {
            Some(idx) => self.cells[idx],
            None => CellKind::HardWall,
        }
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && (pos.x as usize) < self.width
            && (pos.y as usize) < self.height
    }

    pub fn is_floor(&self, pos: Pos) -> bool {
        self.cell_at(pos) == CellKind::Floor
    }

    pub fn set_cell(&mut self, pos: Pos, cell: CellKind) {
        if let Some(idx) = self.index(pos) {
            self.cells[idx] = cell;
        }
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).map(move |x| Pos { y: y as i32, x: x as i32 })
        })
    }

    pub fn index(&self, pos: Pos) -> Option<usize> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some((pos.y as usize) * self.width + (pos.x as usize))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bomb {
    pub pos: Pos,
    pub owner: Option<AgentId>,
    pub range: u32,
    /// `None` means the fuse is treated as lit right now.
    pub placed_at_ms: Option<u64>,
}

impl Bomb {
    pub fn detonates_at(&self, now_ms: u64, fuse_ms: u64) -> u64 {
        self.placed_at_ms.unwrap_or(now_ms) + fuse_ms
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Landmine {
    pub pos: Pos,
    pub owner: Option<AgentId>,
    pub armed: bool,
    pub placed_at_ms: Option<u64>,
}

impl Landmine {
    /// Mines without placement data count as still flashing.
    pub fn is_flashing(&self, now_ms: u64, reveal_ms: u64) -> bool {
        self.placed_at_ms.is_none_or(|placed| now_ms < placed + reveal_ms)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Rocket {
    pub pos: Pos,
    pub dir: Direction,
    pub owner: Option<AgentId>,
    pub exploded: bool,
    pub launched_at_ms: u64,
    pub cells_travelled: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PowerUp {
    pub pos: Pos,
    pub kind: PowerUpKind,
}

#[derive(Clone, Debug)]
pub struct Agent {
    pub id: AgentId,
    pub pos: Pos,
    pub facing: Direction,
    pub alive: bool,
    pub explosion_range: u32,
    pub max_bombs: u32,
    pub active_bombs: u32,
    pub move_cooldown_ms: u64,
    pub last_move_ms: Option<u64>,
    pub active_weapon: Weapon,
    pub landmines: u32,
    pub rockets: u32,
    pub move_history: VecDeque<(i32, i32)>,
    /// `None` for a human-controlled agent.
    pub profile: Option<AiProfile>,
}

impl Agent {
    pub fn new(pos: Pos, arena: &ArenaConfig, profile: Option<AiProfile>) -> Self {
        Self {
            id: AgentId::default(),
            pos,
            facing: Direction::Up,
            alive: true,
            explosion_range: arena.initial_explosion_range,
            max_bombs: arena.initial_max_bombs,
            active_bombs: 0,
            move_cooldown_ms: arena.initial_move_cooldown_ms,
            last_move_ms: None,
            active_weapon: Weapon::Bomb,
            landmines: 0,
            rockets: 0,
            move_history: VecDeque::with_capacity(MOVE_HISTORY_LEN),
            profile,
        }
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.profile.map(|profile| profile.difficulty)
    }

    pub fn personality(&self) -> Personality {
        self.profile.map(|profile| profile.personality).unwrap_or_default()
    }

    /// Milliseconds until the movement cooldown expires.
    pub fn cooldown_remaining_ms(&self, now_ms: u64) -> u64 {
        match self.last_move_ms {
            Some(last) => self.move_cooldown_ms.saturating_sub(now_ms.saturating_sub(last)),
            None => 0,
        }
    }

    pub fn record_move(&mut self, dx: i32, dy: i32) {
        if let Some(dir) = Direction::from_delta(dx, dy) {
            self.facing = dir;
        }
        if self.move_history.len() == MOVE_HISTORY_LEN {
            self.move_history.pop_front();
        }
        self.move_history.push_back((dx, dy));
    }

    /// Special weapons replace each other; the active weapon follows the latest pickup.
    pub fn apply_power_up(&mut self, kind: PowerUpKind, arena: &ArenaConfig) {
        match kind {
            PowerUpKind::Range => self.explosion_range += 1,
            PowerUpKind::Speed => {
                self.move_cooldown_ms = self
                    .move_cooldown_ms
                    .saturating_sub(arena.speed_pickup_step_ms)
                    .max(arena.min_move_cooldown_ms);
            }
            PowerUpKind::BombCount => self.max_bombs += 1,
            PowerUpKind::Landmine => {
                self.landmines = arena.landmine_pickup_count;
                self.rockets = 0;
                self.active_weapon = Weapon::Landmine;
            }
            PowerUpKind::Rocket => {
                self.rockets = arena.rocket_pickup_count;
                self.landmines = 0;
                self.active_weapon = Weapon::Rocket;
            }
        }
    }

    /// Resolves the weapon an action would use, reverting depleted specials to bombs.
    pub fn ready_weapon(&mut self) -> Weapon {
        let depleted = match self.active_weapon {
            Weapon::Bomb => false,
            Weapon::Landmine => self.landmines == 0,
            Weapon::Rocket => self.rockets == 0,
        };
        if depleted {
            self.active_weapon = Weapon::Bomb;
        }
        self.active_weapon
    }

    /// The weapon `ready_weapon` would resolve to, without mutating.
    pub fn effective_weapon(&self) -> Weapon {
        match self.active_weapon {
            Weapon::Landmine if self.landmines == 0 => Weapon::Bomb,
            Weapon::Rocket if self.rockets == 0 => Weapon::Bomb,
            weapon => weapon,
        }
    }
}

/// Snapshot of everything the threat model and strategies read.
#[derive(Clone, Debug)]
pub struct World {
    pub grid: Grid,
    pub bombs: Vec<Bomb>,
    pub landmines: Vec<Landmine>,
    pub rockets: Vec<Rocket>,
    pub power_ups: Vec<PowerUp>,
    pub agents: SlotMap<AgentId, Agent>,
    pub now_ms: u64,
    pub started_at_ms: u64,
}

impl World {
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            bombs: Vec::new(),
            landmines: Vec::new(),
            rockets: Vec::new(),
            power_ups: Vec::new(),
            agents: SlotMap::with_key(),
            now_ms: 0,
            started_at_ms: 0,
        }
    }

    pub fn add_agent(&mut self, agent: Agent) -> AgentId {
        let id = self.agents.insert(agent);
        self.agents[id].id = id;
        id
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn alive_agents(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.agents.values().filter(|agent| agent.alive)
    }

    pub fn alive_count(&self) -> usize {
        self.alive_agents().count()
    }

    pub fn opponents_of(&self, id: AgentId) -> impl Iterator<Item = &Agent> + '_ {
        self.alive_agents().filter(move |agent| agent.id != id)
    }

    pub fn bomb_at(&self, pos: Pos) -> Option<&Bomb> {
        self.bombs.iter().find(|bomb| bomb.pos == pos)
    }

    pub fn landmine_at(&self, pos: Pos) -> Option<&Landmine> {
        self.landmines.iter().find(|mine| mine.pos == pos)
    }

    pub fn alive_agent_at(&self, pos: Pos) -> Option<&Agent> {
        self.alive_agents().find(|agent| agent.pos == pos)
    }

    /// Floor without a bomb on it. Agents and mines never block movement.
    pub fn can_move_to(&self, pos: Pos) -> bool {
        self.grid.is_floor(pos) && self.bomb_at(pos).is_none()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.now_ms.saturating_sub(self.started_at_ms)
    }

    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.now_ms);
        hasher.write_u64(self.started_at_ms);
        hasher.write_usize(self.grid.width);
        hasher.write_usize(self.grid.height);
        for cell in &self.grid.cells {
            hasher.write_u8(*cell as u8);
        }
        let owner_code = |owner: Option<AgentId>| {
            owner.map_or(u64::MAX, |id| {
                self.agents.keys().position(|key| key == id).unwrap_or(0) as u64
            })
        };
        for bomb in &self.bombs {
            write_pos(&mut hasher, bomb.pos);
            hasher.write_u64(owner_code(bomb.owner));
            hasher.write_u32(bomb.range);
            hasher.write_u64(bomb.placed_at_ms.unwrap_or(u64::MAX));
        }
        for mine in &self.landmines {
            write_pos(&mut hasher, mine.pos);
            hasher.write_u64(owner_code(mine.owner));
            hasher.write_u8(u8::from(mine.armed));
        }
        for rocket in &self.rockets {
            write_pos(&mut hasher, rocket.pos);
            hasher.write_u8(rocket.dir as u8);
            hasher.write_u8(u8::from(rocket.exploded));
        }
        for power_up in &self.power_ups {
            write_pos(&mut hasher, power_up.pos);
            hasher.write_u8(power_up.kind as u8);
        }
        for agent in self.agents.values() {
            write_pos(&mut hasher, agent.pos);
            hasher.write_u8(u8::from(agent.alive));
            hasher.write_u8(agent.facing as u8);
            hasher.write_u32(agent.explosion_range);
            hasher.write_u32(agent.max_bombs);
            hasher.write_u32(agent.active_bombs);
            hasher.write_u64(agent.move_cooldown_ms);
            hasher.write_u64(agent.last_move_ms.unwrap_or(u64::MAX));
            hasher.write_u8(agent.active_weapon as u8);
            hasher.write_u32(agent.landmines);
            hasher.write_u32(agent.rockets);
            for (dx, dy) in &agent.move_history {
                hasher.write_i32(*dx);
                hasher.write_i32(*dy);
            }
        }
        hasher.finish()
    }
}

fn write_pos(hasher: &mut Xxh3, pos: Pos) {
    hasher.write_i32(pos.x);
    hasher.write_i32(pos.y);
}
