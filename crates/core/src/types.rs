use std::fmt;

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct AgentId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub fn offset(self, dx: i32, dy: i32) -> Pos {
        Pos { y: self.y + dy, x: self.x + dx }
    }

    pub fn step(self, dir: Direction) -> Pos {
        let (dx, dy) = dir.delta();
        self.offset(dx, dy)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    Floor,
    SoftWall,
    HardWall,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] =
        [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn from_delta(dx: i32, dy: i32) -> Option<Direction> {
        match (dx.signum(), dy.signum()) {
            (0, -1) => Some(Direction::Up),
            (0, 1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Personality {
    Aggressive,
    Conservative,
    Sneaky,
    #[default]
    Balanced,
}

impl Personality {
    /// Multiplier applied to every attack probability.
    pub fn aggression(self) -> f64 {
        match self {
            Personality::Aggressive => 1.15,
            Personality::Conservative => 0.6,
            Personality::Sneaky => 0.9,
            Personality::Balanced => 1.0,
        }
    }

    /// Extra probability of holding still when nothing better is on offer.
    pub fn patience(self) -> f64 {
        match self {
            Personality::Aggressive => -0.1,
            Personality::Conservative => 0.15,
            Personality::Sneaky => 0.05,
            Personality::Balanced => 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weapon {
    #[default]
    Bomb,
    Landmine,
    Rocket,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    Range,
    Speed,
    BombCount,
    Landmine,
    Rocket,
}

/// Strategy profile of a computer-controlled agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiProfile {
    pub difficulty: Difficulty,
    #[serde(default)]
    pub personality: Personality,
}

/// One move of a path, from the previous cell into `pos`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathStep {
    pub pos: Pos,
    pub dx: i32,
    pub dy: i32,
    pub cell: CellKind,
}

pub type Path = Vec<PathStep>;

/// Target of a path search.
#[derive(Clone, Copy)]
pub enum Goal<'a> {
    Fixed(Pos),
    Predicate(&'a dyn Fn(Pos) -> bool),
}

impl Goal<'_> {
    pub fn is_reached(&self, pos: Pos) -> bool {
        match self {
            Goal::Fixed(goal) => *goal == pos,
            Goal::Predicate(accept) => accept(pos),
        }
    }

    pub fn fixed(&self) -> Option<Pos> {
        match self {
            Goal::Fixed(goal) => Some(*goal),
            Goal::Predicate(_) => None,
        }
    }
}

impl fmt::Debug for Goal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Goal::Fixed(pos) => f.debug_tuple("Fixed").field(pos).finish(),
            Goal::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// What a prospective bomb is expected to hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BombUse {
    Wall,
    Target,
    Any,
}

/// Summary of what one think cycle did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Escape,
    FollowPath,
    Attack(Weapon),
    Chase,
    Reposition,
    Demolish,
    Wander,
    Idle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchOutcome {
    Winner(AgentId),
    Draw,
}

pub fn manhattan(a: Pos, b: Pos) -> u32 {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}

pub fn neighbors(p: Pos) -> [Pos; 4] {
    Direction::ALL.map(|dir| p.step(dir))
}
