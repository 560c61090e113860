use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::AgentId;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("arena must be at least 3x3 cells, got {cols}x{rows}")]
    ArenaTooSmall { cols: usize, rows: usize },
    #[error("bomb timer must be positive")]
    ZeroBombTimer,
    #[error("rocket step interval must be positive")]
    ZeroRocketStep,
    #[error("minimum move cooldown {min_ms}ms exceeds the initial cooldown {initial_ms}ms")]
    CooldownFloorAboveInitial { min_ms: u64, initial_ms: u64 },
    #[error("probability `{name}` must lie in [0, 1], got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("scenario grid has no rows")]
    EmptyGrid,
    #[error("grid row {row} has width {found}, expected {expected}")]
    RaggedGrid { row: usize, found: usize, expected: usize },
    #[error("unknown cell glyph {glyph:?} at ({x}, {y})")]
    UnknownGlyph { glyph: char, x: usize, y: usize },
    #[error("{what} at ({x}, {y}) lies outside the grid")]
    OutOfBounds { what: &'static str, x: i32, y: i32 },
    #[error("{what} at ({x}, {y}) is not on a floor cell")]
    NotOnFloor { what: &'static str, x: i32, y: i32 },
    #[error("owner index {index} does not name a scenario agent")]
    UnknownOwner { index: usize },
    #[error("{count} agents requested but the arena has {max} spawn corners")]
    TooManyAgents { count: usize, max: usize },
    #[error("failed to read scenario file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ThinkError {
    #[error("agent {0:?} is not part of the world")]
    UnknownAgent(AgentId),
    #[error("agent {0:?} is dead")]
    DeadAgent(AgentId),
    #[error("think cycle for agent {agent:?} panicked: {message}")]
    Panicked { agent: AgentId, message: String },
}
