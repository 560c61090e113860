pub mod ai;
pub mod blast;
pub mod config;
pub mod error;
pub mod heap;
pub mod host;
pub mod pathfinding;
pub mod random;
pub mod scenario;
pub mod state;
pub mod threat;
pub mod types;

pub use ai::{AgentCommands, Brain, think, think_isolated};
pub use config::{AiTuning, ArenaConfig, Config};
pub use error::{ConfigError, ScenarioError, ThinkError};
pub use host::{Arena, LifecycleEvent};
pub use pathfinding::{PathCache, PathQuery, find_path};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
pub use scenario::{LoadedScenario, Scenario, classic_arena, load_scenario};
pub use state::{Agent, Bomb, Grid, Landmine, PowerUp, Rocket, World};
pub use threat::Hazards;
pub use types::*;
