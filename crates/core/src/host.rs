//! Reference entity layer that drives the decision core headlessly.
//! This module exists to validate and apply agent requests, run fuses and projectiles,
//! and schedule thinking.
//! It does not own any decision policy or hazard estimate.

mod arena;
mod commands;
mod lifecycle;
mod scheduler;

pub use arena::{Arena, ThinkRecord};
pub use commands::{Command, CommandQueue, apply_commands};
pub use lifecycle::{LifecycleEvent, advance_lifecycle};
pub use scheduler::{ThinkScheduler, think_interval_ms};
