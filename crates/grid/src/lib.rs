//! Dissolve grid: tile generation, distance ordering and frame-driven
//! dissolve sequences.
//!
//! # Invariants
//! - A grid has exactly `width * height` tiles, one per coordinate.
//! - Regenerating destroys every previous tile first and advances the epoch.
//! - A fade writes nothing once its epoch is no longer current.
//! - A completed fade leaves its tile exactly on the target value.
//! - At most one sequence runs at a time.

pub mod config;
mod controller;
mod fade;
mod grid;
pub mod ordering;
mod scheduler;
mod sequence;

pub use config::{BusyUntil, ConfigError, DissolveConfig};
pub use controller::{ControllerState, GridController, SequenceError};
pub use fade::FadeTask;
pub use grid::{TileGrid, TileSlot};
pub use scheduler::{Scheduler, Step, Task, TaskContext, TaskId};
pub use sequence::SequenceTask;

pub fn crate_info() -> &'static str {
    "dissolve-grid v0.1.0"
}
