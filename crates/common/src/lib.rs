//! Shared types for the dissolve grid workspace.

pub mod dissolve;
mod types;

pub use dissolve::{CONVERGENCE_EPSILON, DISSOLVE_PARAM, DISSOLVED, VISIBLE, lerp_clamped};
pub use types::{Epoch, MaterialId, ObjectId, TileCoord, Transform};
