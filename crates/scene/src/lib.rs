//! Scene: authoritative object state the dissolve grid writes into.
//!
//! # Invariants
//! - All mutations flow through explicit operations and produce events.
//! - Destroying an object destroys its children and frees its materials.
//! - Writes to destroyed objects or materials are no-ops.

mod material;
mod scene;

pub use material::{Material, Prefab};
pub use scene::{MeshRenderer, Scene, SceneEvent, SceneObject};

pub fn crate_info() -> &'static str {
    "dissolve-scene v0.1.0"
}
