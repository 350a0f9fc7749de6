//! Rendering Adapter: renderer-agnostic interface over the scene.
//!
//! # Invariants
//! - Renderer cannot mutate scene state.
//! - Render output derives only from scene state and view.
//!
//! The text renderer stands in for a GPU backend; the trait is the stable
//! seam a real backend would implement.

mod renderer;

pub use renderer::{DebugTextRenderer, RenderView, Renderer, glyph_for};

pub fn crate_info() -> &'static str {
    "dissolve-render v0.1.0"
}
