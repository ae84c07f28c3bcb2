//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers read the scene and camera; they never mutate scene truth.
//! - Every renderer draws the same scene the same way from the same camera.
//!
//! The GPU backend lives in `moonfield-render-wgpu`. The renderers here
//! produce text or structured summaries for tooling and tests.

mod renderer;
mod summary;

pub use renderer::{DebugTextRenderer, Renderer, SummaryRenderer};
pub use summary::{CameraSummary, ObjectSummary, SceneSummary, TextureSummary};

pub fn crate_info() -> &'static str {
    concat!("moonfield-render v", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
