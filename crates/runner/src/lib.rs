//! Scene Runner: builds the moonfield scene once, then advances it frame by
//! frame.
//!
//! # Invariants
//! - All mutable state lives in one [`AppContext`]; hosts pass it to their
//!   event callbacks instead of sharing globals.
//! - Texture loads complete in the background and are applied to the scene
//!   in one serialized step at the start of each frame.
//! - Objects are added during startup only and never removed.

pub mod config;
pub mod context;
pub mod surface;

pub use config::{ConfigError, SceneConfig};
pub use context::{AppContext, FrameReport, LoadDiagnostics};
pub use surface::SurfaceState;

pub fn crate_info() -> &'static str {
    concat!("moonfield-runner v", env!("CARGO_PKG_VERSION"))
}
