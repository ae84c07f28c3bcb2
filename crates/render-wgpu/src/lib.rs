//! wgpu render backend for the moonfield scene.
//!
//! Draws the scene background, every mesh with the standard lit material,
//! and point light helpers as wireframes. GPU copies of geometry, textures
//! and per-object uniforms are cached across frames.
//!
//! # Invariants
//! - Renderer never mutates the scene.
//! - Textures that have not finished loading render as untextured.

mod gpu;
mod shaders;
mod uniforms;

pub use gpu::{FrameStats, FrameTarget, WgpuRenderer};
pub use uniforms::MAX_POINT_LIGHTS;
