//! Shared types used across the moonfield crates.

mod color;
mod texture;
mod types;

pub use color::Color;
pub use texture::TextureImage;
pub use types::{ObjectId, Transform};
