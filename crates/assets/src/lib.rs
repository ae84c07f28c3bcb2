//! Texture assets: decoding image files and loading them off the main thread.
//!
//! Files are referenced by path and decoded into tightly packed RGBA8
//! [`TextureImage`](moonfield_common::TextureImage)s. Loads are submitted to
//! a [`TextureLoader`] and collected on the main thread once per frame.

pub mod decode;
pub mod loader;

pub use decode::{DEFAULT_MAX_DIMENSION, decode_texture, decode_texture_within, fitted_size};
pub use loader::{LoadId, LoadResult, TextureLoader};

use std::path::PathBuf;

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("{path} decoded to an empty image")]
    Empty { path: PathBuf },
    #[error("texture loader has shut down")]
    LoaderClosed,
}

pub fn crate_info() -> &'static str {
    concat!("moonfield-assets v", env!("CARGO_PKG_VERSION"))
}
