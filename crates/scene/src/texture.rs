use moonfield_common::TextureImage;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Handle to a scene-owned texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TextureHandle(pub u32);

/// Load state of a texture's pixels.
#[derive(Debug, Clone)]
pub enum TextureState {
    /// Requested, pixels not yet available. Renders untextured.
    Pending,
    Ready(Arc<TextureImage>),
    /// The load failed; the slot stays untextured for the process lifetime.
    Failed(String),
}

/// A texture slot: where its pixels come from and whether they arrived.
#[derive(Debug, Clone)]
pub struct Texture {
    pub source: PathBuf,
    pub state: TextureState,
    /// Bumped every time the pixels change, so GPU copies can go stale.
    pub version: u32,
}

impl Texture {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            state: TextureState::Pending,
            version: 0,
        }
    }

    pub fn image(&self) -> Option<&Arc<TextureImage>> {
        match &self.state {
            TextureState::Ready(image) => Some(image),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, TextureState::Ready(_))
    }

    pub fn status_label(&self) -> &'static str {
        match self.state {
            TextureState::Pending => "pending",
            TextureState::Ready(_) => "ready",
            TextureState::Failed(_) => "failed",
        }
    }
}
