//! Scene graph for the moonfield demo.
//!
//! # Invariants
//! - Objects are only ever added; the scene has no removal operation.
//! - Every mesh owns its geometry and material.
//! - Texture slots refer to scene-owned textures whose pixels may arrive later.

pub mod camera;
pub mod geometry;
pub mod light;
pub mod material;
pub mod scene;
pub mod texture;

pub use camera::PerspectiveCamera;
pub use geometry::{Geometry, MeshData, SphereGeometry, TorusGeometry, Vertex};
pub use light::{AmbientLight, PointLight, PointLightHelper};
pub use material::{StandardMaterial, StandardMaterialBuilder};
pub use scene::{Mesh, ObjectKind, Scene, SceneEvent, SceneObject};
pub use texture::{Texture, TextureHandle, TextureState};

pub fn crate_info() -> &'static str {
    concat!("moonfield-scene v", env!("CARGO_PKG_VERSION"))
}
