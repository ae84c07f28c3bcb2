use glam::Vec3;
use moonfield_scene::{ObjectKind, PerspectiveCamera, Scene};
use serde::Serialize;
use std::collections::BTreeMap;

/// Serializable snapshot of what a frame would draw.
#[derive(Debug, Clone, Serialize)]
pub struct SceneSummary {
    pub camera: CameraSummary,
    pub object_count: usize,
    /// Object counts keyed by object name.
    pub counts: BTreeMap<String, usize>,
    pub objects: Vec<ObjectSummary>,
    pub textures: Vec<TextureSummary>,
    pub background: Option<u32>,
    pub background_ready: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CameraSummary {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectSummary {
    pub id: u64,
    pub name: String,
    pub kind: &'static str,
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub triangles: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextureSummary {
    pub handle: u32,
    pub source: String,
    pub status: &'static str,
    pub size: Option<[u32; 2]>,
}

fn array(v: Vec3) -> [f32; 3] {
    v.to_array()
}

impl SceneSummary {
    pub fn capture(scene: &Scene, camera: &PerspectiveCamera) -> Self {
        let mut counts = BTreeMap::new();
        let objects = scene
            .objects()
            .map(|(id, obj)| {
                *counts.entry(obj.name.clone()).or_insert(0) += 1;
                let triangles = match &obj.kind {
                    ObjectKind::Mesh(mesh) => Some(mesh.geometry.build().triangle_count()),
                    _ => None,
                };
                ObjectSummary {
                    id: id.0,
                    name: obj.name.clone(),
                    kind: obj.kind.label(),
                    position: array(obj.transform.position),
                    rotation: array(obj.transform.rotation),
                    triangles,
                }
            })
            .collect::<Vec<_>>();

        let textures = scene
            .textures()
            .map(|(handle, texture)| TextureSummary {
                handle: handle.0,
                source: texture.source.display().to_string(),
                status: texture.status_label(),
                size: texture.image().map(|img| [img.width, img.height]),
            })
            .collect();

        Self {
            camera: CameraSummary {
                position: array(camera.position),
                target: array(camera.target),
                fov: camera.fov,
                aspect: camera.aspect,
                near: camera.near,
                far: camera.far,
            },
            object_count: objects.len(),
            counts,
            objects,
            textures,
            background: scene.background().map(|h| h.0),
            background_ready: scene.background_image().is_some(),
        }
    }

    pub fn count(&self, name: &str) -> usize {
        self.counts.get(name).copied().unwrap_or(0)
    }
}
