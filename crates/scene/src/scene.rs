use crate::geometry::Geometry;
use crate::light::{AmbientLight, PointLight, PointLightHelper};
use crate::material::StandardMaterial;
use crate::texture::{Texture, TextureHandle, TextureState};
use moonfield_common::{ObjectId, TextureImage, Transform};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// A record produced by every structural change to the scene.
///
/// Per-frame transform updates are not logged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SceneEvent {
    Added { id: ObjectId, name: String },
    TextureCreated { handle: TextureHandle, source: PathBuf },
    TextureResolved { handle: TextureHandle, width: u32, height: u32 },
    TextureFailed { handle: TextureHandle, error: String },
    BackgroundSet { handle: TextureHandle },
}

/// Geometry paired with the material that shades it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mesh {
    pub geometry: Geometry,
    pub material: StandardMaterial,
}

impl Mesh {
    pub fn new(geometry: impl Into<Geometry>, material: StandardMaterial) -> Self {
        Self {
            geometry: geometry.into(),
            material,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObjectKind {
    Mesh(Mesh),
    PointLight(PointLight),
    AmbientLight(AmbientLight),
    PointLightHelper(PointLightHelper),
}

impl ObjectKind {
    pub fn label(&self) -> &'static str {
        match self {
            ObjectKind::Mesh(_) => "mesh",
            ObjectKind::PointLight(_) => "point_light",
            ObjectKind::AmbientLight(_) => "ambient_light",
            ObjectKind::PointLightHelper(_) => "point_light_helper",
        }
    }
}

/// Anything placed in the scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneObject {
    pub name: String,
    pub transform: Transform,
    pub kind: ObjectKind,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, transform: Transform, kind: ObjectKind) -> Self {
        Self {
            name: name.into(),
            transform,
            kind,
        }
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            ObjectKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }
}

/// The root container of everything drawn.
///
/// Objects iterate in insertion order (ids are sequential and stored in a
/// `BTreeMap`). There is no removal operation.
#[derive(Debug, Default)]
pub struct Scene {
    objects: BTreeMap<ObjectId, SceneObject>,
    next_id: u64,
    textures: Vec<Texture>,
    background: Option<TextureHandle>,
    event_log: Vec<SceneEvent>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object and return its id.
    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        self.next_id += 1;
        let id = ObjectId(self.next_id);
        self.event_log.push(SceneEvent::Added {
            id,
            name: object.name.clone(),
        });
        self.objects.insert(id, object);
        id
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.objects.iter().map(|(id, obj)| (*id, obj))
    }

    pub fn meshes(&self) -> impl Iterator<Item = (ObjectId, &SceneObject, &Mesh)> {
        self.objects()
            .filter_map(|(id, obj)| obj.as_mesh().map(|mesh| (id, obj, mesh)))
    }

    pub fn point_lights(&self) -> impl Iterator<Item = (&SceneObject, &PointLight)> {
        self.objects.values().filter_map(|obj| match &obj.kind {
            ObjectKind::PointLight(light) => Some((obj, light)),
            _ => None,
        })
    }

    pub fn ambient_lights(&self) -> impl Iterator<Item = &AmbientLight> {
        self.objects.values().filter_map(|obj| match &obj.kind {
            ObjectKind::AmbientLight(light) => Some(light),
            _ => None,
        })
    }

    pub fn helpers(&self) -> impl Iterator<Item = &PointLightHelper> {
        self.objects.values().filter_map(|obj| match &obj.kind {
            ObjectKind::PointLightHelper(helper) => Some(helper),
            _ => None,
        })
    }

    /// Reserve a texture slot whose pixels arrive later.
    pub fn create_texture(&mut self, source: impl Into<PathBuf>) -> TextureHandle {
        let handle = TextureHandle(self.textures.len() as u32);
        let texture = Texture::new(source);
        self.event_log.push(SceneEvent::TextureCreated {
            handle,
            source: texture.source.clone(),
        });
        self.textures.push(texture);
        handle
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&Texture> {
        self.textures.get(handle.0 as usize)
    }

    pub fn textures(&self) -> impl Iterator<Item = (TextureHandle, &Texture)> {
        self.textures
            .iter()
            .enumerate()
            .map(|(i, t)| (TextureHandle(i as u32), t))
    }

    /// Store decoded pixels in a slot. Returns false for an unknown handle.
    pub fn resolve_texture(&mut self, handle: TextureHandle, image: Arc<TextureImage>) -> bool {
        let Some(texture) = self.textures.get_mut(handle.0 as usize) else {
            return false;
        };
        let (width, height) = (image.width, image.height);
        texture.state = TextureState::Ready(image);
        texture.version += 1;
        self.event_log.push(SceneEvent::TextureResolved {
            handle,
            width,
            height,
        });
        true
    }

    /// Mark a slot as permanently failed. Returns false for an unknown handle.
    pub fn fail_texture(&mut self, handle: TextureHandle, error: impl Into<String>) -> bool {
        let Some(texture) = self.textures.get_mut(handle.0 as usize) else {
            return false;
        };
        let error = error.into();
        texture.state = TextureState::Failed(error.clone());
        self.event_log
            .push(SceneEvent::TextureFailed { handle, error });
        true
    }

    pub fn set_background(&mut self, handle: TextureHandle) {
        self.background = Some(handle);
        self.event_log.push(SceneEvent::BackgroundSet { handle });
    }

    pub fn background(&self) -> Option<TextureHandle> {
        self.background
    }

    /// Background pixels, if the slot is set and its load has completed.
    pub fn background_image(&self) -> Option<&Arc<TextureImage>> {
        self.background
            .and_then(|handle| self.texture(handle))
            .and_then(Texture::image)
    }

    pub fn events(&self) -> &[SceneEvent] {
        &self.event_log
    }

    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.event_log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{SphereGeometry, TorusGeometry};
    use moonfield_common::Color;

    fn star() -> SceneObject {
        SceneObject::new(
            "star",
            Transform::default(),
            ObjectKind::Mesh(Mesh::new(
                SphereGeometry::new(0.25, 24, 24),
                StandardMaterial::default(),
            )),
        )
    }

    #[test]
    fn scene_starts_empty() {
        let s = Scene::new();
        assert!(s.is_empty());
        assert!(s.background().is_none());
        assert!(s.events().is_empty());
    }

    #[test]
    fn ids_are_sequential_and_ordered() {
        let mut s = Scene::new();
        let ids: Vec<ObjectId> = (0..10).map(|_| s.add(star())).collect();
        let keys: Vec<ObjectId> = s.objects().map(|(id, _)| id).collect();
        assert_eq!(ids, keys);
        assert_eq!(ids[0], ObjectId(1));
    }

    #[test]
    fn meshes_skip_lights() {
        let mut s = Scene::new();
        s.add(star());
        s.add(SceneObject::new(
            "light",
            Transform::default(),
            ObjectKind::PointLight(PointLight::new(Color::WHITE, 1.0, 0.0)),
        ));
        s.add(SceneObject::new(
            "torus",
            Transform::default(),
            ObjectKind::Mesh(Mesh::new(
                TorusGeometry::new(10.0, 3.0, 16, 100),
                StandardMaterial::default(),
            )),
        ));
        assert_eq!(s.len(), 3);
        assert_eq!(s.meshes().count(), 2);
        assert_eq!(s.point_lights().count(), 1);
    }

    #[test]
    fn texture_resolution_bumps_version() {
        let mut s = Scene::new();
        let handle = s.create_texture("space.jpg");
        assert!(!s.texture(handle).unwrap().is_ready());
        assert!(s.resolve_texture(handle, Arc::new(TextureImage::solid([0, 0, 0, 255]))));
        let tex = s.texture(handle).unwrap();
        assert!(tex.is_ready());
        assert_eq!(tex.version, 1);
    }

    #[test]
    fn background_waits_for_pixels() {
        let mut s = Scene::new();
        let handle = s.create_texture("space.jpg");
        s.set_background(handle);
        assert_eq!(s.background(), Some(handle));
        assert!(s.background_image().is_none());
        s.resolve_texture(handle, Arc::new(TextureImage::solid([9, 9, 9, 255])));
        assert!(s.background_image().is_some());
    }

    #[test]
    fn failed_texture_stays_untextured() {
        let mut s = Scene::new();
        let handle = s.create_texture("missing.png");
        assert!(s.fail_texture(handle, "not found"));
        assert_eq!(s.texture(handle).unwrap().status_label(), "failed");
        assert!(!s.fail_texture(TextureHandle(99), "nope"));
    }

    #[test]
    fn events_are_recorded_and_drained() {
        let mut s = Scene::new();
        s.add(star());
        let handle = s.create_texture("a.png");
        s.set_background(handle);
        assert_eq!(s.events().len(), 3);
        let drained = s.drain_events();
        assert_eq!(drained.len(), 3);
        assert!(s.events().is_empty());
        assert!(matches!(drained[2], SceneEvent::BackgroundSet { .. }));
    }
}
