use crate::summary::SceneSummary;
use moonfield_scene::{PerspectiveCamera, Scene};
use std::fmt::Write;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene and camera, then produces output. It may
/// keep its own caches but never mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame of the scene from the camera's viewpoint.
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Self::Output;
}

/// Produces a human-readable description of the scene.
///
/// Stars are summarized by count; every other object is listed.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    frames: u64,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> String {
        self.frames += 1;
        let summary = SceneSummary::capture(scene, camera);
        tracing::trace!(frame = self.frames, objects = summary.object_count, "debug text frame");
        let mut out = String::new();

        let _ = writeln!(
            out,
            "=== Scene (frame={}, objects={}) ===",
            self.frames, summary.object_count
        );
        let c = &summary.camera;
        let _ = writeln!(
            out,
            "Camera: pos=({:.2}, {:.2}, {:.2}) target=({:.2}, {:.2}, {:.2}) fov={:.0} aspect={:.3}",
            c.position[0],
            c.position[1],
            c.position[2],
            c.target[0],
            c.target[1],
            c.target[2],
            c.fov,
            c.aspect
        );
        for (name, count) in &summary.counts {
            let _ = writeln!(out, "  {name}: {count}");
        }
        for obj in summary.objects.iter().filter(|o| o.name != "star") {
            let [x, y, z] = obj.position;
            let [rx, ry, rz] = obj.rotation;
            let _ = write!(
                out,
                "  [#{}] {} ({}) pos=({x:.2}, {y:.2}, {z:.2}) rot=({rx:.2}, {ry:.2}, {rz:.2})",
                obj.id, obj.name, obj.kind
            );
            if let Some(tris) = obj.triangles {
                let _ = write!(out, " tris={tris}");
            }
            out.push('\n');
        }
        for tex in &summary.textures {
            let _ = write!(out, "  texture {} {} [{}]", tex.handle, tex.source, tex.status);
            if let Some([w, h]) = tex.size {
                let _ = write!(out, " {w}x{h}");
            }
            out.push('\n');
        }
        let background = match (summary.background, summary.background_ready) {
            (None, _) => "none".to_string(),
            (Some(h), true) => format!("texture {h}"),
            (Some(h), false) => format!("texture {h} (not loaded)"),
        };
        let _ = writeln!(out, "Background: {background}");
        out
    }
}

/// Produces a [`SceneSummary`] per frame.
#[derive(Debug, Default)]
pub struct SummaryRenderer;

impl Renderer for SummaryRenderer {
    type Output = SceneSummary;

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> SceneSummary {
        SceneSummary::capture(scene, camera)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use moonfield_common::{Color, TextureImage, Transform};
    use moonfield_scene::{
        Mesh, ObjectKind, PointLight, SceneObject, SphereGeometry, StandardMaterial,
        TorusGeometry,
    };
    use std::sync::Arc;

    fn sample_scene() -> Scene {
        let mut scene = Scene::new();
        scene.add(SceneObject::new(
            "torus",
            Transform::default(),
            ObjectKind::Mesh(Mesh::new(
                TorusGeometry::new(10.0, 3.0, 16, 100),
                StandardMaterial::with_color(Color::from_hex(0xff6347)),
            )),
        ));
        for i in 0..3 {
            scene.add(SceneObject::new(
                "star",
                Transform::from_position(Vec3::splat(i as f32)),
                ObjectKind::Mesh(Mesh::new(
                    SphereGeometry::new(0.25, 24, 24),
                    StandardMaterial::default(),
                )),
            ));
        }
        scene.add(SceneObject::new(
            "point_light",
            Transform::default(),
            ObjectKind::PointLight(PointLight::new(Color::WHITE, 200.0, 100.0)),
        ));
        scene
    }

    fn camera() -> PerspectiveCamera {
        let mut cam = PerspectiveCamera::new(75.0, 1.5, 0.1, 1000.0);
        cam.set_position(Vec3::new(0.0, 0.0, 30.0));
        cam
    }

    #[test]
    fn debug_renderer_empty_scene() {
        let mut renderer = DebugTextRenderer::new();
        let output = renderer.render(&Scene::new(), &camera());
        assert!(output.contains("frame=1"));
        assert!(output.contains("objects=0"));
        assert!(output.contains("Background: none"));
    }

    #[test]
    fn debug_renderer_lists_objects_and_counts_stars() {
        let mut renderer = DebugTextRenderer::new();
        let output = renderer.render(&sample_scene(), &camera());
        assert!(output.contains("objects=5"));
        assert!(output.contains("star: 3"));
        assert!(output.contains("torus (mesh)"));
        assert!(output.contains("tris=3200"));
        assert!(!output.contains("star (mesh)"));
        renderer.render(&sample_scene(), &camera());
        assert_eq!(renderer.frames_rendered(), 2);
    }

    #[test]
    fn background_shows_load_state() {
        let mut scene = Scene::new();
        let handle = scene.create_texture("space.jpg");
        scene.set_background(handle);
        let mut renderer = DebugTextRenderer::new();
        assert!(renderer.render(&scene, &camera()).contains("(not loaded)"));

        scene.resolve_texture(handle, Arc::new(TextureImage::solid([0, 0, 0, 255])));
        let out = renderer.render(&scene, &camera());
        assert!(out.contains("Background: texture 0\n"));
        assert!(out.contains("[ready] 1x1"));
    }

    #[test]
    fn summary_serializes_to_json() {
        let summary = SummaryRenderer.render(&sample_scene(), &camera());
        assert_eq!(summary.count("star"), 3);
        assert_eq!(summary.count("moon"), 0);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["object_count"], 5);
        assert_eq!(json["camera"]["fov"], 75.0);
        assert_eq!(json["objects"][0]["kind"], "mesh");
    }
}
