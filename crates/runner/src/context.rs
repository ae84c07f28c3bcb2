//! The application context: everything the startup sequence builds and the
//! frame loop mutates.

use crate::config::{ConfigError, SceneConfig};
use crate::surface::SurfaceState;
use glam::Vec3;
use moonfield_assets::{AssetError, LoadId, LoadResult, TextureLoader};
use moonfield_common::{Color, ObjectId, TextureImage, Transform};
use moonfield_input::{OrbitControls, PointerAction};
use moonfield_render::Renderer;
use moonfield_scene::{
    AmbientLight, Mesh, ObjectKind, PerspectiveCamera, PointLight, PointLightHelper, Scene,
    SceneObject, SphereGeometry, StandardMaterial, TextureHandle, TorusGeometry,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::cell::Cell;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

/// Runs on the main thread when a load succeeds.
pub type OnLoad = Box<dyn FnOnce(&Arc<TextureImage>)>;
/// Runs on the main thread when a load fails.
pub type OnError = Box<dyn FnOnce(&AssetError)>;

struct PendingLoad {
    slot: TextureHandle,
    on_load: Option<OnLoad>,
    on_error: Option<OnError>,
}

/// Outcome counts of the diagnostic background reload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadDiagnostics {
    pub loaded: u32,
    pub failed: u32,
}

#[derive(Debug, Default, Clone)]
struct DiagnosticCounters {
    loaded: Rc<Cell<u32>>,
    failed: Rc<Cell<u32>>,
}

/// What one call to [`AppContext::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    /// Radians added to the torus x and y rotation this frame.
    pub rotation_step: f32,
    pub camera_moved: bool,
    pub loads_applied: usize,
}

/// Scene, camera, controls, surface and texture loads for one running demo.
pub struct AppContext {
    config: SceneConfig,
    scene: Scene,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    surface: SurfaceState,
    loader: TextureLoader,
    pending: HashMap<LoadId, PendingLoad>,
    /// Loads that could not be queued; reported on the next apply step.
    rejected: Vec<(PendingLoad, AssetError)>,
    diagnostics: DiagnosticCounters,
    torus: ObjectId,
    moon: ObjectId,
    point_light: ObjectId,
    stars: Vec<ObjectId>,
    star_seed: u64,
    frame: u64,
}

impl AppContext {
    /// Run the startup sequence for a viewport of `width` x `height` logical
    /// pixels at the given device pixel ratio.
    ///
    /// Texture loads are only queued here; the scene renders untextured
    /// until they complete.
    pub fn new(
        config: SceneConfig,
        width: u32,
        height: u32,
        pixel_ratio: f64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let surface = SurfaceState::new(pixel_ratio, width, height);

        let cam = &config.camera;
        let mut camera = PerspectiveCamera::new(cam.fov, surface.aspect(), cam.near, cam.far);
        camera.set_position(Vec3::new(0.0, 0.0, cam.distance));

        let mut scene = Scene::new();

        let t = &config.torus;
        let torus = scene.add(SceneObject::new(
            "torus",
            Transform::default(),
            ObjectKind::Mesh(Mesh::new(
                TorusGeometry::new(t.radius, t.tube, t.radial_segments, t.tubular_segments),
                StandardMaterial::with_color(Color::from_hex(t.color)),
            )),
        ));

        let star_seed = config.stars.seed.unwrap_or_else(rand::random);
        let stars = add_stars(&mut scene, &config, star_seed);

        let l = &config.lights;
        let point_light = scene.add(SceneObject::new(
            "point_light",
            Transform::from_position(Vec3::from_array(l.point_position)),
            ObjectKind::PointLight(PointLight::new(
                Color::from_hex(l.point_color),
                l.point_intensity,
                l.point_distance,
            )),
        ));
        scene.add(SceneObject::new(
            "ambient_light",
            Transform::default(),
            ObjectKind::AmbientLight(AmbientLight::new(
                Color::from_hex(l.ambient_color),
                l.ambient_intensity,
            )),
        ));
        scene.add(SceneObject::new(
            "point_light_helper",
            Transform::default(),
            ObjectKind::PointLightHelper(PointLightHelper::new(
                point_light,
                Color::from_hex(l.point_color),
                l.helper_size,
            )),
        ));

        let loader =
            TextureLoader::with_max_dimension(config.assets.workers, config.assets.max_texture_dimension);
        let mut ctx = Self {
            scene,
            camera,
            controls: OrbitControls::new(config.controls.to_settings()),
            surface,
            loader,
            pending: HashMap::new(),
            rejected: Vec::new(),
            diagnostics: DiagnosticCounters::default(),
            torus,
            moon: torus,
            point_light,
            stars,
            star_seed,
            frame: 0,
            config,
        };

        let [background_path, moon_path, detail_path] = ctx.config.assets.files();
        let background = ctx.load_texture(background_path.clone(), None, None);
        ctx.scene.set_background(background);

        if ctx.config.assets.diagnostic_reload {
            ctx.load_diagnostic(background_path);
        }

        let moon_texture = ctx.load_texture(moon_path, None, None);
        let detail_texture = ctx.load_texture(detail_path, None, None);
        ctx.moon = ctx.add_moon(moon_texture, detail_texture);

        // Face the orbit target from the start.
        ctx.controls.update(&mut ctx.camera);

        tracing::info!(
            objects = ctx.scene.len(),
            stars = ctx.stars.len(),
            star_seed,
            surface = %ctx.config.window.surface_id,
            "scene ready"
        );
        Ok(ctx)
    }

    /// Load the background a second time with logging callbacks. Nothing
    /// displays this texture.
    fn load_diagnostic(&mut self, path: PathBuf) {
        let loaded = Rc::clone(&self.diagnostics.loaded);
        let failed = Rc::clone(&self.diagnostics.failed);
        let shown = path.display().to_string();
        self.load_texture(
            path,
            Some(Box::new(move |_| {
                loaded.set(loaded.get() + 1);
                tracing::info!(path = %shown, "diagnostic texture loaded successfully");
            })),
            Some(Box::new(move |err| {
                failed.set(failed.get() + 1);
                tracing::error!(error = %err, "failed to load diagnostic texture");
            })),
        );
    }

    fn add_moon(&mut self, moon_texture: TextureHandle, detail_texture: TextureHandle) -> ObjectId {
        let m = &self.config.moon;
        let (first, rest) = match m.emissive_intensity.split_first() {
            Some((first, rest)) => (*first, rest),
            None => (1.0, &[][..]),
        };
        let mut builder = StandardMaterial::builder()
            .map(detail_texture)
            .normal_map(detail_texture)
            .emissive(Color::from_hex(m.emissive))
            .emissive_intensity(first)
            .roughness(m.roughness)
            .metalness(m.metalness)
            .emissive_map(moon_texture);
        for intensity in rest {
            builder = builder.emissive_intensity(*intensity);
        }
        let material = builder.build();

        self.scene.add(SceneObject::new(
            "moon",
            Transform::from_position(Vec3::from_array(m.position)),
            ObjectKind::Mesh(Mesh::new(
                SphereGeometry::new(m.radius, m.segments, m.segments),
                material,
            )),
        ))
    }

    /// Request a texture. The returned slot is untextured until the load
    /// completes in a later [`apply_completed_loads`](Self::apply_completed_loads).
    pub fn load_texture(
        &mut self,
        path: PathBuf,
        on_load: Option<OnLoad>,
        on_error: Option<OnError>,
    ) -> TextureHandle {
        let slot = self.scene.create_texture(path.clone());
        let pending = PendingLoad {
            slot,
            on_load,
            on_error,
        };
        match self.loader.load(path) {
            Ok(id) => {
                self.pending.insert(id, pending);
            }
            Err(err) => self.rejected.push((pending, err)),
        }
        slot
    }

    /// Apply every finished load to the scene and run its callbacks.
    /// Returns how many loads were applied.
    pub fn apply_completed_loads(&mut self) -> usize {
        let mut applied = 0;
        for (pending, err) in std::mem::take(&mut self.rejected) {
            self.finish_load(pending, Err(err));
            applied += 1;
        }
        for LoadResult { id, path, outcome } in self.loader.drain_completed() {
            let Some(pending) = self.pending.remove(&id) else {
                tracing::warn!(id = id.0, path = %path.display(), "completed load has no pending slot");
                continue;
            };
            self.finish_load(pending, outcome);
            applied += 1;
        }
        applied
    }

    fn finish_load(&mut self, pending: PendingLoad, outcome: Result<Arc<TextureImage>, AssetError>) {
        match outcome {
            Ok(image) => {
                self.scene.resolve_texture(pending.slot, Arc::clone(&image));
                if let Some(callback) = pending.on_load {
                    run_callback(|| callback(&image));
                }
            }
            Err(err) => {
                self.scene.fail_texture(pending.slot, err.to_string());
                match pending.on_error {
                    Some(callback) => run_callback(|| callback(&err)),
                    None => tracing::debug!(slot = pending.slot.0, error = %err, "texture left unset"),
                }
            }
        }
    }

    /// Block until outstanding loads finish (or `timeout` passes), then
    /// apply them. Returns true if nothing is left pending.
    pub fn wait_for_loads(&mut self, timeout: Duration) -> bool {
        let idle = self.loader.wait_idle(timeout);
        self.apply_completed_loads();
        idle && self.pending.is_empty()
    }

    pub fn pending_loads(&self) -> usize {
        self.pending.len() + self.rejected.len()
    }

    /// Advance one frame: apply finished loads, rotate the torus, integrate
    /// the controls' damping.
    pub fn tick(&mut self, elapsed: Duration) -> FrameReport {
        let loads_applied = self.apply_completed_loads();

        let anim = &self.config.animation;
        let frames = if anim.time_scaled {
            elapsed.as_secs_f32() * anim.reference_fps
        } else {
            1.0
        };
        let rotation_step = self.config.torus.rotation_step * frames;
        if let Some(torus) = self.scene.get_mut(self.torus) {
            torus.transform.rotation.x += rotation_step;
            torus.transform.rotation.y += rotation_step;
        }

        let camera_moved = self.controls.update(&mut self.camera);
        self.frame += 1;

        FrameReport {
            frame: self.frame,
            rotation_step,
            camera_moved,
            loads_applied,
        }
    }

    /// Tick, then render once from the camera.
    pub fn frame<R: Renderer>(&mut self, elapsed: Duration, renderer: &mut R) -> (FrameReport, R::Output) {
        let report = self.tick(elapsed);
        let output = renderer.render(&self.scene, &self.camera);
        (report, output)
    }

    /// Apply a new logical viewport size. Zero-area sizes are ignored.
    /// Returns false when the size was ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            tracing::debug!(width, height, "ignoring zero-area resize");
            return false;
        }
        self.surface.set_size(width, height);
        self.camera.aspect = self.surface.aspect();
        self.camera.update_projection_matrix();
        true
    }

    pub fn set_pixel_ratio(&mut self, ratio: f64) {
        self.surface.set_pixel_ratio(ratio);
    }

    pub fn handle_pointer(&mut self, action: PointerAction) {
        let (_, height) = self.surface.drawing_buffer_size();
        self.controls.handle(action, &self.camera, height as f32);
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn surface(&self) -> &SurfaceState {
        &self.surface
    }

    pub fn torus(&self) -> ObjectId {
        self.torus
    }

    pub fn moon(&self) -> ObjectId {
        self.moon
    }

    pub fn point_light(&self) -> ObjectId {
        self.point_light
    }

    pub fn stars(&self) -> &[ObjectId] {
        &self.stars
    }

    pub fn star_seed(&self) -> u64 {
        self.star_seed
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn diagnostics(&self) -> LoadDiagnostics {
        LoadDiagnostics {
            loaded: self.diagnostics.loaded.get(),
            failed: self.diagnostics.failed.get(),
        }
    }
}

/// Scatter stars uniformly in a cube of side `spread` centered on the origin.
fn add_stars(scene: &mut Scene, config: &SceneConfig, seed: u64) -> Vec<ObjectId> {
    let s = &config.stars;
    let half = s.spread / 2.0;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut coord = || {
        if half > 0.0 {
            rng.random_range(-half..half)
        } else {
            0.0
        }
    };

    (0..s.count)
        .map(|_| {
            let position = Vec3::new(coord(), coord(), coord());
            scene.add(SceneObject::new(
                "star",
                Transform::from_position(position),
                ObjectKind::Mesh(Mesh::new(
                    SphereGeometry::new(s.radius, s.segments, s.segments),
                    StandardMaterial::with_color(Color::from_hex(s.color)),
                )),
            ))
        })
        .collect()
}

/// Run a load callback, containing any panic it raises.
fn run_callback(callback: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(callback)).is_err() {
        tracing::error!("texture load callback panicked");
    }
}
