//! Scene configuration. Every field defaults to the demo's literal values,
//! so running without a config file reproduces the stock scene.

use moonfield_input::OrbitSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Upper bound for any geometry segment count.
pub const MAX_SEGMENTS: u32 = 1024;
/// Upper bound for the star count.
pub const MAX_STARS: u32 = 100_000;

/// Errors from loading or validating a [`SceneConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub torus: TorusConfig,
    pub stars: StarsConfig,
    pub lights: LightsConfig,
    pub moon: MoonConfig,
    pub assets: AssetsConfig,
    pub controls: ControlsConfig,
    pub animation: AnimationConfig,
    pub window: WindowConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Initial distance along +Z.
    pub distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 75.0,
            near: 0.1,
            far: 1000.0,
            distance: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TorusConfig {
    pub radius: f32,
    pub tube: f32,
    pub radial_segments: u32,
    pub tubular_segments: u32,
    /// sRGB hex color.
    pub color: u32,
    /// Radians added to the x and y rotation per reference frame.
    pub rotation_step: f32,
}

impl Default for TorusConfig {
    fn default() -> Self {
        Self {
            radius: 10.0,
            tube: 3.0,
            radial_segments: 16,
            tubular_segments: 100,
            color: 0xff6347,
            rotation_step: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StarsConfig {
    pub count: u32,
    /// Width of the cube stars are scattered in, centered on the origin.
    pub spread: f32,
    pub radius: f32,
    pub segments: u32,
    pub color: u32,
    /// Fixed placement seed. A random seed is drawn (and logged) when unset.
    pub seed: Option<u64>,
}

impl Default for StarsConfig {
    fn default() -> Self {
        Self {
            count: 200,
            spread: 100.0,
            radius: 0.25,
            segments: 24,
            color: 0xffffff,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightsConfig {
    pub point_color: u32,
    pub point_intensity: f32,
    pub point_distance: f32,
    pub point_position: [f32; 3],
    pub ambient_color: u32,
    pub ambient_intensity: f32,
    pub helper_size: f32,
}

impl Default for LightsConfig {
    fn default() -> Self {
        Self {
            point_color: 0xffffff,
            point_intensity: 200.0,
            point_distance: 100.0,
            point_position: [0.0, 0.0, 0.0],
            ambient_color: 0xffffff,
            ambient_intensity: 0.5,
            helper_size: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MoonConfig {
    pub radius: f32,
    pub segments: u32,
    pub position: [f32; 3],
    pub emissive: u32,
    /// Emissive intensity assignments, applied in order. Only the last one
    /// takes effect; extra entries are reported as dead configuration.
    pub emissive_intensity: Vec<f32>,
    pub roughness: f32,
    pub metalness: f32,
}

impl Default for MoonConfig {
    fn default() -> Self {
        Self {
            radius: 3.0,
            segments: 32,
            position: [0.0, 0.0, 0.0],
            emissive: 0xaaaaaa,
            emissive_intensity: vec![0.1, 1.5],
            roughness: 0.5,
            metalness: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    pub root: PathBuf,
    pub background: PathBuf,
    pub moon: PathBuf,
    /// Used as both the moon's color map and its normal map.
    pub detail: PathBuf,
    /// Load the background a second time with logging callbacks.
    pub diagnostic_reload: bool,
    pub workers: usize,
    /// Longest texture side; larger images are scaled down when decoded.
    pub max_texture_dimension: u32,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            background: PathBuf::from("space.jpg"),
            moon: PathBuf::from("moon.jpg"),
            detail: PathBuf::from("image.png"),
            diagnostic_reload: true,
            workers: 2,
            max_texture_dimension: moonfield_assets::DEFAULT_MAX_DIMENSION,
        }
    }
}

impl AssetsConfig {
    pub fn resolve(&self, file: &Path) -> PathBuf {
        self.root.join(file)
    }

    /// The configured files in load order, resolved against the root.
    pub fn files(&self) -> [PathBuf; 3] {
        [
            self.resolve(&self.background),
            self.resolve(&self.moon),
            self.resolve(&self.detail),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlsConfig {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub screen_space_panning: bool,
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    /// Unlimited when unset.
    pub max_distance: Option<f32>,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.25,
            screen_space_panning: false,
            rotate_speed: 1.0,
            pan_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: None,
        }
    }
}

impl ControlsConfig {
    pub fn to_settings(&self) -> OrbitSettings {
        OrbitSettings {
            enable_damping: self.enable_damping,
            damping_factor: self.damping_factor,
            screen_space_panning: self.screen_space_panning,
            rotate_speed: self.rotate_speed,
            pan_speed: self.pan_speed,
            zoom_speed: self.zoom_speed,
            min_distance: self.min_distance,
            max_distance: self.max_distance.unwrap_or(f32::INFINITY),
            ..OrbitSettings::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationConfig {
    /// Scale the per-frame rotation step by elapsed time. When false every
    /// tick advances by exactly one step regardless of frame rate.
    pub time_scaled: bool,
    /// Frame rate at which a time-scaled tick equals one step.
    pub reference_fps: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            time_scaled: true,
            reference_fps: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub title: String,
    /// Initial logical size.
    pub width: u32,
    pub height: u32,
    /// Identifier of the display surface, shown in the title and logs.
    pub surface_id: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "moonfield".into(),
            width: 1280,
            height: 720,
            surface_id: "bg".into(),
        }
    }
}

impl SceneConfig {
    /// Read, parse and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&text)?;
        tracing::debug!(path = %path.display(), "loaded scene config");
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject values that would produce degenerate geometry or unstable
    /// controls.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("camera.fov", self.camera.fov),
            ("camera.near", self.camera.near),
            ("torus.radius", self.torus.radius),
            ("torus.tube", self.torus.tube),
            ("stars.radius", self.stars.radius),
            ("moon.radius", self.moon.radius),
            ("lights.helper_size", self.lights.helper_size),
            ("animation.reference_fps", self.animation.reference_fps),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }
        if self.camera.far <= self.camera.near {
            return Err(ConfigError::Invalid(format!(
                "camera.far ({}) must exceed camera.near ({})",
                self.camera.far, self.camera.near
            )));
        }
        if self.camera.fov >= 180.0 {
            return Err(ConfigError::Invalid("camera.fov must be below 180".into()));
        }
        let counts = [
            ("torus.radial_segments", self.torus.radial_segments, MAX_SEGMENTS),
            ("torus.tubular_segments", self.torus.tubular_segments, MAX_SEGMENTS),
            ("stars.segments", self.stars.segments, MAX_SEGMENTS),
            ("moon.segments", self.moon.segments, MAX_SEGMENTS),
            ("stars.count", self.stars.count, MAX_STARS),
        ];
        for (name, value, max) in counts {
            if value > max {
                return Err(ConfigError::Invalid(format!("{name} must be at most {max}, got {value}")));
            }
        }
        if self.assets.max_texture_dimension == 0 {
            return Err(ConfigError::Invalid("assets.max_texture_dimension must be non-zero".into()));
        }
        if self.stars.spread < 0.0 {
            return Err(ConfigError::Invalid("stars.spread must not be negative".into()));
        }
        let factor = self.controls.damping_factor;
        if !(factor > 0.0 && factor <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "controls.damping_factor must be in (0, 1], got {factor}"
            )));
        }
        if let Some(max) = self.controls.max_distance {
            if max < self.controls.min_distance {
                return Err(ConfigError::Invalid(
                    "controls.max_distance is below controls.min_distance".into(),
                ));
            }
        }
        if self.moon.emissive_intensity.is_empty() {
            return Err(ConfigError::Invalid(
                "moon.emissive_intensity needs at least one value".into(),
            ));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid("window size must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_reproduce_stock_scene() {
        let c = SceneConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.camera.fov, 75.0);
        assert_eq!(c.stars.count, 200);
        assert_eq!(c.torus.color, 0xff6347);
        assert_eq!(c.moon.emissive_intensity, vec![0.1, 1.5]);
        assert_eq!(c.controls.damping_factor, 0.25);
        assert!(!c.controls.screen_space_panning);
        assert_eq!(c.window.surface_id, "bg");
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let c = SceneConfig::from_yaml(
            "stars:\n  count: 10\n  seed: 42\ntorus:\n  color: 0x00ff00\n",
        )
        .unwrap();
        assert_eq!(c.stars.count, 10);
        assert_eq!(c.stars.seed, Some(42));
        assert_eq!(c.stars.radius, 0.25);
        assert_eq!(c.torus.color, 0x00ff00);
        assert_eq!(c.torus.radius, 10.0);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = SceneConfig::from_yaml("torus:\n  radius: 4\n  thickness: 2\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn damping_factor_must_be_a_fraction() {
        let mut c = SceneConfig::default();
        c.controls.damping_factor = 0.0;
        assert!(matches!(c.validate(), Err(ConfigError::Invalid(_))));
        c.controls.damping_factor = 1.5;
        assert!(c.validate().is_err());
        c.controls.damping_factor = 1.0;
        assert!(c.validate().is_ok());
    }

    #[test]
    fn degenerate_geometry_is_rejected() {
        let mut c = SceneConfig::default();
        c.torus.tube = 0.0;
        let err = c.validate().unwrap_err();
        assert!(err.to_string().contains("torus.tube"));

        let mut c = SceneConfig::default();
        c.camera.far = 0.05;
        assert!(c.validate().is_err());
    }

    #[test]
    fn oversized_counts_are_rejected() {
        let err = SceneConfig::from_yaml("torus:\n  tubular_segments: 4294967295\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("torus.tubular_segments"));

        let mut c = SceneConfig::default();
        c.stars.count = MAX_STARS + 1;
        assert!(c.validate().unwrap_err().to_string().contains("stars.count"));

        let mut c = SceneConfig::default();
        c.moon.segments = MAX_SEGMENTS;
        c.stars.count = MAX_STARS;
        assert!(c.validate().is_ok());
    }

    #[test]
    fn texture_limit_must_be_positive() {
        let mut c = SceneConfig::default();
        assert_eq!(c.assets.max_texture_dimension, 8192);
        c.assets.max_texture_dimension = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.yaml");
        std::fs::write(&path, "camera:\n  distance: 45\n").unwrap();
        let c = SceneConfig::load(&path).unwrap();
        assert_eq!(c.camera.distance, 45.0);

        let missing = SceneConfig::load(dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }

    #[test]
    fn yaml_round_trip_preserves_defaults() {
        let text = SceneConfig::default().to_yaml().unwrap();
        assert_eq!(SceneConfig::from_yaml(&text).unwrap(), SceneConfig::default());
    }

    #[test]
    fn controls_map_to_orbit_settings() {
        let s = ControlsConfig::default().to_settings();
        assert!(s.enable_damping);
        assert_eq!(s.damping_factor, 0.25);
        assert!(!s.screen_space_panning);
        assert!(s.max_distance.is_infinite());
    }

    #[test]
    fn asset_files_resolve_against_root() {
        let a = AssetsConfig {
            root: PathBuf::from("/data"),
            ..AssetsConfig::default()
        };
        let [bg, moon, detail] = a.files();
        assert_eq!(bg, PathBuf::from("/data/space.jpg"));
        assert_eq!(moon, PathBuf::from("/data/moon.jpg"));
        assert_eq!(detail, PathBuf::from("/data/image.png"));
    }
}
