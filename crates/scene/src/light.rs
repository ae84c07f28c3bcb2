use crate::geometry::SphereGeometry;
use moonfield_common::{Color, ObjectId};
use serde::Serialize;

/// Omnidirectional light with physical inverse-square falloff.
///
/// `distance` is the range where the contribution reaches zero; 0 means
/// unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointLight {
    pub color: Color,
    pub intensity: f32,
    pub distance: f32,
    pub decay: f32,
}

impl PointLight {
    pub fn new(color: Color, intensity: f32, distance: f32) -> Self {
        Self {
            color,
            intensity,
            distance,
            decay: 2.0,
        }
    }

    /// Attenuation factor at `d` units from the light.
    pub fn attenuation(&self, d: f32) -> f32 {
        let mut falloff = 1.0 / d.powf(self.decay).max(0.01);
        if self.distance > 0.0 {
            let ratio = d / self.distance;
            let window = (1.0 - ratio.powi(4)).clamp(0.0, 1.0);
            falloff *= window * window;
        }
        falloff
    }
}

/// Uniform fill light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

impl AmbientLight {
    pub fn new(color: Color, intensity: f32) -> Self {
        Self { color, intensity }
    }
}

/// Wireframe marker drawn at a point light's position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointLightHelper {
    pub light: ObjectId,
    pub size: f32,
    pub color: Color,
}

impl PointLightHelper {
    pub fn new(light: ObjectId, light_color: Color, size: f32) -> Self {
        Self {
            light,
            size,
            color: light_color,
        }
    }

    /// The marker shape: a coarse sphere of the helper's size.
    pub fn geometry(&self) -> SphereGeometry {
        SphereGeometry::new(self.size, 4, 2)
    }
}
