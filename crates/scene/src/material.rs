//! Physically based "standard" material and its builder.

use crate::texture::TextureHandle;
use moonfield_common::Color;
use serde::Serialize;

/// Lit material with optional color, normal and emissive maps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandardMaterial {
    pub color: Color,
    pub map: Option<TextureHandle>,
    pub normal_map: Option<TextureHandle>,
    pub normal_scale: [f32; 2],
    pub emissive: Color,
    pub emissive_intensity: f32,
    pub emissive_map: Option<TextureHandle>,
    pub roughness: f32,
    pub metalness: f32,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            map: None,
            normal_map: None,
            normal_scale: [1.0, 1.0],
            emissive: Color::BLACK,
            emissive_intensity: 1.0,
            emissive_map: None,
            roughness: 1.0,
            metalness: 0.0,
        }
    }
}

impl StandardMaterial {
    pub fn builder() -> StandardMaterialBuilder {
        StandardMaterialBuilder::default()
    }

    pub fn with_color(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    /// Emissive tint already scaled by its intensity.
    pub fn emissive_radiance(&self) -> Color {
        self.emissive.scaled(self.emissive_intensity)
    }

    /// All texture slots in shader binding order: map, normal, emissive.
    pub fn texture_slots(&self) -> [Option<TextureHandle>; 3] {
        [self.map, self.normal_map, self.emissive_map]
    }
}

/// Property-by-property material construction.
///
/// Assigning the same property twice keeps the last value; the builder
/// remembers which properties were overwritten so callers can report them.
#[derive(Debug, Default)]
pub struct StandardMaterialBuilder {
    material: StandardMaterial,
    assigned: Vec<&'static str>,
    overwritten: Vec<&'static str>,
}

impl StandardMaterialBuilder {
    fn touch(&mut self, property: &'static str) {
        if self.assigned.contains(&property) {
            if !self.overwritten.contains(&property) {
                self.overwritten.push(property);
            }
        } else {
            self.assigned.push(property);
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.touch("color");
        self.material.color = color;
        self
    }

    pub fn map(mut self, texture: TextureHandle) -> Self {
        self.touch("map");
        self.material.map = Some(texture);
        self
    }

    pub fn normal_map(mut self, texture: TextureHandle) -> Self {
        self.touch("normal_map");
        self.material.normal_map = Some(texture);
        self
    }

    pub fn emissive(mut self, color: Color) -> Self {
        self.touch("emissive");
        self.material.emissive = color;
        self
    }

    pub fn emissive_intensity(mut self, intensity: f32) -> Self {
        self.touch("emissive_intensity");
        self.material.emissive_intensity = intensity;
        self
    }

    pub fn emissive_map(mut self, texture: TextureHandle) -> Self {
        self.touch("emissive_map");
        self.material.emissive_map = Some(texture);
        self
    }

    pub fn roughness(mut self, roughness: f32) -> Self {
        self.touch("roughness");
        self.material.roughness = roughness;
        self
    }

    pub fn metalness(mut self, metalness: f32) -> Self {
        self.touch("metalness");
        self.material.metalness = metalness;
        self
    }

    /// Properties assigned more than once, in first-overwrite order.
    pub fn overwritten(&self) -> &[&'static str] {
        &self.overwritten
    }

    /// Finish the material, warning once per overwritten property.
    pub fn build(self) -> StandardMaterial {
        for property in &self.overwritten {
            tracing::warn!(
                property,
                "material property assigned more than once; earlier value is dead configuration"
            );
        }
        self.material
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_standard_material() {
        let m = StandardMaterial::default();
        assert_eq!(m.roughness, 1.0);
        assert_eq!(m.metalness, 0.0);
        assert_eq!(m.emissive, Color::BLACK);
        assert_eq!(m.texture_slots(), [None, None, None]);
    }

    #[test]
    fn last_write_wins() {
        let builder = StandardMaterial::builder()
            .emissive_intensity(0.1)
            .roughness(0.5)
            .emissive_intensity(1.5);
        assert_eq!(builder.overwritten(), &["emissive_intensity"]);
        let material = builder.build();
        assert_eq!(material.emissive_intensity, 1.5);
        assert_eq!(material.roughness, 0.5);
    }

    #[test]
    fn single_assignments_are_not_flagged() {
        let builder = StandardMaterial::builder()
            .color(Color::from_hex(0xff6347))
            .metalness(0.1);
        assert!(builder.overwritten().is_empty());
    }

    #[test]
    fn emissive_radiance_scales_tint() {
        let m = StandardMaterial::builder()
            .emissive(Color::rgb(0.5, 0.5, 0.5))
            .emissive_intensity(2.0)
            .build();
        assert_eq!(m.emissive_radiance(), Color::rgb(1.0, 1.0, 1.0));
    }
}
