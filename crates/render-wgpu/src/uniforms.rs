//! CPU-side layouts of the shader uniform blocks and how the scene fills them.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use moonfield_common::{Color, Transform};
use moonfield_scene::{PerspectiveCamera, Scene, StandardMaterial};

pub const MAX_POINT_LIGHTS: usize = 4;

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct PointLightUniform {
    /// xyz = world position, w = range (0 = unlimited).
    pub position_range: [f32; 4],
    /// rgb = color x intensity, w = decay exponent.
    pub color_decay: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Globals {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    pub ambient: [f32; 4],
    pub light_count: [u32; 4],
    pub lights: [PointLightUniform; MAX_POINT_LIGHTS],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// rgb = emissive tint x intensity.
    pub emissive: [f32; 4],
    /// roughness, metalness, normal scale x, normal scale y.
    pub params: [f32; 4],
}

/// Gather camera and light state for one frame.
///
/// Returns the uniform block and how many point lights did not fit.
pub fn pack_globals(scene: &Scene, camera: &PerspectiveCamera) -> (Globals, usize) {
    let mut lights = [PointLightUniform::default(); MAX_POINT_LIGHTS];
    let mut count = 0;
    let mut dropped = 0;
    for (object, light) in scene.point_lights() {
        if count == MAX_POINT_LIGHTS {
            dropped += 1;
            continue;
        }
        let p = object.transform.position;
        let c = light.color.scaled(light.intensity);
        lights[count] = PointLightUniform {
            position_range: [p.x, p.y, p.z, light.distance],
            color_decay: [c.r, c.g, c.b, light.decay],
        };
        count += 1;
    }

    let ambient = scene
        .ambient_lights()
        .fold(Vec3::ZERO, |acc, light| acc + light.color.to_vec3() * light.intensity);

    let globals = Globals {
        view_proj: camera.view_projection().to_cols_array_2d(),
        camera_position: camera.position.extend(1.0).to_array(),
        ambient: ambient.extend(1.0).to_array(),
        light_count: [count as u32, 0, 0, 0],
        lights,
    };
    (globals, dropped)
}

pub fn pack_object(transform: &Transform, material: &StandardMaterial) -> ObjectUniform {
    let model = transform.matrix();
    let [nx, ny] = material.normal_scale;
    ObjectUniform {
        model: model.to_cols_array_2d(),
        normal_matrix: normal_matrix(model).to_cols_array_2d(),
        color: material.color.to_array4(1.0),
        emissive: material.emissive_radiance().to_array4(1.0),
        params: [material.roughness, material.metalness, nx, ny],
    }
}

/// Uniform for a wireframe marker of `size` at `position`, drawn in `color`.
pub fn pack_helper(position: Vec3, size: f32, color: Color) -> ObjectUniform {
    let model = Mat4::from_translation(position) * Mat4::from_scale(Vec3::splat(size.max(1e-4)));
    ObjectUniform {
        model: model.to_cols_array_2d(),
        normal_matrix: Mat4::IDENTITY.to_cols_array_2d(),
        color: color.to_array4(1.0),
        emissive: [0.0; 4],
        params: [1.0, 0.0, 1.0, 1.0],
    }
}

fn normal_matrix(model: Mat4) -> Mat4 {
    if model.determinant().abs() <= f32::EPSILON {
        return Mat4::IDENTITY;
    }
    model.inverse().transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use moonfield_scene::{AmbientLight, ObjectKind, PointLight, SceneObject};

    fn light_object(x: f32) -> SceneObject {
        SceneObject::new(
            "point_light",
            Transform::from_position(Vec3::new(x, 0.0, 0.0)),
            ObjectKind::PointLight(PointLight::new(Color::rgb(1.0, 0.5, 0.25), 200.0, 100.0)),
        )
    }

    #[test]
    fn uniform_sizes_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<PointLightUniform>(), 32);
        assert_eq!(std::mem::size_of::<Globals>(), 64 + 16 * 3 + 32 * MAX_POINT_LIGHTS);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 64 * 2 + 16 * 3);
    }

    #[test]
    fn globals_pack_lights_and_ambient() {
        let mut scene = Scene::new();
        scene.add(light_object(2.0));
        scene.add(SceneObject::new(
            "ambient_light",
            Transform::default(),
            ObjectKind::AmbientLight(AmbientLight::new(Color::WHITE, 0.5)),
        ));
        let camera = PerspectiveCamera::new(75.0, 1.0, 0.1, 1000.0);

        let (globals, dropped) = pack_globals(&scene, &camera);
        assert_eq!(dropped, 0);
        assert_eq!(globals.light_count[0], 1);
        assert_eq!(globals.lights[0].position_range, [2.0, 0.0, 0.0, 100.0]);
        assert_eq!(globals.lights[0].color_decay, [200.0, 100.0, 50.0, 2.0]);
        assert_eq!(&globals.ambient[..3], &[0.5, 0.5, 0.5]);
    }

    #[test]
    fn extra_point_lights_are_dropped() {
        let mut scene = Scene::new();
        for i in 0..6 {
            scene.add(light_object(i as f32));
        }
        let (globals, dropped) =
            pack_globals(&scene, &PerspectiveCamera::new(75.0, 1.0, 0.1, 1000.0));
        assert_eq!(globals.light_count[0], MAX_POINT_LIGHTS as u32);
        assert_eq!(dropped, 2);
    }

    #[test]
    fn object_uniform_carries_material() {
        let material = StandardMaterial::builder()
            .emissive(Color::rgb(0.5, 0.5, 0.5))
            .emissive_intensity(1.5)
            .roughness(0.5)
            .metalness(0.1)
            .build();
        let u = pack_object(&Transform::default(), &material);
        assert_eq!(u.params, [0.5, 0.1, 1.0, 1.0]);
        assert_eq!(u.emissive, [0.75, 0.75, 0.75, 1.0]);
        assert_eq!(u.normal_matrix, Mat4::IDENTITY.to_cols_array_2d());
    }

    #[test]
    fn normal_matrix_undoes_nonuniform_scale() {
        let t = Transform {
            scale: Vec3::new(2.0, 1.0, 1.0),
            ..Transform::default()
        };
        let u = pack_object(&t, &StandardMaterial::default());
        let n = Mat4::from_cols_array_2d(&u.normal_matrix);
        assert!((n.col(0).x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn helper_is_placed_at_light() {
        let u = pack_helper(Vec3::new(1.0, 2.0, 3.0), 1.0, Color::WHITE);
        let m = Mat4::from_cols_array_2d(&u.model);
        assert_eq!(m.transform_point3(Vec3::ZERO), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(u.color, [1.0, 1.0, 1.0, 1.0]);
    }
}
