//! Damped orbit, pan and dolly camera controls.
//!
//! Input accumulates deltas in spherical coordinates around a target point;
//! [`OrbitControls::update`] applies them to the camera once per frame. With
//! damping enabled only a fraction of the pending motion is applied each
//! update and the remainder decays geometrically, giving inertial motion.

use crate::action::PointerAction;
use glam::Vec3;
use moonfield_scene::PerspectiveCamera;
use std::f32::consts::{PI, TAU};

const EPS: f32 = 0.000_001;

/// Tunables for [`OrbitControls`].
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitSettings {
    pub enabled: bool,
    pub enable_rotate: bool,
    pub enable_pan: bool,
    pub enable_zoom: bool,
    pub enable_damping: bool,
    /// Fraction of the pending motion applied per update, in (0, 1].
    pub damping_factor: f32,
    /// Pan along the camera's up axis instead of the horizontal plane.
    pub screen_space_panning: bool,
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            enable_rotate: true,
            enable_pan: true,
            enable_zoom: true,
            enable_damping: false,
            damping_factor: 0.05,
            screen_space_panning: true,
            rotate_speed: 1.0,
            pan_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct SphericalDelta {
    theta: f32,
    phi: f32,
}

/// Orbit controls bound to one camera.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub settings: OrbitSettings,
    /// Point the camera orbits around and looks at.
    pub target: Vec3,
    spherical_delta: SphericalDelta,
    pan_offset: Vec3,
    scale: f32,
    zoom_changed: bool,
}

impl OrbitControls {
    pub fn new(settings: OrbitSettings) -> Self {
        tracing::debug!(
            damping = settings.enable_damping,
            factor = settings.damping_factor,
            screen_space_panning = settings.screen_space_panning,
            "orbit controls attached"
        );
        Self {
            settings,
            target: Vec3::ZERO,
            spherical_delta: SphericalDelta::default(),
            pan_offset: Vec3::ZERO,
            scale: 1.0,
            zoom_changed: false,
        }
    }

    /// True while damped motion is still decaying.
    pub fn is_settling(&self) -> bool {
        self.spherical_delta.theta.abs() > EPS
            || self.spherical_delta.phi.abs() > EPS
            || self.pan_offset.length_squared() > EPS
    }

    /// Accumulate one pointer action. `viewport_height` is the surface
    /// height in the same pixel units as the action's deltas.
    pub fn handle(&mut self, action: PointerAction, camera: &PerspectiveCamera, viewport_height: f32) {
        if !self.settings.enabled {
            return;
        }
        let height = viewport_height.max(1.0);
        match action {
            PointerAction::Rotate(delta) if self.settings.enable_rotate => {
                let delta = delta * self.settings.rotate_speed;
                self.rotate_left(TAU * delta.x / height);
                self.rotate_up(TAU * delta.y / height);
            }
            PointerAction::Pan(delta) if self.settings.enable_pan => {
                let delta = delta * self.settings.pan_speed;
                let offset = camera.position - self.target;
                let target_distance = offset.length() * (camera.fov.to_radians() / 2.0).tan();
                self.pan_left(2.0 * delta.x * target_distance / height, camera);
                self.pan_up(2.0 * delta.y * target_distance / height, camera);
            }
            PointerAction::Zoom(delta) if self.settings.enable_zoom => {
                let zoom_scale = 0.95_f32.powf(self.settings.zoom_speed);
                if delta < 0.0 {
                    self.scale *= zoom_scale;
                } else if delta > 0.0 {
                    self.scale /= zoom_scale;
                }
                self.zoom_changed = delta != 0.0;
            }
            _ => {}
        }
    }

    fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    fn pan_left(&mut self, distance: f32, camera: &PerspectiveCamera) {
        self.pan_offset += camera.right() * -distance;
    }

    fn pan_up(&mut self, distance: f32, camera: &PerspectiveCamera) {
        let axis = if self.settings.screen_space_panning {
            camera.up_vector()
        } else {
            camera.up.cross(camera.right())
        };
        self.pan_offset += axis * distance;
    }

    /// Apply pending motion to the camera. Returns true if it moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let last_position = camera.position;
        let last_target = self.target;
        let damping = self.settings.enable_damping;
        let factor = self.settings.damping_factor;

        let offset = camera.position - self.target;
        let mut radius = offset.length();
        let (mut theta, mut phi) = if radius == 0.0 {
            (0.0, 0.0)
        } else {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        };

        if damping {
            theta += self.spherical_delta.theta * factor;
            phi += self.spherical_delta.phi * factor;
        } else {
            theta += self.spherical_delta.theta;
            phi += self.spherical_delta.phi;
        }
        phi = phi.clamp(EPS, PI - EPS);

        radius = (radius * self.scale).clamp(self.settings.min_distance, self.settings.max_distance);

        if damping {
            self.target += self.pan_offset * factor;
        } else {
            self.target += self.pan_offset;
        }

        let sin_phi = phi.sin();
        let offset = Vec3::new(
            radius * sin_phi * theta.sin(),
            radius * phi.cos(),
            radius * sin_phi * theta.cos(),
        );
        camera.position = self.target + offset;
        camera.look_at(self.target);

        if damping {
            let retain = 1.0 - factor;
            self.spherical_delta.theta *= retain;
            self.spherical_delta.phi *= retain;
            self.pan_offset *= retain;
        } else {
            self.spherical_delta = SphericalDelta::default();
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        let moved = self.zoom_changed
            || last_position.distance_squared(camera.position) > EPS
            || last_target.distance_squared(self.target) > EPS;
        self.zoom_changed = false;
        moved
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new(OrbitSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn camera_at(z: f32) -> PerspectiveCamera {
        let mut cam = PerspectiveCamera::new(75.0, 1.0, 0.1, 1000.0);
        cam.set_position(Vec3::new(0.0, 0.0, z));
        cam.look_at(Vec3::ZERO);
        cam
    }

    fn damped(factor: f32, screen_space_panning: bool) -> OrbitControls {
        OrbitControls::new(OrbitSettings {
            enable_damping: true,
            damping_factor: factor,
            screen_space_panning,
            ..OrbitSettings::default()
        })
    }

    #[test]
    fn idle_update_keeps_camera_still() {
        let mut cam = camera_at(30.0);
        let mut controls = damped(0.25, false);
        assert!(!controls.update(&mut cam));
        assert!((cam.position - Vec3::new(0.0, 0.0, 30.0)).length() < 1e-4);
    }

    #[test]
    fn damping_spreads_rotation_over_frames() {
        let mut cam = camera_at(30.0);
        let mut controls = damped(0.25, false);
        controls.handle(PointerAction::Rotate(Vec2::new(100.0, 0.0)), &cam, 800.0);

        let expected_total = -TAU * 100.0 / 800.0;
        assert!(controls.update(&mut cam));
        let first = cam.position.x.atan2(cam.position.z);
        assert!((first - expected_total * 0.25).abs() < 1e-4);

        for _ in 0..200 {
            controls.update(&mut cam);
        }
        let theta = cam.position.x.atan2(cam.position.z);
        assert!((theta - expected_total).abs() < 1e-3);
        assert!(!controls.is_settling());
        assert!((cam.position.length() - 30.0).abs() < 1e-3);
    }

    #[test]
    fn undamped_rotation_applies_at_once() {
        let mut cam = camera_at(30.0);
        let mut controls = OrbitControls::default();
        controls.handle(PointerAction::Rotate(Vec2::new(200.0, 0.0)), &cam, 800.0);
        controls.update(&mut cam);
        let theta = cam.position.x.atan2(cam.position.z);
        assert!((theta + TAU * 0.25).abs() < 1e-4);
        assert!(!controls.is_settling());
    }

    #[test]
    fn polar_angle_is_clamped() {
        let mut cam = camera_at(30.0);
        let mut controls = OrbitControls::default();
        controls.handle(PointerAction::Rotate(Vec2::new(0.0, -5000.0)), &cam, 800.0);
        controls.update(&mut cam);
        // Dragging up orbits below the target, stopping short of the pole.
        assert!(cam.position.y < -29.9);
        assert!(cam.position.is_finite());
    }

    #[test]
    fn world_space_pan_keeps_height() {
        let mut cam = camera_at(30.0);
        let mut controls = damped(0.25, false);
        controls.handle(PointerAction::Pan(Vec2::new(0.0, 50.0)), &cam, 800.0);
        for _ in 0..100 {
            controls.update(&mut cam);
        }
        assert!(controls.target.y.abs() < 1e-5);
        assert!(controls.target.z < 0.0);
        assert!(((cam.position - controls.target).length() - 30.0).abs() < 1e-3);
    }

    #[test]
    fn screen_space_pan_moves_up() {
        let mut cam = camera_at(30.0);
        let mut controls = OrbitControls::new(OrbitSettings {
            screen_space_panning: true,
            ..OrbitSettings::default()
        });
        controls.handle(PointerAction::Pan(Vec2::new(0.0, 50.0)), &cam, 800.0);
        controls.update(&mut cam);
        assert!(controls.target.y > 0.0);
        assert!(controls.target.z.abs() < 1e-5);
    }

    #[test]
    fn drag_right_pans_target_left() {
        let mut cam = camera_at(30.0);
        let mut controls = OrbitControls::default();
        controls.handle(PointerAction::Pan(Vec2::new(40.0, 0.0)), &cam, 800.0);
        controls.update(&mut cam);
        assert!(controls.target.x < 0.0);
    }

    #[test]
    fn zoom_respects_distance_limits() {
        let mut cam = camera_at(30.0);
        let mut controls = OrbitControls::new(OrbitSettings {
            min_distance: 20.0,
            max_distance: 40.0,
            ..OrbitSettings::default()
        });
        controls.handle(PointerAction::Zoom(-1.0), &cam, 800.0);
        assert!(controls.update(&mut cam));
        assert!((cam.position.length() - 28.5).abs() < 1e-3);

        for _ in 0..50 {
            controls.handle(PointerAction::Zoom(-1.0), &cam, 800.0);
            controls.update(&mut cam);
        }
        assert!((cam.position.length() - 20.0).abs() < 1e-3);

        for _ in 0..50 {
            controls.handle(PointerAction::Zoom(1.0), &cam, 800.0);
            controls.update(&mut cam);
        }
        assert!((cam.position.length() - 40.0).abs() < 1e-3);
    }

    #[test]
    fn disabled_controls_ignore_input() {
        let mut cam = camera_at(30.0);
        let mut controls = OrbitControls::new(OrbitSettings {
            enabled: false,
            ..OrbitSettings::default()
        });
        controls.handle(PointerAction::Rotate(Vec2::new(100.0, 100.0)), &cam, 800.0);
        assert!(!controls.update(&mut cam));
    }
}
