use glam::{Mat4, Vec3};

/// Perspective camera looking from `position` toward `target`.
///
/// `fov` is the vertical field of view in degrees. The projection matrix is
/// cached; call [`PerspectiveCamera::update_projection_matrix`] after
/// changing `fov`, `aspect`, `near` or `far`.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov,
            aspect,
            near,
            far,
            position: Vec3::ZERO,
            target: Vec3::NEG_Z,
            up: Vec3::Y,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Move the camera without changing where it looks along its axis.
    pub fn set_position(&mut self, position: Vec3) {
        let forward = self.target - self.position;
        self.position = position;
        self.target = position + forward;
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection =
            Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far);
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Z)
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize_or(Vec3::X)
    }

    /// Camera-space up axis in world coordinates.
    pub fn up_vector(&self) -> Vec3 {
        self.right().cross(self.forward()).normalize_or(Vec3::Y)
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(50.0, 1.0, 0.1, 2000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_is_cached_until_updated() {
        let mut cam = PerspectiveCamera::new(75.0, 1.0, 0.1, 1000.0);
        let before = cam.projection_matrix();
        cam.aspect = 2.0;
        assert_eq!(cam.projection_matrix(), before);
        cam.update_projection_matrix();
        assert_ne!(cam.projection_matrix(), before);
        // x scale halves when the aspect doubles.
        let ratio = before.col(0).x / cam.projection_matrix().col(0).x;
        assert!((ratio - 2.0).abs() < 1e-5);
    }

    #[test]
    fn set_position_keeps_view_axis() {
        let mut cam = PerspectiveCamera::new(75.0, 1.0, 0.1, 1000.0);
        cam.set_position(Vec3::new(0.0, 0.0, 30.0));
        assert_eq!(cam.forward(), Vec3::NEG_Z);
        assert_eq!(cam.target, Vec3::new(0.0, 0.0, 29.0));
    }

    #[test]
    fn origin_projects_to_screen_center() {
        let mut cam = PerspectiveCamera::new(75.0, 16.0 / 9.0, 0.1, 1000.0);
        cam.set_position(Vec3::new(0.0, 0.0, 30.0));
        cam.look_at(Vec3::ZERO);
        let clip = cam.view_projection() * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-6 && ndc.y.abs() < 1e-6);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn basis_is_orthonormal() {
        let mut cam = PerspectiveCamera::default();
        cam.set_position(Vec3::new(3.0, 4.0, 5.0));
        cam.look_at(Vec3::ZERO);
        let (f, r, u) = (cam.forward(), cam.right(), cam.up_vector());
        assert!(f.dot(r).abs() < 1e-5);
        assert!(f.dot(u).abs() < 1e-5);
        assert!((r.length() - 1.0).abs() < 1e-5);
    }
}
