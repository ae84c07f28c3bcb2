/// Output size of the rendering surface.
///
/// `width` and `height` are the logical viewport size; the drawing buffer is
/// that size times the pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceState {
    pixel_ratio: f64,
    width: u32,
    height: u32,
}

impl SurfaceState {
    pub fn new(pixel_ratio: f64, width: u32, height: u32) -> Self {
        Self {
            pixel_ratio: sanitize_ratio(pixel_ratio),
            width,
            height,
        }
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    pub fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = sanitize_ratio(ratio);
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Viewport width divided by height.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Physical pixel size of the drawing buffer.
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        let scale = |v: u32| ((v as f64) * self.pixel_ratio).floor().max(1.0) as u32;
        (scale(self.width), scale(self.height))
    }
}

fn sanitize_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() && ratio > 0.0 {
        ratio
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drawing_buffer_scales_by_pixel_ratio() {
        let s = SurfaceState::new(2.0, 800, 600);
        assert_eq!(s.drawing_buffer_size(), (1600, 1200));
        assert!((s.aspect() - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn fractional_ratio_floors() {
        let s = SurfaceState::new(1.25, 1001, 3);
        assert_eq!(s.drawing_buffer_size(), (1251, 3));
    }

    #[test]
    fn invalid_ratio_falls_back_to_one() {
        let mut s = SurfaceState::new(0.0, 10, 10);
        assert_eq!(s.pixel_ratio(), 1.0);
        s.set_pixel_ratio(f64::NAN);
        assert_eq!(s.pixel_ratio(), 1.0);
    }
}
