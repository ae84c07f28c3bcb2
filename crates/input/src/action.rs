use glam::Vec2;

/// A camera manipulation produced from pointer input.
///
/// Deltas are in physical pixels; wheel zoom is in scroll units where
/// negative values zoom in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerAction {
    /// Orbit around the target.
    Rotate(Vec2),
    /// Translate camera and target together.
    Pan(Vec2),
    /// Move toward or away from the target.
    Zoom(f32),
}

impl PointerAction {
    pub fn is_zero(&self) -> bool {
        match self {
            PointerAction::Rotate(d) | PointerAction::Pan(d) => *d == Vec2::ZERO,
            PointerAction::Zoom(z) => *z == 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_deltas_are_detected() {
        assert!(PointerAction::Rotate(Vec2::ZERO).is_zero());
        assert!(PointerAction::Zoom(0.0).is_zero());
        assert!(!PointerAction::Pan(Vec2::new(1.0, 0.0)).is_zero());
    }
}
