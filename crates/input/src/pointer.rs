use crate::action::PointerAction;
use glam::Vec2;

/// Pointer buttons the controls react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragMode {
    Rotate,
    Dolly,
    Pan,
}

/// Turns raw cursor and button events into [`PointerAction`]s.
///
/// Left drag rotates, right drag pans, middle drag dollies. The first
/// pressed button owns the drag until it is released.
#[derive(Debug, Default)]
pub struct PointerTracker {
    cursor: Option<Vec2>,
    drag: Option<(PointerButton, DragMode)>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn press(&mut self, button: PointerButton) {
        if self.drag.is_some() {
            return;
        }
        let mode = match button {
            PointerButton::Left => DragMode::Rotate,
            PointerButton::Middle => DragMode::Dolly,
            PointerButton::Right => DragMode::Pan,
        };
        self.drag = Some((button, mode));
    }

    pub fn release(&mut self, button: PointerButton) {
        if matches!(self.drag, Some((owner, _)) if owner == button) {
            self.drag = None;
        }
    }

    /// Record a cursor position; yields an action while a drag is active.
    pub fn move_to(&mut self, position: Vec2) -> Option<PointerAction> {
        let previous = self.cursor.replace(position)?;
        let (_, mode) = self.drag?;
        let delta = position - previous;
        let action = match mode {
            DragMode::Rotate => PointerAction::Rotate(delta),
            DragMode::Pan => PointerAction::Pan(delta),
            DragMode::Dolly => PointerAction::Zoom(delta.y),
        };
        (!action.is_zero()).then_some(action)
    }

    /// The cursor left the surface; the next move starts a fresh delta.
    pub fn leave(&mut self) {
        self.cursor = None;
    }

    pub fn wheel(&mut self, delta_y: f32) -> Option<PointerAction> {
        (delta_y != 0.0).then_some(PointerAction::Zoom(delta_y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moves_without_drag_produce_nothing() {
        let mut t = PointerTracker::new();
        assert_eq!(t.move_to(Vec2::new(10.0, 10.0)), None);
        assert_eq!(t.move_to(Vec2::new(20.0, 10.0)), None);
    }

    #[test]
    fn left_drag_rotates_by_delta() {
        let mut t = PointerTracker::new();
        t.move_to(Vec2::new(10.0, 10.0));
        t.press(PointerButton::Left);
        assert_eq!(
            t.move_to(Vec2::new(15.0, 8.0)),
            Some(PointerAction::Rotate(Vec2::new(5.0, -2.0)))
        );
        t.release(PointerButton::Left);
        assert!(!t.is_dragging());
    }

    #[test]
    fn first_button_owns_the_drag() {
        let mut t = PointerTracker::new();
        t.move_to(Vec2::ZERO);
        t.press(PointerButton::Right);
        t.press(PointerButton::Left);
        t.release(PointerButton::Left);
        assert!(t.is_dragging());
        assert!(matches!(
            t.move_to(Vec2::new(1.0, 1.0)),
            Some(PointerAction::Pan(_))
        ));
    }

    #[test]
    fn middle_drag_dollies_vertically() {
        let mut t = PointerTracker::new();
        t.move_to(Vec2::ZERO);
        t.press(PointerButton::Middle);
        assert_eq!(
            t.move_to(Vec2::new(3.0, 4.0)),
            Some(PointerAction::Zoom(4.0))
        );
    }

    #[test]
    fn leaving_resets_the_delta_origin() {
        let mut t = PointerTracker::new();
        t.move_to(Vec2::ZERO);
        t.press(PointerButton::Left);
        t.leave();
        assert_eq!(t.move_to(Vec2::new(50.0, 50.0)), None);
        assert!(t.move_to(Vec2::new(51.0, 50.0)).is_some());
    }

    #[test]
    fn zero_wheel_is_ignored() {
        let mut t = PointerTracker::new();
        assert_eq!(t.wheel(0.0), None);
        assert_eq!(t.wheel(-1.0), Some(PointerAction::Zoom(-1.0)));
    }
}
