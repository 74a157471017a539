//! Translation from crossterm events to viewer input.
//!
//! The engine works in pixels; a terminal reports cells. Cells are converted
//! with a nominal cell size so the swipe threshold keeps its meaning.

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::viewer::{GestureEvent, Point, ViewerKey};

pub const CELL_WIDTH_PX: f32 = 8.0;
pub const CELL_HEIGHT_PX: f32 = 16.0;

pub fn map_key(key: &KeyEvent) -> Option<ViewerKey> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) || key.modifiers.contains(KeyModifiers::ALT)
    {
        return None;
    }

    match key.code {
        KeyCode::Left => Some(ViewerKey::Left),
        KeyCode::Right => Some(ViewerKey::Right),
        KeyCode::Home => Some(ViewerKey::Home),
        KeyCode::End => Some(ViewerKey::End),
        KeyCode::Esc => Some(ViewerKey::Escape),
        KeyCode::Char(c) => Some(ViewerKey::Char(c)),
        _ => None,
    }
}

pub fn cell_to_point(column: u16, row: u16) -> Point {
    Point::new(
        (f32::from(column) + 0.5) * CELL_WIDTH_PX,
        (f32::from(row) + 0.5) * CELL_HEIGHT_PX,
    )
}

/// Left-button drags become pointer gestures. Wheel and other buttons are
/// handled by the app.
pub fn map_mouse(mouse: &MouseEvent) -> Option<GestureEvent> {
    let point = cell_to_point(mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(GestureEvent::MouseDown(point)),
        MouseEventKind::Drag(MouseButton::Left) => Some(GestureEvent::MouseMove(point)),
        MouseEventKind::Up(MouseButton::Left) => Some(GestureEvent::MouseUp(point)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn maps_viewer_keys() {
        assert_eq!(
            map_key(&key(KeyCode::Left, KeyModifiers::empty())),
            Some(ViewerKey::Left)
        );
        assert_eq!(
            map_key(&key(KeyCode::Char('F'), KeyModifiers::SHIFT)),
            Some(ViewerKey::Char('F'))
        );
        assert_eq!(map_key(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)), None);
        assert_eq!(map_key(&key(KeyCode::Tab, KeyModifiers::empty())), None);
    }

    #[test]
    fn ignores_key_release() {
        let mut release = key(KeyCode::Right, KeyModifiers::empty());
        release.kind = KeyEventKind::Release;
        assert_eq!(map_key(&release), None);
    }

    #[test]
    fn seven_columns_clear_the_default_threshold() {
        let start = cell_to_point(20, 5);
        let short = cell_to_point(14, 5);
        let long = cell_to_point(13, 5);
        assert!(start.x - short.x < 50.0);
        assert!(start.x - long.x > 50.0);
    }

    #[test]
    fn left_button_drag_maps_to_pointer_events() {
        let mouse = MouseEvent {
            kind: MouseEventKind::Drag(MouseButton::Left),
            column: 3,
            row: 1,
            modifiers: KeyModifiers::empty(),
        };
        assert_eq!(
            map_mouse(&mouse),
            Some(GestureEvent::MouseMove(Point::new(28.0, 24.0)))
        );

        let wheel = MouseEvent {
            kind: MouseEventKind::ScrollDown,
            ..mouse
        };
        assert_eq!(map_mouse(&wheel), None);
    }
}
