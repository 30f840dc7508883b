//! Pointer and keyboard input in the form the controls consume.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Which pointer button produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    #[default]
    Primary,
    Middle,
    Secondary,
}

impl PointerButton {
    /// Map a DOM-style button number (0 primary, 1 middle, 2 secondary).
    pub fn from_index(index: u8) -> Self {
        match index {
            0 => PointerButton::Primary,
            1 => PointerButton::Middle,
            _ => PointerButton::Secondary,
        }
    }

    pub fn is_primary(&self) -> bool {
        matches!(self, PointerButton::Primary)
    }
}

/// Pointer position in normalized device coordinates plus the button
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub ndc: Vec2,
    pub button: PointerButton,
}

impl PointerEvent {
    pub fn new(ndc: Vec2, button: PointerButton) -> Self {
        Self { ndc, button }
    }

    pub fn primary(ndc: Vec2) -> Self {
        Self::new(ndc, PointerButton::Primary)
    }
}

/// Screen rectangle of the canvas in client pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewportRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Client coordinates → NDC (x right, y up, both in -1..1)
    pub fn to_ndc(&self, client_x: f32, client_y: f32) -> Vec2 {
        Vec2::new(
            (client_x - self.left) / self.width * 2.0 - 1.0,
            -(client_y - self.top) / self.height * 2.0 + 1.0,
        )
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    pub fn pointer_event(&self, client_x: f32, client_y: f32, button: u8) -> PointerEvent {
        PointerEvent::new(self.to_ndc(client_x, client_y), PointerButton::from_index(button))
    }
}

/// Keys the controls react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Escape,
    /// Translate mode
    W,
    /// Rotate mode
    E,
    /// Scale mode
    R,
    /// Toggle world/local space
    Q,
}

impl Key {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Escape" | "escape" | "Esc" => Some(Key::Escape),
            "w" | "W" => Some(Key::W),
            "e" | "E" => Some(Key::E),
            "r" | "R" => Some(Key::R),
            "q" | "Q" => Some(Key::Q),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_ndc_corners() {
        let rect = ViewportRect::new(10.0, 20.0, 200.0, 100.0);
        assert_eq!(rect.to_ndc(10.0, 20.0), Vec2::new(-1.0, 1.0));
        assert_eq!(rect.to_ndc(210.0, 120.0), Vec2::new(1.0, -1.0));
        assert_eq!(rect.to_ndc(110.0, 70.0), Vec2::new(0.0, 0.0));
    }

    #[test]
    fn test_button_mapping() {
        assert!(PointerButton::from_index(0).is_primary());
        assert_eq!(PointerButton::from_index(2), PointerButton::Secondary);
        let ev = ViewportRect::new(0.0, 0.0, 100.0, 100.0).pointer_event(50.0, 50.0, 2);
        assert_eq!(ev.button, PointerButton::Secondary);
    }

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_name("Escape"), Some(Key::Escape));
        assert_eq!(Key::from_name("r"), Some(Key::R));
        assert_eq!(Key::from_name("x"), None);
    }
}
