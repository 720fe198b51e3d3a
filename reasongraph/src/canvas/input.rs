//! Toolkit-independent input events consumed by the canvas engine.

use super::transform::{ScreenPoint, ScreenVector};

/// Identifier of one tracked contact.
pub type ContactId = u64;

/// The mouse is a single implicit contact.
pub const MOUSE_CONTACT: ContactId = 0;

/// Kind of device that produced a pointer event.
///
/// Only touch contacts take part in pinch zoom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Keyboard modifier state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    pub logo: bool,
}

impl Modifiers {
    /// Ctrl, or the platform command key.
    pub fn command(&self) -> bool {
        self.control || self.logo
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    Backspace,
    Delete,
    Character(String),
    Other,
}

/// One pointer contact sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub contact: ContactId,
    pub position: ScreenPoint,
    pub button: Option<PointerButton>,
    pub device: DeviceKind,
}

impl PointerEvent {
    /// A primary mouse button sample.
    pub fn mouse(position: ScreenPoint) -> Self {
        Self {
            contact: MOUSE_CONTACT,
            position,
            button: Some(PointerButton::Primary),
            device: DeviceKind::Mouse,
        }
    }

    pub fn touch(contact: ContactId, position: ScreenPoint) -> Self {
        Self {
            contact,
            position,
            button: None,
            device: DeviceKind::Touch,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown(PointerEvent),
    PointerMove(PointerEvent),
    PointerUp(PointerEvent),
    PointerCancel(PointerEvent),
    /// The pointer left the canvas without releasing.
    PointerLeave,
    /// Wheel scroll. `delta` follows the pixel convention where positive `y`
    /// scrolls the content up.
    Wheel {
        delta: ScreenVector,
        modifiers: Modifiers,
        position: ScreenPoint,
    },
    DoubleClick {
        position: ScreenPoint,
    },
    Key {
        key: Key,
        modifiers: Modifiers,
        text: Option<String>,
    },
    /// Keyboard focus moved away from the canvas.
    FocusLost,
}
