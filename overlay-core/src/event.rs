//! Raw input events consumed by the gesture state machine.

use serde::{Deserialize, Serialize};

/// Phase of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    /// Touch started (finger down).
    Start,
    /// Touch moved (finger dragging).
    Move,
    /// Touch ended (finger up).
    End,
    /// Touch cancelled (e.g., palm rejection, contact lost).
    Cancel,
}

/// A single touch point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    /// Touch identifier (for multi-touch).
    pub id: u32,
    /// X position in canvas coordinates.
    pub x: f32,
    /// Y position in canvas coordinates.
    pub y: f32,
}

impl TouchPoint {
    /// Create a touch point.
    #[must_use]
    pub const fn new(id: u32, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }
}

/// A touch event with the set of contacts still on the surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    /// Phase of this touch event.
    pub phase: TouchPhase,
    /// All contacts currently on the surface. For `End` this is the
    /// remaining contacts, so it may be empty.
    pub touches: Vec<TouchPoint>,
    /// Timestamp in milliseconds since editor start.
    #[serde(default)]
    pub timestamp_ms: u64,
}

impl TouchEvent {
    /// Create a new touch event.
    #[must_use]
    pub fn new(phase: TouchPhase, touches: Vec<TouchPoint>, timestamp_ms: u64) -> Self {
        Self {
            phase,
            touches,
            timestamp_ms,
        }
    }

    /// Get the primary (first) touch point.
    #[must_use]
    pub fn primary_touch(&self) -> Option<&TouchPoint> {
        self.touches.first()
    }

    /// Check if this is a multi-touch event.
    #[must_use]
    pub fn is_multi_touch(&self) -> bool {
        self.touches.len() > 1
    }

    /// Number of contacts on the surface.
    #[must_use]
    pub fn touch_count(&self) -> usize {
        self.touches.len()
    }
}

/// Keyboard modifiers held during a pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
#[serde(default)]
pub struct KeyModifiers {
    /// Shift key pressed.
    pub shift: bool,
    /// Control key pressed.
    pub ctrl: bool,
    /// Alt/Option key pressed.
    pub alt: bool,
    /// Meta/Command key pressed.
    pub meta: bool,
}

impl KeyModifiers {
    /// No modifiers held.
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Only Alt/Option held.
    pub const ALT: Self = Self {
        shift: false,
        ctrl: false,
        alt: true,
        meta: false,
    };

    /// Only Control held.
    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
        alt: false,
        meta: false,
    };
}

/// Mouse button that generated a pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerButton {
    /// Primary (left) button or pen contact.
    #[default]
    Primary,
    /// Middle button.
    Middle,
    /// Secondary (right) button.
    Secondary,
}

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button pressed.
    Down,
    /// Pointer moved.
    Move,
    /// Button released.
    Up,
    /// Pointer capture lost without a release.
    Cancel,
}

/// A mouse/pen pointer event in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Event phase.
    pub phase: PointerPhase,
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Button involved.
    #[serde(default)]
    pub button: PointerButton,
    /// Modifier keys held.
    #[serde(default)]
    pub modifiers: KeyModifiers,
}

impl PointerEvent {
    /// Create a pointer event with the primary button and no modifiers.
    #[must_use]
    pub const fn new(phase: PointerPhase, x: f32, y: f32) -> Self {
        Self {
            phase,
            x,
            y,
            button: PointerButton::Primary,
            modifiers: KeyModifiers::NONE,
        }
    }

    /// Primary button press.
    #[must_use]
    pub const fn down(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Down, x, y)
    }

    /// Pointer movement.
    #[must_use]
    pub const fn moved(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Move, x, y)
    }

    /// Primary button release.
    #[must_use]
    pub const fn up(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Up, x, y)
    }

    /// Pointer capture lost.
    #[must_use]
    pub const fn cancel(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Cancel, x, y)
    }

    /// Set the held modifiers.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: KeyModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the button.
    #[must_use]
    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }
}

/// All input events the editor can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InputEvent {
    /// Mouse or pen pointer event.
    Pointer(PointerEvent),
    /// Raw touch event.
    Touch(TouchEvent),
}

impl From<PointerEvent> for InputEvent {
    fn from(event: PointerEvent) -> Self {
        Self::Pointer(event)
    }
}

impl From<TouchEvent> for InputEvent {
    fn from(event: TouchEvent) -> Self {
        Self::Touch(event)
    }
}
