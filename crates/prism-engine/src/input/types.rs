/// Keyboard key identifier.
///
/// Variants double as indices into the snapshot's 256-entry key table, so
/// the discriminants are stable by construction. The runtime maps platform
/// keycodes into these; keys without a variant are dropped at the boundary.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    ShiftLeft,
    ShiftRight,
    ControlLeft,
    ControlRight,
    AltLeft,
    AltRight,

    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    F1, F2, F3, F4, F5, F6,
    F7, F8, F9, F10, F11, F12,
}

impl Key {
    /// Index into the snapshot key table.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Mouse button identifier.
///
/// Discriminants index the snapshot's button table.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum MouseButton {
    Left = 0,
    Right = 1,
    Middle = 2,
}

impl MouseButton {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Platform-agnostic input events folded into the live input table.
///
/// The runtime translates window system events into these. Relative pointer
/// motion and wheel steps accumulate until the next publish; everything else
/// overwrites.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEvent {
    Key { key: Key, pressed: bool },
    Button { button: MouseButton, pressed: bool },

    /// Absolute pointer position in physical pixels.
    PointerMoved { x: f64, y: f64 },

    /// Relative pointer motion, unaccelerated where the platform offers it.
    PointerDelta { dx: f64, dy: f64 },

    /// Vertical wheel steps.
    Scroll { dz: f64 },
}
