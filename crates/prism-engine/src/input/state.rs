use std::sync::Mutex;

use super::types::{InputEvent, Key, MouseButton};

/// Per-frame input state.
///
/// Positions are absolute physical pixels; `pointer_delta` and `scroll_delta`
/// are relative motion accumulated since the previous publish.
#[derive(Copy, Clone)]
pub struct InputSnapshot {
    keys: [bool; 256],
    buttons: [bool; 3],
    pointer: (f64, f64),
    delta: (f64, f64),
    scroll: f64,
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self {
            keys: [false; 256],
            buttons: [false; 3],
            pointer: (0.0, 0.0),
            delta: (0.0, 0.0),
            scroll: 0.0,
        }
    }
}

impl InputSnapshot {
    /// True while `key` is held down.
    pub fn key(&self, key: Key) -> bool {
        self.keys[key.index()]
    }

    /// True while `button` is held down.
    pub fn button(&self, button: MouseButton) -> bool {
        self.buttons[button.index()]
    }

    /// Absolute pointer position, physical pixels.
    pub fn pointer(&self) -> (f64, f64) {
        self.pointer
    }

    /// Relative pointer motion accumulated over the last frame.
    pub fn pointer_delta(&self) -> (f64, f64) {
        self.delta
    }

    /// Wheel steps accumulated over the last frame.
    pub fn scroll_delta(&self) -> f64 {
        self.scroll
    }

    fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::Key { key, pressed } => self.keys[key.index()] = pressed,
            InputEvent::Button { button, pressed } => self.buttons[button.index()] = pressed,
            InputEvent::PointerMoved { x, y } => self.pointer = (x, y),
            InputEvent::PointerDelta { dx, dy } => {
                self.delta.0 += dx;
                self.delta.1 += dy;
            }
            InputEvent::Scroll { dz } => self.scroll += dz,
        }
    }
}

/// Shared live input table.
///
/// The window thread calls [`push`](Self::push) as events arrive; the render
/// thread calls [`publish`](Self::publish) exactly once per frame. Publish
/// copies the live table into the caller's snapshot and zeroes the live
/// accumulators, so deltas are consumed by exactly one frame and held state
/// carries over.
#[derive(Default)]
pub struct InputCollector {
    live: Mutex<InputSnapshot>,
}

impl InputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one event into the live table.
    pub fn push(&self, event: InputEvent) {
        let mut live = self.live.lock().unwrap_or_else(|e| e.into_inner());
        live.apply(event);
    }

    /// Copies the live table into `out` and resets the live accumulators.
    pub fn publish(&self, out: &mut InputSnapshot) {
        let mut live = self.live.lock().unwrap_or_else(|e| e.into_inner());
        *out = *live;
        live.delta = (0.0, 0.0);
        live.scroll = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── event folding ─────────────────────────────────────────────────────

    #[test]
    fn key_state_carries_across_publishes() {
        let collector = InputCollector::new();
        collector.push(InputEvent::Key { key: Key::W, pressed: true });

        let mut snap = InputSnapshot::default();
        collector.publish(&mut snap);
        assert!(snap.key(Key::W));

        collector.publish(&mut snap);
        assert!(snap.key(Key::W), "held keys persist until a release event");

        collector.push(InputEvent::Key { key: Key::W, pressed: false });
        collector.publish(&mut snap);
        assert!(!snap.key(Key::W));
    }

    #[test]
    fn deltas_accumulate_then_reset_on_publish() {
        let collector = InputCollector::new();
        collector.push(InputEvent::PointerDelta { dx: 3.0, dy: -1.0 });
        collector.push(InputEvent::PointerDelta { dx: 2.0, dy: 4.0 });
        collector.push(InputEvent::Scroll { dz: 1.0 });

        let mut snap = InputSnapshot::default();
        collector.publish(&mut snap);
        assert_eq!(snap.pointer_delta(), (5.0, 3.0));
        assert_eq!(snap.scroll_delta(), 1.0);

        collector.publish(&mut snap);
        assert_eq!(snap.pointer_delta(), (0.0, 0.0));
        assert_eq!(snap.scroll_delta(), 0.0);
    }

    #[test]
    fn absolute_position_overwrites_and_persists() {
        let collector = InputCollector::new();
        collector.push(InputEvent::PointerMoved { x: 10.0, y: 20.0 });
        collector.push(InputEvent::PointerMoved { x: 30.0, y: 40.0 });

        let mut snap = InputSnapshot::default();
        collector.publish(&mut snap);
        assert_eq!(snap.pointer(), (30.0, 40.0));

        collector.publish(&mut snap);
        assert_eq!(snap.pointer(), (30.0, 40.0));
    }

    #[test]
    fn buttons_are_independent_slots() {
        let collector = InputCollector::new();
        collector.push(InputEvent::Button { button: MouseButton::Left, pressed: true });
        collector.push(InputEvent::Button { button: MouseButton::Middle, pressed: true });

        let mut snap = InputSnapshot::default();
        collector.publish(&mut snap);
        assert!(snap.button(MouseButton::Left));
        assert!(!snap.button(MouseButton::Right));
        assert!(snap.button(MouseButton::Middle));
    }

    #[test]
    fn events_after_publish_land_in_the_next_frame() {
        let collector = InputCollector::new();
        let mut snap = InputSnapshot::default();

        collector.publish(&mut snap);
        collector.push(InputEvent::Key { key: Key::Escape, pressed: true });
        assert!(!snap.key(Key::Escape), "snapshot is immutable between publishes");

        collector.publish(&mut snap);
        assert!(snap.key(Key::Escape));
    }
}
