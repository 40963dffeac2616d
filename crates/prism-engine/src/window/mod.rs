//! Window runtime.
//!
//! Two threads cooperate here. The window thread owns the native window and
//! the event loop; the render thread owns the GPU and the application. They
//! meet in [`Handshake`], a small condition-variable protocol that sequences
//! startup, shutdown, and error hand-off:
//!
//! 1. the window thread spawns the render thread and blocks until it reports
//!    readiness (or an initialization error),
//! 2. the window thread finishes its own setup and releases the render
//!    thread into the frame loop,
//! 3. either side may end the run; the window thread always joins the render
//!    thread before returning.
//!
//! [`Lifecycle`] drives the protocol and is generic over the event pump and
//! the render-thread body, so the whole dance is testable without a display
//! server. [`WinitPump`] and [`RenderHost`] are the production pair.

mod config;
mod handshake;
mod host;
mod lifecycle;
mod pump;

use std::sync::Mutex;

pub use config::{DisplayMode, WindowConfig};
pub use handshake::Handshake;
pub use host::RenderHost;
pub use lifecycle::{EventPump, FrameFlow, Lifecycle, PumpFlow, RenderMain};
pub use pump::WinitPump;

use std::sync::Arc;

use crate::core::App;
use crate::input::InputCollector;
use crate::Result;

/// Latest pending drawable size, written by the window thread and drained by
/// the render thread. Intermediate sizes are intentionally dropped; only the
/// newest one matters.
#[derive(Default)]
pub struct ResizeSlot(Mutex<Option<(u32, u32)>>);

impl ResizeSlot {
    pub fn set(&self, width: u32, height: u32) {
        *self.0.lock().unwrap_or_else(|e| e.into_inner()) = Some((width, height));
    }

    pub fn take(&self) -> Option<(u32, u32)> {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).take()
    }
}

/// Creates the native window and runs `app` until it exits or fails.
///
/// Must be called on the main thread; the render thread is spawned
/// internally and joined before this returns.
pub fn run<A: App>(config: WindowConfig, app: A) -> Result<()> {
    config.validate()?;

    let collector = Arc::new(InputCollector::new());
    let resize = Arc::new(ResizeSlot::default());

    let mut pump = WinitPump::new(&config, Arc::clone(&collector), Arc::clone(&resize))?;
    let window = pump.create_window()?;

    let host = RenderHost::new(window, &config, collector, resize, app);
    Lifecycle::run(pump, host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_slot_keeps_only_the_newest_size() {
        let slot = ResizeSlot::default();
        slot.set(800, 600);
        slot.set(1024, 768);
        assert_eq!(slot.take(), Some((1024, 768)));
        assert_eq!(slot.take(), None);
    }
}
