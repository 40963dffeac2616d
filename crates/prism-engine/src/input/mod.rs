//! Input subsystem.
//!
//! Input is double-buffered across the two engine threads: the window thread
//! folds events into a live table inside [`InputCollector`], and the render
//! thread copies that table into its private [`InputSnapshot`] once per frame.
//! Application code only ever sees the snapshot, so key and button state is
//! stable for the whole frame.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! Runtime code is responsible for translating platform events into
//! `InputEvent`s.

mod state;
mod types;

pub use state::{InputCollector, InputSnapshot};
pub use types::{InputEvent, Key, MouseButton};
