//! Time subsystem.
//!
//! Provides stable, testable frame timing without coupling to the runtime.
//! Intended usage:
//! - one `FrameClock` per render loop
//! - call `tick()` once per presented frame to obtain `FrameTime`
//! - call `verify_monotonic()` once at startup before anything depends on
//!   delta times

mod frame_clock;

pub use frame_clock::{verify_monotonic, FrameClock, FrameTime};
