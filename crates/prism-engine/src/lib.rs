//! Prism engine crate.
//!
//! This crate owns the platform + GPU runtime pieces used by applications:
//! window/render-thread lifecycle, input snapshots, text rasterization,
//! and the wgpu rendering layer.

pub mod core;
pub mod device;
pub mod error;
pub mod input;
pub mod mesh;
pub mod render;
pub mod text;
pub mod time;
pub mod window;

pub mod logging;

pub use error::{EngineError, Result, Subsystem};
