//! GPU device layer.
//!
//! Owns the wgpu instance/adapter/device/queue, the window surface, and the
//! depth buffer. Everything above this module works in terms of
//! [`Gpu`] and never touches wgpu initialization directly.

mod gpu;
mod texture;

pub use gpu::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction, DEPTH_FORMAT};
pub use texture::{Texture, TextureData};
