use crate::Result;

use super::ctx::FrameCtx;

/// Control directive returned by the per-frame callback.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
///
/// The callback runs on the render thread, before input publication and
/// before the frame is drawn, so resource loads and state changes issued
/// here are visible in the same frame.
pub trait App: Send + 'static {
    /// Called once per frame. Errors are fatal and end the run.
    fn frame(&mut self, ctx: &mut FrameCtx<'_>) -> Result<AppControl>;
}
