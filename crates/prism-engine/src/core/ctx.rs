use crate::input::InputSnapshot;
use crate::render::Graphics;
use crate::time::FrameTime;

/// Per-frame context passed to [`App::frame`](super::App::frame).
///
/// `input` is the snapshot published at the end of the previous frame; it
/// does not change while the callback runs.
pub struct FrameCtx<'a> {
    pub graphics: &'a mut Graphics,
    pub input: &'a InputSnapshot,
    pub time: FrameTime,
}
