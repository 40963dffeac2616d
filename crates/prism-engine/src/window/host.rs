use std::sync::Arc;

use winit::window::Window;

use crate::core::{App, AppControl, FrameCtx};
use crate::device::{Gpu, GpuInit};
use crate::error::EngineError;
use crate::input::{InputCollector, InputSnapshot};
use crate::render::Graphics;
use crate::time::FrameClock;
use crate::Result;

use super::lifecycle::{FrameFlow, RenderMain};
use super::{ResizeSlot, WindowConfig};

/// Asset root resolved against the process working directory.
const DATA_DIR: &str = "data";

struct RenderState {
    gpu: Gpu,
    graphics: Graphics,
}

/// Render-thread body of the production runtime.
///
/// Owns the GPU, the graphics facade and the application; none of them
/// exist until [`init`](RenderMain::init) runs on the render thread.
pub struct RenderHost<A: App> {
    window: Arc<Window>,
    vsync: bool,
    collector: Arc<InputCollector>,
    resize: Arc<ResizeSlot>,
    app: A,
    state: Option<RenderState>,
    clock: FrameClock,
    input: InputSnapshot,
}

impl<A: App> RenderHost<A> {
    pub fn new(
        window: Arc<Window>,
        config: &WindowConfig,
        collector: Arc<InputCollector>,
        resize: Arc<ResizeSlot>,
        app: A,
    ) -> Self {
        Self {
            window,
            vsync: config.vsync,
            collector,
            resize,
            app,
            state: None,
            clock: FrameClock::new(),
            input: InputSnapshot::default(),
        }
    }
}

impl<A: App> RenderMain for RenderHost<A> {
    fn init(&mut self) -> Result<()> {
        let init = GpuInit {
            vsync: self.vsync,
            ..GpuInit::default()
        };
        let gpu = pollster::block_on(Gpu::new(Arc::clone(&self.window), init))?;
        let graphics = Graphics::new(&gpu, DATA_DIR);

        log::info!("render context ready on {:?}", std::thread::current().name());
        self.state = Some(RenderState { gpu, graphics });
        self.clock.reset();
        Ok(())
    }

    fn frame(&mut self) -> Result<FrameFlow> {
        let state = self
            .state
            .as_mut()
            .ok_or_else(|| EngineError::context("frame before initialization"))?;

        if let Some((width, height)) = self.resize.take() {
            state.gpu.resize(width, height);
            state.graphics.set_viewport(width, height);
        }

        let time = self.clock.tick();

        // The application sees the input published at the end of the
        // previous frame; events arriving mid-callback land in the next one.
        let mut ctx = FrameCtx {
            graphics: &mut state.graphics,
            input: &self.input,
            time,
        };
        let control = self.app.frame(&mut ctx)?;

        self.collector.publish(&mut self.input);
        state.graphics.render(&mut state.gpu)?;

        Ok(match control {
            AppControl::Continue => FrameFlow::Continue,
            AppControl::Exit => FrameFlow::Quit,
        })
    }
}
