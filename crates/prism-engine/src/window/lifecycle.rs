use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::error::EngineError;
use crate::Result;

use super::handshake::Handshake;

/// Upper bound on how long one pump call may block waiting for events.
///
/// Keeps the window thread responsive to quit requests coming from the
/// render side even when the event queue is idle.
const PUMP_BUDGET: Duration = Duration::from_millis(10);

/// Outcome of one event-pump slice.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PumpFlow {
    Continue,
    /// The user asked to close the window.
    QuitRequested,
}

/// Outcome of one rendered frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameFlow {
    Continue,
    /// The application asked to exit cleanly.
    Quit,
}

/// Window-thread half of the runtime: dispatches native events.
pub trait EventPump {
    /// Processes pending events, blocking at most `budget`.
    fn pump(&mut self, budget: Duration) -> Result<PumpFlow>;

    /// Final window-thread setup after the render thread initialized
    /// (showing the window, capturing input devices).
    fn activate(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Render-thread half of the runtime.
///
/// `init` runs on the render thread before the handshake completes, so GPU
/// and application state never touch the window thread.
pub trait RenderMain: Send + 'static {
    fn init(&mut self) -> Result<()>;

    fn frame(&mut self) -> Result<FrameFlow>;
}

/// Drives the two-thread startup/shutdown protocol.
///
/// Owns both the event pump and the render thread's join handle; every exit
/// path joins the render thread before returning, so no caller can observe
/// a half-dead runtime.
pub struct Lifecycle;

impl Lifecycle {
    pub fn run<P, R>(mut pump: P, render: R) -> Result<()>
    where
        P: EventPump,
        R: RenderMain,
    {
        let handshake = Arc::new(Handshake::new());

        let peer = Arc::clone(&handshake);
        let render_thread = thread::Builder::new()
            .name("prism-render".to_string())
            .spawn(move || render_thread_main(peer, render))
            .map_err(|e| EngineError::window(format!("failed to spawn render thread: {e}")))?;

        if let Err(err) = handshake.wait_render_ready() {
            join_render(render_thread);
            return Err(err);
        }

        if let Err(err) = pump.activate() {
            handshake.abort_start();
            join_render(render_thread);
            return Err(err);
        }

        handshake.begin_running();
        log::info!("frame loop started");

        let mut pump_error = None;
        while handshake.is_running() {
            match pump.pump(PUMP_BUDGET) {
                Ok(PumpFlow::Continue) => {}
                Ok(PumpFlow::QuitRequested) => handshake.request_quit(),
                Err(err) => {
                    handshake.request_quit();
                    pump_error = Some(err);
                    break;
                }
            }
        }

        join_render(render_thread);
        log::info!("frame loop stopped");

        // A window-thread failure outranks whatever the render thread hit
        // while being torn down.
        if let Some(err) = pump_error {
            return Err(err);
        }
        match handshake.take_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn render_thread_main<R: RenderMain>(handshake: Arc<Handshake>, mut render: R) {
    if let Err(err) = render.init() {
        handshake.render_failed(err);
        return;
    }
    handshake.render_ready();

    if !handshake.wait_for_start() {
        return;
    }

    while handshake.is_running() {
        match render.frame() {
            Ok(FrameFlow::Continue) => {}
            Ok(FrameFlow::Quit) => {
                handshake.render_finished();
                break;
            }
            Err(err) => {
                log::error!("{err}");
                handshake.render_finished_with(err);
                break;
            }
        }
    }
}

fn join_render(handle: thread::JoinHandle<()>) {
    if handle.join().is_err() {
        log::error!("render thread panicked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    // ── stubs ─────────────────────────────────────────────────────────────

    /// Pump that never produces events and quits after a fixed number of
    /// slices, or never on its own when `quit_after` is None.
    struct IdlePump {
        slices: u32,
        quit_after: Option<u32>,
    }

    impl EventPump for IdlePump {
        fn pump(&mut self, _budget: Duration) -> Result<PumpFlow> {
            self.slices += 1;
            match self.quit_after {
                Some(n) if self.slices >= n => Ok(PumpFlow::QuitRequested),
                _ => Ok(PumpFlow::Continue),
            }
        }
    }

    struct CountingRender {
        frames: Arc<AtomicU32>,
        quit_at: Option<u32>,
        fail_init: bool,
        fail_frame: bool,
        init_ran: Arc<AtomicBool>,
    }

    impl CountingRender {
        fn new() -> Self {
            Self {
                frames: Arc::new(AtomicU32::new(0)),
                quit_at: None,
                fail_init: false,
                fail_frame: false,
                init_ran: Arc::new(AtomicBool::new(false)),
            }
        }
    }

    impl RenderMain for CountingRender {
        fn init(&mut self) -> Result<()> {
            self.init_ran.store(true, Ordering::SeqCst);
            if self.fail_init {
                return Err(EngineError::context("stub init failure"));
            }
            Ok(())
        }

        fn frame(&mut self) -> Result<FrameFlow> {
            let n = self.frames.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_frame {
                return Err(EngineError::graphics("stub frame failure"));
            }
            match self.quit_at {
                Some(q) if n >= q => Ok(FrameFlow::Quit),
                _ => Ok(FrameFlow::Continue),
            }
        }
    }

    // ── end-to-end runs ───────────────────────────────────────────────────

    #[test]
    fn app_quit_ends_the_run_cleanly() {
        let mut render = CountingRender::new();
        render.quit_at = Some(3);
        let frames = Arc::clone(&render.frames);

        let pump = IdlePump { slices: 0, quit_after: None };
        Lifecycle::run(pump, render).unwrap();

        assert_eq!(frames.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn window_close_request_stops_the_render_thread() {
        let render = CountingRender::new();
        let frames = Arc::clone(&render.frames);

        let pump = IdlePump { slices: 0, quit_after: Some(2) };
        Lifecycle::run(pump, render).unwrap();

        // No exact frame count; the loop just has to have terminated.
        assert!(frames.load(Ordering::SeqCst) < u32::MAX);
    }

    #[test]
    fn init_failure_is_joined_and_propagated() {
        let mut render = CountingRender::new();
        render.fail_init = true;
        let frames = Arc::clone(&render.frames);
        let init_ran = Arc::clone(&render.init_ran);

        let pump = IdlePump { slices: 0, quit_after: None };
        let err = Lifecycle::run(pump, render).unwrap_err();

        assert_eq!(err.subsystem, crate::Subsystem::Context);
        assert!(init_ran.load(Ordering::SeqCst));
        assert_eq!(frames.load(Ordering::SeqCst), 0, "no frame may run after failed init");
    }

    #[test]
    fn frame_failure_is_propagated_after_join() {
        let mut render = CountingRender::new();
        render.fail_frame = true;

        let pump = IdlePump { slices: 0, quit_after: None };
        let err = Lifecycle::run(pump, render).unwrap_err();
        assert_eq!(err.subsystem, crate::Subsystem::Graphics);
    }

    #[test]
    fn activation_failure_cancels_the_run_before_any_frame() {
        struct FailingActivation;
        impl EventPump for FailingActivation {
            fn pump(&mut self, _budget: Duration) -> Result<PumpFlow> {
                Ok(PumpFlow::Continue)
            }
            fn activate(&mut self) -> Result<()> {
                Err(EngineError::input("stub capture failure"))
            }
        }

        let render = CountingRender::new();
        let frames = Arc::clone(&render.frames);

        let err = Lifecycle::run(FailingActivation, render).unwrap_err();
        assert_eq!(err.subsystem, crate::Subsystem::Input);
        assert_eq!(frames.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn pump_failure_outranks_render_teardown_error() {
        struct FailingPump;
        impl EventPump for FailingPump {
            fn pump(&mut self, _budget: Duration) -> Result<PumpFlow> {
                Err(EngineError::window("stub event loop failure"))
            }
        }

        let render = CountingRender::new();
        let err = Lifecycle::run(FailingPump, render).unwrap_err();
        assert_eq!(err.subsystem, crate::Subsystem::Window);
    }
}
