use std::sync::{Condvar, Mutex};

use crate::error::EngineError;
use crate::Result;

#[derive(Default)]
struct Phase {
    /// Render thread finished (or failed) initialization.
    ready: bool,
    /// Window thread decided whether the frame loop may begin.
    started: bool,
    /// Frame loop is (or will be) active; cleared by whichever side stops first.
    running: bool,
    /// First fatal error from either thread.
    error: Option<EngineError>,
}

/// Startup/shutdown protocol between the window thread and the render thread.
///
/// All waits are guarded by flags, not by wakeup order, so a notification
/// that fires before the peer starts waiting is never lost. The error slot
/// holds the first failure from either side; later failures are dropped.
#[derive(Default)]
pub struct Handshake {
    phase: Mutex<Phase>,
    cv: Condvar,
}

impl Handshake {
    pub fn new() -> Self {
        Self::default()
    }

    // ── window-thread side ────────────────────────────────────────────────

    /// Blocks until the render thread reports readiness.
    ///
    /// Returns the render thread's initialization error, if it failed. The
    /// caller must still join the render thread either way.
    pub fn wait_render_ready(&self) -> Result<()> {
        let mut phase = self.lock();
        while !phase.ready {
            phase = self.cv.wait(phase).unwrap_or_else(|e| e.into_inner());
        }
        match phase.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Releases the render thread into the frame loop.
    pub fn begin_running(&self) {
        let mut phase = self.lock();
        phase.started = true;
        phase.running = true;
        self.cv.notify_all();
    }

    /// Releases the render thread without ever entering the frame loop.
    ///
    /// Used when the window thread fails after render initialization
    /// succeeded; the render thread unblocks, sees the run was cancelled,
    /// and exits without rendering a frame.
    pub fn abort_start(&self) {
        let mut phase = self.lock();
        phase.started = true;
        phase.running = false;
        self.cv.notify_all();
    }

    /// Asks the render thread to stop after its current frame.
    pub fn request_quit(&self) {
        self.lock().running = false;
    }

    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    /// Takes the stored error, if any. Called once after both threads are done.
    pub fn take_error(&self) -> Option<EngineError> {
        self.lock().error.take()
    }

    // ── render-thread side ────────────────────────────────────────────────

    /// Reports successful initialization.
    pub fn render_ready(&self) {
        let mut phase = self.lock();
        phase.ready = true;
        self.cv.notify_all();
    }

    /// Reports failed initialization. The window thread receives the error
    /// from `wait_render_ready`.
    pub fn render_failed(&self, err: EngineError) {
        let mut phase = self.lock();
        phase.ready = true;
        if phase.error.is_none() {
            phase.error = Some(err);
        }
        self.cv.notify_all();
    }

    /// Blocks until the window thread decides the run's fate.
    ///
    /// Returns false when the run was cancelled before the first frame.
    pub fn wait_for_start(&self) -> bool {
        let mut phase = self.lock();
        while !phase.started {
            phase = self.cv.wait(phase).unwrap_or_else(|e| e.into_inner());
        }
        phase.running
    }

    /// Ends the run from the render side (application requested exit).
    pub fn render_finished(&self) {
        self.lock().running = false;
    }

    /// Ends the run from the render side with a fatal frame error.
    pub fn render_finished_with(&self, err: EngineError) {
        let mut phase = self.lock();
        if phase.error.is_none() {
            phase.error = Some(err);
        }
        phase.running = false;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Phase> {
        self.phase.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    // ── startup ───────────────────────────────────────────────────────────

    #[test]
    fn ready_before_wait_is_not_lost() {
        let hs = Handshake::new();
        hs.render_ready();
        // The notification already fired; the flag must still satisfy the wait.
        assert!(hs.wait_render_ready().is_ok());
    }

    #[test]
    fn wait_render_ready_surfaces_the_init_error() {
        let hs = Arc::new(Handshake::new());
        let peer = Arc::clone(&hs);
        let t = thread::spawn(move || {
            peer.render_failed(EngineError::context("no suitable GPU adapter"));
        });
        let err = hs.wait_render_ready().unwrap_err();
        assert_eq!(err.subsystem, crate::Subsystem::Context);
        t.join().unwrap();
    }

    #[test]
    fn start_releases_a_blocked_render_thread() {
        let hs = Arc::new(Handshake::new());
        let peer = Arc::clone(&hs);
        let t = thread::spawn(move || peer.wait_for_start());
        hs.begin_running();
        assert!(t.join().unwrap(), "render thread should enter the frame loop");
    }

    #[test]
    fn abort_releases_the_render_thread_without_running() {
        let hs = Arc::new(Handshake::new());
        let peer = Arc::clone(&hs);
        let t = thread::spawn(move || peer.wait_for_start());
        hs.abort_start();
        assert!(!t.join().unwrap(), "cancelled run must not reach the frame loop");
    }

    // ── shutdown ──────────────────────────────────────────────────────────

    #[test]
    fn either_side_can_stop_the_run() {
        let hs = Handshake::new();
        hs.begin_running();
        assert!(hs.is_running());

        hs.request_quit();
        assert!(!hs.is_running());

        let hs = Handshake::new();
        hs.begin_running();
        hs.render_finished();
        assert!(!hs.is_running());
    }

    #[test]
    fn first_error_wins() {
        let hs = Handshake::new();
        hs.begin_running();
        hs.render_finished_with(EngineError::graphics("device lost"));
        hs.render_finished_with(EngineError::app("late failure"));
        let err = hs.take_error().unwrap();
        assert_eq!(err.subsystem, crate::Subsystem::Graphics);
        assert!(hs.take_error().is_none());
    }
}
