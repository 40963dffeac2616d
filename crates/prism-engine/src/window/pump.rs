use std::sync::Arc;
use std::time::Duration;

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, DeviceId, ElementState, MouseScrollDelta, WindowEvent};
use winit::event::MouseButton as WinitMouseButton;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{CursorGrabMode, Fullscreen, Window, WindowId};

use crate::error::EngineError;
use crate::input::{InputCollector, InputEvent, Key, MouseButton};
use crate::Result;

use super::config::{DisplayMode, WindowConfig};
use super::lifecycle::{EventPump, PumpFlow};
use super::ResizeSlot;

/// Wheel pixel deltas are folded into line-sized steps.
const PIXELS_PER_WHEEL_LINE: f64 = 20.0;

/// Production [`EventPump`] backed by a winit event loop.
///
/// The event loop is driven in short `pump_app_events` slices from
/// [`Lifecycle::run`](super::Lifecycle::run), so the window thread keeps
/// polling the shared run flag instead of parking inside winit forever.
///
/// The window is created hidden and shown in [`activate`](EventPump::activate),
/// after the render thread has a surface on it.
pub struct WinitPump {
    event_loop: EventLoop<()>,
    handler: PumpHandler,
}

impl WinitPump {
    pub fn new(
        config: &WindowConfig,
        collector: Arc<InputCollector>,
        resize: Arc<ResizeSlot>,
    ) -> Result<Self> {
        let event_loop = EventLoop::new()
            .map_err(|e| EngineError::window(format!("failed to create event loop: {e}")))?;

        Ok(Self {
            event_loop,
            handler: PumpHandler {
                config: config.clone(),
                collector,
                resize,
                window: None,
                close_requested: false,
                error: None,
            },
        })
    }

    /// Pumps the event loop until winit delivers `resumed` and the window
    /// exists. Must happen before the render thread is spawned; the surface
    /// is created against this window.
    pub fn create_window(&mut self) -> Result<Arc<Window>> {
        for _ in 0..100 {
            self.event_loop
                .pump_app_events(Some(Duration::from_millis(10)), &mut self.handler);
            if let Some(err) = self.handler.error.take() {
                return Err(err);
            }
            if let Some(window) = &self.handler.window {
                return Ok(Arc::clone(window));
            }
        }
        Err(EngineError::window("event loop never delivered the window"))
    }
}

impl EventPump for WinitPump {
    fn pump(&mut self, budget: Duration) -> Result<PumpFlow> {
        let status = self
            .event_loop
            .pump_app_events(Some(budget), &mut self.handler);

        if let Some(err) = self.handler.error.take() {
            return Err(err);
        }
        if self.handler.close_requested || matches!(status, PumpStatus::Exit(_)) {
            return Ok(PumpFlow::QuitRequested);
        }
        Ok(PumpFlow::Continue)
    }

    fn activate(&mut self) -> Result<()> {
        let window = self
            .handler
            .window
            .as_ref()
            .ok_or_else(|| EngineError::window("activate called without a window"))?;

        window.set_visible(true);

        // Fly-camera style input: the pointer stays inside the window and
        // the application consumes relative motion only.
        window
            .set_cursor_grab(CursorGrabMode::Confined)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked))
            .map_err(|e| EngineError::input(format!("failed to grab the cursor: {e}")))?;
        window.set_cursor_visible(false);

        Ok(())
    }
}

struct PumpHandler {
    config: WindowConfig,
    collector: Arc<InputCollector>,
    resize: Arc<ResizeSlot>,
    window: Option<Arc<Window>>,
    close_requested: bool,
    error: Option<EngineError>,
}

impl ApplicationHandler for PumpHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let mut attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_visible(false);

        attrs = match self.config.display_mode() {
            DisplayMode::Windowed { width, height } => {
                attrs.with_inner_size(PhysicalSize::new(width, height))
            }
            DisplayMode::Maximized => attrs.with_maximized(true),
            DisplayMode::BorderlessFullscreen => {
                attrs.with_fullscreen(Some(Fullscreen::Borderless(None)))
            }
        };

        match event_loop.create_window(attrs) {
            Ok(window) => self.window = Some(Arc::new(window)),
            Err(e) => {
                self.error = Some(EngineError::window(format!(
                    "failed to create native window: {e}"
                )));
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.close_requested = true;
            }

            WindowEvent::Resized(size) => {
                self.resize.set(size.width, size.height);
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.repeat {
                    return;
                }
                if let PhysicalKey::Code(code) = event.physical_key {
                    if let Some(key) = map_key(code) {
                        self.collector.push(InputEvent::Key {
                            key,
                            pressed: event.state == ElementState::Pressed,
                        });
                    }
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(button) = map_button(button) {
                    self.collector.push(InputEvent::Button {
                        button,
                        pressed: state == ElementState::Pressed,
                    });
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.collector.push(InputEvent::PointerMoved {
                    x: position.x,
                    y: position.y,
                });
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let dz = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y as f64,
                    MouseScrollDelta::PixelDelta(p) => p.y / PIXELS_PER_WHEEL_LINE,
                };
                self.collector.push(InputEvent::Scroll { dz });
            }

            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        // Raw motion; unaccelerated where the platform provides it.
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.collector.push(InputEvent::PointerDelta { dx, dy });
        }
    }
}

fn map_button(button: WinitMouseButton) -> Option<MouseButton> {
    match button {
        WinitMouseButton::Left => Some(MouseButton::Left),
        WinitMouseButton::Right => Some(MouseButton::Right),
        WinitMouseButton::Middle => Some(MouseButton::Middle),
        _ => None,
    }
}

fn map_key(code: KeyCode) -> Option<Key> {
    let key = match code {
        KeyCode::Escape => Key::Escape,
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Space => Key::Space,

        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,

        KeyCode::ShiftLeft => Key::ShiftLeft,
        KeyCode::ShiftRight => Key::ShiftRight,
        KeyCode::ControlLeft => Key::ControlLeft,
        KeyCode::ControlRight => Key::ControlRight,
        KeyCode::AltLeft => Key::AltLeft,
        KeyCode::AltRight => Key::AltRight,

        KeyCode::KeyA => Key::A,
        KeyCode::KeyB => Key::B,
        KeyCode::KeyC => Key::C,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyF => Key::F,
        KeyCode::KeyG => Key::G,
        KeyCode::KeyH => Key::H,
        KeyCode::KeyI => Key::I,
        KeyCode::KeyJ => Key::J,
        KeyCode::KeyK => Key::K,
        KeyCode::KeyL => Key::L,
        KeyCode::KeyM => Key::M,
        KeyCode::KeyN => Key::N,
        KeyCode::KeyO => Key::O,
        KeyCode::KeyP => Key::P,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyR => Key::R,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyT => Key::T,
        KeyCode::KeyU => Key::U,
        KeyCode::KeyV => Key::V,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyX => Key::X,
        KeyCode::KeyY => Key::Y,
        KeyCode::KeyZ => Key::Z,

        KeyCode::Digit0 => Key::Digit0,
        KeyCode::Digit1 => Key::Digit1,
        KeyCode::Digit2 => Key::Digit2,
        KeyCode::Digit3 => Key::Digit3,
        KeyCode::Digit4 => Key::Digit4,
        KeyCode::Digit5 => Key::Digit5,
        KeyCode::Digit6 => Key::Digit6,
        KeyCode::Digit7 => Key::Digit7,
        KeyCode::Digit8 => Key::Digit8,
        KeyCode::Digit9 => Key::Digit9,

        KeyCode::F1 => Key::F1,
        KeyCode::F2 => Key::F2,
        KeyCode::F3 => Key::F3,
        KeyCode::F4 => Key::F4,
        KeyCode::F5 => Key::F5,
        KeyCode::F6 => Key::F6,
        KeyCode::F7 => Key::F7,
        KeyCode::F8 => Key::F8,
        KeyCode::F9 => Key::F9,
        KeyCode::F10 => Key::F10,
        KeyCode::F11 => Key::F11,
        KeyCode::F12 => Key::F12,

        _ => return None,
    };
    Some(key)
}
