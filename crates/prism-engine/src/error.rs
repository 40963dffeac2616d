use thiserror::Error;

/// Engine subsystem that raised a fatal error.
///
/// Every fatal error carries exactly one of these tags so the top-level
/// handler can report which layer gave up.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Subsystem {
    /// Monotonic clock acquisition.
    Clock,
    /// Input device capture.
    Input,
    /// Native window creation / event loop.
    Window,
    /// GPU adapter, device, or surface.
    Context,
    /// Pipelines, buffers, textures, meshes.
    Graphics,
    /// Font loading and glyph rasterization.
    Font,
    /// Application-level logic.
    App,
}

impl Subsystem {
    fn as_str(self) -> &'static str {
        match self {
            Subsystem::Clock => "clock",
            Subsystem::Input => "input",
            Subsystem::Window => "window",
            Subsystem::Context => "context",
            Subsystem::Graphics => "graphics",
            Subsystem::Font => "font",
            Subsystem::App => "app",
        }
    }
}

impl std::fmt::Display for Subsystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fatal engine error.
///
/// Errors of this type terminate the run; there is no recovery path past
/// the lifecycle controller. The message describes the failing call or
/// condition, the subsystem tag says which layer it came from.
#[derive(Debug, Clone, Error)]
#[error("error in prism::{subsystem}: {message}")]
pub struct EngineError {
    pub subsystem: Subsystem,
    pub message: String,
}

impl EngineError {
    pub fn new(subsystem: Subsystem, message: impl Into<String>) -> Self {
        Self {
            subsystem,
            message: message.into(),
        }
    }

    pub fn clock(message: impl Into<String>) -> Self {
        Self::new(Subsystem::Clock, message)
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::new(Subsystem::Input, message)
    }

    pub fn window(message: impl Into<String>) -> Self {
        Self::new(Subsystem::Window, message)
    }

    pub fn context(message: impl Into<String>) -> Self {
        Self::new(Subsystem::Context, message)
    }

    pub fn graphics(message: impl Into<String>) -> Self {
        Self::new(Subsystem::Graphics, message)
    }

    pub fn font(message: impl Into<String>) -> Self {
        Self::new(Subsystem::Font, message)
    }

    pub fn app(message: impl Into<String>) -> Self {
        Self::new(Subsystem::App, message)
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_subsystem() {
        let err = EngineError::window("CreateWindowEx failed");
        assert_eq!(err.to_string(), "error in prism::window: CreateWindowEx failed");
    }

    #[test]
    fn subsystem_tag_survives_cloning() {
        let err = EngineError::font("missing horizontal metrics");
        let copy = err.clone();
        assert_eq!(copy.subsystem, Subsystem::Font);
        assert_eq!(copy.message, err.message);
    }
}
