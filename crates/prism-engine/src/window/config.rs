use crate::error::EngineError;
use crate::Result;

/// Resolved display mode derived from [`WindowConfig`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DisplayMode {
    Windowed { width: u32, height: u32 },
    Maximized,
    BorderlessFullscreen,
}

/// Window creation parameters.
///
/// Built before any OS resource exists, so invalid combinations are caught
/// by [`validate`](Self::validate) without touching the platform.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub maximized: bool,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "prism".to_string(),
            width: 1280,
            height: 720,
            fullscreen: false,
            maximized: false,
            vsync: true,
        }
    }
}

impl WindowConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn fullscreen(mut self, fullscreen: bool) -> Self {
        self.fullscreen = fullscreen;
        self
    }

    pub fn maximized(mut self, maximized: bool) -> Self {
        self.maximized = maximized;
        self
    }

    pub fn vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    /// Rejects contradictory settings before any OS call is made.
    pub fn validate(&self) -> Result<()> {
        if self.fullscreen && self.maximized {
            return Err(EngineError::window(
                "fullscreen and maximized are mutually exclusive",
            ));
        }
        if self.width == 0 || self.height == 0 {
            return Err(EngineError::window("window dimensions must be non-zero"));
        }
        Ok(())
    }

    pub fn display_mode(&self) -> DisplayMode {
        if self.fullscreen {
            DisplayMode::BorderlessFullscreen
        } else if self.maximized {
            DisplayMode::Maximized
        } else {
            DisplayMode::Windowed {
                width: self.width,
                height: self.height,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fullscreen_and_maximized_are_rejected_up_front() {
        let config = WindowConfig::new().fullscreen(true).maximized(true);
        let err = config.validate().unwrap_err();
        assert_eq!(err.subsystem, crate::Subsystem::Window);
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let config = WindowConfig::new().dimensions(0, 720);
        assert!(config.validate().is_err());
    }

    #[test]
    fn display_mode_prefers_fullscreen_over_windowed_size() {
        let config = WindowConfig::new().dimensions(640, 480).fullscreen(true);
        assert_eq!(config.display_mode(), DisplayMode::BorderlessFullscreen);

        let config = WindowConfig::new().dimensions(640, 480);
        assert_eq!(
            config.display_mode(),
            DisplayMode::Windowed { width: 640, height: 480 }
        );
    }
}
