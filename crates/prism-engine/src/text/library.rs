use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::EngineError;
use crate::Result;

use super::bitmap::GlyphBitmap;
use super::face::FontFace;
use super::layout;

/// Font file used when the application never selects one.
pub const DEFAULT_FONT: &str = "SourceSansPro-Regular.otf";

const DEFAULT_SIZE: u32 = 12;

/// Face cache over a fonts directory.
///
/// Faces are loaded lazily by file name and kept for the library's
/// lifetime; the most recently selected face serves the render calls.
pub struct FontLibrary {
    dir: PathBuf,
    faces: HashMap<String, FontFace>,
    active: String,
    size: u32,
}

impl FontLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            faces: HashMap::new(),
            active: DEFAULT_FONT.to_string(),
            size: DEFAULT_SIZE,
        }
    }

    /// Selects the face for subsequent render calls, loading the font file
    /// on first use.
    pub fn select(&mut self, name: &str, size: u32) -> Result<()> {
        self.ensure_face(name)?;
        self.active = name.to_string();
        self.size = size;
        self.faces.get_mut(name).unwrap().set_size(size)
    }

    /// Changes the point size of the active face.
    pub fn set_size(&mut self, size: u32) -> Result<()> {
        let name = self.active.clone();
        self.select(&name, size)
    }

    /// Composes a single line with the active face. See
    /// [`layout::render_line`].
    pub fn render_line(&mut self, text: &str, encapsulate: bool) -> Result<GlyphBitmap> {
        let face = self.active_face()?;
        layout::render_line(face, text, encapsulate)
    }

    /// Composes a word-wrapped block with the active face. See
    /// [`layout::render_lines`].
    pub fn render_lines(
        &mut self,
        text: &str,
        max_width: i32,
        encapsulate: bool,
    ) -> Result<GlyphBitmap> {
        let face = self.active_face()?;
        layout::render_lines(face, text, max_width, encapsulate)
    }

    fn active_face(&mut self) -> Result<&mut FontFace> {
        let name = self.active.clone();
        self.ensure_face(&name)?;
        Ok(self.faces.get_mut(&name).unwrap())
    }

    fn ensure_face(&mut self, name: &str) -> Result<()> {
        if self.faces.contains_key(name) {
            return Ok(());
        }

        let path = self.dir.join(name);
        let bytes = std::fs::read(&path).map_err(|e| {
            EngineError::font(format!("unable to open font file {}: {e}", path.display()))
        })?;
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| EngineError::font(format!("failed to parse font {name}: {e}")))?;

        let face = FontFace::new(Arc::new(font), name.to_string(), self.size)?;
        self.faces.insert(name.to_string(), face);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_font_file_reports_the_font_subsystem() {
        let dir = tempfile::tempdir().unwrap();
        let mut lib = FontLibrary::new(dir.path());
        let err = lib.render_line("hello", false).unwrap_err();
        assert_eq!(err.subsystem, crate::Subsystem::Font);
    }

    #[test]
    fn garbage_font_bytes_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.otf"), b"not a font").unwrap();

        let mut lib = FontLibrary::new(dir.path());
        let err = lib.select("broken.otf", 12).unwrap_err();
        assert_eq!(err.subsystem, crate::Subsystem::Font);
    }
}
