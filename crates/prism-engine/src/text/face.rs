use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::EngineError;
use crate::Result;

use super::bitmap::GlyphBitmap;
use super::layout::GlyphProvider;

/// Rasterization happens at 144 dpi, so pixel size is twice the point size.
const PIXELS_PER_POINT: f32 = 2.0;

/// One font at one size, with a per-codepoint bitmap cache.
///
/// Every glyph is padded to the face's full row height (`bound_length`) when
/// rasterized, which is what lets line layout copy whole rows without any
/// per-glyph vertical alignment.
pub struct FontFace {
    font: Arc<fontdue::Font>,
    name: String,
    size: u32,
    px: f32,
    space_advance: i32,
    bound_length: i32,
    bound_height: i32,
    line_gap: i32,
    cache: HashMap<char, GlyphBitmap>,
}

impl FontFace {
    pub fn new(font: Arc<fontdue::Font>, name: String, size: u32) -> Result<Self> {
        let mut face = Self {
            font,
            name,
            size: 0,
            px: 0.0,
            space_advance: 0,
            bound_length: 0,
            bound_height: 0,
            line_gap: 0,
            cache: HashMap::new(),
        };
        face.apply_size(size)?;
        Ok(face)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Changes the point size. The bitmap cache only holds glyphs of the
    /// current size, so it is dropped on change.
    pub fn set_size(&mut self, size: u32) -> Result<()> {
        if self.size != size {
            self.cache.clear();
            self.apply_size(size)?;
        }
        Ok(())
    }

    fn apply_size(&mut self, size: u32) -> Result<()> {
        let px = size as f32 * PIXELS_PER_POINT;
        let metrics = self
            .font
            .horizontal_line_metrics(px)
            .ok_or_else(|| {
                EngineError::font(format!("font {} has no horizontal metrics", self.name))
            })?;

        self.size = size;
        self.px = px;
        // descent is negative; the full row covers ascent plus descent.
        self.bound_length = (metrics.ascent - metrics.descent).ceil() as i32;
        self.bound_height = metrics.ascent.ceil() as i32;
        self.line_gap = metrics.new_line_size.ceil() as i32 - self.bound_length;
        self.space_advance = self.font.metrics(' ', px).advance_width.round() as i32;
        Ok(())
    }
}

impl GlyphProvider for FontFace {
    fn glyph(&mut self, codepoint: char) -> Result<&GlyphBitmap> {
        match self.cache.entry(codepoint) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let bmp = rasterize_padded(
                    &self.font,
                    self.px,
                    self.bound_length,
                    self.bound_height,
                    codepoint,
                );
                Ok(entry.insert(bmp))
            }
        }
    }

    fn space_advance(&self) -> i32 {
        self.space_advance
    }

    fn bound_length(&self) -> i32 {
        self.bound_length
    }

    fn bound_height(&self) -> i32 {
        self.bound_height
    }

    fn line_gap(&self) -> i32 {
        self.line_gap
    }
}

/// Rasterizes one codepoint and pads it vertically to the face row height,
/// positioning the ink by its baseline offset.
fn rasterize_padded(
    font: &fontdue::Font,
    px: f32,
    bound_length: i32,
    bound_height: i32,
    codepoint: char,
) -> GlyphBitmap {
    let (metrics, coverage) = font.rasterize(codepoint, px);
    let ink_width = metrics.width as i32;
    let ink_height = metrics.height as i32;

    let mut out = GlyphBitmap::blank(ink_width, bound_length);
    out.bearing = metrics.xmin;
    out.advance = metrics.advance_width.round() as i32;

    // Rows above the ink stay blank down to the glyph's top edge.
    let yoffset = bound_height - (ink_height + metrics.ymin);
    for j in 0..ink_height {
        let dy = j + yoffset;
        if dy < 0 || dy >= bound_length {
            continue;
        }
        for i in 0..ink_width {
            let value = coverage[(j * ink_width + i) as usize];
            out.set_pixel(i, dy, value);
        }
    }
    out
}
