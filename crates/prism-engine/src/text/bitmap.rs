/// Single-channel coverage bitmap with horizontal glyph metrics.
///
/// `bearing` is the left-side bearing of the first glyph and `advance` the
/// pen advance to the character after the last one; both are zero for
/// composed multi-line bitmaps. A default-constructed bitmap is the null
/// bitmap (no pixels), used for empty or control-only strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphBitmap {
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) bearing: i32,
    pub(crate) advance: i32,
    pub(crate) pixels: Vec<u8>,
}

impl GlyphBitmap {
    /// Zero-filled bitmap of the given dimensions.
    pub fn blank(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            bearing: 0,
            advance: 0,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    /// True for the null bitmap.
    pub fn is_null(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn bearing(&self) -> i32 {
        self.bearing
    }

    pub fn advance(&self) -> i32 {
        self.advance
    }

    pub fn data(&self) -> &[u8] {
        &self.pixels
    }

    pub(crate) fn row(&self, y: i32) -> &[u8] {
        let start = y as usize * self.width as usize;
        &self.pixels[start..start + self.width as usize]
    }

    pub(crate) fn pixel(&self, x: i32, y: i32) -> u8 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    pub(crate) fn set_pixel(&mut self, x: i32, y: i32, value: u8) {
        self.pixels[y as usize * self.width as usize + x as usize] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_null() {
        let bmp = GlyphBitmap::default();
        assert!(bmp.is_null());
        assert_eq!(bmp.width(), 0);
        assert_eq!(bmp.height(), 0);
    }

    #[test]
    fn blank_is_zero_filled_but_not_null() {
        let bmp = GlyphBitmap::blank(3, 2);
        assert!(!bmp.is_null());
        assert_eq!(bmp.data().len(), 6);
        assert!(bmp.data().iter().all(|&p| p == 0));
    }

    #[test]
    fn negative_dimensions_clamp_to_null() {
        let bmp = GlyphBitmap::blank(-4, 7);
        assert!(bmp.is_null());
    }
}
