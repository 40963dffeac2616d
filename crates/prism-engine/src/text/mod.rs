//! Text rasterization and line layout.
//!
//! Glyphs are rasterized by fontdue into uniform-height coverage bitmaps
//! ([`GlyphBitmap`]), then composed into whole lines or word-wrapped blocks
//! by the layout functions. Layout is generic over [`GlyphProvider`], so it
//! runs against synthetic glyphs in tests; [`FontFace`] is the production
//! provider and [`FontLibrary`] caches faces by font file.

mod bitmap;
mod face;
mod layout;
mod library;

pub use bitmap::GlyphBitmap;
pub use face::FontFace;
pub use layout::{render_line, render_lines, GlyphProvider};
pub use library::{FontLibrary, DEFAULT_FONT};
