use crate::Result;

use super::bitmap::GlyphBitmap;

/// Source of rasterized glyphs and face-wide metrics.
///
/// Layout is written against this trait rather than a concrete rasterizer;
/// [`FontFace`](super::FontFace) implements it over fontdue, and tests
/// implement it over synthetic glyph tables.
///
/// Contract: every bitmap returned by `glyph` has height `bound_length()`.
pub trait GlyphProvider {
    /// Rasterized bitmap for one codepoint. Implementations cache; repeated
    /// lookups of the same codepoint are cheap.
    fn glyph(&mut self, codepoint: char) -> Result<&GlyphBitmap>;

    /// Pen advance of the space character.
    fn space_advance(&self) -> i32;

    /// Full row height: face ascent plus descent, in pixels.
    fn bound_length(&self) -> i32;

    /// Ascent-only height, used for whitespace-only bitmaps.
    fn bound_height(&self) -> i32;

    /// Extra spacing between consecutive lines. Negative when the face's
    /// natural line advance is smaller than `bound_length`, in which case
    /// adjacent lines overlap.
    fn line_gap(&self) -> i32;
}

/// A glyph scheduled for blitting: codepoint plus horizontal offset inside
/// its line.
#[derive(Debug, Copy, Clone)]
struct Placed {
    ch: char,
    x: i32,
}

#[derive(Debug, Default)]
struct Line {
    placed: Vec<Placed>,
    width: i32,
    xoffset: i32,
}

fn ws_advance(c: char, space: i32) -> i32 {
    if c == '\t' { 4 * space } else { space }
}

fn is_word_break(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{c}')
}

/// Owned copy of the metrics needed during measuring, so the provider borrow
/// ends before the next lookup.
fn metrics<P: GlyphProvider>(provider: &mut P, c: char) -> Result<(i32, i32, i32)> {
    let g = provider.glyph(c)?;
    Ok((g.width(), g.bearing(), g.advance()))
}

/// Composes one line of text into a single bitmap.
///
/// With `encapsulate` the result is padded by one space on each side and the
/// bitmap's own bearing stays zero; without it the first glyph starts at
/// x = 0 and the bitmap carries the first glyph's bearing, so callers can
/// reproduce the exact pen position.
///
/// Single-character strings bypass composition: a lone glyph is returned
/// as-is, a lone space or tab becomes a blank bitmap of ascent height.
pub fn render_line<P: GlyphProvider>(
    provider: &mut P,
    text: &str,
    encapsulate: bool,
) -> Result<GlyphBitmap> {
    let chars: Vec<char> = text.chars().collect();
    let space = provider.space_advance();
    let bound_length = provider.bound_length();

    if chars.is_empty() {
        return Ok(GlyphBitmap::default());
    }
    if chars.len() == 1 && !encapsulate {
        let c = chars[0];
        if c == ' ' || c == '\t' {
            let mut out = GlyphBitmap::blank(ws_advance(c, space), provider.bound_height());
            out.advance = space;
            return Ok(out);
        }
        return Ok(provider.glyph(c)?.clone());
    }

    // ── measure ───────────────────────────────────────────────────────────

    let mut placed: Vec<Placed> = Vec::new();
    let mut width = 0;
    let mut out_bearing = 0;
    let out_advance;
    let mut coffset = 0;
    let mut first = 0;

    // The first character is special; it determines the offset of the line.
    if encapsulate {
        coffset = space;
        width = space;
    } else {
        let c = chars[0];
        if c == ' ' || c == '\t' {
            coffset = ws_advance(c, space);
            width = coffset;
        } else {
            let (_, bearing, advance) = metrics(provider, c)?;
            placed.push(Placed { ch: c, x: 0 });
            out_bearing = bearing;
            width = advance - bearing;
            coffset = advance - bearing;
        }
        first = 1;
    }

    let last = if encapsulate { chars.len() } else { chars.len() - 1 };
    for &c in &chars[first..last] {
        if c == ' ' || c == '\t' {
            width += ws_advance(c, space);
            coffset += ws_advance(c, space);
            continue;
        }
        let (_, bearing, advance) = metrics(provider, c)?;
        placed.push(Placed { ch: c, x: coffset + bearing });
        width += advance;
        coffset += advance;
    }

    // The final character again: its full bitmap must fit, not just the pen
    // advance, so overhang past the advance widens the line.
    if encapsulate {
        width += space;
        out_advance = coffset + space;
    } else {
        let c = chars[chars.len() - 1];
        if c == ' ' || c == '\t' {
            width += ws_advance(c, space);
            out_advance = coffset + ws_advance(c, space);
        } else {
            let (gwidth, bearing, advance) = metrics(provider, c)?;
            placed.push(Placed { ch: c, x: coffset + bearing });
            width += gwidth + bearing;
            out_advance = coffset + advance;
        }
    }

    // ── blit ──────────────────────────────────────────────────────────────

    let mut out = GlyphBitmap::blank(width, bound_length);
    out.bearing = out_bearing;
    out.advance = out_advance;
    for plc in &placed {
        let g = provider.glyph(plc.ch)?;
        blit(&mut out, g, plc.x, 0, 0);
    }
    Ok(out)
}

/// Composes text into a word-wrapped block bitmap.
///
/// Wrapping is greedy per whole word against `max_width`; a word longer than
/// the limit stays on its own over-long line. Trailing spaces on a wrapped
/// line do not count toward its width. `'\n'` forces a break, `'\r'` and
/// `'\f'` are ignored. With `encapsulate` each line is padded by one space
/// on both sides and `max_width` shrinks accordingly; without it, line
/// starts are normalized against the smallest first-glyph bearing in the
/// block.
///
/// When the face's line gap is negative, adjacent lines overlap and the
/// overlapping rows are composited by per-pixel maximum.
///
/// A string with no visible glyphs yields the null bitmap.
pub fn render_lines<P: GlyphProvider>(
    provider: &mut P,
    text: &str,
    max_width: i32,
    encapsulate: bool,
) -> Result<GlyphBitmap> {
    let chars: Vec<char> = text.chars().collect();
    let space = provider.space_advance();
    let bound_length = provider.bound_length();
    let linedelta = provider.line_gap();

    let xmax = if encapsulate {
        (max_width - 2 * space).max(0)
    } else {
        max_width
    };

    if chars.is_empty() {
        return Ok(GlyphBitmap::default());
    }
    if chars.len() == 1 && !encapsulate {
        let c = chars[0];
        if c == ' ' || c == '\t' {
            return Ok(GlyphBitmap::blank(
                ws_advance(c, space),
                provider.bound_height(),
            ));
        }
        return Ok(provider.glyph(c)?.clone());
    }

    // ── measure: split into lines of placed words ─────────────────────────

    let mut lines: Vec<Line> = vec![Line::default()];
    // Width contributed by spaces since the last word; discarded when a wrap
    // lands between them and the next word.
    let mut last_space = 0;
    let mut i = 0;
    let n = chars.len();

    while i < n {
        // Skip whitespace until the next word, wrapping as needed.
        while i < n {
            match chars[i] {
                c @ (' ' | '\t') => {
                    let adv = ws_advance(c, space);
                    let line = lines.last_mut().unwrap();
                    if line.width + adv > xmax && line.width != 0 {
                        lines.push(Line::default());
                    } else {
                        line.width += adv;
                        last_space += adv;
                    }
                    i += 1;
                }
                '\n' => {
                    lines.push(Line::default());
                    i += 1;
                }
                '\r' | '\u{c}' => {
                    i += 1;
                }
                _ => break,
            }
        }
        if i >= n {
            break;
        }

        // Accumulate one whole word, wrapping it to a fresh line the moment
        // it outgrows the limit.
        let (_, bearing, advance) = metrics(provider, chars[i])?;
        let mut word = Line {
            placed: vec![Placed { ch: chars[i], x: lines.last().unwrap().width }],
            width: advance - bearing,
            xoffset: bearing,
        };
        i += 1;

        loop {
            if i >= n || is_word_break(chars[i]) {
                if !encapsulate {
                    // The last glyph contributes its bitmap extent, not its
                    // pen advance.
                    let last_ch = word.placed.last().unwrap().ch;
                    let (gwidth, gbearing, gadvance) = metrics(provider, last_ch)?;
                    word.width -= gadvance;
                    word.width += gwidth + gbearing;
                }
                let line = lines.last_mut().unwrap();
                if line.width == 0 {
                    line.xoffset = word.xoffset;
                }
                line.placed.append(&mut word.placed);
                line.width += word.width;
                last_space = 0;
                break;
            }

            let c = chars[i];
            let (_, bearing, advance) = metrics(provider, c)?;
            let line_width = lines.last().unwrap().width;
            word.placed.push(Placed { ch: c, x: line_width + word.width + bearing });
            word.width += advance;
            i += 1;

            if line_width != 0 && line_width + word.width > xmax {
                for plc in &mut word.placed {
                    plc.x -= line_width;
                }
                let line = lines.last_mut().unwrap();
                line.width -= last_space;
                lines.push(Line::default());
            }
        }
    }

    // ── normalize line offsets ────────────────────────────────────────────

    let mut highest = 0;
    if encapsulate {
        for line in &mut lines {
            for plc in &mut line.placed {
                plc.x += space;
            }
            line.width += 2 * space;
            highest = highest.max(line.width);
        }
    } else {
        let lowest = lines.iter().map(|l| l.xoffset).min().unwrap_or(0);
        for line in &mut lines {
            if line.xoffset != lowest {
                let delta = line.xoffset - lowest;
                for plc in &mut line.placed {
                    plc.x += delta;
                }
                highest = highest.max(line.width + delta);
            } else {
                highest = highest.max(line.width);
            }
        }
    }

    // ── blit ──────────────────────────────────────────────────────────────

    let line_count = lines.len() as i32;
    let height = bound_length * line_count + linedelta * (line_count - 1);
    if highest == 0 {
        // The string consisted only of control characters.
        return Ok(GlyphBitmap::default());
    }

    let mut out = GlyphBitmap::blank(highest, height.max(bound_length));
    for (index, line) in lines.iter().enumerate() {
        if line.width == 0 {
            continue;
        }
        let base = index as i32 * (bound_length + linedelta);
        let overlap = if linedelta < 0 && index != 0 { -linedelta } else { 0 };
        for plc in &line.placed {
            let g = provider.glyph(plc.ch)?;
            blit(&mut out, g, plc.x, base, overlap);
        }
    }
    Ok(out)
}

/// Copies `src` into `dst` at column `x`, starting at row `base`. The first
/// `overlap` rows land on the previous line's tail and are composited by
/// per-pixel maximum instead of overwritten.
fn blit(dst: &mut GlyphBitmap, src: &GlyphBitmap, x: i32, base: i32, overlap: i32) {
    for j in 0..src.height() {
        let dy = base + j;
        if dy < 0 || dy >= dst.height() {
            continue;
        }
        let row = src.row(j);
        for (k, &value) in row.iter().enumerate() {
            let dx = x + k as i32;
            if dx < 0 || dx >= dst.width() {
                continue;
            }
            if j < overlap {
                let merged = dst.pixel(dx, dy).max(value);
                dst.set_pixel(dx, dy, merged);
            } else {
                dst.set_pixel(dx, dy, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    // ── synthetic provider ────────────────────────────────────────────────

    const BOUND_LENGTH: i32 = 10;
    const BOUND_HEIGHT: i32 = 8;
    const SPACE: i32 = 2;

    struct FakeGlyph {
        width: i32,
        bearing: i32,
        advance: i32,
        value: u8,
    }

    struct FakeProvider {
        glyphs: HashMap<char, FakeGlyph>,
        cache: HashMap<char, GlyphBitmap>,
        line_gap: i32,
    }

    impl FakeProvider {
        fn new(line_gap: i32) -> Self {
            Self {
                glyphs: HashMap::new(),
                cache: HashMap::new(),
                line_gap,
            }
        }

        fn with_glyph(mut self, ch: char, width: i32, bearing: i32, advance: i32, value: u8) -> Self {
            self.glyphs.insert(ch, FakeGlyph { width, bearing, advance, value });
            self
        }

        /// Letters are 5 wide, advance 5, no bearing, solid coverage.
        fn standard() -> Self {
            Self::new(0)
                .with_glyph('a', 5, 0, 5, 0xAA)
                .with_glyph('b', 5, 0, 5, 0xBB)
                .with_glyph('c', 5, 0, 5, 0xCC)
        }
    }

    impl GlyphProvider for FakeProvider {
        fn glyph(&mut self, codepoint: char) -> Result<&GlyphBitmap> {
            let spec = self
                .glyphs
                .get(&codepoint)
                .unwrap_or_else(|| panic!("test glyph table is missing {codepoint:?}"));
            let entry = self.cache.entry(codepoint).or_insert_with(|| {
                let mut bmp = GlyphBitmap::blank(spec.width, BOUND_LENGTH);
                bmp.bearing = spec.bearing;
                bmp.advance = spec.advance;
                bmp.pixels.fill(spec.value);
                bmp
            });
            Ok(entry)
        }

        fn space_advance(&self) -> i32 {
            SPACE
        }

        fn bound_length(&self) -> i32 {
            BOUND_LENGTH
        }

        fn bound_height(&self) -> i32 {
            BOUND_HEIGHT
        }

        fn line_gap(&self) -> i32 {
            self.line_gap
        }
    }

    // ── render_line ───────────────────────────────────────────────────────

    #[test]
    fn empty_string_yields_the_null_bitmap() {
        let mut p = FakeProvider::standard();
        assert!(render_line(&mut p, "", false).unwrap().is_null());
        assert!(render_line(&mut p, "", true).unwrap().is_null());
    }

    #[test]
    fn single_glyph_bypasses_composition() {
        let mut p = FakeProvider::standard();
        let bmp = render_line(&mut p, "a", false).unwrap();
        assert_eq!(bmp.width(), 5);
        assert_eq!(bmp.height(), BOUND_LENGTH);
        assert_eq!(bmp.advance(), 5);
        assert_eq!(bmp.pixel(0, 0), 0xAA);
    }

    #[test]
    fn single_space_is_blank_at_ascent_height() {
        let mut p = FakeProvider::standard();
        let bmp = render_line(&mut p, " ", false).unwrap();
        assert_eq!(bmp.width(), SPACE);
        assert_eq!(bmp.height(), BOUND_HEIGHT);
        assert_eq!(bmp.advance(), SPACE);
        assert!(bmp.data().iter().all(|&px| px == 0));
    }

    #[test]
    fn single_tab_is_four_spaces_wide() {
        let mut p = FakeProvider::standard();
        let bmp = render_line(&mut p, "\t", false).unwrap();
        assert_eq!(bmp.width(), 4 * SPACE);
        assert_eq!(bmp.height(), BOUND_HEIGHT);
    }

    #[test]
    fn line_places_glyphs_at_their_pen_positions() {
        let mut p = FakeProvider::standard();
        let bmp = render_line(&mut p, "ab", false).unwrap();
        assert_eq!(bmp.width(), 10);
        assert_eq!(bmp.height(), BOUND_LENGTH);
        assert_eq!(bmp.advance(), 10);
        assert_eq!(bmp.pixel(0, 0), 0xAA);
        assert_eq!(bmp.pixel(5, 0), 0xBB);
    }

    #[test]
    fn interior_whitespace_leaves_a_gap() {
        let mut p = FakeProvider::standard();
        let bmp = render_line(&mut p, "a b", false).unwrap();
        assert_eq!(bmp.width(), 5 + SPACE + 5);
        assert_eq!(bmp.pixel(4, 0), 0xAA);
        assert_eq!(bmp.pixel(5, 0), 0);
        assert_eq!(bmp.pixel(6, 0), 0);
        assert_eq!(bmp.pixel(7, 0), 0xBB);
    }

    #[test]
    fn encapsulation_pads_one_space_on_each_side() {
        let mut p = FakeProvider::standard();
        let bmp = render_line(&mut p, "ab", true).unwrap();
        assert_eq!(bmp.width(), SPACE + 10 + SPACE);
        assert_eq!(bmp.advance(), SPACE + 10 + SPACE);
        assert_eq!(bmp.bearing(), 0);
        assert_eq!(bmp.pixel(0, 0), 0);
        assert_eq!(bmp.pixel(SPACE, 0), 0xAA);
    }

    #[test]
    fn leading_glyph_bearing_becomes_the_line_bearing() {
        let mut p = FakeProvider::standard().with_glyph('i', 3, 2, 5, 0x11);
        let bmp = render_line(&mut p, "ia", false).unwrap();
        // First glyph blits at x = 0; the line remembers the shift.
        assert_eq!(bmp.bearing(), 2);
        assert_eq!(bmp.pixel(0, 0), 0x11);
        // Second glyph lands at (advance - bearing) of the first.
        assert_eq!(bmp.pixel(3, 0), 0xAA);
    }

    // ── render_lines: wrapping ────────────────────────────────────────────

    #[test]
    fn words_wrap_greedily_at_max_width() {
        let mut p = FakeProvider::standard();
        // "a b" fills the 12-unit limit exactly; "c" wraps.
        let bmp = render_lines(&mut p, "a b c", 12, false).unwrap();
        assert_eq!(bmp.width(), 12);
        assert_eq!(bmp.height(), 2 * BOUND_LENGTH);

        // Line 1: a at 0, b at 7.
        assert_eq!(bmp.pixel(0, 0), 0xAA);
        assert_eq!(bmp.pixel(7, 0), 0xBB);
        // Line 2: c at 0.
        assert_eq!(bmp.pixel(0, BOUND_LENGTH), 0xCC);
        assert_eq!(bmp.pixel(7, BOUND_LENGTH), 0);
    }

    #[test]
    fn trailing_spaces_do_not_widen_a_wrapped_line() {
        let mut p = FakeProvider::standard();
        // "aa" is 10 wide, the separator space brings it to 12, then "bb"
        // overflows and wraps; the dangling space must not count.
        let bmp = render_lines(&mut p, "aa bb", 12, false).unwrap();
        assert_eq!(bmp.width(), 10);
        assert_eq!(bmp.height(), 2 * BOUND_LENGTH);
        assert_eq!(bmp.pixel(0, BOUND_LENGTH), 0xBB);
    }

    #[test]
    fn overlong_word_stays_on_its_own_line() {
        let mut p = FakeProvider::standard();
        let bmp = render_lines(&mut p, "a bbb", 12, false).unwrap();
        // "bbb" is 15 wide, wider than the limit, and must not be split.
        assert_eq!(bmp.width(), 15);
        assert_eq!(bmp.height(), 2 * BOUND_LENGTH);
    }

    #[test]
    fn newline_forces_a_break_and_controls_are_ignored() {
        let mut p = FakeProvider::standard();
        let bmp = render_lines(&mut p, "a\r\nb", 100, false).unwrap();
        assert_eq!(bmp.height(), 2 * BOUND_LENGTH);
        assert_eq!(bmp.pixel(0, 0), 0xAA);
        assert_eq!(bmp.pixel(0, BOUND_LENGTH), 0xBB);
    }

    #[test]
    fn control_only_string_yields_the_null_bitmap() {
        let mut p = FakeProvider::standard();
        assert!(render_lines(&mut p, "\r\n\u{c}", 100, false).unwrap().is_null());
    }

    #[test]
    fn encapsulated_block_pads_every_line() {
        let mut p = FakeProvider::standard();
        let bmp = render_lines(&mut p, "a\nb", 100, true).unwrap();
        assert_eq!(bmp.width(), SPACE + 5 + SPACE);
        assert_eq!(bmp.pixel(0, 0), 0);
        assert_eq!(bmp.pixel(SPACE, 0), 0xAA);
        assert_eq!(bmp.pixel(SPACE, BOUND_LENGTH), 0xBB);
    }

    #[test]
    fn line_starts_normalize_to_the_smallest_bearing() {
        let mut p = FakeProvider::standard().with_glyph('i', 3, 2, 5, 0x11);
        let bmp = render_lines(&mut p, "i\na", 100, false).unwrap();
        // 'a' has bearing 0, so the 'i' line shifts right by its bearing.
        assert_eq!(bmp.pixel(0, 0), 0);
        assert_eq!(bmp.pixel(2, 0), 0x11);
        assert_eq!(bmp.pixel(0, BOUND_LENGTH), 0xAA);
    }

    // ── render_lines: vertical composition ────────────────────────────────

    #[test]
    fn positive_line_gap_inserts_blank_rows() {
        let mut p = FakeProvider::standard();
        p.line_gap = 3;
        let bmp = render_lines(&mut p, "a\nb", 100, false).unwrap();
        assert_eq!(bmp.height(), 2 * BOUND_LENGTH + 3);
        // The gap rows between the lines stay empty.
        assert_eq!(bmp.pixel(0, BOUND_LENGTH), 0);
        assert_eq!(bmp.pixel(0, BOUND_LENGTH + 2), 0);
        assert_eq!(bmp.pixel(0, BOUND_LENGTH + 3), 0xBB);
    }

    #[test]
    fn negative_line_gap_composites_overlap_by_maximum() {
        let mut p = FakeProvider::new(-2)
            .with_glyph('a', 5, 0, 5, 100)
            .with_glyph('b', 5, 0, 5, 50);
        let bmp = render_lines(&mut p, "a\nb", 100, false).unwrap();
        assert_eq!(bmp.height(), 2 * BOUND_LENGTH - 2);

        // Rows 8 and 9 belong to both lines; the brighter pixel wins.
        assert_eq!(bmp.pixel(0, BOUND_LENGTH - 2), 100);
        assert_eq!(bmp.pixel(0, BOUND_LENGTH - 1), 100);
        // Past the overlap the second line owns the rows.
        assert_eq!(bmp.pixel(0, BOUND_LENGTH), 50);
    }

    #[test]
    fn single_word_block_matches_single_line_composition() {
        let mut p = FakeProvider::standard();
        let block = render_lines(&mut p, "ab", 100, false).unwrap();
        let line = render_line(&mut p, "ab", false).unwrap();
        assert_eq!(block.width(), line.width());
        assert_eq!(block.height(), line.height());
        assert_eq!(block.data(), line.data());
    }
}
