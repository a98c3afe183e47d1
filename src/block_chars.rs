//! Text drawn with Unicode block characters, for banners in plain-text output.

use runetype_fonts::{GlyphImage, GlyphScale, Typeface, is_ignorable};

/// Coverage above which a quadrant counts as set.
const QUADRANT_THRESHOLD: u8 = 155;

/// Quadrant blocks indexed by mask: top-left 1, top-right 2, bottom-left 4,
/// bottom-right 8.
const QUADRANTS: [char; 16] = [
    ' ', '\u{2598}', '\u{259D}', '\u{2580}', '\u{2596}', '\u{258C}', '\u{259E}', '\u{259B}',
    '\u{2597}', '\u{259A}', '\u{2590}', '\u{259C}', '\u{2584}', '\u{2599}', '\u{259F}', '\u{2588}',
];

/// Shades from empty to full.
const SHADES: [char; 5] = [' ', '\u{2591}', '\u{2592}', '\u{2593}', '\u{2588}'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockMode {
    /// Each character covers 2x2 pixels with a quadrant block.
    #[default]
    Quadrants,
    /// Each character covers one pixel with a shade block.
    Shading,
}

impl BlockMode {
    fn pixels_per_char(self) -> i32 {
        match self {
            BlockMode::Quadrants => 2,
            BlockMode::Shading => 1,
        }
    }
}

/// One rasterized character: its coverage and horizontal extent in pixels.
struct Cell {
    coverage: Vec<u8>,
    width: i32,
    height: i32,
    top: i32,
    advance: i32,
}

impl Cell {
    fn new(image: Option<GlyphImage>) -> Self {
        let Some(image) = image else {
            return Self {
                coverage: Vec::new(),
                width: 0,
                height: 0,
                top: 0,
                advance: 0,
            };
        };
        Self {
            coverage: image.pixels.chunks_exact(4).map(|px| px[3]).collect(),
            width: image.bounds.width as i32,
            height: image.bounds.height as i32,
            top: image.bounds.top,
            advance: 0,
        }
    }

    fn coverage(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return 0;
        }
        self.coverage[(y * self.width + x) as usize]
    }
}

/// Render `text` in `typeface` as lines of block characters `height` rows tall.
///
/// Glyphs are stretched to twice their width to offset the aspect ratio of
/// terminal cells. Blank rows above and below the text are dropped; an empty
/// string means nothing was visible.
pub fn render_block_chars(typeface: &dyn Typeface, height: i32, mode: BlockMode, text: &str) -> String {
    if height <= 0 {
        return String::new();
    }
    let ratio = mode.pixels_per_char();
    let pixel_height = height * ratio;
    let metrics = typeface.metrics();
    let scale = pixel_height as f32 / (metrics.ascent + metrics.descent);
    let glyph_scale = GlyphScale {
        x: scale * 2.0,
        y: scale,
    };
    let baseline = (metrics.ascent * scale) as i32;

    let mut cells = Vec::new();
    let mut width = 0;
    for ch in text.chars().filter(|ch| !is_ignorable(*ch)) {
        let glyph = typeface.glyph_index(ch);
        let mut cell = Cell::new(typeface.rasterize(glyph, glyph_scale, 0.0));
        cell.advance = if ch.is_whitespace() {
            (typeface.advance(glyph) * glyph_scale.x) as i32
        } else {
            match mode {
                BlockMode::Quadrants => (cell.width - 1) / 2 * 2 + 2,
                BlockMode::Shading => cell.width + 1,
            }
        };
        width += cell.advance;
        cells.push(cell);
    }

    let mut lines = Vec::new();
    for y in (0..pixel_height).step_by(ratio as usize) {
        let mut line = String::new();
        let mut index = 0;
        let mut lx = 0;
        for _ in (0..width).step_by(ratio as usize) {
            while index < cells.len() && lx >= cells[index].advance {
                index += 1;
                lx = 0;
            }
            let Some(cell) = cells.get(index) else {
                break;
            };
            let ly = y - baseline + cell.top;
            line.push(match mode {
                BlockMode::Quadrants => {
                    let set = |dx, dy| cell.coverage(lx + dx, ly + dy) > QUADRANT_THRESHOLD;
                    let mask = usize::from(set(0, 0))
                        | usize::from(set(1, 0)) << 1
                        | usize::from(set(0, 1)) << 2
                        | usize::from(set(1, 1)) << 3;
                    QUADRANTS[mask]
                }
                BlockMode::Shading => SHADES[cell.coverage(lx, ly) as usize * SHADES.len() / 256],
            });
            lx += ratio;
        }
        lines.push(line);
    }

    let is_blank = |line: &String| line.trim().is_empty();
    let first = lines.iter().position(|line| !is_blank(line));
    let last = lines.iter().rposition(|line| !is_blank(line));
    match (first, last) {
        (Some(first), Some(last)) => lines[first..=last].join("\n"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runetype_fonts::BoxTypeface;

    fn face() -> BoxTypeface {
        BoxTypeface::new("Boxes", vec![0x20..=0x7E], 550.0, false)
    }

    #[test]
    fn test_quadrants_cover_two_by_two_pixels() {
        let out = render_block_chars(&face(), 8, BlockMode::Quadrants, "A");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 6);
        // 15 pixels wide: seven full cells and a left half.
        let expected = format!("{}\u{258C}", "\u{2588}".repeat(7));
        assert!(lines.iter().all(|line| *line == expected));
    }

    #[test]
    fn test_shading_keeps_a_gap_after_each_glyph() {
        let out = render_block_chars(&face(), 8, BlockMode::Shading, "A");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines.iter().all(|line| *line == format!("{} ", "\u{2588}".repeat(8))));
    }

    #[test]
    fn test_lowercase_sits_on_the_baseline() {
        let out = render_block_chars(&face(), 8, BlockMode::Shading, "Ax");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with('\u{2588}'));
        assert!(lines[0].ends_with(' '), "short glyph leaves the top row empty");
        assert!(lines[5].trim_end().chars().all(|ch| ch == '\u{2588}' || ch == ' '));
        assert!(lines[5].chars().nth(9) == Some('\u{2588}'));
    }

    #[test]
    fn test_blank_input_renders_nothing() {
        assert_eq!(render_block_chars(&face(), 8, BlockMode::Quadrants, ""), "");
        assert_eq!(render_block_chars(&face(), 8, BlockMode::Quadrants, "   "), "");
        assert_eq!(render_block_chars(&face(), 0, BlockMode::Shading, "A"), "");
    }

    #[test]
    fn test_spaces_use_the_glyph_advance() {
        let spaced = render_block_chars(&face(), 8, BlockMode::Shading, "A A");
        let first = spaced.lines().next().unwrap();
        // 9 for each letter plus the scaled space advance of 8.8, truncated.
        assert_eq!(first.chars().count(), 9 + 8 + 9);
    }
}
