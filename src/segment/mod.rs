//! Attributed text segmentation.
//!
//! Splits a string into runs that share one font and one foreground color,
//! applying inline color directives and collapsing newlines into per-run
//! line-break counts. Each run can then be shaped with a single face.

pub mod scanner;

use std::ops::Range;

use runetype_config::{Color, Palette};
use runetype_fonts::{FontId, FontRegistry, is_ignorable};

pub use scanner::{ControlDirective, scan};

/// A maximal span of text drawn with one font and one color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributedRun {
    /// Byte range into the segmented text.
    pub range: Range<usize>,
    pub font: FontId,
    pub color: Color,
    /// Newlines between the previous run and this one.
    pub line_breaks: u32,
    /// Byte offset of the first of those newlines.
    pub break_at: Option<usize>,
}

impl AttributedRun {
    /// The run's slice of `source`, ignorable codepoints included.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.range.clone()]
    }

    /// The run's text without the codepoints that never draw.
    pub fn visible_text(&self, source: &str) -> String {
        self.text(source).chars().filter(|&ch| !is_ignorable(ch)).collect()
    }
}

/// Segment `text` into attributed runs.
///
/// Runs follow source order, never overlap, and are never empty. Text is
/// covered except for consumed control bytes.
pub fn segment(
    registry: &FontRegistry,
    text: &str,
    base_font: FontId,
    base_color: Color,
    palette: &Palette,
) -> Vec<AttributedRun> {
    let bytes = text.as_bytes();
    let mut runs = Vec::new();
    let mut color = base_color;
    let mut line_breaks = 0;
    let mut break_at = None;
    let mut current: Option<AttributedRun> = None;
    let mut pos = 0;

    while pos < bytes.len() {
        if let Some((consumed, directive)) = scan(bytes, pos) {
            runs.extend(current.take());
            match directive {
                ControlDirective::Sgr(params) => {
                    color = palette.apply_sgr(&params, color, base_color);
                }
                ControlDirective::Palette(index) => match palette.lookup(index) {
                    Some(c) => color = c,
                    None => log::debug!("Ignoring unknown palette color {}", index),
                },
                ControlDirective::Cancel => color = base_color,
                ControlDirective::Newline => {
                    line_breaks += 1;
                    break_at.get_or_insert(pos);
                }
                ControlDirective::Ignored => {}
            }
            pos += consumed;
            continue;
        }

        let Some(ch) = text[pos..].chars().next() else {
            break;
        };
        let end = pos + ch.len_utf8();

        let font = if is_ignorable(ch) {
            // Stays with the run it modifies.
            current.as_ref().map_or(base_font, |run| run.font)
        } else {
            let resolved = registry.resolve(base_font, ch);
            if resolved.index != 0 {
                resolved.font
            } else {
                current.as_ref().map_or(base_font, |run| run.font)
            }
        };

        match current.as_mut() {
            Some(run) if run.font == font => run.range.end = end,
            _ => {
                runs.extend(current.take());
                current = Some(AttributedRun {
                    range: pos..end,
                    font,
                    color,
                    line_breaks: std::mem::take(&mut line_breaks),
                    break_at: break_at.take(),
                });
            }
        }
        pos = end;
    }
    runs.extend(current);
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use runetype_config::{CANCEL_ESCAPE, TextConfig, palette_escape};
    use runetype_fonts::{FallbackSet, SizeClass, SyntheticFontSource};

    fn registry() -> FontRegistry {
        FontRegistry::build(&TextConfig::default(), &SyntheticFontSource::new()).unwrap()
    }

    fn runs(text: &str) -> Vec<AttributedRun> {
        segment(&registry(), text, FontId::REGULAR, Color::WHITE, &Palette::default())
    }

    #[test]
    fn test_plain_text_is_one_run() {
        let runs = runs("hello world");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].range, 0..11);
        assert_eq!(runs[0].font, FontId::REGULAR);
        assert_eq!(runs[0].color, Color::WHITE);
        assert_eq!(runs[0].line_breaks, 0);
    }

    #[test]
    fn test_palette_color_and_cancel() {
        let red = palette_escape(Palette::RED).unwrap();
        let text = format!("A{red}B{CANCEL_ESCAPE}C");
        let runs = runs(&text);
        let palette = Palette::default();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].text(&text), "A");
        assert_eq!(runs[0].color, Color::WHITE);
        assert_eq!(runs[1].text(&text), "B");
        assert_eq!(Some(runs[1].color), palette.lookup(Palette::RED));
        assert_eq!(runs[2].text(&text), "C");
        assert_eq!(runs[2].color, Color::WHITE);
    }

    #[test]
    fn test_newlines_attach_to_next_run() {
        let text = "line1\n\nline2";
        let runs = runs(text);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1].text(text), "line2");
        assert_eq!(runs[1].line_breaks, 2);
        assert_eq!(runs[1].break_at, Some(5));
    }

    #[test]
    fn test_trailing_newline_makes_no_run() {
        let runs = runs("abc\n");
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].range, 0..3);
    }

    #[test]
    fn test_sgr_colors() {
        let text = "a\x1b[31mb\x1b[0mc";
        let runs = runs(text);
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[1].text(text), "b");
        assert_eq!(runs[1].color, runetype_config::color::ansi_color(1));
        assert_eq!(runs[2].color, Color::WHITE);
    }

    #[test]
    fn test_malformed_escape_keeps_text() {
        let text = "a\x1b[zz";
        let runs = runs(text);
        let visible: String = runs.iter().map(|r| r.text(text)).collect();
        assert_eq!(visible, "a[zz");
    }

    #[test]
    fn test_fallback_glyph_starts_new_run() {
        let text = "hi\u{1F600}there";
        let runs = runs(text);
        assert_eq!(runs.len(), 3);
        assert_eq!(
            runs[1].font,
            FontId::fallback(FallbackSet::SmolEmoji, SizeClass::Normal)
        );
        assert_eq!(runs[2].font, FontId::REGULAR);
    }

    #[test]
    fn test_ignorables_stay_in_run() {
        let text = "\u{1F600}\u{FE0F}x";
        let runs = runs(text);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text(text), "\u{1F600}\u{FE0F}");
        assert_eq!(runs[0].visible_text(text), "\u{1F600}");
    }

    #[test]
    fn test_runs_cover_text_in_order() {
        let text = "ab\u{4E00}\ncd\u{0B}#ef";
        let runs = runs(text);
        for pair in runs.windows(2) {
            assert!(pair[0].range.end <= pair[1].range.start);
        }
        assert!(runs.iter().all(|r| !r.range.is_empty()));
    }
}
