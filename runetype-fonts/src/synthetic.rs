//! Programmatic box typefaces.
//!
//! [`SyntheticFontSource`] hands out typefaces that draw filled rectangles for
//! a fixed set of codepoint ranges per font file. They let the engine lay out
//! and render headlessly when no font files are installed, and make glyph
//! coverage, advances and boxes fully deterministic.

use std::collections::HashSet;
use std::ops::RangeInclusive;
use std::path::Path;
use std::sync::Arc;

use crate::catalog::FontFile;
use crate::error::FontError;
use crate::source::{FontBytes, FontSource};
use crate::typeface::{FaceMetrics, GlyphBox, GlyphImage, GlyphScale, Typeface};

const UNITS_PER_EM: f32 = 1000.0;
const ASCENT: f32 = 800.0;
const DESCENT: f32 = 200.0;

/// A typeface whose glyphs are solid boxes.
#[derive(Debug, Clone)]
pub struct BoxTypeface {
    name: String,
    coverage: Vec<RangeInclusive<u32>>,
    advance: f32,
    monospace: bool,
}

impl BoxTypeface {
    /// Face covering `coverage` with `advance` font units per glyph.
    pub fn new(
        name: impl Into<String>,
        coverage: Vec<RangeInclusive<u32>>,
        advance: f32,
        monospace: bool,
    ) -> Self {
        Self {
            name: name.into(),
            coverage,
            advance,
            monospace,
        }
    }

    /// Codepoint drawn by `glyph`, the inverse of `glyph_index`.
    pub fn codepoint(&self, glyph: u16) -> Option<char> {
        if glyph == 0 {
            return None;
        }
        let mut remaining = u32::from(glyph) - 1;
        for range in &self.coverage {
            let len = range.end() - range.start() + 1;
            if remaining < len {
                return char::from_u32(range.start() + remaining);
            }
            remaining -= len;
        }
        None
    }

    fn glyph_box_for(&self, ch: char, scale: GlyphScale, x_shift: f32) -> GlyphBox {
        if ch.is_whitespace() {
            return GlyphBox::default();
        }
        let advance = self.advance_for(ch) * scale.x;
        let height_units = if ch.is_ascii_lowercase() { ASCENT * 0.6 } else { ASCENT * 0.9 };
        GlyphBox {
            left: (advance * 0.1 + x_shift).floor() as i32,
            top: (height_units * scale.y).ceil() as i32,
            width: ((advance * 0.8).ceil() as u32).max(1),
            height: ((height_units * scale.y).ceil() as u32).max(1),
        }
    }

    fn advance_for(&self, ch: char) -> f32 {
        if !self.monospace && matches!(ch, 'i' | 'l' | 'j' | '.' | ',' | '\'' | '|' | '!') {
            self.advance * 0.5
        } else {
            self.advance
        }
    }
}

impl Typeface for BoxTypeface {
    fn glyph_index(&self, ch: char) -> u16 {
        let cp = ch as u32;
        let mut index = 1u32;
        for range in &self.coverage {
            if range.contains(&cp) {
                return u16::try_from(index + (cp - range.start())).unwrap_or(0);
            }
            index += range.end() - range.start() + 1;
        }
        0
    }

    fn metrics(&self) -> FaceMetrics {
        FaceMetrics {
            units_per_em: UNITS_PER_EM,
            ascent: ASCENT,
            descent: DESCENT,
            is_monospace: self.monospace,
        }
    }

    fn advance(&self, glyph: u16) -> f32 {
        self.codepoint(glyph).map_or(0.0, |ch| self.advance_for(ch))
    }

    fn rasterize(&self, glyph: u16, scale: GlyphScale, x_shift: f32) -> Option<GlyphImage> {
        let bounds = self.glyph_box(glyph, scale, x_shift)?;
        let mut pixels = Vec::with_capacity((bounds.width * bounds.height * 4) as usize);
        for _ in 0..bounds.width * bounds.height {
            pixels.extend_from_slice(&[255, 255, 255, 255]);
        }
        Some(GlyphImage {
            bounds,
            pixels,
            is_colored: false,
        })
    }

    fn glyph_box(&self, glyph: u16, scale: GlyphScale, x_shift: f32) -> Option<GlyphBox> {
        let ch = self.codepoint(glyph)?;
        Some(self.glyph_box_for(ch, scale, x_shift))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Font source producing [`BoxTypeface`]s with script-appropriate coverage.
#[derive(Debug, Clone, Default)]
pub struct SyntheticFontSource {
    missing: HashSet<FontFile>,
}

impl SyntheticFontSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `file` fail to load, as if it were not installed.
    pub fn without(mut self, file: FontFile) -> Self {
        self.missing.insert(file);
        self
    }

    /// Codepoints the synthetic stand-in for `file` covers.
    pub fn coverage(file: FontFile) -> Vec<RangeInclusive<u32>> {
        const ASCII: RangeInclusive<u32> = 0x20..=0x7E;
        const CJK_PUNCT: RangeInclusive<u32> = 0x3000..=0x303F;
        match file {
            FontFile::IosevkaTerm => vec![
                ASCII,
                0xA0..=0x17F,
                0x2190..=0x21FF,
                0x2318..=0x2318,
                0x2500..=0x259F,
            ],
            FontFile::NotoSansSymbols => vec![0x2100..=0x214F, 0x2600..=0x26FF],
            FontFile::NotoSansSymbols2 => vec![0x2190..=0x21FF, 0x2B00..=0x2BFF],
            FontFile::SmolEmoji => vec![0x1F600..=0x1F64F],
            FontFile::NotoEmoji => vec![0x2700..=0x27BF, 0x1F300..=0x1FAFF],
            FontFile::NotoSansJp => vec![ASCII, CJK_PUNCT, 0x3040..=0x30FF, 0x4E00..=0x9FFF],
            FontFile::NotoSansSc => vec![ASCII, 0x2E80..=0x2FFF, CJK_PUNCT, 0x4E00..=0x9FFF],
            FontFile::NanumGothic => vec![ASCII, CJK_PUNCT, 0x3130..=0x318F, 0xAC00..=0xD7AF],
            FontFile::NotoSansArabicUi => vec![ASCII, 0x600..=0x6FF],
            _ => vec![ASCII, 0xA0..=0x24F, 0x2010..=0x2027],
        }
    }
}

impl FontSource for SyntheticFontSource {
    fn load(&self, file: FontFile) -> Result<FontBytes, FontError> {
        Err(FontError::NotFound(format!(
            "{} has no bytes in the synthetic source",
            file.file_name()
        )))
    }

    fn typeface(&self, file: FontFile) -> Result<Arc<dyn Typeface>, FontError> {
        if self.missing.contains(&file) {
            return Err(FontError::NotFound(file.file_name().to_string()));
        }
        let monospace = file == FontFile::IosevkaTerm;
        let advance = if monospace { 500.0 } else { 550.0 };
        Ok(Arc::new(BoxTypeface::new(
            file.file_name(),
            Self::coverage(file),
            advance,
            monospace,
        )))
    }

    /// Any path yields a face covering the Private Use Area.
    fn user_typeface(&self, path: &Path) -> Result<Arc<dyn Typeface>, FontError> {
        Ok(Arc::new(BoxTypeface::new(
            path.display().to_string(),
            vec![0xE000..=0xF8FF],
            600.0,
            false,
        )))
    }
}
