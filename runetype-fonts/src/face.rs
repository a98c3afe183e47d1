//! Sized font faces and the identifiers that name them.

use std::path::PathBuf;
use std::sync::Arc;

use crate::catalog::FontFile;
use crate::typeface::{GlyphBox, GlyphImage, GlyphScale, Typeface};

/// Index of a face in the registry's fixed table.
///
/// The first [`FontId::PRIMARY_COUNT`] ids are the named faces below; after
/// them come the fallback sets, each instantiated at every [`SizeClass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontId(pub u16);

impl FontId {
    pub const DEFAULT: FontId = FontId(0);
    pub const DEFAULT_MEDIUM: FontId = FontId(1);
    pub const DEFAULT_BIG: FontId = FontId(2);
    pub const DEFAULT_LARGE: FontId = FontId(3);
    pub const DEFAULT_TINY: FontId = FontId(4);
    pub const DEFAULT_BOLD: FontId = FontId(5);
    pub const DEFAULT_MEDIUM_BOLD: FontId = FontId(6);
    pub const DEFAULT_BIG_BOLD: FontId = FontId(7);
    pub const DEFAULT_LARGE_BOLD: FontId = FontId(8);
    pub const REGULAR: FontId = FontId(9);
    pub const BOLD: FontId = FontId(10);
    pub const ITALIC: FontId = FontId(11);
    pub const MEDIUM: FontId = FontId(12);
    pub const BIG: FontId = FontId(13);
    pub const LARGE_BOLD: FontId = FontId(14);
    pub const LARGE_LIGHT: FontId = FontId(15);
    pub const HUGE_BOLD: FontId = FontId(16);
    pub const MONOSPACE_SMALL: FontId = FontId(17);
    pub const MONOSPACE: FontId = FontId(18);
    pub const DEFAULT_CONTENT: FontId = FontId(19);
    pub const DEFAULT_CONTENT_SMALL: FontId = FontId(20);

    pub const PRIMARY_COUNT: u16 = 21;

    /// Total number of ids in the table.
    pub const COUNT: u16 =
        Self::PRIMARY_COUNT + FallbackSet::COUNT as u16 * SizeClass::COUNT as u16;

    /// The face of fallback `set` matching `class`.
    pub const fn fallback(set: FallbackSet, class: SizeClass) -> FontId {
        FontId(Self::PRIMARY_COUNT + set as u16 * SizeClass::COUNT as u16 + class as u16)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Fallback set and size class, for ids past the primary range.
    pub fn as_fallback(self) -> Option<(FallbackSet, SizeClass)> {
        let offset = self.0.checked_sub(Self::PRIMARY_COUNT)?;
        let set = FallbackSet::ALL.get((offset / SizeClass::COUNT as u16) as usize)?;
        let class = SizeClass::ALL[(offset % SizeClass::COUNT as u16) as usize];
        Some((*set, class))
    }
}

/// Size tier; fallback faces exist once per class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeClass {
    UiNormal,
    UiMedium,
    UiBig,
    UiLarge,
    Normal,
    Medium,
    Big,
    Large,
    Huge,
    MonoSmall,
    Mono,
}

impl SizeClass {
    pub const COUNT: usize = 11;

    pub const ALL: [SizeClass; Self::COUNT] = [
        SizeClass::UiNormal,
        SizeClass::UiMedium,
        SizeClass::UiBig,
        SizeClass::UiLarge,
        SizeClass::Normal,
        SizeClass::Medium,
        SizeClass::Big,
        SizeClass::Large,
        SizeClass::Huge,
        SizeClass::MonoSmall,
        SizeClass::Mono,
    ];

    /// Pixel size of this class given the UI and content text sizes.
    pub fn pixel_size(self, ui_size: f32, text_size: f32) -> f32 {
        match self {
            SizeClass::UiNormal => ui_size,
            SizeClass::UiMedium => ui_size * 1.125,
            SizeClass::UiBig => ui_size * 1.333,
            SizeClass::UiLarge => ui_size * 1.666,
            SizeClass::Normal => text_size,
            SizeClass::Medium => text_size * 1.2,
            SizeClass::Big => text_size * 1.333,
            SizeClass::Large => text_size * 1.666,
            SizeClass::Huge => text_size * 2.0,
            SizeClass::MonoSmall => text_size * MONO_SCALE * 0.8,
            SizeClass::Mono => text_size * MONO_SCALE,
        }
    }
}

/// Monospace text size relative to content text.
pub const MONO_SCALE: f32 = 0.71;

/// Secondary font families consulted when the base font lacks a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FallbackSet {
    UserSymbols,
    Iosevka,
    NotoSymbols,
    NotoSymbols2,
    SmolEmoji,
    NotoEmoji,
    Japanese,
    SimplifiedChinese,
    Korean,
    Arabic,
}

impl FallbackSet {
    pub const COUNT: usize = 10;

    pub const ALL: [FallbackSet; Self::COUNT] = [
        FallbackSet::UserSymbols,
        FallbackSet::Iosevka,
        FallbackSet::NotoSymbols,
        FallbackSet::NotoSymbols2,
        FallbackSet::SmolEmoji,
        FallbackSet::NotoEmoji,
        FallbackSet::Japanese,
        FallbackSet::SimplifiedChinese,
        FallbackSet::Korean,
        FallbackSet::Arabic,
    ];

    /// Bundled file for the set; the user set comes from configuration.
    pub fn file(self) -> Option<FontFile> {
        match self {
            FallbackSet::UserSymbols => None,
            FallbackSet::Iosevka => Some(FontFile::IosevkaTerm),
            FallbackSet::NotoSymbols => Some(FontFile::NotoSansSymbols),
            FallbackSet::NotoSymbols2 => Some(FontFile::NotoSansSymbols2),
            FallbackSet::SmolEmoji => Some(FontFile::SmolEmoji),
            FallbackSet::NotoEmoji => Some(FontFile::NotoEmoji),
            FallbackSet::Japanese => Some(FontFile::NotoSansJp),
            FallbackSet::SimplifiedChinese => Some(FontFile::NotoSansSc),
            FallbackSet::Korean => Some(FontFile::NanumGothic),
            FallbackSet::Arabic => Some(FontFile::NotoSansArabicUi),
        }
    }

    /// Size of the set's glyphs relative to the line height of its class.
    pub fn glyph_scale(self) -> f32 {
        match self {
            FallbackSet::Iosevka => 0.866,
            FallbackSet::NotoSymbols | FallbackSet::NotoSymbols2 => 1.45,
            FallbackSet::NotoEmoji => 1.10,
            _ => 1.0,
        }
    }
}

/// Where a face's typeface came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Family {
    Bundled(FontFile),
    User(PathBuf),
}

/// A typeface instantiated at one pixel size.
pub struct FontFace {
    pub id: FontId,
    pub family: Family,
    pub typeface: Arc<dyn Typeface>,
    pub x_scale: f32,
    pub y_scale: f32,
    /// Distance from the top of the line to the baseline, in pixels.
    pub baseline: f32,
    /// Line height in pixels.
    pub height: i32,
    /// Extra downward shift that recenters glyphs scaled away from 1.0.
    pub vert_offset: f32,
    pub monospaced: bool,
    pub size_class: SizeClass,
    ascii: [u16; 96],
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("id", &self.id)
            .field("family", &self.family)
            .field("typeface", &self.typeface.name())
            .field("height", &self.height)
            .field("x_scale", &self.x_scale)
            .field("size_class", &self.size_class)
            .finish()
    }
}

impl FontFace {
    /// Instantiate `typeface` with a line height of `size` pixels.
    ///
    /// `glyph_scale` shrinks or grows the glyphs inside that line without
    /// changing the line height.
    pub fn new(
        id: FontId,
        family: Family,
        typeface: Arc<dyn Typeface>,
        size: f32,
        glyph_scale: f32,
        size_class: SizeClass,
    ) -> Self {
        let metrics = typeface.metrics();
        let height = size.round().max(1.0) as i32;
        let extent = (metrics.ascent + metrics.descent).max(1.0);
        let y_scale = height as f32 / extent * glyph_scale;
        let mut x_scale = y_scale;

        let monospaced = metrics.is_monospace || family == Family::Bundled(FontFile::IosevkaTerm);
        if monospaced {
            let m = typeface.glyph_index('M');
            let advance = typeface.advance(m) * x_scale;
            if advance > 4.0 {
                x_scale *= advance.floor() / advance;
            }
        }

        let mut vert_offset = height as f32 * (1.0 - glyph_scale) / 2.0;
        if let Family::Bundled(file) = &family
            && file.halves_vertical_offset()
        {
            vert_offset /= 2.0;
        }

        let mut ascii = [0u16; 96];
        for (slot, cp) in ascii.iter_mut().zip(32u8..=127) {
            *slot = typeface.glyph_index(cp as char);
        }

        Self {
            id,
            family,
            baseline: metrics.ascent * y_scale,
            typeface,
            x_scale,
            y_scale,
            height,
            vert_offset,
            monospaced,
            size_class,
            ascii,
        }
    }

    /// Glyph index for `ch`, 0 if the face lacks it.
    pub fn glyph_index(&self, ch: char) -> u16 {
        match ch as u32 {
            cp @ 32..=127 => self.ascii[(cp - 32) as usize],
            _ => self.typeface.glyph_index(ch),
        }
    }

    /// Advance of `glyph` in pixels.
    pub fn advance(&self, glyph: u16) -> f32 {
        self.typeface.advance(glyph) * self.x_scale
    }

    pub fn scale(&self) -> GlyphScale {
        GlyphScale {
            x: self.x_scale,
            y: self.y_scale,
        }
    }

    pub fn glyph_box(&self, glyph: u16, x_shift: f32) -> Option<GlyphBox> {
        self.typeface.glyph_box(glyph, self.scale(), x_shift)
    }

    pub fn rasterize(&self, glyph: u16, x_shift: f32) -> Option<GlyphImage> {
        self.typeface.rasterize(glyph, self.scale(), x_shift)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_ids_round_trip() {
        for set in FallbackSet::ALL {
            for class in SizeClass::ALL {
                let id = FontId::fallback(set, class);
                assert!(id.0 < FontId::COUNT);
                assert_eq!(id.as_fallback(), Some((set, class)));
            }
        }
        assert_eq!(FontId::MONOSPACE.as_fallback(), None);
        assert_eq!(FontId(FontId::COUNT).as_fallback(), None);
    }
}
