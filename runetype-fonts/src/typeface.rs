//! Typeface abstraction and its swash-backed implementation.

use std::sync::Arc;

use parking_lot::Mutex;
use swash::scale::image::Content;
use swash::scale::{Render, ScaleContext, Source, StrikeWith};
use swash::zeno::{Format, Transform, Vector};
use swash::{CacheKey, FontRef};

use crate::error::FontError;

/// Unscaled design metrics of a typeface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceMetrics {
    pub units_per_em: f32,
    /// Distance above the baseline, positive.
    pub ascent: f32,
    /// Distance below the baseline, positive.
    pub descent: f32,
    pub is_monospace: bool,
}

/// Pixels per font unit along each axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphScale {
    pub x: f32,
    pub y: f32,
}

/// Pixel box of a rasterized glyph relative to the pen position on the baseline.
///
/// `top` counts upward from the baseline, so the box spans
/// `baseline - top .. baseline - top + height` in y-down coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlyphBox {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl GlyphBox {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Rasterized glyph as straight RGBA, sized exactly to its box.
#[derive(Debug, Clone)]
pub struct GlyphImage {
    pub bounds: GlyphBox,
    pub pixels: Vec<u8>,
    /// True when the pixels carry their own color (emoji) and should not be tinted.
    pub is_colored: bool,
}

/// A parsed font face able to map characters, report metrics and rasterize.
pub trait Typeface: Send + Sync {
    /// Glyph index for `ch`, 0 when the face has no glyph for it.
    fn glyph_index(&self, ch: char) -> u16;

    fn metrics(&self) -> FaceMetrics;

    /// Horizontal advance of `glyph` in font units.
    fn advance(&self, glyph: u16) -> f32;

    /// Rasterize `glyph` at `scale`, shifted right by `x_shift` pixels.
    fn rasterize(&self, glyph: u16, scale: GlyphScale, x_shift: f32) -> Option<GlyphImage>;

    /// Pixel box `rasterize` would produce.
    fn glyph_box(&self, glyph: u16, scale: GlyphScale, x_shift: f32) -> Option<GlyphBox> {
        self.rasterize(glyph, scale, x_shift).map(|image| image.bounds)
    }

    /// Raw font bytes and face index for OpenType shaping, if available.
    fn shaping_data(&self) -> Option<(&[u8], u32)> {
        None
    }

    /// Name used in log messages.
    fn name(&self) -> &str;
}

/// Typeface backed by font bytes, parsed and rasterized with swash.
pub struct SwashTypeface {
    name: String,
    data: Arc<Vec<u8>>,
    index: u32,
    offset: u32,
    key: CacheKey,
    metrics: FaceMetrics,
    context: Mutex<ScaleContext>,
}

impl std::fmt::Debug for SwashTypeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwashTypeface")
            .field("name", &self.name)
            .field("data_len", &self.data.len())
            .field("index", &self.index)
            .finish()
    }
}

impl SwashTypeface {
    /// Parse face `index` of `data`.
    ///
    /// Collections (.ttc) hold several faces in the same bytes; pass 0 for
    /// single-face files.
    pub fn from_bytes(
        data: Arc<Vec<u8>>,
        index: u32,
        name: impl Into<String>,
    ) -> Result<Self, FontError> {
        let name = name.into();
        let font = FontRef::from_index(&data, index as usize)
            .ok_or_else(|| FontError::InvalidData(name.clone()))?;
        let raw = font.metrics(&[]);
        if raw.units_per_em == 0 {
            return Err(FontError::InvalidData(format!("{name}: zero units per em")));
        }
        let metrics = FaceMetrics {
            units_per_em: raw.units_per_em as f32,
            ascent: raw.ascent.abs(),
            descent: raw.descent.abs(),
            is_monospace: raw.is_monospace,
        };
        let (offset, key) = (font.offset, font.key);

        Ok(Self {
            name,
            data,
            index,
            offset,
            key,
            metrics,
            context: Mutex::new(ScaleContext::new()),
        })
    }

    fn font_ref(&self) -> FontRef<'_> {
        FontRef {
            data: self.data.as_slice(),
            offset: self.offset,
            key: self.key,
        }
    }
}

impl Typeface for SwashTypeface {
    fn glyph_index(&self, ch: char) -> u16 {
        self.font_ref().charmap().map(ch)
    }

    fn metrics(&self) -> FaceMetrics {
        self.metrics
    }

    fn advance(&self, glyph: u16) -> f32 {
        self.font_ref().glyph_metrics(&[]).advance_width(glyph)
    }

    fn rasterize(&self, glyph: u16, scale: GlyphScale, x_shift: f32) -> Option<GlyphImage> {
        let font = self.font_ref();
        let mut context = self.context.lock();
        let mut scaler = context
            .builder(font)
            .size(scale.y * self.metrics.units_per_em)
            .hint(false)
            .build();

        // Monospaced faces get a slightly narrower x scale to land advances on
        // whole pixels.
        let stretch = scale.x / scale.y;
        let transform = ((stretch - 1.0).abs() > f32::EPSILON).then(|| Transform::scale(stretch, 1.0));

        // Try color sources first so emoji fonts render as colored bitmaps.
        // Regular text fonts have no color data and fall through to Outline.
        let image = Render::new(&[
            Source::ColorBitmap(StrikeWith::BestFit),
            Source::ColorOutline(0),
            Source::Outline,
        ])
        .format(Format::Alpha)
        .offset(Vector::new(x_shift, 0.0))
        .transform(transform)
        .render(&mut scaler, glyph)?;

        let (pixels, is_colored) = match image.content {
            Content::Color => (image.data, true),
            Content::Mask => {
                let mut pixels = Vec::with_capacity(image.data.len() * 4);
                for &mask in &image.data {
                    pixels.extend_from_slice(&[255, 255, 255, mask]);
                }
                (pixels, false)
            }
            Content::SubpixelMask => {
                let mut pixels = Vec::with_capacity(image.data.len());
                for chunk in image.data.chunks_exact(4) {
                    let alpha = chunk[0].max(chunk[1]).max(chunk[2]);
                    pixels.extend_from_slice(&[255, 255, 255, alpha]);
                }
                (pixels, false)
            }
        };

        Some(GlyphImage {
            bounds: GlyphBox {
                left: image.placement.left,
                top: image.placement.top,
                width: image.placement.width,
                height: image.placement.height,
            },
            pixels,
            is_colored,
        })
    }

    /// Box of the scaled outline, without rendering coverage.
    ///
    /// Color glyphs and bitmap-only faces take the rasterizing path, since
    /// their box comes from the selected strike or layers.
    fn glyph_box(&self, glyph: u16, scale: GlyphScale, x_shift: f32) -> Option<GlyphBox> {
        let outline = {
            let font = self.font_ref();
            let mut context = self.context.lock();
            let mut scaler = context
                .builder(font)
                .size(scale.y * self.metrics.units_per_em)
                .hint(false)
                .build();
            if scaler.has_color_bitmaps() || scaler.has_color_outlines() {
                None
            } else {
                scaler.scale_outline(glyph)
            }
        };
        let Some(mut outline) = outline else {
            return self.rasterize(glyph, scale, x_shift).map(|image| image.bounds);
        };
        if outline.points().is_empty() {
            return Some(GlyphBox::default());
        }

        let stretch = scale.x / scale.y;
        if (stretch - 1.0).abs() > f32::EPSILON {
            outline.transform(&Transform::scale(stretch, 1.0));
        }
        // Same rounding as the rasterizer: outward to whole pixels after the shift.
        let bounds = outline.bounds();
        let left = (bounds.min.x + x_shift).floor();
        let right = (bounds.max.x + x_shift).ceil();
        let bottom = bounds.min.y.floor();
        let top = bounds.max.y.ceil();
        Some(GlyphBox {
            left: left as i32,
            top: top as i32,
            width: (right - left).max(0.0) as u32,
            height: (top - bottom).max(0.0) as u32,
        })
    }

    fn shaping_data(&self) -> Option<(&[u8], u32)> {
        Some((self.data.as_slice(), self.index))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_bytes_are_rejected() {
        let result = SwashTypeface::from_bytes(Arc::new(vec![0u8; 100]), 0, "garbage");
        assert!(matches!(result, Err(FontError::InvalidData(_))));
    }

    #[test]
    fn test_empty_bytes_are_rejected() {
        assert!(SwashTypeface::from_bytes(Arc::new(Vec::new()), 0, "empty").is_err());
    }

    /// First system face with outlines, if the host has any fonts installed.
    fn system_face() -> Option<SwashTypeface> {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        db.faces().find_map(|info| {
            let data = db.with_face_data(info.id, |data, index| (data.to_vec(), index))?;
            let face = SwashTypeface::from_bytes(Arc::new(data.0), data.1, info.post_script_name.clone()).ok()?;
            (face.glyph_index('A') != 0 && face.glyph_index('g') != 0).then_some(face)
        })
    }

    #[test]
    fn test_outline_box_matches_rasterized_box() {
        let Some(face) = system_face() else {
            return;
        };
        let upem = face.metrics().units_per_em;
        for (size, stretch) in [(12.0, 1.0), (17.0, 1.0), (15.0, 0.97)] {
            let scale = GlyphScale {
                x: size / upem * stretch,
                y: size / upem,
            };
            for ch in ['A', 'g', '.', 'W'] {
                let glyph = face.glyph_index(ch);
                for shift in [0.0, 0.5] {
                    let rasterized = face.rasterize(glyph, scale, shift).map(|image| image.bounds);
                    assert_eq!(
                        face.glyph_box(glyph, scale, shift),
                        rasterized,
                        "{ch:?} at {size}px shift {shift} in {}",
                        face.name()
                    );
                }
            }
        }
    }

    #[test]
    fn test_glyph_box_emptiness() {
        assert!(GlyphBox::default().is_empty());
        let b = GlyphBox {
            left: 0,
            top: 5,
            width: 3,
            height: 4,
        };
        assert!(!b.is_empty());
    }
}
