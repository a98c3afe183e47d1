use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use runetype_config::ShaperKind;

use super::simple::SimpleShaper;
use super::{ShapedGlyph, Shaper, ShapingFaces};
use crate::face::{FontFace, FontId};

/// Cache key: the face and the exact run text.
type ShapeKey = (FontId, String);

/// OpenType shaping through rustybuzz with an LRU cache of shaped runs.
///
/// Faces without raw font bytes (synthetic typefaces) are shaped with
/// [`SimpleShaper`] instead.
pub struct HarfBuzzShaper {
    cache: LruCache<ShapeKey, Arc<[ShapedGlyph]>>,
}

impl std::fmt::Debug for HarfBuzzShaper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HarfBuzzShaper")
            .field("cached", &self.cache.len())
            .field("capacity", &self.cache.cap())
            .finish()
    }
}

impl HarfBuzzShaper {
    pub fn new(cache_size: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
        }
    }

    /// Number of runs currently cached.
    pub fn cached_runs(&self) -> usize {
        self.cache.len()
    }

    fn shape_uncached<'a>(faces: &mut ShapingFaces<'a>, face: &'a FontFace, text: &str) -> Vec<ShapedGlyph> {
        let Some(shaping_face) = faces.get(face) else {
            return SimpleShaper::shape_uncached(face, text);
        };

        let mut buffer = rustybuzz::UnicodeBuffer::new();
        buffer.push_str(text);
        buffer.guess_segment_properties();

        let glyph_buffer = rustybuzz::shape(shaping_face, &[], buffer);
        let infos = glyph_buffer.glyph_infos();
        let positions = glyph_buffer.glyph_positions();

        infos
            .iter()
            .zip(positions.iter())
            .map(|(info, pos)| ShapedGlyph {
                glyph: u16::try_from(info.glyph_id).unwrap_or(0),
                cluster: info.cluster as usize,
                x_advance: pos.x_advance as f32 * face.x_scale,
                y_advance: pos.y_advance as f32 * face.y_scale,
                x_offset: pos.x_offset as f32 * face.x_scale,
                y_offset: pos.y_offset as f32 * face.y_scale,
            })
            .collect()
    }
}

impl Shaper for HarfBuzzShaper {
    fn kind(&self) -> ShaperKind {
        ShaperKind::HarfBuzz
    }

    fn shape<'a>(
        &mut self,
        faces: &mut ShapingFaces<'a>,
        face: &'a FontFace,
        text: &str,
    ) -> Arc<[ShapedGlyph]> {
        let key = (face.id, text.to_string());
        if let Some(cached) = self.cache.get(&key) {
            return Arc::clone(cached);
        }
        let shaped: Arc<[ShapedGlyph]> = Self::shape_uncached(faces, face, text).into();
        self.cache.put(key, Arc::clone(&shaped));
        shaped
    }

    fn clear_cache(&mut self) {
        self.cache.clear();
    }
}
