//! Text shaping: turning a run of text in one face into positioned glyphs.
//!
//! Two implementations are selectable at runtime through [`ShaperKind`]:
//! [`HarfBuzzShaper`] performs OpenType shaping with rustybuzz and caches the
//! results; [`SimpleShaper`] maps one codepoint to one glyph and sums advances.

mod harfbuzz;
mod simple;

use std::collections::HashMap;
use std::sync::Arc;

use runetype_config::ShaperKind;

use crate::face::{FontFace, FontId};

pub use harfbuzz::HarfBuzzShaper;
pub use simple::SimpleShaper;

/// A single positioned glyph, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapedGlyph {
    /// Glyph index in the face; 0 draws nothing.
    pub glyph: u16,
    /// Byte offset of the source cluster within the shaped text.
    pub cluster: usize,
    pub x_advance: f32,
    pub y_advance: f32,
    pub x_offset: f32,
    /// Upward offset from the baseline.
    pub y_offset: f32,
}

/// OpenType faces parsed for shaping, kept for one layout pass.
///
/// A parsed face borrows the font bytes of its [`FontFace`], so it can live
/// no longer than the registry borrow of the pass. Each face is parsed at
/// most once per pass and only when a run actually misses the shape cache.
#[derive(Default)]
pub struct ShapingFaces<'a> {
    faces: HashMap<FontId, Option<rustybuzz::Face<'a>>>,
}

impl<'a> ShapingFaces<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The parsed face for `face`, or `None` when it has no OpenType data.
    pub fn get(&mut self, face: &'a FontFace) -> Option<&rustybuzz::Face<'a>> {
        self.faces
            .entry(face.id)
            .or_insert_with(|| {
                let parsed = face
                    .typeface
                    .shaping_data()
                    .and_then(|(data, index)| rustybuzz::Face::from_slice(data, index));
                if parsed.is_some() {
                    log::trace!("Parsed shaping face for {:?}", face.id);
                }
                parsed
            })
            .as_ref()
    }

    /// Number of faces parsed so far, including ones without shaping data.
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

/// Converts text in a single face into positioned glyphs.
pub trait Shaper: Send {
    fn kind(&self) -> ShaperKind;

    /// Shape `text`, which must be drawable by `face` alone.
    ///
    /// `faces` holds the parsed OpenType faces of the current pass.
    fn shape<'a>(
        &mut self,
        faces: &mut ShapingFaces<'a>,
        face: &'a FontFace,
        text: &str,
    ) -> Arc<[ShapedGlyph]>;

    /// Drop cached results; called whenever the font table is rebuilt.
    fn clear_cache(&mut self);
}

/// Construct the shaper selected by `kind`.
pub fn create_shaper(kind: ShaperKind, cache_size: usize) -> Box<dyn Shaper> {
    match kind {
        ShaperKind::HarfBuzz => Box::new(HarfBuzzShaper::new(cache_size)),
        ShaperKind::Simple => Box::new(SimpleShaper),
    }
}
