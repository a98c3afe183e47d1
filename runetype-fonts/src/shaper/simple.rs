use std::sync::Arc;

use runetype_config::ShaperKind;

use super::{ShapedGlyph, Shaper, ShapingFaces};
use crate::face::FontFace;
use crate::resolver::is_ignorable;

/// One glyph per codepoint, no kerning or ligatures.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleShaper;

impl SimpleShaper {
    pub fn shape_uncached(face: &FontFace, text: &str) -> Vec<ShapedGlyph> {
        text.char_indices()
            .filter(|(_, ch)| !is_ignorable(*ch))
            .map(|(cluster, ch)| {
                let glyph = face.glyph_index(ch);
                let x_advance = if glyph == 0 { 0.0 } else { face.advance(glyph) };
                ShapedGlyph {
                    glyph,
                    cluster,
                    x_advance,
                    y_advance: 0.0,
                    x_offset: 0.0,
                    y_offset: 0.0,
                }
            })
            .collect()
    }
}

impl Shaper for SimpleShaper {
    fn kind(&self) -> ShaperKind {
        ShaperKind::Simple
    }

    fn shape<'a>(
        &mut self,
        _faces: &mut ShapingFaces<'a>,
        face: &'a FontFace,
        text: &str,
    ) -> Arc<[ShapedGlyph]> {
        Self::shape_uncached(face, text).into()
    }

    fn clear_cache(&mut self) {}
}
