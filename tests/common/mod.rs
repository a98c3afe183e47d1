//! Shared integration test helpers for runetype.
//!
//! Include with `mod common;` at the top of a test file. Engines built here
//! use synthetic box glyphs and the software renderer, so no system fonts or
//! GPU are needed.

#![allow(dead_code)]

use std::sync::Arc;

use runetype::config::ShaperKind;
use runetype::fonts::{
    FontFace, ShapedGlyph, Shaper, ShapingFaces, SimpleShaper, SyntheticFontSource,
};
use runetype::{Size, SoftwareRenderer, TextConfig, TextEngine};

pub const SCREEN: Size = Size::new(400, 200);

/// Engine over synthetic fonts with the default configuration.
pub fn engine() -> TextEngine<SoftwareRenderer> {
    engine_with(TextConfig::default())
}

pub fn engine_with(config: TextConfig) -> TextEngine<SoftwareRenderer> {
    TextEngine::new(
        SoftwareRenderer::new(SCREEN),
        config,
        Box::new(SyntheticFontSource::new()),
    )
    .expect("synthetic engine should build")
}

/// Number of screen pixels with any coverage.
pub fn covered_pixels(renderer: &SoftwareRenderer) -> usize {
    renderer
        .screen_pixels()
        .chunks_exact(4)
        .filter(|px| px[3] > 0)
        .count()
}

/// Shapes every two characters as one cluster, one glyph per character,
/// the way ligature-free scripts with combining clusters come back from
/// OpenType shaping.
#[derive(Debug, Default)]
pub struct PairClusterShaper;

impl Shaper for PairClusterShaper {
    fn kind(&self) -> ShaperKind {
        ShaperKind::Simple
    }

    fn shape<'a>(
        &mut self,
        _faces: &mut ShapingFaces<'a>,
        face: &'a FontFace,
        text: &str,
    ) -> Arc<[ShapedGlyph]> {
        let starts: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        SimpleShaper::shape_uncached(face, text)
            .into_iter()
            .map(|mut glyph| {
                let n = starts.partition_point(|&start| start < glyph.cluster);
                glyph.cluster = starts[n - n % 2];
                glyph
            })
            .collect()
    }

    fn clear_cache(&mut self) {}
}

/// Engine whose shaper merges character pairs into clusters.
pub fn pair_cluster_engine() -> TextEngine<SoftwareRenderer> {
    let mut engine = engine();
    engine.set_shaper(Box::new(PairClusterShaper));
    engine
}
