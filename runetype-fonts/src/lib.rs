//! Font management and text shaping for the runetype text engine.
//!
//! This crate provides:
//! - A catalog of bundled font files and sources that load them (system
//!   fonts via fontdb, a font directory, or synthetic box faces)
//! - The [`FontRegistry`]: a fixed table of sized faces built from the text
//!   configuration, with each font file loaded once and shared
//! - Glyph resolution through an ordered, data-driven fallback rule list
//! - Shaping via rustybuzz (with an LRU cache) or a simple advance-summing shaper
//!
//! # Architecture
//!
//! `FontRegistry::build` turns a [`TextConfig`](runetype_config::TextConfig)
//! into faces. `FontRegistry::resolve` maps `(base font, char)` to the face and
//! glyph index that should draw it. A [`Shaper`] then positions the glyphs of
//! a run that resolved to a single face.

pub mod catalog;
pub mod error;
pub mod face;
pub mod registry;
pub mod resolver;
pub mod shaper;
pub mod source;
pub mod synthetic;
pub mod typeface;

// Re-export main types for convenience
pub use catalog::{FontFile, Style};
pub use error::FontError;
pub use face::{FallbackSet, Family, FontFace, FontId, SizeClass};
pub use registry::FontRegistry;
pub use resolver::{CodepointFilter, FallbackRule, FallbackTarget, Resolved, is_ignorable};
pub use shaper::{
    HarfBuzzShaper, ShapedGlyph, Shaper, ShapingFaces, SimpleShaper, create_shaper,
};
pub use source::{DirectoryFontSource, FontBytes, FontSource, SystemFontSource};
pub use synthetic::{BoxTypeface, SyntheticFontSource};
pub use typeface::{FaceMetrics, GlyphBox, GlyphImage, GlyphScale, SwashTypeface, Typeface};
