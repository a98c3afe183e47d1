//! Rendering side of runetype.
//!
//! Defines the [`Renderer`] capability the engine draws through, a CPU
//! [`SoftwareRenderer`] implementing it, and the [`GlyphAtlas`] that caches
//! rasterized glyphs in a single renderer texture.

pub mod atlas;
pub mod error;
pub mod geometry;
pub mod renderer;
pub mod software;

pub use atlas::{CacheRow, Glyph, GlyphAtlas, GlyphKey, GlyphRequest, HALF_PIXEL, VARIANTS};
pub use error::RenderError;
pub use geometry::{Point, Rect, Size};
pub use renderer::{BlendMode, Renderer, TextureId};
pub use software::{DEFAULT_MAX_TEXTURE, DrawCall, SoftwareRenderer};
