//! The drawing capabilities the text engine needs from a host renderer.

use runetype_config::Color;

use crate::error::RenderError;
use crate::geometry::{Rect, Size};

/// Handle to a texture owned by a [`Renderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// How a texture combines with the target when blitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Source replaces destination, alpha included.
    None,
    /// Source-over alpha blending.
    #[default]
    Blend,
}

/// Texture and blit operations backed by a GPU or CPU surface.
///
/// Pixel data is straight (non-premultiplied) RGBA8, rows tightly packed.
/// A render target of `None` means the screen.
pub trait Renderer {
    /// Largest texture the renderer can allocate.
    fn max_texture_size(&self) -> Size;

    /// Allocate a transparent texture usable both as source and target.
    fn create_texture(&mut self, size: Size) -> Result<TextureId, RenderError>;

    fn destroy_texture(&mut self, texture: TextureId);

    fn texture_size(&self, texture: TextureId) -> Option<Size>;

    /// Replace the pixels of `rect` inside `texture`.
    fn upload(&mut self, texture: TextureId, rect: Rect, pixels: &[u8]) -> Result<(), RenderError>;

    fn render_target(&self) -> Option<TextureId>;

    fn set_render_target(&mut self, target: Option<TextureId>) -> Result<(), RenderError>;

    fn set_blend_mode(&mut self, texture: TextureId, mode: BlendMode);

    /// Multiply the texture's color channels by `color` when blitting.
    fn set_color_mod(&mut self, texture: TextureId, color: Color);

    /// Multiply the texture's alpha by `alpha / 255` when blitting.
    fn set_alpha_mod(&mut self, texture: TextureId, alpha: u8);

    /// Color used by [`fill_rect`](Renderer::fill_rect) and [`clear`](Renderer::clear).
    fn set_draw_color(&mut self, color: Color, alpha: u8);

    fn fill_rect(&mut self, rect: Rect);

    /// Fill the whole current target with the draw color.
    fn clear(&mut self);

    /// Copy `src` of `texture` to `dst` of the current target.
    fn blit(&mut self, texture: TextureId, src: Rect, dst: Rect);
}
