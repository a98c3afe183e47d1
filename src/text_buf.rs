//! Text pre-rendered into its own texture.

use runetype_config::Color;
use runetype_fonts::FontId;
use runetype_render::{BlendMode, Point, Rect, Renderer, Size, TextureId};

use crate::engine::{TextColor, TextEngine};
use crate::error::TextError;
use crate::layout;

/// How a [`TextBuf`] breaks its text into lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    SingleLine,
    /// Break at the glyph that passes the width.
    Bound(i32),
    /// Break at the last whitespace before the width.
    Wrap(i32),
}

/// A string rendered once and drawn many times.
///
/// The texture is tinted by the color passed to [`draw`](TextBuf::draw), so the
/// text is usually rendered in white. Empty text has no texture.
#[derive(Debug)]
pub struct TextBuf {
    texture: Option<TextureId>,
    size: Size,
}

impl TextBuf {
    pub fn new<R: Renderer>(
        engine: &mut TextEngine<R>,
        font: FontId,
        color: Color,
        text: &str,
    ) -> Result<Self, TextError> {
        Self::render(engine, font, color, Layout::SingleLine, text)
    }

    /// Render `text` with hard breaks at `bound_width`.
    pub fn new_bound<R: Renderer>(
        engine: &mut TextEngine<R>,
        font: FontId,
        color: Color,
        bound_width: i32,
        text: &str,
    ) -> Result<Self, TextError> {
        Self::render(engine, font, color, Layout::Bound(bound_width), text)
    }

    /// Render `text` word-wrapped to `wrap_width`.
    pub fn new_wrap<R: Renderer>(
        engine: &mut TextEngine<R>,
        font: FontId,
        color: Color,
        wrap_width: i32,
        text: &str,
    ) -> Result<Self, TextError> {
        Self::render(engine, font, color, Layout::Wrap(wrap_width), text)
    }

    fn render<R: Renderer>(
        engine: &mut TextEngine<R>,
        font: FontId,
        color: Color,
        mode: Layout,
        text: &str,
    ) -> Result<Self, TextError> {
        let size = match mode {
            Layout::SingleLine => engine.advance(font, text),
            Layout::Bound(width) | Layout::Wrap(width) => {
                let line_height = engine.line_height(font);
                let mut size = Size::default();
                let mut rest = text;
                while !rest.is_empty() {
                    let (line, next) = match mode {
                        Layout::Wrap(_) => engine.try_advance(font, rest, width),
                        _ => engine.try_advance_no_wrap(font, rest, width),
                    };
                    size.w = size.w.max(line.w);
                    size.h += line.h.max(line_height);
                    rest = &rest[layout::next_line(rest, next)..];
                }
                size
            }
        };
        if size.is_empty() {
            return Ok(Self {
                texture: None,
                size,
            });
        }

        let atlas_texture = engine.atlas().texture();
        let renderer = engine.renderer_mut();
        let texture = renderer.create_texture(size)?;
        let previous = renderer.render_target();
        if let Err(e) = renderer.set_render_target(Some(texture)) {
            renderer.destroy_texture(texture);
            return Err(e.into());
        }
        renderer.set_draw_color(Color::WHITE, 0);
        renderer.clear();
        // Copy glyph pixels verbatim; blending happens when the buffer is drawn.
        renderer.set_blend_mode(atlas_texture, BlendMode::None);

        let fg = TextColor::new(color).fill_background();
        match mode {
            Layout::SingleLine => engine.draw(font, Point::default(), fg, text),
            Layout::Wrap(width) => {
                engine.draw_wrap(font, Point::default(), width, fg, text);
            }
            Layout::Bound(width) => {
                let line_height = engine.line_height(font);
                let mut pos = Point::default();
                let mut rest = text;
                while !rest.is_empty() {
                    let (_, next) = engine.try_advance_no_wrap(font, rest, width);
                    let next = layout::next_line(rest, next);
                    engine.draw(font, pos, fg, &rest[..next]);
                    rest = &rest[next..];
                    pos.y += line_height;
                }
            }
        }

        let renderer = engine.renderer_mut();
        renderer.set_blend_mode(atlas_texture, BlendMode::Blend);
        if let Err(e) = renderer.set_render_target(previous) {
            renderer.destroy_texture(texture);
            return Err(e.into());
        }
        renderer.set_blend_mode(texture, BlendMode::Blend);
        log::debug!("Rendered text buffer {} ({} bytes)", size, text.len());
        Ok(Self {
            texture: Some(texture),
            size,
        })
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn texture(&self) -> Option<TextureId> {
        self.texture
    }

    /// Draw the buffer with its top-left at `pos`, tinted by `color`.
    pub fn draw<R: Renderer>(&self, renderer: &mut R, pos: Point, color: Color) {
        let Some(texture) = self.texture else {
            return;
        };
        renderer.set_color_mod(texture, color);
        let src = Rect::from_size(self.size);
        renderer.blit(texture, src, Rect::new(pos.x, pos.y, self.size.w, self.size.h));
    }

    /// Release the texture.
    pub fn destroy<R: Renderer>(self, renderer: &mut R) {
        if let Some(texture) = self.texture {
            renderer.destroy_texture(texture);
        }
    }
}
