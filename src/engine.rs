//! The text engine: registry, atlas and shaper behind one explicit context.

use runetype_config::{Color, TextConfig, TextFont};
use runetype_fonts::{FontId, FontRegistry, FontSource, Shaper, ShapingFaces, create_shaper};
use runetype_render::{
    GlyphAtlas, GlyphKey, GlyphRequest, Point, Rect, Renderer, Size, VARIANTS,
};

use crate::block_chars::{self, BlockMode};
use crate::error::TextError;
use crate::layout::{self, LayoutContext, RunFlags, RunMode, RunOutput, RunRequest};
use crate::segment::{AttributedRun, segment};

/// Tolerance under which a content size change is ignored.
const SIZE_EPSILON: f32 = 0.001;

/// Horizontal placement for [`TextEngine::draw_aligned`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Foreground color of a draw call plus how it interacts with inline colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextColor {
    pub color: Color,
    /// Inline color directives do not override this color.
    pub permanent: bool,
    /// Fill glyph boxes with the renderer draw color before drawing.
    pub fill_background: bool,
}

impl TextColor {
    pub const fn new(color: Color) -> Self {
        Self {
            color,
            permanent: false,
            fill_background: false,
        }
    }

    pub const fn permanent(mut self) -> Self {
        self.permanent = true;
        self
    }

    pub const fn fill_background(mut self) -> Self {
        self.fill_background = true;
        self
    }

    fn flags(self) -> RunFlags {
        RunFlags {
            permanent_color: self.permanent,
            fill_background: self.fill_background,
            ..RunFlags::default()
        }
    }
}

impl From<Color> for TextColor {
    fn from(color: Color) -> Self {
        Self::new(color)
    }
}

/// Text shaping and glyph caching over a [`Renderer`].
///
/// Owns the font registry, the glyph atlas and the shaper. Everything is
/// synchronous; configuration changes take `&mut self` so they never overlap
/// a layout call.
pub struct TextEngine<R: Renderer> {
    renderer: R,
    config: TextConfig,
    source: Box<dyn FontSource>,
    registry: FontRegistry,
    atlas: GlyphAtlas,
    shaper: Box<dyn Shaper>,
    opacity: f32,
}

impl<R: Renderer> std::fmt::Debug for TextEngine<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextEngine")
            .field("registry", &self.registry)
            .field("atlas", &self.atlas)
            .field("shaper", &self.shaper.kind())
            .finish()
    }
}

impl<R: Renderer> TextEngine<R> {
    /// Build the registry, atlas and shaper for `config`.
    pub fn new(
        mut renderer: R,
        config: TextConfig,
        source: Box<dyn FontSource>,
    ) -> Result<Self, TextError> {
        config.validate()?;
        let registry = FontRegistry::build(&config, source.as_ref())?;
        let atlas = GlyphAtlas::new(&mut renderer, registry.text_size(), registry.ui_size())?;
        let shaper = create_shaper(config.shaper, config.shape_cache_size);
        log::info!(
            "Text engine ready: content={} heading={} text_size={:.1} shaper={:?}",
            config.content_font,
            config.heading_font,
            registry.text_size(),
            config.shaper
        );
        Ok(Self {
            renderer,
            config,
            source,
            registry,
            atlas,
            shaper,
            opacity: 1.0,
        })
    }

    /// Replace the configuration, rebuilding fonts, atlas and shaper.
    ///
    /// On failure the engine keeps its previous state.
    pub fn configure(&mut self, config: TextConfig) -> Result<(), TextError> {
        config.validate()?;
        let registry = FontRegistry::build(&config, self.source.as_ref())?;
        let atlas = GlyphAtlas::new(&mut self.renderer, registry.text_size(), registry.ui_size())?;
        std::mem::replace(&mut self.atlas, atlas).destroy(&mut self.renderer);
        self.registry = registry;
        if config.shaper == self.shaper.kind() {
            self.shaper.clear_cache();
        } else {
            self.shaper = create_shaper(config.shaper, config.shape_cache_size);
        }
        self.config = config;
        self.apply_opacity();
        log::info!(
            "Text engine reconfigured: content={} heading={} text_size={:.1}",
            self.config.content_font,
            self.config.heading_font,
            self.registry.text_size()
        );
        Ok(())
    }

    pub fn config(&self) -> &TextConfig {
        &self.config
    }

    /// Replace the shaper until the next configuration change of `shaper`.
    pub fn set_shaper(&mut self, shaper: Box<dyn Shaper>) {
        log::debug!("Shaper replaced with {:?}", shaper.kind());
        self.shaper = shaper;
    }

    /// Switch the content font; rebuilds only when it changes.
    pub fn set_content_font(&mut self, font: TextFont) -> Result<(), TextError> {
        if self.config.content_font == font {
            return Ok(());
        }
        let config = TextConfig {
            content_font: font,
            ..self.config.clone()
        };
        self.configure(config)
    }

    /// Switch the heading font; rebuilds only when it changes.
    pub fn set_heading_font(&mut self, font: TextFont) -> Result<(), TextError> {
        if self.config.heading_font == font {
            return Ok(());
        }
        let config = TextConfig {
            heading_font: font,
            ..self.config.clone()
        };
        self.configure(config)
    }

    /// Change the content size factor; changes under 0.001 are ignored.
    pub fn set_content_font_size(&mut self, factor: f32) -> Result<(), TextError> {
        if (self.config.content_font_size - factor).abs() <= SIZE_EPSILON {
            return Ok(());
        }
        let config = TextConfig {
            content_font_size: factor,
            ..self.config.clone()
        };
        self.configure(config)
    }

    pub fn line_height(&self, font: FontId) -> i32 {
        self.registry.face_or_default(font).height
    }

    fn run(&mut self, request: &RunRequest<'_>) -> RunOutput {
        let mut ctx = LayoutContext {
            registry: &self.registry,
            atlas: &mut self.atlas,
            shaper: self.shaper.as_mut(),
            renderer: &mut self.renderer,
            palette: &self.config.palette,
            half_pixel: self.config.half_pixel_glyphs,
        };
        layout::run(&mut ctx, request)
    }

    /// Size of the advance box of `text`; empty text is one line tall.
    pub fn measure(&mut self, font: FontId, text: &str) -> Size {
        if text.is_empty() {
            return Size::new(0, self.line_height(font));
        }
        self.run(&RunRequest::measure(font, text)).bounds.size()
    }

    /// Union of the pixels `text` would cover when drawn at the origin.
    pub fn visual_bounds(&mut self, font: FontId, text: &str) -> Rect {
        let request = RunRequest {
            flags: RunFlags {
                visual: true,
                ..RunFlags::default()
            },
            ..RunRequest::measure(font, text)
        };
        self.run(&request).bounds
    }

    /// Pen advance and height of `text`.
    pub fn advance(&mut self, font: FontId, text: &str) -> Size {
        let out = self.run(&RunRequest::measure(font, text));
        Size::new(out.advance, out.bounds.h)
    }

    /// Pen advance of the first `n` characters, one line tall.
    pub fn advance_n(&mut self, font: FontId, text: &str, n: usize) -> Size {
        let line_height = self.line_height(font);
        if n == 0 {
            return Size::new(0, line_height);
        }
        let request = RunRequest {
            max_chars: Some(n),
            ..RunRequest::measure(font, text)
        };
        Size::new(self.run(&request).advance, line_height)
    }

    fn try_advance_with(&mut self, font: FontId, text: &str, width: i32, no_wrap: bool) -> (Size, usize) {
        let request = RunRequest {
            flags: RunFlags {
                stop_at_newline: true,
                no_wrap,
                ..RunFlags::default()
            },
            wrap_width: Some(width),
            ..RunRequest::measure(font, text)
        };
        let out = self.run(&request);
        let height = out.bounds.h.max(self.line_height(font));
        (Size::new(out.advance, height), out.continue_from)
    }

    /// Fit one line of `text` into `width`, breaking at the last whitespace.
    ///
    /// Returns the line's size and the byte offset where the next line starts.
    /// A newline always ends the line. At least one glyph is taken, so the
    /// offset is past 0 whenever `text` is not empty.
    pub fn try_advance(&mut self, font: FontId, text: &str, width: i32) -> (Size, usize) {
        self.try_advance_with(font, text, width, false)
    }

    /// Like [`try_advance`](Self::try_advance) but breaks at the overflowing glyph.
    pub fn try_advance_no_wrap(&mut self, font: FontId, text: &str, width: i32) -> (Size, usize) {
        self.try_advance_with(font, text, width, true)
    }

    /// Size of `text` word-wrapped to `max_width`.
    pub fn advance_wrap(&mut self, font: FontId, max_width: i32, text: &str) -> Size {
        let mut size = Size::default();
        let mut rest = text;
        while !rest.is_empty() {
            let (line, next) = self.try_advance(font, rest, max_width);
            size.w = size.w.max(line.w);
            size.h += line.h;
            rest = &rest[layout::next_line(rest, next)..];
        }
        size
    }

    fn draw_request(&mut self, request: RunRequest<'_>, color: TextColor) {
        let request = RunRequest {
            flags: RunFlags {
                visual: request.flags.visual,
                ..color.flags()
            },
            ..request
        };
        self.run(&request);
    }

    /// Draw `text` with its top-left at `pos`.
    pub fn draw(&mut self, font: FontId, pos: Point, color: impl Into<TextColor>, text: &str) {
        let color = color.into();
        self.draw_request(RunRequest::draw(font, text, pos, color.color), color);
    }

    /// Draw the first `max_chars` characters of `text`.
    pub fn draw_n(
        &mut self,
        font: FontId,
        pos: Point,
        color: impl Into<TextColor>,
        text: &str,
        max_chars: usize,
    ) {
        let color = color.into();
        let request = RunRequest {
            max_chars: Some(max_chars),
            ..RunRequest::draw(font, text, pos, color.color)
        };
        self.draw_request(request, color);
    }

    /// Draw already-wrapped text, skipping glyphs past `pos.x + bound_width`.
    pub fn draw_bounded(
        &mut self,
        font: FontId,
        pos: Point,
        bound_width: i32,
        color: impl Into<TextColor>,
        text: &str,
    ) {
        let color = color.into();
        let request = RunRequest {
            layout_bound: Some(pos.x + bound_width),
            ..RunRequest::draw(font, text, pos, color.color)
        };
        self.draw_request(request, color);
    }

    /// Word-wrap `text` to `max_width` and draw it line by line.
    ///
    /// Returns the y just below the last line.
    pub fn draw_wrap(
        &mut self,
        font: FontId,
        mut pos: Point,
        max_width: i32,
        color: impl Into<TextColor>,
        text: &str,
    ) -> i32 {
        let color = color.into();
        let line_height = self.line_height(font);
        let mut rest = text;
        while !rest.is_empty() {
            let (line, next) = self.try_advance(font, rest, max_width);
            let next = layout::next_line(rest, next);
            self.draw(font, pos, color, &rest[..next]);
            rest = &rest[next..];
            pos.y += line.h.max(line_height);
        }
        pos.y
    }

    /// Draw `text` with `pos` at its left edge, center or right edge.
    pub fn draw_aligned(
        &mut self,
        font: FontId,
        mut pos: Point,
        color: impl Into<TextColor>,
        align: Alignment,
        text: &str,
    ) {
        match align {
            Alignment::Left => {}
            Alignment::Center => pos.x -= self.measure(font, text).w / 2,
            Alignment::Right => pos.x -= self.measure(font, text).w,
        }
        self.draw(font, pos, color, text);
    }

    /// Draw `text` four times offset diagonally by one pixel, then the fill on top.
    pub fn draw_outline(
        &mut self,
        font: FontId,
        pos: Point,
        outline: Color,
        fill: Option<Color>,
        text: &str,
    ) {
        for offset in outline_offsets() {
            self.draw(font, pos + offset, outline, text);
        }
        if let Some(fill) = fill {
            self.draw(font, pos, fill, text);
        }
    }

    /// Draw `text` centered in `rect`, never left of its left edge.
    ///
    /// With `align_visual` the visible pixels are centered instead of the
    /// advance box.
    pub fn draw_centered(
        &mut self,
        font: FontId,
        rect: Rect,
        align_visual: bool,
        color: impl Into<TextColor>,
        text: &str,
    ) {
        let bounds = if align_visual {
            self.visual_bounds(font, text)
        } else {
            Rect::from_size(self.advance(font, text))
        };
        let x = rect.x + rect.w / 2 - (bounds.x + bounds.w / 2);
        let y = rect.y + rect.h / 2 - (bounds.y + bounds.h / 2);
        self.draw(font, Point::new(x.max(rect.x), y), color, text);
    }

    /// [`draw_centered`](Self::draw_centered) with an optional outline.
    pub fn draw_centered_outline(
        &mut self,
        font: FontId,
        rect: Rect,
        align_visual: bool,
        outline: Option<Color>,
        fill: Option<Color>,
        text: &str,
    ) {
        if let Some(outline) = outline {
            for offset in outline_offsets() {
                let moved = rect.offset(offset.x, offset.y);
                self.draw_centered(font, moved, align_visual, outline, text);
            }
        }
        if let Some(fill) = fill {
            self.draw_centered(font, rect, align_visual, fill, text);
        }
    }

    /// Rasterize the glyphs of `text` ahead of drawing.
    ///
    /// Every variant a draw may select is prepared, so drawing `text` later at
    /// any position writes nothing to the atlas.
    pub fn cache(&mut self, font: FontId, text: &str) {
        let runs = self.segment(font, Color::WHITE, text);
        let variants = if self.config.half_pixel_glyphs { VARIANTS } else { 1 };
        let mut faces = ShapingFaces::new();
        let mut requests = Vec::new();
        for run in &runs {
            let face = self.registry.face_or_default(run.font);
            for glyph in self.shaper.shape(&mut faces, face, run.text(text)).iter() {
                if glyph.glyph != 0 {
                    let key = GlyphKey::new(run.font, glyph.glyph);
                    requests.extend((0..variants).map(|variant| GlyphRequest { key, variant }));
                }
            }
        }
        self.atlas
            .cache_glyphs(&self.registry, &mut self.renderer, &requests);
    }

    /// Render `text` in the typeface of `font` as block characters, `height`
    /// rows tall. Fallback fonts are not consulted.
    pub fn render_block_chars(&self, font: FontId, height: i32, mode: BlockMode, text: &str) -> String {
        let face = self.registry.face_or_default(font);
        block_chars::render_block_chars(face.typeface.as_ref(), height, mode, text)
    }

    /// Global opacity of drawn text, clamped to `0.0..=1.0`.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
        self.apply_opacity();
    }

    fn apply_opacity(&mut self) {
        let alpha = (self.opacity * 255.0 + 0.5) as u8;
        self.renderer.set_alpha_mod(self.atlas.texture(), alpha);
    }

    /// Split `text` into attributed runs over `font` and `color`.
    pub fn segment(&self, font: FontId, color: Color, text: &str) -> Vec<AttributedRun> {
        segment(&self.registry, text, font, color, &self.config.palette)
    }

    /// Measure or draw an arbitrary request.
    pub fn layout(&mut self, request: &RunRequest<'_>) -> RunOutput {
        if request.mode == RunMode::Draw {
            log::trace!("Drawing {} bytes at {:?}", request.text.len(), request.origin);
        }
        self.run(request)
    }

    pub fn atlas(&self) -> &GlyphAtlas {
        &self.atlas
    }

    pub fn registry(&self) -> &FontRegistry {
        &self.registry
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Release the atlas and hand the renderer back.
    pub fn into_renderer(self) -> R {
        let mut renderer = self.renderer;
        self.atlas.destroy(&mut renderer);
        renderer
    }
}

fn outline_offsets() -> [Point; 4] {
    [
        Point::new(-1, -1),
        Point::new(1, -1),
        Point::new(-1, 1),
        Point::new(1, 1),
    ]
}
