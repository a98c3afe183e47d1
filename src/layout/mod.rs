//! Shaping and layout of attributed runs.
//!
//! [`run`] is the single pass behind every measure and draw operation: it
//! segments the text, shapes each run, snaps glyphs to half pixels, ensures
//! them in the atlas and, in draw mode, blits them through the renderer.

use runetype_config::{Color, Palette};
use runetype_fonts::{FontId, FontRegistry, Shaper, ShapingFaces};
use runetype_render::{
    GlyphAtlas, GlyphKey, GlyphRequest, Point, Rect, Renderer, Size, VARIANTS,
};
use unicode_segmentation::UnicodeSegmentation;

use crate::segment::segment;

/// Slack allowed past the wrap limit before a glyph counts as overflowing.
const WRAP_EPSILON: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Measure,
    Draw,
}

/// Modifiers of a [`RunRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunFlags {
    /// Report the union of drawn glyph rects instead of the advance box.
    pub visual: bool,
    /// End the call at the first newline.
    pub stop_at_newline: bool,
    /// Break at the overflowing glyph instead of the last whitespace.
    pub no_wrap: bool,
    /// Keep the caller's tint; inline colors are ignored.
    pub permanent_color: bool,
    /// Fill each glyph's destination with the draw color before blitting.
    pub fill_background: bool,
}

/// One measure or draw call.
#[derive(Debug, Clone, Copy)]
pub struct RunRequest<'t> {
    pub mode: RunMode,
    pub flags: RunFlags,
    pub font: FontId,
    pub text: &'t str,
    /// Process only this many characters (grapheme clusters).
    pub max_chars: Option<usize>,
    /// Hard wrap width; the call stops at the first glyph past it.
    pub wrap_width: Option<i32>,
    /// Absolute x past which glyphs are laid out but not drawn.
    pub layout_bound: Option<i32>,
    pub origin: Point,
    pub color: Color,
}

impl<'t> RunRequest<'t> {
    pub fn measure(font: FontId, text: &'t str) -> Self {
        Self {
            mode: RunMode::Measure,
            flags: RunFlags::default(),
            font,
            text,
            max_chars: None,
            wrap_width: None,
            layout_bound: None,
            origin: Point::default(),
            color: Color::WHITE,
        }
    }

    pub fn draw(font: FontId, text: &'t str, origin: Point, color: Color) -> Self {
        Self {
            mode: RunMode::Draw,
            origin,
            color,
            ..Self::measure(font, text)
        }
    }
}

/// Result of a [`run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunOutput {
    /// Advance box at the origin, or the visual box when requested.
    pub bounds: Rect,
    /// Furthest pen position reached.
    pub advance: i32,
    /// Byte offset where processing stopped; the text length when it all fit.
    pub continue_from: usize,
}

/// Everything a run borrows from the engine.
pub struct LayoutContext<'a, R: Renderer + ?Sized> {
    pub registry: &'a FontRegistry,
    pub atlas: &'a mut GlyphAtlas,
    pub shaper: &'a mut dyn Shaper,
    pub renderer: &'a mut R,
    pub palette: &'a Palette,
    pub half_pixel: bool,
}

/// Pen state at the most recent whitespace of the current line.
#[derive(Debug, Clone, Copy)]
struct WrapPoint {
    continue_from: usize,
    x_max: f32,
}

/// Snap `x` to the pixel grid, returning the integral x and the atlas variant.
fn snap(x: f32, half_pixel: bool) -> (i32, usize) {
    if !half_pixel {
        return (x.floor() as i32, 0);
    }
    let halves = (x * 2.0).round();
    let whole = (halves / 2.0).floor();
    let variant = if halves - whole * 2.0 >= 1.0 { 1 } else { 0 };
    (whole as i32, variant.min(VARIANTS - 1))
}

/// Byte length of the first `n` grapheme clusters of `text`.
fn grapheme_prefix(text: &str, n: usize) -> usize {
    text.grapheme_indices(true)
        .nth(n)
        .map_or(text.len(), |(i, _)| i)
}

/// Byte offset of the next line given a run's `continue_from`.
///
/// Always past 0 for non-empty text and always on a character boundary, so
/// `&text[next_line(text, n)..]` makes progress without panicking.
pub fn next_line(text: &str, continue_from: usize) -> usize {
    if continue_from == 0 {
        return text.graphemes(true).next().map_or(0, str::len);
    }
    let mut at = continue_from.min(text.len());
    while !text.is_char_boundary(at) {
        at += 1;
    }
    at
}

fn is_break_space(ch: char) -> bool {
    ch.is_whitespace() && ch != '\u{A0}'
}

/// Lay out `request`, drawing it when in draw mode.
pub fn run<R: Renderer + ?Sized>(ctx: &mut LayoutContext<'_, R>, request: &RunRequest<'_>) -> RunOutput {
    let text = match request.max_chars {
        Some(n) => &request.text[..grapheme_prefix(request.text, n)],
        None => request.text,
    };
    let draw = request.mode == RunMode::Draw;
    let flags = request.flags;
    let registry = ctx.registry;
    let base = registry.face_or_default(request.font);
    let line_height = base.height as f32;
    let limit = request.wrap_width.map(|w| w as f32 + WRAP_EPSILON);

    let mut visual = Rect::default();
    let mut height = 0.0f32;
    let (mut x, mut y) = (0.0f32, 0.0f32);
    let mut x_max = 0.0f32;
    let mut continue_from = text.len();
    // Cluster of the first glyph on the current line.
    let mut line_start: Option<usize> = None;
    // Cluster whose width was last checked against the limit.
    let mut checked: Option<usize> = None;
    let mut wrap_point: Option<WrapPoint> = None;

    let mut tint = request.color;
    if draw {
        ctx.renderer.set_color_mod(ctx.atlas.texture(), tint);
    }

    let runs = segment(registry, text, request.font, request.color, ctx.palette);
    let mut faces = ShapingFaces::new();
    'runs: for attr in &runs {
        if attr.line_breaks > 0 {
            if flags.stop_at_newline {
                continue_from = attr.break_at.map_or(attr.range.start, |at| at + 1);
                break;
            }
            x = 0.0;
            y += line_height * attr.line_breaks as f32;
            line_start = None;
            wrap_point = None;
        }

        let face = registry.face_or_default(attr.font);
        let shaped = ctx.shaper.shape(&mut faces, face, attr.text(text));
        if draw && !flags.permanent_color {
            tint = attr.color;
            ctx.renderer.set_color_mod(ctx.atlas.texture(), tint);
        }

        for (i, sg) in shaped.iter().enumerate() {
            if sg.glyph == 0 {
                continue;
            }
            let cluster = attr.range.start + sg.cluster;
            let is_space = text[cluster..].chars().next().is_some_and(is_break_space);

            // A cluster wraps as a whole, and the line's first cluster never wraps.
            if let Some(limit) = limit
                && checked != Some(cluster)
            {
                checked = Some(cluster);
                let width: f32 = shaped[i..]
                    .iter()
                    .take_while(|g| g.cluster == sg.cluster)
                    .map(|g| g.x_advance)
                    .sum();
                if line_start.is_some_and(|start| cluster > start) && x + width > limit {
                    if is_space {
                        continue_from = cluster + text[cluster..].chars().next().map_or(1, char::len_utf8);
                    } else if let Some(point) = wrap_point.filter(|_| !flags.no_wrap) {
                        continue_from = point.continue_from;
                        x_max = point.x_max;
                    } else {
                        continue_from = cluster;
                    }
                    break 'runs;
                }
            }
            line_start.get_or_insert(cluster);
            if is_space {
                wrap_point = Some(WrapPoint {
                    continue_from: cluster + text[cluster..].chars().next().map_or(1, char::len_utf8),
                    x_max,
                });
            }

            let key = GlyphKey::new(attr.font, sg.glyph);
            let mut glyph = ctx.atlas.ensure(registry, key);
            let (px, variant) = snap(x + sg.x_offset, ctx.half_pixel);
            let top = request.origin.y + y.round() as i32 - sg.y_offset.round() as i32;
            let dst = Rect::new(
                request.origin.x + px + glyph.origin[variant].x,
                top + glyph.origin[variant].y,
                glyph.rect[variant].w,
                glyph.rect[variant].h,
            );

            if flags.visual {
                visual = visual.union(&dst);
            }
            height = height.max(y + face.height as f32);

            if draw {
                if !glyph.rasterized[variant] {
                    // May reset the atlas; the glyph is re-ensured afterwards.
                    let pending = GlyphRequest { key, variant };
                    ctx.atlas.cache_glyphs(registry, &mut *ctx.renderer, &[pending]);
                    glyph = ctx.atlas.ensure(registry, key);
                }
                let beyond = request.layout_bound.is_some_and(|bound| dst.x >= bound);
                if !beyond && !glyph.rect[variant].is_empty() {
                    let texture = ctx.atlas.texture();
                    if flags.fill_background {
                        ctx.renderer.fill_rect(dst);
                    }
                    if glyph.colored {
                        ctx.renderer.set_color_mod(texture, Color::WHITE);
                    }
                    ctx.renderer.blit(texture, glyph.rect[variant], dst);
                    if glyph.colored {
                        ctx.renderer.set_color_mod(texture, tint);
                    }
                }
            }

            x += sg.x_advance;
            y += sg.y_advance;
            x_max = x_max.max(x);
        }
    }

    let advance = x_max.round() as i32;
    let bounds = if flags.visual {
        visual
    } else {
        Rect::from_size(Size::new(advance, height.round() as i32))
    };
    RunOutput {
        bounds,
        advance,
        continue_from,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_without_half_pixels_floors() {
        assert_eq!(snap(3.9, false), (3, 0));
        assert_eq!(snap(-0.5, false), (-1, 0));
    }

    #[test]
    fn test_snap_selects_half_pixel_variant() {
        assert_eq!(snap(3.0, true), (3, 0));
        assert_eq!(snap(3.2, true), (3, 0));
        assert_eq!(snap(3.3, true), (3, 1));
        assert_eq!(snap(3.6, true), (3, 1));
        assert_eq!(snap(3.8, true), (4, 0));
    }

    #[test]
    fn test_grapheme_prefix_counts_clusters() {
        assert_eq!(grapheme_prefix("abc", 2), 2);
        assert_eq!(grapheme_prefix("abc", 5), 3);
        assert_eq!(grapheme_prefix("e\u{301}x", 1), 3);
    }

    #[test]
    fn test_next_line_always_advances_on_a_boundary() {
        assert_eq!(next_line("abc", 0), 1);
        assert_eq!(next_line("e\u{301}x", 0), 3);
        assert_eq!(next_line("\u{e9}\u{e9}", 1), 2);
        assert_eq!(next_line("\u{e9}\u{e9}", 2), 2);
        assert_eq!(next_line("ab", 9), 2);
        assert_eq!(next_line("", 0), 0);
    }
}
