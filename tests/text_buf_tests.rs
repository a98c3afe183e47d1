//! Integration tests for pre-rendered text buffers.

mod common;

use common::{SCREEN, engine, pair_cluster_engine};
use runetype::fonts::SyntheticFontSource;
use runetype::render::{DrawCall, RenderError};
use runetype::{
    Color, FontId, Point, Rect, Renderer, Size, SoftwareRenderer, TextBuf, TextConfig, TextEngine,
    TextError,
};

#[test]
fn test_buffer_matches_advance() {
    let mut engine = engine();
    let expected = engine.advance(FontId::REGULAR, "Hello");
    let buf = TextBuf::new(&mut engine, FontId::REGULAR, Color::WHITE, "Hello").unwrap();
    assert_eq!(buf.size(), expected);

    let texture = buf.texture().expect("non-empty text has a texture");
    let renderer = engine.renderer();
    let covered = (0..expected.h)
        .flat_map(|y| (0..expected.w).map(move |x| (x, y)))
        .filter(|&(x, y)| renderer.texture_pixel(texture, x, y)[3] == 255)
        .count();
    assert!(covered > 0);
    assert_eq!(renderer.render_target(), None, "screen target is restored");
}

#[test]
fn test_background_stays_transparent() {
    let mut engine = engine();
    let buf = TextBuf::new(&mut engine, FontId::REGULAR, Color::WHITE, "i i").unwrap();
    let texture = buf.texture().unwrap();
    let size = buf.size();
    // The space between the glyphs is never painted.
    let middle = engine.renderer().texture_pixel(texture, size.w / 2, size.h - 1);
    assert_eq!(middle[3], 0);
}

#[test]
fn test_empty_text_has_no_texture() {
    let mut engine = engine();
    let textures = engine.renderer().texture_count();
    let buf = TextBuf::new(&mut engine, FontId::REGULAR, Color::WHITE, "").unwrap();
    assert!(buf.texture().is_none());
    assert_eq!(engine.renderer().texture_count(), textures);

    buf.draw(engine.renderer_mut(), Point::new(0, 0), Color::WHITE);
    assert_eq!(engine.renderer().screen_blits().count(), 0);
}

#[test]
fn test_draw_blits_whole_buffer_tinted() {
    let mut engine = engine();
    let buf = TextBuf::new(&mut engine, FontId::BOLD, Color::WHITE, "Tint").unwrap();
    engine.renderer_mut().clear_draw_calls();

    let green = Color::new(0, 200, 0);
    buf.draw(engine.renderer_mut(), Point::new(30, 40), green);
    let blits: Vec<DrawCall> = engine.renderer().screen_blits().copied().collect();
    assert_eq!(blits.len(), 1);
    match blits[0] {
        DrawCall::Blit { dst, color, .. } => {
            assert_eq!(dst, Rect::new(30, 40, buf.size().w, buf.size().h));
            assert_eq!(color, green);
        }
        other => panic!("unexpected draw call {other:?}"),
    }
    let covered = engine
        .renderer()
        .screen_pixels()
        .chunks_exact(4)
        .filter(|px| px[3] > 0)
        .all(|px| px[0] == 0 && px[2] == 0);
    assert!(covered, "only green should reach the screen");
}

#[test]
fn test_wrapped_buffer_matches_advance_wrap() {
    let mut engine = engine();
    let a = engine.advance(FontId::MONOSPACE, "a").w;
    let expected = engine.advance_wrap(FontId::MONOSPACE, 5 * a, "aaa bbb ccc");
    let buf = TextBuf::new_wrap(&mut engine, FontId::MONOSPACE, Color::WHITE, 5 * a, "aaa bbb ccc")
        .unwrap();
    assert_eq!(buf.size(), expected);
}

#[test]
fn test_bound_buffer_breaks_at_glyph() {
    let mut engine = engine();
    let a = engine.advance(FontId::MONOSPACE, "a").w;
    let line_height = engine.line_height(FontId::MONOSPACE);
    let buf =
        TextBuf::new_bound(&mut engine, FontId::MONOSPACE, Color::WHITE, 3 * a, "abcdef").unwrap();
    assert_eq!(buf.size(), Size::new(3 * a, 2 * line_height));
}

#[test]
fn test_destroy_releases_texture() {
    let mut engine = engine();
    let before = engine.renderer().texture_count();
    let buf = TextBuf::new(&mut engine, FontId::REGULAR, Color::WHITE, "gone").unwrap();
    assert_eq!(engine.renderer().texture_count(), before + 1);
    buf.destroy(engine.renderer_mut());
    assert_eq!(engine.renderer().texture_count(), before);
}

#[test]
fn test_failed_render_target_releases_texture() {
    let renderer = SoftwareRenderer::new(SCREEN).without_render_targets();
    let mut engine = TextEngine::new(
        renderer,
        TextConfig::default(),
        Box::new(SyntheticFontSource::new()),
    )
    .unwrap();
    let before = engine.renderer().texture_count();
    let err = TextBuf::new(&mut engine, FontId::REGULAR, Color::WHITE, "lost").unwrap_err();
    assert!(matches!(err, TextError::Render(RenderError::TargetUnsupported)));
    assert_eq!(engine.renderer().texture_count(), before);
    assert_eq!(engine.renderer().render_target(), None);
}

#[test]
fn test_narrow_buffers_keep_clusters_whole() {
    let mut engine = pair_cluster_engine();
    let text = "\u{e9}\u{e9}x\u{e9}";
    let expected = engine.advance_wrap(FontId::MONOSPACE, 1, text);
    let wrapped = TextBuf::new_wrap(&mut engine, FontId::MONOSPACE, Color::WHITE, 1, text).unwrap();
    assert_eq!(wrapped.size(), expected);
    let bound = TextBuf::new_bound(&mut engine, FontId::MONOSPACE, Color::WHITE, 1, text).unwrap();
    assert_eq!(bound.size(), expected);
}
