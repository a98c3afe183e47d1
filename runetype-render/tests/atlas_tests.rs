//! Integration tests for the glyph atlas against synthetic faces.

use runetype_config::TextConfig;
use runetype_fonts::{FontId, FontRegistry, SyntheticFontSource};
use runetype_render::{
    DrawCall, GlyphAtlas, GlyphKey, GlyphRequest, Rect, Renderer, Size, SoftwareRenderer,
};

fn registry() -> FontRegistry {
    FontRegistry::build(&TextConfig::default(), &SyntheticFontSource::new()).unwrap()
}

fn key(registry: &FontRegistry, ch: char) -> GlyphKey {
    let face = registry.face(FontId::REGULAR).unwrap();
    GlyphKey::new(FontId::REGULAR, face.glyph_index(ch))
}

fn renderer() -> SoftwareRenderer {
    SoftwareRenderer::new(Size::new(200, 100))
}

#[test]
fn test_ensure_is_deterministic() {
    let registry = registry();
    let mut renderer = renderer();
    let mut atlas = GlyphAtlas::new(&mut renderer, registry.text_size(), registry.ui_size()).unwrap();

    let a = atlas.ensure(&registry, key(&registry, 'A'));
    let b = atlas.ensure(&registry, key(&registry, 'B'));
    assert_eq!(atlas.ensure(&registry, key(&registry, 'A')), a);
    assert_eq!(atlas.ensure(&registry, key(&registry, 'B')), b);
    assert_eq!(atlas.len(), 2);
    assert_eq!(atlas.resets(), 0);
}

#[test]
fn test_both_variants_are_reserved_in_bounds() {
    let registry = registry();
    let mut renderer = renderer();
    let mut atlas = GlyphAtlas::new(&mut renderer, registry.text_size(), registry.ui_size()).unwrap();
    let bounds = Rect::from_size(atlas.size());

    let glyph = atlas.ensure(&registry, key(&registry, 'W'));
    assert!(!glyph.rect[0].is_empty() && !glyph.rect[1].is_empty());
    assert_ne!(glyph.rect[0], glyph.rect[1]);
    assert!(glyph.rect[0].intersection(&glyph.rect[1]).is_none());
    for rect in glyph.rect {
        assert!(bounds.contains_rect(&rect), "{rect:?} outside {bounds:?}");
    }
    assert_eq!(glyph.rasterized, [false, false]);
    assert!(glyph.advance > 0.0);
}

#[test]
fn test_row_height_is_quantized_ceiling() {
    let registry = registry();
    let mut renderer = renderer();
    let mut atlas = GlyphAtlas::new(&mut renderer, registry.text_size(), registry.ui_size()).unwrap();

    let glyph = atlas.ensure(&registry, key(&registry, 'x'));
    let h = glyph.rect[0].h;
    let step = atlas.row_step();
    let bucket = ((h - 1) / step) as usize;
    let row = atlas.rows()[bucket];
    assert_eq!(row.height, (h + step - 1) / step * step);
    assert!(row.height >= h);

    // Every glyph landing in the same bucket fits the committed row.
    let other = atlas.ensure(&registry, key(&registry, 'y'));
    assert_eq!(other.rect[0].y, glyph.rect[0].y);
    assert!(other.rect[0].bottom() <= row.y + row.height);
}

#[test]
fn test_blank_glyph_reserves_nothing() {
    let registry = registry();
    let mut renderer = renderer();
    let mut atlas = GlyphAtlas::new(&mut renderer, registry.text_size(), registry.ui_size()).unwrap();

    let space = atlas.ensure(&registry, key(&registry, ' '));
    assert!(space.is_blank());
    assert_eq!(space.rasterized, [true, true]);
    assert_eq!(atlas.bottom(), 0);
    assert!(space.advance > 0.0);
}

#[test]
fn test_capacity_overflow_resets_exactly_once() {
    let registry = registry();
    let mut renderer = renderer();
    let atlas_size = Size::new(64, 40);
    let step = 2;
    let mut atlas = GlyphAtlas::with_geometry(&mut renderer, atlas_size, step, 0).unwrap();

    // Uppercase synthetic glyphs share one box size, so capacity is exact.
    let letters: Vec<char> = ('A'..='Z').collect();
    let sample = atlas.ensure(&registry, key(&registry, letters[0]));
    let (w, h) = (sample.rect[0].w, sample.rect[0].h);
    let row_height = (h + step - 1) / step * step;
    let per_row = (atlas_size.w + 1) / (w + 1);
    let rows = atlas_size.h / row_height;
    let capacity = (per_row * rows) as usize / 2;
    assert!(capacity >= 2 && capacity < letters.len());

    for &ch in &letters[1..capacity] {
        atlas.ensure(&registry, key(&registry, ch));
    }
    assert_eq!(atlas.resets(), 0, "{capacity} glyphs should fit without a reset");
    assert_eq!(atlas.len(), capacity);

    let generation = atlas.generation();
    let extra = atlas.ensure(&registry, key(&registry, letters[capacity]));
    assert_eq!(atlas.resets(), 1, "glyph {} should trigger one reset", capacity + 1);
    assert!(atlas.generation() > generation);
    assert_eq!(atlas.len(), 1, "the reset drops every earlier glyph");
    assert_eq!(extra.rect[0], Rect::new(0, 0, w, h));

    // Earlier glyphs come back with valid geometry.
    let bounds = Rect::from_size(atlas_size);
    for &ch in &letters[..capacity] {
        let glyph = atlas.ensure(&registry, key(&registry, ch));
        for rect in glyph.rect {
            assert!(bounds.contains_rect(&rect));
        }
    }
}

#[test]
fn test_cache_glyphs_rasterizes_into_atlas() {
    let registry = registry();
    let mut renderer = renderer();
    let mut atlas = GlyphAtlas::new(&mut renderer, registry.text_size(), registry.ui_size()).unwrap();

    let requests: Vec<GlyphRequest> = "Hi!"
        .chars()
        .map(|ch| GlyphRequest {
            key: key(&registry, ch),
            variant: 0,
        })
        .collect();
    atlas.cache_glyphs(&registry, &mut renderer, &requests);

    assert_eq!(renderer.render_target(), None, "render target is restored");
    let atlas_blits = renderer
        .draw_calls()
        .iter()
        .filter(|call| matches!(call, DrawCall::Blit { target: Some(t), .. } if *t == atlas.texture()))
        .count();
    assert_eq!(atlas_blits, 3, "one batched copy per glyph");

    for request in &requests {
        let glyph = *atlas.get(request.key).unwrap();
        assert!(glyph.rasterized[0]);
        assert!(!glyph.rasterized[1], "only the requested variant is rasterized");
        let rect = glyph.rect[0];
        assert_eq!(renderer.texture_pixel(atlas.texture(), rect.x, rect.y)[3], 255);
    }
}

#[test]
fn test_cache_glyphs_survives_overflow() {
    let registry = registry();
    let mut renderer = renderer();
    let mut atlas = GlyphAtlas::with_geometry(&mut renderer, Size::new(64, 40), 2, 0).unwrap();

    let requests: Vec<GlyphRequest> = ('A'..='Z')
        .map(|ch| GlyphRequest {
            key: key(&registry, ch),
            variant: 1,
        })
        .collect();
    atlas.cache_glyphs(&registry, &mut renderer, &requests);

    assert!(atlas.resets() >= 1);
    let last = requests.last().unwrap().key;
    let glyph = *atlas.get(last).unwrap();
    assert!(glyph.rasterized[1], "the final glyph is resident after the batch");
}

#[test]
fn test_atlas_size_respects_renderer_limit() {
    let registry = registry();
    let mut renderer = SoftwareRenderer::new(Size::new(10, 10)).with_max_texture_size(Size::new(256, 256));
    let atlas = GlyphAtlas::new(&mut renderer, registry.text_size(), registry.ui_size()).unwrap();
    assert!(atlas.size().w <= 256 && atlas.size().h <= 256);

    let textures = renderer.texture_count();
    atlas.destroy(&mut renderer);
    assert_eq!(renderer.texture_count(), textures - 2);
}
