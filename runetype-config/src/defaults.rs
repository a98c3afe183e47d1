//! Default values for text-engine settings.

pub fn ui_font_size() -> f32 {
    16.0
}

pub fn content_font_size() -> f32 {
    1.0 // Multiplier over the UI size, before the content scale
}

pub fn half_pixel_glyphs() -> bool {
    true
}

pub fn shape_cache_size() -> usize {
    1000
}
