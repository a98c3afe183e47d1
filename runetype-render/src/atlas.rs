//! Shared glyph atlas with row-bucketed packing.
//!
//! Glyphs are packed into horizontal rows. Each row belongs to one height
//! bucket (`(h - 1) / row_step`) and has the bucket's quantized height, so any
//! glyph of that bucket fits. Space is only ever bump-allocated; when the atlas
//! runs out the whole cache is reset and glyphs are re-added lazily.
//!
//! Every glyph reserves two slots: one rasterized at the pen position and one
//! shifted right by half a pixel, so text positioned on half pixels keeps its
//! spacing.

use std::collections::HashMap;

use runetype_fonts::{FontFace, FontId, FontRegistry};

use crate::error::RenderError;
use crate::geometry::{Point, Rect, Size};
use crate::renderer::{BlendMode, Renderer, TextureId};

/// Number of subpixel variants per glyph.
pub const VARIANTS: usize = 2;

/// Horizontal shift of variant 1, in pixels.
pub const HALF_PIXEL: f32 = 0.5;

/// Widest scratch surface used to batch rasterization.
pub const SCRATCH_WIDTH: i32 = 512;

/// Smallest atlas the fallback chain will try.
const MIN_ATLAS_SIZE: i32 = 64;

/// Gap between neighbors in a row.
const GLYPH_PADDING: i32 = 1;

/// Identity of a cached glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlyphKey {
    pub font: FontId,
    pub index: u16,
}

impl GlyphKey {
    pub const fn new(font: FontId, index: u16) -> Self {
        Self { font, index }
    }
}

/// Geometry of one cached glyph, per subpixel variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub key: GlyphKey,
    /// Whether the pixels of each variant are in the atlas yet.
    pub rasterized: [bool; VARIANTS],
    /// Atlas rectangle of each variant; empty for blank glyphs.
    pub rect: [Rect; VARIANTS],
    /// Offset of each variant's top-left from the pen position at the top of the line.
    pub origin: [Point; VARIANTS],
    /// Pen advance in pixels.
    pub advance: f32,
    /// Carries its own colors and ignores tinting.
    pub colored: bool,
}

impl Glyph {
    pub fn is_blank(&self) -> bool {
        self.rect.iter().all(Rect::is_empty)
    }
}

/// A shelf of glyphs for one height bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheRow {
    /// Next free x.
    pub x: i32,
    /// Top of the row.
    pub y: i32,
    /// Quantized height; 0 while unused.
    pub height: i32,
}

/// Glyph to make resident: which glyph and which variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlyphRequest {
    pub key: GlyphKey,
    pub variant: usize,
}

struct Pending {
    key: GlyphKey,
    variant: usize,
    src: Rect,
    dst: Rect,
    colored: bool,
}

/// CPU staging area that rasterized glyphs are packed into before being
/// copied to the atlas in one pass.
struct Scratch {
    texture: TextureId,
    size: Size,
    pixels: Vec<u8>,
    x: i32,
    y: i32,
    row_height: i32,
    /// Extent written since the last clear, from the origin.
    used: Size,
    pending: Vec<Pending>,
}

impl Scratch {
    fn clear(&mut self) {
        let rows = (self.used.h * self.size.w * 4) as usize;
        self.pixels[..rows].fill(0);
        self.used = Size::default();
        self.x = 0;
        self.y = 0;
        self.row_height = 0;
        self.pending.clear();
    }

    /// Position for a `w` x `h` image, or `None` when the scratch is full.
    fn place(&mut self, w: i32, h: i32) -> Option<Point> {
        if w > self.size.w || h > self.size.h {
            return None;
        }
        if self.x + w > self.size.w {
            self.x = 0;
            self.y += self.row_height;
            self.row_height = 0;
        }
        if self.y + h > self.size.h {
            return None;
        }
        let pos = Point::new(self.x, self.y);
        self.x += w;
        self.row_height = self.row_height.max(h);
        self.used.w = self.used.w.max(self.x);
        self.used.h = self.used.h.max(self.y + h);
        Some(pos)
    }

    fn copy_in(&mut self, pos: Point, w: i32, h: i32, pixels: &[u8]) {
        let row_bytes = (w * 4) as usize;
        for row in 0..h {
            let dst = (((pos.y + row) * self.size.w + pos.x) * 4) as usize;
            let src = row as usize * row_bytes;
            self.pixels[dst..dst + row_bytes].copy_from_slice(&pixels[src..src + row_bytes]);
        }
    }
}

/// The glyph cache: one atlas texture plus the geometry of every resident glyph.
pub struct GlyphAtlas {
    texture: TextureId,
    size: Size,
    row_step: i32,
    max_glyph_height: i32,
    rows: Vec<CacheRow>,
    bottom: i32,
    glyphs: Vec<Glyph>,
    index: HashMap<GlyphKey, usize>,
    scratch: Scratch,
    generation: u64,
    resets: u64,
}

impl std::fmt::Debug for GlyphAtlas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphAtlas")
            .field("size", &self.size)
            .field("row_step", &self.row_step)
            .field("bottom", &self.bottom)
            .field("glyphs", &self.glyphs.len())
            .field("resets", &self.resets)
            .finish()
    }
}

impl GlyphAtlas {
    /// Create the atlas sized for text of `text_size` and `ui_size` pixels.
    ///
    /// The preferred size is `16 x 40` of the larger text size, clamped to the
    /// renderer limit. If allocation fails the renderer maximum is tried, then
    /// successively halved sizes down to a small floor.
    pub fn new<R: Renderer + ?Sized>(
        renderer: &mut R,
        text_size: f32,
        ui_size: f32,
    ) -> Result<Self, RenderError> {
        let unit = text_size.max(ui_size).max(1.0);
        let max = renderer.max_texture_size();
        let mut preferred = Size::new((16.0 * unit).ceil() as i32, (40.0 * unit).ceil() as i32);
        if preferred.h > max.h {
            preferred = max;
        }
        preferred.w = preferred.w.min(max.w);

        let row_step = ((text_size / 6.0) as i32).max(2);
        let max_glyph_height = (2.0 * text_size).ceil() as i32;
        let buckets = ((2.5 * text_size + row_step as f32) / row_step as f32).ceil() as usize;

        let mut candidates = vec![preferred, max];
        let mut halved = max;
        while halved.w / 2 >= MIN_ATLAS_SIZE && halved.h / 2 >= MIN_ATLAS_SIZE {
            halved = Size::new(halved.w / 2, halved.h / 2);
            candidates.push(halved);
        }

        let mut last_err = RenderError::InvalidTextureSize(preferred);
        for size in candidates {
            match Self::with_geometry(renderer, size, row_step, max_glyph_height) {
                Ok(mut atlas) => {
                    atlas.rows.resize(buckets, CacheRow::default());
                    log::info!(
                        "Glyph atlas created: {} row_step={} buckets={}",
                        atlas.size,
                        row_step,
                        buckets
                    );
                    return Ok(atlas);
                }
                Err(e) => {
                    log::warn!("Glyph atlas allocation of {} failed: {}", size, e);
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }

    /// Create an atlas with explicit geometry.
    ///
    /// `max_glyph_height` is the headroom kept free at the bottom: a miss that
    /// finds less room than this resets the cache before allocating. It is
    /// capped at half the atlas height.
    pub fn with_geometry<R: Renderer + ?Sized>(
        renderer: &mut R,
        size: Size,
        row_step: i32,
        max_glyph_height: i32,
    ) -> Result<Self, RenderError> {
        let texture = renderer.create_texture(size)?;
        renderer.set_blend_mode(texture, BlendMode::Blend);

        let scratch_size = Size::new(
            SCRATCH_WIDTH.min(size.w),
            (max_glyph_height * 2).clamp(MIN_ATLAS_SIZE.min(size.h), size.h),
        );
        let scratch_texture = match renderer.create_texture(scratch_size) {
            Ok(id) => id,
            Err(e) => {
                renderer.destroy_texture(texture);
                return Err(e);
            }
        };
        renderer.set_blend_mode(scratch_texture, BlendMode::None);

        Ok(Self {
            texture,
            size,
            row_step: row_step.max(1),
            max_glyph_height: max_glyph_height.clamp(0, size.h / 2),
            rows: Vec::new(),
            bottom: 0,
            glyphs: Vec::new(),
            index: HashMap::new(),
            scratch: Scratch {
                texture: scratch_texture,
                size: scratch_size,
                pixels: vec![0; (scratch_size.w * scratch_size.h * 4) as usize],
                x: 0,
                y: 0,
                row_height: 0,
                used: Size::default(),
                pending: Vec::new(),
            },
            generation: 0,
            resets: 0,
        })
    }

    /// Release the atlas textures.
    pub fn destroy<R: Renderer + ?Sized>(self, renderer: &mut R) {
        renderer.destroy_texture(self.scratch.texture);
        renderer.destroy_texture(self.texture);
    }

    pub fn texture(&self) -> TextureId {
        self.texture
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn row_step(&self) -> i32 {
        self.row_step
    }

    pub fn rows(&self) -> &[CacheRow] {
        &self.rows
    }

    /// First y below every allocated row.
    pub fn bottom(&self) -> i32 {
        self.bottom
    }

    /// Number of resident glyphs.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Bumped by every reset; geometry obtained under an older generation is stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// How many times the cache has been reset.
    pub fn resets(&self) -> u64 {
        self.resets
    }

    /// The cached glyph for `key`, without creating it.
    pub fn get(&self, key: GlyphKey) -> Option<&Glyph> {
        self.index.get(&key).map(|&i| &self.glyphs[i])
    }

    /// Drop every cached glyph and free all atlas space.
    pub fn reset(&mut self) {
        self.glyphs.clear();
        self.index.clear();
        for row in &mut self.rows {
            *row = CacheRow::default();
        }
        self.bottom = 0;
        self.generation += 1;
        self.resets += 1;
        log::debug!("Glyph atlas reset (#{})", self.resets);
    }

    /// Return the glyph for `key`, creating it and reserving atlas space on a miss.
    ///
    /// A hit returns exactly what was returned before, until the next reset.
    /// A miss may reset the cache first when the atlas is nearly full.
    pub fn ensure(&mut self, registry: &FontRegistry, key: GlyphKey) -> Glyph {
        if let Some(&i) = self.index.get(&key) {
            return self.glyphs[i];
        }

        if self.bottom > self.size.h - self.max_glyph_height {
            log::debug!("Glyph atlas exhausted at bottom={}", self.bottom);
            self.reset();
        }

        let face = registry.face_or_default(key.font);
        let glyph = match self.place(face, key) {
            Some(glyph) => glyph,
            None => {
                self.reset();
                self.place(face, key).unwrap_or_else(|| {
                    log::warn!(
                        "Glyph {} of font {:?} does not fit the atlas; drawing nothing",
                        key.index,
                        key.font
                    );
                    Self::blank(face, key)
                })
            }
        };

        self.index.insert(key, self.glyphs.len());
        self.glyphs.push(glyph);
        glyph
    }

    fn blank(face: &FontFace, key: GlyphKey) -> Glyph {
        Glyph {
            key,
            rasterized: [true; VARIANTS],
            rect: [Rect::default(); VARIANTS],
            origin: [Point::default(); VARIANTS],
            advance: face.advance(key.index),
            colored: false,
        }
    }

    /// Measure both variants and reserve their space. `None` when out of room.
    fn place(&mut self, face: &FontFace, key: GlyphKey) -> Option<Glyph> {
        let mut glyph = Self::blank(face, key);
        let line_offset = (face.baseline + face.vert_offset).round() as i32;

        for variant in 0..VARIANTS {
            let shift = variant as f32 * HALF_PIXEL;
            let Some(bounds) = face.glyph_box(key.index, shift) else {
                continue;
            };
            if bounds.is_empty() {
                continue;
            }
            let (w, h) = (bounds.width as i32, bounds.height as i32);
            let pos = self.reserve(w, h)?;
            glyph.rect[variant] = Rect::new(pos.x, pos.y, w, h);
            glyph.origin[variant] = Point::new(bounds.left, line_offset - bounds.top);
            glyph.rasterized[variant] = false;
        }
        Some(glyph)
    }

    /// Bump-allocate a `w` x `h` slot in the row of its height bucket.
    fn reserve(&mut self, w: i32, h: i32) -> Option<Point> {
        if w > self.size.w || h > self.size.h {
            return None;
        }
        let bucket = ((h - 1) / self.row_step) as usize;
        if bucket >= self.rows.len() {
            self.rows.resize(bucket + 1, CacheRow::default());
        }
        let step = self.row_step;
        let (size, bottom) = (self.size, &mut self.bottom);
        let row = &mut self.rows[bucket];

        if row.height == 0 {
            let height = (bucket as i32 + 1) * step;
            if *bottom + height > size.h {
                return None;
            }
            *row = CacheRow {
                x: 0,
                y: *bottom,
                height,
            };
            *bottom += height;
        }
        if row.x + w > size.w {
            if *bottom + row.height > size.h {
                return None;
            }
            row.x = 0;
            row.y = *bottom;
            *bottom += row.height;
        }

        let pos = Point::new(row.x, row.y);
        row.x += w + GLYPH_PADDING;
        Some(pos)
    }

    /// Make every requested glyph variant resident, rasterizing in batches.
    ///
    /// Rasterized glyphs are packed into a scratch surface; each time it fills
    /// up (and at the end) the scratch is uploaded and copied into the atlas
    /// with a single render-target switch. If the atlas resets midway, the
    /// batch restarts once from the beginning; a second reset continues from
    /// the glyph that caused it, so the call always terminates.
    pub fn cache_glyphs<R: Renderer + ?Sized>(
        &mut self,
        registry: &FontRegistry,
        renderer: &mut R,
        requests: &[GlyphRequest],
    ) {
        self.scratch.clear();
        let mut restarted = false;
        let mut i = 0;

        while i < requests.len() {
            let request = requests[i];
            let generation = self.generation;
            let glyph = self.ensure(registry, request.key);
            if self.generation != generation {
                self.scratch.clear();
                if !restarted {
                    restarted = true;
                    i = 0;
                    continue;
                }
            }

            let variant = request.variant.min(VARIANTS - 1);
            if glyph.rasterized[variant] || self.is_pending(request.key, variant) {
                i += 1;
                continue;
            }

            let face = registry.face_or_default(request.key.font);
            let shift = variant as f32 * HALF_PIXEL;
            let dst = glyph.rect[variant];
            let Some(image) = face.rasterize(request.key.index, shift) else {
                self.mark_rasterized(request.key, variant, false);
                i += 1;
                continue;
            };
            let (w, h) = (
                (image.bounds.width as i32).min(dst.w),
                (image.bounds.height as i32).min(dst.h),
            );
            let pixels = crop(&image.pixels, image.bounds.width as i32, w, h);

            let pos = match self.scratch.place(w, h) {
                Some(pos) => Some(pos),
                None => {
                    self.flush(renderer);
                    self.scratch.place(w, h)
                }
            };
            match pos {
                Some(pos) => {
                    self.scratch.copy_in(pos, w, h, &pixels);
                    self.scratch.pending.push(Pending {
                        key: request.key,
                        variant,
                        src: Rect::new(pos.x, pos.y, w, h),
                        dst: Rect::new(dst.x, dst.y, w, h),
                        colored: image.is_colored,
                    });
                }
                None => {
                    // Larger than the scratch surface: upload straight into the atlas.
                    let dst = Rect::new(dst.x, dst.y, w, h);
                    match renderer.upload(self.texture, dst, &pixels) {
                        Ok(()) => self.mark_rasterized(request.key, variant, image.is_colored),
                        Err(e) => log::warn!("Direct glyph upload failed: {}", e),
                    }
                }
            }
            i += 1;
        }
        self.flush(renderer);
    }

    fn is_pending(&self, key: GlyphKey, variant: usize) -> bool {
        self.scratch
            .pending
            .iter()
            .any(|p| p.key == key && p.variant == variant)
    }

    fn mark_rasterized(&mut self, key: GlyphKey, variant: usize, colored: bool) {
        if let Some(&i) = self.index.get(&key) {
            self.glyphs[i].rasterized[variant] = true;
            self.glyphs[i].colored |= colored;
        }
    }

    /// Copy every pending raster from the scratch into the atlas.
    fn flush<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        if self.scratch.pending.is_empty() {
            return;
        }
        let used = self.scratch.used;
        let pixels = crop(&self.scratch.pixels, self.scratch.size.w, used.w, used.h);
        if let Err(e) = renderer.upload(self.scratch.texture, Rect::from_size(used), &pixels) {
            log::warn!("Glyph scratch upload failed: {}", e);
            self.scratch.clear();
            return;
        }

        let previous = renderer.render_target();
        if let Err(e) = renderer.set_render_target(Some(self.texture)) {
            log::warn!("Cannot target glyph atlas: {}", e);
            self.scratch.clear();
            return;
        }
        for pending in &self.scratch.pending {
            renderer.blit(self.scratch.texture, pending.src, pending.dst);
        }
        if let Err(e) = renderer.set_render_target(previous) {
            log::warn!("Cannot restore render target: {}", e);
        }

        let done: Vec<(GlyphKey, usize, bool)> = self
            .scratch
            .pending
            .iter()
            .map(|p| (p.key, p.variant, p.colored))
            .collect();
        for (key, variant, colored) in done {
            self.mark_rasterized(key, variant, colored);
        }
        self.scratch.clear();
    }
}

/// Top-left `w` x `h` of an RGBA image `stride` pixels wide.
fn crop(pixels: &[u8], stride: i32, w: i32, h: i32) -> Vec<u8> {
    if stride == w {
        return pixels[..(w * h * 4) as usize].to_vec();
    }
    let mut out = Vec::with_capacity((w * h * 4) as usize);
    for row in 0..h {
        let start = (row * stride * 4) as usize;
        out.extend_from_slice(&pixels[start..start + (w * 4) as usize]);
    }
    out
}
