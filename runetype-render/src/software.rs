//! CPU implementation of [`Renderer`] over RGBA buffers.
//!
//! Every blit and fill is also recorded in a draw log, which is how headless
//! callers inspect what was drawn where.

use std::collections::HashMap;

use runetype_config::Color;

use crate::error::RenderError;
use crate::geometry::{Rect, Size};
use crate::renderer::{BlendMode, Renderer, TextureId};

/// Default texture limit, matching common GPU limits.
pub const DEFAULT_MAX_TEXTURE: Size = Size::new(8192, 8192);

/// One recorded drawing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCall {
    Blit {
        target: Option<TextureId>,
        texture: TextureId,
        src: Rect,
        dst: Rect,
        color: Color,
        alpha: u8,
    },
    Fill {
        target: Option<TextureId>,
        rect: Rect,
        color: Color,
        alpha: u8,
    },
}

#[derive(Debug, Clone)]
struct Surface {
    size: Size,
    pixels: Vec<u8>,
    blend: BlendMode,
    color_mod: Color,
    alpha_mod: u8,
}

impl Surface {
    fn new(size: Size) -> Self {
        Self {
            size,
            pixels: vec![0; (size.w * size.h * 4) as usize],
            blend: BlendMode::Blend,
            color_mod: Color::WHITE,
            alpha_mod: 255,
        }
    }

    fn offset(&self, x: i32, y: i32) -> usize {
        ((y * self.size.w + x) * 4) as usize
    }

    fn put(&mut self, x: i32, y: i32, src: [u8; 4], blend: BlendMode) {
        let i = self.offset(x, y);
        let dst = &mut self.pixels[i..i + 4];
        match blend {
            BlendMode::None => dst.copy_from_slice(&src),
            BlendMode::Blend => {
                let a = src[3] as u32;
                for c in 0..3 {
                    dst[c] = ((src[c] as u32 * a + dst[c] as u32 * (255 - a)) / 255) as u8;
                }
                dst[3] = (a + dst[3] as u32 * (255 - a) / 255) as u8;
            }
        }
    }
}

/// Renderer drawing into CPU memory.
#[derive(Debug)]
pub struct SoftwareRenderer {
    screen: Surface,
    textures: HashMap<TextureId, Surface>,
    next_texture: u32,
    target: Option<TextureId>,
    draw_color: [u8; 4],
    max_texture: Size,
    render_targets: bool,
    log: Vec<DrawCall>,
    uploads: Vec<(TextureId, Rect)>,
}

impl SoftwareRenderer {
    /// A renderer whose screen is `size` pixels.
    pub fn new(size: Size) -> Self {
        Self {
            screen: Surface::new(size),
            textures: HashMap::new(),
            next_texture: 1,
            target: None,
            draw_color: [0, 0, 0, 255],
            max_texture: DEFAULT_MAX_TEXTURE,
            render_targets: true,
            log: Vec::new(),
            uploads: Vec::new(),
        }
    }

    /// Lower the texture limit, e.g. to exercise atlas fallbacks.
    pub fn with_max_texture_size(mut self, max: Size) -> Self {
        self.max_texture = max;
        self
    }

    /// Refuse every texture render target, like hosts without target support.
    pub fn without_render_targets(mut self) -> Self {
        self.render_targets = false;
        self
    }

    pub fn screen_size(&self) -> Size {
        self.screen.size
    }

    /// RGBA of one screen pixel; transparent outside the screen.
    pub fn pixel(&self, x: i32, y: i32) -> [u8; 4] {
        self.surface_pixel(&self.screen, x, y)
    }

    /// RGBA of one pixel of `texture`.
    pub fn texture_pixel(&self, texture: TextureId, x: i32, y: i32) -> [u8; 4] {
        self.textures
            .get(&texture)
            .map_or([0; 4], |surface| self.surface_pixel(surface, x, y))
    }

    pub fn screen_pixels(&self) -> &[u8] {
        &self.screen.pixels
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Successful uploads, in order, as `(texture, rect)`.
    pub fn uploads(&self) -> &[(TextureId, Rect)] {
        &self.uploads
    }

    pub fn draw_calls(&self) -> &[DrawCall] {
        &self.log
    }

    /// Blits onto the screen, in order.
    pub fn screen_blits(&self) -> impl Iterator<Item = &DrawCall> {
        self.log
            .iter()
            .filter(|call| matches!(call, DrawCall::Blit { target: None, .. }))
    }

    pub fn clear_draw_calls(&mut self) {
        self.log.clear();
    }

    fn surface_pixel(&self, surface: &Surface, x: i32, y: i32) -> [u8; 4] {
        if x < 0 || y < 0 || x >= surface.size.w || y >= surface.size.h {
            return [0; 4];
        }
        let i = surface.offset(x, y);
        [
            surface.pixels[i],
            surface.pixels[i + 1],
            surface.pixels[i + 2],
            surface.pixels[i + 3],
        ]
    }

    fn target_surface(&mut self) -> &mut Surface {
        match self.target.and_then(|id| self.textures.get_mut(&id)) {
            Some(surface) => surface,
            None => &mut self.screen,
        }
    }
}

impl Renderer for SoftwareRenderer {
    fn max_texture_size(&self) -> Size {
        self.max_texture
    }

    fn create_texture(&mut self, size: Size) -> Result<TextureId, RenderError> {
        if size.is_empty() {
            return Err(RenderError::InvalidTextureSize(size));
        }
        if size.w > self.max_texture.w || size.h > self.max_texture.h {
            return Err(RenderError::TextureTooLarge {
                requested: size,
                max: self.max_texture,
            });
        }
        let id = TextureId(self.next_texture);
        self.next_texture += 1;
        self.textures.insert(id, Surface::new(size));
        Ok(id)
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
        if self.target == Some(texture) {
            self.target = None;
        }
    }

    fn texture_size(&self, texture: TextureId) -> Option<Size> {
        self.textures.get(&texture).map(|surface| surface.size)
    }

    fn upload(&mut self, texture: TextureId, rect: Rect, pixels: &[u8]) -> Result<(), RenderError> {
        let surface = self
            .textures
            .get_mut(&texture)
            .ok_or(RenderError::UnknownTexture(texture))?;
        let expected = (rect.w.max(0) * rect.h.max(0) * 4) as usize;
        if pixels.len() != expected {
            return Err(RenderError::InvalidTextureData {
                expected,
                actual: pixels.len(),
            });
        }
        if !Rect::from_size(surface.size).contains_rect(&rect) {
            return Err(RenderError::OutOfBounds(texture));
        }
        let row_bytes = (rect.w * 4) as usize;
        for row in 0..rect.h {
            let dst = surface.offset(rect.x, rect.y + row);
            let src = row as usize * row_bytes;
            surface.pixels[dst..dst + row_bytes].copy_from_slice(&pixels[src..src + row_bytes]);
        }
        self.uploads.push((texture, rect));
        Ok(())
    }

    fn render_target(&self) -> Option<TextureId> {
        self.target
    }

    fn set_render_target(&mut self, target: Option<TextureId>) -> Result<(), RenderError> {
        if let Some(id) = target {
            if !self.textures.contains_key(&id) {
                return Err(RenderError::UnknownTexture(id));
            }
            if !self.render_targets {
                return Err(RenderError::TargetUnsupported);
            }
        }
        self.target = target;
        Ok(())
    }

    fn set_blend_mode(&mut self, texture: TextureId, mode: BlendMode) {
        if let Some(surface) = self.textures.get_mut(&texture) {
            surface.blend = mode;
        }
    }

    fn set_color_mod(&mut self, texture: TextureId, color: Color) {
        if let Some(surface) = self.textures.get_mut(&texture) {
            surface.color_mod = color;
        }
    }

    fn set_alpha_mod(&mut self, texture: TextureId, alpha: u8) {
        if let Some(surface) = self.textures.get_mut(&texture) {
            surface.alpha_mod = alpha;
        }
    }

    fn set_draw_color(&mut self, color: Color, alpha: u8) {
        self.draw_color = [color.r, color.g, color.b, alpha];
    }

    fn fill_rect(&mut self, rect: Rect) {
        let color = self.draw_color;
        let target = self.target;
        self.log.push(DrawCall::Fill {
            target,
            rect,
            color: Color::new(color[0], color[1], color[2]),
            alpha: color[3],
        });
        let surface = self.target_surface();
        let Some(clip) = rect.intersection(&Rect::from_size(surface.size)) else {
            return;
        };
        for y in clip.y..clip.bottom() {
            for x in clip.x..clip.right() {
                surface.put(x, y, color, BlendMode::Blend);
            }
        }
    }

    fn clear(&mut self) {
        let color = self.draw_color;
        let surface = self.target_surface();
        for px in surface.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
    }

    fn blit(&mut self, texture: TextureId, src: Rect, dst: Rect) {
        let Some(source) = self.textures.get(&texture) else {
            log::warn!("Blit from unknown texture {:?}", texture);
            return;
        };
        self.log.push(DrawCall::Blit {
            target: self.target,
            texture,
            src,
            dst,
            color: source.color_mod,
            alpha: source.alpha_mod,
        });
        if src.is_empty() || dst.is_empty() {
            return;
        }

        // Sample the source first so blitting a texture onto itself is safe.
        let (blend, color_mod, alpha_mod) = (source.blend, source.color_mod, source.alpha_mod);
        let mut samples = Vec::with_capacity((dst.w * dst.h) as usize);
        for dy in 0..dst.h {
            for dx in 0..dst.w {
                let sx = src.x + dx * src.w / dst.w;
                let sy = src.y + dy * src.h / dst.h;
                let mut px = self.surface_pixel(source, sx, sy);
                px[0] = (px[0] as u32 * color_mod.r as u32 / 255) as u8;
                px[1] = (px[1] as u32 * color_mod.g as u32 / 255) as u8;
                px[2] = (px[2] as u32 * color_mod.b as u32 / 255) as u8;
                px[3] = (px[3] as u32 * alpha_mod as u32 / 255) as u8;
                samples.push(px);
            }
        }

        let surface = self.target_surface();
        let bounds = Rect::from_size(surface.size);
        for dy in 0..dst.h {
            for dx in 0..dst.w {
                let (x, y) = (dst.x + dx, dst.y + dy);
                if x < bounds.x || y < bounds.y || x >= bounds.right() || y >= bounds.bottom() {
                    continue;
                }
                surface.put(x, y, samples[(dy * dst.w + dx) as usize], blend);
            }
        }
    }
}
