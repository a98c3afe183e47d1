//! Typed error types for runetype-render.

use thiserror::Error;

use crate::geometry::Size;
use crate::renderer::TextureId;

/// Failures reported by a [`Renderer`](crate::Renderer).
#[derive(Debug, Error)]
pub enum RenderError {
    // -----------------------------------------------------------------------
    // Textures
    // -----------------------------------------------------------------------
    /// A texture was requested with a zero or negative dimension.
    #[error("Invalid texture size {0}")]
    InvalidTextureSize(Size),

    /// The requested texture is larger than the renderer supports.
    #[error("Texture {requested} exceeds maximum {max}")]
    TextureTooLarge {
        /// Size that was asked for.
        requested: Size,
        /// Largest size the renderer accepts.
        max: Size,
    },

    /// The texture handle does not name a live texture.
    #[error("Unknown texture {0:?}")]
    UnknownTexture(TextureId),

    /// The supplied raw RGBA byte slice has an unexpected length.
    #[error("Invalid RGBA data size: expected {expected} bytes, got {actual} bytes")]
    InvalidTextureData {
        /// Expected byte count (`width * height * 4`).
        expected: usize,
        /// Actual byte count received.
        actual: usize,
    },

    /// The renderer cannot draw into textures.
    #[error("Render targets are not supported")]
    TargetUnsupported,

    /// An upload rectangle extends past the texture bounds.
    #[error("Upload region out of bounds for texture {0:?}")]
    OutOfBounds(TextureId),
}
