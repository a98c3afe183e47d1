//! Error type for the runetype engine.

use runetype_config::ConfigError;
use runetype_fonts::FontError;
use runetype_render::RenderError;

/// Errors surfaced by [`TextEngine`](crate::TextEngine) construction and
/// reconfiguration. Layout and drawing never fail.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("font error: {0}")]
    Font(#[from] FontError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),
}
