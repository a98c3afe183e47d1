//! Configuration system for the runetype text engine.
//!
//! This crate provides:
//!
//! - [`TextConfig`]: font choices, sizes, shaper selection and palette
//! - [`Color`] and [`Palette`] with the inline escape helpers
//! - TOML loading and saving under the XDG config directory

pub mod color;
pub mod config;
pub mod defaults;
pub mod error;
mod types;

pub use color::{CANCEL_ESCAPE, Color, Palette, ansi_escape, colored, palette_escape};
pub use config::{CONTENT_SCALE, TextConfig};
pub use error::ConfigError;
pub use types::{ShaperKind, TextFont};
