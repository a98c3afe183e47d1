//! runetype: text shaping and glyph caching.
//!
//! Turns UTF-8 text carrying inline color directives and line breaks into
//! positioned glyphs drawn from one shared atlas texture.
//!
//! - [`segment`]: scans control sequences and splits text into runs of one
//!   font and one color
//! - [`layout`]: shapes runs, wraps lines and blits glyphs
//! - [`TextEngine`]: the measuring and drawing API over a [`Renderer`]
//! - [`TextBuf`]: text pre-rendered into its own texture
//! - [`block_chars`]: text as Unicode block characters for plain-text output
//!
//! Fonts, configuration and rendering live in the `runetype-fonts`,
//! `runetype-config` and `runetype-render` crates, re-exported here.

/// Crate version, reported by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod block_chars;
pub mod cli;
pub mod debug;
pub mod engine;
pub mod error;
pub mod layout;
pub mod segment;
pub mod text_buf;

pub use block_chars::BlockMode;
pub use engine::{Alignment, TextColor, TextEngine};
pub use error::TextError;
pub use layout::{RunFlags, RunMode, RunOutput, RunRequest};
pub use segment::{AttributedRun, ControlDirective};
pub use text_buf::TextBuf;

pub use runetype_config as config;
pub use runetype_fonts as fonts;
pub use runetype_render as render;

pub use runetype_config::{Color, Palette, TextConfig, TextFont};
pub use runetype_fonts::{FontId, FontRegistry};
pub use runetype_render::{Point, Rect, Renderer, Size, SoftwareRenderer};
