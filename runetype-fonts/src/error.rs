//! Typed error types for runetype-fonts.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to obtain or parse a font.
#[derive(Debug, Error)]
pub enum FontError {
    /// A font file could not be read from disk.
    #[error("Font file read failed for '{path}': {source}")]
    Io {
        /// Path of the font file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The source has no font matching the request.
    #[error("Font not found: {0}")]
    NotFound(String),

    /// The bytes could not be parsed as a font.
    #[error("Invalid font data: {0}")]
    InvalidData(String),

    /// Not a single font in the table could be loaded.
    #[error("No usable font: every font file failed to load")]
    NoUsableFont,
}
