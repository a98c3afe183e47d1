//! Typed error variants for the runetype-config crate.
//!
//! Callers that only want a message can convert into `anyhow::Error`; callers
//! that care about the failure mode match on the variants.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading, saving or validating a [`TextConfig`].
///
/// [`TextConfig`]: crate::TextConfig
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read or written.
    #[error("I/O error on config file '{path}': {source}")]
    Io {
        /// File that was being accessed.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file contained invalid TOML.
    #[error("TOML parse error in config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized.
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A field value failed semantic validation.
    ///
    /// The inner string names the field and the reason.
    #[error("Config validation error: {0}")]
    Validation(String),
}
