//! The [`TextConfig`] struct and its TOML persistence.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::Palette;
use crate::defaults;
use crate::error::ConfigError;
use crate::types::{ShaperKind, TextFont};

/// Extra scale applied to content text over UI text.
pub const CONTENT_SCALE: f32 = 1.3;

/// Everything the text engine needs to build its font table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TextConfig {
    /// Family used for body text.
    pub content_font: TextFont,

    /// Family used for big / large / huge heading text.
    pub heading_font: TextFont,

    /// Content size multiplier; must be positive.
    pub content_font_size: f32,

    /// Pixel height of regular UI text.
    pub ui_font_size: f32,

    /// Optional user-supplied font consulted late in glyph fallback.
    pub symbol_font_path: Option<PathBuf>,

    /// Rasterize a second copy of each glyph shifted by half a pixel.
    pub half_pixel_glyphs: bool,

    /// Shaping implementation.
    pub shaper: ShaperKind,

    /// Capacity of the shaped-run LRU cache.
    pub shape_cache_size: usize,

    /// Colors addressable through inline palette directives.
    pub palette: Palette,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            content_font: TextFont::default(),
            heading_font: TextFont::default(),
            content_font_size: defaults::content_font_size(),
            ui_font_size: defaults::ui_font_size(),
            symbol_font_path: None,
            half_pixel_glyphs: defaults::half_pixel_glyphs(),
            shaper: ShaperKind::default(),
            shape_cache_size: defaults::shape_cache_size(),
            palette: Palette::default(),
        }
    }
}

impl TextConfig {
    /// Pixel size of regular content text.
    pub fn text_size(&self) -> f32 {
        self.ui_font_size * self.content_font_size * CONTENT_SCALE
    }

    /// Check field values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.content_font_size.is_finite() && self.content_font_size > 0.0) {
            return Err(ConfigError::Validation(format!(
                "content_font_size must be positive, got {}",
                self.content_font_size
            )));
        }
        if !(self.ui_font_size.is_finite() && self.ui_font_size >= 1.0) {
            return Err(ConfigError::Validation(format!(
                "ui_font_size must be at least 1, got {}",
                self.ui_font_size
            )));
        }
        if self.shape_cache_size == 0 {
            return Err(ConfigError::Validation(
                "shape_cache_size must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Load from the default location, or defaults when no file exists there.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        log::info!("Config path: {:?}", config_path);
        Self::load_or_default(&config_path)
    }

    /// Load `path` if it exists, otherwise return the defaults without writing.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load_from(path)
        } else {
            log::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Load and validate a config file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: TextConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let text = self.to_toml()?;

        // Atomic save: write to temp file then rename to prevent corruption on crash
        let temp_path = path.with_extension("toml.tmp");
        fs::write(&temp_path, &text).map_err(io_err)?;
        fs::rename(&temp_path, path).map_err(io_err)?;
        Ok(())
    }

    /// The configuration as it would be saved.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get the configuration file path (using XDG convention)
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Get the configuration directory path (using XDG convention)
    pub fn config_dir() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            if let Some(config_dir) = dirs::config_dir() {
                config_dir.join("runetype")
            } else {
                PathBuf::from(".")
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".config").join("runetype")
            } else {
                PathBuf::from(".")
            }
        }
    }
}
