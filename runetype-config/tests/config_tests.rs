//! Integration tests for runetype-config persistence.

use runetype_config::{Color, ConfigError, ShaperKind, TextConfig, TextFont};
use tempfile::tempdir;

#[test]
fn test_save_then_load_preserves_fields() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = TextConfig {
        content_font: TextFont::Literata,
        heading_font: TextFont::FiraSans,
        content_font_size: 1.25,
        shaper: ShaperKind::Simple,
        symbol_font_path: Some("/tmp/symbols.ttf".into()),
        ..TextConfig::default()
    };
    config.palette.extended.push(Color::new(12, 34, 56));

    config.save_to(&path).expect("save should create parent directories");
    let loaded = TextConfig::load_from(&path).expect("saved config should load");
    assert_eq!(loaded, config);
}

#[test]
fn test_partial_file_uses_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "content_font = \"tinos\"\n").unwrap();

    let loaded = TextConfig::load_from(&path).unwrap();
    assert_eq!(loaded.content_font, TextFont::Tinos);
    assert_eq!(loaded.heading_font, TextConfig::default().heading_font);
    assert_eq!(loaded.ui_font_size, TextConfig::default().ui_font_size);
}

#[test]
fn test_invalid_size_is_rejected_on_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "content_font_size = 0.0\n").unwrap();

    let err = TextConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)), "got {err:?}");
}

#[test]
fn test_malformed_toml_is_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "content_font = [").unwrap();

    assert!(matches!(
        TextConfig::load_from(&path),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = TextConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_missing_file_loads_defaults_without_writing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let loaded = TextConfig::load_or_default(&path).unwrap();
    assert_eq!(loaded, TextConfig::default());
    assert!(!path.exists());
}

#[test]
fn test_default_path_lives_in_config_dir() {
    let path = TextConfig::config_path();
    assert_eq!(path.file_name().unwrap(), "config.toml");
    assert_eq!(path.parent().unwrap(), TextConfig::config_dir());
    assert!(TextConfig::config_dir().ends_with("runetype"));
}

#[test]
fn test_to_toml_loads_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let config = TextConfig {
        content_font: TextFont::Tinos,
        ..TextConfig::default()
    };
    std::fs::write(&path, config.to_toml().unwrap()).unwrap();
    assert_eq!(TextConfig::load_or_default(&path).unwrap(), config);
}
