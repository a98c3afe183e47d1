//! Tests for command-line parsing and configuration loading.

use std::io::Write;

use clap::Parser;
use runetype::cli::{self, BlockArg, Cli, Commands, FontArg, ascii_preview};
use runetype::config::{ShaperKind, TextConfig, TextFont};
use runetype::fonts::SyntheticFontSource;
use runetype::{Color, FontId, Size, SoftwareRenderer, TextBuf, TextEngine};
use tempfile::{NamedTempFile, tempdir};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("runetype").chain(args.iter().copied()))
        .expect("arguments should parse")
}

#[test]
fn test_measure_defaults() {
    let cli = parse(&["--synthetic", "measure", "Hello"]);
    assert!(cli.synthetic);
    match &cli.command {
        Commands::Measure { text, font } => {
            assert_eq!(text, "Hello");
            assert_eq!(*font, FontArg::Regular);
        }
        _ => panic!("expected measure"),
    }
    assert!(cli.config.is_none());
    assert!(cli.text_config().is_ok(), "no per-user file or a valid one");
}

#[test]
fn test_font_argument_maps_to_face() {
    let cli = parse(&["wrap", "text", "--font", "monospace-small", "--width", "40"]);
    match cli.command {
        Commands::Wrap { width, font, no_wrap, .. } => {
            assert_eq!(width, 40);
            assert!(!no_wrap);
            assert_eq!(font.font_id(), FontId::MONOSPACE_SMALL);
        }
        _ => panic!("expected wrap"),
    }
}

#[test]
fn test_font_sources_conflict() {
    let result = Cli::try_parse_from(["runetype", "--system", "--synthetic", "measure", "x"]);
    assert!(result.is_err());
}

#[test]
fn test_config_file_and_shaper_override() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "content_font = \"literata\"\nshaper = \"harfbuzz\"").unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let cli = parse(&["--config", &path, "--shaper", "simple", "measure", "x"]);
    let config = cli.text_config().unwrap();
    assert_eq!(config.content_font, TextFont::Literata);
    assert_eq!(config.shaper, ShaperKind::Simple);
}

#[test]
fn test_invalid_config_file_is_reported() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "content_font_size = -2.0").unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let cli = parse(&["--config", &path, "measure", "x"]);
    let err = cli.text_config().unwrap_err();
    assert!(format!("{err:#}").contains("loading"));
}

#[test]
fn test_commands_run_on_synthetic_fonts() {
    for args in [
        &["--synthetic", "measure", "Hello"][..],
        &["--synthetic", "wrap", "one two three", "--width", "30"],
        &["--synthetic", "wrap", "abcdef", "--width", "10", "--no-wrap"],
        &["--synthetic", "render", "Hi", "--scale", "3"],
        &["--synthetic", "--shaper", "simple", "render", "a b c", "--width", "20"],
        &["--synthetic", "blocks", "Hi"],
        &["--synthetic", "blocks", "Hi", "--mode", "shading", "--height", "4"],
    ] {
        let cli = parse(args);
        cli::run(&cli).unwrap_or_else(|e| panic!("{args:?} failed: {e:#}"));
    }
}

#[test]
fn test_ascii_preview_shows_glyphs() {
    let mut engine = TextEngine::new(
        SoftwareRenderer::new(Size::new(1, 1)),
        Default::default(),
        Box::new(SyntheticFontSource::new()),
    )
    .unwrap();
    let buf = TextBuf::new(&mut engine, FontId::REGULAR, Color::WHITE, "H").unwrap();
    let preview = ascii_preview(engine.renderer(), buf.texture().unwrap(), buf.size(), 1);
    let rows: Vec<&str> = preview.lines().collect();
    assert_eq!(rows.len(), ((buf.size().h + 1) / 2) as usize);
    assert!(preview.contains('@'));
}

#[test]
fn test_blocks_arguments() {
    let cli = parse(&["blocks", "Banner", "--mode", "shading", "--height", "5"]);
    match cli.command {
        Commands::Blocks { height, mode, font, .. } => {
            assert_eq!(height, 5);
            assert_eq!(mode, BlockArg::Shading);
            assert_eq!(font, FontArg::Regular);
        }
        _ => panic!("expected blocks"),
    }
}

#[test]
fn test_config_save_writes_effective_configuration() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("runetype").join("config.toml");
    let path_arg = path.to_str().unwrap().to_string();

    let cli = parse(&["--config", &path_arg, "--shaper", "simple", "config", "--save"]);
    cli::run(&cli).unwrap();
    let saved = TextConfig::load_from(&path).unwrap();
    assert_eq!(saved.shaper, ShaperKind::Simple);
    assert_eq!(saved.content_font, TextConfig::default().content_font);

    // Printing alone leaves the file untouched.
    let cli = parse(&["--config", &path_arg, "config"]);
    cli::run(&cli).unwrap();
    assert_eq!(TextConfig::load_from(&path).unwrap(), saved);
}
