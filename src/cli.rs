//! Command-line interface for runetype.
//!
//! Measures, wraps and renders text through a [`TextEngine`] backed by the
//! software renderer, so every command works headless.
//!
//! Without `--config` the configuration is read from
//! [`TextConfig::config_path`] when that file exists.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use runetype_config::{Color, ShaperKind, TextConfig};
use runetype_fonts::{DirectoryFontSource, FontId, FontSource, SyntheticFontSource, SystemFontSource};
use runetype_render::{Size, SoftwareRenderer, TextureId};

use crate::block_chars::BlockMode;
use crate::debug::DebugLevel;
use crate::engine::TextEngine;
use crate::layout::next_line;
use crate::text_buf::TextBuf;

/// Luminance ramp for the ASCII preview, darkest first.
const RAMP: &[u8] = b" .:-=+*#%@";

/// runetype - text shaping and glyph caching
#[derive(Parser)]
#[command(name = "runetype")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Use fonts installed on the system (the default)
    #[arg(long, global = true, conflicts_with_all = ["font_dir", "synthetic"])]
    pub system: bool,

    /// Load the bundled font files from a directory
    #[arg(long, value_name = "DIR", global = true, conflicts_with = "synthetic")]
    pub font_dir: Option<PathBuf>,

    /// Use generated box glyphs instead of real fonts
    #[arg(long, global = true)]
    pub synthetic: bool,

    /// Configuration file (the per-user file or defaults when omitted)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Shaping implementation, overriding the configuration
    #[arg(long, value_enum, global = true)]
    pub shaper: Option<ShaperArg>,

    /// Log level: 0-4 or off/error/info/debug/trace (overrides DEBUG_LEVEL)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<DebugLevel>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the advance box and visual bounds of TEXT
    Measure {
        text: String,

        #[arg(long, value_enum, default_value_t = FontArg::Regular)]
        font: FontArg,
    },
    /// Word-wrap TEXT to WIDTH pixels and print each line with its size
    Wrap {
        text: String,

        /// Wrap width in pixels
        #[arg(long, default_value_t = 300)]
        width: i32,

        /// Break at the overflowing glyph instead of at whitespace
        #[arg(long)]
        no_wrap: bool,

        #[arg(long, value_enum, default_value_t = FontArg::Regular)]
        font: FontArg,
    },
    /// Draw TEXT into a software framebuffer and print an ASCII preview
    Render {
        text: String,

        /// Wrap width in pixels; unwrapped when omitted
        #[arg(long)]
        width: Option<i32>,

        /// Framebuffer pixels per preview column
        #[arg(long, default_value_t = 2)]
        scale: i32,

        #[arg(long, value_enum, default_value_t = FontArg::Regular)]
        font: FontArg,
    },
    /// Print TEXT as Unicode block characters
    Blocks {
        text: String,

        /// Output height in lines
        #[arg(long, default_value_t = 8)]
        height: i32,

        #[arg(long, value_enum, default_value_t = BlockArg::Quadrants)]
        mode: BlockArg,

        #[arg(long, value_enum, default_value_t = FontArg::Regular)]
        font: FontArg,
    },
    /// Print the effective configuration and where it is read from
    Config {
        /// Write the effective configuration to that file
        #[arg(long)]
        save: bool,
    },
}

/// Font roles selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FontArg {
    Ui,
    UiBold,
    Regular,
    Bold,
    Italic,
    Medium,
    Big,
    LargeBold,
    HugeBold,
    Monospace,
    MonospaceSmall,
}

impl FontArg {
    pub fn font_id(self) -> FontId {
        match self {
            FontArg::Ui => FontId::DEFAULT,
            FontArg::UiBold => FontId::DEFAULT_BOLD,
            FontArg::Regular => FontId::REGULAR,
            FontArg::Bold => FontId::BOLD,
            FontArg::Italic => FontId::ITALIC,
            FontArg::Medium => FontId::MEDIUM,
            FontArg::Big => FontId::BIG,
            FontArg::LargeBold => FontId::LARGE_BOLD,
            FontArg::HugeBold => FontId::HUGE_BOLD,
            FontArg::Monospace => FontId::MONOSPACE,
            FontArg::MonospaceSmall => FontId::MONOSPACE_SMALL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BlockArg {
    Quadrants,
    Shading,
}

impl From<BlockArg> for BlockMode {
    fn from(arg: BlockArg) -> Self {
        match arg {
            BlockArg::Quadrants => BlockMode::Quadrants,
            BlockArg::Shading => BlockMode::Shading,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShaperArg {
    Harfbuzz,
    Simple,
}

impl From<ShaperArg> for ShaperKind {
    fn from(arg: ShaperArg) -> Self {
        match arg {
            ShaperArg::Harfbuzz => ShaperKind::HarfBuzz,
            ShaperArg::Simple => ShaperKind::Simple,
        }
    }
}

impl Cli {
    /// Configuration from `--config` (or the per-user file) with flag
    /// overrides applied.
    pub fn text_config(&self) -> Result<TextConfig> {
        let mut config = match &self.config {
            Some(path) => TextConfig::load_from(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => TextConfig::load().with_context(|| {
                format!("loading {}", TextConfig::config_path().display())
            })?,
        };
        if let Some(shaper) = self.shaper {
            config.shaper = shaper.into();
        }
        Ok(config)
    }

    pub fn font_source(&self) -> Box<dyn FontSource> {
        if self.synthetic {
            Box::new(SyntheticFontSource::new())
        } else if let Some(dir) = &self.font_dir {
            Box::new(DirectoryFontSource::new(dir))
        } else {
            Box::new(SystemFontSource::new())
        }
    }

    /// Engine over a 1x1 software screen; commands draw into textures.
    pub fn engine(&self) -> Result<TextEngine<SoftwareRenderer>> {
        let renderer = SoftwareRenderer::new(Size::new(1, 1));
        TextEngine::new(renderer, self.text_config()?, self.font_source())
            .context("initializing the text engine")
    }
}

/// Execute the parsed command, printing results to stdout.
pub fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Measure { text, font } => {
            let mut engine = cli.engine()?;
            let font = font.font_id();
            let size = engine.measure(font, text);
            let visual = engine.visual_bounds(font, text);
            println!("advance: {size}");
            println!(
                "visual:  {}x{} at ({}, {})",
                visual.w, visual.h, visual.x, visual.y
            );
            println!("line height: {}", engine.line_height(font));
        }
        Commands::Wrap {
            text,
            width,
            no_wrap,
            font,
        } => {
            let mut engine = cli.engine()?;
            let font = font.font_id();
            let mut rest = text.as_str();
            while !rest.is_empty() {
                let (line, next) = if *no_wrap {
                    engine.try_advance_no_wrap(font, rest, *width)
                } else {
                    engine.try_advance(font, rest, *width)
                };
                let next = next_line(rest, next);
                println!("{:>5} | {}", line.w, rest[..next].trim_end_matches('\n'));
                rest = &rest[next..];
            }
        }
        Commands::Render {
            text,
            width,
            scale,
            font,
        } => {
            let mut engine = cli.engine()?;
            let font = font.font_id();
            let buf = match width {
                Some(width) => TextBuf::new_wrap(&mut engine, font, Color::WHITE, *width, text)?,
                None => TextBuf::new(&mut engine, font, Color::WHITE, text)?,
            };
            if let Some(texture) = buf.texture() {
                let preview = ascii_preview(engine.renderer(), texture, buf.size(), (*scale).max(1));
                print!("{preview}");
            }
            println!("{}", buf.size());
            buf.destroy(engine.renderer_mut());
        }
        Commands::Blocks {
            text,
            height,
            mode,
            font,
        } => {
            let engine = cli.engine()?;
            let blocks = engine.render_block_chars(font.font_id(), *height, (*mode).into(), text);
            println!("{blocks}");
        }
        Commands::Config { save } => show_config(cli, *save)?,
    }
    Ok(())
}

/// Print the effective configuration, saving it first when asked.
///
/// A missing `--config` file is not an error here, so `--save` can create it.
fn show_config(cli: &Cli, save: bool) -> Result<()> {
    let path = cli.config.clone().unwrap_or_else(TextConfig::config_path);
    let mut config = TextConfig::load_or_default(&path)
        .with_context(|| format!("loading {}", path.display()))?;
    if let Some(shaper) = cli.shaper {
        config.shaper = shaper.into();
    }
    if save {
        match &cli.config {
            Some(path) => config.save_to(path)?,
            None => config.save()?,
        }
        log::info!("Saved configuration to {}", path.display());
    }
    println!("# {}", path.display());
    print!("{}", config.to_toml()?);
    Ok(())
}

/// Coarse rendering of a texture's coverage; each cell is `scale` pixels
/// wide and twice as tall.
pub fn ascii_preview(renderer: &SoftwareRenderer, texture: TextureId, size: Size, scale: i32) -> String {
    let (cell_w, cell_h) = (scale, scale * 2);
    let mut out = String::new();
    for top in (0..size.h).step_by(cell_h as usize) {
        for left in (0..size.w).step_by(cell_w as usize) {
            let mut total = 0u32;
            let mut count = 0u32;
            for y in top..(top + cell_h).min(size.h) {
                for x in left..(left + cell_w).min(size.w) {
                    total += renderer.texture_pixel(texture, x, y)[3] as u32;
                    count += 1;
                }
            }
            let level = (total / count.max(1)) as usize * (RAMP.len() - 1) / 255;
            out.push(RAMP[level] as char);
        }
        out.push('\n');
    }
    out
}
