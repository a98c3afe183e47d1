//! Text colors, the inline palette and the escape strings that select it.
//!
//! Inline color directives come in two flavors:
//! - `\x0b` followed by an index byte selects a palette entry (`byte - 33`).
//!   A doubled `\x0b\x0b` selects from the extended range starting at
//!   [`Palette::EXTENDED_BASE`]. `\x0b$` cancels back to the caller's color.
//! - `ESC [ ... m` SGR sequences select ANSI, xterm-256 or true colors.

use serde::{Deserialize, Serialize};

/// Byte that introduces a palette directive.
pub const PALETTE_MARKER: u8 = 0x0B;

/// Index byte that cancels any palette or ANSI color.
pub const CANCEL_BYTE: u8 = b'$';

/// First usable index byte.
pub const INDEX_BYTE_BASE: u8 = 33;

/// The full cancel directive.
pub const CANCEL_ESCAPE: &str = "\x0b$";

/// A color in RGB format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn as_array(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// Named colors addressable through inline palette directives.
///
/// Index 3 is shadowed by [`CANCEL_BYTE`] and can never be selected inline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Palette {
    /// Base entries, selected by `\x0b` + (33 + index).
    pub colors: Vec<Color>,
    /// Extended entries, selected by `\x0b\x0b` + (33 + index - 95).
    pub extended: Vec<Color>,
}

impl Palette {
    pub const TEXT: usize = 0;
    pub const DIM: usize = 1;
    pub const RED: usize = 2;
    pub const GREEN: usize = 4;
    pub const YELLOW: usize = 5;
    pub const BLUE: usize = 6;
    pub const MAGENTA: usize = 7;
    pub const CYAN: usize = 8;
    pub const ORANGE: usize = 9;
    pub const GREY: usize = 10;
    pub const BLACK: usize = 11;
    pub const WHITE: usize = 12;
    pub const LINK: usize = 13;
    pub const ERROR: usize = 14;

    /// Index of the first extended palette entry.
    pub const EXTENDED_BASE: usize = 95;

    /// Look up an inline palette index. `None` for indices with no entry.
    pub fn lookup(&self, index: usize) -> Option<Color> {
        if index >= Self::EXTENDED_BASE {
            self.extended.get(index - Self::EXTENDED_BASE).copied()
        } else {
            self.colors.get(index).copied()
        }
    }

    /// Apply the parameters of an SGR (`ESC [ params m`) sequence to `current`.
    ///
    /// Only foreground selections are honored: `0`, empty and `39` restore
    /// `base`, `30-37`/`90-97` pick an ANSI color, `38;5;n` an xterm-256
    /// color and `38;2;r;g;b` a true color. Anything else is ignored.
    pub fn apply_sgr(&self, params: &str, current: Color, base: Color) -> Color {
        let codes: Vec<u16> = params
            .split(';')
            .map(|p| {
                p.chars()
                    .filter(|c| c.is_ascii_digit())
                    .collect::<String>()
                    .parse()
                    .unwrap_or(0)
            })
            .collect();

        let mut color = current;
        let mut i = 0;
        while i < codes.len() {
            match codes[i] {
                0 | 39 => color = base,
                code @ 30..=37 => color = ansi_color((code - 30) as u8),
                code @ 90..=97 => color = ansi_color((code - 90 + 8) as u8),
                38 => match codes.get(i + 1) {
                    Some(5) => {
                        if let Some(&n) = codes.get(i + 2) {
                            color = xterm_color(n.min(255) as u8);
                        }
                        i += 2;
                    }
                    Some(2) => {
                        if let (Some(&r), Some(&g), Some(&b)) =
                            (codes.get(i + 2), codes.get(i + 3), codes.get(i + 4))
                        {
                            color = Color::new(
                                r.min(255) as u8,
                                g.min(255) as u8,
                                b.min(255) as u8,
                            );
                        }
                        i += 4;
                    }
                    _ => {}
                },
                _ => {}
            }
            i += 1;
        }
        color
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: vec![
                Color::new(230, 230, 230), // text
                Color::new(150, 150, 150), // dim
                Color::new(235, 80, 70),   // red
                Color::new(230, 230, 230), // shadowed by cancel
                Color::new(100, 200, 110), // green
                Color::new(240, 200, 80),  // yellow
                Color::new(90, 150, 240),  // blue
                Color::new(200, 110, 220), // magenta
                Color::new(90, 200, 210),  // cyan
                Color::new(245, 150, 60),  // orange
                Color::new(120, 120, 120), // grey
                Color::new(0, 0, 0),       // black
                Color::new(255, 255, 255), // white
                Color::new(110, 170, 255), // link
                Color::new(255, 70, 70),   // error
            ],
            extended: Vec::new(),
        }
    }
}

/// The 16 standard ANSI colors.
pub fn ansi_color(index: u8) -> Color {
    const ANSI: [Color; 16] = [
        Color::new(0, 0, 0),
        Color::new(205, 49, 49),
        Color::new(13, 188, 121),
        Color::new(229, 229, 16),
        Color::new(36, 114, 200),
        Color::new(188, 63, 188),
        Color::new(17, 168, 205),
        Color::new(229, 229, 229),
        Color::new(102, 102, 102),
        Color::new(241, 76, 76),
        Color::new(35, 209, 139),
        Color::new(245, 245, 67),
        Color::new(59, 142, 234),
        Color::new(214, 112, 214),
        Color::new(41, 184, 219),
        Color::new(255, 255, 255),
    ];
    ANSI[(index & 15) as usize]
}

/// The xterm 256-color table: ANSI colors, a 6x6x6 cube and a gray ramp.
pub fn xterm_color(index: u8) -> Color {
    match index {
        0..=15 => ansi_color(index),
        16..=231 => {
            const LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];
            let i = index - 16;
            Color::new(
                LEVELS[(i / 36) as usize],
                LEVELS[((i / 6) % 6) as usize],
                LEVELS[(i % 6) as usize],
            )
        }
        _ => {
            let level = 8 + (index - 232) * 10;
            Color::new(level, level, level)
        }
    }
}

/// Directive selecting palette entry `index`.
///
/// Returns `None` when the index cannot be encoded as a printable byte.
pub fn palette_escape(index: usize) -> Option<String> {
    let (prefix, offset) = if index >= Palette::EXTENDED_BASE {
        ("\x0b\x0b", index - Palette::EXTENDED_BASE)
    } else {
        ("\x0b", index)
    };
    let byte = INDEX_BYTE_BASE as usize + offset;
    if byte > 0x7E || byte == CANCEL_BYTE as usize {
        return None;
    }
    Some(format!("{prefix}{}", byte as u8 as char))
}

/// True-color SGR directive for `color`.
pub fn ansi_escape(color: Color) -> String {
    format!("\x1b[38;2;{};{};{}m", color.r, color.g, color.b)
}

/// Wrap `text` in a palette directive followed by a cancel.
pub fn colored(index: usize, text: &str) -> String {
    match palette_escape(index) {
        Some(escape) => format!("{escape}{text}{CANCEL_ESCAPE}"),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_escape_encoding() {
        assert_eq!(palette_escape(Palette::RED).as_deref(), Some("\x0b#"));
        assert_eq!(palette_escape(Palette::EXTENDED_BASE).as_deref(), Some("\x0b\x0b!"));
        assert_eq!(palette_escape(3), None, "index 3 collides with the cancel byte");
        assert_eq!(palette_escape(94), None, "past the printable range");
    }

    #[test]
    fn test_lookup_extended_range() {
        let mut palette = Palette::default();
        assert_eq!(palette.lookup(Palette::EXTENDED_BASE), None);
        palette.extended.push(Color::new(1, 2, 3));
        assert_eq!(palette.lookup(Palette::EXTENDED_BASE), Some(Color::new(1, 2, 3)));
        assert_eq!(palette.lookup(50), None);
    }

    #[test]
    fn test_apply_sgr() {
        let palette = Palette::default();
        let base = Color::WHITE;
        assert_eq!(palette.apply_sgr("31", base, base), ansi_color(1));
        assert_eq!(palette.apply_sgr("1;94", base, base), ansi_color(12));
        assert_eq!(palette.apply_sgr("0", Color::BLACK, base), base);
        assert_eq!(palette.apply_sgr("", Color::BLACK, base), base);
        assert_eq!(
            palette.apply_sgr("38;2;10;20;30", base, base),
            Color::new(10, 20, 30)
        );
        assert_eq!(palette.apply_sgr("38;5;196", base, base), Color::new(255, 0, 0));
        assert_eq!(palette.apply_sgr("38;5;232", base, base), Color::new(8, 8, 8));
        assert_eq!(palette.apply_sgr("4", Color::BLACK, base), Color::BLACK);
    }
}
