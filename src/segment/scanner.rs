//! Tokenizer for the inline control sequences embedded in text.

use std::sync::OnceLock;

use regex::bytes::Regex;
use runetype_config::Palette;
use runetype_config::color::{CANCEL_BYTE, INDEX_BYTE_BASE, PALETTE_MARKER};

const ESC: u8 = 0x1b;

/// SGR body following ESC: introducer, parameters, final `m`.
static ANSI_REGEX: OnceLock<Regex> = OnceLock::new();

fn ansi_regex() -> &'static Regex {
    ANSI_REGEX.get_or_init(|| {
        Regex::new(r"^[\[()]([0-9;AB]*)m").expect("Failed to compile ANSI escape regex")
    })
}

/// A control sequence recognized at some byte position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlDirective {
    /// ANSI select-graphic-rendition; holds the raw parameter string.
    Sgr(String),
    /// Inline palette color by index (extended indices included).
    Palette(usize),
    /// Revert to the base color.
    Cancel,
    Newline,
    /// Malformed or truncated sequence; consumed without effect.
    Ignored,
}

/// Recognize a control sequence starting at `pos`.
///
/// Returns the number of bytes consumed and the directive, or `None` when the
/// byte at `pos` is ordinary text. Only ASCII bytes are ever consumed, so the
/// position after a directive is always a char boundary.
pub fn scan(bytes: &[u8], pos: usize) -> Option<(usize, ControlDirective)> {
    match *bytes.get(pos)? {
        ESC => match ansi_regex().captures(&bytes[pos + 1..]) {
            Some(caps) => {
                let params = String::from_utf8_lossy(&caps[1]).into_owned();
                Some((1 + caps[0].len(), ControlDirective::Sgr(params)))
            }
            None => Some((1, ControlDirective::Ignored)),
        },
        PALETTE_MARKER => match bytes.get(pos + 1).copied() {
            None => Some((1, ControlDirective::Ignored)),
            Some(CANCEL_BYTE) => Some((2, ControlDirective::Cancel)),
            Some(PALETTE_MARKER) => match bytes.get(pos + 2).copied() {
                Some(b) if is_index_byte(b) => Some((
                    3,
                    ControlDirective::Palette((b - INDEX_BYTE_BASE) as usize + Palette::EXTENDED_BASE),
                )),
                _ => Some((2, ControlDirective::Ignored)),
            },
            Some(b) if is_index_byte(b) => {
                Some((2, ControlDirective::Palette((b - INDEX_BYTE_BASE) as usize)))
            }
            Some(_) => Some((1, ControlDirective::Ignored)),
        },
        b'\n' => Some((1, ControlDirective::Newline)),
        _ => None,
    }
}

fn is_index_byte(b: u8) -> bool {
    b.is_ascii() && b >= INDEX_BYTE_BASE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_not_a_directive() {
        assert_eq!(scan(b"abc", 0), None);
        assert_eq!(scan(b"abc", 3), None);
    }

    #[test]
    fn test_sgr_sequences() {
        assert_eq!(
            scan(b"\x1b[31mX", 0),
            Some((5, ControlDirective::Sgr("31".into())))
        );
        assert_eq!(
            scan(b"x\x1b[38;5;200m", 1),
            Some((11, ControlDirective::Sgr("38;5;200".into())))
        );
        assert_eq!(scan(b"\x1b(Bm", 0), Some((4, ControlDirective::Sgr("B".into()))));
        assert_eq!(scan(b"\x1b[m", 0), Some((3, ControlDirective::Sgr(String::new()))));
    }

    #[test]
    fn test_malformed_escape_consumes_only_esc() {
        assert_eq!(scan(b"\x1b[31x", 0), Some((1, ControlDirective::Ignored)));
        assert_eq!(scan(b"\x1b", 0), Some((1, ControlDirective::Ignored)));
    }

    #[test]
    fn test_palette_sequences() {
        assert_eq!(scan(b"\x0b#", 0), Some((2, ControlDirective::Palette(2))));
        assert_eq!(scan(b"\x0b$", 0), Some((2, ControlDirective::Cancel)));
        assert_eq!(
            scan(b"\x0b\x0b!", 0),
            Some((3, ControlDirective::Palette(Palette::EXTENDED_BASE)))
        );
        assert_eq!(scan(b"\x0b", 0), Some((1, ControlDirective::Ignored)));
        assert_eq!(scan(b"\x0b\x0b", 0), Some((2, ControlDirective::Ignored)));
        // A non-ASCII byte is left for the text decoder.
        assert_eq!(scan("\x0bé".as_bytes(), 0), Some((1, ControlDirective::Ignored)));
    }

    #[test]
    fn test_newline() {
        assert_eq!(scan(b"a\nb", 1), Some((1, ControlDirective::Newline)));
    }
}
