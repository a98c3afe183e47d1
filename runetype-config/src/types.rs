//! Enumerated configuration choices.

use serde::{Deserialize, Serialize};

/// Font family offered for content and heading text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextFont {
    Nunito,
    FiraSans,
    Tinos,
    Literata,
    #[default]
    SourceSans3,
    Iosevka,
}

impl TextFont {
    /// Every selectable family, in menu order.
    pub const ALL: [TextFont; 6] = [
        TextFont::Nunito,
        TextFont::FiraSans,
        TextFont::Tinos,
        TextFont::Literata,
        TextFont::SourceSans3,
        TextFont::Iosevka,
    ];

    /// Human readable family name.
    pub fn display_name(self) -> &'static str {
        match self {
            TextFont::Nunito => "Nunito",
            TextFont::FiraSans => "Fira Sans",
            TextFont::Tinos => "Tinos",
            TextFont::Literata => "Literata",
            TextFont::SourceSans3 => "Source Sans 3",
            TextFont::Iosevka => "Iosevka",
        }
    }
}

impl std::fmt::Display for TextFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for TextFont {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "nunito" => Ok(TextFont::Nunito),
            "firasans" => Ok(TextFont::FiraSans),
            "tinos" => Ok(TextFont::Tinos),
            "literata" => Ok(TextFont::Literata),
            "sourcesans3" | "sourcesans" => Ok(TextFont::SourceSans3),
            "iosevka" => Ok(TextFont::Iosevka),
            _ => Err(format!("unknown font '{s}'")),
        }
    }
}

/// Which shaping implementation positions glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShaperKind {
    /// OpenType shaping through rustybuzz: kerning, ligatures, complex scripts.
    #[default]
    #[serde(rename = "harfbuzz")]
    HarfBuzz,
    /// One glyph per codepoint, advancing by the glyph's advance width.
    Simple,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_font_from_str_accepts_display_names() {
        for font in TextFont::ALL {
            assert_eq!(font.display_name().parse::<TextFont>(), Ok(font));
        }
        assert_eq!("fira_sans".parse::<TextFont>(), Ok(TextFont::FiraSans));
        assert!("comic".parse::<TextFont>().is_err());
    }
}
