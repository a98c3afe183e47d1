//! The bundled font files the registry draws from.

use runetype_config::TextFont;

/// One font file known to the engine.
///
/// Each file is loaded at most once per registry build and shared by every
/// size variant that uses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFile {
    NunitoRegular,
    NunitoBold,
    NunitoExtraBold,
    NunitoLightItalic,
    NunitoExtraLight,
    FiraSansRegular,
    FiraSansSemiBold,
    FiraSansBold,
    FiraSansItalic,
    FiraSansLight,
    TinosRegular,
    TinosBold,
    TinosItalic,
    LiterataRegular,
    LiterataBold,
    LiterataLightItalic,
    LiterataExtraLight,
    SourceSans3Regular,
    SourceSans3Semibold,
    SourceSans3Bold,
    SourceSans3Italic,
    SourceSans3ExtraLight,
    IosevkaTerm,
    NotoSansSymbols,
    NotoSansSymbols2,
    SmolEmoji,
    NotoEmoji,
    NotoSansJp,
    NotoSansSc,
    NanumGothic,
    NotoSansArabicUi,
}

/// Style slot within a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    Regular,
    Semibold,
    Bold,
    Italic,
    Light,
}

impl FontFile {
    /// File name inside a font directory.
    pub fn file_name(self) -> &'static str {
        match self {
            FontFile::NunitoRegular => "Nunito-Regular.ttf",
            FontFile::NunitoBold => "Nunito-Bold.ttf",
            FontFile::NunitoExtraBold => "Nunito-ExtraBold.ttf",
            FontFile::NunitoLightItalic => "Nunito-LightItalic.ttf",
            FontFile::NunitoExtraLight => "Nunito-ExtraLight.ttf",
            FontFile::FiraSansRegular => "FiraSans-Regular.ttf",
            FontFile::FiraSansSemiBold => "FiraSans-SemiBold.ttf",
            FontFile::FiraSansBold => "FiraSans-Bold.ttf",
            FontFile::FiraSansItalic => "FiraSans-Italic.ttf",
            FontFile::FiraSansLight => "FiraSans-Light.ttf",
            FontFile::TinosRegular => "Tinos-Regular.ttf",
            FontFile::TinosBold => "Tinos-Bold.ttf",
            FontFile::TinosItalic => "Tinos-Italic.ttf",
            FontFile::LiterataRegular => "Literata-Regular.ttf",
            FontFile::LiterataBold => "Literata-Bold.ttf",
            FontFile::LiterataLightItalic => "Literata-LightItalic.ttf",
            FontFile::LiterataExtraLight => "Literata-ExtraLight.ttf",
            FontFile::SourceSans3Regular => "SourceSans3-Regular.ttf",
            FontFile::SourceSans3Semibold => "SourceSans3-Semibold.ttf",
            FontFile::SourceSans3Bold => "SourceSans3-Bold.ttf",
            FontFile::SourceSans3Italic => "SourceSans3-It.ttf",
            FontFile::SourceSans3ExtraLight => "SourceSans3-ExtraLight.ttf",
            FontFile::IosevkaTerm => "IosevkaTerm-Regular.ttf",
            FontFile::NotoSansSymbols => "NotoSansSymbols-Regular.ttf",
            FontFile::NotoSansSymbols2 => "NotoSansSymbols2-Regular.ttf",
            FontFile::SmolEmoji => "SmolEmoji-Regular.ttf",
            FontFile::NotoEmoji => "NotoEmoji-Regular.ttf",
            FontFile::NotoSansJp => "NotoSansJP-Regular.otf",
            FontFile::NotoSansSc => "NotoSansSC-Regular.otf",
            FontFile::NanumGothic => "NanumGothic-Regular.ttf",
            FontFile::NotoSansArabicUi => "NotoSansArabicUI-Regular.ttf",
        }
    }

    /// Family name for system font lookup.
    pub fn family(self) -> &'static str {
        match self {
            FontFile::NunitoRegular
            | FontFile::NunitoBold
            | FontFile::NunitoExtraBold
            | FontFile::NunitoLightItalic
            | FontFile::NunitoExtraLight => "Nunito",
            FontFile::FiraSansRegular
            | FontFile::FiraSansSemiBold
            | FontFile::FiraSansBold
            | FontFile::FiraSansItalic
            | FontFile::FiraSansLight => "Fira Sans",
            FontFile::TinosRegular | FontFile::TinosBold | FontFile::TinosItalic => "Tinos",
            FontFile::LiterataRegular
            | FontFile::LiterataBold
            | FontFile::LiterataLightItalic
            | FontFile::LiterataExtraLight => "Literata",
            FontFile::SourceSans3Regular
            | FontFile::SourceSans3Semibold
            | FontFile::SourceSans3Bold
            | FontFile::SourceSans3Italic
            | FontFile::SourceSans3ExtraLight => "Source Sans 3",
            FontFile::IosevkaTerm => "Iosevka Term",
            FontFile::NotoSansSymbols => "Noto Sans Symbols",
            FontFile::NotoSansSymbols2 => "Noto Sans Symbols 2",
            FontFile::SmolEmoji => "Smol Emoji",
            FontFile::NotoEmoji => "Noto Emoji",
            FontFile::NotoSansJp => "Noto Sans JP",
            FontFile::NotoSansSc => "Noto Sans SC",
            FontFile::NanumGothic => "NanumGothic",
            FontFile::NotoSansArabicUi => "Noto Sans Arabic UI",
        }
    }

    /// CSS-style weight for system font lookup.
    pub fn weight(self) -> u16 {
        match self {
            FontFile::NunitoExtraLight
            | FontFile::LiterataExtraLight
            | FontFile::SourceSans3ExtraLight => 200,
            FontFile::NunitoLightItalic | FontFile::FiraSansLight | FontFile::LiterataLightItalic => {
                300
            }
            FontFile::FiraSansSemiBold | FontFile::SourceSans3Semibold => 600,
            FontFile::NunitoBold
            | FontFile::FiraSansBold
            | FontFile::TinosBold
            | FontFile::LiterataBold
            | FontFile::SourceSans3Bold => 700,
            FontFile::NunitoExtraBold => 800,
            _ => 400,
        }
    }

    pub fn italic(self) -> bool {
        matches!(
            self,
            FontFile::NunitoLightItalic
                | FontFile::FiraSansItalic
                | FontFile::TinosItalic
                | FontFile::LiterataLightItalic
                | FontFile::SourceSans3Italic
        )
    }

    /// Both Noto Sans Symbols files need half the usual vertical centering.
    pub fn halves_vertical_offset(self) -> bool {
        matches!(self, FontFile::NotoSansSymbols | FontFile::NotoSansSymbols2)
    }

    /// The file holding `style` for a content family.
    pub fn for_family(font: TextFont, style: Style) -> FontFile {
        use FontFile::*;
        match (font, style) {
            (TextFont::Nunito, Style::Regular) => NunitoRegular,
            (TextFont::Nunito, Style::Semibold) => NunitoBold,
            (TextFont::Nunito, Style::Bold) => NunitoExtraBold,
            (TextFont::Nunito, Style::Italic) => NunitoLightItalic,
            (TextFont::Nunito, Style::Light) => NunitoExtraLight,
            (TextFont::FiraSans, Style::Regular) => FiraSansRegular,
            (TextFont::FiraSans, Style::Semibold) => FiraSansSemiBold,
            (TextFont::FiraSans, Style::Bold) => FiraSansBold,
            (TextFont::FiraSans, Style::Italic) => FiraSansItalic,
            (TextFont::FiraSans, Style::Light) => FiraSansLight,
            (TextFont::Tinos, Style::Regular | Style::Light) => TinosRegular,
            (TextFont::Tinos, Style::Semibold | Style::Bold) => TinosBold,
            (TextFont::Tinos, Style::Italic) => TinosItalic,
            (TextFont::Literata, Style::Regular) => LiterataRegular,
            (TextFont::Literata, Style::Semibold | Style::Bold) => LiterataBold,
            (TextFont::Literata, Style::Italic) => LiterataLightItalic,
            (TextFont::Literata, Style::Light) => LiterataExtraLight,
            (TextFont::SourceSans3, Style::Regular) => SourceSans3Regular,
            (TextFont::SourceSans3, Style::Semibold) => SourceSans3Semibold,
            (TextFont::SourceSans3, Style::Bold) => SourceSans3Bold,
            (TextFont::SourceSans3, Style::Italic) => SourceSans3Italic,
            (TextFont::SourceSans3, Style::Light) => SourceSans3ExtraLight,
            (TextFont::Iosevka, _) => IosevkaTerm,
        }
    }
}

/// Glyph scaling applied when `font` is used for content or headings.
pub fn family_glyph_scale(font: TextFont) -> f32 {
    match font {
        TextFont::FiraSans | TextFont::Tinos => 0.85,
        TextFont::Iosevka => 0.866,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_family_style_has_a_file() {
        let styles = [
            Style::Regular,
            Style::Semibold,
            Style::Bold,
            Style::Italic,
            Style::Light,
        ];
        for font in TextFont::ALL {
            for style in styles {
                let file = FontFile::for_family(font, style);
                assert!(!file.file_name().is_empty());
            }
        }
        assert!(FontFile::for_family(TextFont::Tinos, Style::Italic).italic());
        assert_eq!(FontFile::SourceSans3Bold.weight(), 700);
    }
}
