//! The fixed table of sized faces and glyph resolution across it.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use runetype_config::{TextConfig, TextFont};

use crate::catalog::{FontFile, Style, family_glyph_scale};
use crate::error::FontError;
use crate::face::{FallbackSet, Family, FontFace, FontId, SizeClass};
use crate::resolver::{FallbackRule, FallbackTarget, Resolved, default_rules};
use crate::source::FontSource;
use crate::typeface::Typeface;

/// Which family a primary face draws from.
#[derive(Debug, Clone, Copy)]
enum Role {
    Ui,
    Content,
    Heading,
    Mono,
    DefaultContent,
}

struct PrimarySpec {
    id: FontId,
    role: Role,
    style: Style,
    factor: f32,
    class: SizeClass,
}

const fn spec(id: FontId, role: Role, style: Style, factor: f32, class: SizeClass) -> PrimarySpec {
    PrimarySpec {
        id,
        role,
        style,
        factor,
        class,
    }
}

const PRIMARY_FACES: [PrimarySpec; FontId::PRIMARY_COUNT as usize] = [
    spec(FontId::DEFAULT, Role::Ui, Style::Regular, 1.0, SizeClass::UiNormal),
    spec(FontId::DEFAULT_MEDIUM, Role::Ui, Style::Regular, 1.125, SizeClass::UiMedium),
    spec(FontId::DEFAULT_BIG, Role::Ui, Style::Regular, 1.333, SizeClass::UiBig),
    spec(FontId::DEFAULT_LARGE, Role::Ui, Style::Regular, 1.666, SizeClass::UiLarge),
    spec(FontId::DEFAULT_TINY, Role::Ui, Style::Semibold, 0.8, SizeClass::UiNormal),
    spec(FontId::DEFAULT_BOLD, Role::Ui, Style::Bold, 1.0, SizeClass::UiNormal),
    spec(FontId::DEFAULT_MEDIUM_BOLD, Role::Ui, Style::Bold, 1.125, SizeClass::UiMedium),
    spec(FontId::DEFAULT_BIG_BOLD, Role::Ui, Style::Bold, 1.333, SizeClass::UiBig),
    spec(FontId::DEFAULT_LARGE_BOLD, Role::Ui, Style::Bold, 1.666, SizeClass::UiLarge),
    spec(FontId::REGULAR, Role::Content, Style::Regular, 1.0, SizeClass::Normal),
    spec(FontId::BOLD, Role::Content, Style::Bold, 1.0, SizeClass::Normal),
    spec(FontId::ITALIC, Role::Content, Style::Italic, 1.0, SizeClass::Normal),
    spec(FontId::MEDIUM, Role::Content, Style::Regular, 1.2, SizeClass::Medium),
    spec(FontId::BIG, Role::Heading, Style::Regular, 1.333, SizeClass::Big),
    spec(FontId::LARGE_BOLD, Role::Heading, Style::Bold, 1.666, SizeClass::Large),
    spec(FontId::LARGE_LIGHT, Role::Heading, Style::Light, 1.666, SizeClass::Large),
    spec(FontId::HUGE_BOLD, Role::Heading, Style::Bold, 2.0, SizeClass::Huge),
    spec(FontId::MONOSPACE_SMALL, Role::Mono, Style::Regular, 0.71 * 0.8, SizeClass::MonoSmall),
    spec(FontId::MONOSPACE, Role::Mono, Style::Regular, 0.71, SizeClass::Mono),
    spec(FontId::DEFAULT_CONTENT, Role::DefaultContent, Style::Regular, 1.0, SizeClass::Normal),
    spec(FontId::DEFAULT_CONTENT_SMALL, Role::DefaultContent, Style::Regular, 0.8, SizeClass::Normal),
];

/// Files tried, in order, when a primary face's own file fails to load.
const SUBSTITUTES: [FontFile; 2] = [FontFile::SourceSans3Regular, FontFile::IosevkaTerm];

/// Loads each font file at most once.
struct FileCache<'a> {
    source: &'a dyn FontSource,
    loaded: HashMap<FontFile, Option<Arc<dyn Typeface>>>,
}

impl<'a> FileCache<'a> {
    fn new(source: &'a dyn FontSource) -> Self {
        Self {
            source,
            loaded: HashMap::new(),
        }
    }

    fn get(&mut self, file: FontFile) -> Option<Arc<dyn Typeface>> {
        let source = self.source;
        self.loaded
            .entry(file)
            .or_insert_with(|| match source.typeface(file) {
                Ok(face) => {
                    log::debug!("Loaded font file {}", file.file_name());
                    Some(face)
                }
                Err(e) => {
                    log::warn!("Failed to load font {}: {}", file.file_name(), e);
                    None
                }
            })
            .clone()
    }

    /// `file`, or the first loadable substitute.
    fn get_or_substitute(&mut self, file: FontFile) -> Option<(FontFile, Arc<dyn Typeface>)> {
        if let Some(face) = self.get(file) {
            return Some((file, face));
        }
        for substitute in SUBSTITUTES {
            if let Some(face) = self.get(substitute) {
                log::warn!(
                    "Using {} in place of {}",
                    substitute.file_name(),
                    file.file_name()
                );
                return Some((substitute, face));
            }
        }
        self.loaded
            .iter()
            .find_map(|(f, face)| face.clone().map(|face| (*f, face)))
    }
}

/// All sized faces plus the fallback rules that pick among them.
///
/// A registry is immutable once built; reconfiguring builds a new one and the
/// old faces are dropped together.
pub struct FontRegistry {
    primary: Vec<FontFace>,
    /// Indexed by `id - PRIMARY_COUNT`; `None` where the set failed to load.
    fallbacks: Vec<Option<FontFace>>,
    rules: Vec<FallbackRule>,
    content_font: TextFont,
    heading_font: TextFont,
    content_font_size: f32,
    ui_size: f32,
    text_size: f32,
    /// Codepoints already reported missing.
    missing: Mutex<HashSet<char>>,
}

impl std::fmt::Debug for FontRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontRegistry")
            .field("content_font", &self.content_font)
            .field("heading_font", &self.heading_font)
            .field("text_size", &self.text_size)
            .field("faces", &self.faces().count())
            .finish()
    }
}

impl FontRegistry {
    /// Build the full face table for `config` from `source`.
    ///
    /// A primary face whose file is unavailable borrows a substitute file;
    /// fails with [`FontError::NoUsableFont`] when no substitute loads either.
    pub fn build(config: &TextConfig, source: &dyn FontSource) -> Result<Self, FontError> {
        let ui_size = config.ui_font_size;
        let text_size = config.text_size();
        let mut files = FileCache::new(source);
        let mut primary = Vec::with_capacity(PRIMARY_FACES.len());
        let mut fallbacks = Vec::with_capacity(FallbackSet::COUNT * SizeClass::COUNT);

        for spec in &PRIMARY_FACES {
            let (wanted, scale) = match spec.role {
                Role::Ui => (FontFile::for_family(TextFont::SourceSans3, spec.style), 1.0),
                Role::Content => (
                    FontFile::for_family(config.content_font, spec.style),
                    family_glyph_scale(config.content_font),
                ),
                Role::Heading => (
                    FontFile::for_family(config.heading_font, spec.style),
                    family_glyph_scale(config.heading_font),
                ),
                Role::Mono => (FontFile::IosevkaTerm, 1.0),
                Role::DefaultContent => (FontFile::SourceSans3Regular, 1.0),
            };
            let base = match spec.role {
                Role::Ui => ui_size,
                _ => text_size,
            };
            let (file, typeface) = files
                .get_or_substitute(wanted)
                .ok_or(FontError::NoUsableFont)?;
            primary.push(FontFace::new(
                spec.id,
                Family::Bundled(file),
                typeface,
                base * spec.factor,
                scale,
                spec.class,
            ));
        }

        let user = config.symbol_font_path.as_ref().and_then(|path| {
            match source.user_typeface(path) {
                Ok(face) => {
                    log::info!("Loaded user symbol font {:?}", path);
                    Some((path.clone(), face))
                }
                Err(e) => {
                    log::warn!("Failed to load user symbol font {:?}: {}", path, e);
                    None
                }
            }
        });

        for set in FallbackSet::ALL {
            let loaded = match set.file() {
                Some(file) => files.get(file).map(|face| (Family::Bundled(file), face)),
                None => user
                    .as_ref()
                    .map(|(path, face)| (Family::User(path.clone()), Arc::clone(face))),
            };
            for class in SizeClass::ALL {
                let face = loaded.as_ref().map(|(family, typeface)| {
                    FontFace::new(
                        FontId::fallback(set, class),
                        family.clone(),
                        Arc::clone(typeface),
                        class.pixel_size(ui_size, text_size),
                        set.glyph_scale(),
                        class,
                    )
                });
                fallbacks.push(face);
            }
        }

        log::info!(
            "Font registry built: content={} heading={} text_size={:.1} ui_size={:.1} ({} faces)",
            config.content_font,
            config.heading_font,
            text_size,
            ui_size,
            primary.len() + fallbacks.iter().flatten().count()
        );

        Ok(Self {
            primary,
            fallbacks,
            rules: default_rules(cfg!(target_os = "macos")),
            content_font: config.content_font,
            heading_font: config.heading_font,
            content_font_size: config.content_font_size,
            ui_size,
            text_size,
            missing: Mutex::new(HashSet::new()),
        })
    }

    /// Replace the fallback rules.
    pub fn with_rules(mut self, rules: Vec<FallbackRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn rules(&self) -> &[FallbackRule] {
        &self.rules
    }

    /// The face for `id`, if present.
    pub fn face(&self, id: FontId) -> Option<&FontFace> {
        match id.index().checked_sub(self.primary.len()) {
            None => self.primary.get(id.index()),
            Some(offset) => self.fallbacks.get(offset).and_then(Option::as_ref),
        }
    }

    /// The face for `id`, or the default UI face for ids that are absent.
    pub fn face_or_default(&self, id: FontId) -> &FontFace {
        self.face(id).unwrap_or(&self.primary[FontId::DEFAULT.index()])
    }

    /// Every loaded face, primary faces first.
    pub fn faces(&self) -> impl Iterator<Item = &FontFace> {
        self.primary.iter().chain(self.fallbacks.iter().flatten())
    }

    pub fn content_font(&self) -> TextFont {
        self.content_font
    }

    pub fn heading_font(&self) -> TextFont {
        self.heading_font
    }

    pub fn content_font_size(&self) -> f32 {
        self.content_font_size
    }

    /// Pixel size of regular content text.
    pub fn text_size(&self) -> f32 {
        self.text_size
    }

    /// Pixel size of regular UI text.
    pub fn ui_size(&self) -> f32 {
        self.ui_size
    }

    /// Find the face and glyph index that should render `ch` over `base`.
    ///
    /// Pure with respect to the registry: the same inputs always produce the
    /// same answer. When nothing has the glyph the result is `(base, 0)`.
    pub fn resolve(&self, base: FontId, ch: char) -> Resolved {
        let Some(base_face) = self.face(base) else {
            return Resolved {
                font: base,
                index: 0,
            };
        };

        for rule in &self.rules {
            if !rule.applies(base, ch) {
                continue;
            }
            let candidate = match rule.target {
                FallbackTarget::Suppress => return Resolved { font: base, index: 0 },
                FallbackTarget::Base => base,
                FallbackTarget::Set(set) => FontId::fallback(set, base_face.size_class),
                FallbackTarget::Face(id) => id,
            };
            if rule.target != FallbackTarget::Base && candidate == base {
                continue;
            }
            let Some(face) = self.face(candidate) else {
                continue;
            };
            let index = face.glyph_index(ch);
            if index != 0 || rule.forced {
                return Resolved {
                    font: candidate,
                    index,
                };
            }
        }

        if self.missing.lock().insert(ch) {
            log::warn!("No font has a glyph for U+{:04X} ({:?})", ch as u32, ch);
        }
        Resolved {
            font: base,
            index: 0,
        }
    }
}
