//! Where font bytes come from.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use fontdb::Database;

use crate::catalog::FontFile;
use crate::error::FontError;
use crate::typeface::{SwashTypeface, Typeface};

/// Raw bytes of one face, with its index inside a collection.
#[derive(Debug, Clone)]
pub struct FontBytes {
    pub data: Vec<u8>,
    pub index: u32,
}

/// Supplies font data to the registry.
///
/// Implementors only need [`load`](FontSource::load); the provided methods
/// parse the bytes with swash. Sources that build typefaces some other way
/// override [`typeface`](FontSource::typeface) directly.
pub trait FontSource {
    /// Bytes for a bundled font file.
    fn load(&self, file: FontFile) -> Result<FontBytes, FontError>;

    fn typeface(&self, file: FontFile) -> Result<Arc<dyn Typeface>, FontError> {
        let bytes = self.load(file)?;
        let face = SwashTypeface::from_bytes(Arc::new(bytes.data), bytes.index, file.file_name())?;
        Ok(Arc::new(face))
    }

    /// A user-supplied font file.
    fn user_typeface(&self, path: &Path) -> Result<Arc<dyn Typeface>, FontError> {
        let data = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let face = SwashTypeface::from_bytes(Arc::new(data), 0, path.display().to_string())?;
        Ok(Arc::new(face))
    }
}

/// Reads font files by name from one directory.
#[derive(Debug, Clone)]
pub struct DirectoryFontSource {
    dir: PathBuf,
}

impl DirectoryFontSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FontSource for DirectoryFontSource {
    fn load(&self, file: FontFile) -> Result<FontBytes, FontError> {
        let path = self.dir.join(file.file_name());
        let data = std::fs::read(&path).map_err(|source| FontError::Io { path, source })?;
        Ok(FontBytes { data, index: 0 })
    }
}

/// Looks fonts up among the installed system fonts by family, weight and style.
pub struct SystemFontSource {
    db: Database,
}

impl SystemFontSource {
    pub fn new() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        log::info!("Loaded {} system fonts", db.len());
        Self { db }
    }

    /// Also consider every font file in `dir`.
    pub fn with_font_dir(mut self, dir: &Path) -> Self {
        self.db.load_fonts_dir(dir);
        self
    }
}

impl Default for SystemFontSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FontSource for SystemFontSource {
    fn load(&self, file: FontFile) -> Result<FontBytes, FontError> {
        let families = [fontdb::Family::Name(file.family())];
        let query = fontdb::Query {
            families: &families,
            weight: fontdb::Weight(file.weight()),
            stretch: fontdb::Stretch::Normal,
            style: if file.italic() {
                fontdb::Style::Italic
            } else {
                fontdb::Style::Normal
            },
        };
        let id = self
            .db
            .query(&query)
            .ok_or_else(|| FontError::NotFound(file.family().to_string()))?;
        self.db
            .with_face_data(id, |data, index| FontBytes {
                data: data.to_vec(),
                index,
            })
            .ok_or_else(|| FontError::NotFound(file.family().to_string()))
    }
}
