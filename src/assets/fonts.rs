use std::path::Path;

use usvg::fontdb;

use crate::foundation::error::{TextBehindError, TextBehindResult};

/// Font files picked up by [`FontLibrary::load_dir`].
pub const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc"];

#[derive(Clone, Debug, PartialEq, Eq)]
/// Face chosen for a requested family and weight.
pub struct FaceMatch {
    /// Face identifier inside the owning [`FontLibrary`].
    pub id: fontdb::ID,
    /// Primary family name of the face.
    pub family: String,
    /// Actual weight of the face (may differ from the requested weight).
    pub weight: u16,
    /// Whether the requested family was found, as opposed to a fallback face.
    pub exact_family: bool,
}

/// Font discovery and family/weight matching over a `fontdb` database.
pub struct FontLibrary {
    db: fontdb::Database,
}

impl std::fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontLibrary")
            .field("faces", &self.face_count())
            .finish()
    }
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::empty()
    }
}

impl FontLibrary {
    /// Library with no faces loaded.
    pub fn empty() -> Self {
        Self {
            db: fontdb::Database::new(),
        }
    }

    /// Library seeded with the fonts installed on the host.
    pub fn with_system_fonts() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        Self { db }
    }

    /// Load every `.ttf`/`.otf`/`.ttc` file directly inside `dir`.
    ///
    /// Unreadable entries are skipped. Returns the number of faces added.
    pub fn load_dir(&mut self, dir: &Path) -> usize {
        let before = self.face_count();
        let Ok(rd) = std::fs::read_dir(dir) else {
            tracing::warn!(dir = %dir.display(), "font directory is not readable");
            return 0;
        };

        for entry in rd.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
                continue;
            };
            let ext = ext.to_ascii_lowercase();
            if !FONT_EXTENSIONS.contains(&ext.as_str()) {
                continue;
            }
            if let Err(e) = self.db.load_font_file(&path) {
                tracing::debug!(path = %path.display(), error = %e, "skipping font file");
            }
        }

        let added = self.face_count() - before;
        tracing::debug!(dir = %dir.display(), added, "loaded font directory");
        added
    }

    /// Add a single font file held in memory.
    pub fn load_font_data(&mut self, bytes: Vec<u8>) -> TextBehindResult<()> {
        let before = self.face_count();
        self.db.load_font_data(bytes);
        if self.face_count() == before {
            return Err(TextBehindError::render("font data contains no usable faces"));
        }
        Ok(())
    }

    /// Number of faces currently known.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Distinct family names, sorted.
    pub fn families(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .db
            .faces()
            .filter_map(|f| f.families.first().map(|(name, _)| name.clone()))
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Resolve `family` at `weight`.
    ///
    /// Falls back to the generic sans-serif, serif and monospace families, then to the face
    /// whose weight is closest to the request. `None` only when the library is empty.
    pub fn query(&self, family: &str, weight: u16) -> Option<FaceMatch> {
        let weight = fontdb::Weight(weight.clamp(1, 1000));
        let named = family.trim();

        if !named.is_empty() {
            let families = [fontdb::Family::Name(named)];
            if let Some(id) = self.query_families(&families, weight) {
                return self.face_match(id, true);
            }
        }

        let generic = [
            fontdb::Family::SansSerif,
            fontdb::Family::Serif,
            fontdb::Family::Monospace,
        ];
        if let Some(id) = self.query_families(&generic, weight) {
            return self.face_match(id, false);
        }

        let id = self
            .db
            .faces()
            .min_by_key(|f| (f.weight.0 as i32 - weight.0 as i32).abs())
            .map(|f| f.id)?;
        self.face_match(id, false)
    }

    /// Raw bytes and collection index of a face.
    pub fn face_bytes(&self, id: fontdb::ID) -> Option<(Vec<u8>, u32)> {
        self.db.with_face_data(id, |data, index| (data.to_vec(), index))
    }

    fn query_families(
        &self,
        families: &[fontdb::Family<'_>],
        weight: fontdb::Weight,
    ) -> Option<fontdb::ID> {
        let query = fontdb::Query {
            families,
            weight,
            stretch: fontdb::Stretch::Normal,
            style: fontdb::Style::Normal,
        };
        self.db.query(&query)
    }

    fn face_match(&self, id: fontdb::ID, exact_family: bool) -> Option<FaceMatch> {
        let face = self.db.face(id)?;
        let family = face
            .families
            .first()
            .map(|(name, _)| name.clone())
            .unwrap_or_default();
        Some(FaceMatch {
            id,
            family,
            weight: face.weight.0,
            exact_family,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
