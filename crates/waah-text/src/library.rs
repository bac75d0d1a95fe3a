//! Font library
//!
//! Process-scoped font state: the system catalog plus any fonts
//! registered with it. Create one at startup and pass it by reference
//! to everything that resolves fonts.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use fontdb::{Database, Family, Query, Source, Stretch, Weight};
use waah_core::{Result, WaahError};

use crate::descriptor::Descriptor;
use crate::face::{FaceHandle, FontData, FontFace};
use crate::font::Font;
use crate::query::{resolve_generic_family, FontQuery, FontSlant, FontWeight};

const SANS_SERIF: &[&str] = &["DejaVu Sans", "Liberation Sans", "Noto Sans", "Arial", "Helvetica"];
const SERIF: &[&str] = &["DejaVu Serif", "Liberation Serif", "Noto Serif", "Times New Roman", "Times"];
const MONOSPACE: &[&str] = &["DejaVu Sans Mono", "Liberation Mono", "Noto Sans Mono", "Courier New"];

/// Font catalog and loader
pub struct FontLibrary {
    db: Database,
    /// Faces opened by `select`, keyed by catalog entry
    faces: RefCell<HashMap<fontdb::ID, FontFace>>,
}

impl FontLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self {
            db: Database::new(),
            faces: RefCell::new(HashMap::new()),
        }
    }

    /// Create a library populated from the system catalog
    pub fn with_system_fonts() -> Self {
        let mut library = Self::new();
        library.load_system_fonts();
        library
    }

    /// Scan system fonts into the catalog
    pub fn load_system_fonts(&mut self) {
        self.db.load_system_fonts();
        self.configure_generic_families();
        tracing::debug!("Font catalog has {} faces", self.db.len());
    }

    /// Register a font file with the catalog
    pub fn load_font_file(&mut self, path: &Path) -> Result<()> {
        self.db
            .load_font_file(path)
            .map_err(|e| WaahError::FontLoadFailed(format!("{}: {}", path.display(), e)))?;
        self.configure_generic_families();
        Ok(())
    }

    /// Register in-memory font data with the catalog
    pub fn load_font_data(&mut self, data: FontData) {
        self.db.load_font_source(Source::Binary(data));
        self.configure_generic_families();
    }

    /// Open a font file as a standalone font
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Font> {
        let handle = FaceHandle::from_file(path.as_ref())?;
        Ok(Font::from_handle(handle))
    }

    /// Open an in-memory font as a standalone font
    pub fn load_from_buffer(&self, data: impl Into<Vec<u8>>) -> Result<Font> {
        let handle = FaceHandle::from_data(Arc::new(data.into()), 0)?;
        Ok(Font::from_handle(handle))
    }

    /// Best catalog match for a font-name query
    ///
    /// Falls back to the sans-serif family and then to any face, so this
    /// is `None` only when the catalog is empty.
    pub fn find(&self, name: &str) -> Option<Font> {
        self.match_query(&FontQuery::parse(name)).map(Font::from_descriptor)
    }

    /// Best catalog match for a structured query
    pub fn match_query(&self, query: &FontQuery) -> Option<Descriptor> {
        let families: Vec<Family<'_>> = query
            .families
            .iter()
            .map(|name| resolve_generic_family(name).unwrap_or(Family::Name(name.as_str())))
            .chain([Family::SansSerif])
            .collect();

        let id = self
            .db
            .query(&Query {
                families: &families,
                weight: Weight(query.weight.0),
                stretch: Stretch::Normal,
                style: query.slant.into(),
            })
            .or_else(|| self.db.faces().next().map(|info| info.id))?;

        self.db.face(id).map(Descriptor::from_face_info)
    }

    /// One unopened font per catalog entry
    pub fn list(&self) -> Vec<Font> {
        self.db
            .faces()
            .map(|info| Font::from_descriptor(Descriptor::from_face_info(info)))
            .collect()
    }

    /// Pick and open a face by family name, bypassing font objects
    ///
    /// Each catalog entry is opened once; later selections reuse it.
    pub fn select(&self, family: &str, weight: FontWeight, slant: FontSlant) -> Option<FontFace> {
        let query = FontQuery::new(&[family]).weight(weight).slant(slant);
        let descriptor = self.match_query(&query)?;

        if let Some(face) = self.faces.borrow().get(&descriptor.id()) {
            return Some(face.clone());
        }
        let face = descriptor.materialize()?;
        self.faces.borrow_mut().insert(descriptor.id(), face.clone());
        Some(face)
    }

    /// Number of faces in the catalog
    pub fn len(&self) -> usize {
        self.db.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.db.len() == 0
    }

    fn configure_generic_families(&mut self) {
        if let Some(name) = self.first_present(SANS_SERIF) {
            self.db.set_sans_serif_family(name);
        }
        if let Some(name) = self.first_present(SERIF) {
            self.db.set_serif_family(name);
        }
        if let Some(name) = self.first_present(MONOSPACE) {
            self.db.set_monospace_family(name);
        }
    }

    fn first_present(&self, candidates: &[&str]) -> Option<String> {
        candidates
            .iter()
            .find(|candidate| {
                self.db
                    .faces()
                    .any(|info| info.families.iter().any(|(name, _)| name.as_str() == **candidate))
            })
            .map(|name| name.to_string())
    }
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::new()
    }
}
