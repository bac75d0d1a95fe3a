//! Font objects
//!
//! A font starts out either opened (loaded from a file or buffer) or
//! unopened (a catalog descriptor). The drawable face is derived the first
//! time it is asked for and cached from then on.

use std::cell::OnceCell;

use waah_core::{Finalizer, ResourceKind};

use crate::descriptor::Descriptor;
use crate::face::{FaceHandle, FontFace};

/// Where a font came from
#[derive(Debug, Clone)]
pub enum FontOrigin {
    /// Loaded from a file or memory buffer
    Face(FaceHandle),
    /// Matched or listed from the system catalog
    Catalog(Descriptor),
}

/// A script-visible font
#[derive(Debug)]
pub struct Font {
    face: OnceCell<FontFace>,
    origin: FontOrigin,
    finalizer: Finalizer,
}

impl Font {
    pub fn from_handle(handle: FaceHandle) -> Self {
        Self::new(FontOrigin::Face(handle))
    }

    pub fn from_descriptor(descriptor: Descriptor) -> Self {
        Self::new(FontOrigin::Catalog(descriptor))
    }

    fn new(origin: FontOrigin) -> Self {
        Self {
            face: OnceCell::new(),
            origin,
            finalizer: Finalizer::new(ResourceKind::Font),
        }
    }

    pub fn origin(&self) -> &FontOrigin {
        &self.origin
    }

    pub fn descriptor(&self) -> Option<&Descriptor> {
        match &self.origin {
            FontOrigin::Catalog(d) => Some(d),
            FontOrigin::Face(_) => None,
        }
    }

    /// PostScript name for opened fonts, the unparsed descriptor otherwise
    pub fn name(&self) -> Option<String> {
        match &self.origin {
            FontOrigin::Face(handle) => handle.post_script_name().map(str::to_string),
            FontOrigin::Catalog(descriptor) => Some(descriptor.unparse()),
        }
    }

    /// Family from the catalog descriptor; `None` for loaded fonts
    pub fn family(&self) -> Option<&str> {
        self.descriptor().and_then(Descriptor::family)
    }

    /// Style from the catalog descriptor; `None` for loaded fonts
    pub fn style(&self) -> Option<&str> {
        self.descriptor().map(Descriptor::style)
    }

    /// The drawable face, opened on first use
    pub fn face(&self) -> Option<FontFace> {
        if let Some(face) = self.face.get() {
            return Some(face.clone());
        }

        let face = match &self.origin {
            FontOrigin::Face(handle) => FontFace::from_handle(handle),
            FontOrigin::Catalog(descriptor) => descriptor.materialize(),
        }?;
        tracing::debug!("Materialized font face {:?}", self.name());
        Some(self.face.get_or_init(|| face).clone())
    }

    pub fn is_materialized(&self) -> bool {
        self.face.get().is_some()
    }

    pub fn resource_kind(&self) -> ResourceKind {
        self.finalizer.kind()
    }
}
