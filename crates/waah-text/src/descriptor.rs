//! Catalog descriptors
//!
//! A descriptor is what the system catalog knows about one face, without
//! the face being opened. It is enough to answer name/family/style and to
//! open the face later.

use std::sync::Arc;

use fontdb::{FaceInfo, Source};

use crate::face::{FontData, FontFace};
use crate::query::{escape, FontSlant, FontWeight};

/// One catalog entry
#[derive(Debug, Clone)]
pub struct Descriptor {
    id: fontdb::ID,
    families: Vec<String>,
    languages: Vec<String>,
    style: String,
    weight: FontWeight,
    slant: FontSlant,
    post_script_name: String,
    source: Source,
    index: u32,
}

impl Descriptor {
    pub fn from_face_info(info: &FaceInfo) -> Self {
        let weight = FontWeight(info.weight.0);
        let slant = FontSlant::from(info.style);
        Self {
            id: info.id,
            families: info.families.iter().map(|(name, _)| name.clone()).collect(),
            languages: info.families.iter().map(|(_, lang)| format!("{:?}", lang)).collect(),
            style: style_name(weight, slant),
            weight,
            slant,
            post_script_name: info.post_script_name.clone(),
            source: info.source.clone(),
            index: info.index,
        }
    }

    pub fn id(&self) -> fontdb::ID {
        self.id
    }

    /// Primary family name
    pub fn family(&self) -> Option<&str> {
        self.families.first().map(String::as_str)
    }

    pub fn families(&self) -> &[String] {
        &self.families
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn weight(&self) -> FontWeight {
        self.weight
    }

    pub fn slant(&self) -> FontSlant {
        self.slant
    }

    /// Font-name form of the descriptor, e.g. `DejaVu Sans:style=Bold`
    pub fn unparse(&self) -> String {
        let families: Vec<String> = self.families.iter().map(|f| escape(f)).collect();
        format!("{}:style={}", families.join(","), self.style)
    }

    /// Open the described face
    pub fn materialize(&self) -> Option<FontFace> {
        let data: FontData = match &self.source {
            Source::Binary(data) => data.clone(),
            Source::SharedFile(_, data) => data.clone(),
            Source::File(path) => match std::fs::read(path) {
                Ok(bytes) => Arc::new(bytes),
                Err(e) => {
                    tracing::warn!("Failed to read font {}: {}", path.display(), e);
                    return None;
                }
            },
        };

        let face = FontFace::new(data, self.index);
        if face.is_none() {
            tracing::warn!("Failed to parse catalog face {}", self.post_script_name);
        }
        face
    }
}

/// Style name as the catalog would report it ("Regular", "Bold Italic", ...)
pub fn style_name(weight: FontWeight, slant: FontSlant) -> String {
    let word = weight.style_word();
    match slant {
        FontSlant::Normal => word.to_string(),
        FontSlant::Italic if word == "Regular" => "Italic".to_string(),
        FontSlant::Oblique if word == "Regular" => "Oblique".to_string(),
        FontSlant::Italic => format!("{} Italic", word),
        FontSlant::Oblique => format!("{} Oblique", word),
    }
}
