//! Font queries
//!
//! Catalog queries use the fontconfig name syntax:
//! `family[,family...][-size][:property[=value]...]`, for example
//! `"DejaVu Sans-12:bold:slant=italic"`.

/// Font weight (100-900)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FontWeight(pub u16);

impl FontWeight {
    pub const THIN: FontWeight = FontWeight(100);
    pub const EXTRA_LIGHT: FontWeight = FontWeight(200);
    pub const LIGHT: FontWeight = FontWeight(300);
    pub const NORMAL: FontWeight = FontWeight(400);
    pub const MEDIUM: FontWeight = FontWeight(500);
    pub const SEMI_BOLD: FontWeight = FontWeight(600);
    pub const BOLD: FontWeight = FontWeight(700);
    pub const EXTRA_BOLD: FontWeight = FontWeight(800);
    pub const BLACK: FontWeight = FontWeight(900);

    /// Weight selected by a canvas font modifier: `bold`, anything else is normal
    pub fn from_symbol(symbol: &str) -> Self {
        match symbol {
            "bold" => FontWeight::BOLD,
            _ => FontWeight::NORMAL,
        }
    }

    /// Parse a weight keyword (`light`, `semibold`, ...) or a number
    pub fn from_name(name: &str) -> Option<Self> {
        let weight = match name.to_ascii_lowercase().replace(['-', ' '], "").as_str() {
            "thin" | "hairline" => FontWeight::THIN,
            "extralight" | "ultralight" => FontWeight::EXTRA_LIGHT,
            "light" => FontWeight::LIGHT,
            "normal" | "regular" | "book" => FontWeight::NORMAL,
            "medium" => FontWeight::MEDIUM,
            "semibold" | "demibold" => FontWeight::SEMI_BOLD,
            "bold" => FontWeight::BOLD,
            "extrabold" | "ultrabold" => FontWeight::EXTRA_BOLD,
            "black" | "heavy" => FontWeight::BLACK,
            other => return other.parse::<u16>().ok().map(FontWeight::from),
        };
        Some(weight)
    }

    /// Conventional style-name word for this weight
    pub fn style_word(self) -> &'static str {
        match self.0 {
            0..=149 => "Thin",
            150..=249 => "ExtraLight",
            250..=349 => "Light",
            350..=449 => "Regular",
            450..=549 => "Medium",
            550..=649 => "SemiBold",
            650..=749 => "Bold",
            750..=849 => "ExtraBold",
            _ => "Black",
        }
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        FontWeight::NORMAL
    }
}

impl From<u16> for FontWeight {
    fn from(value: u16) -> Self {
        FontWeight(value.clamp(100, 900))
    }
}

/// Font slant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum FontSlant {
    #[default]
    Normal,
    Italic,
    Oblique,
}

impl FontSlant {
    /// Slant selected by a canvas font modifier; unrecognized symbols are normal
    pub fn from_symbol(symbol: &str) -> Self {
        match symbol {
            "italic" => FontSlant::Italic,
            "oblique" => FontSlant::Oblique,
            _ => FontSlant::Normal,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "roman" | "normal" | "upright" => Some(FontSlant::Normal),
            "italic" => Some(FontSlant::Italic),
            "oblique" => Some(FontSlant::Oblique),
            _ => None,
        }
    }
}

impl From<fontdb::Style> for FontSlant {
    fn from(style: fontdb::Style) -> Self {
        match style {
            fontdb::Style::Normal => FontSlant::Normal,
            fontdb::Style::Italic => FontSlant::Italic,
            fontdb::Style::Oblique => FontSlant::Oblique,
        }
    }
}

impl From<FontSlant> for fontdb::Style {
    fn from(slant: FontSlant) -> Self {
        match slant {
            FontSlant::Normal => fontdb::Style::Normal,
            FontSlant::Italic => fontdb::Style::Italic,
            FontSlant::Oblique => fontdb::Style::Oblique,
        }
    }
}

/// Font query for catalog matching
#[derive(Debug, Clone, PartialEq)]
pub struct FontQuery {
    /// Font families to try (in order)
    pub families: Vec<String>,
    /// Desired weight
    pub weight: FontWeight,
    /// Desired slant
    pub slant: FontSlant,
    /// Requested point size, if any
    pub size: Option<f64>,
}

impl FontQuery {
    /// Create a new font query
    pub fn new(families: &[&str]) -> Self {
        Self {
            families: families.iter().map(|s| s.to_string()).collect(),
            weight: FontWeight::NORMAL,
            slant: FontSlant::Normal,
            size: None,
        }
    }

    /// Set font weight
    pub fn weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    /// Set font slant
    pub fn slant(mut self, slant: FontSlant) -> Self {
        self.slant = slant;
        self
    }

    /// Parse a fontconfig-style font name
    ///
    /// Unknown properties are ignored, as are malformed sizes.
    pub fn parse(name: &str) -> Self {
        let mut parts = split_unescaped(name, ':').into_iter();
        let head = parts.next().unwrap_or_default();

        let mut query = Self::new(&[]);

        let (families, size) = match rfind_unescaped(&head, '-') {
            Some(i) => match head[i + 1..].trim().parse::<f64>() {
                Ok(size) => (&head[..i], Some(size)),
                Err(_) => (head.as_str(), None),
            },
            None => (head.as_str(), None),
        };
        query.size = size;
        query.families = split_unescaped(families, ',')
            .into_iter()
            .map(|f| unescape(f.trim()))
            .filter(|f| !f.is_empty())
            .collect();

        for prop in parts {
            let (key, value) = match prop.split_once('=') {
                Some((k, v)) => (k.trim().to_ascii_lowercase(), Some(unescape(v.trim()))),
                None => (prop.trim().to_ascii_lowercase(), None),
            };
            match (key.as_str(), value) {
                ("weight", Some(v)) => {
                    if let Some(w) = FontWeight::from_name(&v) {
                        query.weight = w;
                    }
                }
                ("slant", Some(v)) => {
                    if let Some(s) = FontSlant::from_name(&v) {
                        query.slant = s;
                    }
                }
                ("style", Some(v)) => query.apply_style_name(&v),
                ("size" | "pixelsize", Some(v)) => query.size = v.parse().ok().or(query.size),
                ("family", Some(v)) => query.families.push(v),
                (constant, None) => query.apply_constant(constant),
                _ => {}
            }
        }

        query
    }

    fn apply_constant(&mut self, constant: &str) {
        if let Some(slant) = FontSlant::from_name(constant) {
            if constant != "normal" {
                self.slant = slant;
                return;
            }
        }
        if let Some(weight) = FontWeight::from_name(constant) {
            if constant.parse::<u16>().is_err() {
                self.weight = weight;
            }
        }
    }

    /// Apply a style name such as "Bold Italic"
    fn apply_style_name(&mut self, style: &str) {
        for word in style.split_whitespace() {
            self.apply_constant(&word.to_ascii_lowercase());
        }
    }
}

impl Default for FontQuery {
    fn default() -> Self {
        Self::new(&["sans-serif"])
    }
}

/// Map a generic family name to the catalog's generic family
pub fn resolve_generic_family(family: &str) -> Option<fontdb::Family<'static>> {
    match family.to_lowercase().as_str() {
        "serif" => Some(fontdb::Family::Serif),
        "sans" | "sans-serif" | "sans serif" => Some(fontdb::Family::SansSerif),
        "monospace" | "mono" => Some(fontdb::Family::Monospace),
        "cursive" => Some(fontdb::Family::Cursive),
        "fantasy" => Some(fontdb::Family::Fantasy),
        _ => None,
    }
}

fn split_unescaped(s: &str, sep: char) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            current.push(c);
            if let Some(next) = chars.next() {
                current.push(next);
            }
        } else if c == sep {
            out.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    out.push(current);
    out
}

fn rfind_unescaped(s: &str, target: char) -> Option<usize> {
    s.char_indices()
        .filter(|&(i, c)| c == target && !s[..i].ends_with('\\'))
        .map(|(i, _)| i)
        .last()
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Escape a family name for use in a font name string
pub(crate) fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '-' | ':' | ',' | '=') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
