//! Edge case tests for waah-text
//!
//! Catalog lookups, loaded fonts and lazy faces. Tests that need installed
//! fonts return early on machines without any.

use std::path::Path;

use waah_core::{live_count, ResourceKind, WaahError};
use waah_text::*;

fn system_library() -> Option<FontLibrary> {
    let library = FontLibrary::with_system_fonts();
    if library.is_empty() { None } else { Some(library) }
}

fn first_font_file() -> Option<&'static Path> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ]
    .into_iter()
    .map(Path::new)
    .find(|p| p.exists())
}

// ============================================================================
// LOADING
// ============================================================================

#[test]
fn test_load_missing_file() {
    let library = FontLibrary::new();
    let err = library.load("missing.ttf").unwrap_err();
    assert!(matches!(err, WaahError::FontLoadFailed(_)));
}

#[test]
fn test_loaded_font_has_no_family_or_style() {
    let Some(path) = first_font_file() else { return };
    let library = FontLibrary::new();
    let font = library.load(path).unwrap();

    assert!(font.family().is_none());
    assert!(font.style().is_none());
    assert!(font.name().is_some());
    assert!(font.descriptor().is_none());
}

#[test]
fn test_loaded_from_buffer_draws() {
    let Some(path) = first_font_file() else { return };
    let library = FontLibrary::new();
    let font = library.load_from_buffer(std::fs::read(path).unwrap()).unwrap();

    let face = font.face().unwrap();
    let extents = face.extents("Hello", 10.0);
    assert!(extents.x_advance > 0.0);
    assert!(extents.width > 0.0);
    assert_eq!(extents.y_advance, 0.0);
}

#[test]
fn test_registered_file_joins_catalog() {
    let Some(path) = first_font_file() else { return };
    let mut library = FontLibrary::new();
    library.load_font_file(path).unwrap();
    assert!(!library.is_empty());
    assert_eq!(library.list().len(), library.len());
}

// ============================================================================
// CATALOG
// ============================================================================

#[test]
fn test_list_fonts_are_unopened() {
    let Some(library) = system_library() else { return };
    let fonts = library.list();
    assert_eq!(fonts.len(), library.len());

    for font in fonts.iter().take(5) {
        assert!(!font.is_materialized());
        assert!(font.family().is_some());
        assert!(font.style().is_some());
        assert!(font.name().is_some());
    }
}

#[test]
fn test_find_is_lazy() {
    let Some(library) = system_library() else { return };
    let font = library.find("Sans Serif:bold").unwrap();
    assert!(!font.is_materialized());

    if font.face().is_some() {
        assert!(font.is_materialized());
        // Cached from here on
        assert!(font.face().is_some());
    }
}

#[test]
fn test_find_name_is_query_string() {
    let Some(library) = system_library() else { return };
    let font = library.find("monospace").unwrap();
    let name = font.name().unwrap();
    let family = font.family().unwrap();
    assert!(name.contains(":style="));
    assert!(!family.is_empty());
    assert!(name.ends_with(font.style().unwrap()));
}

#[test]
fn test_find_unknown_family_falls_back() {
    let Some(library) = system_library() else { return };
    assert!(library.find("Definitely Not A Family").is_some());
    assert!(library.find("").is_some());
}

#[test]
fn test_select_by_weight() {
    let Some(library) = system_library() else { return };
    assert!(library.select("sans-serif", FontWeight::BOLD, FontSlant::Italic).is_some());
}

#[test]
fn test_empty_catalog_finds_nothing() {
    let library = FontLibrary::new();
    assert!(library.find("Sans").is_none());
    assert!(library.list().is_empty());
}

// ============================================================================
// LIFETIME
// ============================================================================

#[test]
fn test_font_finalizer_counts() {
    let Some(library) = system_library() else { return };
    let before = live_count(ResourceKind::Font);
    let fonts = library.list();
    assert_eq!(live_count(ResourceKind::Font), before + fonts.len());
    drop(fonts);
    assert_eq!(live_count(ResourceKind::Font), before);
}
