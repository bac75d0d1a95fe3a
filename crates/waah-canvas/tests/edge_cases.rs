//! Edge case tests for waah-canvas
//!
//! Paint, transforms, snapshots and the PNG round trip, driven through the
//! public canvas surface the way a script would.

use std::path::PathBuf;

use waah_canvas::*;
use waah_core::{Format, Surface};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("waah-canvas-{}-{}", std::process::id(), name))
}

fn rgba(image: &Image, x: u32, y: u32) -> [u8; 4] {
    image.surface().unwrap().rgba_at(x, y).unwrap()
}

fn near(a: [u8; 4], b: [u8; 4], tolerance: u8) -> bool {
    a.iter().zip(b).all(|(x, y)| x.abs_diff(y) <= tolerance)
}

fn system_fonts() -> Option<FontLibrary> {
    let library = FontLibrary::with_system_fonts();
    if library.is_empty() { None } else { Some(library) }
}

// ============================================================================
// COLOR
// ============================================================================

#[test]
fn test_opaque_colors_exact() {
    for (r, g, b) in [(0, 0, 0), (255, 255, 255), (255, 0, 0), (12, 200, 99), (128, 64, 32)] {
        let mut c = Canvas::new(8, 8).unwrap();
        c.color(r, g, b, None).rect(0.0, 0.0, 8.0, 8.0).fill();
        let snap = c.snapshot().unwrap();
        assert_eq!(rgba(&snap, 4, 4), [r as u8, g as u8, b as u8, 255]);
    }
}

#[test]
fn test_integer_and_float_alpha() {
    for alpha in [Alpha::Int(200), Alpha::Float(0.8), Alpha::Int(128), Alpha::Float(1.0)] {
        let mut c = Canvas::new(8, 8).unwrap();
        c.color(40, 160, 220, Some(alpha)).rect(0.0, 0.0, 8.0, 8.0).fill();
        let snap = c.snapshot().unwrap();

        let expected_alpha = (alpha.normalized() * 255.0).round() as u8;
        assert!(
            near(rgba(&snap, 3, 3), [40, 160, 220, expected_alpha], 3),
            "{:?} -> {:?}",
            alpha,
            rgba(&snap, 3, 3)
        );
    }
}

#[test]
fn test_alpha_value_shapes() {
    let mut c = Canvas::new(4, 4).unwrap();
    assert!(c.color_value(1, 2, 3, &Value::Int(255)).is_ok());
    assert!(c.color_value(1, 2, 3, &Value::Float(0.25)).is_ok());
    let err = c.color_value(1, 2, 3, &Value::symbol("opaque")).unwrap_err();
    assert_eq!(err.to_string(), "invalid argument: invalid alpha argument");
}

// ============================================================================
// SNAPSHOT AND PNG ROUND TRIP
// ============================================================================

#[test]
fn test_rect_round_trip_covers_rect() {
    let mut c = Canvas::new(40, 30).unwrap();
    c.color(0, 0, 0, None).rect(10.0, 5.0, 20.0, 10.0).fill();

    let bytes = c.snapshot().unwrap().to_png(None).unwrap().unwrap().into_bytes().unwrap();
    let reloaded = Image::from_png_buffer(&bytes).unwrap();
    assert_eq!((reloaded.width(), reloaded.height()), (40, 30));

    for y in 0..30 {
        for x in 0..40 {
            let inside = (10..30).contains(&x) && (5..15).contains(&y);
            let alpha = rgba(&reloaded, x, y)[3];
            assert_eq!(alpha == 255, inside, "pixel ({x}, {y})");
            if !inside {
                assert_eq!(alpha, 0, "pixel ({x}, {y})");
            }
        }
    }
}

#[test]
fn test_png_file_round_trip() {
    let path = temp_path("round-trip.png");
    let mut c = Canvas::new(16, 16).unwrap();
    c.color(0, 128, 255, None).clear();

    let written = c.snapshot().unwrap().to_png(Some(path.as_path())).unwrap();
    assert_eq!(written, Some(PngOutput::Written));

    let reloaded = Image::load(&path).unwrap();
    assert_eq!(rgba(&reloaded, 8, 8), [0, 128, 255, 255]);
    let _ = std::fs::remove_file(path);
}

#[test]
fn test_snapshot_is_independent() {
    let mut c = Canvas::new(10, 10).unwrap();
    c.color(255, 0, 0, None).clear();
    let snap = c.snapshot().unwrap();

    c.color(0, 0, 255, None).clear();
    assert_eq!(rgba(&snap, 5, 5), [255, 0, 0, 255]);
    assert_eq!(rgba(&c.snapshot().unwrap(), 5, 5), [0, 0, 255, 255]);
}

// ============================================================================
// TRANSFORMS
// ============================================================================

#[test]
fn test_nested_translate_cancels() {
    let mut c = Canvas::new(10, 10).unwrap();
    c.scale(2.0, 3.0);
    let before = c.matrix();

    c.push_with(|c| {
        c.translate_with(10.0, 0.0, |c| {
            c.translate_with(0.0, 10.0, |c| {
                c.rect(0.0, 0.0, 1.0, 1.0);
            });
        });
    });
    assert_eq!(c.matrix(), before);
    assert_eq!(c.depth(), 0);
}

#[test]
fn test_rotate_with_inverts() {
    let mut c = Canvas::new(10, 10).unwrap();
    c.rotate_with(0.5, |c| {
        assert!(!c.matrix().is_identity());
    });
    assert!(c.matrix().approx_eq(&Matrix::identity(), 1e-12));
}

#[test]
fn test_scale_with_restores_other_state() {
    let mut c = Canvas::new(10, 10).unwrap();
    c.scale_with(2.0, 2.0, |c| {
        c.line_width(7.0).color(255, 0, 0, None);
    });

    // Source changes inside the block are rolled back with the scale
    c.rect(0.0, 0.0, 10.0, 10.0).fill();
    assert_eq!(rgba(&c.snapshot().unwrap(), 5, 5), [0, 0, 0, 255]);
}

#[test]
fn test_translate_with_keeps_inner_changes() {
    let mut c = Canvas::new(10, 10).unwrap();
    c.translate_with(5.0, 0.0, |c| {
        c.color(255, 0, 0, None);
    });

    // Unlike scale_with, the source set inside the block stays in effect
    assert!(c.matrix().is_identity());
    c.rect(0.0, 0.0, 10.0, 10.0).fill();
    assert_eq!(rgba(&c.snapshot().unwrap(), 5, 5), [255, 0, 0, 255]);
}

#[test]
fn test_translate_with_undoes_only_its_offset() {
    let mut c = Canvas::new(10, 10).unwrap();
    c.translate_with(10.0, 0.0, |c| {
        c.scale(2.0, 2.0);
    });

    let expected = Matrix::scale(2.0, 2.0).multiply(&Matrix::translate(-5.0, 0.0));
    assert!(c.matrix().approx_eq(&expected, 1e-12), "{:?}", c.matrix());
    assert!(!c.matrix().is_identity());
}

#[test]
fn test_rotate_with_undoes_only_its_angle() {
    let mut c = Canvas::new(10, 10).unwrap();
    c.rotate_with(0.5, |c| {
        c.translate(5.0, 0.0);
    });

    let expected = Matrix::translate(5.0 * 0.5f64.cos(), 5.0 * 0.5f64.sin());
    assert!(c.matrix().approx_eq(&expected, 1e-9), "{:?}", c.matrix());
}

#[test]
fn test_pop_on_empty_stack() {
    let mut c = Canvas::new(10, 10).unwrap();
    c.pop().pop();
    assert_eq!(c.depth(), 0);
    assert!(c.matrix().is_identity());

    c.push().push().pop();
    assert_eq!(c.depth(), 1);
}

#[test]
fn test_transformed_rect_lands_in_device_space() {
    let mut c = Canvas::new(20, 20).unwrap();
    c.translate(10.0, 10.0).scale(2.0, 2.0).rect(0.0, 0.0, 2.0, 2.0).fill();
    let snap = c.snapshot().unwrap();
    assert_eq!(rgba(&snap, 12, 12)[3], 255);
    assert_eq!(rgba(&snap, 9, 9)[3], 0);
    assert_eq!(rgba(&snap, 14, 14)[3], 0);
}

// ============================================================================
// SHAPES
// ============================================================================

#[test]
fn test_rounded_rect_extents() {
    let mut c = Canvas::new(10, 10).unwrap();
    c.rounded_rect(10.0, 20.0, 100.0, 50.0, 8.0);
    let extents = c.path_extends();
    for (got, want) in extents.iter().zip([10.0, 20.0, 110.0, 70.0]) {
        assert!((got - want).abs() < 1e-6, "{extents:?}");
    }
}

#[test]
fn test_rounded_rect_replaces_path() {
    let mut c = Canvas::new(10, 10).unwrap();
    c.rect(-50.0, -50.0, 1.0, 1.0).rounded_rect(0.0, 0.0, 10.0, 10.0, 2.0);
    assert!(c.path_extends()[0] > -1.0);
}

#[test]
fn test_rectangle_alias() {
    let mut c = Canvas::new(10, 10).unwrap();
    c.rectangle(1.0, 2.0, 3.0, 4.0);
    assert_eq!(c.path_extends(), [1.0, 2.0, 4.0, 6.0]);
}

#[test]
fn test_path_extends_empty() {
    let c = Canvas::new(10, 10).unwrap();
    assert_eq!(c.path_extends(), [0.0; 4]);
}

#[test]
fn test_path_commands_match_methods() {
    let mut by_text = Canvas::new(10, 10).unwrap();
    by_text.path_data("M 1 1 C 2 0 4 0 5 1 v 4 H 1 z").unwrap();

    let mut by_call = Canvas::new(10, 10).unwrap();
    by_call
        .move_to(1.0, 1.0)
        .curve_to(2.0, 0.0, 4.0, 0.0, 5.0, 1.0)
        .rel_vertical(4.0)
        .horizontal_to(1.0)
        .close_path();

    assert_eq!(by_text.path_extends(), by_call.path_extends());
    assert_eq!(by_text.current_point(), (1.0, 1.0));
}

#[test]
fn test_malformed_path_data() {
    let mut c = Canvas::new(10, 10).unwrap();
    let err = c.path_data("M 1 1 L 2").unwrap_err();
    assert!(matches!(err, WaahError::InvalidArgument(_)));
    assert_eq!(c.path_extends(), [0.0; 4]);
}

// ============================================================================
// PATTERNS AND IMAGES
// ============================================================================

#[test]
fn test_linear_gradient_midpoint() {
    let mut gradient = Pattern::linear(0.0, 0.0, 100.0, 0.0);
    gradient.color_stop(0.0, 255, 0, 0, None).color_stop(1.0, 0, 0, 255, None);

    let mut c = Canvas::new(100, 10).unwrap();
    c.pattern(&gradient).rect(0.0, 0.0, 100.0, 10.0).fill();
    let snap = c.snapshot().unwrap();

    assert!(near(rgba(&snap, 50, 5), [128, 0, 128, 255], 4), "{:?}", rgba(&snap, 50, 5));
    assert!(near(rgba(&snap, 0, 5), [255, 0, 0, 255], 4));
    assert!(near(rgba(&snap, 99, 5), [0, 0, 255, 255], 4));
}

#[test]
fn test_pattern_without_stops_paints_nothing() {
    let empty = Pattern::linear(0.0, 0.0, 10.0, 0.0);
    let mut c = Canvas::new(10, 10).unwrap();
    c.pattern(&empty).clear();
    assert_eq!(rgba(&c.snapshot().unwrap(), 5, 5), [0, 0, 0, 0]);
}

#[test]
fn test_pattern_stops_added_after_install() {
    let mut p = Pattern::linear(0.0, 0.0, 10.0, 0.0);
    let mut c = Canvas::new(10, 10).unwrap();
    c.pattern(&p);
    p.color_stop(0.0, 255, 0, 0, None).color_stop(1.0, 255, 0, 0, None);

    c.rect(0.0, 0.0, 5.0, 10.0).fill();
    assert_eq!(rgba(&c.snapshot().unwrap(), 2, 5), [255, 0, 0, 255]);

    // The canvas keeps the gradient alive past the pattern object
    drop(p);
    c.rect(5.0, 0.0, 5.0, 10.0).fill();
    assert_eq!(rgba(&c.snapshot().unwrap(), 7, 5), [255, 0, 0, 255]);
}

#[test]
fn test_radial_gradient_center_and_edge() {
    let mut radial = Pattern::radial(50.0, 50.0, 0.0, 50.0, 50.0, 40.0);
    radial.color_stop(0.0, 255, 255, 255, None).color_stop(1.0, 0, 0, 0, None);

    let mut c = Canvas::new(100, 100).unwrap();
    c.pattern(&radial).clear();
    let snap = c.snapshot().unwrap();
    assert!(near(rgba(&snap, 50, 50), [255, 255, 255, 255], 8));
    assert!(near(rgba(&snap, 2, 2), [0, 0, 0, 255], 4));
}

#[test]
fn test_concentric_radial_inner_radius() {
    let mut radial = Pattern::radial(50.0, 50.0, 10.0, 50.0, 50.0, 40.0);
    radial.color_stop(0.0, 255, 255, 255, None).color_stop(1.0, 0, 0, 0, None);

    let mut c = Canvas::new(100, 100).unwrap();
    c.pattern(&radial).clear();
    let snap = c.snapshot().unwrap();

    // Inside the inner circle the first stop pads outward
    assert!(near(rgba(&snap, 51, 50), [255, 255, 255, 255], 4), "{:?}", rgba(&snap, 51, 50));
    // Halfway between the circles
    assert!(near(rgba(&snap, 75, 50), [125, 125, 125, 255], 8), "{:?}", rgba(&snap, 75, 50));
    assert!(near(rgba(&snap, 95, 50), [0, 0, 0, 255], 4));
}

#[test]
fn test_image_source_offset() {
    let pixels = [
        255, 0, 0, 255, 0, 255, 0, 255, //
        0, 0, 255, 255, 255, 255, 255, 255,
    ];
    let surface = Surface::from_rgba(Format::Argb32, 2, 2, &pixels).unwrap();
    let image = Image::from_surface(surface);

    let mut c = Canvas::new(10, 10).unwrap();
    c.image(&image, 4.0, 4.0).rect(0.0, 0.0, 10.0, 10.0).fill();
    let snap = c.snapshot().unwrap();

    assert!(near(rgba(&snap, 4, 4), [255, 0, 0, 255], 2));
    assert!(near(rgba(&snap, 5, 4), [0, 255, 0, 255], 2));
    assert!(near(rgba(&snap, 4, 5), [0, 0, 255, 255], 2));
    assert_eq!(rgba(&snap, 0, 0)[3], 0);
    assert_eq!(rgba(&snap, 9, 9)[3], 0);
}

#[test]
fn test_snapshot_as_paint_source() {
    let mut first = Canvas::new(6, 6).unwrap();
    first.color(10, 20, 30, None).clear();
    let snap = first.snapshot().unwrap();

    let mut second = Canvas::new(6, 6).unwrap();
    second.image(&snap, 0.0, 0.0).clear();
    assert!(near(rgba(&second.snapshot().unwrap(), 3, 3), [10, 20, 30, 255], 1));
}

// ============================================================================
// TEXT
// ============================================================================

#[test]
fn test_text_fills_glyphs() {
    let Some(library) = system_fonts() else { return };
    let mut c = Canvas::new(120, 60).unwrap();
    c.select_font(&library, "sans-serif", Some("bold"), None).font_size(30.0);

    let extents = c.text_extends("Hi");
    assert!(extents.x_advance > 0.0);
    assert!(extents.height > 0.0);

    c.text(10.0, 40.0, "Hi");
    let [x1, y1, x2, y2] = c.path_extends();
    assert!(x1 >= 10.0 - 5.0 && x2 > x1 && y2 <= 40.0 + 1.0 && y1 < y2);
    let (cx, cy) = c.current_point();
    assert!((cx - (10.0 + extents.x_advance)).abs() < 1e-6);
    assert_eq!(cy, 40.0);

    c.fill();
    let snap = c.snapshot().unwrap();
    let inked = snap.surface().unwrap().data().chunks_exact(4).filter(|px| px[3] > 0).count();
    assert!(inked > 0);
}

#[test]
fn test_font_object_materializes_on_select() {
    let Some(library) = system_fonts() else { return };
    let font = library.find("Serif:italic").unwrap();
    assert!(!font.is_materialized());

    let mut c = Canvas::new(10, 10).unwrap();
    c.font(&font);
    assert!(font.is_materialized());
    assert!(c.text_extends("x").x_advance > 0.0);
}

#[test]
fn test_two_argument_italic() {
    let Some(library) = system_fonts() else { return };
    let mut c = Canvas::new(10, 10).unwrap();
    c.font_value(&library, &Value::Str("Sans Serif".into()), Some(&Value::symbol("italic")), None)
        .unwrap();
    assert!(c.text_extends("x").x_advance > 0.0);
}

#[test]
fn test_font_selector_must_be_string() {
    let library = FontLibrary::new();
    let mut c = Canvas::new(10, 10).unwrap();
    let err = c.font_value(&library, &Value::Float(1.0), None, None).unwrap_err();
    assert_eq!(err.to_string(), "invalid argument: font must either be String or Font");
}

// ============================================================================
// LIFETIME
// ============================================================================

#[test]
fn test_resources_finalize() {
    let canvases = live_count(ResourceKind::Canvas);
    let images = live_count(ResourceKind::Image);

    let c = Canvas::new(4, 4).unwrap();
    let snap = c.snapshot().unwrap();
    assert_eq!(live_count(ResourceKind::Canvas), canvases + 1);
    assert_eq!(live_count(ResourceKind::Image), images + 1);

    drop(c);
    assert_eq!(live_count(ResourceKind::Canvas), canvases);
    assert_eq!(snap.width(), 4);
    drop(snap);
    assert_eq!(live_count(ResourceKind::Image), images);
}
