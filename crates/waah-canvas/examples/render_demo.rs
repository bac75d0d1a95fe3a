//! Render Demo
//!
//! Text in several faces, a rotated stroked frame, an image-filled circle
//! and image-filled text, exported as PNG.
//!
//! Usage: `render_demo <image.png|jpg> <font.ttf> [output.png]`

use std::path::PathBuf;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use waah_canvas::{Canvas, FontLibrary, Image};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "waah_canvas=debug,waah_image=debug,waah_text=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let image_path = args.next().context("missing image path")?;
    let font_path = args.next().context("missing font path")?;
    let output = PathBuf::from(args.next().unwrap_or_else(|| "example1.png".into()));

    let library = FontLibrary::with_system_fonts();
    let img = Image::load(&image_path).with_context(|| format!("loading {image_path}"))?;
    let font = library.load(&font_path).with_context(|| format!("loading {font_path}"))?;

    let mut c = Canvas::new(800, 800)?;

    c.color(0, 0, 0, None).text(10.0, 10.0, "Ruby rules").fill();

    c.select_font(&library, "Serif", Some("bold"), None);
    c.text(10.0, 20.0, "Ruby rules").fill();

    c.select_font(&library, "Sans Serif", Some("normal"), Some("italic"));
    c.text(10.0, 30.0, "Ruby rules").fill();

    c.rotate_with(0.5, |c| {
        c.rect(20.0, 20.0, 600.0, 600.0).color(0xff, 0, 0, None).stroke();
    });

    c.translate_with(150.0, 10.0, |c| {
        c.circle(150.0, 150.0, 100.0).image(&img, 0.0, 0.0).fill();
    });

    c.image(&img, 0.0, 0.0).font(&font).font_size(50.0);
    c.text(5.0, 260.0, "The sky is").fill();
    c.text(5.0, 300.0, "the limit").fill();

    c.snapshot()?
        .to_png(Some(output.as_path()))
        .with_context(|| format!("writing {}", output.display()))?;
    tracing::info!("Wrote {}", output.display());
    Ok(())
}
