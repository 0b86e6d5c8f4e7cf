use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use pwa_icon_gen::canvas::gradient_color;
use pwa_icon_gen::icon_gen::{parse_color, DEFAULT_END_COLOR, DEFAULT_START_COLOR};

/// Usage: verify_icon [ICON] [START_COLOR] [END_COLOR]
fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .unwrap_or_else(|| "icons/icon-512x512.png".to_string());
    let start = parse_color(&args.next().unwrap_or_else(|| DEFAULT_START_COLOR.to_string()))?;
    let end = parse_color(&args.next().unwrap_or_else(|| DEFAULT_END_COLOR.to_string()))?;

    let img = image::open(&path)
        .with_context(|| format!("Failed to open image {path}"))?
        .to_rgb8();
    let (width, height) = img.dimensions();

    println!("Checking icon: {}", path);
    println!("Image dimensions: {}x{}", width, height);
    if width == 0 || height == 0 {
        println!("⚠ Icon is empty");
        return Ok(());
    }
    if width != height {
        println!("⚠ Icon is not square");
    }

    let (top, bottom) = corner_colors(&img);
    let expected_bottom = gradient_color(start, end, height - 1, height);

    println!("\nGradient:");
    println!("  top-left     RGB: {:?} (expected {:?})", top.0, start.0);
    println!("  bottom-left  RGB: {:?} (expected {:?})", bottom.0, expected_bottom.0);

    if gradient_matches(&img, start, end) {
        println!("✓ Gradient endpoints match");
    } else {
        println!("⚠ Gradient endpoints differ from the expected colors");
    }

    let stroke = (width / 50).max(2);
    println!("\nBorder:");
    println!("  expected stroke width: {}", stroke);
    if top_border_is_white(&img, stroke) {
        println!("✓ White border detected on the top edge");
    } else {
        println!("⚠ Top edge is not white");
    }

    Ok(())
}

/// Top-left and bottom-left pixels. These lie outside the rounded border, so
/// they show the bare gradient. The image must not be empty.
fn corner_colors(img: &RgbImage) -> (Rgb<u8>, Rgb<u8>) {
    (*img.get_pixel(0, 0), *img.get_pixel(0, img.height() - 1))
}

fn gradient_matches(img: &RgbImage, start: Rgb<u8>, end: Rgb<u8>) -> bool {
    if img.width() == 0 || img.height() == 0 {
        return false;
    }

    let close = |a: Rgb<u8>, b: Rgb<u8>| (0..3).all(|c| (a[c] as i16 - b[c] as i16).abs() <= 1);
    let (top, bottom) = corner_colors(img);
    let expected_bottom = gradient_color(start, end, img.height() - 1, img.height());

    close(top, start) && close(bottom, expected_bottom)
}

/// Whether the first `stroke` rows (at most the whole image) are white at the
/// horizontal center.
fn top_border_is_white(img: &RgbImage, stroke: u32) -> bool {
    if img.width() == 0 || img.height() == 0 {
        return false;
    }

    let rows = stroke.min(img.height());
    (0..rows).all(|y| img.get_pixel(img.width() / 2, y).0 == [255, 255, 255])
}
