use crate::canvas::{fill_vertical_gradient, stroke_rounded_border};
use crate::manifest::{write_manifest_icons, IconEntry, ManifestIcons};
use crate::text::{centered_offset, FontSource};
use anyhow::{Context, Result};
use image::{
    codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder},
    ColorType, ImageEncoder, Rgb, RgbImage,
};
use log::{debug, info};
use std::{
    fs::{create_dir_all, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

/// Sizes rendered when none are requested.
pub const DEFAULT_SIZES: [u32; 8] = [72, 96, 128, 144, 152, 192, 384, 512];
pub const DEFAULT_FONT_PATH: &str = "/System/Library/Fonts/Hiragino Sans GB.ttc";
pub const DEFAULT_TITLE: &str = "卧底";
pub const DEFAULT_SUBTITLE: &str = "新加坡";
pub const DEFAULT_START_COLOR: &str = "#667eea";
pub const DEFAULT_END_COLOR: &str = "#764ba2";

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

// Proportions of the icon size
const TITLE_FONT_RATIO: f32 = 0.4;
const SUBTITLE_FONT_RATIO: f32 = 0.18;
const CORNER_RADIUS_RATIO: f32 = 0.2;
const TITLE_LIFT_RATIO: f32 = 0.05;
const SUBTITLE_TOP_RATIO: f32 = 0.65;

#[derive(Debug)]
pub struct Args {
    pub output: PathBuf,
    pub sizes: Vec<u32>,
    pub font: PathBuf,
    pub title: String,
    pub subtitle: String,
    pub start_color: String,
    pub end_color: String,
    pub manifest: bool,
    pub manifest_prefix: String,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            output: PathBuf::from("./icons"),
            sizes: DEFAULT_SIZES.to_vec(),
            font: PathBuf::from(DEFAULT_FONT_PATH),
            title: DEFAULT_TITLE.to_string(),
            subtitle: DEFAULT_SUBTITLE.to_string(),
            start_color: DEFAULT_START_COLOR.to_string(),
            end_color: DEFAULT_END_COLOR.to_string(),
            manifest: false,
            manifest_prefix: "/icons/".to_string(),
        }
    }
}

/// Colors and labels shared by every size of a run.
#[derive(Debug, Clone)]
pub struct IconStyle {
    pub start_color: Rgb<u8>,
    pub end_color: Rgb<u8>,
    pub title: String,
    pub subtitle: String,
}

impl Default for IconStyle {
    fn default() -> Self {
        Self {
            start_color: Rgb([102, 126, 234]),
            end_color: Rgb([118, 75, 162]),
            title: DEFAULT_TITLE.to_string(),
            subtitle: DEFAULT_SUBTITLE.to_string(),
        }
    }
}

/// Size-dependent measurements of one icon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IconMetrics {
    pub corner_radius: u32,
    pub stroke_width: u32,
    pub title_px: f32,
    pub subtitle_px: f32,
}

impl IconMetrics {
    pub fn for_size(size: u32) -> Self {
        let fraction = |ratio: f32| (size as f32 * ratio) as u32;

        Self {
            corner_radius: fraction(CORNER_RADIUS_RATIO),
            stroke_width: (size / 50).max(2),
            title_px: fraction(TITLE_FONT_RATIO) as f32,
            subtitle_px: fraction(SUBTITLE_FONT_RATIO) as f32,
        }
    }
}

pub fn generate_icons(args: Args) -> Result<()> {
    let style = IconStyle {
        start_color: parse_color(&args.start_color)?,
        end_color: parse_color(&args.end_color)?,
        title: args.title.clone(),
        subtitle: args.subtitle.clone(),
    };

    // Validate every size before anything is written
    if let Some(size) = args.sizes.iter().find(|&&size| size == 0) {
        anyhow::bail!("Invalid icon size: {size}");
    }

    // Icons and manifest entries come out in ascending size order, once each
    let mut sizes = args.sizes.clone();
    sizes.sort_unstable();
    sizes.dedup();

    create_dir_all(&args.output).context("Can't create output directory")?;

    let fonts = FontSource::load(&args.font);
    if fonts.is_fallback() {
        info!("Drawing labels with the built-in bitmap font");
    } else {
        info!("Drawing labels with {}", args.font.display());
    }
    let mut manifest = ManifestIcons::default();

    for &size in &sizes {
        let icon = render_icon(size, &style, &fonts)?;

        let file_name = icon_file_name(size);
        let output_path = args.output.join(&file_name);
        save_png(&icon, &output_path)?;
        println!("✓ Created {}", output_path.display());

        manifest.add_icon(IconEntry::png(&args.manifest_prefix, &file_name, size));
    }

    if args.manifest {
        let path = write_manifest_icons(&args.output, &manifest)?;
        println!("✓ Created {}", path.display());
    }

    Ok(())
}

/// File name of the icon rendered at `size`.
pub fn icon_file_name(size: u32) -> String {
    format!("icon-{size}x{size}.png")
}

/// Render a `size`x`size` icon: gradient background, rounded white border,
/// then the title slightly above center and the subtitle below it.
pub fn render_icon(size: u32, style: &IconStyle, fonts: &FontSource) -> Result<RgbImage> {
    if size == 0 {
        anyhow::bail!("Invalid icon size: {size}");
    }

    let metrics = IconMetrics::for_size(size);
    debug!("Rendering {size}x{size} with {metrics:?}");

    let mut canvas = RgbImage::new(size, size);
    fill_vertical_gradient(&mut canvas, style.start_color, style.end_color);
    stroke_rounded_border(&mut canvas, metrics.corner_radius, metrics.stroke_width, WHITE);

    let title_font = fonts.at_pixel_size(metrics.title_px);
    if let Some(bounds) = title_font.measure(&style.title) {
        let top = (size as f32 - bounds.height() as f32) / 2.0 - size as f32 * TITLE_LIFT_RATIO;
        let (dx, dy) = centered_offset(size, &bounds, top);
        title_font.draw(&mut canvas, &style.title, dx, dy, WHITE);
    }

    let subtitle_font = fonts.at_pixel_size(metrics.subtitle_px);
    if let Some(bounds) = subtitle_font.measure(&style.subtitle) {
        let top = size as f32 * SUBTITLE_TOP_RATIO;
        let (dx, dy) = centered_offset(size, &bounds, top);
        subtitle_font.draw(&mut canvas, &style.subtitle, dx, dy, WHITE);
    }

    Ok(canvas)
}

/// Parse any CSS color into an opaque RGB triple.
pub fn parse_color(color: &str) -> Result<Rgb<u8>> {
    let srgb = css_color::Srgb::from_str(color)
        .map_err(|_| anyhow::anyhow!("Invalid color: {color}"))?;

    let channel = |value: f32| (value * 255.).round().clamp(0., 255.) as u8;
    Ok(Rgb([
        channel(srgb.red),
        channel(srgb.green),
        channel(srgb.blue),
    ]))
}

fn save_png(image: &RgbImage, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create PNG file {}", path.display()))?;
    let mut out_file = BufWriter::new(file);

    write_png(image.as_raw(), &mut out_file, image.width(), image.height())
        .with_context(|| format!("Failed to write PNG {}", path.display()))?;
    out_file.flush()?;

    Ok(())
}

// Encode RGB image data as PNG with compression
fn write_png<W: Write>(image_data: &[u8], w: W, width: u32, height: u32) -> Result<()> {
    let encoder = PngEncoder::new_with_quality(w, CompressionType::Best, PngFilterType::Adaptive);
    encoder.write_image(image_data, width, height, ColorType::Rgb8)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::gradient_color;

    fn is_white(pixel: &Rgb<u8>) -> bool {
        *pixel == WHITE
    }

    /// Horizontal extent of pure white pixels in `rows`, ignoring the border.
    fn white_span(icon: &RgbImage, rows: std::ops::Range<u32>, stroke: u32) -> Option<(u32, u32)> {
        let mut span: Option<(u32, u32)> = None;
        for y in rows {
            for x in stroke..icon.width() - stroke {
                if is_white(icon.get_pixel(x, y)) {
                    span = Some(match span {
                        Some((lo, hi)) => (lo.min(x), hi.max(x)),
                        None => (x, x),
                    });
                }
            }
        }
        span
    }

    #[test]
    fn metrics_follow_size_proportions() {
        let metrics = IconMetrics::for_size(128);
        assert_eq!(metrics.corner_radius, 25);
        assert_eq!(metrics.stroke_width, 2);
        assert_eq!(metrics.title_px, 51.0);
        assert_eq!(metrics.subtitle_px, 23.0);

        assert_eq!(IconMetrics::for_size(72).stroke_width, 2);
        assert_eq!(IconMetrics::for_size(512).stroke_width, 10);
    }

    #[test]
    fn renders_every_default_size_exactly() {
        let fonts = FontSource::Fallback;
        let style = IconStyle::default();

        for size in DEFAULT_SIZES {
            let icon = render_icon(size, &style, &fonts).unwrap();
            assert_eq!(icon.dimensions(), (size, size));
        }
    }

    #[test]
    fn rendering_is_deterministic() {
        let fonts = FontSource::Fallback;
        let style = IconStyle::default();

        let first = render_icon(152, &style, &fonts).unwrap();
        let second = render_icon(152, &style, &fonts).unwrap();
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn zero_size_is_rejected() {
        let result = render_icon(0, &IconStyle::default(), &FontSource::Fallback);
        assert!(result.is_err());
    }

    #[test]
    fn icon_128_matches_expected_layout() {
        let style = IconStyle::default();
        let icon = render_icon(128, &style, &FontSource::Fallback).unwrap();

        // corners sit outside the rounded border and show the gradient
        assert_eq!(*icon.get_pixel(0, 0), style.start_color);
        assert_eq!(*icon.get_pixel(0, 127), gradient_color(style.start_color, style.end_color, 127, 128));
        let bottom = icon.get_pixel(127, 127);
        for channel in 0..3 {
            assert!((bottom[channel] as i16 - style.end_color[channel] as i16).abs() <= 1);
        }

        // stroke of two pixels on the top edge
        assert!(is_white(icon.get_pixel(64, 0)));
        assert!(is_white(icon.get_pixel(64, 1)));
        assert!(!is_white(icon.get_pixel(64, 2)));
    }

    #[test]
    fn labels_are_horizontally_centered() {
        let style = IconStyle::default();
        let fonts = FontSource::Fallback;

        for size in DEFAULT_SIZES {
            let icon = render_icon(size, &style, &fonts).unwrap();
            let metrics = IconMetrics::for_size(size);

            // bitmap title is 7 rows tall, its top lifted above center
            let title_top =
                ((size as f32 - 7.0) / 2.0 - size as f32 * TITLE_LIFT_RATIO).round() as u32;
            let (lo, hi) = white_span(&icon, title_top..title_top + 7, metrics.stroke_width)
                .expect("title should leave white ink");
            let mid = (lo + hi + 1) as f32 / 2.0;
            assert!((mid - size as f32 / 2.0).abs() <= 1.0, "size {size}: mid {mid}");

            let subtitle_top = (size as f32 * SUBTITLE_TOP_RATIO).round() as u32;
            let (lo, hi) = white_span(&icon, subtitle_top..subtitle_top + 7, metrics.stroke_width)
                .expect("subtitle should leave white ink");
            let mid = (lo + hi + 1) as f32 / 2.0;
            assert!((mid - size as f32 / 2.0).abs() <= 1.0, "size {size}: mid {mid}");
        }
    }

    #[test]
    fn empty_labels_leave_only_the_border() {
        let style = IconStyle {
            title: String::new(),
            subtitle: String::new(),
            ..IconStyle::default()
        };
        let icon = render_icon(128, &style, &FontSource::Fallback).unwrap();
        assert!(white_span(&icon, 10..118, 10).is_none());
    }

    #[test]
    fn parses_css_colors() {
        assert_eq!(parse_color("#667eea").unwrap(), Rgb([102, 126, 234]));
        assert_eq!(parse_color("#fff").unwrap(), WHITE);
        assert_eq!(parse_color("rgb(118, 75, 162)").unwrap(), Rgb([118, 75, 162]));
        assert!(parse_color("not-a-color").is_err());
    }

    #[test]
    fn generate_icons_writes_named_pngs() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let args = Args {
            output: temp_dir.path().join("icons"),
            sizes: vec![72, 96],
            font: PathBuf::from("/nonexistent/font.ttf"),
            manifest: true,
            ..Args::default()
        };

        generate_icons(args).unwrap();

        for size in [72, 96] {
            let path = temp_dir.path().join("icons").join(icon_file_name(size));
            let icon = image::open(&path).unwrap();
            assert_eq!((icon.width(), icon.height()), (size, size));
        }
        assert!(temp_dir
            .path()
            .join("icons")
            .join(crate::manifest::MANIFEST_FILE_NAME)
            .exists());
    }

    /// Pixel box `(min_x, min_y, max_x, max_y)` (inclusive) where `icon`
    /// differs from `blank`.
    fn ink_box(icon: &RgbImage, blank: &RgbImage) -> Option<(u32, u32, u32, u32)> {
        let mut ink: Option<(u32, u32, u32, u32)> = None;
        for (x, y, pixel) in icon.enumerate_pixels() {
            if pixel != blank.get_pixel(x, y) {
                ink = Some(match ink {
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                    None => (x, y, x, y),
                });
            }
        }
        ink
    }

    #[test]
    fn scalable_labels_are_centered_and_placed() {
        let Some(path) = crate::text::system_test_font() else {
            eprintln!("no system font found, skipping");
            return;
        };
        let fonts = FontSource::load(&path);
        assert!(!fonts.is_fallback());

        let blank_style = IconStyle {
            title: String::new(),
            subtitle: String::new(),
            ..IconStyle::default()
        };

        for (title, subtitle) in [("Hi", "SGP"), ("gj", "yq")] {
            for size in DEFAULT_SIZES {
                let metrics = IconMetrics::for_size(size);
                let blank = render_icon(size, &blank_style, &fonts).unwrap();
                let center = size as f32 / 2.0;

                // title alone
                let style = IconStyle {
                    title: title.to_string(),
                    ..blank_style.clone()
                };
                let icon = render_icon(size, &style, &fonts).unwrap();
                let (x0, y0, x1, _) = ink_box(&icon, &blank).expect("title should leave ink");
                let bounds = fonts.at_pixel_size(metrics.title_px).measure(title).unwrap();
                let expected_top = ((size as f32 - bounds.height() as f32) / 2.0
                    - size as f32 * TITLE_LIFT_RATIO)
                    .round() as i32;
                let mid = (x0 + x1 + 1) as f32 / 2.0;
                assert!((mid - center).abs() <= 1.0, "{title} at {size}: mid {mid}");
                assert!((y0 as i32 - expected_top).abs() <= 1, "{title} at {size}: top {y0}");

                // subtitle alone
                let style = IconStyle {
                    subtitle: subtitle.to_string(),
                    ..blank_style.clone()
                };
                let icon = render_icon(size, &style, &fonts).unwrap();
                let (x0, y0, x1, _) = ink_box(&icon, &blank).expect("subtitle should leave ink");
                let expected_top = (size as f32 * SUBTITLE_TOP_RATIO).round() as i32;
                let mid = (x0 + x1 + 1) as f32 / 2.0;
                assert!((mid - center).abs() <= 1.0, "{subtitle} at {size}: mid {mid}");
                assert!((y0 as i32 - expected_top).abs() <= 1, "{subtitle} at {size}: top {y0}");
            }
        }
    }

    #[test]
    fn generate_icons_sorts_and_dedups_sizes() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let output = temp_dir.path().join("icons");
        let args = Args {
            output: output.clone(),
            sizes: vec![96, 72, 96],
            font: PathBuf::from("/nonexistent/font.ttf"),
            manifest: true,
            ..Args::default()
        };

        generate_icons(args).unwrap();

        let json = std::fs::read_to_string(output.join(crate::manifest::MANIFEST_FILE_NAME))
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let sizes: Vec<&str> = parsed["icons"]
            .as_array()
            .unwrap()
            .iter()
            .map(|icon| icon["sizes"].as_str().unwrap())
            .collect();
        assert_eq!(sizes, vec!["72x72", "96x96"]);
    }

    #[test]
    fn generate_icons_rejects_zero_size_before_writing() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let output = temp_dir.path().join("icons");
        let args = Args {
            output: output.clone(),
            sizes: vec![72, 0],
            font: PathBuf::from("/nonexistent/font.ttf"),
            ..Args::default()
        };

        assert!(generate_icons(args).is_err());
        assert!(!output.join(icon_file_name(72)).exists());
    }
}
