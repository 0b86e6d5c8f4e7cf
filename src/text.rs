//! Label fonts: loading a scalable font with a bitmap fallback, measuring the
//! ink bounds of a label and drawing it onto a canvas.

use crate::bitmap_font;
use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use log::{info, warn};
use rusttype::{point, Font, Rect, Scale};
use std::path::Path;

/// The font all labels of a run are drawn with.
pub enum FontSource {
    /// A TrueType/OpenType face read from disk.
    Scalable(Font<'static>),
    /// The built-in 5x7 bitmap font.
    Fallback,
}

impl FontSource {
    /// Load the font at `path`, substituting the bitmap font on any failure.
    pub fn load(path: &Path) -> Self {
        match read_font(path) {
            Ok(font) => {
                info!("Loaded font {}", path.display());
                FontSource::Scalable(font)
            }
            Err(err) => {
                warn!("{err:#}; using built-in bitmap font");
                FontSource::Fallback
            }
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, FontSource::Fallback)
    }

    /// A label font rendering at `pixel_size`. The bitmap fallback ignores the
    /// size and always draws at its native 5x7 cell.
    pub fn at_pixel_size(&self, pixel_size: f32) -> LabelFont<'_> {
        match self {
            FontSource::Scalable(font) => LabelFont::Scalable {
                font,
                scale: Scale::uniform(pixel_size),
            },
            FontSource::Fallback => LabelFont::Bitmap,
        }
    }
}

fn read_font(path: &Path) -> Result<Font<'static>> {
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read font file {}", path.display()))?;

    // index 0 also selects the first face of a .ttc collection
    Font::try_from_vec_and_index(data, 0)
        .with_context(|| format!("Failed to parse font file {}", path.display()))
}

/// Pixel box enclosing the ink of a label, relative to its layout origin.
/// `max_x` and `max_y` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl TextBounds {
    pub fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> i32 {
        self.max_y - self.min_y
    }

    fn union(self, other: TextBounds) -> TextBounds {
        TextBounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

impl From<Rect<i32>> for TextBounds {
    fn from(rect: Rect<i32>) -> Self {
        TextBounds {
            min_x: rect.min.x,
            min_y: rect.min.y,
            max_x: rect.max.x,
            max_y: rect.max.y,
        }
    }
}

/// A font at a concrete size, ready to measure and draw labels.
pub enum LabelFont<'f> {
    Scalable { font: &'f Font<'static>, scale: Scale },
    Bitmap,
}

impl LabelFont<'_> {
    /// Ink bounds of `text` laid out with its top at the origin, or `None` when
    /// nothing would be drawn.
    pub fn measure(&self, text: &str) -> Option<TextBounds> {
        match self {
            LabelFont::Scalable { font, scale } => {
                let ascent = font.v_metrics(*scale).ascent;
                font.layout(text, *scale, point(0.0, ascent))
                    .filter_map(|glyph| glyph.pixel_bounding_box())
                    .map(TextBounds::from)
                    .reduce(TextBounds::union)
            }
            LabelFont::Bitmap => bitmap_font::text_size(text).map(|(width, height)| TextBounds {
                min_x: 0,
                min_y: 0,
                max_x: width as i32,
                max_y: height as i32,
            }),
        }
    }

    /// Draw `text` shifted by `(dx, dy)` from its layout origin. Pixels falling
    /// outside the canvas are dropped.
    pub fn draw(&self, canvas: &mut RgbImage, text: &str, dx: i32, dy: i32, color: Rgb<u8>) {
        match self {
            LabelFont::Scalable { font, scale } => {
                let ascent = font.v_metrics(*scale).ascent;
                for glyph in font.layout(text, *scale, point(0.0, ascent)) {
                    let Some(bb) = glyph.pixel_bounding_box() else {
                        continue;
                    };
                    glyph.draw(|gx, gy, coverage| {
                        let x = bb.min.x + gx as i32 + dx;
                        let y = bb.min.y + gy as i32 + dy;
                        blend_pixel(canvas, x, y, color, coverage);
                    });
                }
            }
            LabelFont::Bitmap => bitmap_font::for_each_pixel(text, |x, y| {
                blend_pixel(canvas, x as i32 + dx, y as i32 + dy, color, 1.0);
            }),
        }
    }
}

/// Offset that centers `bounds` horizontally on a canvas `canvas_width` wide
/// and puts the top of the ink at `top`.
pub fn centered_offset(canvas_width: u32, bounds: &TextBounds, top: f32) -> (i32, i32) {
    let left = ((canvas_width as f32 - bounds.width() as f32) / 2.0).round() as i32;
    (left - bounds.min_x, top.round() as i32 - bounds.min_y)
}

fn blend_pixel(canvas: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, coverage: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i32 || y >= canvas.height() as i32 {
        return;
    }

    let coverage = coverage.clamp(0.0, 1.0);
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    for channel in 0..3 {
        let background = pixel[channel] as f32;
        let foreground = color[channel] as f32;
        pixel[channel] = (background + (foreground - background) * coverage).round() as u8;
    }
}

/// First scalable font found among common system locations, for tests that
/// exercise the rusttype path. `None` when the machine has none of them.
#[cfg(test)]
pub(crate) fn system_test_font() -> Option<std::path::PathBuf> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "/Library/Fonts/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ]
    .iter()
    .map(std::path::PathBuf::from)
    .find(|path| path.is_file())
}
