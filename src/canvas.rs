//! Background painting primitives: the banded vertical gradient and the
//! rounded border outline.

use image::{Rgb, RgbImage};

/// Color of the gradient band for row `y` of a canvas `height` rows tall.
///
/// Interpolates each channel linearly with ratio `y / height` and rounds to
/// the nearest integer, so the first row is exactly `start`.
pub fn gradient_color(start: Rgb<u8>, end: Rgb<u8>, y: u32, height: u32) -> Rgb<u8> {
    let ratio = if height == 0 {
        0.0
    } else {
        y as f64 / height as f64
    };

    let mix = |a: u8, b: u8| -> u8 {
        let value = a as f64 * (1.0 - ratio) + b as f64 * ratio;
        value.round().clamp(0.0, 255.0) as u8
    };

    Rgb([
        mix(start[0], end[0]),
        mix(start[1], end[1]),
        mix(start[2], end[2]),
    ])
}

/// Fill every row of the canvas with its gradient band.
pub fn fill_vertical_gradient(canvas: &mut RgbImage, start: Rgb<u8>, end: Rgb<u8>) {
    let height = canvas.height();

    for (y, row) in canvas.enumerate_rows_mut() {
        let color = gradient_color(start, end, y, height);
        for (_, _, pixel) in row {
            *pixel = color;
        }
    }
}

/// Signed distance from `(px, py)` to the edge of a rounded rectangle that
/// spans `[0, width] x [0, height]`. Negative inside, positive outside.
pub fn rounded_rect_distance(px: f32, py: f32, width: f32, height: f32, radius: f32) -> f32 {
    let half_w = width / 2.0;
    let half_h = height / 2.0;
    let radius = radius.min(half_w).min(half_h).max(0.0);

    let qx = (px - half_w).abs() - half_w + radius;
    let qy = (py - half_h).abs() - half_h + radius;

    let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
    let inside = qx.max(qy).min(0.0);

    outside + inside - radius
}

/// Stroke a rounded rectangle along the canvas bounds.
///
/// A pixel belongs to the outline when its center lies inside the outer
/// rounded rectangle and less than `stroke` pixels from its edge. Pixels are
/// written without anti-aliasing.
pub fn stroke_rounded_border(canvas: &mut RgbImage, radius: u32, stroke: u32, color: Rgb<u8>) {
    let width = canvas.width() as f32;
    let height = canvas.height() as f32;
    let radius = radius as f32;
    let stroke = stroke as f32;

    for (x, y, pixel) in canvas.enumerate_pixels_mut() {
        let distance =
            rounded_rect_distance(x as f32 + 0.5, y as f32 + 0.5, width, height, radius);

        if distance <= 0.0 && distance > -stroke {
            *pixel = color;
        }
    }
}
