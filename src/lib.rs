//! Render gradient PWA icons with a rounded border and centered text labels.

pub mod bitmap_font;
pub mod canvas;
pub mod icon_gen;
pub mod manifest;
pub mod text;
