//! Font-shaping seam.
//!
//! The engine never touches glyph internals: everything that turns a label
//! into ink goes through [`TextShaper`]. Deployments with a real shaping
//! stack implement the trait over it; [`BitmapShaper`] is the built-in
//! reference implementation used on hosts without one (and by the test
//! suites), rasterizing a scaled 5x7 bitmap font.

use std::path::PathBuf;

use tracing::debug;

use crate::foundation::error::{VosdError, VosdResult};
use crate::pixel::buffer::{PixelBuffer, PixelFormat, Rgba8};
use crate::text::bitmap_font;

/// Font selection handed to the shaper alongside every call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FontSpec {
    /// Path to a font file. Shapers that carry their own glyph data (the
    /// bitmap shaper) may ignore it.
    pub path: Option<PathBuf>,
    /// CSS-style weight; 400 is regular, 700 bold.
    pub weight: u32,
}

impl FontSpec {
    pub fn new(path: Option<PathBuf>, weight: u32) -> Self {
        Self { path, weight }
    }
}

/// Pixel extent of a shaped label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextExtent {
    pub width: u32,
    pub height: u32,
    /// Distance from the top of the extent to the text baseline.
    pub baseline: u32,
}

/// The font-shaping collaborator: measure a label's ink extent and draw it
/// onto an RGBA canvas.
pub trait TextShaper: Send + Sync {
    /// Ink extent of `text` at `size_px` with the given stroke thickness.
    fn measure(
        &self,
        font: &FontSpec,
        text: &str,
        size_px: f64,
        thickness: u32,
    ) -> VosdResult<TextExtent>;

    /// Draw `text` onto `canvas` with its top-left at `origin`. Glyphs are
    /// written opaque in `color`; pixels outside the canvas are clipped.
    fn draw(
        &self,
        font: &FontSpec,
        canvas: &mut PixelBuffer,
        text: &str,
        origin: (i64, i64),
        size_px: f64,
        thickness: u32,
        color: Rgba8,
    ) -> VosdResult<()>;
}

/// Built-in shaper over a scaled 5x7 bitmap font.
///
/// Single-line only; `size_px` maps to an integer cell scale, thickness and
/// heavy font weights widen strokes by repeated horizontal passes.
#[derive(Clone, Copy, Debug, Default)]
pub struct BitmapShaper;

impl BitmapShaper {
    fn scale_for(size_px: f64) -> VosdResult<u32> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(VosdError::invalid_argument(format!(
                "font size {size_px} must be finite and > 0"
            )));
        }
        Ok(((size_px / f64::from(bitmap_font::CELL_HEIGHT)).round() as u32).max(1))
    }

    fn stroke_for(font: &FontSpec, thickness: u32) -> u32 {
        let bold_bump = u32::from(font.weight >= 600);
        thickness.max(1) + bold_bump
    }
}

impl TextShaper for BitmapShaper {
    fn measure(
        &self,
        font: &FontSpec,
        text: &str,
        size_px: f64,
        thickness: u32,
    ) -> VosdResult<TextExtent> {
        let scale = Self::scale_for(size_px)?;
        let stroke = Self::stroke_for(font, thickness);
        let chars = text.chars().count() as u32;
        if chars == 0 {
            return Ok(TextExtent {
                width: 0,
                height: 0,
                baseline: 0,
            });
        }
        Ok(TextExtent {
            width: chars * bitmap_font::CELL_WIDTH * scale + (stroke - 1),
            height: bitmap_font::CELL_HEIGHT * scale,
            baseline: bitmap_font::GLYPH_HEIGHT * scale,
        })
    }

    fn draw(
        &self,
        font: &FontSpec,
        canvas: &mut PixelBuffer,
        text: &str,
        origin: (i64, i64),
        size_px: f64,
        thickness: u32,
        color: Rgba8,
    ) -> VosdResult<()> {
        if canvas.format() != PixelFormat::Rgba {
            return Err(VosdError::internal(
                "bitmap shaper draws onto RGBA canvases only",
            ));
        }
        if let Some(path) = &font.path {
            debug!(path = %path.display(), "bitmap shaper ignores font files");
        }

        let scale = Self::scale_for(size_px)?;
        let stroke = Self::stroke_for(font, thickness);
        let (canvas_w, canvas_h) = (i64::from(canvas.width()), i64::from(canvas.height()));

        for (i, ch) in text.chars().enumerate() {
            let rows = bitmap_font::glyph(ch);
            let cell_x = origin.0 + (i as i64) * i64::from(bitmap_font::CELL_WIDTH * scale);
            for (row, &bits) in rows.iter().enumerate() {
                for col in 0..bitmap_font::GLYPH_WIDTH {
                    if (bits >> (bitmap_font::GLYPH_WIDTH - 1 - col)) & 1 == 0 {
                        continue;
                    }
                    // One font pixel becomes a scale x scale block, repeated
                    // horizontally for each stroke pass.
                    for pass in 0..stroke {
                        let px = cell_x + i64::from(col * scale) + i64::from(pass);
                        let py = origin.1 + (row as i64) * i64::from(scale);
                        for dy in 0..i64::from(scale) {
                            for dx in 0..i64::from(scale) {
                                let (fx, fy) = (px + dx, py + dy);
                                if fx < 0 || fy < 0 || fx >= canvas_w || fy >= canvas_h {
                                    continue;
                                }
                                canvas.put_rgba(fx as u32, fy as u32, color);
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/shaper.rs"]
mod tests;
