//! Per-kind rendering into straight-alpha RGBA buffers.
//!
//! Every renderable resolves to an RGBA [`PixelBuffer`]; rotation, hardware
//! format conversion, and placement happen later in the node pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use crate::foundation::error::{VosdError, VosdResult};
use crate::foundation::math::ceil_even_u32;
use crate::pixel::buffer::{PixelBuffer, PixelFormat, Rgba8};
use crate::pixel::convert;
use crate::text::shaper::{FontSpec, TextShaper};

/// Padding around the text ink, per side, before even rounding.
const TEXT_PADDING: u32 = 2;

/// File-backed image, decoded and resized to a normalized fraction of the
/// frame.
#[derive(Clone, Debug)]
pub(crate) struct ImageRenderable {
    pub path: PathBuf,
    pub width: f64,
    pub height: f64,
}

impl ImageRenderable {
    pub(crate) fn render(&self, frame_w: u32, frame_h: u32) -> VosdResult<PixelBuffer> {
        let decoded = image::open(&self.path)
            .map_err(|e| {
                VosdError::invalid_argument(format!(
                    "cannot decode image '{}': {e}",
                    self.path.display()
                ))
            })?
            .to_rgba8();

        let target_w = ceil_even_u32((self.width * f64::from(frame_w)).round() as u32);
        let target_h = ceil_even_u32((self.height * f64::from(frame_h)).round() as u32);
        if target_w == 0 || target_h == 0 {
            return PixelBuffer::new(PixelFormat::Rgba, 0, 0);
        }

        let resized = image::imageops::resize(
            &decoded,
            target_w,
            target_h,
            image::imageops::FilterType::Triangle,
        );
        PixelBuffer::from_vec(PixelFormat::Rgba, target_w, target_h, resized.into_raw())
    }
}

/// One shaped text layer: a label drawn in a single ink color (plus an
/// optional surrounding outline), keyed against a contrast background into a
/// clean alpha mask.
#[derive(Clone)]
pub(crate) struct SimpleTextRenderable {
    pub label: String,
    pub color: Rgba8,
    pub outline_size: u32,
    pub outline_color: Rgba8,
    pub font: FontSpec,
    pub font_size: f64,
    pub thickness: u32,
    pub shaper: Arc<dyn TextShaper>,
}

impl std::fmt::Debug for SimpleTextRenderable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimpleTextRenderable")
            .field("label", &self.label)
            .field("color", &self.color)
            .field("font_size", &self.font_size)
            .finish()
    }
}

impl SimpleTextRenderable {
    /// Render the label. An empty label yields a zero-size buffer that
    /// renders nothing.
    pub(crate) fn render(&self) -> VosdResult<PixelBuffer> {
        if self.label.is_empty() {
            return PixelBuffer::new(PixelFormat::Rgba, 0, 0);
        }

        let extent = self
            .shaper
            .measure(&self.font, &self.label, self.font_size, self.thickness)?;
        if extent.width == 0 || extent.height == 0 {
            return PixelBuffer::new(PixelFormat::Rgba, 0, 0);
        }

        let margin = TEXT_PADDING + self.outline_size;
        let canvas_w = ceil_even_u32(extent.width + 2 * margin);
        let canvas_h = ceil_even_u32(extent.height + 2 * margin);

        // The canvas starts as the higher-contrast of black/white against the
        // ink so anti-aliased edges resolve unambiguously during keying.
        let key = self.color.contrast_background();
        let mut canvas = PixelBuffer::new(PixelFormat::Rgba, canvas_w, canvas_h)?;
        for y in 0..canvas_h {
            for x in 0..canvas_w {
                canvas.put_rgba(x, y, key);
            }
        }

        let origin = (i64::from(margin), i64::from(margin));
        if self.outline_size > 0 && self.outline_color.is_visible() {
            let o = i64::from(self.outline_size);
            for dy in [-o, 0, o] {
                for dx in [-o, 0, o] {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    self.shaper.draw(
                        &self.font,
                        &mut canvas,
                        &self.label,
                        (origin.0 + dx, origin.1 + dy),
                        self.font_size,
                        self.thickness,
                        self.outline_color,
                    )?;
                }
            }
        }
        self.shaper.draw(
            &self.font,
            &mut canvas,
            &self.label,
            origin,
            self.font_size,
            self.thickness,
            self.color,
        )?;

        Ok(key_out_background(canvas, key, self.color))
    }
}

/// Turn the keyed canvas into an alpha mask: background pixels become fully
/// transparent, drawn ink keeps its color, anti-aliased edge pixels get an
/// alpha graded by their distance from the key color.
fn key_out_background(mut canvas: PixelBuffer, key: Rgba8, ink: Rgba8) -> PixelBuffer {
    let denom = [
        u16::from(ink.r.abs_diff(key.r)),
        u16::from(ink.g.abs_diff(key.g)),
        u16::from(ink.b.abs_diff(key.b)),
    ]
    .into_iter()
    .max()
    .unwrap_or(0)
    .max(1);

    for px in canvas.data_mut().chunks_exact_mut(4) {
        let dist = [
            px[0].abs_diff(key.r),
            px[1].abs_diff(key.g),
            px[2].abs_diff(key.b),
        ]
        .into_iter()
        .max()
        .unwrap_or(0);
        if dist == 0 {
            px.copy_from_slice(&[0, 0, 0, 0]);
        } else {
            let alpha = ((u32::from(dist) * 255) / u32::from(denom)).min(255) as u8;
            px[3] = alpha;
        }
    }
    canvas
}

/// Caller-supplied raw pixel buffer. Geometry and byte length were validated
/// at spec level; rendering converts into the engine's RGBA currency.
#[derive(Clone, Debug)]
pub(crate) struct CustomRenderable {
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub data: Arc<Vec<u8>>,
}

impl CustomRenderable {
    pub(crate) fn render(&self) -> VosdResult<PixelBuffer> {
        let source =
            PixelBuffer::from_vec(self.format, self.width, self.height, (*self.data).clone())?;
        convert::convert(&source, PixelFormat::Rgba)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/renderable.rs"]
mod tests;
