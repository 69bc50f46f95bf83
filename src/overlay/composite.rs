//! Multi-layer text composition.
//!
//! A text overlay is up to three independently rendered layers sharing one
//! label — background, shadow, foreground — kept in back-to-front order with
//! offsets relative to a shared canvas. Rendering is cached by the last
//! rendered label, so date/time overlays only pay for shaping when their
//! formatted label actually changes.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::foundation::error::VosdResult;
use crate::overlay::renderable::SimpleTextRenderable;
use crate::overlay::spec::TextStyle;
use crate::pixel::buffer::{PixelBuffer, PixelFormat};
use crate::text::shaper::{FontSpec, TextShaper};
use crate::text::timestamp::TimestampFormat;

/// One rendered RGBA layer plus its offset inside the composite canvas.
#[derive(Clone, Debug)]
pub(crate) struct RenderedLayer {
    pub buffer: PixelBuffer,
    pub rel_x: i64,
    pub rel_y: i64,
}

pub(crate) struct TextComposite {
    style: TextStyle,
    font: FontSpec,
    shaper: Arc<dyn TextShaper>,
    label: String,
    last_rendered: Option<String>,
    layers: SmallVec<[RenderedLayer; 3]>,
    foreground_size: Option<(u32, u32)>,
}

impl std::fmt::Debug for TextComposite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextComposite")
            .field("label", &self.label)
            .field("last_rendered", &self.last_rendered)
            .field("layers", &self.layers.len())
            .finish()
    }
}

impl TextComposite {
    pub(crate) fn new(label: String, style: TextStyle, shaper: Arc<dyn TextShaper>) -> Self {
        let font = FontSpec::new(style.font_path.clone(), style.font_weight);
        Self {
            style,
            font,
            shaper,
            label,
            last_rendered: None,
            layers: SmallVec::new(),
            foreground_size: None,
        }
    }

    pub(crate) fn label(&self) -> &str {
        &self.label
    }

    /// Swap the label, invalidating the cached render only when it changed.
    /// Returns whether a re-render is now pending.
    pub(crate) fn set_label(&mut self, label: String) -> bool {
        if self.label == label {
            return false;
        }
        self.label = label;
        self.last_rendered = None;
        true
    }

    /// Size of the rendered foreground layer, for metadata snapshots.
    pub(crate) fn foreground_size(&self) -> Option<(u32, u32)> {
        self.foreground_size
    }

    fn foreground_renderable(&self) -> SimpleTextRenderable {
        SimpleTextRenderable {
            label: self.label.clone(),
            color: self.style.text_color,
            outline_size: self.style.outline_size,
            outline_color: self.style.outline_color,
            font: self.font.clone(),
            font_size: self.style.font_size,
            thickness: self.style.line_thickness,
            shaper: self.shaper.clone(),
        }
    }

    fn shadow_renderable(&self) -> SimpleTextRenderable {
        SimpleTextRenderable {
            label: self.label.clone(),
            color: self.style.shadow_color,
            outline_size: 0,
            outline_color: self.style.outline_color,
            font: self.font.clone(),
            font_size: self.style.font_size,
            thickness: self.style.line_thickness,
            shaper: self.shaper.clone(),
        }
    }

    /// Render (or reuse) the layer stack, back-to-front.
    pub(crate) fn render(&mut self) -> VosdResult<&[RenderedLayer]> {
        if self.last_rendered.as_deref() == Some(self.label.as_str()) {
            return Ok(&self.layers);
        }

        let mut layers: SmallVec<[RenderedLayer; 3]> = SmallVec::new();
        let foreground = self.foreground_renderable().render()?;
        if foreground.is_empty() {
            self.layers = layers;
            self.foreground_size = None;
            self.last_rendered = Some(self.label.clone());
            return Ok(&self.layers);
        }
        self.foreground_size = Some((foreground.width(), foreground.height()));

        // Shadow and foreground share one enlarged canvas so they stay
        // aligned; the relative origins absorb a negative shadow offset.
        let (sx, sy) = (
            i64::from(self.style.shadow_offset_x),
            i64::from(self.style.shadow_offset_y),
        );
        let has_shadow = self.style.shadow_color.is_visible();
        let fg_rel = if has_shadow {
            ((-sx).max(0), (-sy).max(0))
        } else {
            (0, 0)
        };

        if self.style.background_color.is_visible() {
            let mut backdrop =
                PixelBuffer::new(PixelFormat::Rgba, foreground.width(), foreground.height())?;
            for y in 0..backdrop.height() {
                for x in 0..backdrop.width() {
                    backdrop.put_rgba(x, y, self.style.background_color);
                }
            }
            layers.push(RenderedLayer {
                buffer: backdrop,
                rel_x: fg_rel.0,
                rel_y: fg_rel.1,
            });
        }

        if has_shadow {
            let shadow = self.shadow_renderable().render()?;
            if !shadow.is_empty() {
                layers.push(RenderedLayer {
                    buffer: shadow,
                    rel_x: fg_rel.0 + sx,
                    rel_y: fg_rel.1 + sy,
                });
            }
        }

        layers.push(RenderedLayer {
            buffer: foreground,
            rel_x: fg_rel.0,
            rel_y: fg_rel.1,
        });

        self.layers = layers;
        self.last_rendered = Some(self.label.clone());
        Ok(&self.layers)
    }
}

/// A text composite whose label tracks the wall clock.
#[derive(Debug)]
pub(crate) struct DateTimeState {
    format: TimestampFormat,
    pub(crate) composite: TextComposite,
}

impl DateTimeState {
    pub(crate) fn new(
        format: &str,
        style: TextStyle,
        shaper: Arc<dyn TextShaper>,
    ) -> VosdResult<Self> {
        let format = TimestampFormat::parse(format)?;
        let label = format.now()?;
        Ok(Self {
            format,
            composite: TextComposite::new(label, style, shaper),
        })
    }

    pub(crate) fn format_str(&self) -> &str {
        self.format.raw()
    }

    /// Re-derive the label from the wall clock. Returns whether it changed
    /// (and therefore whether the hardware buffers went stale).
    pub(crate) fn refresh(&mut self) -> VosdResult<bool> {
        let label = self.format.now()?;
        Ok(self.composite.set_label(label))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/composite.rs"]
mod tests;
