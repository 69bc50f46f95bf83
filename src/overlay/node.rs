//! The registry-owned overlay object: placement plus kind payload plus the
//! lazily built hardware buffers the blend step consumes.

use std::sync::Arc;

use smallvec::SmallVec;
use tracing::debug;

use crate::blend::backend::HardwareBuffer;
use crate::foundation::error::{VosdError, VosdResult};
use crate::foundation::geometry::{self, Drift};
use crate::overlay::composite::{DateTimeState, RenderedLayer, TextComposite};
use crate::overlay::renderable::{CustomRenderable, ImageRenderable};
use crate::overlay::spec::{OverlayKind, OverlaySpec, Placement};
use crate::pixel::buffer::{PixelBuffer, PixelFormat};
use crate::pixel::convert;
use crate::text::shaper::TextShaper;

/// Kind-specific payload of a node.
pub(crate) enum NodeContent {
    Image(ImageRenderable),
    Text(TextComposite),
    DateTime(DateTimeState),
    Custom(CustomRenderable),
}

impl std::fmt::Debug for NodeContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeContent::Image(_) => f.write_str("Image"),
            NodeContent::Text(_) => f.write_str("Text"),
            NodeContent::DateTime(_) => f.write_str("DateTime"),
            NodeContent::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// Resolved pixel size exposed through metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

/// Read-only snapshot of one overlay, returned by `get_overlay`.
#[derive(Clone, Debug)]
pub struct OverlayMetadata {
    pub id: String,
    pub kind: OverlayKind,
    pub x: f64,
    pub y: f64,
    pub z_index: i32,
    pub angle: f64,
    pub enabled: bool,
    /// Rendered pixel size (pre-rotation). `None` until the overlay has been
    /// rendered, or when it renders nothing (empty label).
    pub rendered_size: Option<PixelSize>,
}

#[derive(Debug)]
pub(crate) struct OverlayNode {
    id: String,
    content: NodeContent,
    placement: Placement,
    enabled: bool,
    built: Option<SmallVec<[HardwareBuffer; 3]>>,
    rendered_size: Option<PixelSize>,
    /// Insertion sequence backing the priority key `(z_index, seq)`; cached
    /// here so removal from the priority index is a direct O(log n) lookup.
    pub(crate) seq: u64,
}

impl OverlayNode {
    /// Construct a node from its spec. Cheap validation and format parsing
    /// happen here; decode/shape/render work is deferred to
    /// [`Self::build_hardware_buffers`].
    pub(crate) fn from_spec(
        id: &str,
        spec: OverlaySpec,
        shaper: &Arc<dyn TextShaper>,
    ) -> VosdResult<Self> {
        spec.validate()?;
        let placement = *spec.placement();
        let content = match spec {
            OverlaySpec::Image {
                path,
                width,
                height,
                ..
            } => NodeContent::Image(ImageRenderable {
                path,
                width,
                height,
            }),
            OverlaySpec::Text { label, style, .. } => {
                NodeContent::Text(TextComposite::new(label, style, shaper.clone()))
            }
            OverlaySpec::DateTime { format, style, .. } => {
                NodeContent::DateTime(DateTimeState::new(&format, style, shaper.clone())?)
            }
            OverlaySpec::Custom {
                format,
                width,
                height,
                data,
                ..
            } => NodeContent::Custom(CustomRenderable {
                format: format.into(),
                width,
                height,
                data,
            }),
        };
        Ok(Self {
            id: id.to_string(),
            content,
            placement,
            enabled: false,
            built: None,
            rendered_size: None,
            seq: 0,
        })
    }

    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn z_index(&self) -> i32 {
        self.placement.z_index
    }

    pub(crate) fn enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn is_custom(&self) -> bool {
        matches!(self.content, NodeContent::Custom(_))
    }

    pub(crate) fn metadata(&self) -> OverlayMetadata {
        let kind = match self.content {
            NodeContent::Image(_) => OverlayKind::Image,
            NodeContent::Text(_) => OverlayKind::Text,
            NodeContent::DateTime(_) => OverlayKind::DateTime,
            NodeContent::Custom(_) => OverlayKind::Custom,
        };
        OverlayMetadata {
            id: self.id.clone(),
            kind,
            x: self.placement.x,
            y: self.placement.y,
            z_index: self.placement.z_index,
            angle: self.placement.angle,
            enabled: self.enabled,
            rendered_size: self.rendered_size,
        }
    }

    /// Render, rotate, convert, and place this overlay's content into
    /// hardware-ready buffers. A zero-size render yields an empty list — a
    /// valid "renders nothing" state. On success the node is enabled.
    pub(crate) fn build_hardware_buffers(
        &mut self,
        frame_w: u32,
        frame_h: u32,
        staging: PixelFormat,
    ) -> VosdResult<()> {
        if frame_w == 0 || frame_h == 0 {
            return Err(VosdError::uninitialized(
                "frame size must be set before hardware buffers can be built",
            ));
        }

        let layers: SmallVec<[RenderedLayer; 3]> = match &mut self.content {
            NodeContent::Image(image) => {
                let buffer = image.render(frame_w, frame_h)?;
                SmallVec::from_iter([RenderedLayer {
                    buffer,
                    rel_x: 0,
                    rel_y: 0,
                }])
            }
            NodeContent::Text(composite) => composite.render()?.iter().cloned().collect(),
            NodeContent::DateTime(state) => state.composite.render()?.iter().cloned().collect(),
            NodeContent::Custom(custom) => {
                let buffer = custom.render()?;
                SmallVec::from_iter([RenderedLayer {
                    buffer,
                    rel_x: 0,
                    rel_y: 0,
                }])
            }
        };

        let size = match &self.content {
            NodeContent::Text(c) => c.foreground_size(),
            NodeContent::DateTime(s) => s.composite.foreground_size(),
            _ => layers
                .first()
                .filter(|l| !l.buffer.is_empty())
                .map(|l| (l.buffer.width(), l.buffer.height())),
        };
        self.rendered_size = size.map(|(width, height)| PixelSize { width, height });

        let mut buffers: SmallVec<[HardwareBuffer; 3]> = SmallVec::new();
        for layer in &layers {
            if layer.buffer.is_empty() {
                continue;
            }
            let (data, w, h, drift) = geometry::rotate_rgba(
                layer.buffer.data(),
                layer.buffer.width(),
                layer.buffer.height(),
                self.placement.angle,
                self.placement.rotation_policy,
            )?;
            let rotated = PixelBuffer::from_vec(PixelFormat::Rgba, w, h, data)?;

            let placed = geometry::resolve_offset(
                self.placement.x,
                self.placement.y,
                w,
                h,
                frame_w,
                frame_h,
                Drift {
                    x: drift.x + layer.rel_x,
                    y: drift.y + layer.rel_y,
                },
                self.placement.h_align,
                self.placement.v_align,
            )?;

            let fitted = if placed.width != w || placed.height != h {
                crop_rgba(&rotated, placed.width, placed.height)?
            } else {
                rotated
            };
            if fitted.is_empty() {
                continue;
            }

            buffers.push(HardwareBuffer {
                pixels: convert::convert(&fitted, staging)?,
                x_offset: placed.x,
                y_offset: placed.y,
            });
        }

        debug!(id = %self.id, buffers = buffers.len(), "built hardware buffers");
        self.built = Some(buffers);
        self.enabled = true;
        Ok(())
    }

    /// Hardware buffers from the last successful build.
    pub(crate) fn hardware_buffers(&self) -> VosdResult<&[HardwareBuffer]> {
        self.built.as_deref().ok_or_else(|| {
            VosdError::uninitialized(format!("overlay '{}' has no hardware buffers yet", self.id))
        })
    }

    /// Bring the node up to date for a blend pass: date/time overlays
    /// re-derive their label from the wall clock (the documented
    /// self-mutating read), and any invalidated content is rebuilt.
    pub(crate) fn refresh_for_blend(
        &mut self,
        frame_w: u32,
        frame_h: u32,
        staging: PixelFormat,
    ) -> VosdResult<()> {
        let stale = match &mut self.content {
            NodeContent::DateTime(state) => state.refresh()?,
            _ => false,
        };
        if stale || self.built.is_none() {
            self.build_hardware_buffers(frame_w, frame_h, staging)?;
        }
        Ok(())
    }
}

/// Crop an RGBA buffer to the top-left `width`x`height` region.
fn crop_rgba(src: &PixelBuffer, width: u32, height: u32) -> VosdResult<PixelBuffer> {
    if width > src.width() || height > src.height() {
        return Err(VosdError::internal("crop region exceeds source buffer"));
    }
    if width == 0 || height == 0 {
        return PixelBuffer::new(PixelFormat::Rgba, 0, 0);
    }
    let mut data = Vec::with_capacity((width as usize) * (height as usize) * 4);
    let src_stride = (src.width() as usize) * 4;
    for row in 0..height as usize {
        let start = row * src_stride;
        data.extend_from_slice(&src.data()[start..start + (width as usize) * 4]);
    }
    PixelBuffer::from_vec(PixelFormat::Rgba, width, height, data)
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/node.rs"]
mod tests;
