//! Per-frame compositing: walk the registry's priority view and push every
//! enabled overlay through the blend backend in batches.

use tracing::debug;

use crate::blend::backend::BlendOp;
use crate::foundation::error::{VosdError, VosdResult};
use crate::foundation::geometry::clamp_even;
use crate::pixel::buffer::PixelBuffer;
use crate::registry::OverlayRegistry;

/// Blends the registry's overlays onto destination frames.
#[derive(Clone)]
pub struct Compositor {
    registry: OverlayRegistry,
}

impl Compositor {
    pub fn new(registry: &OverlayRegistry) -> Self {
        Self {
            registry: registry.clone(),
        }
    }

    /// Composite all enabled overlays onto `dest`, in ascending z order
    /// (ties broken by insertion order), mutating the frame in place.
    ///
    /// Blend is a writer even though most overlays are read-only during it:
    /// date/time overlays re-derive their label from the wall clock as a
    /// side effect of being read. On a backend failure, chunks already
    /// submitted remain applied; the error is returned, not swallowed.
    #[tracing::instrument(skip_all)]
    pub fn blend(&self, dest: &mut PixelBuffer) -> VosdResult<()> {
        let backend = self.registry.backend().clone();
        let staging = backend.staging_format();

        self.registry.with_exclusive(|inner| {
            let Some((frame_w, frame_h)) = inner.frame_size else {
                return Err(VosdError::uninitialized(
                    "set_frame_size must be called before blend",
                ));
            };
            if dest.width() != frame_w || dest.height() != frame_h {
                return Err(VosdError::configuration(format!(
                    "destination {}x{} does not match configured frame {frame_w}x{frame_h}",
                    dest.width(),
                    dest.height()
                )));
            }

            let ids: Vec<String> = inner.priority.values().cloned().collect();

            // Refresh pass: bring self-mutating content (date/time labels)
            // and invalidated buffers up to date before anything is read.
            for id in &ids {
                let node = inner
                    .nodes
                    .get_mut(id)
                    .ok_or_else(|| VosdError::internal(format!("node '{id}' missing from map")))?;
                if !node.enabled() {
                    continue;
                }
                node.refresh_for_blend(frame_w, frame_h, staging)?;
            }

            // Collect pass: one ordered op list, back (low z) to front.
            let mut ops = Vec::new();
            for id in &ids {
                let node = inner
                    .nodes
                    .get(id)
                    .ok_or_else(|| VosdError::internal(format!("node '{id}' missing from map")))?;
                if !node.enabled() {
                    continue;
                }
                for hw in node.hardware_buffers()? {
                    if hw.pixels.is_empty() {
                        continue;
                    }
                    ops.push(BlendOp {
                        pixels: &hw.pixels,
                        x_offset: clamp_even(hw.x_offset),
                        y_offset: clamp_even(hw.y_offset),
                    });
                }
            }

            // Chunked submission against one destination; each chunk's
            // result is the next chunk's input.
            let max = backend.max_overlays_per_call().max(1);
            for chunk in ops.chunks(max) {
                backend.multiblend(dest, chunk)?;
            }

            debug!(overlays = ops.len(), "frame blended");
            Ok(())
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/blend/compositor.rs"]
mod tests;
