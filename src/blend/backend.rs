//! The blend-accelerator seam.
//!
//! The engine stages overlays as [`HardwareBuffer`]s in the backend's pixel
//! format and hands them to [`BlendBackend::multiblend`] in batches. Real
//! deployments implement the trait over their DSP; [`crate::blend::cpu`]
//! carries the software reference implementation.

use crate::foundation::error::VosdResult;
use crate::pixel::buffer::{PixelBuffer, PixelFormat};

/// One hardware-ready overlay buffer: pixels in the backend's staging format
/// plus the even pixel offset where the blend writes them.
#[derive(Clone, Debug)]
pub struct HardwareBuffer {
    pub pixels: PixelBuffer,
    pub x_offset: u32,
    pub y_offset: u32,
}

/// Borrowed view of a [`HardwareBuffer`] as submitted to one blend call.
#[derive(Clone, Copy, Debug)]
pub struct BlendOp<'a> {
    pub pixels: &'a PixelBuffer,
    pub x_offset: u32,
    pub y_offset: u32,
}

/// A blend device handle. Owned explicitly by the registry instance — there
/// is no process-global device state.
pub trait BlendBackend: Send + Sync {
    /// Pixel format overlays must be staged in before submission.
    fn staging_format(&self) -> PixelFormat;

    /// Hard limit on overlays per `multiblend` call; the compositor chunks
    /// the frame's overlay list to this size.
    fn max_overlays_per_call(&self) -> usize;

    /// Blend `overlays` into `dest` in order. The destination is mutated in
    /// place; a failure leaves whatever was already written.
    fn multiblend(&self, dest: &mut PixelBuffer, overlays: &[BlendOp<'_>]) -> VosdResult<()>;
}
