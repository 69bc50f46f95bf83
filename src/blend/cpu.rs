//! Software reference implementation of the blend backend.
//!
//! Stages overlays in straight-alpha RGBA and composites them src-over onto
//! an RGBA destination frame with saturating integer math. Used by the test
//! suites and by hosts without a DSP.

use crate::blend::backend::{BlendBackend, BlendOp};
use crate::foundation::error::{VosdError, VosdResult};
use crate::foundation::math::{add_sat_u8, mul_div255_u8};
use crate::pixel::buffer::{PixelBuffer, PixelFormat};

/// Batch size mirroring the DSP's per-call overlay limit.
pub const DEFAULT_MAX_OVERLAYS_PER_CALL: usize = 50;

#[derive(Clone, Copy, Debug)]
pub struct CpuBlend {
    max_per_call: usize,
}

impl CpuBlend {
    pub fn new(max_per_call: usize) -> Self {
        Self {
            max_per_call: max_per_call.max(1),
        }
    }
}

impl Default for CpuBlend {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_OVERLAYS_PER_CALL)
    }
}

impl BlendBackend for CpuBlend {
    fn staging_format(&self) -> PixelFormat {
        PixelFormat::Rgba
    }

    fn max_overlays_per_call(&self) -> usize {
        self.max_per_call
    }

    fn multiblend(&self, dest: &mut PixelBuffer, overlays: &[BlendOp<'_>]) -> VosdResult<()> {
        if dest.format() != PixelFormat::Rgba {
            return Err(VosdError::dsp(format!(
                "cpu blend requires an RGBA destination, got {:?}",
                dest.format()
            )));
        }
        if overlays.len() > self.max_per_call {
            return Err(VosdError::dsp(format!(
                "{} overlays exceed the per-call limit of {}",
                overlays.len(),
                self.max_per_call
            )));
        }

        for op in overlays {
            blend_one(dest, op)?;
        }
        Ok(())
    }
}

fn blend_one(dest: &mut PixelBuffer, op: &BlendOp<'_>) -> VosdResult<()> {
    let src = op.pixels;
    if src.format() != PixelFormat::Rgba {
        return Err(VosdError::dsp(format!(
            "cpu blend requires RGBA overlays, got {:?}",
            src.format()
        )));
    }
    if src.is_empty() {
        return Ok(());
    }
    let (dw, dh) = (dest.width(), dest.height());
    if u64::from(op.x_offset) + u64::from(src.width()) > u64::from(dw)
        || u64::from(op.y_offset) + u64::from(src.height()) > u64::from(dh)
    {
        return Err(VosdError::dsp(format!(
            "overlay {}x{} at ({}, {}) exceeds {dw}x{dh} destination",
            src.width(),
            src.height(),
            op.x_offset,
            op.y_offset
        )));
    }

    let src_stride = (src.width() as usize) * 4;
    let dst_stride = (dw as usize) * 4;
    let src_data = src.data();

    for row in 0..src.height() as usize {
        let src_row = &src_data[row * src_stride..(row + 1) * src_stride];
        let dst_start = (op.y_offset as usize + row) * dst_stride + (op.x_offset as usize) * 4;
        let dst_row = &mut dest.data_mut()[dst_start..dst_start + src_stride];

        for (d, s) in dst_row.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
            let sa = u16::from(s[3]);
            if sa == 0 {
                continue;
            }
            let inv = 255 - sa;
            // Straight-alpha src-over; video destinations are treated as
            // opaque, so color channels mix directly.
            for i in 0..3 {
                d[i] = add_sat_u8(
                    mul_div255_u8(u16::from(s[i]), sa),
                    mul_div255_u8(u16::from(d[i]), inv),
                );
            }
            d[3] = add_sat_u8(sa as u8, mul_div255_u8(u16::from(d[3]), inv));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/blend/cpu.rs"]
mod tests;
