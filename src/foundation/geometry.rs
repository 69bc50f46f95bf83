//! Pure placement math: normalized-to-pixel offset resolution with alignment
//! anchors and rotation drift, even-pixel clamping, and center rotation of
//! RGBA buffers.
//!
//! Everything here is stateless; callers feed frame geometry in and get pixel
//! geometry out. All returned dimensions and offsets are even — the blend
//! hardware rejects odd plane geometry.

use kurbo::{Affine, Point};

use crate::foundation::error::{VosdError, VosdResult};
use crate::foundation::math::{ceil_even_u32, floor_even_u32};

/// Pixel bias applied on top of the normalized offset, produced by rotation
/// when the bounding box grows around a centered anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Drift {
    pub x: i64,
    pub y: i64,
}

/// Anchoring behavior for a rotated overlay whose bounding box grew.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RotationPolicy {
    /// The visual center stays anchored on the original point.
    #[default]
    Center,
    /// The original top-left corner stays anchored.
    TopLeft,
}

/// Pixel-space result of [`resolve_offset`]: where the overlay lands and the
/// (possibly shrunk) size it may occupy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedPlacement {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Round a pixel offset down to the nearest even value.
pub fn clamp_even(v: u32) -> u32 {
    floor_even_u32(v)
}

/// Resolve a normalized `[0,1]` offset into an even pixel placement.
///
/// The anchor point is `round(norm * frame) + drift`, then shifted left/up by
/// `overlay * align` so an anchor of 0 places the left/top edge on the point,
/// 0.5 centers, and 1 places the right/bottom edge on it. Placements that
/// start outside the frame fail; placements that merely overhang the far edge
/// are shrunk to fit, rounded down to even.
pub fn resolve_offset(
    x_norm: f64,
    y_norm: f64,
    overlay_w: u32,
    overlay_h: u32,
    frame_w: u32,
    frame_h: u32,
    drift: Drift,
    h_align: f64,
    v_align: f64,
) -> VosdResult<ResolvedPlacement> {
    if !(0.0..=1.0).contains(&x_norm) || !(0.0..=1.0).contains(&y_norm) {
        return Err(VosdError::configuration(format!(
            "normalized offset ({x_norm}, {y_norm}) outside [0, 1]"
        )));
    }
    if !(0.0..=1.0).contains(&h_align) || !(0.0..=1.0).contains(&v_align) {
        return Err(VosdError::configuration(format!(
            "alignment anchor ({h_align}, {v_align}) outside [0, 1]"
        )));
    }

    let x_px = (x_norm * f64::from(frame_w)).round() as i64 + drift.x
        - (f64::from(overlay_w) * h_align).round() as i64;
    let y_px = (y_norm * f64::from(frame_h)).round() as i64 + drift.y
        - (f64::from(overlay_h) * v_align).round() as i64;

    if x_px < 0 || y_px < 0 || x_px >= i64::from(frame_w) || y_px >= i64::from(frame_h) {
        return Err(VosdError::configuration(format!(
            "overlay at ({x_px}, {y_px}) cannot fit in {frame_w}x{frame_h} frame"
        )));
    }

    // Offsets leave here even; the shrink below therefore never reintroduces
    // an odd right/bottom edge.
    let x_px = floor_even_u32(x_px as u32);
    let y_px = floor_even_u32(y_px as u32);

    let mut width = overlay_w;
    if u64::from(x_px) + u64::from(width) > u64::from(frame_w) {
        width = floor_even_u32(frame_w - x_px);
    }
    let mut height = overlay_h;
    if u64::from(y_px) + u64::from(height) > u64::from(frame_h) {
        height = floor_even_u32(frame_h - y_px);
    }

    Ok(ResolvedPlacement {
        x: x_px,
        y: y_px,
        width,
        height,
    })
}

/// Axis-aligned bounding box of a `w`x`h` rectangle rotated by `angle_deg`,
/// rounded up to even dimensions.
pub fn rotated_bbox(w: u32, h: u32, angle_deg: f64) -> (u32, u32) {
    // The epsilon keeps right-angle rotations from ceiling up on floating
    // point noise (cos 90deg is ~6e-17, not 0).
    const EPS: f64 = 1e-9;
    let rad = angle_deg.to_radians();
    let (sin, cos) = (rad.sin().abs(), rad.cos().abs());
    let bw = (f64::from(w) * cos + f64::from(h) * sin - EPS).ceil().max(0.0) as u32;
    let bh = (f64::from(w) * sin + f64::from(h) * cos - EPS).ceil().max(0.0) as u32;
    (ceil_even_u32(bw), ceil_even_u32(bh))
}

/// Rotate a straight-alpha RGBA buffer about its center.
///
/// Returns the rotated pixels, their (even) bounding-box dimensions, and the
/// anchor drift: for [`RotationPolicy::Center`] the drift re-centers the grown
/// bounding box on the original center, for [`RotationPolicy::TopLeft`] it is
/// zero. An angle of 0 is a no-op with zero drift.
pub fn rotate_rgba(
    data: &[u8],
    w: u32,
    h: u32,
    angle_deg: f64,
    policy: RotationPolicy,
) -> VosdResult<(Vec<u8>, u32, u32, Drift)> {
    let expected = (w as usize) * (h as usize) * 4;
    if data.len() != expected {
        return Err(VosdError::internal(format!(
            "rotate expects {expected} rgba bytes, got {}",
            data.len()
        )));
    }

    if angle_deg == 0.0 {
        return Ok((data.to_vec(), w, h, Drift::default()));
    }

    let (bw, bh) = rotated_bbox(w, h, angle_deg);
    let rad = angle_deg.to_radians();

    // Map destination pixel centers back into the source through the inverse
    // of "rotate about the source center, then re-center in the new box".
    let src_center = Point::new(f64::from(w) * 0.5, f64::from(h) * 0.5);
    let dst_center = Point::new(f64::from(bw) * 0.5, f64::from(bh) * 0.5);
    let inverse = Affine::translate(src_center.to_vec2())
        * Affine::rotate(-rad)
        * Affine::translate(-dst_center.to_vec2());

    let mut out = vec![0u8; (bw as usize) * (bh as usize) * 4];
    for dy in 0..bh {
        for dx in 0..bw {
            let src = inverse * Point::new(f64::from(dx) + 0.5, f64::from(dy) + 0.5);
            let sx = src.x.floor() as i64;
            let sy = src.y.floor() as i64;
            if sx < 0 || sy < 0 || sx >= i64::from(w) || sy >= i64::from(h) {
                continue;
            }
            let src_idx = ((sy as usize) * (w as usize) + sx as usize) * 4;
            let dst_idx = ((dy as usize) * (bw as usize) + dx as usize) * 4;
            out[dst_idx..dst_idx + 4].copy_from_slice(&data[src_idx..src_idx + 4]);
        }
    }

    let drift = match policy {
        RotationPolicy::Center => Drift {
            x: (i64::from(w) - i64::from(bw)) / 2,
            y: (i64::from(h) - i64::from(bh)) / 2,
        },
        RotationPolicy::TopLeft => Drift::default(),
    };

    Ok((out, bw, bh, drift))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/geometry.rs"]
mod tests;
