//! Pixel-format conversion between the caller-facing interleaved formats and
//! the blend hardware's planar A420 layout.
//!
//! RGB<->YUV uses the BT.601 studio-swing integer forms; chroma is averaged
//! over each 2x2 block when subsampling.

use crate::foundation::error::{VosdError, VosdResult};
use crate::pixel::buffer::{PixelBuffer, PixelFormat};

/// Convert `src` into `target` format. Same-format conversion is a clone.
pub fn convert(src: &PixelBuffer, target: PixelFormat) -> VosdResult<PixelBuffer> {
    if src.format() == target {
        return Ok(src.clone());
    }
    if src.is_empty() {
        return PixelBuffer::new(target, src.width(), src.height());
    }

    match (src.format(), target) {
        (PixelFormat::Rgba, PixelFormat::Argb) | (PixelFormat::Argb, PixelFormat::Rgba) => {
            Ok(swizzle_alpha(src, target))
        }
        (PixelFormat::Rgba, PixelFormat::A420) => rgba_to_a420(src),
        (PixelFormat::A420, PixelFormat::Rgba) => a420_to_rgba(src),
        (PixelFormat::Argb, PixelFormat::A420) => {
            rgba_to_a420(&swizzle_alpha(src, PixelFormat::Rgba))
        }
        (PixelFormat::A420, PixelFormat::Argb) => {
            Ok(swizzle_alpha(&a420_to_rgba(src)?, PixelFormat::Argb))
        }
        (from, to) => Err(VosdError::internal(format!(
            "unhandled pixel conversion {from:?} -> {to:?}"
        ))),
    }
}

/// RGBA<->ARGB: move the alpha byte across the pixel, keep channel order.
fn swizzle_alpha(src: &PixelBuffer, target: PixelFormat) -> PixelBuffer {
    let mut data = Vec::with_capacity(src.data().len());
    for px in src.data().chunks_exact(4) {
        match target {
            // RGBA -> ARGB
            PixelFormat::Argb => data.extend_from_slice(&[px[3], px[0], px[1], px[2]]),
            // ARGB -> RGBA
            PixelFormat::Rgba => data.extend_from_slice(&[px[1], px[2], px[3], px[0]]),
            PixelFormat::A420 => unreachable!("swizzle targets are interleaved formats"),
        }
    }
    PixelBuffer::from_vec(target, src.width(), src.height(), data)
        .expect("swizzle preserves geometry")
}

fn rgba_to_a420(src: &PixelBuffer) -> VosdResult<PixelBuffer> {
    let (w, h) = (src.width(), src.height());
    if w % 2 != 0 || h % 2 != 0 {
        return Err(VosdError::invalid_argument(format!(
            "A420 conversion requires even dimensions, got {w}x{h}"
        )));
    }

    let px = (w as usize) * (h as usize);
    let mut out = vec![0u8; PixelFormat::A420.buffer_len(w, h)];
    let (y_plane, rest) = out.split_at_mut(px);
    let (u_plane, rest) = rest.split_at_mut(px / 4);
    let (v_plane, a_plane) = rest.split_at_mut(px / 4);

    let data = src.data();
    for row in 0..h as usize {
        for col in 0..w as usize {
            let idx = (row * w as usize + col) * 4;
            let (r, g, b, a) = (
                i32::from(data[idx]),
                i32::from(data[idx + 1]),
                i32::from(data[idx + 2]),
                data[idx + 3],
            );
            y_plane[row * w as usize + col] =
                (((66 * r + 129 * g + 25 * b + 128) >> 8) + 16).clamp(0, 255) as u8;
            a_plane[row * w as usize + col] = a;
        }
    }

    // Chroma from the average color of each 2x2 block.
    let chroma_w = (w / 2) as usize;
    for cy in 0..(h / 2) as usize {
        for cx in 0..chroma_w {
            let (mut r_sum, mut g_sum, mut b_sum) = (0i32, 0i32, 0i32);
            for dy in 0..2 {
                for dx in 0..2 {
                    let idx = ((cy * 2 + dy) * w as usize + cx * 2 + dx) * 4;
                    r_sum += i32::from(data[idx]);
                    g_sum += i32::from(data[idx + 1]);
                    b_sum += i32::from(data[idx + 2]);
                }
            }
            let (r, g, b) = (r_sum / 4, g_sum / 4, b_sum / 4);
            u_plane[cy * chroma_w + cx] =
                (((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128).clamp(0, 255) as u8;
            v_plane[cy * chroma_w + cx] =
                (((112 * r - 94 * g - 18 * b + 128) >> 8) + 128).clamp(0, 255) as u8;
        }
    }

    PixelBuffer::from_vec(PixelFormat::A420, w, h, out)
}

fn a420_to_rgba(src: &PixelBuffer) -> VosdResult<PixelBuffer> {
    let (w, h) = (src.width(), src.height());
    let y_plane = src.y_plane();
    let u_plane = src.u_plane();
    let v_plane = src.v_plane();
    let a_plane = src.a_plane();

    let chroma_w = (w / 2) as usize;
    let mut out = Vec::with_capacity(PixelFormat::Rgba.buffer_len(w, h));
    for row in 0..h as usize {
        for col in 0..w as usize {
            let c = i32::from(y_plane[row * w as usize + col]) - 16;
            let d = i32::from(u_plane[(row / 2) * chroma_w + col / 2]) - 128;
            let e = i32::from(v_plane[(row / 2) * chroma_w + col / 2]) - 128;
            out.push(((298 * c + 409 * e + 128) >> 8).clamp(0, 255) as u8);
            out.push(((298 * c - 100 * d - 208 * e + 128) >> 8).clamp(0, 255) as u8);
            out.push(((298 * c + 516 * d + 128) >> 8).clamp(0, 255) as u8);
            out.push(a_plane[row * w as usize + col]);
        }
    }

    PixelBuffer::from_vec(PixelFormat::Rgba, w, h, out)
}

#[cfg(test)]
#[path = "../../tests/unit/pixel/convert.rs"]
mod tests;
