use super::*;
use crate::pixel::buffer::Rgba8;

fn solid_rgba(w: u32, h: u32, c: Rgba8) -> PixelBuffer {
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for _ in 0..w * h {
        data.extend_from_slice(&[c.r, c.g, c.b, c.a]);
    }
    PixelBuffer::from_vec(PixelFormat::Rgba, w, h, data).unwrap()
}

#[test]
fn same_format_is_identity() {
    let src = solid_rgba(2, 2, Rgba8::new(10, 20, 30, 40));
    let out = convert(&src, PixelFormat::Rgba).unwrap();
    assert_eq!(out, src);
}

#[test]
fn rgba_argb_swizzle_roundtrips() {
    let src = solid_rgba(2, 2, Rgba8::new(1, 2, 3, 4));
    let argb = convert(&src, PixelFormat::Argb).unwrap();
    assert_eq!(&argb.data()[..4], &[4, 1, 2, 3]);
    let back = convert(&argb, PixelFormat::Rgba).unwrap();
    assert_eq!(back, src);
}

#[test]
fn white_maps_to_studio_swing_extremes() {
    let src = solid_rgba(2, 2, Rgba8::WHITE);
    let a420 = convert(&src, PixelFormat::A420).unwrap();
    // BT.601 white: Y=235, neutral chroma, opaque alpha plane.
    assert!(a420.y_plane().iter().all(|&y| y == 235));
    assert!(a420.u_plane().iter().all(|&u| u.abs_diff(128) <= 1));
    assert!(a420.v_plane().iter().all(|&v| v.abs_diff(128) <= 1));
    assert!(a420.a_plane().iter().all(|&a| a == 255));
}

#[test]
fn a420_roundtrip_is_close_for_primaries() {
    for color in [
        Rgba8::new(255, 0, 0, 255),
        Rgba8::new(0, 255, 0, 255),
        Rgba8::new(0, 0, 255, 255),
        Rgba8::new(128, 128, 128, 200),
    ] {
        let src = solid_rgba(4, 4, color);
        let there = convert(&src, PixelFormat::A420).unwrap();
        let back = convert(&there, PixelFormat::Rgba).unwrap();
        let px = back.rgba_at(1, 1);
        assert!(px.r.abs_diff(color.r) <= 4, "r {} vs {}", px.r, color.r);
        assert!(px.g.abs_diff(color.g) <= 4, "g {} vs {}", px.g, color.g);
        assert!(px.b.abs_diff(color.b) <= 4, "b {} vs {}", px.b, color.b);
        assert_eq!(px.a, color.a);
    }
}

#[test]
fn a420_conversion_rejects_odd_geometry() {
    let src = solid_rgba(3, 2, Rgba8::WHITE);
    assert!(matches!(
        convert(&src, PixelFormat::A420),
        Err(VosdError::InvalidArgument(_))
    ));
}

#[test]
fn empty_buffers_convert_to_empty() {
    let src = PixelBuffer::new(PixelFormat::Rgba, 0, 0).unwrap();
    let out = convert(&src, PixelFormat::A420).unwrap();
    assert!(out.is_empty());
    assert_eq!(out.format(), PixelFormat::A420);
}
