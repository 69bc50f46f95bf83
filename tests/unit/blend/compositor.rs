use super::*;

use std::sync::Arc;

use crate::blend::cpu::CpuBlend;
use crate::overlay::spec::{CustomFormat, OverlaySpec, Placement};
use crate::pixel::buffer::{PixelFormat, Rgba8};
use crate::text::shaper::BitmapShaper;

fn registry_with(backend: CpuBlend) -> OverlayRegistry {
    OverlayRegistry::new(Arc::new(backend), Arc::new(BitmapShaper))
}

fn solid_custom(w: u32, h: u32, c: Rgba8, placement: Placement) -> OverlaySpec {
    let mut data = Vec::with_capacity((w * h * 4) as usize);
    for _ in 0..w * h {
        data.extend_from_slice(&[c.a, c.r, c.g, c.b]);
    }
    OverlaySpec::Custom {
        format: CustomFormat::Argb,
        width: w,
        height: h,
        data: Arc::new(data),
        placement,
    }
}

fn at_origin(z_index: i32) -> Placement {
    Placement {
        z_index,
        ..Placement::default()
    }
}

#[test]
fn blend_requires_a_frame_size() {
    let registry = registry_with(CpuBlend::default());
    let compositor = Compositor::new(&registry);
    let mut dest = PixelBuffer::new(PixelFormat::Rgba, 16, 16).unwrap();
    assert!(matches!(
        compositor.blend(&mut dest),
        Err(VosdError::Uninitialized(_))
    ));
}

#[test]
fn blend_rejects_mismatched_destination() {
    let registry = registry_with(CpuBlend::default());
    registry.set_frame_size(16, 16).unwrap();
    let compositor = Compositor::new(&registry);
    let mut dest = PixelBuffer::new(PixelFormat::Rgba, 8, 8).unwrap();
    assert!(matches!(
        compositor.blend(&mut dest),
        Err(VosdError::Configuration(_))
    ));
}

#[test]
fn higher_z_renders_on_top() {
    let registry = registry_with(CpuBlend::default());
    registry.set_frame_size(16, 16).unwrap();
    registry
        .add_overlay("back", solid_custom(4, 4, Rgba8::new(255, 0, 0, 255), at_origin(1)))
        .unwrap();
    registry
        .add_overlay("front", solid_custom(4, 4, Rgba8::new(0, 255, 0, 255), at_origin(5)))
        .unwrap();

    let mut dest = PixelBuffer::new(PixelFormat::Rgba, 16, 16).unwrap();
    Compositor::new(&registry).blend(&mut dest).unwrap();
    let px = dest.rgba_at(1, 1);
    assert_eq!((px.r, px.g, px.b), (0, 255, 0));
}

#[test]
fn equal_z_ties_break_by_insertion_order() {
    let registry = registry_with(CpuBlend::default());
    registry.set_frame_size(16, 16).unwrap();
    registry
        .add_overlay("first", solid_custom(4, 4, Rgba8::new(255, 0, 0, 255), at_origin(2)))
        .unwrap();
    registry
        .add_overlay("second", solid_custom(4, 4, Rgba8::new(0, 0, 255, 255), at_origin(2)))
        .unwrap();

    let mut dest = PixelBuffer::new(PixelFormat::Rgba, 16, 16).unwrap();
    Compositor::new(&registry).blend(&mut dest).unwrap();
    let px = dest.rgba_at(0, 0);
    assert_eq!((px.r, px.g, px.b), (0, 0, 255));
}

#[test]
fn disabled_overlays_are_skipped() {
    let registry = registry_with(CpuBlend::default());
    registry.set_frame_size(16, 16).unwrap();
    registry
        .add_overlay("only", solid_custom(4, 4, Rgba8::new(255, 0, 0, 255), at_origin(0)))
        .unwrap();
    registry.set_overlay_enabled("only", false).unwrap();

    let mut dest = PixelBuffer::new(PixelFormat::Rgba, 16, 16).unwrap();
    Compositor::new(&registry).blend(&mut dest).unwrap();
    assert_eq!(dest.rgba_at(0, 0).a, 0, "disabled overlay was blended");
}

#[test]
fn batches_larger_than_the_hardware_limit_are_chunked() {
    let registry = registry_with(CpuBlend::new(1));
    registry.set_frame_size(16, 16).unwrap();
    for (idx, id) in ["a", "b", "c"].iter().enumerate() {
        let placement = Placement {
            x: (idx as f64) * 0.25,
            z_index: idx as i32,
            ..Placement::default()
        };
        registry
            .add_overlay(id, solid_custom(2, 2, Rgba8::new(200, 200, 200, 255), placement))
            .unwrap();
    }

    let mut dest = PixelBuffer::new(PixelFormat::Rgba, 16, 16).unwrap();
    Compositor::new(&registry).blend(&mut dest).unwrap();
    for x in [0u32, 4, 8] {
        assert_eq!(dest.rgba_at(x, 0).r, 200, "overlay at x={x} missing");
    }
}
