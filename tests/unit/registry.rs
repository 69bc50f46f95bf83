use super::*;

use crate::blend::cpu::CpuBlend;
use crate::overlay::spec::{CustomFormat, Placement, TextStyle};
use crate::text::shaper::BitmapShaper;

fn registry() -> OverlayRegistry {
    OverlayRegistry::new(Arc::new(CpuBlend::default()), Arc::new(BitmapShaper))
}

fn text_spec(label: &str, z_index: i32) -> OverlaySpec {
    OverlaySpec::Text {
        label: label.to_string(),
        style: TextStyle::default(),
        placement: Placement {
            x: 0.1,
            y: 0.1,
            z_index,
            ..Placement::default()
        },
    }
}

fn custom_spec(w: u32, h: u32) -> OverlaySpec {
    OverlaySpec::Custom {
        format: CustomFormat::Argb,
        width: w,
        height: h,
        data: Arc::new(vec![0u8; (w * h * 4) as usize]),
        placement: Placement::default(),
    }
}

fn views_are_consistent(registry: &OverlayRegistry) -> bool {
    registry.with_exclusive(|inner| inner.nodes.len() == inner.priority.len())
}

#[test]
fn duplicate_add_is_rejected_without_side_effects() {
    let r = registry();
    r.set_frame_size(640, 480).unwrap();
    r.add_overlay("t1", text_spec("one", 1)).unwrap();
    let before = r.get_overlay("t1").unwrap();

    let err = r.add_overlay("t1", text_spec("two", 9));
    assert!(matches!(err, Err(VosdError::InvalidArgument(_))));

    let after = r.get_overlay("t1").unwrap();
    assert_eq!(after.z_index, before.z_index);
    assert_eq!(after.rendered_size, before.rendered_size);
    assert!(views_are_consistent(&r));
}

#[test]
fn failed_add_inserts_nothing() {
    let r = registry();
    r.set_frame_size(640, 480).unwrap();
    let bad = OverlaySpec::Image {
        path: "/nonexistent/logo.png".into(),
        width: 0.2,
        height: 0.2,
        placement: Placement::default(),
    };
    assert!(r.add_overlay("img", bad).is_err());
    assert!(matches!(
        r.get_overlay("img"),
        Err(VosdError::InvalidArgument(_))
    ));
    assert!(views_are_consistent(&r));
}

#[test]
fn removing_an_unknown_id_fails() {
    let r = registry();
    assert!(matches!(
        r.remove_overlay("missing"),
        Err(VosdError::InvalidArgument(_))
    ));
}

#[test]
fn set_requires_an_existing_id() {
    let r = registry();
    assert!(matches!(
        r.set_overlay("missing", text_spec("x", 0)),
        Err(VosdError::InvalidArgument(_))
    ));
}

#[test]
fn set_replaces_in_place() {
    let r = registry();
    r.set_frame_size(640, 480).unwrap();
    r.add_overlay("t1", text_spec("one", 1)).unwrap();
    r.set_overlay("t1", text_spec("longer label", 7)).unwrap();

    let meta = r.get_overlay("t1").unwrap();
    assert_eq!(meta.z_index, 7);
    assert!(meta.enabled);
    assert!(views_are_consistent(&r));
}

#[test]
fn remove_releases_the_id() {
    let r = registry();
    r.set_frame_size(640, 480).unwrap();
    r.add_overlay("t1", text_spec("one", 1)).unwrap();
    r.remove_overlay("t1").unwrap();
    assert!(matches!(
        r.get_overlay("t1"),
        Err(VosdError::InvalidArgument(_))
    ));
    // The id is free again.
    r.add_overlay("t1", text_spec("two", 2)).unwrap();
    assert!(views_are_consistent(&r));
}

#[test]
fn invalid_frame_size_changes_nothing() {
    let r = registry();
    r.set_frame_size(640, 480).unwrap();
    r.add_overlay("t1", text_spec("one", 1)).unwrap();
    let before = r.get_overlay("t1").unwrap();

    assert!(matches!(
        r.set_frame_size(0, 100),
        Err(VosdError::Configuration(_))
    ));
    assert_eq!(r.frame_size(), Some((640, 480)));
    let after = r.get_overlay("t1").unwrap();
    assert_eq!(after.rendered_size, before.rendered_size);
}

#[test]
fn frame_size_reset_to_same_value_is_a_noop() {
    let r = registry();
    r.set_frame_size(640, 480).unwrap();
    r.set_frame_size(640, 480).unwrap();
    assert_eq!(r.frame_size(), Some((640, 480)));
}

#[test]
fn custom_overlays_need_a_frame_size_immediately() {
    let r = registry();
    assert!(matches!(
        r.add_overlay("c1", custom_spec(4, 4)),
        Err(VosdError::Uninitialized(_))
    ));
}

#[test]
fn deferred_overlays_render_when_the_frame_arrives() {
    let r = registry();
    r.add_overlay("t1", text_spec("later", 1)).unwrap();

    let meta = r.get_overlay("t1").unwrap();
    assert!(!meta.enabled);
    assert!(meta.rendered_size.is_none());

    r.set_frame_size(1280, 720).unwrap();
    let meta = r.get_overlay("t1").unwrap();
    assert!(meta.enabled);
    assert!(meta.rendered_size.is_some());
}

#[test]
fn text_metadata_reports_a_positive_ink_size() {
    let r = registry();
    r.set_frame_size(1920, 1080).unwrap();
    r.add_overlay(
        "t1",
        OverlaySpec::Text {
            label: "Front Door".to_string(),
            style: TextStyle::default(),
            placement: Placement {
                x: 0.7,
                y: 0.7,
                z_index: 1,
                ..Placement::default()
            },
        },
    )
    .unwrap();

    let size = r.get_overlay("t1").unwrap().rendered_size.unwrap();
    assert!(size.width > 0 && size.height > 0);
}

#[test]
fn enable_toggle_requires_a_known_id() {
    let r = registry();
    assert!(matches!(
        r.set_overlay_enabled("ghost", true),
        Err(VosdError::InvalidArgument(_))
    ));
}
