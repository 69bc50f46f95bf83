use super::*;

#[test]
fn resolve_rejects_out_of_range_offsets() {
    let err = resolve_offset(1.5, 0.5, 10, 10, 640, 480, Drift::default(), 0.0, 0.0);
    assert!(matches!(err, Err(VosdError::Configuration(_))));

    let err = resolve_offset(0.5, -0.1, 10, 10, 640, 480, Drift::default(), 0.0, 0.0);
    assert!(matches!(err, Err(VosdError::Configuration(_))));
}

#[test]
fn resolve_rejects_bad_alignment_anchor() {
    let err = resolve_offset(0.5, 0.5, 10, 10, 640, 480, Drift::default(), 1.5, 0.0);
    assert!(matches!(err, Err(VosdError::Configuration(_))));
}

#[test]
fn offset_shrinks_to_fit_far_edge() {
    let p = resolve_offset(0.9, 0.9, 100, 100, 640, 480, Drift::default(), 0.0, 0.0).unwrap();
    assert_eq!(p.x, 576);
    assert_eq!(p.y, 432);
    assert!(p.x + p.width <= 640);
    assert!(p.y + p.height <= 480);
    assert_eq!(p.width % 2, 0);
    assert_eq!(p.height % 2, 0);
}

#[test]
fn resolve_fails_when_anchor_leaves_frame() {
    let err = resolve_offset(1.0, 0.0, 10, 10, 640, 480, Drift::default(), 0.0, 0.0);
    assert!(matches!(err, Err(VosdError::Configuration(_))));
}

#[test]
fn alignment_centers_the_overlay() {
    let p = resolve_offset(0.5, 0.5, 100, 50, 640, 480, Drift::default(), 0.5, 0.5).unwrap();
    assert_eq!(p.x, 270);
    // 240 - 25 = 215, clamped down to even.
    assert_eq!(p.y, 214);
    assert_eq!(p.width, 100);
    assert_eq!(p.height, 50);
}

#[test]
fn drift_biases_the_anchor() {
    let base = resolve_offset(0.5, 0.5, 10, 10, 640, 480, Drift::default(), 0.0, 0.0).unwrap();
    let drifted =
        resolve_offset(0.5, 0.5, 10, 10, 640, 480, Drift { x: -20, y: 6 }, 0.0, 0.0).unwrap();
    assert_eq!(drifted.x, base.x - 20);
    assert_eq!(drifted.y, base.y + 6);

    let err = resolve_offset(0.0, 0.0, 10, 10, 640, 480, Drift { x: -2, y: 0 }, 0.0, 0.0);
    assert!(matches!(err, Err(VosdError::Configuration(_))));
}

#[test]
fn offsets_are_always_even() {
    // 0.33 * 640 = 211.2 -> 211, which must clamp down to 210.
    let p = resolve_offset(0.33, 0.33, 10, 10, 640, 480, Drift::default(), 0.0, 0.0).unwrap();
    assert_eq!(p.x % 2, 0);
    assert_eq!(p.y % 2, 0);
}

#[test]
fn clamp_even_rounds_down() {
    assert_eq!(clamp_even(7), 6);
    assert_eq!(clamp_even(8), 8);
    assert_eq!(clamp_even(0), 0);
}

#[test]
fn rotated_bbox_is_stable_at_right_angles() {
    assert_eq!(rotated_bbox(100, 50, 0.0), (100, 50));
    assert_eq!(rotated_bbox(100, 50, 90.0), (50, 100));
    assert_eq!(rotated_bbox(100, 50, 180.0), (100, 50));
}

#[test]
fn rotated_bbox_grows_even_at_oblique_angles() {
    let (bw, bh) = rotated_bbox(100, 50, 30.0);
    assert_eq!(bw % 2, 0);
    assert_eq!(bh % 2, 0);
    assert!(bw >= 100 && bh >= 50);
}

#[test]
fn rotate_zero_angle_is_noop() {
    let data = vec![9u8; 4 * 6 * 4];
    let (out, w, h, drift) = rotate_rgba(&data, 4, 6, 0.0, RotationPolicy::Center).unwrap();
    assert_eq!(out, data);
    assert_eq!((w, h), (4, 6));
    assert_eq!(drift, Drift::default());
}

#[test]
fn rotate_90_center_policy_reports_recentering_drift() {
    let data = vec![0u8; 100 * 50 * 4];
    let (_, w, h, drift) = rotate_rgba(&data, 100, 50, 90.0, RotationPolicy::Center).unwrap();
    assert_eq!((w, h), (50, 100));
    assert_eq!(drift, Drift { x: 25, y: -25 });
}

#[test]
fn rotate_top_left_policy_has_zero_drift() {
    let data = vec![0u8; 100 * 50 * 4];
    let (_, _, _, drift) = rotate_rgba(&data, 100, 50, 45.0, RotationPolicy::TopLeft).unwrap();
    assert_eq!(drift, Drift::default());
}

#[test]
fn rotate_preserves_opaque_coverage_at_right_angles() {
    let mut data = vec![0u8; 8 * 4 * 4];
    // One opaque pixel at (1, 0).
    data[1 * 4 + 3] = 255;
    let (out, w, h, _) = rotate_rgba(&data, 8, 4, 90.0, RotationPolicy::Center).unwrap();
    assert_eq!((w, h), (4, 8));
    let covered = out.chunks_exact(4).filter(|px| px[3] == 255).count();
    assert_eq!(covered, 1);
}

#[test]
fn rotate_rejects_mismatched_buffer() {
    let err = rotate_rgba(&[0u8; 10], 4, 4, 10.0, RotationPolicy::Center);
    assert!(matches!(err, Err(VosdError::Internal(_))));
}
