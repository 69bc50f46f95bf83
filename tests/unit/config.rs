use super::*;
use crate::overlay::spec::OverlayKind;

#[test]
fn minimal_config_parses_with_defaults() {
    let cfg = OsdConfig::from_json(
        r#"{
            "text": [
                { "id": "t1", "label": "cam0", "x": 0.1, "y": 0.1, "z-index": 3 }
            ]
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.text.len(), 1);
    let entry = &cfg.text[0];
    assert_eq!(entry.placement.z_index, 3);
    assert_eq!(entry.style.font_size, 24.0);
    assert_eq!(entry.style.text_color, Rgba8::WHITE);
    assert_eq!(entry.placement.rotation_policy, RotationPolicy::Center);
}

#[test]
fn all_sections_flatten_in_declaration_order() {
    let cfg = OsdConfig::from_json(
        r#"{
            "image": [
                { "id": "logo", "path": "logo.png", "width": 0.2, "height": 0.1,
                  "x": 0.0, "y": 0.0 }
            ],
            "text": [
                { "id": "t1", "label": "hello", "x": 0.5, "y": 0.5 }
            ],
            "dateTime": [
                { "id": "clock", "format": "%H:%M:%S", "x": 0.8, "y": 0.9 }
            ],
            "custom": [
                { "id": "telemetry", "format": "ARGB", "width": 32, "height": 16,
                  "x": 0.1, "y": 0.8 }
            ]
        }"#,
    )
    .unwrap();

    let entries = cfg.entries();
    let kinds: Vec<OverlayKind> = entries.iter().map(|(_, s)| s.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            OverlayKind::Image,
            OverlayKind::Text,
            OverlayKind::DateTime,
            OverlayKind::Custom
        ]
    );
    assert_eq!(entries[0].0, "logo");
    assert_eq!(entries[3].0, "telemetry");
}

#[test]
fn custom_entries_start_transparent_with_matching_length() {
    let cfg = OsdConfig::from_json(
        r#"{ "custom": [
            { "id": "c1", "format": "A420", "width": 4, "height": 2, "x": 0.0, "y": 0.0 }
        ] }"#,
    )
    .unwrap();
    let entries = cfg.entries();
    let OverlaySpec::Custom { data, .. } = &entries[0].1 else {
        panic!("expected custom spec");
    };
    assert_eq!(data.len(), PixelFormat::A420.buffer_len(4, 2));
    assert!(data.iter().all(|&b| b == 0));
}

#[test]
fn colors_parse_as_rgba_arrays() {
    let cfg = OsdConfig::from_json(
        r#"{ "text": [
            { "id": "t1", "label": "x", "x": 0.0, "y": 0.0,
              "text-color": [255, 0, 0, 255],
              "shadow-color": [0, 0, 0, 128],
              "shadow-offset-x": 3, "shadow-offset-y": 3 }
        ] }"#,
    )
    .unwrap();
    let style = &cfg.text[0].style;
    assert_eq!(style.text_color, Rgba8::new(255, 0, 0, 255));
    assert_eq!(style.shadow_color.a, 128);
    assert_eq!(style.shadow_offset_x, 3);
}

#[test]
fn malformed_json_is_a_configuration_error() {
    assert!(matches!(
        OsdConfig::from_json("{ not json"),
        Err(VosdError::Configuration(_))
    ));
    // Wrong type for a field is also rejected at parse time.
    assert!(
        OsdConfig::from_json(r#"{ "text": [ { "id": "t", "label": 5, "x": 0, "y": 0 } ] }"#)
            .is_err()
    );
}

#[test]
fn config_serializes_back_to_json() {
    let cfg = OsdConfig::from_json(
        r#"{ "text": [ { "id": "t1", "label": "x", "x": 0.25, "y": 0.75 } ] }"#,
    )
    .unwrap();
    let json = serde_json::to_string(&cfg).unwrap();
    let reparsed = OsdConfig::from_json(&json).unwrap();
    assert_eq!(reparsed.text[0].id, "t1");
    assert_eq!(reparsed.text[0].placement.x, 0.25);
}
