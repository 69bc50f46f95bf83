//! Typed model of the JSON configuration surface.
//!
//! The top-level object carries optional `image`, `text`, `dateTime`, and
//! `custom` arrays; each entry is an id plus the fields of the matching
//! overlay kind. Parsing is strict about types and lenient about omissions —
//! everything except the id and position has a default.

use std::path::PathBuf;
use std::sync::Arc;

use crate::foundation::error::{VosdError, VosdResult};
use crate::foundation::geometry::RotationPolicy;
use crate::overlay::spec::{CustomFormat, OverlaySpec, Placement, TextStyle};
use crate::pixel::buffer::{PixelFormat, Rgba8};

fn default_text_color() -> Rgba8 {
    Rgba8::WHITE
}

fn default_outline_color() -> Rgba8 {
    Rgba8::BLACK
}

fn default_font_size() -> f64 {
    24.0
}

fn default_line_thickness() -> u32 {
    1
}

fn default_font_weight() -> u32 {
    400
}

fn default_datetime_format() -> String {
    "%d-%m-%Y %H:%M:%S".to_string()
}

/// Parsed OSD configuration.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct OsdConfig {
    #[serde(default)]
    pub image: Vec<ImageEntry>,
    #[serde(default)]
    pub text: Vec<TextEntry>,
    #[serde(default, rename = "dateTime")]
    pub date_time: Vec<DateTimeEntry>,
    #[serde(default)]
    pub custom: Vec<CustomEntry>,
}

/// Position fields shared by every entry kind.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct PlacementEntry {
    pub x: f64,
    pub y: f64,
    #[serde(default, rename = "z-index")]
    pub z_index: i32,
    #[serde(default)]
    pub angle: f64,
    #[serde(default, rename = "rotation-policy")]
    pub rotation_policy: RotationPolicy,
    #[serde(default, rename = "horizontal-alignment")]
    pub h_align: f64,
    #[serde(default, rename = "vertical-alignment")]
    pub v_align: f64,
}

impl From<&PlacementEntry> for Placement {
    fn from(e: &PlacementEntry) -> Self {
        Placement {
            x: e.x,
            y: e.y,
            z_index: e.z_index,
            angle: e.angle,
            rotation_policy: e.rotation_policy,
            h_align: e.h_align,
            v_align: e.v_align,
        }
    }
}

/// Text styling fields shared by `text` and `dateTime` entries.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TextStyleEntry {
    #[serde(default = "default_text_color", rename = "text-color")]
    pub text_color: Rgba8,
    #[serde(default, rename = "background-color")]
    pub background_color: Rgba8,
    #[serde(default, rename = "shadow-color")]
    pub shadow_color: Rgba8,
    #[serde(default, rename = "shadow-offset-x")]
    pub shadow_offset_x: i32,
    #[serde(default, rename = "shadow-offset-y")]
    pub shadow_offset_y: i32,
    #[serde(default, rename = "outline-size")]
    pub outline_size: u32,
    #[serde(default = "default_outline_color", rename = "outline-color")]
    pub outline_color: Rgba8,
    #[serde(default, rename = "font-path")]
    pub font_path: Option<PathBuf>,
    #[serde(default = "default_font_size", rename = "font-size")]
    pub font_size: f64,
    #[serde(default = "default_line_thickness", rename = "line-thickness")]
    pub line_thickness: u32,
    #[serde(default = "default_font_weight", rename = "font-weight")]
    pub font_weight: u32,
}

impl From<&TextStyleEntry> for TextStyle {
    fn from(e: &TextStyleEntry) -> Self {
        TextStyle {
            text_color: e.text_color,
            background_color: e.background_color,
            shadow_color: e.shadow_color,
            shadow_offset_x: e.shadow_offset_x,
            shadow_offset_y: e.shadow_offset_y,
            outline_size: e.outline_size,
            outline_color: e.outline_color,
            font_path: e.font_path.clone(),
            font_size: e.font_size,
            line_thickness: e.line_thickness,
            font_weight: e.font_weight,
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ImageEntry {
    pub id: String,
    pub path: PathBuf,
    pub width: f64,
    pub height: f64,
    #[serde(flatten)]
    pub placement: PlacementEntry,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TextEntry {
    pub id: String,
    pub label: String,
    #[serde(flatten)]
    pub style: TextStyleEntry,
    #[serde(flatten)]
    pub placement: PlacementEntry,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct DateTimeEntry {
    pub id: String,
    #[serde(default = "default_datetime_format")]
    pub format: String,
    #[serde(flatten)]
    pub style: TextStyleEntry,
    #[serde(flatten)]
    pub placement: PlacementEntry,
}

/// A `custom` entry declares geometry and format only; configs cannot carry
/// raw pixel data, so these start fully transparent until the caller
/// replaces them via `set_overlay`.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CustomEntry {
    pub id: String,
    pub format: CustomFormat,
    pub width: u32,
    pub height: u32,
    #[serde(flatten)]
    pub placement: PlacementEntry,
}

impl OsdConfig {
    /// Parse a JSON document into a config.
    pub fn from_json(json: &str) -> VosdResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| VosdError::configuration(format!("malformed OSD config: {e}")))
    }

    /// Flatten into id/spec pairs in declaration order (images, text,
    /// date/time, custom).
    pub(crate) fn entries(&self) -> Vec<(String, OverlaySpec)> {
        let mut out = Vec::new();
        for e in &self.image {
            out.push((
                e.id.clone(),
                OverlaySpec::Image {
                    path: e.path.clone(),
                    width: e.width,
                    height: e.height,
                    placement: (&e.placement).into(),
                },
            ));
        }
        for e in &self.text {
            out.push((
                e.id.clone(),
                OverlaySpec::Text {
                    label: e.label.clone(),
                    style: (&e.style).into(),
                    placement: (&e.placement).into(),
                },
            ));
        }
        for e in &self.date_time {
            out.push((
                e.id.clone(),
                OverlaySpec::DateTime {
                    format: e.format.clone(),
                    style: (&e.style).into(),
                    placement: (&e.placement).into(),
                },
            ));
        }
        for e in &self.custom {
            let len = PixelFormat::from(e.format).buffer_len(e.width, e.height);
            out.push((
                e.id.clone(),
                OverlaySpec::Custom {
                    format: e.format,
                    width: e.width,
                    height: e.height,
                    data: Arc::new(vec![0u8; len]),
                    placement: (&e.placement).into(),
                },
            ));
        }
        out
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
