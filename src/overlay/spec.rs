//! Caller-facing overlay descriptors: a closed set of overlay kinds plus the
//! placement and text styling they share.

use std::path::PathBuf;
use std::sync::Arc;

use crate::foundation::error::{VosdError, VosdResult};
use crate::foundation::geometry::RotationPolicy;
use crate::pixel::buffer::{PixelFormat, Rgba8};

/// Where an overlay sits on the frame.
///
/// `x`/`y` are normalized to `[0,1]` of the frame size; the alignment anchors
/// choose which point of the overlay lands there (0 = left/top edge,
/// 0.5 = center, 1 = right/bottom edge). `angle` is degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub z_index: i32,
    pub angle: f64,
    pub rotation_policy: RotationPolicy,
    pub h_align: f64,
    pub v_align: f64,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z_index: 0,
            angle: 0.0,
            rotation_policy: RotationPolicy::Center,
            h_align: 0.0,
            v_align: 0.0,
        }
    }
}

impl Placement {
    pub(crate) fn validate(&self) -> VosdResult<()> {
        if !(0.0..=1.0).contains(&self.x) || !(0.0..=1.0).contains(&self.y) {
            return Err(VosdError::configuration(format!(
                "overlay offset ({}, {}) outside [0, 1]",
                self.x, self.y
            )));
        }
        if !(0.0..=1.0).contains(&self.h_align) || !(0.0..=1.0).contains(&self.v_align) {
            return Err(VosdError::configuration(format!(
                "alignment anchor ({}, {}) outside [0, 1]",
                self.h_align, self.v_align
            )));
        }
        if !self.angle.is_finite() {
            return Err(VosdError::configuration("rotation angle must be finite"));
        }
        Ok(())
    }
}

/// Styling for text and date/time overlays. Shadow and background layers
/// exist only while their color has positive alpha.
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    pub text_color: Rgba8,
    pub background_color: Rgba8,
    pub shadow_color: Rgba8,
    pub shadow_offset_x: i32,
    pub shadow_offset_y: i32,
    pub outline_size: u32,
    pub outline_color: Rgba8,
    pub font_path: Option<PathBuf>,
    pub font_size: f64,
    pub line_thickness: u32,
    pub font_weight: u32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            text_color: Rgba8::WHITE,
            background_color: Rgba8::TRANSPARENT,
            shadow_color: Rgba8::TRANSPARENT,
            shadow_offset_x: 0,
            shadow_offset_y: 0,
            outline_size: 0,
            outline_color: Rgba8::BLACK,
            font_path: None,
            font_size: 24.0,
            line_thickness: 1,
            font_weight: 400,
        }
    }
}

impl TextStyle {
    pub(crate) fn validate(&self) -> VosdResult<()> {
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(VosdError::configuration(format!(
                "font size {} must be finite and > 0",
                self.font_size
            )));
        }
        Ok(())
    }
}

/// Pixel layouts accepted from custom-overlay callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CustomFormat {
    A420,
    Argb,
}

impl From<CustomFormat> for PixelFormat {
    fn from(f: CustomFormat) -> Self {
        match f {
            CustomFormat::A420 => PixelFormat::A420,
            CustomFormat::Argb => PixelFormat::Argb,
        }
    }
}

/// Overlay kind discriminant, exposed through metadata snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    Image,
    Text,
    DateTime,
    Custom,
}

/// Immutable description of one overlay, handed to the registry.
#[derive(Clone, Debug)]
pub enum OverlaySpec {
    /// A file-backed image, decoded and resized to `width`x`height`
    /// (normalized to the frame).
    Image {
        path: PathBuf,
        width: f64,
        height: f64,
        placement: Placement,
    },
    /// A styled text label.
    Text {
        label: String,
        style: TextStyle,
        placement: Placement,
    },
    /// A text label re-derived from the wall clock on every blend, using a
    /// strftime-style format string.
    DateTime {
        format: String,
        style: TextStyle,
        placement: Placement,
    },
    /// A caller-supplied raw pixel buffer.
    Custom {
        format: CustomFormat,
        width: u32,
        height: u32,
        data: Arc<Vec<u8>>,
        placement: Placement,
    },
}

impl OverlaySpec {
    pub fn placement(&self) -> &Placement {
        match self {
            OverlaySpec::Image { placement, .. }
            | OverlaySpec::Text { placement, .. }
            | OverlaySpec::DateTime { placement, .. }
            | OverlaySpec::Custom { placement, .. } => placement,
        }
    }

    pub fn kind(&self) -> OverlayKind {
        match self {
            OverlaySpec::Image { .. } => OverlayKind::Image,
            OverlaySpec::Text { .. } => OverlayKind::Text,
            OverlaySpec::DateTime { .. } => OverlayKind::DateTime,
            OverlaySpec::Custom { .. } => OverlayKind::Custom,
        }
    }

    pub(crate) fn validate(&self) -> VosdResult<()> {
        self.placement().validate()?;
        match self {
            OverlaySpec::Image { width, height, .. } => {
                if !(0.0..=1.0).contains(width) || !(0.0..=1.0).contains(height) {
                    return Err(VosdError::configuration(format!(
                        "image size ({width}, {height}) outside [0, 1]"
                    )));
                }
                Ok(())
            }
            OverlaySpec::Text { style, .. } | OverlaySpec::DateTime { style, .. } => {
                style.validate()
            }
            OverlaySpec::Custom {
                format,
                width,
                height,
                data,
                ..
            } => {
                if width % 2 != 0 || height % 2 != 0 {
                    return Err(VosdError::invalid_argument(format!(
                        "custom overlay requires even dimensions, got {width}x{height}"
                    )));
                }
                let expected = PixelFormat::from(*format).buffer_len(*width, *height);
                if data.len() != expected {
                    return Err(VosdError::invalid_argument(format!(
                        "custom {format:?} buffer of {width}x{height} needs {expected} bytes, \
                         got {}",
                        data.len()
                    )));
                }
                Ok(())
            }
        }
    }
}
