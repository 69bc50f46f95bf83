//! vosd is an on-screen-display (OSD) compositing engine for embedded video
//! pipelines.
//!
//! It maintains a live registry of graphical overlays — static images,
//! styled text labels, live date/time stamps, and caller-supplied raw pixel
//! buffers — and, once per output frame, composites every enabled overlay
//! onto that frame through a blend backend.
//!
//! # Pipeline overview
//!
//! 1. **Describe**: build an [`OverlaySpec`] (or parse an [`OsdConfig`])
//! 2. **Register**: [`OverlayRegistry`] renders the overlay into
//!    hardware-ready buffers as soon as the frame size is known
//! 3. **Blend**: [`Compositor::blend`] walks the z-ordered registry once per
//!    frame and submits batched blend calls to the [`BlendBackend`]
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Even geometry end-to-end**: every buffer dimension and offset handed
//!   to the backend is even (planar YUV/alpha constraint).
//! - **The registry lock is for bookkeeping**: the async mutation paths do
//!   all decode/shape/render work off-lock.
//! - **Collaborator seams are traits**: the blend device and the font shaper are
//!   trait objects; [`CpuBlend`] and [`BitmapShaper`] are the built-in
//!   reference implementations.
#![forbid(unsafe_code)]

mod blend;
mod config;
mod foundation;
mod overlay;
mod pixel;
mod registry;
mod text;

pub use blend::backend::{BlendBackend, BlendOp, HardwareBuffer};
pub use blend::compositor::Compositor;
pub use blend::cpu::{CpuBlend, DEFAULT_MAX_OVERLAYS_PER_CALL};
pub use config::{
    CustomEntry, DateTimeEntry, ImageEntry, OsdConfig, PlacementEntry, TextEntry, TextStyleEntry,
};
pub use foundation::error::{VosdError, VosdResult};
pub use foundation::geometry::{
    Drift, ResolvedPlacement, RotationPolicy, clamp_even, resolve_offset, rotated_bbox,
};
pub use overlay::node::{OverlayMetadata, PixelSize};
pub use overlay::spec::{CustomFormat, OverlayKind, OverlaySpec, Placement, TextStyle};
pub use pixel::buffer::{PixelBuffer, PixelFormat, Rgba8};
pub use pixel::convert::convert;
pub use registry::OverlayRegistry;
pub use text::shaper::{BitmapShaper, FontSpec, TextExtent, TextShaper};
