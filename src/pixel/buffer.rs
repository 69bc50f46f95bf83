//! Pixel currency of the engine: a plane-aware byte buffer plus the
//! straight-alpha color type shared by text styling and blending.

use crate::foundation::error::{VosdError, VosdResult};

/// Pixel layouts the engine understands.
///
/// `Rgba`/`Argb` are interleaved 4-byte formats. `A420` is the blend
/// hardware's planar layout: full-resolution Y and alpha planes plus 2x2
/// subsampled U and V planes, stored contiguously in Y, U, V, A order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PixelFormat {
    Rgba,
    Argb,
    A420,
}

impl PixelFormat {
    /// Byte length of a `width`x`height` buffer in this format.
    pub fn buffer_len(self, width: u32, height: u32) -> usize {
        let px = (width as usize) * (height as usize);
        match self {
            PixelFormat::Rgba | PixelFormat::Argb => px * 4,
            // Y + A at full resolution, U + V at quarter resolution.
            PixelFormat::A420 => px * 2 + px / 2,
        }
    }

    /// Planar formats constrain geometry to even dimensions.
    pub fn requires_even_dimensions(self) -> bool {
        matches!(self, PixelFormat::A420)
    }
}

/// Straight-alpha RGBA color (not premultiplied — OSD styling colors).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "[u8; 4]", into = "[u8; 4]")]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// BT.601 luma approximation, used for contrast decisions only.
    pub fn luma(self) -> u8 {
        ((u32::from(self.r) * 77 + u32::from(self.g) * 150 + u32::from(self.b) * 29) >> 8) as u8
    }

    /// The higher-contrast of black/white against this color. Text rendering
    /// keys its canvas against this so anti-aliased edges stay unambiguous.
    pub fn contrast_background(self) -> Rgba8 {
        if self.luma() >= 128 {
            Rgba8::BLACK
        } else {
            Rgba8::WHITE
        }
    }

    /// A layer gated on this color exists only when it is visible at all.
    pub fn is_visible(self) -> bool {
        self.a > 0
    }
}

impl From<[u8; 4]> for Rgba8 {
    fn from(v: [u8; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<Rgba8> for [u8; 4] {
    fn from(c: Rgba8) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

/// A pixel buffer in one of the supported formats.
///
/// Zero-size buffers are valid and mean "renders nothing" (e.g. an empty
/// text label).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    format: PixelFormat,
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a zeroed (fully transparent) buffer.
    pub fn new(format: PixelFormat, width: u32, height: u32) -> VosdResult<Self> {
        Self::check_geometry(format, width, height)?;
        Ok(Self {
            format,
            width,
            height,
            data: vec![0u8; format.buffer_len(width, height)],
        })
    }

    /// Wrap caller-provided bytes, validating length against the geometry.
    pub fn from_vec(
        format: PixelFormat,
        width: u32,
        height: u32,
        data: Vec<u8>,
    ) -> VosdResult<Self> {
        Self::check_geometry(format, width, height)?;
        let expected = format.buffer_len(width, height);
        if data.len() != expected {
            return Err(VosdError::invalid_argument(format!(
                "{format:?} buffer of {width}x{height} needs {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            format,
            width,
            height,
            data,
        })
    }

    fn check_geometry(format: PixelFormat, width: u32, height: u32) -> VosdResult<()> {
        if format.requires_even_dimensions() && (width % 2 != 0 || height % 2 != 0) {
            return Err(VosdError::invalid_argument(format!(
                "{format:?} requires even dimensions, got {width}x{height}"
            )));
        }
        Ok(())
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Y plane of an A420 buffer.
    pub fn y_plane(&self) -> &[u8] {
        debug_assert_eq!(self.format, PixelFormat::A420);
        &self.data[..self.pixel_count()]
    }

    /// U plane of an A420 buffer (quarter resolution).
    pub fn u_plane(&self) -> &[u8] {
        debug_assert_eq!(self.format, PixelFormat::A420);
        let px = self.pixel_count();
        &self.data[px..px + px / 4]
    }

    /// V plane of an A420 buffer (quarter resolution).
    pub fn v_plane(&self) -> &[u8] {
        debug_assert_eq!(self.format, PixelFormat::A420);
        let px = self.pixel_count();
        &self.data[px + px / 4..px + px / 2]
    }

    /// Alpha plane of an A420 buffer.
    pub fn a_plane(&self) -> &[u8] {
        debug_assert_eq!(self.format, PixelFormat::A420);
        let px = self.pixel_count();
        &self.data[px + px / 2..]
    }

    /// Read one RGBA pixel. Panics on out-of-bounds or non-Rgba format;
    /// intended for tests and the CPU blend path.
    pub fn rgba_at(&self, x: u32, y: u32) -> Rgba8 {
        assert_eq!(self.format, PixelFormat::Rgba);
        assert!(x < self.width && y < self.height);
        let idx = ((y as usize) * (self.width as usize) + x as usize) * 4;
        Rgba8::new(
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        )
    }

    /// Write one RGBA pixel. Same constraints as [`Self::rgba_at`].
    pub fn put_rgba(&mut self, x: u32, y: u32, c: Rgba8) {
        assert_eq!(self.format, PixelFormat::Rgba);
        assert!(x < self.width && y < self.height);
        let idx = ((y as usize) * (self.width as usize) + x as usize) * 4;
        self.data[idx] = c.r;
        self.data[idx + 1] = c.g;
        self.data[idx + 2] = c.b;
        self.data[idx + 3] = c.a;
    }
}
