//! Render backend trait and shared types.
//!
//! The [`RenderBackend`] trait defines the two operations every backend must
//! support: decode raw bytes into a [`SourceImage`], and render that source at
//! a target [`Dimension`] into PNG bytes.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! and `fast_image_resize` crates. Tests use a recording mock so
//! orchestration can be checked without pixel work.

use crate::catalog::Dimension;
use image::RgbaImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("input is empty")]
    Empty,
    #[error("unrecognized image format")]
    UnknownFormat,
    #[error("malformed image: {0}")]
    Malformed(#[source] image::ImageError),
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid target dimension {0}: width and height must be positive")]
    InvalidDimension(Dimension),
    #[error("cannot allocate a {0} drawing surface (limit {max} per side)", max = MAX_SURFACE_SIDE)]
    Surface(Dimension),
    #[error("resize to {dimension} failed: {reason}")]
    Resize { dimension: Dimension, reason: String },
    #[error("PNG encode failed for {dimension}: {source}")]
    Encode {
        dimension: Dimension,
        #[source]
        source: image::ImageError,
    },
}

/// A decoded source raster, normalized to RGBA8.
///
/// Read-only once decoded; every render borrows it.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    pixels: RgbaImage,
}

impl SourceImage {
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// One encoded rendition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedAsset {
    pub dimension: Dimension,
    pub png: Vec<u8>,
}

/// Largest width or height a surface will allocate.
pub const MAX_SURFACE_SIDE: u32 = 8192;

/// Reusable off-screen canvas.
///
/// Backends resize straight into the canvas returned by
/// [`prepare`](Self::prepare), so the backing buffer is allocated once and
/// only grows when a larger size comes along. `prepare` clears it before
/// every use, so nothing drawn for one size survives into the next. Renders
/// take `&mut Surface`, so a surface can only serve one render at a time.
#[derive(Debug, Default)]
pub struct Surface {
    canvas: RgbaImage,
    renders: usize,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a canvas of `target` size may be allocated.
    pub fn fits(target: Dimension) -> bool {
        target.is_renderable()
            && target.width <= MAX_SURFACE_SIDE
            && target.height <= MAX_SURFACE_SIDE
    }

    /// Size the canvas to `target` and clear it to fully transparent.
    ///
    /// Fails before touching the buffer when `target` exceeds
    /// [`MAX_SURFACE_SIDE`].
    pub fn prepare(&mut self, target: Dimension) -> Result<&mut RgbaImage, RenderError> {
        if !Self::fits(target) {
            return Err(RenderError::Surface(target));
        }
        let len = (target.width as usize)
            .checked_mul(target.height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or(RenderError::Surface(target))?;

        let mut buf = std::mem::take(&mut self.canvas).into_raw();
        buf.clear();
        buf.resize(len, 0);

        self.canvas = RgbaImage::from_raw(target.width, target.height, buf)
            .ok_or(RenderError::Surface(target))?;
        self.renders += 1;
        Ok(&mut self.canvas)
    }

    /// Bytes the backing buffer can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.canvas.as_raw().capacity()
    }

    /// How many times this surface has been prepared.
    pub fn renders(&self) -> usize {
        self.renders
    }
}

/// Trait for render backends.
///
/// `Sync` so a single backend can be shared by parallel catalog passes.
pub trait RenderBackend: Sync {
    /// Decode raw image bytes. The format is detected from content.
    fn decode(&self, bytes: &[u8]) -> Result<SourceImage, DecodeError>;

    /// Stretch `source` onto a cleared `target`-sized canvas and encode it as PNG.
    fn render_at(
        &self,
        surface: &mut Surface,
        source: &SourceImage,
        target: Dimension,
    ) -> Result<RenderedAsset, RenderError>;
}
