//! Pure Rust render backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG, GIF, BMP, TIFF, WebP) | `image::ImageReader` with content sniffing |
//! | Stretch | `fast_image_resize::Resizer` writing into the [`Surface`] buffer (default bilinear) |
//! | Encode → PNG | `image::codecs::png::PngEncoder`, RGBA8 |

use super::backend::{DecodeError, RenderBackend, RenderError, RenderedAsset, SourceImage, Surface};
use super::params::ResizeFilter;
use crate::catalog::Dimension;
use fast_image_resize as fr;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageError, ImageReader, RgbaImage};
use std::io::Cursor;
use std::time::Instant;

/// Backend using `image` for decode and PNG encode, `fast_image_resize` for the stretch.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustBackend {
    filter: ResizeFilter,
}

impl RustBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(filter: ResizeFilter) -> Self {
        Self { filter }
    }

    /// Stretch the whole of `source` over the whole of `canvas`.
    fn stretch_into(
        &self,
        source: &SourceImage,
        canvas: &mut RgbaImage,
        target: Dimension,
    ) -> Result<(), RenderError> {
        let resize_err = |e: &dyn std::fmt::Display| RenderError::Resize {
            dimension: target,
            reason: e.to_string(),
        };
        let src = fr::images::ImageRef::new(
            source.width(),
            source.height(),
            source.pixels().as_raw(),
            fr::PixelType::U8x4,
        )
        .map_err(|e| resize_err(&e))?;
        let mut dst = fr::images::Image::from_slice_u8(
            target.width,
            target.height,
            &mut **canvas,
            fr::PixelType::U8x4,
        )
        .map_err(|e| resize_err(&e))?;

        let options = fr::ResizeOptions::new().resize_alg(self.filter.resize_alg());
        fr::Resizer::new()
            .resize(&src, &mut dst, Some(&options))
            .map_err(|e| resize_err(&e))
    }
}

fn encode_png(canvas: &RgbaImage, dimension: Dimension) -> Result<Vec<u8>, RenderError> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(
            canvas.as_raw(),
            canvas.width(),
            canvas.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|source| RenderError::Encode { dimension, source })?;
    Ok(png)
}

impl RenderBackend for RustBackend {
    fn decode(&self, bytes: &[u8]) -> Result<SourceImage, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| DecodeError::Malformed(ImageError::IoError(e)))?;
        let Some(format) = reader.format() else {
            return Err(DecodeError::UnknownFormat);
        };
        let decoded = reader.decode().map_err(|e| match e {
            // Sniffed a format whose decoder is not compiled in
            ImageError::Unsupported(_) => DecodeError::UnknownFormat,
            other => DecodeError::Malformed(other),
        })?;
        log::debug!(
            "decoded {:?} source {}x{} ({} bytes)",
            format,
            decoded.width(),
            decoded.height(),
            bytes.len()
        );
        Ok(SourceImage::from_rgba(decoded.into_rgba8()))
    }

    fn render_at(
        &self,
        surface: &mut Surface,
        source: &SourceImage,
        target: Dimension,
    ) -> Result<RenderedAsset, RenderError> {
        if !target.is_renderable() {
            return Err(RenderError::InvalidDimension(target));
        }
        let started = Instant::now();

        let canvas = surface.prepare(target)?;
        self.stretch_into(source, canvas, target)?;

        let png = encode_png(canvas, target)?;
        log::debug!(
            "rendered {target} from {}x{} in {:?} ({} bytes)",
            source.width(),
            source.height(),
            started.elapsed(),
            png.len()
        );
        Ok(RenderedAsset {
            dimension: target,
            png,
        })
    }
}
