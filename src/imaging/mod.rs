//! Image decoding and rendition rendering in pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (format sniffed from content) |
//! | **Stretch** | `fast_image_resize`, full source box → full target box, into a reused [`Surface`] |
//! | **Encode** | PNG, RGBA8 |
//!
//! The module is split into:
//! - **Parameters**: [`ResizeFilter`] selection
//! - **Backend**: [`RenderBackend`] trait, [`Surface`], [`RustBackend`]

pub mod backend;
mod params;
pub mod rust_backend;

pub use backend::{DecodeError, RenderBackend, RenderError, RenderedAsset, SourceImage, Surface};
pub use params::ResizeFilter;
pub use rust_backend::RustBackend;
