//! Parameter types for render operations.
//!
//! ## Types
//!
//! - [`ResizeFilter`]: interpolation used when stretching a source onto the canvas.
//!   Serialized in kebab-case so it can be named in `config.toml`.

use fast_image_resize::{FilterType, ResizeAlg};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Interpolation filter for the stretch resize.
///
/// `Triangle` (bilinear) is the default: it is what a 2D canvas does when
/// asked to draw an image at a different size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeFilter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Mitchell,
    Lanczos3,
}

impl ResizeFilter {
    pub fn resize_alg(self) -> ResizeAlg {
        match self {
            ResizeFilter::Nearest => ResizeAlg::Nearest,
            ResizeFilter::Triangle => ResizeAlg::Convolution(FilterType::Bilinear),
            ResizeFilter::CatmullRom => ResizeAlg::Convolution(FilterType::CatmullRom),
            ResizeFilter::Mitchell => ResizeAlg::Convolution(FilterType::Mitchell),
            ResizeFilter::Lanczos3 => ResizeAlg::Convolution(FilterType::Lanczos3),
        }
    }
}

impl fmt::Display for ResizeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResizeFilter::Nearest => "nearest",
            ResizeFilter::Triangle => "triangle",
            ResizeFilter::CatmullRom => "catmull-rom",
            ResizeFilter::Mitchell => "mitchell",
            ResizeFilter::Lanczos3 => "lanczos3",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_bilinear() {
        assert_eq!(ResizeFilter::default(), ResizeFilter::Triangle);
        assert!(matches!(
            ResizeFilter::default().resize_alg(),
            ResizeAlg::Convolution(FilterType::Bilinear)
        ));
    }

    #[test]
    fn nearest_skips_convolution() {
        assert!(matches!(
            ResizeFilter::Nearest.resize_alg(),
            ResizeAlg::Nearest
        ));
    }

    #[test]
    fn serde_names_match_display() {
        for filter in [
            ResizeFilter::Nearest,
            ResizeFilter::Triangle,
            ResizeFilter::CatmullRom,
            ResizeFilter::Mitchell,
            ResizeFilter::Lanczos3,
        ] {
            let json = serde_json::to_string(&filter).unwrap();
            assert_eq!(json, format!("\"{filter}\""));
        }
    }
}
