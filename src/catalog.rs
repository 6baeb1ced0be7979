//! Target dimensions for the icon set.
//!
//! Two ordered catalogs drive the pipeline:
//!
//! | Catalog | Source image | Sizes |
//! |---|---|---|
//! | **square** | primary | 58×58, 87×87, 1024×1024, 58×58 |
//! | **rectangular** | secondary (or primary) | 120×90 … 1024×768 |
//!
//! The square catalog lists 58×58 twice. That is how the reference icon set
//! is defined; what happens to the colliding archive entry is decided by
//! [`DuplicatePolicy`](crate::package::DuplicatePolicy), not here.
//!
//! Catalog order is the render order and the archive order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DimensionParseError {
    #[error("expected `<width>x<height>`, got {0:?}")]
    Format(String),
    #[error("invalid {axis} in {token:?}: must be a non-negative integer")]
    Component { axis: &'static str, token: String },
}

/// A pixel size, written `"<width>x<height>"`.
///
/// Zero components parse and construct fine so that a catalog can carry
/// them; the renderer rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Dimension {
    pub width: u32,
    pub height: u32,
}

impl Dimension {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Both components are non-zero.
    pub fn is_renderable(self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Archive file name for a rendition of this size, e.g. `58x58.png`.
    pub fn entry_name(self) -> String {
        format!("{self}.png")
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Dimension {
    type Err = DimensionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        let (w, h) = token
            .split_once('x')
            .ok_or_else(|| DimensionParseError::Format(token.to_string()))?;
        let component = |raw: &str, axis: &'static str| {
            // `u32::from_str` accepts a leading `+`; the token format does not.
            if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
                return Err(DimensionParseError::Component {
                    axis,
                    token: token.to_string(),
                });
            }
            raw.parse::<u32>()
                .map_err(|_| DimensionParseError::Component {
                    axis,
                    token: token.to_string(),
                })
        };
        Ok(Self {
            width: component(w, "width")?,
            height: component(h, "height")?,
        })
    }
}

impl TryFrom<String> for Dimension {
    type Error = DimensionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Dimension> for String {
    fn from(value: Dimension) -> Self {
        value.to_string()
    }
}

/// Sizes rendered from the primary image.
pub const SQUARE_SIZES: &[Dimension] = &[
    Dimension::new(58, 58),
    Dimension::new(87, 87),
    Dimension::new(1024, 1024),
    Dimension::new(58, 58),
];

/// Sizes rendered from the secondary image.
pub const RECTANGULAR_SIZES: &[Dimension] = &[
    Dimension::new(120, 90),
    Dimension::new(180, 135),
    Dimension::new(134, 100),
    Dimension::new(148, 110),
    Dimension::new(54, 40),
    Dimension::new(81, 60),
    Dimension::new(64, 48),
    Dimension::new(96, 72),
    Dimension::new(1024, 768),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogRole {
    Square,
    Rectangular,
}

impl fmt::Display for CatalogRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogRole::Square => f.write_str("square"),
            CatalogRole::Rectangular => f.write_str("rectangular"),
        }
    }
}

/// An ordered list of target sizes for one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SizeCatalog {
    role: CatalogRole,
    dimensions: Vec<Dimension>,
}

impl SizeCatalog {
    pub fn new(role: CatalogRole, dimensions: impl Into<Vec<Dimension>>) -> Self {
        Self {
            role,
            dimensions: dimensions.into(),
        }
    }

    pub fn square() -> Self {
        Self::new(CatalogRole::Square, SQUARE_SIZES)
    }

    pub fn rectangular() -> Self {
        Self::new(CatalogRole::Rectangular, RECTANGULAR_SIZES)
    }

    pub fn role(&self) -> CatalogRole {
        self.role
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Number of distinct entry names this catalog produces.
    pub fn unique_len(&self) -> usize {
        let mut seen: Vec<Dimension> = Vec::with_capacity(self.dimensions.len());
        for d in &self.dimensions {
            if !seen.contains(d) {
                seen.push(*d);
            }
        }
        seen.len()
    }
}

/// The pair of catalogs a pipeline run renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalogs {
    pub square: SizeCatalog,
    pub rectangular: SizeCatalog,
}

impl Catalogs {
    pub fn new(square: Vec<Dimension>, rectangular: Vec<Dimension>) -> Self {
        Self {
            square: SizeCatalog::new(CatalogRole::Square, square),
            rectangular: SizeCatalog::new(CatalogRole::Rectangular, rectangular),
        }
    }

    /// Total renditions across both catalogs, duplicates included.
    pub fn rendition_count(&self) -> usize {
        self.square.len() + self.rectangular.len()
    }
}

impl Default for Catalogs {
    fn default() -> Self {
        Self {
            square: SizeCatalog::square(),
            rectangular: SizeCatalog::rectangular(),
        }
    }
}
