//! Configuration module.
//!
//! Handles loading, validating, and merging an optional `iconpack.toml`.
//! Stock defaults describe the reference iMessage icon set; a user file
//! overrides only the keys it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [catalog]
//! square = ["58x58", "87x87", "1024x1024", "58x58"]
//! rectangular = ["120x90", "180x135", "134x100", "148x110", "54x40",
//!                "81x60", "64x48", "96x72", "1024x768"]
//!
//! [archive]
//! directory = "icons"       # Top-level directory inside the zip
//! file_name = "icons.zip"   # Default output path
//! duplicates = "overwrite"  # "overwrite" or "reject"
//!
//! [render]
//! filter = "triangle"       # nearest | triangle | catmull-rom | mitchell | lanczos3
//!
//! [processing]
//! threads = 1               # 1 = sequential, 0 = all cores
//! ```
//!
//! Arrays replace the stock value wholesale; tables merge key by key.
//! Unknown keys are rejected to catch typos early.

use crate::catalog::{Catalogs, Dimension, RECTANGULAR_SIZES, SQUARE_SIZES};
use crate::imaging::backend::MAX_SURFACE_SIDE;
use crate::imaging::{ResizeFilter, Surface};
use crate::package::{DuplicatePolicy, archive_directory};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IconConfig {
    /// Target sizes per source image.
    pub catalog: CatalogConfig,
    /// Archive layout and duplicate handling.
    pub archive: ArchiveConfig,
    /// Resize settings.
    pub render: RenderConfig,
    /// Parallel rendering settings.
    pub processing: ProcessingConfig,
}

impl IconConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, sizes) in [
            ("catalog.square", &self.catalog.square),
            ("catalog.rectangular", &self.catalog.rectangular),
        ] {
            if sizes.is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
            if let Some(bad) = sizes.iter().find(|d| !d.is_renderable()) {
                return Err(ConfigError::Validation(format!(
                    "{key} contains {bad}: width and height must be positive"
                )));
            }
            if let Some(bad) = sizes.iter().find(|d| !Surface::fits(**d)) {
                return Err(ConfigError::Validation(format!(
                    "{key} contains {bad}: width and height must not exceed {MAX_SURFACE_SIDE}"
                )));
            }
        }

        archive_directory(&self.archive.directory).map_err(|e| {
            ConfigError::Validation(format!("archive.directory: {e}"))
        })?;
        if self.archive.file_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "archive.file_name must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn catalogs(&self) -> Catalogs {
        Catalogs::new(
            self.catalog.square.clone(),
            self.catalog.rectangular.clone(),
        )
    }
}

/// Catalog overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Sizes rendered from the primary image.
    pub square: Vec<Dimension>,
    /// Sizes rendered from the secondary image (or the primary when absent).
    pub rectangular: Vec<Dimension>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            square: SQUARE_SIZES.to_vec(),
            rectangular: RECTANGULAR_SIZES.to_vec(),
        }
    }
}

/// Archive layout settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveConfig {
    /// Directory inside the archive that holds every rendition.
    pub directory: String,
    /// Output path used when none is given on the command line.
    pub file_name: String,
    /// Handling of renditions that share an entry name.
    pub duplicates: DuplicatePolicy,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            directory: "icons".to_string(),
            file_name: "icons.zip".to_string(),
            duplicates: DuplicatePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub filter: ResizeFilter,
}

/// Parallel rendering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Render workers. `1` renders sequentially on the calling thread,
    /// `0` uses every core, larger values are clamped to the core count.
    pub threads: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self { threads: 1 }
    }
}

/// Resolve the effective worker count from config.
///
/// - `0` → use all available cores
/// - `n` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    match config.threads {
        0 => cores,
        n => n.min(cores),
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(IconConfig::default())
        .map_err(|e| ConfigError::Validation(format!("cannot serialize defaults: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay (including arrays) replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<IconConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: IconConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a TOML file, or the stock defaults when `path` is `None`.
///
/// A path that is given but missing is an error.
pub fn load_config(path: Option<&Path>) -> Result<IconConfig, ConfigError> {
    let overlay = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Some(toml::from_str::<toml::Value>(&content)?)
        }
        None => None,
    };
    resolve_config(overlay)
}

/// Returns a fully-commented stock `iconpack.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# iconpack Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Catalogs
# ---------------------------------------------------------------------------
[catalog]
# Sizes rendered from the primary image, as "<width>x<height>".
# 58x58 appears twice in the reference icon set.
square = ["58x58", "87x87", "1024x1024", "58x58"]

# Sizes rendered from the secondary image (the primary is reused when no
# secondary image is given).
rectangular = [
    "120x90",
    "180x135",
    "134x100",
    "148x110",
    "54x40",
    "81x60",
    "64x48",
    "96x72",
    "1024x768",
]

# ---------------------------------------------------------------------------
# Archive
# ---------------------------------------------------------------------------
[archive]
# Directory inside the zip that holds every PNG.
directory = "icons"

# Output path used when --out is not given.
file_name = "icons.zip"

# What to do when two sizes produce the same file name:
#   "overwrite" - keep one entry, holding the later rendition
#   "reject"    - fail the run
duplicates = "overwrite"

# ---------------------------------------------------------------------------
# Rendering
# ---------------------------------------------------------------------------
[render]
# Resize filter: "nearest", "triangle", "catmull-rom", "mitchell", "lanczos3".
filter = "triangle"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Render workers. 1 = sequential, 0 = all CPU cores.
threads = 1
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // =========================================================================
    // Defaults
    // =========================================================================

    #[test]
    fn default_config_matches_reference_catalogs() {
        let config = IconConfig::default();
        assert_eq!(config.catalogs(), Catalogs::default());
        assert_eq!(config.archive.directory, "icons");
        assert_eq!(config.archive.file_name, "icons.zip");
        assert_eq!(config.archive.duplicates, DuplicatePolicy::Overwrite);
        assert_eq!(config.render.filter, ResizeFilter::Triangle);
        assert_eq!(config.processing.threads, 1);
    }

    #[test]
    fn validate_default_config_passes() {
        assert!(IconConfig::default().validate().is_ok());
    }

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let config: IconConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, IconConfig::default());
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_without_path_returns_defaults() {
        assert_eq!(load_config(None).unwrap(), IconConfig::default());
    }

    #[test]
    fn load_config_reads_partial_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("iconpack.toml");
        fs::write(
            &path,
            r#"
[catalog]
square = ["16x16", "32x32"]

[render]
filter = "lanczos3"
"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(
            config.catalog.square,
            vec![Dimension::new(16, 16), Dimension::new(32, 32)]
        );
        assert_eq!(config.render.filter, ResizeFilter::Lanczos3);
        // Unspecified values keep their defaults
        assert_eq!(config.catalog.rectangular, RECTANGULAR_SIZES.to_vec());
        assert_eq!(config.archive.directory, "icons");
    }

    #[test]
    fn load_config_missing_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_config(Some(&tmp.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("iconpack.toml");
        fs::write(&path, "[archive\ndirectory = ").unwrap();
        assert!(matches!(
            load_config(Some(&path)),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn malformed_dimension_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("iconpack.toml");
        fs::write(&path, "[catalog]\nsquare = [\"58 by 58\"]\n").unwrap();
        assert!(matches!(
            load_config(Some(&path)),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn parse_duplicate_policy() {
        let config = resolve_config(Some(
            toml::from_str("[archive]\nduplicates = \"reject\"").unwrap(),
        ))
        .unwrap();
        assert_eq!(config.archive.duplicates, DuplicatePolicy::Reject);
    }

    // =========================================================================
    // Unknown keys
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let result = resolve_config(Some(toml::from_str("[archive]\nformat = \"tar\"").unwrap()));
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_section_rejected() {
        let result = resolve_config(Some(toml::from_str("[colors]\nbg = \"#fff\"").unwrap()));
        assert!(result.is_err());
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("threads = 1").unwrap();
        let overlay: toml::Value = toml::from_str("threads = 4").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("threads").unwrap().as_integer(), Some(4));
    }

    #[test]
    fn merge_toml_array_replaces() {
        let base: toml::Value = toml::from_str(r#"square = ["58x58", "87x87"]"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"square = ["16x16"]"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("square").unwrap().as_array().unwrap().len(), 1);
    }

    #[test]
    fn merge_toml_preserves_base_keys() {
        let base: toml::Value =
            toml::from_str("[archive]\ndirectory = \"icons\"\nfile_name = \"icons.zip\"").unwrap();
        let overlay: toml::Value = toml::from_str("[archive]\ndirectory = \"out\"").unwrap();
        let merged = merge_toml(base, overlay);
        let archive = merged.get("archive").unwrap();
        assert_eq!(archive.get("directory").unwrap().as_str(), Some("out"));
        assert_eq!(archive.get("file_name").unwrap().as_str(), Some("icons.zip"));
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_empty_catalog() {
        let mut config = IconConfig::default();
        config.catalog.rectangular.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("catalog.rectangular"));
    }

    #[test]
    fn validate_zero_dimension() {
        let mut config = IconConfig::default();
        config.catalog.square.push(Dimension::new(0, 58));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("0x58"));
    }

    #[test]
    fn validate_oversized_dimension() {
        let mut config = IconConfig::default();
        config.catalog.rectangular.push(Dimension::new(100_000, 100_000));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("100000x100000"));
    }

    #[test]
    fn validate_archive_directory() {
        for bad in ["", "/", "/abs", "../up", "a/../b", "a//b", "./icons"] {
            let mut config = IconConfig::default();
            config.archive.directory = bad.to_string();
            assert!(config.validate().is_err(), "{bad:?} should be rejected");
        }
        for good in ["icons", "icons/", "assets/icons"] {
            let mut config = IconConfig::default();
            config.archive.directory = good.to_string();
            assert!(config.validate().is_ok(), "{good:?} should be accepted");
        }
    }

    #[test]
    fn validate_file_name() {
        let mut config = IconConfig::default();
        config.archive.file_name = "  ".into();
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // Processing tests
    // =========================================================================

    #[test]
    fn effective_threads_auto() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&ProcessingConfig { threads: 0 }), cores);
        assert_eq!(effective_threads(&ProcessingConfig { threads: 99999 }), cores);
    }

    #[test]
    fn effective_threads_default_is_sequential() {
        assert_eq!(effective_threads(&ProcessingConfig::default()), 1);
    }
}
