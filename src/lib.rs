//! # Iconpack
//!
//! Generates the icon set an iMessage app extension needs from one or two
//! source images and delivers it as a single ZIP archive.
//!
//! # Architecture: Decode, Render, Package
//!
//! ```text
//! primary bytes    ─┐                 square catalog (4 sizes)
//!                   ├─▶ decode ─▶ render ─────────────────────────▶ icons.zip
//! secondary bytes  ─┘                 rectangular catalog (9 sizes)    └── icons/
//! ```
//!
//! Every size is produced by stretching the entire source onto the entire
//! target canvas. Nothing is cropped or letterboxed, so a source whose aspect
//! ratio differs from the target is distorted. This is intentional: designers
//! hand in artwork at the reference ratio (1024x1024 and 1024x768) and expect
//! each size to be a plain scale of it.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | `Dimension` and the two reference size catalogs |
//! | [`imaging`] | Decoding, stretch-resizing and PNG encoding behind the `RenderBackend` trait |
//! | [`package`] | In-memory ZIP assembly with a fixed directory and deterministic timestamps |
//! | [`pipeline`] | Runs both catalogs against the decoded sources and emits progress events |
//! | [`config`] | `iconpack.toml` loading, validation and merging over stock defaults |
//! | [`output`] | CLI output formatting for progress events and catalog listings |
//!
//! # Design Decisions
//!
//! ## Whole Archive or Nothing
//!
//! The archive is assembled in memory and only handed back once every
//! rendition succeeded. A failure anywhere aborts the run without producing
//! bytes, so the CLI never leaves a truncated `icons.zip` on disk.
//!
//! ## Duplicate Sizes
//!
//! The square catalog lists 58x58 twice. Both renditions are produced, but
//! they share an entry name, so by default the second replaces the first and
//! the archive holds 12 files. Setting `archive.duplicates = "reject"` turns
//! this into an error instead. See [`package::DuplicatePolicy`].
//!
//! ## Reproducible Output
//!
//! Identical inputs and config produce byte-identical archives: entries are
//! written in catalog order with a fixed timestamp, and parallel rendering
//! collects results back into catalog order before packaging.

pub mod catalog;
pub mod config;
pub mod imaging;
pub mod output;
pub mod package;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod test_helpers;
