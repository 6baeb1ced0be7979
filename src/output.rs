//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Generate
//!
//! ```text
//! Primary: 1024x1024 source
//! Secondary: 1024x1024 source (reused from primary)
//! Square catalog (4 sizes) ← primary
//!     001 58x58 → icons/58x58.png (1234 bytes)
//!     002 87x87 → icons/87x87.png (2345 bytes)
//!     003 1024x1024 → icons/1024x1024.png (98765 bytes)
//!     004 58x58 → icons/58x58.png (1234 bytes, replaced)
//! Rectangular catalog (9 sizes) ← secondary
//!     001 120x90 → icons/120x90.png (3456 bytes)
//!     ...
//! Packaged 12 entries (123456 bytes)
//! ```
//!
//! ## Catalog
//!
//! ```text
//! Square (4 sizes, 3 unique)
//!     001 58x58
//!     ...
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::catalog::{CatalogRole, Catalogs, SizeCatalog};
use crate::pipeline::PipelineEvent;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn catalog_title(role: CatalogRole) -> &'static str {
    match role {
        CatalogRole::Square => "Square",
        CatalogRole::Rectangular => "Rectangular",
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Generate output
// ============================================================================

/// Format a single pipeline event as display lines.
pub fn format_pipeline_event(event: &PipelineEvent) -> Vec<String> {
    match event {
        PipelineEvent::SourceDecoded {
            input,
            width,
            height,
            substituted,
        } => {
            let mut line = format!("{}: {}x{} source", capitalize(&input.to_string()), width, height);
            if *substituted {
                line.push_str(" (reused from primary)");
            }
            vec![line]
        }
        PipelineEvent::CatalogStarted { role, input, count } => vec![format!(
            "{} catalog ({}) \u{2190} {}",
            catalog_title(*role),
            plural(*count, "size"),
            input
        )],
        PipelineEvent::RenditionAdded {
            index,
            dimension,
            entry,
            bytes,
            replaced,
            ..
        } => {
            let detail = if *replaced {
                format!("{bytes} bytes, replaced")
            } else {
                format!("{bytes} bytes")
            };
            vec![format!(
                "{}{} {} \u{2192} {} ({})",
                indent(1),
                format_index(*index),
                dimension,
                entry,
                detail
            )]
        }
        PipelineEvent::Packaged { entries, bytes } => {
            let noun = if *entries == 1 { "entry" } else { "entries" };
            vec![format!("Packaged {entries} {noun} ({bytes} bytes)")]
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ============================================================================
// Catalog output
// ============================================================================

fn format_catalog(catalog: &SizeCatalog) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({}, {} unique)",
        catalog_title(catalog.role()),
        plural(catalog.len(), "size"),
        catalog.unique_len()
    )];
    for (i, d) in catalog.dimensions().iter().enumerate() {
        lines.push(format!("{}{} {}", indent(1), format_index(i + 1), d));
    }
    lines
}

/// Format both catalogs, square first.
pub fn format_catalogs(catalogs: &Catalogs) -> Vec<String> {
    let mut lines = format_catalog(&catalogs.square);
    lines.push(String::new());
    lines.extend(format_catalog(&catalogs.rectangular));
    lines
}

pub fn print_catalogs(catalogs: &Catalogs) {
    for line in format_catalogs(catalogs) {
        println!("{}", line);
    }
}
