//! Render-and-package pipeline.
//!
//! Turns one or two raw source images into a finished icon archive:
//!
//! ```text
//! primary bytes   ──decode──▶ SourceImage ──square catalog──────▶ ┐
//!                                                                 ├─▶ Packager ─▶ OutputArchive
//! secondary bytes ──decode──▶ SourceImage ──rectangular catalog─▶ ┘
//! (or primary)
//! ```
//!
//! ## Substitution
//!
//! When no secondary image is given the primary bytes are decoded a second
//! time and used for the rectangular catalog. The two decodes are independent;
//! nothing mutable is shared between the passes.
//!
//! ## Ordering
//!
//! The square catalog is rendered fully, then the rectangular catalog. Each
//! pass owns one [`Surface`] that is reused for every size and dropped when
//! the pass ends. With `threads > 1` each worker gets its own surface and
//! results are collected in catalog order, so the archive is identical to a
//! sequential run.
//!
//! ## Failure
//!
//! Any decode, render or packaging error aborts the run. The archive is only
//! assembled after every rendition succeeded, so callers never see a partial
//! archive.

use crate::catalog::{CatalogRole, Catalogs, Dimension, SizeCatalog};
use crate::config::{IconConfig, effective_threads};
use crate::imaging::{
    DecodeError, RenderBackend, RenderError, RenderedAsset, RustBackend, SourceImage, Surface,
};
use crate::package::{DuplicatePolicy, Insertion, OutputArchive, Packager, PackagingError};
use rayon::prelude::*;
use std::fmt;
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("failed to decode {input} image: {source}")]
    Decode {
        input: InputRole,
        #[source]
        source: DecodeError,
    },
    #[error("failed to render {role} catalog: {source}")]
    Render {
        role: CatalogRole,
        #[source]
        source: RenderError,
    },
    #[error("packaging failed: {0}")]
    Packaging(#[from] PackagingError),
    #[error("cannot start render workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Which caller-supplied image a source came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRole {
    Primary,
    Secondary,
}

impl fmt::Display for InputRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputRole::Primary => f.write_str("primary"),
            InputRole::Secondary => f.write_str("secondary"),
        }
    }
}

/// Progress reported while a run executes.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    SourceDecoded {
        input: InputRole,
        width: u32,
        height: u32,
        /// The primary bytes stood in for a missing secondary image.
        substituted: bool,
    },
    CatalogStarted {
        role: CatalogRole,
        input: InputRole,
        count: usize,
    },
    RenditionAdded {
        role: CatalogRole,
        /// 1-based position within the catalog.
        index: usize,
        dimension: Dimension,
        /// Path inside the archive.
        entry: String,
        bytes: usize,
        replaced: bool,
    },
    Packaged {
        entries: usize,
        bytes: usize,
    },
}

/// Everything a run needs besides the input bytes and the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOptions {
    pub catalogs: Catalogs,
    pub directory: String,
    pub duplicates: DuplicatePolicy,
    /// Render workers; `1` renders on the calling thread.
    pub threads: usize,
}

impl GenerateOptions {
    pub fn from_config(config: &IconConfig) -> Self {
        Self {
            catalogs: config.catalogs(),
            directory: config.archive.directory.clone(),
            duplicates: config.archive.duplicates,
            threads: effective_threads(&config.processing),
        }
    }
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self::from_config(&IconConfig::default())
    }
}

/// Run the pipeline with the `image`-crate backend.
pub fn generate(
    primary: &[u8],
    secondary: Option<&[u8]>,
    config: &IconConfig,
    events: Option<Sender<PipelineEvent>>,
) -> Result<OutputArchive, PipelineError> {
    let backend = RustBackend::with_filter(config.render.filter);
    generate_with_backend(
        &backend,
        primary,
        secondary,
        &GenerateOptions::from_config(config),
        events,
    )
}

/// Run the pipeline using a specific backend (allows testing with mock).
pub fn generate_with_backend(
    backend: &impl RenderBackend,
    primary: &[u8],
    secondary: Option<&[u8]>,
    options: &GenerateOptions,
    events: Option<Sender<PipelineEvent>>,
) -> Result<OutputArchive, PipelineError> {
    let emit = |event: PipelineEvent| {
        if let Some(tx) = &events {
            tx.send(event).ok();
        }
    };

    let mut packager = Packager::new(&options.directory, options.duplicates)?;

    let substituted = secondary.is_none();
    let secondary = secondary.unwrap_or(primary);
    log::info!(
        "generating {} renditions (secondary image {})",
        options.catalogs.rendition_count(),
        if substituted { "reused from primary" } else { "supplied" }
    );

    let primary_source = decode_input(backend, primary, InputRole::Primary)?;
    emit(decoded_event(&primary_source, InputRole::Primary, false));
    let secondary_source = decode_input(backend, secondary, InputRole::Secondary)?;
    emit(decoded_event(&secondary_source, InputRole::Secondary, substituted));

    let pool = if options.threads > 1 {
        Some(
            rayon::ThreadPoolBuilder::new()
                .num_threads(options.threads)
                .build()?,
        )
    } else {
        None
    };

    let passes = [
        (&primary_source, InputRole::Primary, &options.catalogs.square),
        (
            &secondary_source,
            InputRole::Secondary,
            &options.catalogs.rectangular,
        ),
    ];

    for (source, input, catalog) in passes {
        emit(PipelineEvent::CatalogStarted {
            role: catalog.role(),
            input,
            count: catalog.len(),
        });

        let assets = match &pool {
            Some(pool) => render_parallel(pool, backend, source, catalog),
            None => render_sequential(backend, source, catalog),
        }
        .map_err(|source| PipelineError::Render {
            role: catalog.role(),
            source,
        })?;

        for (i, asset) in assets.into_iter().enumerate() {
            let name = asset.dimension.entry_name();
            let entry = packager.entry_path(&name);
            let bytes = asset.png.len();
            let insertion = packager.insert(name, asset.png)?;
            emit(PipelineEvent::RenditionAdded {
                role: catalog.role(),
                index: i + 1,
                dimension: asset.dimension,
                entry,
                bytes,
                replaced: insertion == Insertion::Replaced,
            });
        }
    }

    let archive = packager.finish()?;
    emit(PipelineEvent::Packaged {
        entries: archive.entry_names().len(),
        bytes: archive.as_bytes().len(),
    });
    Ok(archive)
}

fn decode_input(
    backend: &impl RenderBackend,
    bytes: &[u8],
    input: InputRole,
) -> Result<SourceImage, PipelineError> {
    backend
        .decode(bytes)
        .map_err(|source| PipelineError::Decode { input, source })
}

fn decoded_event(source: &SourceImage, input: InputRole, substituted: bool) -> PipelineEvent {
    PipelineEvent::SourceDecoded {
        input,
        width: source.width(),
        height: source.height(),
        substituted,
    }
}

/// Render a catalog on the calling thread with one reused surface.
fn render_sequential<B: RenderBackend + ?Sized>(
    backend: &B,
    source: &SourceImage,
    catalog: &SizeCatalog,
) -> Result<Vec<RenderedAsset>, RenderError> {
    let mut surface = Surface::new();
    catalog
        .dimensions()
        .iter()
        .map(|&target| backend.render_at(&mut surface, source, target))
        .collect()
}

/// Render a catalog on the pool, one surface per worker, results in catalog order.
fn render_parallel<B: RenderBackend + ?Sized>(
    pool: &rayon::ThreadPool,
    backend: &B,
    source: &SourceImage,
    catalog: &SizeCatalog,
) -> Result<Vec<RenderedAsset>, RenderError> {
    pool.install(|| {
        catalog
            .dimensions()
            .par_iter()
            .map_init(Surface::new, |surface, &target| {
                backend.render_at(surface, source, target)
            })
            .collect()
    })
}
