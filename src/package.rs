//! Archive assembly.
//!
//! Renditions are collected in memory by a [`Packager`] and written out as a
//! single ZIP archive by [`Packager::finish`]. Nothing is written until every
//! rendition has been collected, so a failed run never leaves a partial
//! archive behind.
//!
//! ## Layout
//!
//! ```text
//! icons/
//! icons/58x58.png
//! icons/87x87.png
//! ...
//! ```
//!
//! The directory entry comes first, followed by the file entries in
//! insertion order. Every entry carries the same fixed timestamp
//! (1980-01-01 00:00) so identical inputs produce identical archive bytes.
//!
//! ## Directory
//!
//! The directory must be a plain relative path (`icons`, `assets/icons`).
//! Empty, absolute and `.`/`..` segments are refused by [`Packager::new`],
//! so every entry stays under one relative top-level directory however the
//! packager was configured.
//!
//! ## Duplicate Names
//!
//! Two renditions of the same size map to the same entry name. With
//! [`DuplicatePolicy::Overwrite`] the later payload replaces the earlier one
//! and the entry keeps its original position; with
//! [`DuplicatePolicy::Reject`] the insert fails.

use serde::{Deserialize, Serialize};
use std::io::{Cursor, Write};
use std::path::Path;
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

#[derive(Error, Debug)]
pub enum PackagingError {
    #[error("invalid archive directory {0:?}: expected a plain relative path")]
    InvalidDirectory(String),
    #[error("duplicate archive entry: {0}")]
    DuplicateEntry(String),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What to do when an entry name is inserted twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    #[default]
    Overwrite,
    Reject,
}

/// A named payload inside the archive directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    Added,
    Replaced,
}

/// Normalize an archive directory, refusing anything that could escape it.
///
/// A single trailing `/` is dropped; everything else must be non-empty
/// segments other than `.` and `..`, separated by `/`.
pub fn archive_directory(raw: &str) -> Result<String, PackagingError> {
    let dir = raw.strip_suffix('/').unwrap_or(raw);
    let plain = !dir.is_empty()
        && !dir.contains('\\')
        && dir
            .split('/')
            .all(|part| !part.is_empty() && part != "." && part != "..");
    if plain {
        Ok(dir.to_string())
    } else {
        Err(PackagingError::InvalidDirectory(raw.to_string()))
    }
}

/// Collects entries and writes the final archive.
#[derive(Debug)]
pub struct Packager {
    directory: String,
    policy: DuplicatePolicy,
    entries: Vec<ArchiveEntry>,
    replaced: usize,
}

impl Packager {
    pub fn new(directory: &str, policy: DuplicatePolicy) -> Result<Self, PackagingError> {
        Ok(Self {
            directory: archive_directory(directory)?,
            policy,
            entries: Vec::new(),
            replaced: 0,
        })
    }

    pub fn insert(&mut self, name: String, payload: Vec<u8>) -> Result<Insertion, PackagingError> {
        match self.entries.iter().position(|e| e.name == name) {
            Some(_) if self.policy == DuplicatePolicy::Reject => {
                Err(PackagingError::DuplicateEntry(self.entry_path(&name)))
            }
            Some(index) => {
                log::debug!("replacing duplicate entry {name}");
                self.entries[index].payload = payload;
                self.replaced += 1;
                Ok(Insertion::Replaced)
            }
            None => {
                self.entries.push(ArchiveEntry { name, payload });
                Ok(Insertion::Added)
            }
        }
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Full path of `name` inside the archive.
    pub fn entry_path(&self, name: &str) -> String {
        format!("{}/{}", self.directory, name)
    }

    /// Write every collected entry into a ZIP archive.
    pub fn finish(self) -> Result<OutputArchive, PackagingError> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.add_directory(format!("{}/", self.directory), options)?;

        let mut paths = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let path = self.entry_path(&entry.name);
            zip.start_file(path.clone(), options)?;
            zip.write_all(&entry.payload)?;
            paths.push(path);
        }

        let bytes = zip.finish()?.into_inner();
        log::info!(
            "packaged {} entries into {} bytes",
            paths.len(),
            bytes.len()
        );
        Ok(OutputArchive {
            bytes,
            entries: paths,
            replaced: self.replaced,
        })
    }
}

/// A finished archive, ready to hand to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArchive {
    bytes: Vec<u8>,
    entries: Vec<String>,
    replaced: usize,
}

impl OutputArchive {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Full paths of the file entries, in archive order.
    pub fn entry_names(&self) -> &[String] {
        &self.entries
    }

    /// Renditions that replaced an earlier entry of the same name.
    pub fn replaced(&self) -> usize {
        self.replaced
    }

    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        std::fs::write(path, &self.bytes)
    }
}
