//! Project Hub File Storage
//!
//! This crate stores the binary content behind file records inside a single confined
//! directory tree (the *anchor*). Nothing outside the anchor can be read, written or
//! deleted through it, whatever the uploaded filename, project identifier or previously
//! persisted path says.
//!
//! ## Storage Layout
//!
//! ```text
//! <anchor>/
//! ├── project-42/
//! │   └── 1b4e28ba-2fa1-4d3b-9a5e-5c6f0b7f2d11-report.csv
//! └── unassigned/
//!     └── 6f9619ff-8b86-4d01-b42d-00cf4fc964ff-notes.txt
//! ```
//!
//! Records persist the part after `<anchor>/`, always with `/` separators.
//!
//! ## Components
//!
//! - [`PathSandbox`] turns untrusted relative fragments into absolute paths under the anchor
//! - [`sanitize_filename`] / [`stored_name`] produce safe display and on-disk names
//! - [`project_folder`] derives the per-project folder
//! - [`write_blob`] commits a byte stream to a fresh, uniquely named file
//! - [`discard_blob`] is the best-effort removal used after a replace
//! - [`load_blob`] resolves a stored path back to a streamable handle
//! - [`DownloadRoutes`] builds and recognises the public download route
//!
//! ## Example Usage
//!
//! ```no_run
//! use hub_files::{project_folder, sanitize_filename, stored_name, write_blob, PathSandbox};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let sandbox = PathSandbox::new(Path::new("storage"))?;
//! let safe = sanitize_filename(Some("../../etc/report.csv"));
//! let blob = write_blob(&sandbox, &project_folder(None), &stored_name(&safe), &b"a,b\n"[..])?;
//! assert!(blob.relative_path.starts_with("unassigned/"));
//! # Ok(())
//! # }
//! ```

mod cleanup;
mod constants;
mod download;
mod names;
mod route;
mod sandbox;
mod writer;

pub use cleanup::{discard_blob, CleanupOutcome};
pub use constants::{
    DEFAULT_CONTENT_TYPE, DEFAULT_DOWNLOAD_ROUTE_TEMPLATE, FALLBACK_FILENAME, ROUTE_ID_PLACEHOLDER,
    UNASSIGNED_FOLDER_NAME,
};
pub use download::{load_blob, BlobDownload};
pub use names::{project_folder, sanitize_filename, stored_name};
pub use route::DownloadRoutes;
pub use sandbox::PathSandbox;
pub use writer::{write_blob, StoredBlob};

/// Errors that can occur during file operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// A resolved path would land outside the storage anchor
    #[error("Path escapes storage root: {0}")]
    ContainmentViolation(String),

    /// The stored blob (or the path pointing at it) is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// The upload carried no bytes
    #[error("Uploaded content is empty")]
    EmptyUpload,

    /// Root directory could not be created, is not a directory, or cannot be canonicalised
    #[error("Invalid root directory: {0}")]
    InvalidRootDirectory(String),

    /// Download route template is unusable
    #[error("Invalid download route template: {0}")]
    InvalidRouteTemplate(String),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Wraps an I/O error with a description of what was being attempted.
pub(crate) fn io_error(e: std::io::Error, context: impl std::fmt::Display) -> FilesError {
    FilesError::Io(std::io::Error::new(e.kind(), format!("{}: {}", context, e)))
}
