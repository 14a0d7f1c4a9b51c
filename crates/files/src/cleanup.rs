//! Best-effort removal of superseded blobs.

use crate::PathSandbox;
use std::fs;
use std::io::ErrorKind;

/// What happened when a superseded blob was discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// The blob was deleted
    Removed,

    /// There was no stored path, or no file at it
    NothingToRemove,

    /// Deletion was not possible; the reason has already been logged
    Skipped(String),
}

/// Deletes the blob at `relative_path`, never failing.
///
/// The path is resolved through the sandbox like any other. Paths the sandbox rejects and I/O
/// errors during deletion are logged at `warn` and reported as [`CleanupOutcome::Skipped`];
/// callers whose main work has already succeeded should not fail because of them.
pub fn discard_blob(sandbox: &PathSandbox, relative_path: Option<&str>) -> CleanupOutcome {
    let Some(relative_path) = relative_path.map(str::trim).filter(|p| !p.is_empty()) else {
        return CleanupOutcome::NothingToRemove;
    };

    let path = match sandbox.resolve(relative_path) {
        Ok(path) => path,
        Err(e) => {
            tracing::warn!(
                path = %relative_path,
                error = %e,
                "skipping cleanup of invalid stored path"
            );
            return CleanupOutcome::Skipped(e.to_string());
        }
    };

    match fs::remove_file(&path) {
        Ok(()) => {
            tracing::debug!(path = %relative_path, "removed superseded blob");
            CleanupOutcome::Removed
        }
        Err(e) if e.kind() == ErrorKind::NotFound => CleanupOutcome::NothingToRemove,
        Err(e) => {
            tracing::warn!(path = %relative_path, error = %e, "failed to remove superseded blob");
            CleanupOutcome::Skipped(e.to_string())
        }
    }
}
