//! Containment of untrusted paths under the storage anchor.
//!
//! [`PathSandbox`] is the only place where relative fragments become absolute filesystem
//! paths. Every writer, reader and cleanup step in this crate goes through
//! [`PathSandbox::resolve`], so a fragment that would escape the anchor is rejected before any
//! file is touched.
//!
//! # Resolution rules
//!
//! - Both `/` and `\` are treated as separators, independent of the host platform
//! - Empty fragments, absolute fragments (leading separator or drive prefix) and any `..`
//!   segment are rejected outright, even when the result would land back inside the anchor
//! - `.` and empty segments are dropped
//! - The deepest existing ancestor of the result is canonicalised and re-checked, so a
//!   symlink inside the tree cannot redirect a path outside it

use crate::FilesError;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// The canonical storage anchor and the rules for resolving paths beneath it.
///
/// Construct once at startup and share by reference; the anchor never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSandbox {
    /// Canonicalised absolute root directory
    anchor: PathBuf,
}

impl PathSandbox {
    /// Creates a sandbox rooted at `root`, creating the directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidRootDirectory` if:
    /// - `root` is empty
    /// - `root` exists but is not a directory
    /// - the directory cannot be created or canonicalised
    pub fn new(root: &Path) -> Result<Self, FilesError> {
        if root.as_os_str().is_empty() {
            return Err(FilesError::InvalidRootDirectory(
                "Storage root path is empty".into(),
            ));
        }

        if root.exists() && !root.is_dir() {
            return Err(FilesError::InvalidRootDirectory(format!(
                "Path is not a directory: {}",
                root.display()
            )));
        }

        fs::create_dir_all(root).map_err(|e| {
            FilesError::InvalidRootDirectory(format!(
                "Cannot create directory {}: {}",
                root.display(),
                e
            ))
        })?;

        let anchor = root.canonicalize().map_err(|e| {
            FilesError::InvalidRootDirectory(format!(
                "Cannot canonicalize path {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(Self { anchor })
    }

    /// Returns the canonical anchor directory.
    #[must_use]
    pub fn anchor(&self) -> &Path {
        &self.anchor
    }

    /// Resolves an untrusted relative fragment to an absolute path strictly below the anchor.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::ContainmentViolation` if the fragment is empty, absolute, contains a
    /// `..` segment, or resolves (lexically or through an existing symlink) outside the anchor.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, FilesError> {
        let normalized = normalize_fragment(relative).map_err(|e| {
            tracing::warn!(path = %relative, "rejected path outside storage root");
            e
        })?;

        let resolved = self.anchor.join(normalized);
        self.ensure_within(&resolved, relative)?;
        self.ensure_physically_within(&resolved, relative)?;

        tracing::debug!(path = %relative, resolved = %resolved.display(), "resolved storage path");
        Ok(resolved)
    }

    /// Converts an absolute path below the anchor back to its portable relative form.
    ///
    /// The result always uses `/` as separator.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::ContainmentViolation` if `absolute` is not strictly below the anchor.
    pub fn relativize(&self, absolute: &Path) -> Result<String, FilesError> {
        let relative = absolute.strip_prefix(&self.anchor).map_err(|_| {
            FilesError::ContainmentViolation(absolute.display().to_string())
        })?;

        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => segments.push(part.to_string_lossy().into_owned()),
                _ => {
                    return Err(FilesError::ContainmentViolation(
                        absolute.display().to_string(),
                    ))
                }
            }
        }

        if segments.is_empty() {
            return Err(FilesError::ContainmentViolation(
                absolute.display().to_string(),
            ));
        }

        Ok(segments.join("/"))
    }

    fn ensure_within(&self, path: &Path, original: &str) -> Result<(), FilesError> {
        if path == self.anchor || !path.starts_with(&self.anchor) {
            tracing::warn!(path = %original, "rejected path outside storage root");
            return Err(FilesError::ContainmentViolation(original.to_owned()));
        }
        Ok(())
    }

    /// Canonicalises the deepest existing ancestor of `path` and checks it is still contained.
    fn ensure_physically_within(&self, path: &Path, original: &str) -> Result<(), FilesError> {
        for ancestor in path.ancestors() {
            if ancestor == self.anchor {
                return Ok(());
            }

            if fs::symlink_metadata(ancestor).is_err() {
                continue;
            }

            let canonical = ancestor.canonicalize().map_err(|_| {
                tracing::warn!(path = %original, "storage path cannot be canonicalised");
                FilesError::ContainmentViolation(original.to_owned())
            })?;

            if !canonical.starts_with(&self.anchor) {
                tracing::warn!(
                    path = %original,
                    target = %canonical.display(),
                    "rejected path redirected outside storage root"
                );
                return Err(FilesError::ContainmentViolation(original.to_owned()));
            }
            return Ok(());
        }

        Ok(())
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

fn is_drive_prefix(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Lexically normalises a relative fragment into plain segments.
fn normalize_fragment(relative: &str) -> Result<PathBuf, FilesError> {
    let violation = || FilesError::ContainmentViolation(relative.to_owned());

    if relative.starts_with(is_separator) || Path::new(relative).has_root() {
        return Err(violation());
    }

    let mut normalized = PathBuf::new();
    for (index, segment) in relative.split(is_separator).enumerate() {
        match segment {
            "" | "." => continue,
            ".." => return Err(violation()),
            _ if segment.contains('\0') => return Err(violation()),
            // Drive prefixes such as `C:` make the fragment absolute on Windows.
            _ if index == 0 && is_drive_prefix(segment) => return Err(violation()),
            _ => normalized.push(segment),
        }
    }

    if normalized.as_os_str().is_empty() {
        return Err(violation());
    }

    Ok(normalized)
}
