//! Display names, on-disk names and project folders.

use crate::constants::{
    FALLBACK_FILENAME, MAX_FILENAME_BYTES, PROJECT_FOLDER_PREFIX, UNASSIGNED_FOLDER_NAME,
};
use hub_types::{NonEmptyText, ProjectId};
use uuid::Uuid;

/// Reduces a caller-supplied filename to a safe base name.
///
/// Only the final segment survives (both `/` and `\` count as separators), control
/// characters are removed, and the result is trimmed and capped at a filesystem-safe length.
/// Missing, empty, `.` and `..` names fall back to [`FALLBACK_FILENAME`].
///
/// ```
/// use hub_files::sanitize_filename;
///
/// assert_eq!(sanitize_filename(Some("../../etc/passwd")).as_str(), "passwd");
/// assert_eq!(sanitize_filename(None).as_str(), "file");
/// ```
pub fn sanitize_filename(original: Option<&str>) -> NonEmptyText {
    let last_segment = original
        .unwrap_or_default()
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    let cleaned: String = last_segment.chars().filter(|c| !c.is_control()).collect();
    let cleaned = truncate_to_boundary(cleaned.trim(), MAX_FILENAME_BYTES);

    match cleaned {
        "" | "." | ".." => fallback(),
        name => NonEmptyText::new(name).unwrap_or_else(|_| fallback()),
    }
}

/// Builds the on-disk name for a sanitised base name.
///
/// A fresh v4 UUID is prepended on every call, so identical uploads never share a file and
/// the stored name cannot be predicted from the display name.
#[must_use]
pub fn stored_name(safe_name: &NonEmptyText) -> String {
    format!("{}-{}", Uuid::new_v4(), safe_name)
}

/// Returns the storage folder for an optional project association.
///
/// ```
/// use hub_files::project_folder;
/// use hub_types::ProjectId;
///
/// assert_eq!(project_folder(Some(ProjectId::new(42))), "project-42");
/// assert_eq!(project_folder(None), "unassigned");
/// ```
#[must_use]
pub fn project_folder(project_id: Option<ProjectId>) -> String {
    match project_id {
        Some(id) => format!("{}{}", PROJECT_FOLDER_PREFIX, id),
        None => UNASSIGNED_FOLDER_NAME.to_owned(),
    }
}

fn fallback() -> NonEmptyText {
    NonEmptyText::new(FALLBACK_FILENAME).expect("fallback filename is non-empty")
}

fn truncate_to_boundary(name: &str, max_bytes: usize) -> &str {
    if name.len() <= max_bytes {
        return name;
    }
    let mut end = max_bytes;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].trim_end()
}
