//! File record types.

use hub_types::{NonEmptyText, ProjectId, RecordId};

/// A file record as held by the metadata store.
///
/// `stored_relative_path` is the authoritative location of the blob, relative to the storage
/// anchor. It is never shown to callers; see [`FileRecordDto`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileRecord {
    /// `None` until the record has been saved
    pub id: Option<RecordId>,
    pub filename: Option<NonEmptyText>,
    pub stored_relative_path: Option<String>,
    pub project_id: Option<ProjectId>,
}

/// The caller-facing view of a file record.
///
/// On output `path` is always the download route. On input a `path` that is a download route
/// is ignored; any other non-blank value is an explicit storage path override.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecordDto {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
}
