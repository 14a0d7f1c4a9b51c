//! Constants used throughout the file storage crate.

/// Folder for records that are not associated with a project.
pub const UNASSIGNED_FOLDER_NAME: &str = "unassigned";

/// Prefix of per-project folders; the project id follows directly.
pub const PROJECT_FOLDER_PREFIX: &str = "project-";

/// Display name used when the caller supplies no usable filename.
pub const FALLBACK_FILENAME: &str = "file";

/// Media type reported when content sniffing and extension lookup both fail.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Placeholder substituted with the record id in download route templates.
pub const ROUTE_ID_PLACEHOLDER: &str = "{id}";

/// Download route template used when none is configured.
pub const DEFAULT_DOWNLOAD_ROUTE_TEMPLATE: &str = "/api/files/{id}/download";

/// Prefix of staging files written next to their final location.
pub(crate) const STAGING_FILE_PREFIX: &str = ".upload-";

/// Upper bound on the byte length of a sanitised filename.
///
/// Leaves room for the 37-byte random prefix within the common 255-byte name limit.
pub(crate) const MAX_FILENAME_BYTES: usize = 200;

/// Number of leading bytes inspected when sniffing a blob's media type.
pub(crate) const SNIFF_LEN: u64 = 8192;
