//! Constants used throughout the hub core crate.

/// Default storage directory when no explicit directory is configured.
pub const DEFAULT_STORAGE_DIR: &str = "storage";

/// Environment variable naming the storage directory.
pub const STORAGE_DIR_ENV: &str = "HUB_STORAGE_DIR";

/// Environment variable naming the download route template.
pub const DOWNLOAD_ROUTE_TEMPLATE_ENV: &str = "HUB_DOWNLOAD_ROUTE_TEMPLATE";

/// Environment variable listing project ids to register at startup, comma-separated.
pub const PROJECT_IDS_ENV: &str = "HUB_PROJECT_IDS";
