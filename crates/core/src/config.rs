//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. The storage anchor is canonicalised here, once, and never read
//! from the environment during request handling.

use crate::constants::DEFAULT_STORAGE_DIR;
use crate::FileServiceResult;
use hub_files::{DownloadRoutes, PathSandbox, DEFAULT_DOWNLOAD_ROUTE_TEMPLATE};
use hub_types::{ProjectId, TextError};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    sandbox: PathSandbox,
    routes: DownloadRoutes,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// The storage directory is created if missing and canonicalised; the route template must
    /// contain exactly one `{id}` placeholder.
    pub fn new(storage_dir: &Path, download_route_template: &str) -> FileServiceResult<Self> {
        let sandbox = PathSandbox::new(storage_dir)?;
        let routes = DownloadRoutes::new(download_route_template)?;

        tracing::info!(
            storage_dir = %sandbox.anchor().display(),
            route_template = %download_route_template,
            "storage configured"
        );

        Ok(Self { sandbox, routes })
    }

    /// Canonical storage anchor.
    pub fn sandbox(&self) -> &PathSandbox {
        &self.sandbox
    }

    pub fn routes(&self) -> &DownloadRoutes {
        &self.routes
    }
}

/// Resolve the storage directory from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_STORAGE_DIR`].
pub fn storage_dir_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR))
}

/// Resolve the download route template from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default `/api/files/{id}/download`.
pub fn route_template_from_env_value(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_DOWNLOAD_ROUTE_TEMPLATE.to_string())
}

/// Parse a comma-separated list of project ids.
///
/// Blank entries are skipped; `None` yields an empty list.
pub fn project_ids_from_env_value(value: Option<String>) -> Result<Vec<ProjectId>, TextError> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::parse)
        .collect()
}
