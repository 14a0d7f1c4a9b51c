use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use hub_core::{
    CoreConfig, FileService, InMemoryMetadata,
    config::{
        project_ids_from_env_value, route_template_from_env_value, storage_dir_from_env_value,
    },
    constants::{DOWNLOAD_ROUTE_TEMPLATE_ENV, PROJECT_IDS_ENV, STORAGE_DIR_ENV},
};

const REST_ADDR_ENV: &str = "HUB_REST_ADDR";
const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Default log directives, added on top of `RUST_LOG`.
const LOG_DIRECTIVES: [&str; 2] = ["hub=info", "api_rest=info"];

/// Main entry point for the project hub file service
///
/// Resolves configuration once, then serves the REST API.
///
/// # Environment Variables
/// - `HUB_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `HUB_STORAGE_DIR`: Storage root for uploaded files (default: "storage")
/// - `HUB_DOWNLOAD_ROUTE_TEMPLATE`: Download route with an `{id}` placeholder
///   (default: "/api/files/{id}/download")
/// - `HUB_PROJECT_IDS`: Comma-separated project ids accepted for uploads
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(env_filter()?)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var(REST_ADDR_ENV).unwrap_or_else(|_| DEFAULT_REST_ADDR.into());
    let storage_dir = storage_dir_from_env_value(std::env::var(STORAGE_DIR_ENV).ok());
    let route_template =
        route_template_from_env_value(std::env::var(DOWNLOAD_ROUTE_TEMPLATE_ENV).ok());

    let cfg = Arc::new(CoreConfig::new(&storage_dir, &route_template)?);

    // Records live for the lifetime of the process.
    let metadata = Arc::new(InMemoryMetadata::new());
    for project_id in project_ids_from_env_value(std::env::var(PROJECT_IDS_ENV).ok())? {
        metadata.add_project(project_id)?;
    }
    let file_service = FileService::new(cfg, metadata.clone(), metadata);

    tracing::info!("++ Starting project hub REST on {}", rest_addr);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, api_rest::router(file_service)).await?;

    Ok(())
}

fn env_filter() -> anyhow::Result<EnvFilter> {
    let mut filter = EnvFilter::from_default_env();
    for directive in LOG_DIRECTIVES {
        filter = filter.add_directive(directive.parse()?);
    }
    Ok(filter)
}
