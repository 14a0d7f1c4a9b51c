//! # API REST
//!
//! REST API implementation for project hub file records.
//!
//! Handles:
//! - HTTP endpoints with axum under `/api/files`
//! - Multipart uploads and streamed downloads
//! - OpenAPI documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! All storage decisions are made by `hub-core`; handlers only translate requests and map
//! errors. Core calls do blocking filesystem I/O and run on the blocking thread pool.

#![warn(rust_2018_idioms)]

use axum::{
    body::{Body, Bytes},
    extract::{
        multipart::{Field, MultipartError},
        DefaultBodyLimit, Multipart, Path as AxumPath, Query, State,
    },
    http::{header, StatusCode},
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use hub_core::{
    ErrorKind, FileRecordDto, FileService, FileServiceError, FileServiceResult, ProjectId,
    RecordId,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::io;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::io::{ReaderStream, StreamReader, SyncIoBridge};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;

/// Largest request body accepted for uploads.
pub const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Multipart field carrying the uploaded file.
const UPLOAD_FIELD: &str = "file";

/// Upload chunks buffered between the request body and the blocking writer.
const UPLOAD_CHANNEL_CHUNKS: usize = 8;

/// RFC 5987 `attr-char`: everything else in an extended parameter value is percent-encoded.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// Blocking reader over an upload body that is still arriving.
type UploadReader = SyncIoBridge<StreamReader<ReceiverStream<io::Result<Bytes>>, Bytes>>;

type ApiResult<T> = Result<T, (StatusCode, String)>;

/// Application state shared across REST API handlers
#[derive(Clone)]
pub struct AppState {
    file_service: FileService,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadParams {
    #[serde(default)]
    pub project_id: Option<i64>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_files,
        get_file,
        create_file,
        update_file,
        delete_file,
        upload_file,
        upload_for_file,
        download_file,
    ),
    components(schemas(HealthRes))
)]
pub struct ApiDoc;

/// Builds the REST router around a configured [`FileService`].
pub fn router(file_service: FileService) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/files", get(list_files).post(create_file))
        .route("/api/files/upload", post(upload_file))
        .route(
            "/api/files/:id",
            get(get_file).put(update_file).delete(delete_file),
        )
        .route("/api/files/:id/upload", post(upload_for_file))
        .route("/api/files/:id/download", get(download_file))
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(AppState { file_service })
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Project hub REST API is alive".into(),
    })
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[utoipa::path(
    get,
    path = "/api/files",
    responses(
        (status = 200, description = "All file records"),
        (status = 500, description = "Internal server error")
    )
)]
/// List all file records
///
/// Each record's `path` is its download route, never its storage location.
#[axum::debug_handler]
async fn list_files(State(state): State<AppState>) -> ApiResult<Json<Vec<FileRecordDto>>> {
    let service = state.file_service.clone();
    run_blocking(move || service.list()).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/api/files/{id}",
    params(("id" = i64, Path, description = "File record id")),
    responses(
        (status = 200, description = "File record"),
        (status = 404, description = "File not found")
    )
)]
/// Fetch a single file record
#[axum::debug_handler]
async fn get_file(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> ApiResult<Json<FileRecordDto>> {
    let id = RecordId::new(id);
    let service = state.file_service.clone();
    run_blocking(move || service.find(id))
        .await?
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("File not found: {}", id)))
}

#[utoipa::path(
    post,
    path = "/api/files",
    responses(
        (status = 201, description = "File record created"),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Project not found")
    )
)]
/// Create a metadata-only file record
#[axum::debug_handler]
async fn create_file(
    State(state): State<AppState>,
    Json(req): Json<FileRecordDto>,
) -> ApiResult<(StatusCode, Json<FileRecordDto>)> {
    let service = state.file_service.clone();
    let created = run_blocking(move || service.create(&req)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/api/files/{id}",
    params(("id" = i64, Path, description = "File record id")),
    responses(
        (status = 200, description = "File record updated"),
        (status = 400, description = "Bad request"),
        (status = 404, description = "File or project not found")
    )
)]
/// Update a file record's metadata
///
/// A `path` equal to the record's download route is ignored.
#[axum::debug_handler]
async fn update_file(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
    Json(req): Json<FileRecordDto>,
) -> ApiResult<Json<FileRecordDto>> {
    let service = state.file_service.clone();
    run_blocking(move || service.update(RecordId::new(id), &req))
        .await
        .map(Json)
}

#[utoipa::path(
    delete,
    path = "/api/files/{id}",
    params(("id" = i64, Path, description = "File record id")),
    responses(
        (status = 204, description = "File record deleted"),
        (status = 404, description = "File not found")
    )
)]
/// Delete a file record (the stored blob is kept)
#[axum::debug_handler]
async fn delete_file(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> ApiResult<StatusCode> {
    let service = state.file_service.clone();
    run_blocking(move || service.delete(RecordId::new(id))).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/files/upload",
    params(("projectId" = Option<i64>, Query, description = "Project to file the upload under")),
    responses(
        (status = 201, description = "File stored"),
        (status = 400, description = "Empty or malformed upload"),
        (status = 404, description = "Project not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// Upload a file as a new record
///
/// Expects a multipart body with a `file` field.
#[axum::debug_handler]
async fn upload_file(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<FileRecordDto>)> {
    let project_id = params.project_id.map(ProjectId::new);

    let service = state.file_service.clone();
    let stored = stream_upload(multipart, move |content, filename| {
        service.store(content, filename.as_deref(), project_id)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

#[utoipa::path(
    post,
    path = "/api/files/{id}/upload",
    params(("id" = i64, Path, description = "File record id")),
    responses(
        (status = 200, description = "File content replaced"),
        (status = 400, description = "Empty or malformed upload"),
        (status = 404, description = "File not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// Replace the content of an existing record
#[axum::debug_handler]
async fn upload_for_file(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
    multipart: Multipart,
) -> ApiResult<Json<FileRecordDto>> {
    let service = state.file_service.clone();
    stream_upload(multipart, move |content, filename| {
        service.replace_content(RecordId::new(id), content, filename.as_deref())
    })
    .await
    .map(Json)
}

#[utoipa::path(
    get,
    path = "/api/files/{id}/download",
    params(("id" = i64, Path, description = "File record id")),
    responses(
        (status = 200, description = "File content"),
        (status = 404, description = "File or stored content not found")
    )
)]
/// Download a record's content
///
/// The body is streamed from disk.
#[axum::debug_handler]
async fn download_file(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<i64>,
) -> ApiResult<Response> {
    let service = state.file_service.clone();
    let download = run_blocking(move || service.retrieve(RecordId::new(id))).await?;

    let disposition = content_disposition(&download.filename);
    let stream = ReaderStream::new(tokio::fs::File::from_std(download.file));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, download.content_type)
        .header(header::CONTENT_LENGTH, download.size_bytes)
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from_stream(stream))
        .map_err(|e| {
            tracing::error!("Download response error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into())
        })
}

/// Streams the `file` field of a multipart upload into a blocking core call.
///
/// Chunks are forwarded as they arrive; `store` reads them through an [`UploadReader`] on the
/// blocking pool. A broken request body surfaces to `store` as a read error, so nothing is
/// persisted for it.
async fn stream_upload<T, F>(mut multipart: Multipart, store: F) -> ApiResult<T>
where
    F: FnOnce(UploadReader, Option<String>) -> FileServiceResult<T> + Send + 'static,
    T: Send + 'static,
{
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some(UPLOAD_FIELD) {
            return forward_field(field, store).await;
        }
    }

    Err((
        StatusCode::BAD_REQUEST,
        format!("Missing '{}' field", UPLOAD_FIELD),
    ))
}

async fn forward_field<T, F>(mut field: Field<'_>, store: F) -> ApiResult<T>
where
    F: FnOnce(UploadReader, Option<String>) -> FileServiceResult<T> + Send + 'static,
    T: Send + 'static,
{
    let filename = field.file_name().map(str::to_owned);

    let (tx, rx) = mpsc::channel(UPLOAD_CHANNEL_CHUNKS);
    let reader = SyncIoBridge::new(StreamReader::new(ReceiverStream::new(rx)));
    let task = tokio::task::spawn_blocking(move || store(reader, filename));

    let mut body_error = None;
    loop {
        match field.chunk().await {
            Ok(Some(chunk)) => {
                // The core stopped reading; its result says why.
                if tx.send(Ok(chunk)).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                let read_error = io::Error::new(io::ErrorKind::Other, e.body_text());
                let _ = tx.send(Err(read_error)).await;
                body_error = Some(multipart_error(e));
                break;
            }
        }
    }
    drop(tx);

    let result = join_blocking(task).await;
    match body_error {
        Some(e) => Err(e),
        None => result,
    }
}

fn multipart_error(e: MultipartError) -> (StatusCode, String) {
    (e.status(), e.body_text())
}

/// Runs a blocking core call off the async runtime.
async fn run_blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> FileServiceResult<T> + Send + 'static,
    T: Send + 'static,
{
    join_blocking(tokio::task::spawn_blocking(f)).await
}

async fn join_blocking<T>(task: JoinHandle<FileServiceResult<T>>) -> ApiResult<T> {
    match task.await {
        Ok(result) => result.map_err(error_response),
        Err(e) => {
            tracing::error!("Blocking task failed: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into()))
        }
    }
}

/// Maps a core error to a status and a message that never reveals storage paths.
fn error_response(e: FileServiceError) -> (StatusCode, String) {
    match e.kind() {
        ErrorKind::NotFound => {
            let message = match &e {
                FileServiceError::RecordNotFound(id) => format!("File not found: {}", id),
                FileServiceError::ProjectNotFound(id) => format!("Project not found: {}", id),
                _ => "Stored file not found".to_string(),
            };
            (StatusCode::NOT_FOUND, message)
        }
        ErrorKind::ContainmentViolation => {
            tracing::warn!("Rejected storage path: {}", e);
            (StatusCode::BAD_REQUEST, "Invalid storage path".into())
        }
        ErrorKind::EmptyUpload => (StatusCode::BAD_REQUEST, "File is empty".into()),
        ErrorKind::InvalidInput => (StatusCode::BAD_REQUEST, e.to_string()),
        ErrorKind::IoFailure => {
            tracing::error!("File service error: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into())
        }
    }
}

/// Builds an `attachment` disposition with an ASCII fallback name and, when needed, the UTF-8
/// name in RFC 5987 form.
fn content_disposition(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if filename.is_ascii() && ascii == filename {
        return format!("attachment; filename=\"{}\"", ascii);
    }

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii,
        utf8_percent_encode(filename, ATTR_CHAR)
    )
}
