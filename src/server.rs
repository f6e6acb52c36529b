//! HTTP server for the game master and its UI.
//!
//! Exposes the rule lookup as a callable tool, plus the upload and display
//! surfaces a front end needs.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/tools/list` | List registered tools with parameter schemas |
//! | `POST` | `/tools/{name}` | Call a tool; response is `{ "result": ... }` |
//! | `POST` | `/sessions/{session_id}/rulebooks?filename=..` | Upload one rulebook (raw body) |
//! | `GET`  | `/sessions/{session_id}/rulebooks` | Uploaded rulebook names |
//!
//! Uploads carry the file's MIME type in `Content-Type`; when the header
//! is missing it is guessed from the filename extension. Bodies larger than
//! `[server].max_upload_bytes` are refused with 413.
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "sessionId must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404),
//! `payload_too_large` (413), `unsupported_media_type` (415),
//! `tool_error` (500), `ingest_failed` (500).

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::extract::{content_type_for_name, is_supported_content_type};
use crate::ingest::process_rulebook;
use crate::models::RulebookUpload;
use crate::retrieve::list_uploaded_rulebooks;
use crate::store::sqlite::SqliteStore;
use crate::store::RuleStore;
use crate::tools::{ToolContext, ToolRegistry};

#[derive(Clone)]
struct AppState {
    ctx: ToolContext,
    tools: Arc<ToolRegistry>,
}

/// Starts the server on `[server].bind` with the SQLite store and built-in tools.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    run_server_with_extensions(config, ToolRegistry::new()).await
}

/// Like [`run_server`], serving `extra_tools` after the built-ins.
pub async fn run_server_with_extensions(
    config: &Config,
    extra_tools: ToolRegistry,
) -> anyhow::Result<()> {
    let store: Arc<dyn RuleStore> = Arc::new(SqliteStore::open(config).await?);
    let bind_addr = config.server.bind.clone();

    let mut tools = ToolRegistry::with_builtins();
    tools.append(extra_tools);
    for t in tools.tools() {
        tracing::info!("POST /tools/{} registered", t.name());
    }

    let app = router(Arc::new(config.clone()), store, tools);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Rulebook server listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the application router over any store backend.
pub fn router(config: Arc<Config>, store: Arc<dyn RuleStore>, tools: ToolRegistry) -> Router {
    let upload_limit = config.server.max_upload_bytes;
    let state = AppState {
        ctx: ToolContext::new(config, store),
        tools: Arc::new(tools),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/tools/list", get(handle_list_tools))
        .route("/tools/{name}", post(handle_tool_call))
        .route(
            "/sessions/{session_id}/rulebooks",
            get(handle_list_rulebooks)
                .post(handle_upload)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl AppError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError::new(StatusCode::BAD_REQUEST, "bad_request", message)
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError::new(StatusCode::NOT_FOUND, "not_found", message)
}

/// Validation failures from tools surface as 400, everything else as 500.
fn classify_tool_error(tool_name: &str, err: anyhow::Error) -> AppError {
    let msg = format!("{}: {:#}", tool_name, err);
    if msg.contains("must not be empty") {
        bad_request(msg)
    } else {
        AppError::new(StatusCode::INTERNAL_SERVER_ERROR, "tool_error", msg)
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============ GET /tools/list ============

#[derive(Serialize)]
struct ToolInfo {
    name: String,
    description: String,
    builtin: bool,
    parameters: Value,
}

async fn handle_list_tools(State(state): State<AppState>) -> Json<Value> {
    let tools: Vec<ToolInfo> = state
        .tools
        .tools()
        .iter()
        .map(|t| ToolInfo {
            name: t.name().to_string(),
            description: t.description().to_string(),
            builtin: t.is_builtin(),
            parameters: t.parameters_schema(),
        })
        .collect();
    Json(json!({ "tools": tools }))
}

// ============ POST /tools/{name} ============

async fn handle_tool_call(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(params): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let tool = state
        .tools
        .find(&name)
        .ok_or_else(|| not_found(format!("no tool registered with name: {}", name)))?;

    if !params.is_object() {
        return Err(bad_request("parameters must be a JSON object"));
    }

    let result = tool
        .execute(params, &state.ctx)
        .await
        .map_err(|e| classify_tool_error(&name, e))?;

    Ok(Json(json!({ "result": result })))
}

// ============ /sessions/{session_id}/rulebooks ============

#[derive(Deserialize)]
struct UploadQuery {
    filename: String,
}

async fn handle_upload(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Value>, AppError> {
    let filename = query.filename.trim();
    if filename.is_empty() {
        return Err(bad_request("filename must not be empty"));
    }
    let body = body.map_err(|rejection| {
        let status = rejection.status();
        let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
            "payload_too_large"
        } else {
            "bad_request"
        };
        AppError::new(status, code, format!("{}: {}", filename, rejection.body_text()))
    })?;

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| content_type_for_name(filename).to_string());

    if !is_supported_content_type(&content_type) {
        tracing::warn!("Rejected {}: unsupported file type {}", filename, content_type);
        return Err(AppError::new(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "unsupported_media_type",
            format!("{} is not a supported file type (PDF or TXT)", filename),
        ));
    }

    let upload = RulebookUpload::new(filename, content_type, body.to_vec());
    process_rulebook(
        state.ctx.store.as_ref(),
        &upload,
        &session_id,
        &state.ctx.config.ingest,
    )
    .await
    .map_err(|e| {
        let msg = format!("{:#}", e);
        if msg.contains("must not be empty") {
            bad_request(msg)
        } else {
            AppError::new(StatusCode::INTERNAL_SERVER_ERROR, "ingest_failed", msg)
        }
    })?;

    Ok(Json(json!({ "filename": filename, "status": "added" })))
}

async fn handle_list_rulebooks(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<Value> {
    let names = list_uploaded_rulebooks(state.ctx.store.as_ref(), &session_id).await;
    Json(json!({ "rulebooks": names }))
}
