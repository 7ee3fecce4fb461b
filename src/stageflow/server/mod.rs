// SPDX-License-Identifier: MIT

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, FromRequest, Path, Request, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures::stream::Stream;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::adk::error::{PipelineError, Result, StageflowError, ToolError};
use crate::stageflow::config::ServerConfig;
use crate::stageflow::pipeline::{
    create_text_analysis_sequence, run_basic, BasicMethod, SequenceLoader, StageCatalog,
    TextAnalysis,
};
use crate::stageflow::registry::ToolRegistry;
use crate::stageflow::store::{DocumentStore, MemoryStore};
use crate::stageflow::tools::register_builtin_tools;

const ENDPOINTS: &[&str] = &[
    "/api/health",
    "/basic/explicit",
    "/basic/shorthand",
    "/basic/empty",
    "/practical/text-analysis",
    "/practical/text-analysis/stream",
    "/api/sequences",
    "/api/sequences/{id}/invoke",
    "/api/tools",
    "/api/tools/{name}",
];

/// Shared handles injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub registry: ToolRegistry,
    pub documents: DocumentStore,
    pub memories: MemoryStore,
    pub catalog: Arc<StageCatalog>,
    pub sequences_dir: PathBuf,
}

impl AppState {
    /// Fresh stores, the built-in tools and the built-in stage catalog
    pub async fn new(sequences_dir: impl Into<PathBuf>) -> Self {
        let documents = DocumentStore::new();
        let memories = MemoryStore::new();
        let registry = ToolRegistry::new();
        register_builtin_tools(&registry, &documents, &memories).await;

        Self {
            registry,
            documents,
            memories,
            catalog: Arc::new(StageCatalog::builtin()),
            sequences_dir: sequences_dir.into(),
        }
    }
}

/// JSON `{detail}` error body with a status code
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, detail)
    }

    fn internal(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        log::error!("Request failed: {}", detail);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::InvalidInput { .. } => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Graph execution failed: {}", err),
            ),
            PipelineError::Compilation(_) => Self::internal(err.to_string()),
        }
    }
}

impl From<ToolError> for ApiError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::InvalidArguments(_) => Self::new(StatusCode::BAD_REQUEST, err.to_string()),
            ToolError::NotFound { .. } => Self::not_found(err.to_string()),
            ToolError::Failed(_) => Self::internal(err.to_string()),
        }
    }
}

impl From<StageflowError> for ApiError {
    fn from(err: StageflowError) -> Self {
        match err {
            StageflowError::Pipeline(e) => e.into(),
            StageflowError::Tool(e) => e.into(),
            StageflowError::ToolNotFound { .. } => Self::not_found(err.to_string()),
            other => Self::internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// `Json` extractor whose rejections are reported as `{detail}`
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Run sequence work on the blocking pool, off the async workers
async fn blocking<T, F>(work: F) -> ApiResult<T>
where
    F: FnOnce() -> std::result::Result<T, PipelineError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::internal(format!("Worker failed: {}", e)))?
        .map_err(ApiError::from)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health_check))
        .route("/basic/{method}", post(basic))
        .route("/practical/text-analysis", post(text_analysis))
        .route("/practical/text-analysis/stream", post(stream_text_analysis))
        .route("/api/sequences", get(list_sequences))
        .route("/api/sequences/{id}/invoke", post(invoke_sequence))
        .route("/api/tools", get(list_tools))
        .route("/api/tools/{name}", post(call_tool))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(config: ServerConfig) -> Result<()> {
    let state = AppState::new(config.sequences_dir.clone()).await;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Stageflow sequential pipeline API",
        "endpoints": ENDPOINTS,
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Deserialize)]
struct BasicRequest {
    input: String,
}

async fn basic(
    Path(method): Path<String>,
    JsonBody(payload): JsonBody<BasicRequest>,
) -> ApiResult<Json<Value>> {
    let method: BasicMethod = method.parse().map_err(ApiError::not_found)?;
    let result = blocking(move || run_basic(method, &payload.input)).await?;
    Ok(Json(json!(result)))
}

async fn text_analysis(JsonBody(input): JsonBody<Value>) -> ApiResult<Json<TextAnalysis>> {
    let analysis = blocking(move || {
        let state = create_text_analysis_sequence()?.invoke(input)?;
        TextAnalysis::try_from(state)
    })
    .await?;
    Ok(Json(analysis))
}

/// One SSE frame: event name plus JSON payload
type Frame = (&'static str, Value);

async fn stream_text_analysis(
    JsonBody(input): JsonBody<Value>,
) -> Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>> {
    let (tx, rx) = mpsc::channel::<Frame>(16);

    tokio::task::spawn_blocking(move || {
        let result = create_text_analysis_sequence()
            .map_err(PipelineError::from)
            .and_then(|sequence| {
                sequence.invoke_with(input, |event| {
                    let _ = tx.blocking_send(("stage", json!(event)));
                })
            })
            .and_then(TextAnalysis::try_from);

        let last = match result {
            Ok(analysis) => ("done", json!(analysis)),
            Err(e) => {
                log::warn!("Streaming analysis failed: {}", e);
                ("error", json!({ "detail": format!("Graph execution failed: {}", e) }))
            }
        };
        let _ = tx.blocking_send(last);
    });

    let stream = ReceiverStream::new(rx)
        .map(|(name, payload)| Event::default().event(name).json_data(payload));

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(1)))
}

async fn list_sequences(State(state): State<AppState>) -> Json<Value> {
    let mut sequences = Vec::new();
    if let Ok(mut entries) = fs::read_dir(&state.sequences_dir).await {
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if !path
                .extension()
                .is_some_and(|ext| ext == "yaml" || ext == "yml")
            {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let def = match fs::read_to_string(&path).await {
                Ok(content) => SequenceLoader::parse_yaml(&content),
                Err(e) => Err(e.into()),
            };
            match def {
                Ok(def) => sequences.push(json!({
                    "id": id,
                    "name": def.name,
                    "description": def.description,
                    "stages": def.stages,
                    "file": path.to_string_lossy(),
                })),
                Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
            }
        }
    }
    sequences.sort_by(|a, b| a["id"].as_str().cmp(&b["id"].as_str()));
    Json(json!(sequences))
}

async fn find_sequence(dir: &FsPath, id: &str) -> Option<PathBuf> {
    if id.is_empty() || id.starts_with('.') || id.contains(['/', '\\']) {
        return None;
    }
    for ext in ["yaml", "yml"] {
        let path = dir.join(format!("{}.{}", id, ext));
        if fs::try_exists(&path).await.unwrap_or(false) {
            return Some(path);
        }
    }
    None
}

async fn invoke_sequence(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<Value>,
) -> ApiResult<Json<Value>> {
    let path = find_sequence(&state.sequences_dir, &id)
        .await
        .ok_or_else(|| ApiError::not_found(format!("Sequence '{}' not found", id)))?;

    let content = fs::read_to_string(&path)
        .await
        .map_err(StageflowError::from)?;
    let def = SequenceLoader::parse_yaml(&content)?;
    let catalog = state.catalog.clone();

    let result = blocking(move || {
        let sequence = def.build(&catalog)?;
        Ok(sequence.invoke(input)?.into_json())
    })
    .await?;
    Ok(Json(result))
}

async fn list_tools(State(state): State<AppState>) -> Json<Value> {
    Json(json!(state.registry.list().await))
}

async fn call_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let args = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(&body).map_err(ToolError::from)?
    };

    let result = state.registry.execute(&name, args).await?;
    Ok(Json(json!({ "tool": name, "result": result })))
}
