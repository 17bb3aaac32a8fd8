//! HTTP API server for browser and script front-ends.
//!
//! Exposes ingestion, question generation and answer checking over JSON.
//! One quiz session is shared by every client of the process.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::QuizError;
use crate::orchestrator::{IngestResult, Orchestrator};
use crate::quiz::{AnswerFeedback, FallbackReason, QuizRecord, QuizSession};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

/// Largest accepted upload (recorded lectures can be big).
const MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
    session: Mutex<QuizSession>,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    let state = Arc::new(AppState {
        orchestrator,
        session: Mutex::new(QuizSession::new()),
    });

    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("glassquiz API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Ingest path", "POST /ingest");
    Output::kv("Upload file", "POST /upload?filename=...");
    Output::kv("Question", "POST /question");
    Output::kv("Answer", "POST /answer");
    Output::kv("Session", "GET  /session");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/ingest", post(ingest))
        .route("/upload", post(upload))
        .route("/question", post(question))
        .route("/answer", post(answer))
        .route("/session", get(session))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct IngestRequest {
    /// Path of a file readable by the server.
    path: String,
}

#[derive(Deserialize)]
struct UploadParams {
    filename: String,
}

#[derive(Deserialize)]
struct QuestionRequest {
    topic: String,
}

#[derive(Deserialize)]
struct AnswerRequest {
    /// Option number (1-based) or option text.
    choice: String,
}

/// A question as shown before it is answered.
#[derive(Serialize)]
struct QuestionView {
    question: String,
    options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fallback_reason: Option<FallbackReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    explanation: Option<String>,
}

impl From<&QuizRecord> for QuestionView {
    fn from(record: &QuizRecord) -> Self {
        Self {
            question: record.question.clone(),
            options: record.options.clone(),
            fallback_reason: record.fallback_reason,
            // Fallbacks have nothing to hide, so their reason is shown upfront.
            explanation: record.is_fallback().then(|| record.explanation.clone()),
        }
    }
}

#[derive(Serialize)]
struct AnswerResponse {
    #[serde(flatten)]
    feedback: AnswerFeedback,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_trace: Option<String>,
}

#[derive(Serialize)]
struct SessionResponse {
    summary: Option<String>,
    current_question: Option<QuestionView>,
    user_answer: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, error: impl ToString) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

fn quiz_error_response(e: QuizError) -> Response {
    let status = match e {
        QuizError::InvalidInput(_) | QuizError::UnsupportedFormat(_) => StatusCode::BAD_REQUEST,
        QuizError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, e)
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IngestRequest>,
) -> Response {
    let path = Settings::expand_path(&req.path);
    match ingest_file(&state, &path).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => quiz_error_response(e),
    }
}

async fn upload(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Response {
    let Some(filename) = safe_file_name(&params.filename) else {
        return error_response(StatusCode::BAD_REQUEST, "Invalid filename");
    };
    if body.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Empty upload");
    }

    // A per-upload directory keeps the original file name as the source id.
    let upload_dir = state
        .orchestrator
        .settings()
        .temp_dir()
        .join("uploads")
        .join(uuid::Uuid::new_v4().to_string());
    let path = upload_dir.join(filename);

    let result: crate::Result<IngestResult> = async {
        tokio::fs::create_dir_all(&upload_dir).await?;
        tokio::fs::write(&path, &body).await?;
        ingest_file(&state, &path).await
    }
    .await;

    if let Err(e) = tokio::fs::remove_dir_all(&upload_dir).await {
        warn!("Failed to remove upload directory {}: {}", upload_dir.display(), e);
    }

    match result {
        Ok(result) => Json(result).into_response(),
        Err(e) => quiz_error_response(e),
    }
}

async fn ingest_file(state: &AppState, path: &Path) -> crate::Result<IngestResult> {
    let result = state.orchestrator.ingest(path).await?;

    let mut session = state.session.lock().await;
    session.reset();
    if let Some(summary) = &result.summary {
        session.set_summary(summary.clone());
    }

    Ok(result)
}

async fn question(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QuestionRequest>,
) -> Response {
    let topic = req.topic.trim();
    if topic.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Topic is empty");
    }

    match state.orchestrator.generate_question(topic).await {
        Ok(record) => {
            let mut session = state.session.lock().await;
            let view = QuestionView::from(session.start_question(record));
            Json(view).into_response()
        }
        Err(e) => quiz_error_response(e),
    }
}

async fn answer(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnswerRequest>,
) -> Response {
    let mut session = state.session.lock().await;

    let Some(current) = session.current_question.as_ref() else {
        return error_response(StatusCode::CONFLICT, "No question has been asked yet");
    };
    // Without options there is nothing to pick, so any answer reveals the evidence.
    let choice = if current.is_answerable() {
        match current.resolve_choice(&req.choice) {
            Some(choice) => choice.to_string(),
            None => {
                return error_response(StatusCode::BAD_REQUEST, "Choice is not one of the options")
            }
        }
    } else {
        req.choice.trim().to_string()
    };
    let reasoning_trace = current.reasoning_trace.clone();

    match session.submit_answer(&choice) {
        Some(feedback) => Json(AnswerResponse {
            feedback,
            reasoning_trace,
        })
        .into_response(),
        None => error_response(StatusCode::CONFLICT, "No question has been asked yet"),
    }
}

async fn session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = state.session.lock().await;
    Json(SessionResponse {
        summary: session.summary.clone(),
        current_question: session.current_question.as_ref().map(QuestionView::from),
        user_answer: session.user_answer.clone(),
    })
}

/// Final path component of an uploaded file name, if it has one.
fn safe_file_name(name: &str) -> Option<PathBuf> {
    Path::new(name)
        .file_name()
        .filter(|n| !n.is_empty())
        .map(PathBuf::from)
}
