use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::PipelineError;
use crate::jobs::{JobStatus, JobStore};
use crate::pipeline::Pipeline;
use crate::request::GenerationRequest;

const SECRET_HEADER: &str = "x-secret-token";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub jobs: JobStore,
    pub secret_token: Option<String>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/generate", post(generate))
        .route("/audio/:job_id", get(audio))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    if state.secret_token.is_none() {
        warn!("SECRET_TOKEN is not set; /generate is unauthenticated");
    }
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Inbound request body, with the enum fields as wire strings so unknown
/// values come back as a validation error instead of a bare 422.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateBody {
    ai_provider: String,
    duration: String,
    guidance_level: String,
    tts_provider: String,
    voice: String,
    meditation_focus: String,
}

impl GenerateBody {
    fn into_request(self) -> Result<GenerationRequest, PipelineError> {
        Ok(GenerationRequest {
            duration: self.duration.parse()?,
            guidance: self.guidance_level.parse()?,
            script_provider: self.ai_provider.parse()?,
            speech_provider: self.tts_provider.parse()?,
            voice: self.voice,
            focus: self.meditation_focus,
        })
    }
}

async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<GenerateBody>,
) -> Response {
    if let Some(expected) = &state.secret_token {
        let supplied = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
        if supplied != Some(expected.as_str()) {
            warn!("rejecting /generate request with a bad secret token");
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "detail": "Invalid secret token" })),
            )
                .into_response();
        }
    }

    let request = match body.into_request() {
        Ok(request) => request,
        Err(e) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "detail": e.to_string() })),
            )
                .into_response();
        }
    };

    info!(
        "accepted generation request: {} / {} via {}+{}",
        request.duration, request.guidance, request.script_provider, request.speech_provider
    );

    let job_id = state.jobs.create().await;
    let pipeline = state.pipeline.clone();
    let jobs = state.jobs.clone();
    tokio::spawn(async move {
        match pipeline.run(&request).await {
            Ok(audio) => {
                info!(
                    "job {} completed ({} of audio)",
                    job_id,
                    audio.duration_display()
                );
                jobs.complete(job_id, audio).await;
            }
            Err(e) => {
                error!("job {} failed: {}", job_id, e);
                jobs.fail(job_id, e.to_string()).await;
            }
        }
    });

    (
        StatusCode::ACCEPTED,
        Json(json!({
            "job_id": job_id,
            "message": "Meditation generation in progress",
        })),
    )
        .into_response()
}

async fn audio(State(state): State<AppState>, Path(job_id): Path<Uuid>) -> Response {
    match state.jobs.get(job_id).await {
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Unknown job id" })),
        )
            .into_response(),
        Some(JobStatus::Running) => (
            StatusCode::ACCEPTED,
            Json(json!({ "message": "Audio not ready yet" })),
        )
            .into_response(),
        Some(JobStatus::Failed { detail }) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": detail })),
        )
            .into_response(),
        Some(JobStatus::Completed(audio)) => {
            let mut headers = HeaderMap::new();
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("audio/wav"));
            let duration = HeaderValue::from_str(&audio.duration_display())
                .unwrap_or(HeaderValue::from_static("0:00"));
            headers.insert("x-audio-duration", duration);
            (headers, audio.wav.clone()).into_response()
        }
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
