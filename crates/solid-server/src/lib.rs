use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use solid_kernel::GeometryKernel;
use solid_pipeline::{FailureKind, Outcome, Pipeline};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn app<K>(pipeline: Pipeline<K>) -> Router
where
    K: GeometryKernel + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/kernel", get(kernel_status::<K>))
        .route("/generate", post(generate::<K>))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(pipeline))
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    prompt: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize, Deserialize)]
struct KernelResponse {
    loaded: bool,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn kernel_status<K>(State(pipeline): State<Arc<Pipeline<K>>>) -> Json<KernelResponse>
where
    K: GeometryKernel + Send + Sync + 'static,
{
    let error = pipeline.kernel().ensure_loaded().err();
    Json(KernelResponse {
        loaded: error.is_none(),
        error: error.map(|err| err.to_string()),
    })
}

async fn generate<K>(
    State(pipeline): State<Arc<Pipeline<K>>>,
    body: Bytes,
) -> Result<Response, ApiError>
where
    K: GeometryKernel + Send + Sync + 'static,
{
    let request: GenerateRequest = parse_json(&body)?;

    // The kernel call blocks; keep it off the async workers.
    let outcome = tokio::task::spawn_blocking(move || pipeline.run(&request.prompt))
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "generation task failed");
            ApiError::internal("generation task failed")
        })?;

    Ok((outcome_status(&outcome), Json(outcome)).into_response())
}

fn outcome_status(outcome: &Outcome) -> StatusCode {
    match outcome.failure {
        None => StatusCode::OK,
        Some(FailureKind::EmptyPrompt | FailureKind::UnrecognizedPrompt) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        Some(FailureKind::KernelUnavailable) => StatusCode::SERVICE_UNAVAILABLE,
        Some(FailureKind::Path | FailureKind::KernelCall) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    if body.is_empty() {
        return Err(ApiError::bad_request("request body is required"));
    }

    serde_json::from_slice(body)
        .map_err(|err| ApiError::bad_request(format!("invalid JSON body: {err}")))
}
