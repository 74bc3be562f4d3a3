//! Route handlers.

use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;

use pipeline::AnalysisResult;

use crate::{validation, ApiError, AppState};

/// `POST /analyze`
pub async fn analyze(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AnalysisResult>, ApiError> {
    let request = validation::parse_request(&body)?;

    let started = Instant::now();
    match state.analyzer.analyze(&request).await {
        Ok(result) => {
            state
                .metrics
                .record_success(started.elapsed(), state.analyzer.model_name());
            Ok(Json(result))
        }
        Err(error) => {
            let cause = error.cause().to_string();
            state.metrics.record_failure(started.elapsed(), &cause);
            tracing::error!(error = %error, cause = %cause, "Policy analysis failed");
            Err(error.into())
        }
    }
}

/// `GET /health`
pub async fn health() -> &'static str {
    "OK"
}
