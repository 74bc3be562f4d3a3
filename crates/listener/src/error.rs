//! HTTP-facing error type and its JSON bodies.

use std::time::Duration;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use pipeline::PolicyAnalysisError;

use crate::ContactInfo;

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every way a request can be refused.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request body is not a JSON object: {0}")]
    MalformedBody(String),

    #[error("request validation failed with {} violation(s)", .0.len())]
    Validation(Vec<Violation>),

    #[error("Rate limit exceeded. Try again later.")]
    RateLimited { retry_after: Duration },

    #[error("Demo password required")]
    DemoPasswordRequired { contact: ContactInfo },

    #[error("Invalid demo password")]
    InvalidDemoPassword { contact: ContactInfo },

    #[error(transparent)]
    Analysis(#[from] PolicyAnalysisError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::DemoPasswordRequired { .. } | ApiError::InvalidDemoPassword { .. } => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Analysis(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Whole seconds until retry, rounded up and never zero.
fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    secs.max(1)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        match self {
            ApiError::MalformedBody(detail) => (
                status,
                Json(json!({"error": "invalid_json", "message": detail})),
            )
                .into_response(),
            ApiError::Validation(violations) => (
                status,
                Json(json!({"error": "validation_failed", "violations": violations})),
            )
                .into_response(),
            ApiError::RateLimited { retry_after } => {
                let secs = retry_after_secs(retry_after);
                let mut response = (
                    status,
                    Json(json!({
                        "error": "rate_limited",
                        "message": message,
                        "retryAfter": secs,
                    })),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(secs));
                response
            }
            ApiError::DemoPasswordRequired { contact } => (
                status,
                Json(json!({
                    "error": message,
                    "message": "This API requires a demo password. Contact the maintainer to get access.",
                    "contact": contact,
                })),
            )
                .into_response(),
            ApiError::InvalidDemoPassword { contact } => (
                status,
                Json(json!({
                    "error": message,
                    "message": "The demo password you provided is incorrect. Contact the maintainer for access.",
                    "contact": contact,
                })),
            )
                .into_response(),
            ApiError::Analysis(error) => (
                status,
                Json(json!({"error": "analysis_failed", "message": error.to_string()})),
            )
                .into_response(),
        }
    }
}
