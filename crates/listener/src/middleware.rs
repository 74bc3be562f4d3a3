//! Request middleware. Layer order is set in [`crate::build_router`].

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use sha2::{Digest, Sha256};
use tracing::Instrument;

use pipeline::{Admission, CorrelationId};

use crate::client_key::client_key;
use crate::{ApiError, AppState};

pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";
pub const DEMO_PASSWORD_HEADER: &str = "x-demo-password";

const ALLOW_ORIGIN: &str = "*";
const ALLOW_METHODS: &str = "POST, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, X-Correlation-ID, X-Demo-Password, X-Client-Id";
const MAX_AGE_SECS: &str = "3600";

// ---------------------------------------------------------------------------
// CORS
// ---------------------------------------------------------------------------

/// Answers preflight requests with 204 and adds CORS headers to every
/// response, errors included.
pub async fn cors(req: Request, next: Next) -> Response {
    let mut response = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };

    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static(MAX_AGE_SECS),
    );
    response
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Adopts or generates the correlation id, runs the request inside a span
/// carrying it, and echoes it on the response.
pub async fn correlation(mut req: Request, next: Next) -> Response {
    let inbound = req
        .headers()
        .get(CORRELATION_ID_HEADER)
        .and_then(|value| value.to_str().ok());
    let correlation_id = CorrelationId::from_inbound(inbound);

    let span = tracing::info_span!(
        "request",
        correlation_id = %correlation_id,
        method = %req.method(),
        path = %req.uri().path(),
    );
    req.extensions_mut().insert(correlation_id.clone());

    let mut response = next.run(req).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(correlation_id.as_str()) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(CORRELATION_ID_HEADER), value);
    }
    response
}

// ---------------------------------------------------------------------------
// Demo password
// ---------------------------------------------------------------------------

/// Rejects requests without the configured `X-Demo-Password`. Disabled when
/// no password is configured.
pub async fn demo_password(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.config.demo_password() else {
        return Ok(next.run(req).await);
    };

    check_password(req.headers(), expected, &state)?;
    Ok(next.run(req).await)
}

fn check_password(headers: &HeaderMap, expected: &str, state: &AppState) -> Result<(), ApiError> {
    let provided = headers
        .get(DEMO_PASSWORD_HEADER)
        .map(|value| value.as_bytes())
        .filter(|value| !value.is_empty());

    match provided {
        None => {
            tracing::info!("Rejected request without demo password");
            Err(ApiError::DemoPasswordRequired {
                contact: state.config.contact().clone(),
            })
        }
        Some(value) if !secrets_match(value, expected.as_bytes()) => {
            tracing::info!("Rejected request with invalid demo password");
            Err(ApiError::InvalidDemoPassword {
                contact: state.config.contact().clone(),
            })
        }
        Some(_) => Ok(()),
    }
}

/// Compares two secrets in time independent of where they differ. Both sides
/// are digested first so the loop length does not depend on either input.
fn secrets_match(provided: &[u8], expected: &[u8]) -> bool {
    let provided = Sha256::digest(provided);
    let expected = Sha256::digest(expected);
    provided
        .iter()
        .zip(expected.iter())
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

// ---------------------------------------------------------------------------
// Rate limit
// ---------------------------------------------------------------------------

/// Counts the request against its client key. A failing counter cache admits
/// the request.
pub async fn rate_limit(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(limiter) = state.limiter.as_ref() else {
        return Ok(next.run(req).await);
    };

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let key = client_key(req.headers(), peer, state.config.trusted_proxies());

    match limiter.admit(&key).await {
        Ok(Admission::Allowed { .. }) => Ok(next.run(req).await),
        Ok(Admission::Rejected { retry_after }) => Err(ApiError::RateLimited { retry_after }),
        Err(error) => {
            tracing::warn!(%error, "Rate limiter unavailable, admitting request");
            Ok(next.run(req).await)
        }
    }
}
