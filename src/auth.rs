use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};

use crate::errors::AppError;
use crate::handlers::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Rejects generation requests without the configured `X-API-Key`.
///
/// Runs before the body is read, so a missing key yields 401 even when the
/// payload is also invalid. With no key configured every request passes.
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(expected) = state.config.master_api_key.as_deref() {
        check_api_key(request.headers(), expected)?;
    }
    Ok(next.run(request).await)
}

fn check_api_key(headers: &HeaderMap, expected: &str) -> Result<(), AppError> {
    let provided = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing X-API-Key header".to_string()))?;

    if !constant_time_compare(provided, expected) {
        tracing::warn!("Invalid API key received");
        return Err(AppError::Unauthorized("Invalid API key".to_string()));
    }

    Ok(())
}

/// Compares digests so neither content nor length leaks through timing.
fn constant_time_compare(a: &str, b: &str) -> bool {
    let a = Sha256::digest(a.as_bytes());
    let b = Sha256::digest(b.as_bytes());

    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
