//! Bearer-token gate in front of `/jobs` and `/sessions`.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::{api::AppState, error::ApiError};

/// Rejects the request with 401 unless it carries the configured token.
/// A no-op when no token is configured.
pub async fn require_bearer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(expected) = state.config.auth_token.as_deref() {
        if let Err(reason) = authorize(req.headers(), expected) {
            warn!(method = %req.method(), path = %req.uri().path(), reason, "request rejected");
            return Err(ApiError::Unauthorized(reason));
        }
    }
    Ok(next.run(req).await)
}

fn authorize(headers: &HeaderMap, expected: &str) -> Result<(), &'static str> {
    let header = headers
        .get(AUTHORIZATION)
        .map(|v| v.to_str().map_err(|_| "authorization header is not valid ascii"))
        .transpose()?;
    let token = parse_bearer(header)?;
    if bool::from(token.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        Err("invalid bearer token")
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` value.
pub fn parse_bearer(header: Option<&str>) -> Result<&str, &'static str> {
    let header = header.ok_or("missing authorization header")?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or("missing bearer prefix")?
        .trim();
    if token.is_empty() {
        return Err("empty bearer token");
    }
    Ok(token)
}
