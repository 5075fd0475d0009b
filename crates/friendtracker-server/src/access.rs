//! Bearer-token gate for the contact routes.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::api::AppState;
use crate::error::ServerError;

pub async fn require_access_token(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ServerError> {
    if let Some(expected) = state.config.access_token.as_deref() {
        if !token_matches(bearer_token(req.headers()), expected) {
            warn!(path = %req.uri().path(), "Rejected request without a valid access token");
            return Err(ServerError::Unauthorized);
        }
    }

    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

// Constant-time; length mismatch short-circuits.
fn token_matches(provided: Option<&str>, expected: &str) -> bool {
    let Some(provided) = provided else {
        return false;
    };
    provided.len() == expected.len() && bool::from(provided.as_bytes().ct_eq(expected.as_bytes()))
}
