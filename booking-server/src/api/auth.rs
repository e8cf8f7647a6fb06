//! Staff authentication middleware
//!
//! Staff routes carry the shared key in `X-Staff-Key`.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use shared::error::{AppError, ErrorCode};

use crate::state::AppState;

pub const STAFF_KEY_HEADER: &str = "x-staff-key";

pub async fn staff_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided = request
        .headers()
        .get(STAFF_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::new(ErrorCode::NotAuthenticated))?;

    if !constant_time_eq(provided.as_bytes(), state.staff_api_key.as_bytes()) {
        tracing::warn!(path = %request.uri().path(), "Rejected staff request with invalid key");
        return Err(AppError::new(ErrorCode::NotAuthenticated));
    }

    Ok(next.run(request).await)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
