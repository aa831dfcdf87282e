//! Bearer token gate for the `/api` routes.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use crate::errors::AppError;
use crate::AppState;

/// Middleware: requires `Authorization: Bearer <token>` with a token issued by
/// `POST /auth/token` that has not expired yet.
/// Rejections carry the precise token error code.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if let Err(e) = state.tokens.authenticate(header) {
        tracing::debug!(code = e.code(), path = %req.uri().path(), "rejected api request");
        return Err(e);
    }

    Ok(next.run(req).await)
}
