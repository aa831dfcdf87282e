use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::tokens::IssuedToken;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// POST /auth/token: exchange the configured credential pair for a bearer token
pub async fn issue_token(
    State(state): State<Arc<AppState>>,
    payload: Option<Json<TokenRequest>>,
) -> Result<Json<IssuedToken>, AppError> {
    let Some(Json(req)) = payload else {
        return Err(AppError::BadRequest(
            "JSON body with username and password required".into(),
        ));
    };
    if req.username.is_none() && req.password.is_none() {
        return Err(AppError::BadRequest(
            "JSON body with username and password required".into(),
        ));
    }

    let username = req.username.unwrap_or_default();
    let issued = state
        .tokens
        .issue(&username, &req.password.unwrap_or_default())
        .map_err(|e| {
            if matches!(e, AppError::AuthBadCredentials) {
                tracing::warn!(username = %username, "token request with bad credentials");
            }
            e
        })?;

    tracing::info!(expires_at = %issued.expires_at, "issued api token");
    Ok(Json(issued))
}
