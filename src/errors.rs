use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("authorization header missing or malformed")]
    AuthMissingOrMalformed,

    #[error("unknown token")]
    AuthUnknownToken,

    #[error("token expired")]
    AuthExpiredToken,

    #[error("bad credentials")]
    AuthBadCredentials,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("backend failure: {0}")]
    Backend(#[from] anyhow::Error),
}

impl AppError {
    /// Machine-readable error kind, also used as the `code` field of the body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::AuthMissingOrMalformed => "missing_or_malformed_token",
            AppError::AuthUnknownToken => "unknown_token",
            AppError::AuthExpiredToken => "token_expired",
            AppError::AuthBadCredentials => "bad_credentials",
            AppError::BadRequest(_) => "bad_request",
            AppError::NotFound(_) => "not_found",
            AppError::Backend(_) => "backend_failure",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, msg) = match &self {
            AppError::AuthMissingOrMalformed => (
                StatusCode::UNAUTHORIZED,
                "authentication_error",
                "authorization header missing or malformed, use: Bearer <token>".to_string(),
            ),
            AppError::AuthUnknownToken => (
                StatusCode::UNAUTHORIZED,
                "authentication_error",
                "invalid or unknown token".to_string(),
            ),
            AppError::AuthExpiredToken => (
                StatusCode::UNAUTHORIZED,
                "authentication_error",
                "token expired, request a new one via POST /auth/token".to_string(),
            ),
            AppError::AuthBadCredentials => (
                StatusCode::UNAUTHORIZED,
                "authentication_error",
                "invalid username or password".to_string(),
            ),
            AppError::BadRequest(m) => (
                StatusCode::BAD_REQUEST,
                "invalid_request_error",
                m.clone(),
            ),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found_error", m.clone()),
            AppError::Backend(e) => {
                tracing::error!("Backend failure: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    format!("{:#}", e),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "message": msg,
                "type": error_type,
                "code": self.code(),
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_expired_token_maps_to_401() {
        let resp = AppError::AuthExpiredToken.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(resp).await;
        assert_eq!(body["error"]["code"], "token_expired");
        assert_eq!(body["error"]["type"], "authentication_error");
    }

    #[tokio::test]
    async fn test_backend_failure_surfaces_message() {
        let cause = anyhow::anyhow!("relation \"sephora_products\" does not exist");
        let resp = AppError::Backend(cause).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert_eq!(body["error"]["code"], "backend_failure");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("sephora_products"));
    }

    #[tokio::test]
    async fn test_not_found_keeps_message() {
        let resp = AppError::NotFound("product P1 not found".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = body_json(resp).await;
        assert_eq!(body["error"]["message"], "product P1 not found");
    }
}
