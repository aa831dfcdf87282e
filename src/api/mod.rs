use std::sync::Arc;

use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::errors::AppError;
use crate::middleware::{auth::require_auth, headers};
use crate::AppState;

pub mod analytics;
pub mod auth;
pub mod docs;
pub mod handlers;
pub mod params;

/// Catalog routes. Every one of them sits behind the bearer token gate.
pub fn api_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/sephora/products", get(handlers::list_sephora_products))
        .route("/sephora/products/:id", get(handlers::get_sephora_product))
        .route("/sephora/brands", get(analytics::get_brand_risk))
        .route("/sephora/by-type", get(analytics::get_type_risk))
        .route("/skincare/products", get(handlers::list_skincare_products))
        .route("/skincare/cmr", get(handlers::list_skincare_cmr))
        .route("/comparaison", get(analytics::get_comparison))
        .layer(middleware::from_fn_with_state(state, require_auth))
}

/// The complete application: public auth, health and docs routes, the gated `/api`
/// tree and the cross-cutting layers.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/auth/token", post(auth::issue_token))
        .route("/swagger", get(docs::openapi))
        .nest("/api", api_router(state.clone()))
        .fallback(fallback_404)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(middleware::from_fn(headers::request_id))
        .layer(middleware::from_fn(headers::security_headers))
}

async fn fallback_404() -> AppError {
    AppError::NotFound("no such route".into())
}
