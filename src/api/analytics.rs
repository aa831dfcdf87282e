use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use super::params::{parse_limit, LimitParams, ListResponse, DEFAULT_BRAND_LIMIT};
use crate::categories;
use crate::errors::AppError;
use crate::models::analytics::{BrandRisk, CatalogComparison, TypeRisk};
use crate::AppState;

/// GET /api/sephora/brands: brands ranked by number of restricted products
pub async fn get_brand_risk(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> Result<Json<ListResponse<BrandRisk>>, AppError> {
    let limit = parse_limit(params.limit.as_deref(), DEFAULT_BRAND_LIMIT)?;
    let rows = state.catalog.sephora_brand_risk(limit).await?;
    Ok(Json(rows.into()))
}

/// GET /api/sephora/by-type: restricted / CMR share per product type
pub async fn get_type_risk(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListResponse<TypeRisk>>, AppError> {
    let rows = state.catalog.sephora_type_risk().await?;
    Ok(Json(rows.into()))
}

/// GET /api/comparaison: Sephora vs Skincare per (coarse) category
pub async fn get_comparison(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListResponse<CatalogComparison>>, AppError> {
    let (sephora, skincare) = tokio::try_join!(
        state.catalog.sephora_category_stats(),
        state.catalog.skincare_category_stats(),
    )?;

    let rows = categories::compare(&sephora, &skincare);
    tracing::debug!(categories = rows.len(), "catalog comparison computed");
    Ok(Json(rows.into()))
}
