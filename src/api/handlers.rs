use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::params::{ItemResponse, ListParams, ListResponse, PageResponse};
use crate::errors::AppError;
use crate::models::product::{SephoraProduct, SkincareCmrProduct, SkincareProduct};
use crate::AppState;

/// GET /api/sephora/products: paginated, optionally filtered by type and brand
pub async fn list_sephora_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<PageResponse<SephoraProduct>>, AppError> {
    let page = params.page()?;
    let filter = params.filter();

    let rows = state.catalog.list_sephora(&filter, page).await?;
    Ok(Json(PageResponse::new(rows, page)))
}

/// GET /api/sephora/products/:id: a single Sephora product
pub async fn get_sephora_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<String>,
) -> Result<Json<ItemResponse<SephoraProduct>>, AppError> {
    let product = state
        .catalog
        .get_sephora(&product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {} not found", product_id)))?;

    Ok(Json(ItemResponse { data: product }))
}

/// GET /api/skincare/products: paginated, optionally filtered by type and brand
pub async fn list_skincare_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<PageResponse<SkincareProduct>>, AppError> {
    let page = params.page()?;
    let filter = params.filter();

    let rows = state.catalog.list_skincare(&filter, page).await?;
    Ok(Json(PageResponse::new(rows, page)))
}

/// GET /api/skincare/cmr: Skincare products containing a CMR ingredient, priciest first
pub async fn list_skincare_cmr(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListResponse<SkincareCmrProduct>>, AppError> {
    let rows = state.catalog.skincare_cmr().await?;
    Ok(Json(rows.into()))
}
