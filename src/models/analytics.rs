use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BrandRisk {
    pub brand_name: Option<String>,
    pub total_products: i64,
    pub restricted_products: i64,
    pub cmr_products: i64,
    pub avg_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TypeRisk {
    pub product_type: Option<String>,
    pub total_products: i64,
    pub avg_restricted_ingredients: Option<f64>,
    pub restricted_products: i64,
    pub cmr_products: i64,
    pub pct_restricted: f64,
    pub pct_cmr: f64,
}

/// Raw per-category counters, summable across categories.
///
/// Percentages and averages are derived only after categories are merged,
/// so two fine-grained groups folded into one coarse category stay exact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CategoryStats {
    pub product_type: Option<String>,
    pub total: i64,
    pub restricted: i64,
    pub price_sum: f64,
    pub priced: i64,
}

/// One row of `GET /api/comparaison`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogComparison {
    pub category: String,
    pub total_sephora: i64,
    pub pct_restricted_sephora: f64,
    pub avg_price_sephora: Option<f64>,
    pub total_skincare: i64,
    pub pct_restricted_skincare: f64,
    pub avg_price_skincare: Option<f64>,
}
