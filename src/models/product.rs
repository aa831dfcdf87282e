use serde::{Deserialize, Serialize};

/// A row of `sephora_products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SephoraProduct {
    pub product_id: String,
    pub product_name: Option<String>,
    pub brand_name: Option<String>,
    pub product_type: Option<String>,
    pub price_usd: Option<f64>,
    pub rating: Option<f64>,
    pub restricted_ingredient_count: i32,
    pub cmr_count: i32,
    pub has_restricted_ingredient: bool,
    pub has_cmr: bool,
}

/// A row of `skincare_products`. Keyed loosely by brand + name; not unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SkincareProduct {
    pub brand: Option<String>,
    pub product_name: Option<String>,
    pub product_type: Option<String>,
    pub price: Option<f64>,
    pub rating: Option<f64>,
    pub restricted_ingredient_count: i32,
    pub cmr_count: i32,
    pub has_restricted_ingredient: bool,
    pub has_cmr: bool,
}

/// Projection returned by `GET /api/skincare/cmr`; the flags are implied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SkincareCmrProduct {
    pub brand: Option<String>,
    pub product_name: Option<String>,
    pub product_type: Option<String>,
    pub price: Option<f64>,
    pub rating: Option<f64>,
    pub restricted_ingredient_count: i32,
    pub cmr_count: i32,
}

impl From<SkincareProduct> for SkincareCmrProduct {
    fn from(p: SkincareProduct) -> Self {
        Self {
            brand: p.brand,
            product_name: p.product_name,
            product_type: p.product_type,
            price: p.price,
            rating: p.rating,
            restricted_ingredient_count: p.restricted_ingredient_count,
            cmr_count: p.cmr_count,
        }
    }
}
