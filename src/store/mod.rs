//! Catalog persistence.
//!
//! Handlers only see the [`CatalogStore`] trait; [`postgres::PgStore`] is the
//! production implementation.

use async_trait::async_trait;

use crate::models::analytics::{BrandRisk, CategoryStats, TypeRisk};
use crate::models::product::{SephoraProduct, SkincareCmrProduct, SkincareProduct};

pub mod postgres;
pub mod query;

pub use query::{Page, ProductFilter};

/// Read-only access to the two product tables.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_sephora(
        &self,
        filter: &ProductFilter,
        page: Page,
    ) -> anyhow::Result<Vec<SephoraProduct>>;

    async fn get_sephora(&self, product_id: &str) -> anyhow::Result<Option<SephoraProduct>>;

    /// Brands with at least one restricted product, most exposed first.
    async fn sephora_brand_risk(&self, limit: i64) -> anyhow::Result<Vec<BrandRisk>>;

    /// Per-type risk profile for types with more than ten products.
    async fn sephora_type_risk(&self) -> anyhow::Result<Vec<TypeRisk>>;

    async fn list_skincare(
        &self,
        filter: &ProductFilter,
        page: Page,
    ) -> anyhow::Result<Vec<SkincareProduct>>;

    async fn skincare_cmr(&self) -> anyhow::Result<Vec<SkincareCmrProduct>>;

    async fn sephora_category_stats(&self) -> anyhow::Result<Vec<CategoryStats>>;

    async fn skincare_category_stats(&self) -> anyhow::Result<Vec<CategoryStats>>;

    /// Full, unpaginated dumps used by the extraction job.
    async fn all_sephora(&self) -> anyhow::Result<Vec<SephoraProduct>>;

    async fn all_skincare(&self) -> anyhow::Result<Vec<SkincareProduct>>;
}
