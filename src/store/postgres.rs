use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::query::{self, Page, ProductFilter};
use super::CatalogStore;
use crate::models::analytics::{BrandRisk, CategoryStats, TypeRisk};
use crate::models::product::{SephoraProduct, SkincareCmrProduct, SkincareProduct};

/// Types with this many products or fewer are left out of the type profile.
pub const MIN_PRODUCTS_PER_TYPE: i64 = 10;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run pending migrations from the migrations/ directory.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn category_stats(
        &self,
        table: &str,
        price_column: &str,
    ) -> anyhow::Result<Vec<CategoryStats>> {
        // identifiers come from the two constants below, never from a request
        let sql = format!(
            r#"
            SELECT
                product_type,
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE has_restricted_ingredient) AS restricted,
                COALESCE(SUM({price}), 0)::float8 AS price_sum,
                COUNT({price}) AS priced
            FROM {table}
            GROUP BY product_type
            "#,
            price = price_column,
            table = table,
        );
        let rows = sqlx::query_as::<_, CategoryStats>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn list_sephora(
        &self,
        filter: &ProductFilter,
        page: Page,
    ) -> anyhow::Result<Vec<SephoraProduct>> {
        let mut qb = query::sephora_products(filter, page).build();
        let rows = qb
            .build_query_as::<SephoraProduct>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_sephora(&self, product_id: &str) -> anyhow::Result<Option<SephoraProduct>> {
        let mut qb = query::sephora_by_id(product_id).build();
        let row = qb
            .build_query_as::<SephoraProduct>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn sephora_brand_risk(&self, limit: i64) -> anyhow::Result<Vec<BrandRisk>> {
        let rows = sqlx::query_as::<_, BrandRisk>(
            r#"
            SELECT
                brand_name,
                COUNT(*) AS total_products,
                COUNT(*) FILTER (WHERE has_restricted_ingredient) AS restricted_products,
                COUNT(*) FILTER (WHERE has_cmr) AS cmr_products,
                ROUND(AVG(price_usd)::numeric, 2)::float8 AS avg_price
            FROM sephora_products
            GROUP BY brand_name
            HAVING COUNT(*) FILTER (WHERE has_restricted_ingredient) > 0
            ORDER BY restricted_products DESC, brand_name ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn sephora_type_risk(&self) -> anyhow::Result<Vec<TypeRisk>> {
        let rows = sqlx::query_as::<_, TypeRisk>(
            r#"
            SELECT
                product_type,
                COUNT(*) AS total_products,
                ROUND(AVG(restricted_ingredient_count), 2)::float8 AS avg_restricted_ingredients,
                COUNT(*) FILTER (WHERE has_restricted_ingredient) AS restricted_products,
                COUNT(*) FILTER (WHERE has_cmr) AS cmr_products,
                ROUND(100.0 * COUNT(*) FILTER (WHERE has_restricted_ingredient) / COUNT(*), 1)::float8
                    AS pct_restricted,
                ROUND(100.0 * COUNT(*) FILTER (WHERE has_cmr) / COUNT(*), 1)::float8 AS pct_cmr
            FROM sephora_products
            GROUP BY product_type
            HAVING COUNT(*) > $1
            ORDER BY pct_restricted DESC, product_type ASC
            "#,
        )
        .bind(MIN_PRODUCTS_PER_TYPE)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_skincare(
        &self,
        filter: &ProductFilter,
        page: Page,
    ) -> anyhow::Result<Vec<SkincareProduct>> {
        let mut qb = query::skincare_products(filter, page).build();
        let rows = qb
            .build_query_as::<SkincareProduct>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn skincare_cmr(&self) -> anyhow::Result<Vec<SkincareCmrProduct>> {
        let mut qb = query::skincare_cmr().build();
        let rows = qb
            .build_query_as::<SkincareProduct>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(SkincareCmrProduct::from).collect())
    }

    async fn sephora_category_stats(&self) -> anyhow::Result<Vec<CategoryStats>> {
        self.category_stats(query::SEPHORA_TABLE, "price_usd").await
    }

    async fn skincare_category_stats(&self) -> anyhow::Result<Vec<CategoryStats>> {
        self.category_stats(query::SKINCARE_TABLE, "price").await
    }

    async fn all_sephora(&self) -> anyhow::Result<Vec<SephoraProduct>> {
        let rows = sqlx::query_as::<_, SephoraProduct>(
            r#"
            SELECT product_id, product_name, brand_name, product_type,
                   price_usd, rating, restricted_ingredient_count, cmr_count,
                   has_restricted_ingredient, has_cmr
            FROM sephora_products
            WHERE product_name IS NOT NULL
            ORDER BY product_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn all_skincare(&self) -> anyhow::Result<Vec<SkincareProduct>> {
        let rows = sqlx::query_as::<_, SkincareProduct>(
            r#"
            SELECT brand, product_name, product_type, price, rating,
                   restricted_ingredient_count, cmr_count,
                   has_restricted_ingredient, has_cmr
            FROM skincare_products
            WHERE product_name IS NOT NULL
            ORDER BY brand, product_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
