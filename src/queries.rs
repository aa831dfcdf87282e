//! The eight fixed analysis queries and their CSV export.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{Column, PgPool, Row, TypeInfo};
use tracing::info;

use crate::extract::snapshot::write_csv;
use crate::models::extraction::Table;

#[derive(Debug, Clone, Copy)]
pub struct FixedQuery {
    pub name: &'static str,
    pub file: &'static str,
    pub sql: &'static str,
}

pub const QUERIES: [FixedQuery; 8] = [
    FixedQuery {
        name: "q1",
        file: "q1_sephora_base.csv",
        sql: r#"
            SELECT product_id, product_name, brand_name, product_type, price_usd, rating
            FROM sephora_products
            ORDER BY brand_name ASC, product_name ASC
            LIMIT 100
        "#,
    },
    FixedQuery {
        name: "q2",
        file: "q2_produits_restreints.csv",
        sql: r#"
            SELECT product_id, product_name, brand_name, product_type,
                   price_usd, rating, restricted_ingredient_count, cmr_count
            FROM sephora_products
            WHERE has_restricted_ingredient
            ORDER BY restricted_ingredient_count DESC
            LIMIT 50
        "#,
    },
    FixedQuery {
        name: "q3",
        file: "q3_produits_risque_eleve.csv",
        sql: r#"
            SELECT product_id, product_name, brand_name, product_type,
                   price_usd, rating, restricted_ingredient_count, cmr_count
            FROM sephora_products
            WHERE has_cmr
              AND price_usd > 50
              AND rating IS NOT NULL
            ORDER BY cmr_count DESC, price_usd DESC
        "#,
    },
    FixedQuery {
        name: "q4",
        file: "q4_aggregation_par_type.csv",
        sql: r#"
            SELECT
                product_type,
                COUNT(*) AS total_products,
                ROUND(AVG(restricted_ingredient_count), 2)::float8 AS avg_restricted_ingredients,
                ROUND(AVG(cmr_count), 2)::float8 AS avg_cmr,
                COUNT(*) FILTER (WHERE has_restricted_ingredient) AS restricted_products,
                COUNT(*) FILTER (WHERE has_cmr) AS cmr_products,
                ROUND(100.0 * COUNT(*) FILTER (WHERE has_restricted_ingredient) / COUNT(*), 1)::float8
                    AS pct_restricted,
                ROUND(100.0 * COUNT(*) FILTER (WHERE has_cmr) / COUNT(*), 1)::float8 AS pct_cmr,
                MAX(restricted_ingredient_count) AS max_restricted_ingredients
            FROM sephora_products
            GROUP BY product_type
            HAVING COUNT(*) > 10
            ORDER BY pct_restricted DESC
        "#,
    },
    FixedQuery {
        name: "q5",
        file: "q5_top10_marques.csv",
        sql: r#"
            SELECT
                brand_name,
                COUNT(*) AS total_products,
                COUNT(*) FILTER (WHERE has_restricted_ingredient) AS restricted_products,
                COUNT(*) FILTER (WHERE has_cmr) AS cmr_products,
                ROUND(AVG(price_usd)::numeric, 2)::float8 AS avg_price
            FROM sephora_products
            GROUP BY brand_name
            HAVING COUNT(*) FILTER (WHERE has_restricted_ingredient) > 0
            ORDER BY restricted_products DESC
            LIMIT 10
        "#,
    },
    FixedQuery {
        name: "q6",
        file: "q6_jointure_sephora_skincare.csv",
        sql: r#"
            SELECT
                s.product_type,
                s.total_sephora,
                s.pct_restricted_sephora,
                s.avg_price_sephora,
                sk.total_skincare,
                sk.pct_restricted_skincare,
                sk.avg_price_skincare
            FROM (
                SELECT
                    product_type,
                    COUNT(*) AS total_sephora,
                    ROUND(100.0 * COUNT(*) FILTER (WHERE has_restricted_ingredient) / COUNT(*), 1)::float8
                        AS pct_restricted_sephora,
                    ROUND(AVG(price_usd)::numeric, 2)::float8 AS avg_price_sephora
                FROM sephora_products
                GROUP BY product_type
            ) s
            INNER JOIN (
                SELECT
                    product_type,
                    COUNT(*) AS total_skincare,
                    ROUND(100.0 * COUNT(*) FILTER (WHERE has_restricted_ingredient) / COUNT(*), 1)::float8
                        AS pct_restricted_skincare,
                    ROUND(AVG(price)::numeric, 2)::float8 AS avg_price_skincare
                FROM skincare_products
                GROUP BY product_type
            ) sk
            ON s.product_type = sk.product_type
            ORDER BY s.pct_restricted_sephora DESC
        "#,
    },
    FixedQuery {
        name: "q7",
        file: "q7_dessus_moyenne.csv",
        sql: r#"
            SELECT product_id, product_name, brand_name, product_type,
                   restricted_ingredient_count, cmr_count
            FROM sephora_products
            WHERE restricted_ingredient_count > (
                SELECT AVG(restricted_ingredient_count) FROM sephora_products
            )
            ORDER BY restricted_ingredient_count DESC
            LIMIT 30
        "#,
    },
    FixedQuery {
        name: "q8",
        file: "q8_skincare_cmr.csv",
        sql: r#"
            SELECT brand, product_name, product_type, price, rating,
                   restricted_ingredient_count, cmr_count
            FROM skincare_products
            WHERE has_cmr
            ORDER BY price DESC NULLS LAST
        "#,
    },
];

/// Runs every query in order and writes `{out_dir}/{file}`.
///
/// Stops at the first failing query; files already written are kept.
pub async fn run_all(pool: &PgPool, out_dir: &Path) -> anyhow::Result<Vec<(&'static str, usize)>> {
    fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let mut written = Vec::with_capacity(QUERIES.len());
    for query in QUERIES.iter() {
        let rows = sqlx::query(query.sql)
            .fetch_all(pool)
            .await
            .with_context(|| format!("query {} failed", query.name))?;
        let table = rows_to_table(&rows).with_context(|| format!("decoding {}", query.name))?;

        let path = out_dir.join(query.file);
        write_csv(&path, &table)?;
        info!(query = query.name, rows = table.len(), path = %path.display(), "query exported");
        written.push((query.file, table.len()));
    }
    Ok(written)
}

/// Headers come from the first row, so an empty result is an empty file.
fn rows_to_table(rows: &[PgRow]) -> anyhow::Result<Table> {
    let Some(first) = rows.first() else {
        return Ok(Table::empty());
    };

    let headers = first.columns().iter().map(|c| c.name().to_string()).collect();
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let mut cells = Vec::with_capacity(row.len());
        for idx in 0..row.len() {
            cells.push(cell(row, idx)?);
        }
        out.push(cells);
    }

    Ok(Table { headers, rows: out })
}

fn cell(row: &PgRow, idx: usize) -> anyhow::Result<String> {
    let column = &row.columns()[idx];
    let value = match column.type_info().name() {
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => row.try_get::<Option<String>, _>(idx)?,
        "INT2" => text(row.try_get::<Option<i16>, _>(idx)?),
        "INT4" => text(row.try_get::<Option<i32>, _>(idx)?),
        "INT8" => text(row.try_get::<Option<i64>, _>(idx)?),
        "FLOAT4" => text(row.try_get::<Option<f32>, _>(idx)?),
        "FLOAT8" => text(row.try_get::<Option<f64>, _>(idx)?),
        "BOOL" => text(row.try_get::<Option<bool>, _>(idx)?),
        "NUMERIC" => text(row.try_get::<Option<Decimal>, _>(idx)?),
        other => bail!("column {} has unsupported type {}", column.name(), other),
    };
    Ok(value.unwrap_or_default())
}

fn text<T: ToString>(v: Option<T>) -> Option<String> {
    v.map(|v| v.to_string())
}
