//! Parameterized SELECT construction for the catalog endpoints.
//!
//! Filters are accumulated as typed predicates and rendered through
//! `sqlx::QueryBuilder`, so every user-supplied value travels as a bound
//! parameter. A filter that is absent (or empty) contributes nothing to the
//! statement.

use sqlx::{Postgres, QueryBuilder};

pub const SEPHORA_TABLE: &str = "sephora_products";
pub const SKINCARE_TABLE: &str = "skincare_products";

pub const SEPHORA_COLUMNS: &[&str] = &[
    "product_id",
    "product_name",
    "brand_name",
    "product_type",
    "price_usd",
    "rating",
    "restricted_ingredient_count",
    "cmr_count",
    "has_restricted_ingredient",
    "has_cmr",
];

pub const SKINCARE_COLUMNS: &[&str] = &[
    "brand",
    "product_name",
    "product_type",
    "price",
    "rating",
    "restricted_ingredient_count",
    "cmr_count",
    "has_restricted_ingredient",
    "has_cmr",
];

/// product_id breaks ties so pages never overlap.
pub const SEPHORA_ORDER: &[&str] = &["brand_name ASC", "product_name ASC", "product_id ASC"];

/// Skincare rows have no key; ordering on every descriptive column keeps
/// pagination stable for all rows that are distinguishable at all.
pub const SKINCARE_ORDER: &[&str] = &[
    "brand ASC",
    "product_name ASC",
    "product_type ASC",
    "price ASC",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

/// Optional filters shared by both product listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Exact match on the product type.
    pub product_type: Option<String>,
    /// Case-insensitive substring match on the brand.
    pub brand: Option<String>,
}

impl ProductFilter {
    pub fn new(product_type: Option<String>, brand: Option<String>) -> Self {
        Self {
            product_type: product_type.filter(|s| !s.is_empty()),
            brand: brand.filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Equals { column: &'static str, value: String },
    Contains { column: &'static str, value: String },
    IsTrue { column: &'static str },
}

#[derive(Debug, Clone)]
pub struct Select {
    table: &'static str,
    columns: &'static [&'static str],
    predicates: Vec<Predicate>,
    order_by: &'static [&'static str],
    page: Option<Page>,
}

impl Select {
    pub fn from(table: &'static str, columns: &'static [&'static str]) -> Self {
        Self {
            table,
            columns,
            predicates: Vec::new(),
            order_by: &[],
            page: None,
        }
    }

    pub fn filter_eq(mut self, column: &'static str, value: Option<&str>) -> Self {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            self.predicates.push(Predicate::Equals {
                column,
                value: v.to_string(),
            });
        }
        self
    }

    pub fn filter_contains(mut self, column: &'static str, value: Option<&str>) -> Self {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            self.predicates.push(Predicate::Contains {
                column,
                value: v.to_string(),
            });
        }
        self
    }

    pub fn filter_true(mut self, column: &'static str) -> Self {
        self.predicates.push(Predicate::IsTrue { column });
        self
    }

    pub fn order_by(mut self, keys: &'static [&'static str]) -> Self {
        self.order_by = keys;
        self
    }

    pub fn paginate(mut self, page: Page) -> Self {
        self.page = Some(page);
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn build(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(self.columns.join(", "));
        qb.push(" FROM ");
        qb.push(self.table);

        for (i, predicate) in self.predicates.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            match predicate {
                Predicate::Equals { column, value } => {
                    qb.push(*column).push(" = ").push_bind(value.clone());
                }
                Predicate::Contains { column, value } => {
                    qb.push(*column)
                        .push(" ILIKE ")
                        .push_bind(format!("%{}%", escape_like(value)));
                }
                Predicate::IsTrue { column } => {
                    qb.push(*column);
                }
            }
        }

        if !self.order_by.is_empty() {
            qb.push(" ORDER BY ");
            qb.push(self.order_by.join(", "));
        }

        if let Some(page) = self.page {
            qb.push(" LIMIT ").push_bind(page.limit);
            qb.push(" OFFSET ").push_bind(page.offset);
        }

        qb
    }
}

/// Escapes LIKE metacharacters so user input only ever matches literally.
pub fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub fn sephora_products(filter: &ProductFilter, page: Page) -> Select {
    Select::from(SEPHORA_TABLE, SEPHORA_COLUMNS)
        .filter_eq("product_type", filter.product_type.as_deref())
        .filter_contains("brand_name", filter.brand.as_deref())
        .order_by(SEPHORA_ORDER)
        .paginate(page)
}

pub fn sephora_by_id(product_id: &str) -> Select {
    // an empty id must still constrain the lookup
    let mut select = Select::from(SEPHORA_TABLE, SEPHORA_COLUMNS);
    select.predicates.push(Predicate::Equals {
        column: "product_id",
        value: product_id.to_string(),
    });
    select
}

pub fn skincare_products(filter: &ProductFilter, page: Page) -> Select {
    Select::from(SKINCARE_TABLE, SKINCARE_COLUMNS)
        .filter_eq("product_type", filter.product_type.as_deref())
        .filter_contains("brand", filter.brand.as_deref())
        .order_by(SKINCARE_ORDER)
        .paginate(page)
}

pub fn skincare_cmr() -> Select {
    Select::from(SKINCARE_TABLE, SKINCARE_COLUMNS)
        .filter_true("has_cmr")
        .order_by(&["price DESC NULLS LAST", "brand ASC", "product_name ASC"])
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: Page = Page {
        limit: 50,
        offset: 0,
    };

    #[test]
    fn test_no_filters_means_no_where_clause() {
        let select = sephora_products(&ProductFilter::default(), PAGE);
        let qb = select.build();
        let sql = qb.sql();
        assert!(!sql.contains("WHERE"), "{}", sql);
        assert!(sql.ends_with(
            "ORDER BY brand_name ASC, product_name ASC, product_id ASC LIMIT $1 OFFSET $2"
        ));
    }

    #[test]
    fn test_only_present_filters_are_rendered() {
        let filter = ProductFilter::new(None, Some("dior".into()));
        let qb = sephora_products(&filter, PAGE).build();
        let sql = qb.sql();
        assert!(sql.contains(" WHERE brand_name ILIKE $1 "), "{}", sql);
        assert!(!sql.contains("product_type ="), "{}", sql);
        assert!(sql.contains("LIMIT $2 OFFSET $3"));
    }

    #[test]
    fn test_both_filters_bound_in_order() {
        let filter = ProductFilter::new(Some("Skincare".into()), Some("dior".into()));
        let select = sephora_products(&filter, PAGE);
        assert_eq!(
            select.predicates(),
            &[
                Predicate::Equals {
                    column: "product_type",
                    value: "Skincare".into()
                },
                Predicate::Contains {
                    column: "brand_name",
                    value: "dior".into()
                },
            ]
        );
        let qb = select.build();
        assert!(qb
            .sql()
            .contains("WHERE product_type = $1 AND brand_name ILIKE $2"));
    }

    #[test]
    fn test_empty_filters_are_treated_as_absent() {
        let filter = ProductFilter::new(Some(String::new()), Some(String::new()));
        assert_eq!(filter, ProductFilter::default());
        assert!(skincare_products(&filter, PAGE).predicates().is_empty());
    }

    #[test]
    fn test_user_input_never_reaches_sql_text() {
        let filter = ProductFilter::new(Some("x'; DROP TABLE sephora_products; --".into()), None);
        let qb = sephora_products(&filter, PAGE).build();
        assert!(!qb.sql().contains("DROP"));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_pure\\"), "100\\%\\_pure\\\\");
        assert_eq!(escape_like("dior"), "dior");
    }

    #[test]
    fn test_skincare_uses_its_own_columns() {
        let filter = ProductFilter::new(Some("Moisturizer".into()), Some("la mer".into()));
        let qb = skincare_products(&filter, PAGE).build();
        let sql = qb.sql();
        assert!(sql.starts_with("SELECT brand, product_name, product_type, price"));
        assert!(sql.contains("FROM skincare_products WHERE product_type = $1 AND brand ILIKE $2"));
        assert!(sql.contains("ORDER BY brand ASC, product_name ASC"));
    }

    #[test]
    fn test_lookup_by_id_always_constrains() {
        let qb = sephora_by_id("").build();
        assert!(qb.sql().ends_with("FROM sephora_products WHERE product_id = $1"));
    }

    #[test]
    fn test_cmr_listing() {
        let qb = skincare_cmr().build();
        let sql = qb.sql();
        assert!(sql.contains("WHERE has_cmr ORDER BY price DESC NULLS LAST"));
        assert!(!sql.contains("LIMIT"));
    }
}
