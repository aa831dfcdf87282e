//! Records produced by the extraction job and their tabular shape.

use serde::{Deserialize, Serialize};

use super::product::{SephoraProduct, SkincareProduct};

/// A record that can be flattened into a CSV row with a fixed header.
pub trait Tabular {
    fn headers() -> &'static [&'static str];
    fn row(&self) -> Vec<String>;
}

/// A product normalized from the Open Beauty Facts search API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiProduct {
    pub product_name: String,
    pub brand: String,
    pub ingredients_text: String,
    pub categories: String,
    pub country: String,
    pub barcode: String,
    pub source: String,
}

/// An ingredient candidate scraped from a reference page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedIngredient {
    pub ingredient: String,
    pub wikipedia_link: String,
    pub description: String,
    pub source: String,
}

/// Header plus string rows; the common shape every source is persisted in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_records<T: Tabular>(records: &[T]) -> Self {
        Self {
            headers: T::headers().iter().map(|h| h.to_string()).collect(),
            rows: records.iter().map(Tabular::row).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn opt<T: ToString>(v: &Option<T>) -> String {
    v.as_ref().map(ToString::to_string).unwrap_or_default()
}

impl Tabular for ApiProduct {
    fn headers() -> &'static [&'static str] {
        &[
            "product_name",
            "brand",
            "ingredients_text",
            "categories",
            "country",
            "barcode",
            "source",
        ]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.product_name.clone(),
            self.brand.clone(),
            self.ingredients_text.clone(),
            self.categories.clone(),
            self.country.clone(),
            self.barcode.clone(),
            self.source.clone(),
        ]
    }
}

impl Tabular for ScrapedIngredient {
    fn headers() -> &'static [&'static str] {
        &["ingredient", "wikipedia_link", "description", "source"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.ingredient.clone(),
            self.wikipedia_link.clone(),
            self.description.clone(),
            self.source.clone(),
        ]
    }
}

impl Tabular for SephoraProduct {
    fn headers() -> &'static [&'static str] {
        &[
            "product_id",
            "product_name",
            "brand_name",
            "product_type",
            "price_usd",
            "rating",
            "has_restricted_ingredient",
            "has_cmr",
            "restricted_ingredient_count",
            "cmr_count",
        ]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.product_id.clone(),
            opt(&self.product_name),
            opt(&self.brand_name),
            opt(&self.product_type),
            opt(&self.price_usd),
            opt(&self.rating),
            self.has_restricted_ingredient.to_string(),
            self.has_cmr.to_string(),
            self.restricted_ingredient_count.to_string(),
            self.cmr_count.to_string(),
        ]
    }
}

impl Tabular for SkincareProduct {
    fn headers() -> &'static [&'static str] {
        &[
            "brand",
            "product_name",
            "product_type",
            "price",
            "rating",
            "has_restricted_ingredient",
            "has_cmr",
            "restricted_ingredient_count",
            "cmr_count",
        ]
    }

    fn row(&self) -> Vec<String> {
        vec![
            opt(&self.brand),
            opt(&self.product_name),
            opt(&self.product_type),
            opt(&self.price),
            opt(&self.rating),
            self.has_restricted_ingredient.to_string(),
            self.has_cmr.to_string(),
            self.restricted_ingredient_count.to_string(),
            self.cmr_count.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_from_records_keeps_header_order() {
        let rows = vec![ScrapedIngredient {
            ingredient: "GLYCERIN".into(),
            wikipedia_link: "https://en.wikipedia.org/wiki/Glycerol".into(),
            description: "Humectants".into(),
            source: "wikipedia_scraping".into(),
        }];
        let table = Table::from_records(&rows);
        assert_eq!(table.headers, ["ingredient", "wikipedia_link", "description", "source"]);
        assert_eq!(table.rows[0][0], "GLYCERIN");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_missing_values_become_empty_cells() {
        let p = SkincareProduct {
            brand: Some("CLINIQUE".into()),
            product_name: None,
            product_type: Some("Moisturizer".into()),
            price: None,
            rating: Some(4.5),
            restricted_ingredient_count: 1,
            cmr_count: 0,
            has_restricted_ingredient: true,
            has_cmr: false,
        };
        let row = p.row();
        assert_eq!(row.len(), SkincareProduct::headers().len());
        assert_eq!(row[1], "");
        assert_eq!(row[3], "");
        assert_eq!(row[4], "4.5");
        assert_eq!(row[5], "true");
    }
}
