//! Query-string parsing shared by the list endpoints.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::store::{Page, ProductFilter};

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const DEFAULT_BRAND_LIMIT: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 1000;

/// Raw list parameters. Numbers stay strings here so a bad value becomes a
/// JSON 400 instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    pub brand: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<String>,
}

impl ListParams {
    pub fn page(&self) -> Result<Page, AppError> {
        Ok(Page {
            limit: parse_limit(self.limit.as_deref(), DEFAULT_PAGE_SIZE)?,
            offset: parse_count("offset", self.offset.as_deref(), 0)?,
        })
    }

    pub fn filter(&self) -> ProductFilter {
        ProductFilter::new(self.product_type.clone(), self.brand.clone())
    }
}

/// Parses a limit, applying the default and capping at [`MAX_PAGE_SIZE`].
pub fn parse_limit(raw: Option<&str>, default: i64) -> Result<i64, AppError> {
    Ok(parse_count("limit", raw, default)?.min(MAX_PAGE_SIZE))
}

fn parse_count(name: &str, raw: Option<&str>, default: i64) -> Result<i64, AppError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(default),
        Some(v) => v,
    };
    match raw.parse::<i64>() {
        Ok(n) if n >= 0 => Ok(n),
        _ => Err(AppError::BadRequest(format!(
            "'{}' must be a non-negative integer, got '{}'",
            name, raw
        ))),
    }
}

/// `{data, count, limit, offset}`
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub data: Vec<T>,
    pub count: usize,
    pub limit: i64,
    pub offset: i64,
}

impl<T> PageResponse<T> {
    pub fn new(data: Vec<T>, page: Page) -> Self {
        Self {
            count: data.len(),
            data,
            limit: page.limit,
            offset: page.offset,
        }
    }
}

/// `{data, count}`
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub count: usize,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(data: Vec<T>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}

/// `{data}`
#[derive(Debug, Serialize)]
pub struct ItemResponse<T> {
    pub data: T,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(limit: Option<&str>, offset: Option<&str>) -> ListParams {
        ListParams {
            limit: limit.map(String::from),
            offset: offset.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let page = params(None, None).page().unwrap();
        assert_eq!(page, Page { limit: 50, offset: 0 });
        let page = params(Some(""), Some(" ")).page().unwrap();
        assert_eq!(page, Page { limit: 50, offset: 0 });
    }

    #[test]
    fn test_explicit_values_and_cap() {
        assert_eq!(
            params(Some("2"), Some("10")).page().unwrap(),
            Page { limit: 2, offset: 10 }
        );
        assert_eq!(params(Some("99999"), None).page().unwrap().limit, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_non_numeric_is_client_error() {
        let cases = [
            (Some("abc"), None),
            (None, Some("1.5")),
            (Some("-1"), None),
            (None, Some("-3")),
        ];
        for (l, o) in cases {
            assert!(matches!(params(l, o).page(), Err(AppError::BadRequest(_))));
        }
    }

    #[test]
    fn test_brand_limit_default() {
        assert_eq!(parse_limit(None, DEFAULT_BRAND_LIMIT).unwrap(), 10);
    }
}
