//! Paginated product search against the Open Beauty Facts API.

use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::models::extraction::ApiProduct;

pub const OUTPUTS: &[&str] = &["api_open_beauty_facts"];
pub const SOURCE: &str = "open_beauty_facts_api";
pub const PAGE_SIZE: u32 = 25;
const USER_AGENT: &str = "Cosmetics-Regulatory-Project/1.0 (educational)";

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    products: Vec<Value>,
}

/// Walks pages `1..=max_pages`, stopping early on an empty page.
///
/// Timeouts, HTTP error statuses and undecodable bodies skip the page.
/// Any other transport error ends pagination; what was collected so far is
/// still returned.
pub async fn fetch_products(
    client: &reqwest::Client,
    url: &str,
    max_pages: u32,
) -> Vec<ApiProduct> {
    info!(url, max_pages, "source 2: remote API");
    let mut products = Vec::new();

    for page in 1..=max_pages {
        info!(page, max_pages, "requesting page");
        match fetch_page(client, url, page).await {
            Ok(batch) if batch.is_empty() => {
                info!(page, "no more products, stopping");
                break;
            }
            Ok(batch) => {
                info!(page, count = batch.len(), "page fetched");
                products.extend(batch.iter().map(normalize));
            }
            Err(e) if e.is_timeout() => {
                warn!(page, "timeout, skipping page");
            }
            Err(e) if e.is_status() => {
                error!(page, "HTTP error, skipping page: {}", e);
            }
            Err(e) if e.is_decode() => {
                error!(page, "invalid JSON body, skipping page: {}", e);
            }
            Err(e) => {
                error!(page, "network error, aborting pagination: {}", e);
                break;
            }
        }
    }

    info!(rows = products.len(), "remote API extraction finished");
    products
}

async fn fetch_page(
    client: &reqwest::Client,
    url: &str,
    page: u32,
) -> Result<Vec<Value>, reqwest::Error> {
    let page = page.to_string();
    let count = PAGE_SIZE.to_string();
    let body: SearchPage = client
        .get(url)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .query(&[
            ("search_terms", "cosmetics"),
            ("search_simple", "1"),
            ("action", "process"),
            ("json", "1"),
            ("page", page.as_str()),
            ("count", count.as_str()),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(body.products)
}

fn normalize(product: &Value) -> ApiProduct {
    ApiProduct {
        product_name: field(product, "product_name"),
        brand: field(product, "brands"),
        ingredients_text: field(product, "ingredients_text"),
        categories: field(product, "categories"),
        country: field(product, "countries"),
        barcode: field(product, "code"),
        source: SOURCE.to_string(),
    }
}

/// Missing and null fields become empty strings; non-strings keep their JSON text.
fn field(product: &Value, key: &str) -> String {
    match product.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
