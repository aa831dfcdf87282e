//! Ingredient candidates scraped from the "Common ingredients" section of a
//! Wikipedia article.

use std::collections::HashSet;

use scraper::{ElementRef, Html};
use tracing::{debug, error, info, warn};

use crate::models::extraction::ScrapedIngredient;

pub const OUTPUTS: &[&str] = &["scraping_wikipedia_cosmetics"];
pub const SOURCE: &str = "wikipedia_scraping";
const SECTION_ID: &str = "Common_ingredients";
const DESCRIPTION_CHARS: usize = 200;
const MIN_NAME_CHARS: usize = 3;
const BROWSER_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) ",
    "AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36"
);

pub async fn scrape_ingredients(client: &reqwest::Client, url: &str) -> Vec<ScrapedIngredient> {
    info!(url, "source 3: web scraping");

    let html = match fetch_html(client, url).await {
        Ok(html) => html,
        Err(e) if e.is_timeout() => {
            warn!("timeout while fetching page");
            return Vec::new();
        }
        Err(e) => {
            error!("failed to fetch page: {}", e);
            return Vec::new();
        }
    };
    info!(bytes = html.len(), "page fetched");

    let origin = match reqwest::Url::parse(url) {
        Ok(u) => u.origin().ascii_serialization(),
        Err(e) => {
            error!("invalid scrape URL: {}", e);
            return Vec::new();
        }
    };

    let ingredients = parse_common_ingredients(&html, &origin);
    info!(rows = ingredients.len(), "scraping finished");
    ingredients
}

async fn fetch_html(client: &reqwest::Client, url: &str) -> Result<String, reqwest::Error> {
    client
        .get(url)
        .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await
}

/// Collects linked article names from the paragraphs that follow the
/// `Common_ingredients` heading, up to the next level-2 section.
///
/// Links are resolved against `origin`. The first occurrence of a name wins.
pub fn parse_common_ingredients(html: &str, origin: &str) -> Vec<ScrapedIngredient> {
    let document = Html::parse_document(html);

    let Some(heading) = document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "h2" && e.value().id() == Some(SECTION_ID))
    else {
        warn!("section {} not found", SECTION_ID);
        return Vec::new();
    };

    // Current markup wraps the h2 in a div.mw-heading2; older markup does not.
    let marker = heading
        .parent()
        .and_then(ElementRef::wrap)
        .filter(is_heading_wrapper)
        .unwrap_or(heading);

    let mut seen = HashSet::new();
    let mut ingredients = Vec::new();

    for sibling in marker.next_siblings().filter_map(ElementRef::wrap) {
        if is_heading_wrapper(&sibling) || sibling.value().name() == "h2" {
            debug!("reached next section");
            break;
        }
        if sibling.value().name() != "p" {
            continue;
        }

        let description: String = stripped_text(&sibling)
            .chars()
            .take(DESCRIPTION_CHARS)
            .collect();

        let links = sibling
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|e| e.value().name() == "a");
        for link in links {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            if !href.starts_with("/wiki/") || href.starts_with("/wiki/Special:") {
                continue;
            }
            let name = stripped_text(&link);
            if name.chars().count() < MIN_NAME_CHARS {
                continue;
            }
            let ingredient = name.to_uppercase();
            if !seen.insert(ingredient.clone()) {
                continue;
            }
            ingredients.push(ScrapedIngredient {
                ingredient,
                wikipedia_link: format!("{}{}", origin, href),
                description: description.clone(),
                source: SOURCE.to_string(),
            });
        }
    }

    ingredients
}

fn is_heading_wrapper(e: &ElementRef<'_>) -> bool {
    e.value().name() == "div" && e.value().classes().any(|c| c == "mw-heading2")
}

/// Text nodes trimmed and concatenated, whitespace-only nodes dropped.
fn stripped_text(e: &ElementRef<'_>) -> String {
    e.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
