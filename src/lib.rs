//! Cosmetics regulatory analysis library.
//!
//! Hosts the REST API, the extraction job and the fixed query runner; the
//! `cosmetics` binary only wires configuration and the CLI around them.

use std::sync::Arc;

pub mod api;
pub mod categories;
pub mod config;
pub mod errors;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod queries;
pub mod store;
pub mod tokens;

use store::CatalogStore;
use tokens::TokenStore;

/// Shared application state passed to handlers and middleware.
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub tokens: TokenStore,
}

impl AppState {
    pub fn new(catalog: Arc<dyn CatalogStore>, tokens: TokenStore) -> Arc<Self> {
        Arc::new(Self { catalog, tokens })
    }
}
