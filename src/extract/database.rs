//! Snapshot of the two catalog tables already loaded in the database.

use tracing::{error, info};

use crate::models::extraction::Table;
use crate::store::postgres::PgStore;
use crate::store::CatalogStore;

pub const OUTPUTS: &[&str] = &["db_sephora", "db_skincare"];

/// Connection failure yields two empty tables; the rest of the job carries on.
pub async fn extract_tables(
    database_url: &str,
    max_connections: u32,
) -> Vec<(&'static str, Table)> {
    info!("source 4: database");

    let store = match PgStore::connect(database_url, max_connections).await {
        Ok(store) => store,
        Err(e) => {
            error!("database connection failed: {:#}", e);
            return OUTPUTS.iter().map(|name| (*name, Table::empty())).collect();
        }
    };
    info!("database connection established");

    let tables = extract_from(&store).await;
    store.pool().close().await;
    tables
}

/// Reads both tables independently: one failing does not empty the other.
pub async fn extract_from(store: &dyn CatalogStore) -> Vec<(&'static str, Table)> {
    let sephora = match store.all_sephora().await {
        Ok(rows) => {
            info!(rows = rows.len(), "sephora_products read");
            Table::from_records(&rows)
        }
        Err(e) => {
            error!("reading sephora_products failed: {:#}", e);
            Table::empty()
        }
    };

    let skincare = match store.all_skincare().await {
        Ok(rows) => {
            info!(rows = rows.len(), "skincare_products read");
            Table::from_records(&rows)
        }
        Err(e) => {
            error!("reading skincare_products failed: {:#}", e);
            Table::empty()
        }
    };

    vec![("db_sephora", sephora), ("db_skincare", skincare)]
}
