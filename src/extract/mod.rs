//! Batch extraction from the four raw sources.
//!
//! Every source runs as its own task. A source that fails, or whose task
//! panics, contributes empty tables; the job itself always runs to the end
//! and reports row counts per output. Non-empty outputs are written to the
//! raw data directory as timestamped CSV snapshots.

pub mod database;
pub mod files;
pub mod remote;
pub mod scrape;
pub mod snapshot;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::extraction::Table;

type Outputs = Vec<(&'static str, Table)>;

/// One source running in the background, with the names of the tables it
/// is expected to produce.
pub struct SourceTask {
    label: &'static str,
    outputs: &'static [&'static str],
    handle: JoinHandle<Outputs>,
}

impl SourceTask {
    pub fn spawn<F>(label: &'static str, outputs: &'static [&'static str], fut: F) -> Self
    where
        F: Future<Output = Outputs> + Send + 'static,
    {
        Self {
            label,
            outputs,
            handle: tokio::spawn(fut),
        }
    }

    pub fn spawn_blocking<F>(label: &'static str, outputs: &'static [&'static str], f: F) -> Self
    where
        F: FnOnce() -> Outputs + Send + 'static,
    {
        Self {
            label,
            outputs,
            handle: tokio::task::spawn_blocking(f),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub output: &'static str,
    pub rows: usize,
    pub saved_to: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    pub entries: Vec<ReportEntry>,
    pub elapsed: Duration,
}

impl ExtractionReport {
    pub fn rows(&self, output: &str) -> Option<usize> {
        self.entries.iter().find(|e| e.output == output).map(|e| e.rows)
    }

    pub fn total_rows(&self) -> usize {
        self.entries.iter().map(|e| e.rows).sum()
    }

    pub fn log(&self) {
        info!("extraction report");
        for entry in &self.entries {
            if entry.rows > 0 {
                info!(output = entry.output, rows = entry.rows, "extracted");
            } else {
                warn!(output = entry.output, "no data");
            }
        }
        info!(
            total_rows = self.total_rows(),
            elapsed_secs = self.elapsed.as_secs_f64(),
            "extraction finished"
        );
    }
}

/// Runs all four sources concurrently and snapshots their outputs.
pub async fn run(cfg: &Config) -> anyhow::Result<ExtractionReport> {
    info!(raw_dir = %cfg.paths.raw_dir.display(), "extraction started");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(cfg.extract.http_timeout_secs))
        .build()
        .context("building HTTP client")?;

    let extract_cfg = cfg.extract.clone();
    let local = SourceTask::spawn_blocking("local_files", files::OUTPUTS, move || {
        files::extract_files(&extract_cfg)
    });

    let api = {
        let client = client.clone();
        let url = cfg.extract.open_beauty_facts_url.clone();
        let max_pages = cfg.extract.api_max_pages;
        SourceTask::spawn("remote_api", remote::OUTPUTS, async move {
            let products = remote::fetch_products(&client, &url, max_pages).await;
            vec![(remote::OUTPUTS[0], Table::from_records(&products))]
        })
    };

    let web = {
        let url = cfg.extract.scrape_url.clone();
        SourceTask::spawn("web_scraping", scrape::OUTPUTS, async move {
            let ingredients = scrape::scrape_ingredients(&client, &url).await;
            vec![(scrape::OUTPUTS[0], Table::from_records(&ingredients))]
        })
    };

    let db = {
        let url = cfg.database_url.clone();
        let max_connections = cfg.db_max_connections;
        SourceTask::spawn("database", database::OUTPUTS, async move {
            database::extract_tables(&url, max_connections).await
        })
    };

    Ok(supervise(&cfg.paths.raw_dir, vec![local, api, web, db]).await)
}

/// Waits for every task and saves what each produced.
pub async fn supervise(raw_dir: &Path, tasks: Vec<SourceTask>) -> ExtractionReport {
    let started = Instant::now();
    let mut entries = Vec::new();

    for task in tasks {
        let outputs = match task.handle.await {
            Ok(outputs) => outputs,
            Err(e) => {
                error!(source = task.label, "source task failed: {}", e);
                task.outputs.iter().map(|name| (*name, Table::empty())).collect()
            }
        };

        for (output, table) in outputs {
            let saved_to = match snapshot::save_if_non_empty(raw_dir, output, &table) {
                Ok(path) => path,
                Err(e) => {
                    error!(output, "saving snapshot failed: {:#}", e);
                    None
                }
            };
            entries.push(ReportEntry {
                output,
                rows: table.len(),
                saved_to,
            });
        }
    }

    let report = ExtractionReport {
        entries,
        elapsed: started.elapsed(),
    };
    report.log();
    report
}
