use std::fs::{self, File, OpenOptions};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cosmetics_api::store::postgres::PgStore;
use cosmetics_api::tokens::TokenStore;
use cosmetics_api::{api, config, extract, queries, AppState};

mod cli;

const EXTRACTION_LOG: &str = "extraction.log";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Config warnings are emitted before the real subscriber exists.
    let bootstrap = tracing_subscriber::fmt().with_writer(std::io::stderr).finish();
    let cfg = tracing::subscriber::with_default(bootstrap, config::load)?;

    // The extraction job also keeps a plain-text log next to the data.
    let log_file = match args.command {
        Some(cli::Commands::Extract { .. }) => Some(open_extraction_log(&cfg.paths.log_dir)?),
        _ => None,
    };
    let file_layer = log_file.map(|file| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file))
    });

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "cosmetics_api=debug,cosmetics=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    let result = match args.command {
        Some(cli::Commands::Serve { port }) => {
            let port = port.unwrap_or(cfg.port);
            run_server(cfg, port).await
        }
        Some(cli::Commands::Extract { max_pages }) => run_extraction(cfg, max_pages).await,
        Some(cli::Commands::Queries { output_dir }) => run_queries(cfg, output_dir).await,
        None => {
            let port = cfg.port;
            run_server(cfg, port).await
        }
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

fn open_extraction_log(dir: &Path) -> anyhow::Result<File> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(EXTRACTION_LOG);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))
}

async fn run_server(cfg: config::Config, port: u16) -> anyhow::Result<()> {
    tracing::info!("Connecting to database...");
    let db = PgStore::connect(&cfg.database_url, cfg.db_max_connections).await?;

    tracing::info!("Running migrations...");
    db.migrate().await?;

    let tokens = TokenStore::new(&cfg.auth);
    tracing::info!(ttl_secs = tokens.ttl_secs(), "token store ready");

    let state = AppState::new(Arc::new(db), tokens);
    let app = api::app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Cosmetics API listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("shutting down");
}

async fn run_extraction(mut cfg: config::Config, max_pages: Option<u32>) -> anyhow::Result<()> {
    if let Some(n) = max_pages {
        cfg.extract.api_max_pages = n;
    }
    tracing::info!(
        log_file = %cfg.paths.log_dir.join(EXTRACTION_LOG).display(),
        api_max_pages = cfg.extract.api_max_pages,
        "starting extraction"
    );
    let report = extract::run(&cfg).await?;
    println!(
        "Extracted {} rows from {} outputs in {:.1}s",
        report.total_rows(),
        report.entries.len(),
        report.elapsed.as_secs_f64()
    );
    for entry in &report.entries {
        match &entry.saved_to {
            Some(path) => println!("  {:<32} {:>7}  {}", entry.output, entry.rows, path.display()),
            None => println!("  {:<32} {:>7}  (not saved)", entry.output, entry.rows),
        }
    }
    Ok(())
}

async fn run_queries(cfg: config::Config, output_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let out_dir = output_dir.unwrap_or_else(|| cfg.paths.processed_dir.clone());

    tracing::info!("Connecting to database...");
    let db = PgStore::connect(&cfg.database_url, cfg.db_max_connections).await?;

    let result = queries::run_all(db.pool(), &out_dir).await;
    db.pool().close().await;

    for (file, rows) in result? {
        println!("  {:<36} {:>6} rows", file, rows);
    }
    println!("Reports written to {}", out_dir.display());
    Ok(())
}
