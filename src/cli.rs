use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Cosmetics regulatory analysis: REST API, raw data extraction and fixed reports
#[derive(Parser)]
#[command(name = "cosmetics", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server
    Serve {
        /// Port to bind (defaults to API_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Extract the four raw sources into timestamped CSV snapshots
    Extract {
        /// Maximum number of API pages to request (defaults to API_MAX_PAGES)
        #[arg(long)]
        max_pages: Option<u32>,
    },

    /// Run the eight fixed queries and export them as CSV
    Queries {
        /// Output directory (defaults to DATA_PROCESSED_DIR)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}
