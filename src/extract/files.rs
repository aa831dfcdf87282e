//! Local raw files: the COSING Annex III spreadsheet and the two catalog CSVs.

use std::path::Path;

use anyhow::{anyhow, Context};
use calamine::{open_workbook_auto, Reader};

use crate::config::ExtractConfig;
use crate::models::extraction::Table;

pub const OUTPUTS: &[&str] = &["cosing", "sephora", "skincare"];

/// Reads all three files. A missing or unreadable file yields an empty table
/// and an error in the log; it never stops the other files.
pub fn extract_files(cfg: &ExtractConfig) -> Vec<(&'static str, Table)> {
    tracing::info!("source 1: local files");
    vec![
        ("cosing", read_or_empty("cosing", &cfg.file_cosing, read_spreadsheet)),
        ("sephora", read_or_empty("sephora", &cfg.file_sephora, read_csv)),
        ("skincare", read_or_empty("skincare", &cfg.file_skincare, read_csv)),
    ]
}

fn read_or_empty(label: &str, path: &Path, read: fn(&Path) -> anyhow::Result<Table>) -> Table {
    tracing::info!(source = label, path = %path.display(), "reading file");
    if !path.exists() {
        tracing::error!(source = label, path = %path.display(), "file not found");
        return Table::empty();
    }
    match read(path) {
        Ok(table) => {
            tracing::info!(
                source = label,
                rows = table.len(),
                columns = table.headers.len(),
                "file loaded"
            );
            table
        }
        Err(e) => {
            tracing::error!(source = label, path = %path.display(), "failed to read file: {:#}", e);
            Table::empty()
        }
    }
}

/// First row is the header. Short rows are kept as-is.
pub fn read_csv(path: &Path) -> anyhow::Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers = reader.headers()?.iter().map(String::from).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("parsing {}", path.display()))?;
        rows.push(record.iter().map(String::from).collect());
    }

    Ok(Table { headers, rows })
}

/// Reads the first worksheet of an `.xls`/`.xlsx` workbook.
pub fn read_spreadsheet(path: &Path) -> anyhow::Result<Table> {
    let mut workbook =
        open_workbook_auto(path).with_context(|| format!("opening {}", path.display()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("{} has no worksheet", path.display()))??;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .unwrap_or_default();
    let rows = rows
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .collect();

    Ok(Table { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn config(dir: &Path) -> ExtractConfig {
        ExtractConfig {
            file_cosing: dir.join("COSING_Annex_III_v2.xls"),
            file_sephora: dir.join("product_info.csv"),
            file_skincare: dir.join("cosmetics.csv"),
            open_beauty_facts_url: String::new(),
            api_max_pages: 0,
            scrape_url: String::new(),
            http_timeout_secs: 1,
        }
    }

    #[test]
    fn test_read_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("product_info.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "product_id,product_name,brand_name").unwrap();
        writeln!(f, "P1,\"Lip, Balm\",Fresh").unwrap();
        writeln!(f, "P2,Serum").unwrap();

        let table = read_csv(&path).unwrap();
        assert_eq!(table.headers, ["product_id", "product_name", "brand_name"]);
        assert_eq!(table.rows[0], ["P1", "Lip, Balm", "Fresh"]);
        assert_eq!(table.rows[1], ["P2", "Serum"]);
    }

    #[test]
    fn test_missing_files_degrade_to_empty_tables() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = std::fs::File::create(dir.path().join("cosmetics.csv")).unwrap();
        writeln!(f, "Label,Brand,Name").unwrap();
        writeln!(f, "Moisturizer,LA MER,Creme de la Mer").unwrap();

        let out = extract_files(&config(dir.path()));
        let names: Vec<_> = out.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, OUTPUTS);
        assert!(out[0].1.is_empty());
        assert!(out[1].1.is_empty());
        assert_eq!(out[2].1.len(), 1);
    }

    #[test]
    fn test_corrupt_spreadsheet_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("COSING_Annex_III_v2.xls"), b"not a workbook").unwrap();

        let table = read_or_empty(
            "cosing",
            &dir.path().join("COSING_Annex_III_v2.xls"),
            read_spreadsheet,
        );
        assert!(table.is_empty());
    }

    #[test]
    fn test_nonexistent_path() {
        let table = read_or_empty("sephora", &PathBuf::from("/definitely/not/here.csv"), read_csv);
        assert!(table.is_empty());
    }
}
