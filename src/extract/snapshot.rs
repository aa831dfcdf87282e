//! CSV persistence shared by the extraction job and the query runner.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Local;

use crate::models::extraction::Table;

/// Writes `{dir}/{name}_{YYYYmmdd_HHMMSS}.csv` unless the table is empty.
///
/// Returns the written path, or `None` when the table was skipped.
pub fn save_if_non_empty(dir: &Path, name: &str, table: &Table) -> anyhow::Result<Option<PathBuf>> {
    if table.is_empty() {
        tracing::warn!(source = name, "empty table, nothing saved");
        return Ok(None);
    }

    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("{}_{}.csv", name, stamp));
    write_csv(&path, table)?;

    tracing::info!(source = name, rows = table.len(), path = %path.display(), "snapshot saved");
    Ok(Some(path))
}

pub fn write_csv(path: &Path, table: &Table) -> anyhow::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;

    if !table.headers.is_empty() {
        writer.write_record(&table.headers)?;
    }
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table {
            headers: vec!["ingredient".into(), "description".into()],
            rows: vec![
                vec!["GLYCERIN".into(), "humectant, \"sweet\"".into()],
                vec!["TALC".into(), String::new()],
            ],
        }
    }

    #[test]
    fn test_empty_table_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let saved = save_if_non_empty(dir.path(), "cosing", &Table::empty()).unwrap();
        assert!(saved.is_none());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_snapshot_name_and_content() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("raw");
        let path = save_if_non_empty(&raw, "scraping_wikipedia_cosmetics", &table())
            .unwrap()
            .unwrap();

        let file_name = path.file_name().unwrap().to_str().unwrap();
        assert!(file_name.starts_with("scraping_wikipedia_cosmetics_"));
        assert!(file_name.ends_with(".csv"));
        // name_ + YYYYmmdd_HHMMSS + .csv
        assert_eq!(file_name.len(), "scraping_wikipedia_cosmetics_".len() + 15 + 4);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.headers().unwrap(), vec!["ingredient", "description"]);
        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "humectant, \"sweet\"");
    }
}
