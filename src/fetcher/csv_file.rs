use anyhow::Context;
use async_trait::async_trait;
use csv::StringRecord;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::RowSource;
use crate::error::Result;
use crate::models::{Cell, Row};

/// Reads `<dir>/<file>` from local disk.
pub struct CsvFileSource {
    dir: PathBuf,
}

impl CsvFileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl RowSource for CsvFileSource {
    fn name(&self) -> &str {
        "csv_file"
    }

    async fn fetch_rows(&self, file: &str, headers: Option<&[String]>) -> anyhow::Result<Vec<Row>> {
        let path = self.dir.join(file);
        read_rows(&path, headers)
            .await
            .with_context(|| format!("failed to load {}", path.display()))
    }
}

async fn read_rows(path: &Path, headers: Option<&[String]>) -> Result<Vec<Row>> {
    let bytes = tokio::fs::read(path).await?;
    parse_csv(bytes.as_slice(), headers)
}

/// Parse CSV text into rows.
///
/// With `headers` the input is taken to have no header row. Records that fail
/// to parse are skipped with a warning; a broken header row fails the whole
/// file.
pub fn parse_csv<R: Read>(input: R, headers: Option<&[String]>) -> Result<Vec<Row>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .has_headers(headers.is_none())
        .from_reader(input);

    let names: Vec<String> = match headers {
        Some(h) => h.to_vec(),
        None => header_names(reader.headers()?),
    };

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(record = idx + 1, error = %e, "skipping unreadable CSV record");
                continue;
            }
        };
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(to_row(&names, &record));
    }
    Ok(rows)
}

fn header_names(headers: &StringRecord) -> Vec<String> {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    headers
        .iter()
        .map(|name| name.trim_start_matches('\u{feff}').trim().to_string())
        .collect()
}

fn to_row(names: &[String], record: &StringRecord) -> Row {
    names
        .iter()
        .zip(record.iter())
        .map(|(name, value)| {
            let cell = if value.is_empty() {
                Cell::Empty
            } else {
                Cell::Text(value.to_string())
            };
            (name.clone(), cell)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headered_csv() {
        let data = "\u{feff}Date , Rate\n2021-01-04, 7.00\n\n2021-01-05,\n";
        let rows = parse_csv(data.as_bytes(), None).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Date"), Some(&Cell::Text("2021-01-04".into())));
        assert_eq!(rows[0].get("Rate"), Some(&Cell::Text("7.00".into())));
        assert_eq!(rows[1].get("Rate"), None);
    }

    #[test]
    fn test_explicit_headers_keep_first_line() {
        let headers: Vec<String> = ["Date", "Currency", "Mean", "Buy", "Sell"].iter().map(|s| s.to_string()).collect();
        let data = "03/15/2021,US DOLLAR,109.5,109.4,109.6\n03/16/2021,EURO,130.1,130.0,130.2\n";
        let rows = parse_csv(data.as_bytes(), Some(&headers)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Currency"), Some(&Cell::Text("US DOLLAR".into())));
        assert_eq!(rows[1].get("Sell"), Some(&Cell::Text("130.2".into())));
    }

    #[test]
    fn test_short_records_are_kept() {
        let data = "Date,Repo,Reverse Repo\n2021-02-01,7.0\n";
        let rows = parse_csv(data.as_bytes(), None).unwrap();
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[0].get("Reverse Repo"), None);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = CsvFileSource::new(dir.path());
        assert!(source.fetch_rows("nope.csv", None).await.is_err());
    }

    #[tokio::test]
    async fn test_reads_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Central Bank Rate (CBR).csv"), "Date,Rate\n2021-01-04,7.0\n").unwrap();
        let source = CsvFileSource::new(dir.path());
        let rows = source.fetch_rows("Central Bank Rate (CBR).csv", None).await.unwrap();
        assert_eq!(rows.len(), 1);
    }
}
