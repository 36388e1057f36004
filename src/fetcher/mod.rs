use anyhow::Result;
use async_trait::async_trait;

use crate::models::Row;

pub mod csv_file;
pub mod http;
pub mod memory;

pub use csv_file::CsvFileSource;
pub use http::HttpCsvSource;
pub use memory::MemorySource;

/// Produces raw rows for one named file. Format and transport are the
/// implementor's business; callers only see ordered rows.
#[async_trait]
pub trait RowSource: Send + Sync {
    fn name(&self) -> &str;

    /// `headers` names the columns of a file that has no header row.
    async fn fetch_rows(&self, file: &str, headers: Option<&[String]>) -> Result<Vec<Row>>;
}
