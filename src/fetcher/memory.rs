use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;

use super::RowSource;
use crate::models::Row;

/// Rows held in memory, keyed by file name. Unknown files fail like a missing
/// file would. Explicit headers are ignored: rows already carry names.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<Row>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, file: impl Into<String>, rows: Vec<Row>) -> Self {
        self.insert(file, rows);
        self
    }

    pub fn insert(&mut self, file: impl Into<String>, rows: Vec<Row>) {
        self.files.insert(file.into(), rows);
    }
}

#[async_trait]
impl RowSource for MemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_rows(&self, file: &str, _headers: Option<&[String]>) -> Result<Vec<Row>> {
        self.files
            .get(file)
            .cloned()
            .ok_or_else(|| anyhow!("no such file: {}", file))
    }
}
