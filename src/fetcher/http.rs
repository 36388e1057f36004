use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Url};

use super::csv_file::parse_csv;
use super::RowSource;
use crate::error::{Error, Result};
use crate::models::Row;

/// Fetches `<base_url>/<file>` over HTTP and parses the body as CSV.
pub struct HttpCsvSource {
    base_url: Url,
    client: Client,
}

impl HttpCsvSource {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("RatesCompare/1.0"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .unwrap_or_else(|_| Client::new());

        Ok(Self {
            base_url: directory_url(base_url)?,
            client,
        })
    }

    pub fn file_url(&self, file: &str) -> Result<Url> {
        self.base_url
            .join(file)
            .map_err(|e| Error::Config(format!("cannot build URL for '{}': {}", file, e)))
    }

    async fn download(&self, url: &Url) -> Result<Vec<u8>> {
        let resp = self.client.get(url.clone()).send().await?.error_for_status()?;
        Ok(resp.bytes().await?.to_vec())
    }
}

/// `join` replaces the last path segment unless the base ends in `/`.
fn directory_url(base: &str) -> Result<Url> {
    let base = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{}/", base)
    };
    Url::parse(&base).map_err(|e| Error::Config(format!("invalid base URL '{}': {}", base, e)))
}

#[async_trait]
impl RowSource for HttpCsvSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch_rows(&self, file: &str, headers: Option<&[String]>) -> anyhow::Result<Vec<Row>> {
        let url = self.file_url(file)?;
        tracing::debug!(url = %url, "fetching");

        let body = self.download(&url).await.with_context(|| format!("GET {}", url))?;
        parse_csv(body.as_slice(), headers).with_context(|| format!("failed to parse {}", url))
    }
}
