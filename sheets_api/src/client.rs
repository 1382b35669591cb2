//! HTTP client for published spreadsheet CSV exports.

use std::time::Duration;

use url::Url;

use crate::{
    rows::{parse_rows, Record},
    Error,
};

/// Default spreadsheet host.
const DEFAULT_BASE_URL: &str = "https://docs.google.com";

/// HTTP client for published spreadsheet exports.
///
/// Each request builds a fresh `reqwest::Client` with a 30-second timeout,
/// which is the only per-sheet deadline.
#[derive(Debug, Clone)]
pub struct Client {
    /// Base URL for the spreadsheet host. Defaults to `https://docs.google.com`.
    base_url: String,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// Creates a new client pointing at the public spreadsheet host.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Creates a new client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Builds the CSV export URL for a sheet:
    /// `<host>/spreadsheets/d/<id>/export?format=csv`.
    pub fn export_url(&self, sheet_id: &str) -> Result<Url, Error> {
        let mut url = Url::parse(&format!(
            "{}/spreadsheets/d/{}/export",
            self.base_url, sheet_id
        ))
        .map_err(|e| {
            tracing::error!("Invalid URL constructed for sheet {}: {}", sheet_id, e);
            Error::RequestFailed
        })?;
        url.query_pairs_mut().append_pair("format", "csv");
        Ok(url)
    }

    /// Downloads the raw CSV text of a sheet.
    pub async fn get_csv(&self, sheet_id: &str) -> Result<String, Error> {
        let url = self.export_url(sheet_id)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::RequestFailed
            })?;
        let resp = client
            .get(url)
            .header("accept", "text/csv, text/plain, */*")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch sheet {}: {}", sheet_id, e);
                Error::RequestFailed
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read body for sheet {}: {}", sheet_id, e);
            Error::RequestFailed
        })?;

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!(
                "Sheet {} request failed with status {}: {}",
                sheet_id,
                status,
                snippet
            );
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        Ok(body)
    }

    /// Downloads a sheet and parses it into header-keyed records.
    pub async fn get_rows(&self, sheet_id: &str) -> Result<Vec<Record>, Error> {
        let body = self.get_csv(sheet_id).await?;
        parse_rows(&body).map_err(|e| {
            tracing::error!("Failed to parse sheet {}: {}", sheet_id, e);
            e
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}
