//! Blocking query client for the survey's SQL web service.
//!
//! The service accepts an SQL query as a URL parameter and returns the
//! result set as CSV, prefixed with a single table-name line. The client is
//! an explicitly constructed collaborator: callers build one and pass it to
//! whatever needs catalog access, there is no shared global instance.

use crate::row::CatalogRow;
use thiserror::Error;
use url::Url;

/// Default SQL search endpoint.
pub const DEFAULT_SERVICE_URL: &str =
    "https://skyserver.sdss.org/dr16/en/tools/search/x_sql.aspx";

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("invalid service URL: {0}")]
    BadUrl(#[from] url::ParseError),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },
    #[error("service returned HTTP {0}")]
    Status(u16),
    #[error("failed to read response body: {0}")]
    Body(#[source] Box<ureq::Error>),
    #[error("failed to parse CSV response: {0}")]
    Csv(#[from] csv::Error),
}

/// Client for the catalog query service.
pub struct SkyQueryClient {
    service_url: String,
}

impl SkyQueryClient {
    /// Create a client against a specific service endpoint.
    pub fn new(service_url: impl Into<String>) -> Self {
        Self {
            service_url: service_url.into(),
        }
    }

    /// Full request URL for a query, with comments stripped and the SQL
    /// encoded into the `cmd` parameter.
    pub fn query_url(&self, sql: &str) -> Result<String, QueryError> {
        let mut url = Url::parse(&self.service_url)?;
        url.query_pairs_mut()
            .append_pair("cmd", &strip_comments(sql))
            .append_pair("format", "csv");
        Ok(url.into())
    }

    /// Run a query and deserialize the CSV result set into catalog rows.
    pub fn query_rows(&self, sql: &str) -> Result<Vec<CatalogRow>, QueryError> {
        let url = self.query_url(sql)?;
        log::info!("querying catalog service: {url}");

        let response = ureq::get(&url).call().map_err(|e| QueryError::Transport {
            url: url.clone(),
            source: Box::new(e),
        })?;
        if response.status() != 200 {
            return Err(QueryError::Status(response.status().as_u16()));
        }

        let body = response
            .into_body()
            .read_to_string()
            .map_err(|e| QueryError::Body(Box::new(e)))?;
        let rows = parse_csv_rows(&body)?;
        log::info!("query returned {} rows", rows.len());
        Ok(rows)
    }
}

impl Default for SkyQueryClient {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE_URL)
    }
}

/// Drop `--` line comments so they survive URL encoding.
fn strip_comments(sql: &str) -> String {
    sql.lines()
        .map(|line| match line.split_once("--") {
            Some((code, _)) => code,
            None => line,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse the service's CSV payload, skipping the one-line table-name
/// preamble the service prepends to the header row.
fn parse_csv_rows(body: &str) -> Result<Vec<CatalogRow>, QueryError> {
    let payload = match body.split_once('\n') {
        Some((_, rest)) => rest,
        None => "",
    };
    let mut reader = csv::Reader::from_reader(payload.as_bytes());
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}
