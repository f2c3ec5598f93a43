//! # Spreadsheet Client
//!
//! Appends submission rows to a remote spreadsheet through its
//! `values:append` endpoint, in a single request per batch.
//!
//! The bearer token is read from the environment variable named in
//! `store.token_env`; nothing else about authentication happens here.

use crate::config::StoreConfig;
use serde_json::Value;
use std::time::Duration;
use survey_core::{SubmissionRow, SurveyError};

/// Errors from the spreadsheet client.
#[derive(Debug)]
pub enum ClientError {
    /// Client could not be built from the configuration.
    Config(String),
    /// Cannot reach the spreadsheet API.
    ConnectionFailed(String),
    /// 401/403 - token missing, expired, or lacking access.
    Unauthorized(u16),
    /// 429 Too Many Requests.
    RateLimited,
    /// Any other 4xx.
    Rejected(u16, String),
    /// Server returned a 5xx error.
    ServerError(u16, String),
    /// Failed to parse response body.
    ParseError(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Sheets client misconfigured: {msg}"),
            Self::ConnectionFailed(url) => write!(f, "Cannot connect to sheets API at {url}"),
            Self::Unauthorized(status) => {
                write!(f, "Unauthorized ({status}): invalid or missing sheets token")
            }
            Self::RateLimited => write!(f, "Rate limited by sheets API"),
            Self::Rejected(status, msg) => write!(f, "Append rejected ({status}): {msg}"),
            Self::ServerError(status, msg) => write!(f, "Server error ({status}): {msg}"),
            Self::ParseError(msg) => write!(f, "Parse error: {msg}"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<ClientError> for SurveyError {
    fn from(err: ClientError) -> Self {
        SurveyError::StoreFailure(err.to_string())
    }
}

/// HTTP client for one spreadsheet tab.
#[derive(Clone)]
pub struct SheetsClient {
    http: reqwest::Client,
    endpoint: String,
    spreadsheet_id: String,
    sheet: String,
    token: String,
}

impl std::fmt::Debug for SheetsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsClient")
            .field("endpoint", &self.endpoint)
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("sheet", &self.sheet)
            .finish_non_exhaustive()
    }
}

impl SheetsClient {
    /// Create a client with an explicit token.
    pub fn new(
        endpoint: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        sheet: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            spreadsheet_id: spreadsheet_id.into(),
            sheet: sheet.into(),
            token: token.into(),
        })
    }

    /// Create a client from the `[store]` section, reading the token env var.
    pub fn from_config(config: &StoreConfig) -> Result<Self, ClientError> {
        if config.spreadsheet_id.is_empty() {
            return Err(ClientError::Config(
                "store.spreadsheet_id is not set".to_string(),
            ));
        }
        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ClientError::Config(format!("environment variable {} is not set", config.token_env))
            })?;

        Self::new(
            config.endpoint.clone(),
            config.spreadsheet_id.clone(),
            config.sheet.clone(),
            token,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Build the append URL, percent-encoding the sheet name.
    fn append_url(&self) -> Result<reqwest::Url, ClientError> {
        let mut url = reqwest::Url::parse(&self.endpoint)
            .map_err(|e| ClientError::Config(format!("endpoint '{}': {e}", self.endpoint)))?;
        let range = format!("{}!A1:append", self.sheet);
        url.path_segments_mut()
            .map_err(|()| ClientError::Config(format!("endpoint '{}' cannot be a base", self.endpoint)))?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                self.spreadsheet_id.as_str(),
                "values",
                range.as_str(),
            ]);
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");
        Ok(url)
    }

    /// Handle HTTP response: check status codes and parse JSON.
    async fn handle_response(&self, resp: reqwest::Response) -> Result<Value, ClientError> {
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(ClientError::Unauthorized(status.as_u16()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ClientError::RateLimited);
        }
        if status.is_client_error() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Rejected(status.as_u16(), body));
        }
        if status.is_server_error() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::ServerError(status.as_u16(), body));
        }
        resp.json::<Value>()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))
    }

    /// Append all rows in one request. Returns the number of rows the API
    /// reports as written, or the batch size when it does not say.
    pub async fn append_rows(&self, rows: &[SubmissionRow]) -> Result<usize, ClientError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let url = self.append_url()?;
        let values: Vec<Vec<String>> = rows.iter().map(SubmissionRow::to_cells).collect();
        let body = serde_json::json!({ "values": values });

        tracing::debug!(rows = rows.len(), sheet = %self.sheet, "Appending rows to spreadsheet");

        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::ConnectionFailed(format!("{}: {e}", self.endpoint)))?;
        let reply = self.handle_response(resp).await?;

        let updated = reply
            .pointer("/updates/updatedRows")
            .and_then(Value::as_u64)
            .map_or(rows.len(), |n| n as usize);
        Ok(updated)
    }
}

// =============================================================================
// TESTS
// =============================================================================
