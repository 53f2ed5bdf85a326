//! Data platform client.
//!
//! All persistence, auth and file storage are delegated to an external
//! backend platform that exposes its tables over REST. The client here is
//! constructed once at the application entry point and passed into every
//! repository that needs data access — there is no hidden global instance.

use reqwest::Client;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Connection settings for the data platform.
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// REST endpoint base, e.g. `"https://project.example.co/rest/v1"`.
    pub base_url: String,

    /// Project API key.
    pub api_key: String,
}

/// Errors communicating with the data platform.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// An HTTP transport or deserialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform returned a non-success response; carries the raw
    /// backend detail for diagnosability.
    #[error("unexpected response from platform: {0}")]
    UnexpectedResponse(String),
}

/// HTTP client for the platform's table endpoints.
#[derive(Debug, Clone)]
pub struct PlatformClient {
    config: PlatformConfig,
    http: Client,
}

impl PlatformClient {
    /// Create a new client from the given configuration.
    #[must_use]
    pub fn new(config: PlatformConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    /// Fetch rows from `table`, applying query-string filters.
    ///
    /// # Errors
    ///
    /// Returns an error on HTTP failure or an unexpected response body.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>, PlatformError> {
        let response = self
            .http
            .get(self.table_url(table))
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .query(filters)
            .send()
            .await?;

        let response = Self::check(table, response).await?;

        Ok(response.json().await?)
    }

    /// Insert one or more rows into `table`, returning the created rows.
    ///
    /// # Errors
    ///
    /// Returns an error on HTTP failure or an unexpected response body.
    pub async fn insert<B, T>(&self, table: &str, body: &B) -> Result<Vec<T>, PlatformError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.table_url(table))
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;

        let response = Self::check(table, response).await?;

        Ok(response.json().await?)
    }

    /// Update rows of `table` matching the filters, returning the rows that
    /// were actually changed.
    ///
    /// An empty result means no row matched the filters — callers use this
    /// for optimistic concurrency checks.
    ///
    /// # Errors
    ///
    /// Returns an error on HTTP failure or an unexpected response body.
    pub async fn update<B, T>(
        &self,
        table: &str,
        filters: &[(&str, String)],
        body: &B,
    ) -> Result<Vec<T>, PlatformError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .patch(self.table_url(table))
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .header("Prefer", "return=representation")
            .query(filters)
            .json(body)
            .send()
            .await?;

        let response = Self::check(table, response).await?;

        Ok(response.json().await?)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{table}", self.config.base_url)
    }

    async fn check(
        table: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, PlatformError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        Err(PlatformError::UnexpectedResponse(format!(
            "{table} request failed with status {status}: {text}"
        )))
    }
}
