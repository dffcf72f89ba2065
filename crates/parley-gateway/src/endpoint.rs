//! A single JSON POST endpoint on a collaborator service.

use parley_core::error::DomainError;
use reqwest::{Client, Response};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone)]
pub(crate) struct Endpoint {
    http: Client,
    url: String,
}

impl Endpoint {
    /// Joins `base_url` and `path`, tolerating a trailing slash on the base.
    pub(crate) fn new(http: Client, base_url: &str, path: &str) -> Self {
        Self {
            http,
            url: format!("{}{path}", base_url.trim_end_matches('/')),
        }
    }

    pub(crate) fn url(&self) -> &str {
        &self.url
    }

    /// Posts `body` as JSON and returns the response if its status is a
    /// success.
    pub(crate) async fn post<T: Serialize + ?Sized + Sync>(
        &self,
        body: &T,
    ) -> Result<Response, DomainError> {
        let response = self
            .http
            .post(&self.url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                DomainError::Infrastructure(format!("{} unreachable: {e}", self.url))
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = response.text().await.unwrap_or_default();
        warn!(url = %self.url, status = status.as_u16(), "collaborator rejected request");
        Err(DomainError::Infrastructure(format!(
            "{} returned HTTP {}: {detail}",
            self.url,
            status.as_u16()
        )))
    }
}
