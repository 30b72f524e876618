//! HTTP record source.
//!
//! Fetches the sales records from the API, letting the server narrow them by
//! region and year. Every call is a fresh fetch; nothing is kept between
//! calls except the HTTP client itself.

use crate::config;
use crate::error::{DashboardError, Result};
use crate::models::{RecordCollection, SourceQuery};
use reqwest::blocking::Client;
use std::time::Duration;

/// Retrieves sales records from a remote JSON endpoint.
pub struct RecordSource {
    /// Base URL the records are fetched from.
    pub endpoint: String,
    timeout: Duration,
    client: Option<Client>,
}

impl RecordSource {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
            client: None,
        }
    }

    /// Lazy HTTP client, created on first use.
    pub fn client(&mut self) -> Result<&Client> {
        if self.client.is_none() {
            let client = Client::builder()
                .timeout(self.timeout)
                .redirect(reqwest::redirect::Policy::limited(10))
                .build()?;
            self.client = Some(client);
        }
        self.client
            .as_ref()
            .ok_or_else(|| DashboardError::InvalidArgument("HTTP client unavailable".to_string()))
    }

    /// Fetch the records matching `query`.
    ///
    /// An endpoint that cannot be reached is `Unreachable`; a non-success
    /// status is `Http`; a body that is not a JSON array of sale records is
    /// `MalformedResponse`; an unparseable date is `DataParse`.
    pub fn fetch(&mut self, query: &SourceQuery) -> Result<RecordCollection> {
        let endpoint = self.endpoint.clone();
        let params = query.params();
        tracing::info!(%endpoint, region = %query.region, year = ?query.year, "fetching sales records");

        let client = self.client()?.clone();
        let resp = client
            .get(&endpoint)
            .query(&params)
            .send()
            .map_err(DashboardError::from_transport)?
            .error_for_status()?;
        let body = resp.bytes().map_err(DashboardError::from_transport)?;

        let records = RecordCollection::from_json(&body).inspect_err(|e| {
            tracing::warn!(%endpoint, error = %e, "rejected response body");
        })?;
        tracing::info!(%endpoint, records = records.len(), "fetched sales records");
        Ok(records)
    }
}

impl Default for RecordSource {
    fn default() -> Self {
        Self::new(config::DEFAULT_ENDPOINT, config::DEFAULT_TIMEOUT)
    }
}
