//! PostgREST-backed remote store
//!
//! Talks to the REST interface of the fleet database:
//!
//! - `POST {base}/rest/v1/{table}` creates a record
//! - `GET {base}/rest/v1/{table}?select=id,name` lists references
//!
//! Every request carries the `apikey` and `Authorization: Bearer` headers.

use async_trait::async_trait;
use fleetops_common::config::StoreConfig;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use std::time::Duration;

use super::remote_store::{Reference, RemoteStore, StoreError};
use crate::models::CandidateRecord;

const USER_AGENT: &str = concat!("fleetops-si/", env!("CARGO_PKG_VERSION"));

/// Error body returned by PostgREST
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// REST client for the remote store
pub struct RestStore {
    http_client: reqwest::Client,
    rest_url: String,
}

impl RestStore {
    pub fn new(base_url: &str, access_token: &str, timeout: Duration) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(access_token)
                .map_err(|e| StoreError::Network(format!("Invalid access token: {}", e)))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", access_token))
                .map_err(|e| StoreError::Network(format!("Invalid access token: {}", e)))?,
        );

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            rest_url: format!("{}/rest/v1", base_url.trim_end_matches('/')),
        })
    }

    /// Build from the `[store]` config section; the token must already be present
    pub fn from_config(config: &StoreConfig, access_token: &str) -> Result<Self, StoreError> {
        Self::new(
            &config.base_url,
            access_token,
            Duration::from_secs(config.timeout_seconds),
        )
    }

    pub fn rest_url(&self) -> &str {
        &self.rest_url
    }

    /// Turn a non-success response into `Rejected`
    ///
    /// The message is the JSON body's `message`, else the raw body text.
    async fn rejection(response: reqwest::Response) -> StoreError {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();

        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.message)
            .or_else(|| {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            });

        StoreError::Rejected { status, message }
    }
}

#[async_trait]
impl RemoteStore for RestStore {
    async fn create(
        &self,
        table: &str,
        record: &CandidateRecord,
        on_conflict: Option<&str>,
    ) -> Result<serde_json::Value, StoreError> {
        let url = format!("{}/{}", self.rest_url, table);
        let prefer = if on_conflict.is_some() {
            "return=representation,resolution=merge-duplicates"
        } else {
            "return=representation"
        };

        tracing::debug!(table = %table, upsert = on_conflict.is_some(), "Creating record");

        let mut request = self
            .http_client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", prefer)
            .json(record);
        if let Some(key) = on_conflict {
            request = request.query(&[("on_conflict", key)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let created: serde_json::Value = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        // `return=representation` answers with a one-element array
        Ok(match created {
            serde_json::Value::Array(mut items) if items.len() == 1 => items.remove(0),
            other => other,
        })
    }

    async fn list_references(&self, table: &str) -> Result<Vec<Reference>, StoreError> {
        let url = format!("{}/{}", self.rest_url, table);

        tracing::debug!(table = %table, "Listing references");

        let response = self
            .http_client
            .get(&url)
            .query(&[("select", "id,name")])
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}
