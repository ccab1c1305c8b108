//! Reference catalogue read from a hosted PostgREST endpoint.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::remote::AUTH_SESSION_KEY;
use crate::storage::LocalStore;
use sinoscript_core::auth::AuthSession;
use sinoscript_core::error::{PortalError, Result};
use sinoscript_core::reference::{AuthorRecord, ReferenceSource, Region, TextRecord};

/// Reads the `regions`, `texts` and `authors` tables.
///
/// Requests carry the anon key as `apikey`. The bearer token is the signed-in
/// user's access token when one is stored, the anon key otherwise.
#[derive(Clone)]
pub struct PostgrestReferenceSource {
    client: Client,
    base_url: String,
    anon_key: String,
    timeout: Duration,
    session_store: Option<LocalStore>,
}

impl PostgrestReferenceSource {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            timeout: Duration::from_secs(10),
            session_store: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use the access token kept in `store` for authenticated reads.
    pub fn with_session_store(mut self, store: LocalStore) -> Self {
        self.session_store = Some(store);
        self
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn bearer(&self) -> String {
        self.session_store
            .as_ref()
            .and_then(|store| store.get::<AuthSession>(AUTH_SESSION_KEY))
            .map(|session| session.access_token)
            .unwrap_or_else(|| self.anon_key.clone())
    }

    fn get(&self, table: &str) -> RequestBuilder {
        self.client
            .get(self.table_url(table))
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.bearer()))
            .timeout(self.timeout)
    }

    async fn fetch<T: DeserializeOwned>(&self, table: &str, request: RequestBuilder) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| PortalError::remote(format!("Request to '{}' failed: {}", table, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PortalError::remote(format!(
                "'{}' returned {}: {}",
                table, status, error_text
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| PortalError::remote(format!("Failed to parse '{}' rows: {}", table, e)))
    }
}

#[async_trait]
impl ReferenceSource for PostgrestReferenceSource {
    async fn regions(&self) -> Result<Vec<Region>> {
        let request = self
            .get("regions")
            .query(&[("select", "*"), ("order", "name.asc")]);
        self.fetch("regions", request).await
    }

    async fn texts_in_region(&self, region: &str) -> Result<Vec<TextRecord>> {
        let filter = format!("eq.{}", region);
        let request = self
            .get("texts")
            .query(&[("select", "*"), ("region", filter.as_str())]);
        self.fetch("texts", request).await
    }

    async fn text(&self, id: &str) -> Result<Option<TextRecord>> {
        let filter = format!("eq.{}", id);
        let request = self
            .get("texts")
            .query(&[("select", "*"), ("id", filter.as_str())]);
        let rows: Vec<TextRecord> = self.fetch("texts", request).await?;
        Ok(rows.into_iter().next())
    }

    async fn authors(&self) -> Result<Vec<AuthorRecord>> {
        let request = self.get("authors").query(&[("select", "*")]);
        self.fetch("authors", request).await
    }

    async fn author(&self, id: &str) -> Result<Option<AuthorRecord>> {
        let filter = format!("eq.{}", id);
        let request = self
            .get("authors")
            .query(&[("select", "*"), ("id", filter.as_str())]);
        let rows: Vec<AuthorRecord> = self.fetch("authors", request).await?;
        Ok(rows.into_iter().next())
    }
}
