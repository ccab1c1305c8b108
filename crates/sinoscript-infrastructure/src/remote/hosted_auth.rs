//! Password sign-in against the hosted auth endpoint.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::remote::AUTH_SESSION_KEY;
use crate::storage::LocalStore;
use sinoscript_core::auth::{AuthSession, AuthUser, Authenticator};
use sinoscript_core::error::{PortalError, Result};

#[derive(Debug, Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

/// Authenticates with email and password and keeps the resulting session
/// in the local store under [`AUTH_SESSION_KEY`].
pub struct HostedAuthenticator {
    client: Client,
    base_url: String,
    anon_key: String,
    timeout: Duration,
    store: LocalStore,
}

impl HostedAuthenticator {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>, store: LocalStore) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            timeout: Duration::from_secs(10),
            store,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn stored_session(&self) -> Option<AuthSession> {
        self.store.get::<AuthSession>(AUTH_SESSION_KEY)
    }
}

#[async_trait]
impl Authenticator for HostedAuthenticator {
    async fn current_user(&self) -> Option<AuthUser> {
        let session = self.stored_session()?;
        if session.is_expired(Utc::now().timestamp()) {
            tracing::info!("[HostedAuth] Stored session expired, signing out locally");
            self.store.remove(AUTH_SESSION_KEY);
            return None;
        }
        Some(session.user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
        let url = format!("{}/auth/v1/token", self.base_url);
        let response = self
            .client
            .post(&url)
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&PasswordGrant { email, password })
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| PortalError::auth(format!("Sign-in request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(PortalError::auth(format!(
                "Sign-in rejected ({}): {}",
                status, error_text
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| PortalError::auth(format!("Failed to parse sign-in response: {}", e)))?;

        let expires_at = token
            .expires_at
            .or_else(|| token.expires_in.map(|secs| Utc::now().timestamp() + secs));
        let session = AuthSession {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at,
            user: token.user,
        };
        self.store.set(AUTH_SESSION_KEY, &session);

        tracing::info!("[HostedAuth] Signed in as {}", session.user.id);
        Ok(session.user)
    }

    async fn sign_out(&self) -> Result<()> {
        if let Some(session) = self.stored_session() {
            let url = format!("{}/auth/v1/logout", self.base_url);
            let result = self
                .client
                .post(&url)
                .header("apikey", &self.anon_key)
                .header("Authorization", format!("Bearer {}", session.access_token))
                .timeout(self.timeout)
                .send()
                .await;
            // The local session is dropped even if the server call fails.
            if let Err(e) = result {
                tracing::warn!("[HostedAuth] Remote sign-out failed: {}", e);
            }
        }
        self.store.remove(AUTH_SESSION_KEY);
        Ok(())
    }
}
