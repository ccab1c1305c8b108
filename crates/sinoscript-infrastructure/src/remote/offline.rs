//! Stand-ins used when no hosted endpoint is configured.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use sinoscript_core::auth::{AuthUser, Authenticator};
use sinoscript_core::error::{PortalError, Result};
use sinoscript_core::reference::{AuthorRecord, ReferenceSource, Region, TextRecord};

/// Always signed in as a fixed local user.
#[derive(Debug, Clone)]
pub struct OfflineAuthenticator {
    user: AuthUser,
}

impl OfflineAuthenticator {
    pub fn new() -> Self {
        Self {
            user: AuthUser {
                id: "local".to_string(),
                email: None,
            },
        }
    }
}

impl Default for OfflineAuthenticator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Authenticator for OfflineAuthenticator {
    async fn current_user(&self) -> Option<AuthUser> {
        Some(self.user.clone())
    }

    async fn sign_in(&self, _email: &str, _password: &str) -> Result<AuthUser> {
        Ok(self.user.clone())
    }

    async fn sign_out(&self) -> Result<()> {
        Ok(())
    }
}

/// A fixed catalogue held in memory, optionally loaded from a JSON file
/// shaped like `{"regions": [...], "texts": [...], "authors": [...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticReferenceSource {
    #[serde(default)]
    pub regions: Vec<Region>,
    #[serde(default)]
    pub texts: Vec<TextRecord>,
    #[serde(default)]
    pub authors: Vec<AuthorRecord>,
}

impl StaticReferenceSource {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PortalError::io(format!("Failed to read catalogue '{}': {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[async_trait]
impl ReferenceSource for StaticReferenceSource {
    async fn regions(&self) -> Result<Vec<Region>> {
        let mut regions = self.regions.clone();
        regions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(regions)
    }

    async fn texts_in_region(&self, region: &str) -> Result<Vec<TextRecord>> {
        Ok(self
            .texts
            .iter()
            .filter(|t| t.region.as_deref() == Some(region))
            .cloned()
            .collect())
    }

    async fn text(&self, id: &str) -> Result<Option<TextRecord>> {
        Ok(self.texts.iter().find(|t| t.id == id).cloned())
    }

    async fn authors(&self) -> Result<Vec<AuthorRecord>> {
        Ok(self.authors.clone())
    }

    async fn author(&self, id: &str) -> Result<Option<AuthorRecord>> {
        Ok(self.authors.iter().find(|a| a.id == id).cloned())
    }
}
