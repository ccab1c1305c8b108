//! Wires the portal's services from configuration.

use std::sync::Arc;
use std::time::Duration;

use sinoscript_core::auth::Authenticator;
use sinoscript_core::clock::{Clock, SystemClock};
use sinoscript_core::error::Result;
use sinoscript_core::prompt::ConfirmationPrompt;
use sinoscript_core::reference::ReferenceSource;
use sinoscript_core::storage::KeyValueBackend;
use sinoscript_infrastructure::remote::{
    HostedAuthenticator, OfflineAuthenticator, PostgrestReferenceSource, StaticReferenceSource,
};
use sinoscript_infrastructure::{
    FileKeyValueBackend, LocalDraftSessionRepository, LocalStore, PortalConfig, StoredNavigator,
};

use crate::flow::FlowContext;
use crate::session_store::DraftSessionStore;

/// Every service a page needs, owned in one place.
pub struct Portal {
    pub store: DraftSessionStore,
    pub navigator: StoredNavigator,
    pub source: Arc<dyn ReferenceSource>,
    pub auth: Arc<dyn Authenticator>,
    online: bool,
}

impl Portal {
    /// Builds the portal on the file-backed store named by `config`.
    pub fn open(config: &PortalConfig) -> Result<Self> {
        let dir = config.store_dir()?;
        tracing::debug!("[Portal] Using store at {}", dir.display());
        Self::with_backend(config, Arc::new(FileKeyValueBackend::new(dir)), Arc::new(SystemClock))
    }

    pub fn with_backend(
        config: &PortalConfig,
        backend: Arc<dyn KeyValueBackend>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let local = LocalStore::new(backend);
        let repository =
            LocalDraftSessionRepository::with_key(local.clone(), config.storage.sessions_key.clone());
        let store = DraftSessionStore::new(Arc::new(repository), clock);
        let navigator = StoredNavigator::new(local.clone());

        let remote = &config.remote;
        let (source, auth, online): (Arc<dyn ReferenceSource>, Arc<dyn Authenticator>, bool) =
            match (&remote.base_url, &remote.anon_key) {
                (Some(base_url), Some(anon_key)) if remote.is_configured() => {
                    let timeout = Duration::from_secs(remote.timeout_secs);
                    let source = PostgrestReferenceSource::new(base_url.clone(), anon_key.clone())
                        .with_timeout(timeout)
                        .with_session_store(local.clone());
                    let auth = HostedAuthenticator::new(base_url.clone(), anon_key.clone(), local)
                        .with_timeout(timeout);
                    (Arc::new(source), Arc::new(auth), true)
                }
                _ => {
                    let source = match &remote.catalogue_file {
                        Some(path) => StaticReferenceSource::from_json_file(path)?,
                        None => StaticReferenceSource::default(),
                    };
                    tracing::info!("[Portal] No remote configured, running offline");
                    (Arc::new(source), Arc::new(OfflineAuthenticator::new()), false)
                }
            };

        Ok(Self {
            store,
            navigator,
            source,
            auth,
            online,
        })
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn context<'a>(&'a mut self, prompt: &'a dyn ConfirmationPrompt) -> FlowContext<'a> {
        FlowContext::new(&mut self.store, &self.navigator, prompt)
    }
}
