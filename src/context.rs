//! The wired-up client context.
//!
//! [`Platform`] is the explicitly constructed object graph of the client
//! core: one credential store, one auth API client, one refresh coordinator,
//! one authenticated client, one session lifecycle. Callers pass it (or the
//! pieces they need) down instead of reaching for globals, and tests swap
//! the transport and storage seams for doubles.

use std::sync::Arc;

use tracing::warn;

use crate::adapters::{FileStorage, MemoryStorage, ReqwestHttpClient};
use crate::auth::api::AuthApiClient;
use crate::auth::coordinator::RefreshCoordinator;
use crate::auth::refresher::HttpTokenRefresher;
use crate::auth::session::SessionLifecycle;
use crate::auth::store::CredentialStore;
use crate::client::AuthenticatedClient;
use crate::config::PlatformConfig;
use crate::traits::{HttpClient, StorageBackend};

/// The assembled client core.
pub struct Platform {
    store: Arc<CredentialStore>,
    session: SessionLifecycle,
    client: AuthenticatedClient,
}

impl Platform {
    /// Assemble the production object graph: reqwest transport, file-backed
    /// credential storage, and the refresh coordinator wiring them together.
    pub fn new(config: PlatformConfig) -> Self {
        let backend: Arc<dyn StorageBackend> = match &config.credentials_path {
            Some(path) => Arc::new(FileStorage::with_path(path.clone())),
            None => match FileStorage::new() {
                Some(storage) => Arc::new(storage),
                None => {
                    warn!("no home directory, sessions will not survive a restart");
                    Arc::new(MemoryStorage::new())
                }
            },
        };
        let http: Arc<dyn HttpClient> =
            Arc::new(ReqwestHttpClient::with_timeout(config.request_timeout));
        Self::with_components(config, http, backend)
    }

    /// Assemble the object graph over injected transport and storage.
    /// This is the constructor tests use.
    pub fn with_components(
        config: PlatformConfig,
        http: Arc<dyn HttpClient>,
        backend: Arc<dyn StorageBackend>,
    ) -> Self {
        let store = Arc::new(CredentialStore::new(backend));
        let api = Arc::new(
            AuthApiClient::with_base_url(config.api_base_url.clone())
                .with_timeout(config.refresh_timeout),
        );
        let refresher = Arc::new(HttpTokenRefresher::new(Arc::clone(&api)));
        let coordinator = RefreshCoordinator::new(Arc::clone(&store), refresher);
        let client = AuthenticatedClient::new(
            http,
            Arc::clone(&store),
            coordinator,
            config.api_base_url,
        );
        let session = SessionLifecycle::new(api, Arc::clone(&store));

        Self {
            store,
            session,
            client,
        }
    }

    /// The authenticated request client.
    pub fn client(&self) -> &AuthenticatedClient {
        &self.client
    }

    /// The session lifecycle.
    pub fn session(&self) -> &SessionLifecycle {
        &self.session
    }

    /// The credential store.
    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    /// Whether a user is currently signed in.
    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
