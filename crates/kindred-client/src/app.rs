//! Application store shared by every view.
//!
//! [`App`] is the single process-scoped owner of the session, the backend
//! handle, the query cache, notifications and navigation. It has an
//! explicit init hook ([`App::start`]) and teardown hook ([`App::logout`]);
//! nothing here lives in module-level globals.

use std::sync::Arc;

use tracing::{info, warn};

use crate::backend::{ClientHandle, Connector, HttpConnector};
use crate::cache::{QueryClient, QueryOptions};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::notify::Notifier;
use crate::router::{Navigator, Route};
use crate::session::{FileIdentityStore, Identity, IdentitySession, IdentityStore, MemoryIdentityStore};

/// Central application state. Cheap to clone; every field is shared.
#[derive(Clone)]
pub struct App {
    /// Loaded client configuration.
    pub config: Arc<ClientConfig>,

    /// Current identity, or none, plus the initializing flag.
    pub session: Arc<IdentitySession>,

    /// Backend handle bound to the session identity. Rebuilt on every
    /// identity change.
    pub handle: Arc<ClientHandle>,

    /// Keyed read cache and mutation entry point.
    pub queries: QueryClient,

    /// Transient user notifications.
    pub notifier: Arc<Notifier>,

    /// Current route.
    pub navigator: Arc<Navigator>,
}

impl App {
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn IdentityStore>,
        connector: Arc<dyn Connector>,
    ) -> Self {
        let handle = Arc::new(ClientHandle::new(connector));
        let defaults = QueryOptions {
            stale_time: config.stale_time,
            ..QueryOptions::default()
        };
        Self {
            queries: QueryClient::new(handle.clone(), defaults),
            handle,
            session: Arc::new(IdentitySession::new(store)),
            notifier: Arc::new(Notifier::new()),
            navigator: Arc::new(Navigator::new(Route::Discover)),
            config: Arc::new(config),
        }
    }

    /// Wire the HTTP transport and the identity store named by `config`.
    pub fn from_config(config: ClientConfig) -> Self {
        let store: Arc<dyn IdentityStore> = match config.identity_file {
            Some(ref path) => Arc::new(FileIdentityStore::new(path)),
            None => {
                warn!("No identity file location, identity will not persist");
                Arc::new(MemoryIdentityStore::new())
            }
        };
        let connector = Arc::new(HttpConnector::new(config.clone()));
        Self::new(config, store, connector)
    }

    /// Restore the session and bind the backend handle to it.
    pub async fn start(&self) -> Result<()> {
        info!(backend = %self.config.backend_url, "Starting Kindred client");
        self.session.initialize().await;
        let identity = self.session.identity();
        if let Err(e) = self.handle.sync_with(identity.as_ref()) {
            self.handle.invalidate();
            return Err(e);
        }
        Ok(())
    }

    /// Adopt a new identity. The handle is rebound first; the session only
    /// changes once the new handle exists. On failure the handle is left
    /// unbound so reads fail fast instead of running as the old caller.
    pub async fn login(&self, identity: Identity) -> Result<()> {
        if let Err(e) = self.handle.bind(Some(&identity)) {
            warn!(principal = %identity.principal, error = %e, "Failed to bind backend client");
            self.handle.invalidate();
            return Err(e);
        }
        if let Err(e) = self.session.login(identity).await {
            self.handle.invalidate();
            return Err(e);
        }
        self.queries.clear();
        self.navigator.navigate(Route::Discover);
        Ok(())
    }

    /// Revoke the session and tear down everything cached for it. The
    /// session is cleared even when the anonymous rebind fails.
    pub async fn logout(&self) -> Result<()> {
        let bound = self.handle.bind(None);
        if let Err(ref e) = bound {
            warn!(error = %e, "Failed to bind anonymous backend client");
            self.handle.invalidate();
        }
        self.session.clear().await;
        self.queries.clear();
        self.navigator.navigate(Route::Auth);
        bound
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::queries::profile::CallerProfile;
    use crate::testing::{principal, profile, MockBackend, MockConnector};

    /// A started app bound to `caller` over a scripted backend.
    pub(crate) async fn app_with(backend: &MockBackend, caller: Option<&str>) -> App {
        let store = Arc::new(MemoryIdentityStore::new());
        if let Some(caller) = caller {
            store
                .save(&Identity::new(principal(caller), "token"))
                .await
                .unwrap();
        }
        let app = App::new(
            ClientConfig::default(),
            store,
            Arc::new(MockConnector::new(backend.clone())),
        );
        app.start().await.unwrap();
        app
    }

    #[tokio::test]
    async fn test_start_binds_restored_identity() {
        let backend = MockBackend::new();
        let app = app_with(&backend, Some("aaaaa-aa")).await;

        assert_eq!(app.handle.bound_caller(), Some(Some(principal("aaaaa-aa"))));
        assert!(app.session.snapshot().is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_discards_cached_results() {
        let backend = MockBackend::new();
        backend.set_caller_profile(Some(profile("aaaaa-aa", "Ada")));
        let app = app_with(&backend, Some("aaaaa-aa")).await;
        app.queries.fetch(&CallerProfile).await.unwrap();
        assert_eq!(app.queries.cache().populated(), 1);

        app.logout().await.unwrap();

        assert_eq!(app.queries.cache().populated(), 0);
        assert!(app.queries.data(&CallerProfile).is_none());
        assert_eq!(app.handle.bound_caller(), Some(None));
        assert_eq!(app.navigator.current(), Route::Auth);
        assert!(app.session.identity().is_none());
    }

    #[tokio::test]
    async fn test_login_rebinds_under_new_caller() {
        let backend = MockBackend::new();
        let app = app_with(&backend, None).await;
        assert_eq!(app.handle.bound_caller(), Some(None));

        app.login(Identity::new(principal("bbbbb-bb"), "token"))
            .await
            .unwrap();

        assert_eq!(app.handle.bound_caller(), Some(Some(principal("bbbbb-bb"))));
        assert_eq!(app.navigator.current(), Route::Discover);
    }

    async fn app_over(connector: Arc<MockConnector>, caller: Option<&str>) -> App {
        let store = Arc::new(MemoryIdentityStore::new());
        if let Some(caller) = caller {
            store
                .save(&Identity::new(principal(caller), "token"))
                .await
                .unwrap();
        }
        let app = App::new(ClientConfig::default(), store, connector);
        app.start().await.unwrap();
        app
    }

    #[tokio::test]
    async fn test_failed_login_bind_keeps_session_and_fails_fast() {
        let backend = MockBackend::new();
        let connector = Arc::new(MockConnector::new(backend.clone()));
        let app = app_over(connector.clone(), Some("aaaaa-aa")).await;
        backend.set_caller_profile(Some(profile("aaaaa-aa", "Ada")));
        app.queries.fetch(&CallerProfile).await.unwrap();

        connector.fail_connect(true);
        let err = app
            .login(Identity::new(principal("bbbbb-bb"), "token"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Identity(_)));

        assert_eq!(app.session.principal(), Some(principal("aaaaa-aa")));
        assert!(!app.handle.is_ready());
        assert!(matches!(
            app.queries.fetch(&CallerProfile).await,
            Err(ClientError::ClientUnavailable)
        ));
        assert_eq!(app.navigator.current(), Route::Discover);
    }

    #[tokio::test]
    async fn test_failed_logout_bind_still_clears_session() {
        let backend = MockBackend::new();
        let connector = Arc::new(MockConnector::new(backend));
        let app = app_over(connector.clone(), Some("aaaaa-aa")).await;

        connector.fail_connect(true);
        assert!(app.logout().await.is_err());

        assert!(app.session.identity().is_none());
        assert!(!app.handle.is_ready());
        assert_eq!(app.navigator.current(), Route::Auth);

        connector.fail_connect(false);
        app.login(Identity::new(principal("bbbbb-bb"), "token"))
            .await
            .unwrap();
        assert_eq!(app.handle.bound_caller(), Some(Some(principal("bbbbb-bb"))));
    }

    #[tokio::test]
    async fn test_session_initializing_until_started() {
        let backend = MockBackend::new();
        let app = App::new(
            ClientConfig::default(),
            Arc::new(MemoryIdentityStore::new()),
            Arc::new(MockConnector::new(backend)),
        );
        assert!(app.session.is_initializing());

        app.start().await.unwrap();
        assert!(!app.session.is_initializing());
    }
}
