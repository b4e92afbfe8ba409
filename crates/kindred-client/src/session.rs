//! Identity session.
//!
//! Holds the current authenticated identity (or none) for the whole
//! process. Startup restoration reads a previously delegated identity from
//! an [`IdentityStore`]; a failed restoration yields "no identity" and is
//! never retried.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};

use kindred_shared::Principal;

use crate::error::{ClientError, Result};

/// A delegated identity issued by the identity provider.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub principal: Principal,
    /// Opaque bearer credential presented to the backend.
    pub delegation: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Identity {
    pub fn new(principal: Principal, delegation: impl Into<String>) -> Self {
        Self {
            principal,
            delegation: delegation.into(),
            expires_at: None,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("principal", &self.principal)
            .field("delegation", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Persistence for the delegated identity between runs.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn load(&self) -> Result<Option<Identity>>;
    async fn save(&self, identity: &Identity) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

/// Stores the identity as JSON in a single file.
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl IdentityStore for FileIdentityStore {
    async fn load(&self) -> Result<Option<Identity>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ClientError::Identity(format!("Failed to read identity: {e}"))),
        };
        let identity = serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::Identity(format!("Corrupt identity file: {e}")))?;
        Ok(Some(identity))
    }

    async fn save(&self, identity: &Identity) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ClientError::Identity(format!("Failed to create identity dir: {e}")))?;
        }
        let json = serde_json::to_vec_pretty(identity)
            .map_err(|e| ClientError::Identity(format!("Serialization failed: {e}")))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| ClientError::Identity(format!("Failed to write identity: {e}")))
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Identity(format!("Failed to remove identity: {e}"))),
        }
    }
}

/// Keeps the identity in memory only.
#[derive(Default)]
pub struct MemoryIdentityStore {
    slot: Mutex<Option<Identity>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(identity: Identity) -> Self {
        Self {
            slot: Mutex::new(Some(identity)),
        }
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn load(&self) -> Result<Option<Identity>> {
        Ok(self.slot.lock().clone())
    }

    async fn save(&self, identity: &Identity) -> Result<()> {
        *self.slot.lock() = Some(identity.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.slot.lock() = None;
        Ok(())
    }
}

/// Snapshot published to session observers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub identity: Option<Identity>,
    /// True from construction until startup restoration finishes.
    pub is_initializing: bool,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.identity.as_ref().map(|i| &i.principal)
    }
}

pub struct IdentitySession {
    store: Arc<dyn IdentityStore>,
    state: watch::Sender<SessionState>,
}

impl IdentitySession {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        // Initializing until the first restore attempt finishes.
        let (state, _) = watch::channel(SessionState {
            identity: None,
            is_initializing: true,
        });
        Self { store, state }
    }

    /// Restore a previously persisted identity.
    pub async fn initialize(&self) -> Option<Principal> {
        self.state.send_modify(|s| s.is_initializing = true);

        let restored = match self.store.load().await {
            Ok(Some(identity)) if identity.is_expired(Utc::now()) => {
                info!(principal = %identity.principal, "Stored identity expired");
                if let Err(e) = self.store.clear().await {
                    warn!(error = %e, "Failed to discard expired identity");
                }
                None
            }
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "Identity restoration failed");
                None
            }
        };

        let principal = restored.as_ref().map(|i| i.principal.clone());
        self.state.send_modify(|s| {
            s.identity = restored;
            s.is_initializing = false;
        });

        if let Some(ref p) = principal {
            info!(principal = %p, "Identity restored");
        }
        principal
    }

    /// Adopt a freshly delegated identity and persist it.
    pub async fn login(&self, identity: Identity) -> Result<()> {
        self.store.save(&identity).await?;
        info!(principal = %identity.principal, "Logged in");
        self.state.send_modify(|s| s.identity = Some(identity));
        Ok(())
    }

    /// Revoke the session. Callers must also discard every cached query
    /// result afterwards.
    pub async fn clear(&self) {
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "Failed to remove persisted identity");
        }
        self.state.send_modify(|s| s.identity = None);
        info!("Session cleared");
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity.clone()
    }

    pub fn principal(&self) -> Option<Principal> {
        self.state.borrow().principal().cloned()
    }

    pub fn is_initializing(&self) -> bool {
        self.state.borrow().is_initializing
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }
}
