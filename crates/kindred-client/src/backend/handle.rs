use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use kindred_shared::Principal;

use crate::backend::{Backend, Connector};
use crate::error::{ClientError, Result};
use crate::session::Identity;

struct Bound {
    caller: Option<Principal>,
    backend: Arc<dyn Backend>,
}

/// Identity-bound backend handle.
///
/// Starts unbound; reads issued before the first [`ClientHandle::bind`]
/// fail fast with [`ClientError::ClientUnavailable`]. Whenever the session
/// identity changes the handle must be rebuilt, otherwise calls would run
/// under a stale or anonymous caller.
pub struct ClientHandle {
    connector: Arc<dyn Connector>,
    bound: RwLock<Option<Bound>>,
}

impl ClientHandle {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            bound: RwLock::new(None),
        }
    }

    /// The backend bound to the current identity.
    pub fn get_client(&self) -> Result<Arc<dyn Backend>> {
        self.bound
            .read()
            .as_ref()
            .map(|b| b.backend.clone())
            .ok_or(ClientError::ClientUnavailable)
    }

    pub fn is_ready(&self) -> bool {
        self.bound.read().is_some()
    }

    /// Caller the handle is bound to; `None` when unbound, `Some(None)` when
    /// bound anonymously.
    pub fn bound_caller(&self) -> Option<Option<Principal>> {
        self.bound.read().as_ref().map(|b| b.caller.clone())
    }

    /// Rebuild the handle for `identity`, discarding the previous one.
    pub fn bind(&self, identity: Option<&Identity>) -> Result<()> {
        let backend = self.connector.connect(identity)?;
        let caller = identity.map(|i| i.principal.clone());
        match caller {
            Some(ref p) => info!(principal = %p, "Backend client bound"),
            None => info!("Backend client bound anonymously"),
        }
        *self.bound.write() = Some(Bound { caller, backend });
        Ok(())
    }

    /// Rebuild only when `identity` differs from the bound caller.
    /// Returns whether a rebuild happened.
    pub fn sync_with(&self, identity: Option<&Identity>) -> Result<bool> {
        let wanted = identity.map(|i| &i.principal);
        let current = self.bound_caller();
        if current.as_ref().map(Option::as_ref) == Some(wanted) {
            debug!("Backend client already bound to current identity");
            return Ok(false);
        }
        self.bind(identity)?;
        Ok(true)
    }

    /// Drop the bound backend; subsequent reads fail fast until rebound.
    pub fn invalidate(&self) {
        *self.bound.write() = None;
        debug!("Backend client invalidated");
    }
}
