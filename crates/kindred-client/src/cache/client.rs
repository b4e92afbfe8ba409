use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::backend::ClientHandle;
use crate::cache::key::QueryKey;
use crate::cache::poll::PollHandle;
use crate::cache::spec::{ErrorPolicy, MutationSpec, QueryOptions, QuerySpec};
use crate::cache::state::{QueryState, QueryStatus};
use crate::cache::store::{AnyData, QueryCache};
use crate::error::{ClientError, Result};

/// Observer for one cache key.
pub struct Subscription {
    key: QueryKey,
    rx: watch::Receiver<u64>,
}

impl Subscription {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Wait for the next change to the key. Returns `false` once the cache
    /// is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Whether a change arrived since the last call, without waiting.
    pub fn take_changed(&mut self) -> bool {
        let changed = self.rx.has_changed().unwrap_or(false);
        if changed {
            self.rx.borrow_and_update();
        }
        changed
    }
}

/// Typed access to the shared [`QueryCache`] through the identity-bound
/// [`ClientHandle`].
#[derive(Clone)]
pub struct QueryClient {
    cache: Arc<QueryCache>,
    handle: Arc<ClientHandle>,
    defaults: QueryOptions,
}

impl QueryClient {
    pub fn new(handle: Arc<ClientHandle>, defaults: QueryOptions) -> Self {
        Self {
            cache: Arc::new(QueryCache::new()),
            handle,
            defaults,
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn handle(&self) -> &ClientHandle {
        &self.handle
    }

    pub fn defaults(&self) -> &QueryOptions {
        &self.defaults
    }

    /// Serve the cached value while fresh, otherwise fetch.
    pub async fn ensure<Q: QuerySpec>(&self, query: &Q) -> Result<Arc<Q::Output>> {
        let key = query.key();
        let options = query.options(&self.defaults);
        if let Some(data) = self.cache.fresh(&key, options.stale_time) {
            return downcast::<Q::Output>(&key, data);
        }
        self.fetch(query).await
    }

    /// Fetch unconditionally and record the outcome under the query key.
    ///
    /// Fails fast, without touching the entry, when the query is disabled
    /// or the client handle is not ready.
    pub async fn fetch<Q: QuerySpec>(&self, query: &Q) -> Result<Arc<Q::Output>> {
        let key = query.key();
        if !query.enabled() {
            return Err(ClientError::QueryDisabled(key.to_string()));
        }
        let backend = self.handle.get_client()?;
        let options = query.options(&self.defaults);

        let ticket = self.cache.begin(&key);

        let mut attempt = 0;
        let outcome = loop {
            match query.run(backend.as_ref()).await {
                Ok(value) => break Ok(value),
                Err(e) if attempt < options.retries => {
                    attempt += 1;
                    debug!(key = %key, attempt, error = %e, "Retrying query");
                }
                Err(e) => break Err(e),
            }
        };

        let outcome = match outcome {
            Err(e) if options.on_error == ErrorPolicy::TreatAsFallback => match query.fallback(&e) {
                Some(value) => {
                    debug!(key = %key, error = %e, "Query failed, using fallback");
                    Ok(value)
                }
                None => Err(e),
            },
            other => other,
        };

        match outcome {
            Ok(value) => {
                let data = Arc::new(value);
                let erased: AnyData = data.clone();
                self.cache.complete(ticket, Ok(erased));
                Ok(data)
            }
            Err(e) => {
                debug!(key = %key, error = %e, "Query failed");
                self.cache.complete(ticket, Err(e.clone()));
                Err(e)
            }
        }
    }

    /// Current state of the query's key without fetching.
    pub fn state<Q: QuerySpec>(&self, query: &Q) -> QueryState<Q::Output> {
        let key = query.key();
        let Some(snapshot) = self.cache.snapshot(&key) else {
            return QueryState::idle();
        };
        let data = snapshot
            .data
            .and_then(|d| downcast::<Q::Output>(&key, d).ok());
        QueryState {
            status: snapshot.status,
            data,
            error: snapshot.error,
            is_invalidated: snapshot.invalidated,
        }
    }

    pub fn data<Q: QuerySpec>(&self, query: &Q) -> Option<Arc<Q::Output>> {
        self.state(query).data
    }

    pub fn status<Q: QuerySpec>(&self, query: &Q) -> QueryStatus {
        self.state(query).status
    }

    pub fn subscribe(&self, key: QueryKey) -> Subscription {
        let rx = self.cache.subscribe(&key);
        Subscription { key, rx }
    }

    pub fn invalidate(&self, filter: &QueryKey) -> Vec<QueryKey> {
        self.cache.invalidate(filter)
    }

    /// Execute a write. On success every key it names is invalidated; on
    /// failure nothing is touched and the error goes back to the caller.
    pub async fn mutate<M: MutationSpec>(&self, mutation: &M) -> Result<M::Output> {
        let backend = self.handle.get_client()?;
        match mutation.run(backend.as_ref()).await {
            Ok(output) => {
                for filter in mutation.invalidates(&output) {
                    self.cache.invalidate(&filter);
                }
                debug!(mutation = mutation.name(), "Mutation succeeded");
                Ok(output)
            }
            Err(e) => {
                warn!(mutation = mutation.name(), error = %e, "Mutation failed");
                Err(e)
            }
        }
    }

    /// Refetch `query` every `every` until the returned handle is dropped.
    /// The first refetch happens one period after the call.
    pub fn poll<Q>(&self, query: Q, every: Duration) -> PollHandle
    where
        Q: QuerySpec + 'static,
    {
        PollHandle::spawn(self.clone(), query, every)
    }

    /// Discard every cached result (logout teardown).
    pub fn clear(&self) {
        self.cache.clear();
    }
}

fn downcast<T: Send + Sync + 'static>(key: &QueryKey, data: AnyData) -> Result<Arc<T>> {
    data.downcast::<T>()
        .map_err(|_| ClientError::Decode(format!("cached value for {key} has an unexpected type")))
}
