use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::debug;

use crate::cache::key::QueryKey;
use crate::cache::state::QueryStatus;
use crate::error::ClientError;

pub(crate) type AnyData = Arc<dyn Any + Send + Sync>;

struct Entry {
    status: QueryStatus,
    data: Option<AnyData>,
    error: Option<ClientError>,
    updated_at: Option<Instant>,
    invalidated: bool,
    /// Sequence number of the most recently issued fetch.
    issued: u64,
    /// Sequence number of the fetch whose outcome is currently stored.
    applied: u64,
    version: watch::Sender<u64>,
}

impl Entry {
    fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            updated_at: None,
            invalidated: false,
            issued: 0,
            applied: 0,
            version,
        }
    }

    fn reset(&mut self) {
        self.status = QueryStatus::Idle;
        self.data = None;
        self.error = None;
        self.updated_at = None;
        self.invalidated = false;
        self.issued = 0;
        self.applied = 0;
    }

    fn notify(&self) {
        self.version.send_modify(|v| *v = v.wrapping_add(1));
    }
}

/// Identifies one issued fetch.
#[derive(Debug, Clone)]
pub(crate) struct Ticket {
    pub key: QueryKey,
    epoch: u64,
    seq: u64,
}

#[derive(Clone)]
pub(crate) struct EntrySnapshot {
    pub status: QueryStatus,
    pub data: Option<AnyData>,
    pub error: Option<ClientError>,
    pub invalidated: bool,
}

#[derive(Default)]
struct Inner {
    /// Bumped on `clear()`; outcomes from an older epoch are dropped.
    epoch: u64,
    entries: HashMap<QueryKey, Entry>,
}

/// Process-wide keyed result store.
///
/// Holds type-erased values; the typed surface lives in `QueryClient`.
/// Writes for one key are ordered by issue sequence, not completion order:
/// an earlier, slower fetch never overwrites a later one.
#[derive(Default)]
pub struct QueryCache {
    inner: Mutex<Inner>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn begin(&self, key: &QueryKey) -> Ticket {
        let mut inner = self.inner.lock();
        let epoch = inner.epoch;
        let entry = inner.entries.entry(key.clone()).or_insert_with(Entry::new);
        entry.issued += 1;
        entry.status = QueryStatus::Loading;
        entry.notify();
        debug!(key = %key, seq = entry.issued, "Query loading");
        Ticket {
            key: key.clone(),
            epoch,
            seq: entry.issued,
        }
    }

    /// Record the outcome of `ticket`. Returns whether it was applied.
    pub(crate) fn complete(&self, ticket: Ticket, outcome: Result<AnyData, ClientError>) -> bool {
        let mut inner = self.inner.lock();
        if inner.epoch != ticket.epoch {
            debug!(key = %ticket.key, "Dropping result from a cleared cache");
            return false;
        }
        let Some(entry) = inner.entries.get_mut(&ticket.key) else {
            return false;
        };
        if ticket.seq <= entry.applied {
            debug!(
                key = %ticket.key,
                seq = ticket.seq,
                applied = entry.applied,
                "Dropping stale result"
            );
            return false;
        }

        entry.applied = ticket.seq;
        let succeeded = outcome.is_ok();
        match outcome {
            Ok(data) => {
                entry.data = Some(data);
                entry.error = None;
                entry.updated_at = Some(Instant::now());
                entry.invalidated = false;
            }
            Err(e) => entry.error = Some(e),
        }
        entry.status = if entry.issued > entry.applied {
            QueryStatus::Loading
        } else if succeeded {
            QueryStatus::Success
        } else {
            QueryStatus::Error
        };
        entry.notify();
        debug!(key = %ticket.key, seq = ticket.seq, status = ?entry.status, "Query settled");
        true
    }

    /// Cached value of `key` if it succeeded, is not invalidated, and is
    /// younger than `stale_time`.
    pub(crate) fn fresh(&self, key: &QueryKey, stale_time: Duration) -> Option<AnyData> {
        let inner = self.inner.lock();
        let entry = inner.entries.get(key)?;
        let updated = entry.updated_at?;
        if entry.invalidated || entry.error.is_some() || updated.elapsed() >= stale_time {
            return None;
        }
        entry.data.clone()
    }

    pub(crate) fn snapshot(&self, key: &QueryKey) -> Option<EntrySnapshot> {
        let inner = self.inner.lock();
        inner.entries.get(key).map(|e| EntrySnapshot {
            status: e.status,
            data: e.data.clone(),
            error: e.error.clone(),
            invalidated: e.invalidated,
        })
    }

    /// Mark every entry under `filter` as needing a refetch and notify its
    /// observers. Returns the matched keys.
    pub fn invalidate(&self, filter: &QueryKey) -> Vec<QueryKey> {
        let mut inner = self.inner.lock();
        let mut matched = Vec::new();
        for (key, entry) in inner.entries.iter_mut() {
            if key.matches(filter) {
                entry.invalidated = true;
                entry.notify();
                matched.push(key.clone());
            }
        }
        debug!(filter = %filter, matched = matched.len(), "Invalidated");
        matched
    }

    /// Observe changes to `key`; the entry is created idle if absent.
    pub fn subscribe(&self, key: &QueryKey) -> watch::Receiver<u64> {
        let mut inner = self.inner.lock();
        inner
            .entries
            .entry(key.clone())
            .or_insert_with(Entry::new)
            .version
            .subscribe()
    }

    /// Discard every cached result. In-flight fetches issued before the
    /// clear are dropped when they complete.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.epoch += 1;
        for entry in inner.entries.values_mut() {
            entry.reset();
            entry.notify();
        }
        debug!(epoch = inner.epoch, "Query cache cleared");
    }

    pub fn keys(&self) -> Vec<QueryKey> {
        let mut keys: Vec<_> = self.inner.lock().entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of keys currently holding data.
    pub fn populated(&self) -> usize {
        self.inner
            .lock()
            .entries
            .values()
            .filter(|e| e.data.is_some() || e.error.is_some())
            .count()
    }
}
