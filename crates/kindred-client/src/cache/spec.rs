use std::time::Duration;

use async_trait::async_trait;

use kindred_shared::constants::DEFAULT_STALE_SECS;

use crate::backend::Backend;
use crate::cache::key::QueryKey;
use crate::error::{ClientError, Result};

/// What a read does with its final failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Record the error on the key and return it to the caller.
    #[default]
    Surface,
    /// Replace the error with [`QuerySpec::fallback`] and record a success.
    TreatAsFallback,
}

/// Per-read configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// How long a successful result is served without refetching.
    pub stale_time: Duration,
    /// Extra attempts after the first failure. Zero means a single attempt.
    pub retries: u32,
    pub on_error: ErrorPolicy,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(DEFAULT_STALE_SECS),
            retries: 0,
            on_error: ErrorPolicy::Surface,
        }
    }
}

/// A typed read against the backend.
#[async_trait]
pub trait QuerySpec: Send + Sync {
    type Output: Send + Sync + 'static;

    fn key(&self) -> QueryKey;

    /// Options for this read, derived from the client-wide defaults.
    fn options(&self, defaults: &QueryOptions) -> QueryOptions {
        defaults.clone()
    }

    /// A disabled read is never executed.
    fn enabled(&self) -> bool {
        true
    }

    async fn run(&self, backend: &dyn Backend) -> Result<Self::Output>;

    /// Value substituted for a failure under [`ErrorPolicy::TreatAsFallback`].
    fn fallback(&self, _error: &ClientError) -> Option<Self::Output> {
        None
    }
}

/// A typed write against the backend.
///
/// Mutations are never retried automatically.
#[async_trait]
pub trait MutationSpec: Send + Sync {
    type Output: Send;

    fn name(&self) -> &'static str;

    async fn run(&self, backend: &dyn Backend) -> Result<Self::Output>;

    /// Keys (or key prefixes) whose data this mutation may have changed.
    /// Only consulted after success.
    fn invalidates(&self, output: &Self::Output) -> Vec<QueryKey>;
}
