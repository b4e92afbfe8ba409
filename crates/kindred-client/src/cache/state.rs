use std::sync::Arc;

use crate::error::ClientError;

/// Per-key lifecycle: `Idle -> Loading -> {Success | Error}`, and back to
/// `Loading` on any refetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// Typed view of one cache entry.
///
/// `data` survives a refetch or a failed refetch: a `Loading` or `Error`
/// status may still carry the last successful value.
#[derive(Debug)]
pub struct QueryState<T> {
    pub status: QueryStatus,
    pub data: Option<Arc<T>>,
    pub error: Option<ClientError>,
    pub is_invalidated: bool,
}

impl<T> QueryState<T> {
    pub fn idle() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            is_invalidated: false,
        }
    }

    /// First load in progress: nothing to show yet.
    pub fn is_loading(&self) -> bool {
        matches!(self.status, QueryStatus::Idle | QueryStatus::Loading) && self.data.is_none()
    }

    /// Any fetch in flight, including background refetches.
    pub fn is_fetching(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    /// A result (success or error) has been recorded at least once.
    pub fn is_fetched(&self) -> bool {
        self.data.is_some() || self.error.is_some()
    }
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
            is_invalidated: self.is_invalidated,
        }
    }
}
