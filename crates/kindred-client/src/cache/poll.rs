use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::cache::client::QueryClient;
use crate::cache::spec::QuerySpec;

/// Interval-driven refetch of one query. Stops when dropped.
pub struct PollHandle {
    task: JoinHandle<()>,
}

impl PollHandle {
    pub(crate) fn spawn<Q>(client: QueryClient, query: Q, every: Duration) -> Self
    where
        Q: QuerySpec + 'static,
    {
        let task = tokio::spawn(async move {
            let key = query.key();
            let start = tokio::time::Instant::now() + every;
            let mut interval = tokio::time::interval_at(start, every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if let Err(e) = client.fetch(&query).await {
                    debug!(key = %key, error = %e, "Poll fetch failed");
                }
            }
        });
        Self { task }
    }

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn stop(self) {}
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
