//! Query/mutation cache.
//!
//! One process-wide store keyed by operation and parameters. Reads go
//! through [`QueryClient::ensure`] or [`QueryClient::fetch`]; writes go
//! through [`QueryClient::mutate`], which invalidates the keys the write
//! could have changed. Views observe keys through [`Subscription`].

mod client;
mod key;
mod poll;
mod spec;
mod state;
mod store;

pub use client::{QueryClient, Subscription};
pub use key::QueryKey;
pub use poll::PollHandle;
pub use spec::{ErrorPolicy, MutationSpec, QueryOptions, QuerySpec};
pub use state::{QueryState, QueryStatus};
pub use store::QueryCache;
