//! # kindred-client
//!
//! Client core for the Kindred dating app: identity session, backend
//! transport, the keyed query cache, route guards and per-screen view state.
//! A renderer drives the views; all business rules live in the backend.

pub mod app;
pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod notify;
pub mod queries;
pub mod router;
pub mod session;
pub mod views;

#[cfg(test)]
pub(crate) mod testing;

use tracing_subscriber::{fmt, EnvFilter};

pub use app::App;
pub use config::ClientConfig;
pub use error::{ClientError, Result};

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// filter. Calling it twice is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("kindred_client=debug,kindred_shared=info,warn"));

    let installed = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();

    if installed.is_ok() {
        tracing::info!("Starting {} client", kindred_shared::constants::APP_NAME);
    }
}
