//! Per-screen view state.
//!
//! Each view reads through the shared [`QueryClient`](crate::cache::QueryClient),
//! exposes a render snapshot, and turns user actions into mutations with
//! notifications. Views take `&self` so that a renderer can share one view
//! between event handlers; local state sits behind a lock.

pub mod account_menu;
pub mod admin;
pub mod conversation;
pub mod discover;
pub mod match_detail;
pub mod matches;
pub mod payment_methods;
pub mod profile;
pub mod root;

use kindred_shared::constants::FALLBACK_PHOTO;
use kindred_shared::Profile;

use crate::cache::QueryState;

/// First photo of `profile`, or the placeholder.
pub(crate) fn primary_photo(profile: &Profile) -> String {
    profile
        .photos
        .first()
        .cloned()
        .unwrap_or_else(|| FALLBACK_PHOTO.to_string())
}

/// Error text of a read that failed before producing any data.
pub(crate) fn read_error<T>(state: &QueryState<T>) -> Option<String> {
    match (&state.data, &state.error) {
        (None, Some(e)) => Some(e.to_string()),
        _ => None,
    }
}
