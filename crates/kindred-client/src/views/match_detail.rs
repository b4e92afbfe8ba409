use parking_lot::Mutex;

use kindred_shared::validate::initials;
use kindred_shared::{Principal, Profile};

use crate::app::App;
use crate::error::Result;
use crate::queries::discovery::{BlockUser, IsBlocked, UnblockUser};
use crate::queries::profile::UserProfile;
use crate::router::Route;
use crate::views::read_error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchDetailState {
    Loading,
    NotFound,
    Error(String),
    Ready {
        profile: Profile,
        initials: String,
        is_blocked: bool,
        /// The block confirmation dialog is open.
        confirming_block: bool,
        pending: bool,
    },
}

#[derive(Default)]
struct Local {
    confirming_block: bool,
    pending: bool,
}

pub struct MatchDetailView {
    app: App,
    target: Principal,
    local: Mutex<Local>,
}

impl MatchDetailView {
    pub fn new(app: App, target: Principal) -> Self {
        Self {
            app,
            target,
            local: Mutex::new(Local::default()),
        }
    }

    fn profile_query(&self) -> UserProfile {
        UserProfile {
            user: self.target.clone(),
        }
    }

    fn blocked_query(&self) -> IsBlocked {
        IsBlocked {
            target: self.target.clone(),
        }
    }

    /// Both reads run even if the first fails; the first error is returned.
    pub async fn enter(&self) -> Result<()> {
        let profile = self.app.queries.ensure(&self.profile_query()).await.map(|_| ());
        let blocked = self.app.queries.fetch(&self.blocked_query()).await.map(|_| ());
        profile.and(blocked)
    }

    pub fn state(&self) -> MatchDetailState {
        let profile = self.app.queries.state(&self.profile_query());
        let blocked = self.app.queries.state(&self.blocked_query());
        if profile.is_loading() || blocked.is_loading() {
            return MatchDetailState::Loading;
        }
        if let Some(e) = read_error(&profile).or_else(|| read_error(&blocked)) {
            return MatchDetailState::Error(e);
        }
        let Some(profile) = profile.data.as_deref().cloned().flatten() else {
            return MatchDetailState::NotFound;
        };
        let local = self.local.lock();
        MatchDetailState::Ready {
            initials: initials(&profile.display_name),
            profile,
            is_blocked: blocked.data.is_some_and(|b| *b),
            confirming_block: local.confirming_block,
            pending: local.pending,
        }
    }

    pub fn request_block(&self) {
        self.local.lock().confirming_block = true;
    }

    pub fn cancel_block(&self) {
        self.local.lock().confirming_block = false;
    }

    /// Block after confirmation. Does nothing unless [`Self::request_block`]
    /// opened the dialog.
    pub async fn confirm_block(&self) -> Result<bool> {
        if !self.begin(true) {
            return Ok(false);
        }
        let outcome = self
            .app
            .queries
            .mutate(&BlockUser {
                target: self.target.clone(),
            })
            .await;
        self.finish();
        self.report(outcome, "User blocked", "Failed to block user").await
    }

    pub async fn unblock(&self) -> Result<bool> {
        if !self.begin(false) {
            return Ok(false);
        }
        let outcome = self
            .app
            .queries
            .mutate(&UnblockUser {
                target: self.target.clone(),
            })
            .await;
        self.finish();
        self.report(outcome, "User unblocked", "Failed to unblock user").await
    }

    fn begin(&self, needs_confirmation: bool) -> bool {
        let mut local = self.local.lock();
        if local.pending || (needs_confirmation && !local.confirming_block) {
            return false;
        }
        local.pending = true;
        true
    }

    fn finish(&self) {
        let mut local = self.local.lock();
        local.pending = false;
        local.confirming_block = false;
    }

    async fn report(&self, outcome: Result<()>, ok: &str, failed: &str) -> Result<bool> {
        match outcome {
            Ok(()) => {
                self.app.notifier.success(ok);
                self.app.queries.ensure(&self.blocked_query()).await?;
                Ok(true)
            }
            Err(e) => {
                self.app.notifier.error(failed, e.to_string());
                Err(e)
            }
        }
    }

    /// Open the conversation. Not offered while blocked.
    pub fn send_message(&self) -> bool {
        let blocked = self
            .app
            .queries
            .data(&self.blocked_query())
            .is_some_and(|b| *b);
        if blocked {
            return false;
        }
        self.app.navigator.navigate(Route::Chat(self.target.clone()));
        true
    }

    pub fn back(&self) {
        self.app.navigator.navigate(Route::Matches);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::app_with;
    use crate::queries::discovery::DiscoveryFeed;
    use crate::testing::{principal, profile, MockBackend};

    async fn open(backend: &MockBackend) -> MatchDetailView {
        backend.add_profile(profile("bbbbb-bb", "Bo Diddley"));
        let app = app_with(backend, Some("aaaaa-aa")).await;
        let view = MatchDetailView::new(app, principal("bbbbb-bb"));
        view.enter().await.unwrap();
        view
    }

    fn is_blocked(view: &MatchDetailView) -> bool {
        match view.state() {
            MatchDetailState::Ready { is_blocked, .. } => is_blocked,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_block_requires_confirmation() {
        let backend = MockBackend::new();
        let view = open(&backend).await;

        assert!(!view.confirm_block().await.unwrap());
        assert_eq!(backend.calls("blockUser"), 0);

        view.request_block();
        view.cancel_block();
        assert!(!view.confirm_block().await.unwrap());

        view.request_block();
        assert!(view.confirm_block().await.unwrap());
        assert!(is_blocked(&view));
        assert_eq!(view.app.notifier.last().unwrap().title, "User blocked");
    }

    #[tokio::test]
    async fn test_block_invalidates_feed_and_flag() {
        let backend = MockBackend::new();
        let view = open(&backend).await;
        let feed = DiscoveryFeed { page: 0, page_size: 50 };
        view.app.queries.fetch(&feed).await.unwrap();

        view.request_block();
        view.confirm_block().await.unwrap();
        assert!(view.app.queries.state(&feed).is_invalidated);
        assert_eq!(backend.calls("isBlocked"), 2);
        assert!(!view.send_message());
    }

    #[tokio::test]
    async fn test_unblock_and_message() {
        let backend = MockBackend::new();
        backend.set_blocked(&principal("bbbbb-bb"), true);
        let view = open(&backend).await;
        assert!(is_blocked(&view));

        assert!(view.unblock().await.unwrap());
        assert!(!is_blocked(&view));
        assert!(view.send_message());
        assert_eq!(view.app.navigator.current(), Route::Chat(principal("bbbbb-bb")));
    }

    #[tokio::test]
    async fn test_failed_unblock_notifies() {
        let backend = MockBackend::new();
        backend.set_blocked(&principal("bbbbb-bb"), true);
        backend.fail("unblockUser");
        let view = open(&backend).await;

        assert!(view.unblock().await.is_err());
        assert!(is_blocked(&view));
        assert_eq!(view.app.notifier.last().unwrap().title, "Failed to unblock user");
    }

    #[tokio::test]
    async fn test_unknown_profile() {
        let backend = MockBackend::new();
        let app = app_with(&backend, Some("aaaaa-aa")).await;
        let view = MatchDetailView::new(app, principal("ccccc-cc"));
        view.enter().await.unwrap();
        assert_eq!(view.state(), MatchDetailState::NotFound);
    }

    #[tokio::test]
    async fn test_failed_read_shows_error_then_recovers() {
        let backend = MockBackend::new();
        backend.add_profile(profile("bbbbb-bb", "Bo Diddley"));
        backend.fail("getUserProfile");
        let app = app_with(&backend, Some("aaaaa-aa")).await;
        let view = MatchDetailView::new(app, principal("bbbbb-bb"));

        assert!(view.enter().await.is_err());
        assert_eq!(backend.calls("isBlocked"), 1);
        match view.state() {
            MatchDetailState::Error(e) => assert!(e.contains("getUserProfile failed")),
            other => panic!("expected error, got {other:?}"),
        }

        backend.recover("getUserProfile");
        view.enter().await.unwrap();
        assert!(!is_blocked(&view));
    }
}
