//! Discovery feed: one card at a time, like or pass.

use parking_lot::Mutex;
use tracing::debug;

use kindred_shared::constants::FALLBACK_PHOTO;
use kindred_shared::Profile;

use crate::app::App;
use crate::error::Result;
use crate::queries::discovery::{BlockUser, DiscoveryFeed, LikeProfile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoverState {
    Loading,
    /// Zero profiles; offers a manual refresh.
    Empty,
    Error(String),
    Browsing(Card),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub index: usize,
    pub total: usize,
    pub profile: Profile,
    pub photo: String,
    pub photo_index: usize,
    pub has_prev_photo: bool,
    pub has_next_photo: bool,
    /// A like is in flight; like and pass are disabled.
    pub busy: bool,
}

impl Card {
    /// "{index+1} of {total}"
    pub fn position_label(&self) -> String {
        format!("{} of {}", self.index + 1, self.total)
    }
}

#[derive(Default)]
struct Local {
    index: usize,
    photo_index: usize,
    liking: bool,
}

pub struct DiscoverView {
    app: App,
    local: Mutex<Local>,
}

impl DiscoverView {
    pub fn new(app: App) -> Self {
        Self {
            app,
            local: Mutex::new(Local::default()),
        }
    }

    fn feed(&self) -> DiscoveryFeed {
        DiscoveryFeed {
            page: 0,
            page_size: self.app.config.feed_page_size,
        }
    }

    pub async fn enter(&self) -> Result<()> {
        self.app.queries.ensure(&self.feed()).await?;
        Ok(())
    }

    pub fn state(&self) -> DiscoverState {
        let feed = self.app.queries.state(&self.feed());
        if feed.is_loading() {
            return DiscoverState::Loading;
        }
        let Some(profiles) = feed.data else {
            return match feed.error {
                Some(e) => DiscoverState::Error(e.to_string()),
                None => DiscoverState::Loading,
            };
        };

        let local = self.local.lock();
        let Some(profile) = profiles.get(local.index) else {
            return DiscoverState::Empty;
        };
        let photo = profile
            .photos
            .get(local.photo_index)
            .cloned()
            .unwrap_or_else(|| FALLBACK_PHOTO.to_string());
        DiscoverState::Browsing(Card {
            index: local.index,
            total: profiles.len(),
            profile: profile.clone(),
            photo,
            photo_index: local.photo_index,
            has_prev_photo: local.photo_index > 0,
            has_next_photo: local.photo_index + 1 < profile.photos.len(),
            busy: local.liking,
        })
    }

    fn current(&self) -> Option<Profile> {
        let profiles = self.app.queries.data(&self.feed())?;
        let index = self.local.lock().index;
        profiles.get(index).cloned()
    }

    /// Like the current card. Returns `Some(matched)` when a like was sent.
    pub async fn like(&self) -> Result<Option<bool>> {
        let Some(profile) = self.current() else {
            return Ok(None);
        };
        {
            let mut local = self.local.lock();
            if local.liking {
                return Ok(None);
            }
            local.liking = true;
        }

        let outcome = self
            .app
            .queries
            .mutate(&LikeProfile {
                target: profile.id.clone(),
            })
            .await;
        self.local.lock().liking = false;

        match outcome {
            Ok(matched) => {
                if matched {
                    self.app
                        .notifier
                        .success(format!("It's a match! You and {} liked each other", profile.display_name));
                }
                self.advance().await;
                Ok(Some(matched))
            }
            Err(e) => {
                self.app.notifier.error("Failed to like profile", e.to_string());
                Err(e)
            }
        }
    }

    /// Skip the current card without a remote call.
    pub async fn pass(&self) {
        if self.local.lock().liking {
            return;
        }
        self.advance().await;
    }

    /// Block the current card's user, then move past it.
    pub async fn block_current(&self) -> Result<()> {
        let Some(profile) = self.current() else {
            return Ok(());
        };
        match self
            .app
            .queries
            .mutate(&BlockUser { target: profile.id })
            .await
        {
            Ok(()) => {
                self.app.notifier.success("User blocked");
                self.advance().await;
                Ok(())
            }
            Err(e) => {
                self.app.notifier.error("Failed to block user", e.to_string());
                Err(e)
            }
        }
    }

    /// Manual refresh, also offered by the empty state.
    pub async fn refresh(&self) -> Result<()> {
        self.app.queries.fetch(&self.feed()).await?;
        Ok(())
    }

    pub fn next_photo(&self) {
        let Some(profile) = self.current() else {
            return;
        };
        let mut local = self.local.lock();
        if local.photo_index + 1 < profile.photos.len() {
            local.photo_index += 1;
        }
    }

    pub fn prev_photo(&self) {
        let mut local = self.local.lock();
        local.photo_index = local.photo_index.saturating_sub(1);
    }

    // Past the last card the index wraps to 0 and a fresh batch is
    // requested; otherwise the feed is only refetched if a write
    // invalidated it.
    async fn advance(&self) {
        let len = self
            .app
            .queries
            .data(&self.feed())
            .map_or(0, |profiles| profiles.len());
        let wrapped = {
            let mut local = self.local.lock();
            local.photo_index = 0;
            if local.index + 1 < len {
                local.index += 1;
                false
            } else {
                local.index = 0;
                true
            }
        };

        let refreshed = if wrapped {
            debug!("Reached end of feed, requesting a fresh batch");
            self.app.queries.fetch(&self.feed()).await.map(|_| ())
        } else {
            self.app.queries.ensure(&self.feed()).await.map(|_| ())
        };
        if let Err(e) = refreshed {
            debug!(error = %e, "Feed refresh failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::app_with;
    use crate::testing::{principal, profile, MockBackend};

    async fn view(backend: &MockBackend) -> DiscoverView {
        let app = app_with(backend, Some("zzzzz-zz")).await;
        let view = DiscoverView::new(app);
        view.enter().await.unwrap();
        view
    }

    fn card(view: &DiscoverView) -> Card {
        match view.state() {
            DiscoverState::Browsing(card) => card,
            other => panic!("expected a card, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_like_then_pass_wraps_and_refetches() {
        let backend = MockBackend::new();
        backend.set_feed(vec![profile("aaaaa-aa", "P1"), profile("bbbbb-bb", "P2")]);
        let view = view(&backend).await;
        assert_eq!(card(&view).profile.display_name, "P1");

        assert_eq!(view.like().await.unwrap(), Some(false));
        let shown = card(&view);
        assert_eq!(shown.index, 1);
        assert_eq!(shown.profile.display_name, "P2");
        assert_eq!(shown.position_label(), "2 of 2");

        let before = backend.calls("getDiscoveryFeed");
        view.pass().await;
        assert_eq!(card(&view).index, 0);
        assert_eq!(backend.calls("getDiscoveryFeed"), before + 1);
        assert_eq!(backend.liked(), vec![principal("aaaaa-aa")]);
    }

    #[tokio::test]
    async fn test_liking_last_profile_issues_one_refetch() {
        let backend = MockBackend::new();
        backend.set_feed(vec![profile("aaaaa-aa", "Only")]);
        let view = view(&backend).await;
        assert_eq!(backend.calls("getDiscoveryFeed"), 1);

        view.like().await.unwrap();
        assert_eq!(card(&view).index, 0);
        assert_eq!(backend.calls("getDiscoveryFeed"), 2);
    }

    #[tokio::test]
    async fn test_pass_is_local() {
        let backend = MockBackend::new();
        backend.set_feed(vec![profile("aaaaa-aa", "P1"), profile("bbbbb-bb", "P2")]);
        let view = view(&backend).await;

        view.pass().await;
        assert_eq!(card(&view).index, 1);
        assert_eq!(backend.calls("getDiscoveryFeed"), 1);
        assert_eq!(backend.calls("likeProfile"), 0);
    }

    #[tokio::test]
    async fn test_mutual_like_notifies() {
        let backend = MockBackend::new();
        backend.set_feed(vec![profile("aaaaa-aa", "Ada"), profile("bbbbb-bb", "Bo")]);
        backend.set_mutual(&principal("aaaaa-aa"));
        let view = view(&backend).await;

        assert_eq!(view.like().await.unwrap(), Some(true));
        let last = view.app.notifier.last().unwrap();
        assert!(last.title.starts_with("It's a match!"));
    }

    #[tokio::test]
    async fn test_failed_like_keeps_card_and_cache() {
        let backend = MockBackend::new();
        backend.set_feed(vec![profile("aaaaa-aa", "P1"), profile("bbbbb-bb", "P2")]);
        backend.fail("likeProfile");
        let view = view(&backend).await;

        assert!(view.like().await.is_err());
        assert_eq!(card(&view).index, 0);
        assert!(!view.app.queries.state(&view.feed()).is_invalidated);
        assert_eq!(view.app.notifier.last().unwrap().title, "Failed to like profile");
    }

    #[tokio::test]
    async fn test_empty_feed() {
        let backend = MockBackend::new();
        let view = view(&backend).await;
        assert_eq!(view.state(), DiscoverState::Empty);

        backend.set_feed(vec![profile("aaaaa-aa", "Ada")]);
        view.refresh().await.unwrap();
        assert_eq!(card(&view).profile.display_name, "Ada");
    }

    #[tokio::test]
    async fn test_photo_carousel_clamps() {
        let backend = MockBackend::new();
        let mut p = profile("aaaaa-aa", "Ada");
        p.photos = vec!["/one.png".into(), "/two.png".into()];
        backend.set_feed(vec![p]);
        let view = view(&backend).await;

        view.prev_photo();
        assert_eq!(card(&view).photo_index, 0);
        view.next_photo();
        view.next_photo();
        let shown = card(&view);
        assert_eq!(shown.photo, "/two.png");
        assert!(shown.has_prev_photo);
        assert!(!shown.has_next_photo);
    }

    #[tokio::test]
    async fn test_block_from_card_moves_on() {
        let backend = MockBackend::new();
        backend.set_feed(vec![profile("aaaaa-aa", "P1"), profile("bbbbb-bb", "P2")]);
        let view = view(&backend).await;

        view.block_current().await.unwrap();
        assert_eq!(card(&view).index, 1);
        assert_eq!(view.app.notifier.last().unwrap().title, "User blocked");
    }
}
