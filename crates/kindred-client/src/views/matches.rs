use kindred_shared::validate::initials;
use kindred_shared::{Principal, Profile};

use crate::app::App;
use crate::error::ClientError;
use crate::queries::discovery::Matches;
use crate::router::Route;
use crate::views::primary_photo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRow {
    pub id: Principal,
    pub display_name: String,
    pub initials: String,
    pub photo: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchesState {
    Loading,
    /// The backend cannot list matches. Distinct from an empty list.
    CapabilityUnavailable { reason: String },
    /// No matches yet; points the user back to discovery.
    Empty,
    Error(String),
    Ready(Vec<MatchRow>),
}

pub struct MatchesView {
    app: App,
}

impl MatchesView {
    pub fn new(app: App) -> Self {
        Self { app }
    }

    pub async fn enter(&self) {
        if let Err(e) = self.app.queries.ensure(&Matches).await {
            tracing::debug!(error = %e, "Matches unavailable");
        }
    }

    pub fn state(&self) -> MatchesState {
        let matches = self.app.queries.state(&Matches);
        if let Some(list) = matches.data {
            return if list.is_empty() {
                MatchesState::Empty
            } else {
                MatchesState::Ready(list.iter().map(row).collect())
            };
        }
        match matches.error {
            Some(ClientError::Unsupported(what)) => MatchesState::CapabilityUnavailable {
                reason: format!("The backend does not support {what} yet"),
            },
            Some(e) => MatchesState::Error(e.to_string()),
            None => MatchesState::Loading,
        }
    }

    pub fn open(&self, id: &Principal) {
        self.app.navigator.navigate(Route::MatchDetail(id.clone()));
    }

    pub fn discover(&self) {
        self.app.navigator.navigate(Route::Discover);
    }
}

fn row(profile: &Profile) -> MatchRow {
    MatchRow {
        id: profile.id.clone(),
        display_name: profile.display_name.clone(),
        initials: initials(&profile.display_name),
        photo: primary_photo(profile),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::app_with;
    use crate::testing::MockBackend;

    #[tokio::test]
    async fn test_capability_gap_is_not_empty() {
        let backend = MockBackend::new();
        let view = MatchesView::new(app_with(&backend, Some("aaaaa-aa")).await);
        assert_eq!(view.state(), MatchesState::Loading);

        view.enter().await;
        match view.state() {
            MatchesState::CapabilityUnavailable { reason } => {
                assert!(reason.contains("listing mutual matches"));
            }
            other => panic!("expected capability gap, got {other:?}"),
        }
    }
}
