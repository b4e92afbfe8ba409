//! Root gate: applies the route guard before any screen renders.

use tracing::debug;

use crate::app::App;
use crate::cache::QueryStatus;
use crate::queries::admin::IsCallerAdmin;
use crate::queries::profile::CallerProfile;
use crate::router::{guard, Access, GuardContext, Lookup, Route};

/// Upper bound on chained redirects, e.g. `/admin` -> `/profile?onboarding`.
const MAX_REDIRECTS: usize = 4;

pub struct RootGate {
    app: App,
}

impl RootGate {
    pub fn new(app: App) -> Self {
        Self { app }
    }

    /// Guard inputs as currently cached, without fetching.
    pub fn context(&self, route: &Route) -> GuardContext {
        let session = self.app.session.snapshot();
        let queries = &self.app.queries;

        let profile = queries.state(&CallerProfile);
        let needs_onboarding = if profile.is_loading() {
            Lookup::Loading
        } else {
            // A failed profile read is not "absent": only a fetched `None`
            // forces onboarding.
            Lookup::Ready(
                profile.status == QueryStatus::Success
                    && profile.data.as_deref().is_some_and(Option::is_none),
            )
        };

        let is_admin = if matches!(route, Route::Admin) {
            let admin = queries.state(&IsCallerAdmin);
            match admin.data {
                Some(flag) if !admin.is_fetching() => Lookup::Ready(*flag),
                _ => Lookup::Loading,
            }
        } else {
            Lookup::Ready(false)
        };

        GuardContext {
            is_initializing: session.is_initializing,
            is_authenticated: session.is_authenticated(),
            needs_onboarding,
            is_admin,
        }
    }

    /// Fetch whatever the guard needs for `route`, then decide.
    pub async fn resolve(&self, route: &Route) -> Access {
        let session = self.app.session.snapshot();
        if session.is_authenticated() && !session.is_initializing {
            if let Err(e) = self.app.queries.ensure(&CallerProfile).await {
                debug!(error = %e, "Caller profile unavailable for guard");
            }
            if matches!(route, Route::Admin) {
                // Fails closed, so this only errors when the handle is not ready.
                if let Err(e) = self.app.queries.ensure(&IsCallerAdmin).await {
                    debug!(error = %e, "Admin check unavailable for guard");
                }
            }
        }
        guard(route, &self.context(route))
    }

    /// Navigate to `route`, following redirects. Returns the final route and
    /// the access decision for it.
    pub async fn enter(&self, route: Route) -> (Route, Access) {
        let mut route = route;
        for _ in 0..MAX_REDIRECTS {
            match self.resolve(&route).await {
                Access::Redirect(next) => {
                    debug!(from = %route.to_path(), to = %next.to_path(), "Redirect");
                    route = next;
                }
                access => {
                    self.app.navigator.navigate(route.clone());
                    return (route, access);
                }
            }
        }
        self.app.navigator.navigate(route.clone());
        (route, Access::Pending)
    }
}
