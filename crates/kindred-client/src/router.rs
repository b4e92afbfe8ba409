//! Route table, navigation state, and the authentication/role guard.

use tokio::sync::watch;
use tracing::debug;

use kindred_shared::Principal;

/// Every screen reachable by path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Auth,
    Discover,
    Profile { onboarding: bool },
    Matches,
    MatchDetail(Principal),
    Chat(Principal),
    PaymentMethods,
    Admin,
    NotFound(String),
}

impl Route {
    /// Resolve a path with an optional query string, e.g.
    /// `/profile?onboarding=true`.
    pub fn parse(location: &str) -> Self {
        let (path, query) = match location.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (location, None),
        };
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Discover,
            ["auth"] => Route::Auth,
            ["profile"] => Route::Profile {
                onboarding: query_flag(query, "onboarding"),
            },
            ["matches"] => Route::Matches,
            ["matches", id] => match Principal::parse(id) {
                Ok(p) => Route::MatchDetail(p),
                Err(_) => Route::NotFound(location.to_string()),
            },
            ["chat", id] => match Principal::parse(id) {
                Ok(p) => Route::Chat(p),
                Err(_) => Route::NotFound(location.to_string()),
            },
            ["payment-methods"] => Route::PaymentMethods,
            ["admin"] => Route::Admin,
            _ => Route::NotFound(location.to_string()),
        }
    }

    pub fn to_path(&self) -> String {
        match self {
            Route::Auth => "/auth".to_string(),
            Route::Discover => "/".to_string(),
            Route::Profile { onboarding: true } => "/profile?onboarding=true".to_string(),
            Route::Profile { onboarding: false } => "/profile".to_string(),
            Route::Matches => "/matches".to_string(),
            Route::MatchDetail(id) => format!("/matches/{id}"),
            Route::Chat(id) => format!("/chat/{id}"),
            Route::PaymentMethods => "/payment-methods".to_string(),
            Route::Admin => "/admin".to_string(),
            Route::NotFound(path) => path.clone(),
        }
    }

    /// Path without the query string, used for active-item highlighting.
    pub fn pathname(&self) -> String {
        let path = self.to_path();
        match path.split_once('?') {
            Some((pathname, _)) => pathname.to_string(),
            None => path,
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Route::Auth)
    }
}

fn query_flag(query: Option<&str>, name: &str) -> bool {
    query
        .into_iter()
        .flat_map(|q| q.split('&'))
        .filter_map(|pair| pair.split_once('='))
        .any(|(k, v)| k == name && v == "true")
}

/// Whether a read backing a guard decision has settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<T> {
    Loading,
    Ready(T),
}

/// Everything the guard needs to decide a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardContext {
    pub is_initializing: bool,
    pub is_authenticated: bool,
    /// Whether the caller's profile was fetched and is absent. Only
    /// consulted when authenticated.
    pub needs_onboarding: Lookup<bool>,
    /// Admin check outcome, already failed closed. Only consulted for
    /// admin routes.
    pub is_admin: Lookup<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Render a loading state until the context settles.
    Pending,
    Allow,
    Redirect(Route),
    /// Render the access-denied view in place.
    Denied,
}

/// Decide whether `route` may render.
pub fn guard(route: &Route, ctx: &GuardContext) -> Access {
    if ctx.is_initializing {
        return Access::Pending;
    }
    if route.is_public() {
        return if ctx.is_authenticated {
            Access::Redirect(Route::Discover)
        } else {
            Access::Allow
        };
    }
    if !ctx.is_authenticated {
        return Access::Redirect(Route::Auth);
    }

    match ctx.needs_onboarding {
        Lookup::Loading => return Access::Pending,
        Lookup::Ready(true) if !matches!(route, Route::Profile { onboarding: true }) => {
            return Access::Redirect(Route::Profile { onboarding: true });
        }
        Lookup::Ready(_) => {}
    }

    if matches!(route, Route::Admin) {
        return match ctx.is_admin {
            Lookup::Loading => Access::Pending,
            Lookup::Ready(true) => Access::Allow,
            Lookup::Ready(false) => Access::Denied,
        };
    }
    Access::Allow
}

/// Current location, observable by every view.
pub struct Navigator {
    current: watch::Sender<Route>,
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        let (current, _) = watch::channel(initial);
        Self { current }
    }

    pub fn navigate(&self, route: Route) {
        debug!(path = %route.to_path(), "Navigate");
        self.current.send_replace(route);
    }

    pub fn navigate_path(&self, location: &str) {
        self.navigate(Route::parse(location));
    }

    pub fn current(&self) -> Route {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.current.subscribe()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub path: &'static str,
    pub active: bool,
}

/// Bottom navigation entries; an item is active on exact path equality.
pub fn bottom_nav(current: &Route) -> Vec<NavItem> {
    let pathname = current.pathname();
    [("Discover", "/"), ("Matches", "/matches"), ("Profile", "/profile")]
        .into_iter()
        .map(|(label, path)| NavItem {
            label,
            path,
            active: pathname == path,
        })
        .collect()
}
