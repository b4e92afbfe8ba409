//! Typed reads and writes against the backend, grouped by domain.
//!
//! Every read names its cache key here so that writes can invalidate
//! exactly what they may have changed.

pub mod admin;
pub mod discovery;
pub mod messaging;
pub mod payments;
pub mod profile;

pub mod keys {
    use kindred_shared::Principal;

    use crate::cache::QueryKey;

    pub const CALLER_PROFILE: &str = "currentUserProfile";
    pub const USER_PROFILE: &str = "userProfile";
    pub const DISCOVERY_FEED: &str = "discoveryFeed";
    pub const MATCHES: &str = "matches";
    pub const MESSAGES: &str = "messages";
    pub const IS_BLOCKED: &str = "isBlocked";
    pub const PAYMENT_METHODS: &str = "paymentMethods";
    pub const DEFAULT_PAYMENT_METHOD: &str = "defaultPaymentMethod";
    pub const CALLER_ROLE: &str = "callerRole";
    pub const IS_CALLER_ADMIN: &str = "isCallerAdmin";

    pub fn caller_profile() -> QueryKey {
        QueryKey::new(CALLER_PROFILE)
    }

    pub fn user_profile(user: &Principal) -> QueryKey {
        QueryKey::new(USER_PROFILE).with(user)
    }

    /// Prefix covering every page of the feed.
    pub fn discovery_feed() -> QueryKey {
        QueryKey::new(DISCOVERY_FEED)
    }

    pub fn matches() -> QueryKey {
        QueryKey::new(MATCHES)
    }

    pub fn messages(counterpart: &Principal) -> QueryKey {
        QueryKey::new(MESSAGES).with(counterpart)
    }

    pub fn is_blocked(target: &Principal) -> QueryKey {
        QueryKey::new(IS_BLOCKED).with(target)
    }

    pub fn payment_methods() -> QueryKey {
        QueryKey::new(PAYMENT_METHODS)
    }

    pub fn default_payment_method() -> QueryKey {
        QueryKey::new(DEFAULT_PAYMENT_METHOD)
    }

    pub fn caller_role() -> QueryKey {
        QueryKey::new(CALLER_ROLE)
    }

    pub fn is_caller_admin() -> QueryKey {
        QueryKey::new(IS_CALLER_ADMIN)
    }
}
