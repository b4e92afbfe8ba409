//! Remote operation surface.
//!
//! Every backend operation is a flat request/response call. Implementations
//! carry no retry logic; retry policy, where present, belongs to the query
//! layer.

mod handle;
mod http;

pub use handle::ClientHandle;
pub use http::{HttpBackend, HttpConnector};

use std::sync::Arc;

use async_trait::async_trait;

use kindred_shared::{Message, PaymentMethod, PaymentMethodInput, Principal, Profile, Role};

use crate::error::Result;
use crate::session::Identity;

#[async_trait]
pub trait Backend: Send + Sync {
    async fn get_caller_user_profile(&self) -> Result<Option<Profile>>;

    async fn get_user_profile(&self, user: &Principal) -> Result<Option<Profile>>;

    async fn save_caller_user_profile(&self, profile: Profile) -> Result<Profile>;

    async fn get_discovery_feed(&self, page: u64, page_size: u64) -> Result<Vec<Profile>>;

    /// Returns whether the like completed a mutual match.
    async fn like_profile(&self, target: &Principal) -> Result<bool>;

    async fn block_user(&self, target: &Principal) -> Result<()>;

    async fn unblock_user(&self, target: &Principal) -> Result<()>;

    /// Whether the caller blocks `target`.
    async fn is_blocked(&self, target: &Principal) -> Result<bool>;

    /// Conversation with `counterpart`, in arrival order.
    async fn get_messages(&self, counterpart: &Principal) -> Result<Vec<Message>>;

    async fn send_message(&self, to: &Principal, content: String) -> Result<()>;

    async fn get_saved_payment_methods(&self) -> Result<Vec<PaymentMethod>>;

    async fn get_default_payment_method(&self) -> Result<Option<String>>;

    /// Returns the id of the new record.
    async fn add_payment_method(&self, input: PaymentMethodInput) -> Result<String>;

    async fn update_payment_method(&self, id: &str, input: PaymentMethodInput) -> Result<()>;

    async fn remove_payment_method(&self, id: &str) -> Result<()>;

    async fn set_default_payment_method(&self, id: &str) -> Result<()>;

    async fn get_caller_user_role(&self) -> Result<Role>;

    async fn is_caller_admin(&self) -> Result<bool>;

    async fn assign_caller_user_role(&self, user: &Principal, role: Role) -> Result<()>;
}

/// Builds a backend bound to one identity (`None` = anonymous).
pub trait Connector: Send + Sync {
    fn connect(&self, identity: Option<&Identity>) -> Result<Arc<dyn Backend>>;
}
