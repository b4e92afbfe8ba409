//! JSON-over-HTTP transport for the backend operation surface.
//!
//! Each operation is a `POST {base}/api/{operationName}` with a JSON object
//! of named arguments. Success bodies are the bare response value; failures
//! carry `{"error": "..."}`.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use kindred_shared::{Message, PaymentMethod, PaymentMethodInput, Principal, Profile, Role};

use crate::backend::{Backend, Connector};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::session::Identity;

const CALLER_HEADER: &str = "x-caller-principal";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
    caller: Option<Principal>,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig, identity: Option<&Identity>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(identity) = identity {
            let bearer = HeaderValue::from_str(&format!("Bearer {}", identity.delegation))
                .map_err(|e| ClientError::Identity(format!("Invalid delegation token: {e}")))?;
            let caller = HeaderValue::from_str(identity.principal.as_str())
                .map_err(|e| ClientError::Identity(format!("Invalid principal header: {e}")))?;
            headers.insert(AUTHORIZATION, bearer);
            headers.insert(CALLER_HEADER, caller);
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            caller: identity.map(|i| i.principal.clone()),
        })
    }

    pub fn caller(&self) -> Option<&Principal> {
        self.caller.as_ref()
    }

    async fn call<A, R>(&self, operation: &str, args: A) -> Result<R>
    where
        A: Serialize + Send,
        R: DeserializeOwned,
    {
        let url = format!("{}/api/{operation}", self.base_url);
        debug!(operation, "Backend call");

        let resp = self.http.post(&url).json(&args).send().await?;
        let status = resp.status();

        if !status.is_success() {
            let message = match resp.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
            };
            return Err(ClientError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        resp.json::<R>()
            .await
            .map_err(|e| ClientError::Decode(format!("{operation}: {e}")))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn get_caller_user_profile(&self) -> Result<Option<Profile>> {
        self.call("getCallerUserProfile", json!({})).await
    }

    async fn get_user_profile(&self, user: &Principal) -> Result<Option<Profile>> {
        self.call("getUserProfile", json!({ "user": user })).await
    }

    async fn save_caller_user_profile(&self, profile: Profile) -> Result<Profile> {
        self.call("saveCallerUserProfile", json!({ "profile": profile })).await
    }

    async fn get_discovery_feed(&self, page: u64, page_size: u64) -> Result<Vec<Profile>> {
        self.call("getDiscoveryFeed", json!({ "page": page, "pageSize": page_size }))
            .await
    }

    async fn like_profile(&self, target: &Principal) -> Result<bool> {
        self.call("likeProfile", json!({ "target": target })).await
    }

    async fn block_user(&self, target: &Principal) -> Result<()> {
        self.call("blockUser", json!({ "target": target })).await
    }

    async fn unblock_user(&self, target: &Principal) -> Result<()> {
        self.call("unblockUser", json!({ "target": target })).await
    }

    async fn is_blocked(&self, target: &Principal) -> Result<bool> {
        self.call("isBlocked", json!({ "target": target })).await
    }

    async fn get_messages(&self, counterpart: &Principal) -> Result<Vec<Message>> {
        self.call("getMessages", json!({ "matchUser": counterpart })).await
    }

    async fn send_message(&self, to: &Principal, content: String) -> Result<()> {
        self.call("sendMessage", json!({ "to": to, "content": content })).await
    }

    async fn get_saved_payment_methods(&self) -> Result<Vec<PaymentMethod>> {
        self.call("getSavedPaymentMethods", json!({})).await
    }

    async fn get_default_payment_method(&self) -> Result<Option<String>> {
        self.call("getDefaultPaymentMethod", json!({})).await
    }

    async fn add_payment_method(&self, input: PaymentMethodInput) -> Result<String> {
        self.call("addPaymentMethod", json!({ "input": input })).await
    }

    async fn update_payment_method(&self, id: &str, input: PaymentMethodInput) -> Result<()> {
        self.call("updatePaymentMethod", json!({ "id": id, "input": input }))
            .await
    }

    async fn remove_payment_method(&self, id: &str) -> Result<()> {
        self.call("removePaymentMethod", json!({ "id": id })).await
    }

    async fn set_default_payment_method(&self, id: &str) -> Result<()> {
        self.call("setDefaultPaymentMethod", json!({ "id": id })).await
    }

    async fn get_caller_user_role(&self) -> Result<Role> {
        self.call("getCallerUserRole", json!({})).await
    }

    async fn is_caller_admin(&self) -> Result<bool> {
        self.call("isCallerAdmin", json!({})).await
    }

    async fn assign_caller_user_role(&self, user: &Principal, role: Role) -> Result<()> {
        self.call("assignCallerUserRole", json!({ "user": user, "role": role }))
            .await
    }
}

/// Connects [`HttpBackend`]s against the configured base URL.
pub struct HttpConnector {
    config: ClientConfig,
}

impl HttpConnector {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }
}

impl Connector for HttpConnector {
    fn connect(&self, identity: Option<&Identity>) -> Result<Arc<dyn Backend>> {
        Ok(Arc::new(HttpBackend::new(&self.config, identity)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_backend_has_no_caller() {
        let backend = HttpBackend::new(&ClientConfig::default(), None).unwrap();
        assert!(backend.caller().is_none());
        assert_eq!(backend.base_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_bound_backend_keeps_caller() {
        let identity = Identity::new(Principal::parse("aaaaa-aa").unwrap(), "token");
        let config = ClientConfig {
            backend_url: "http://backend.local/".into(),
            ..ClientConfig::default()
        };
        let backend = HttpBackend::new(&config, Some(&identity)).unwrap();
        assert_eq!(backend.caller().unwrap().as_str(), "aaaaa-aa");
        assert_eq!(backend.base_url, "http://backend.local");
    }

    #[test]
    fn test_rejects_unprintable_delegation() {
        let identity = Identity::new(Principal::parse("aaaaa-aa").unwrap(), "bad\ntoken");
        assert!(matches!(
            HttpBackend::new(&ClientConfig::default(), Some(&identity)),
            Err(ClientError::Identity(_))
        ));
    }
}
