//! In-memory scripted backend for unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use kindred_shared::{Gender, Message, PaymentMethod, PaymentMethodInput, Principal, Profile, Role};

use crate::backend::{Backend, Connector};
use crate::error::{ClientError, Result};
use crate::session::Identity;

#[derive(Default)]
struct MockState {
    caller: Option<Principal>,
    caller_profile: Option<Profile>,
    profiles: HashMap<Principal, Profile>,
    feed: Vec<Profile>,
    mutual: HashSet<Principal>,
    liked: Vec<Principal>,
    blocked: HashSet<Principal>,
    messages: HashMap<Principal, Vec<Message>>,
    payment_methods: Vec<PaymentMethod>,
    default_method: Option<String>,
    role: Option<Role>,
    admin: bool,
    failing: HashSet<&'static str>,
    delays: HashMap<&'static str, VecDeque<Duration>>,
    calls: HashMap<&'static str, usize>,
    next_id: u64,
}

#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

pub fn principal(text: &str) -> Principal {
    Principal::parse(text).unwrap()
}

pub fn profile(id: &str, name: &str) -> Profile {
    Profile {
        id: principal(id),
        display_name: name.to_string(),
        age: 30,
        bio: format!("{name}'s bio"),
        gender: Gender::Other,
        interested_in: Gender::Other,
        location_text: "Lyon".to_string(),
        photos: vec!["/assets/generated/avatar-02.dim_512x512.png".to_string()],
    }
}

pub fn payment_method(id: &str, nickname: &str) -> PaymentMethod {
    PaymentMethod {
        id: id.to_string(),
        nickname: nickname.to_string(),
        last4: "4242".to_string(),
        brand: "Visa".to_string(),
        expiry: "04/2030".to_string(),
        created_at: Utc::now(),
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self, op: &str) -> usize {
        self.state.lock().calls.get(op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.state.lock().calls.values().sum()
    }

    pub fn fail(&self, op: &'static str) {
        self.state.lock().failing.insert(op);
    }

    pub fn recover(&self, op: &'static str) {
        self.state.lock().failing.remove(op);
    }

    /// Delay the next call of `op` by `delay`.
    pub fn delay_next(&self, op: &'static str, delay: Duration) {
        self.state.lock().delays.entry(op).or_default().push_back(delay);
    }

    pub fn set_caller(&self, caller: Option<Principal>) {
        self.state.lock().caller = caller;
    }

    pub fn set_caller_profile(&self, profile: Option<Profile>) {
        self.state.lock().caller_profile = profile;
    }

    pub fn caller_profile(&self) -> Option<Profile> {
        self.state.lock().caller_profile.clone()
    }

    pub fn add_profile(&self, profile: Profile) {
        self.state.lock().profiles.insert(profile.id.clone(), profile);
    }

    pub fn set_feed(&self, feed: Vec<Profile>) {
        self.state.lock().feed = feed;
    }

    pub fn set_mutual(&self, target: &Principal) {
        self.state.lock().mutual.insert(target.clone());
    }

    pub fn liked(&self) -> Vec<Principal> {
        self.state.lock().liked.clone()
    }

    pub fn set_blocked(&self, target: &Principal, blocked: bool) {
        let mut state = self.state.lock();
        if blocked {
            state.blocked.insert(target.clone());
        } else {
            state.blocked.remove(target);
        }
    }

    pub fn push_message(&self, counterpart: &Principal, from: &Principal, content: &str) {
        let to = if from == counterpart {
            self.state.lock().caller.clone().unwrap_or_else(Principal::anonymous)
        } else {
            counterpart.clone()
        };
        self.state
            .lock()
            .messages
            .entry(counterpart.clone())
            .or_default()
            .push(Message {
                from: from.clone(),
                to,
                content: content.to_string(),
                timestamp: Utc::now(),
            });
    }

    pub fn set_payment_methods(&self, methods: Vec<PaymentMethod>) {
        self.state.lock().payment_methods = methods;
    }

    pub fn payment_methods(&self) -> Vec<PaymentMethod> {
        self.state.lock().payment_methods.clone()
    }

    pub fn set_default_method(&self, id: Option<&str>) {
        self.state.lock().default_method = id.map(str::to_string);
    }

    pub fn set_admin(&self, admin: bool) {
        let mut state = self.state.lock();
        state.admin = admin;
        state.role = Some(if admin { Role::Admin } else { Role::User });
    }

    /// Count the call, compute the response against the state at issue
    /// time, then apply any scripted delay or failure.
    async fn respond<T>(&self, op: &'static str, f: impl FnOnce(&mut MockState) -> T) -> Result<T> {
        let (value, delay, failing) = {
            let mut state = self.state.lock();
            *state.calls.entry(op).or_insert(0) += 1;
            let delay = state.delays.get_mut(op).and_then(VecDeque::pop_front);
            let failing = state.failing.contains(op);
            let value = if failing { None } else { Some(f(&mut *state)) };
            (value, delay, failing)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match value {
            Some(value) if !failing => Ok(value),
            _ => Err(ClientError::Backend {
                status: 500,
                message: format!("{op} failed"),
            }),
        }
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn get_caller_user_profile(&self) -> Result<Option<Profile>> {
        self.respond("getCallerUserProfile", |s| s.caller_profile.clone()).await
    }

    async fn get_user_profile(&self, user: &Principal) -> Result<Option<Profile>> {
        self.respond("getUserProfile", |s| s.profiles.get(user).cloned()).await
    }

    async fn save_caller_user_profile(&self, mut profile: Profile) -> Result<Profile> {
        self.respond("saveCallerUserProfile", move |s| {
            if let Some(caller) = s.caller.clone() {
                profile.id = caller;
            }
            s.caller_profile = Some(profile.clone());
            profile
        })
        .await
    }

    async fn get_discovery_feed(&self, page: u64, page_size: u64) -> Result<Vec<Profile>> {
        self.respond("getDiscoveryFeed", |s| {
            s.feed
                .iter()
                .skip((page * page_size) as usize)
                .take(page_size as usize)
                .cloned()
                .collect()
        })
        .await
    }

    async fn like_profile(&self, target: &Principal) -> Result<bool> {
        self.respond("likeProfile", |s| {
            s.liked.push(target.clone());
            s.mutual.contains(target)
        })
        .await
    }

    async fn block_user(&self, target: &Principal) -> Result<()> {
        self.respond("blockUser", |s| {
            s.blocked.insert(target.clone());
        })
        .await
    }

    async fn unblock_user(&self, target: &Principal) -> Result<()> {
        self.respond("unblockUser", |s| {
            s.blocked.remove(target);
        })
        .await
    }

    async fn is_blocked(&self, target: &Principal) -> Result<bool> {
        self.respond("isBlocked", |s| s.blocked.contains(target)).await
    }

    async fn get_messages(&self, counterpart: &Principal) -> Result<Vec<Message>> {
        self.respond("getMessages", |s| {
            s.messages.get(counterpart).cloned().unwrap_or_default()
        })
        .await
    }

    async fn send_message(&self, to: &Principal, content: String) -> Result<()> {
        self.respond("sendMessage", move |s| {
            let from = s.caller.clone().unwrap_or_else(Principal::anonymous);
            s.messages.entry(to.clone()).or_default().push(Message {
                from,
                to: to.clone(),
                content,
                timestamp: Utc::now(),
            });
        })
        .await
    }

    async fn get_saved_payment_methods(&self) -> Result<Vec<PaymentMethod>> {
        self.respond("getSavedPaymentMethods", |s| s.payment_methods.clone()).await
    }

    async fn get_default_payment_method(&self) -> Result<Option<String>> {
        self.respond("getDefaultPaymentMethod", |s| s.default_method.clone()).await
    }

    async fn add_payment_method(&self, input: PaymentMethodInput) -> Result<String> {
        self.respond("addPaymentMethod", move |s| {
            s.next_id += 1;
            let id = format!("pm-{}", s.next_id);
            s.payment_methods.push(PaymentMethod {
                id: id.clone(),
                nickname: input.nickname,
                last4: input.last4,
                brand: input.brand,
                expiry: input.expiry,
                created_at: Utc::now(),
            });
            id
        })
        .await
    }

    async fn update_payment_method(&self, id: &str, input: PaymentMethodInput) -> Result<()> {
        self.respond("updatePaymentMethod", move |s| {
            if let Some(method) = s.payment_methods.iter_mut().find(|m| m.id == id) {
                method.nickname = input.nickname;
                method.last4 = input.last4;
                method.brand = input.brand;
                method.expiry = input.expiry;
            }
        })
        .await
    }

    async fn remove_payment_method(&self, id: &str) -> Result<()> {
        self.respond("removePaymentMethod", |s| {
            s.payment_methods.retain(|m| m.id != id);
            if s.default_method.as_deref() == Some(id) {
                s.default_method = None;
            }
        })
        .await
    }

    async fn set_default_payment_method(&self, id: &str) -> Result<()> {
        self.respond("setDefaultPaymentMethod", |s| {
            s.default_method = Some(id.to_string());
        })
        .await
    }

    async fn get_caller_user_role(&self) -> Result<Role> {
        self.respond("getCallerUserRole", |s| s.role.unwrap_or(Role::Guest)).await
    }

    async fn is_caller_admin(&self) -> Result<bool> {
        self.respond("isCallerAdmin", |s| s.admin).await
    }

    async fn assign_caller_user_role(&self, _user: &Principal, role: Role) -> Result<()> {
        self.respond("assignCallerUserRole", |s| {
            s.role = Some(role);
            s.admin = role == Role::Admin;
        })
        .await
    }
}

/// Hands out the shared [`MockBackend`] and records every bind.
pub struct MockConnector {
    backend: MockBackend,
    connects: Mutex<Vec<Option<Principal>>>,
    failing: Mutex<bool>,
}

impl MockConnector {
    pub fn new(backend: MockBackend) -> Self {
        Self {
            backend,
            connects: Mutex::new(Vec::new()),
            failing: Mutex::new(false),
        }
    }

    /// Make every following `connect` fail until reset.
    pub fn fail_connect(&self, failing: bool) {
        *self.failing.lock() = failing;
    }

    pub fn connects(&self) -> Vec<Option<Principal>> {
        self.connects.lock().clone()
    }
}

impl Connector for MockConnector {
    fn connect(&self, identity: Option<&Identity>) -> Result<Arc<dyn Backend>> {
        if *self.failing.lock() {
            return Err(ClientError::Identity("connect refused".to_string()));
        }
        let caller = identity.map(|i| i.principal.clone());
        self.backend.set_caller(caller.clone());
        self.connects.lock().push(caller);
        Ok(Arc::new(self.backend.clone()))
    }
}
