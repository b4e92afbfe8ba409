use async_trait::async_trait;

use kindred_shared::{Principal, Profile};

use crate::backend::Backend;
use crate::cache::{MutationSpec, QueryKey, QuerySpec};
use crate::error::{ClientError, Result};
use crate::queries::keys;

pub struct DiscoveryFeed {
    pub page: u64,
    pub page_size: u64,
}

#[async_trait]
impl QuerySpec for DiscoveryFeed {
    type Output = Vec<Profile>;

    fn key(&self) -> QueryKey {
        keys::discovery_feed().with(self.page).with(self.page_size)
    }

    async fn run(&self, backend: &dyn Backend) -> Result<Vec<Profile>> {
        backend.get_discovery_feed(self.page, self.page_size).await
    }
}

/// Mutual matches of the caller.
///
/// The backend has no operation listing mutual matches, so this read always
/// reports the gap instead of pretending the list is empty.
pub struct Matches;

pub const MATCHES_UNSUPPORTED: &str = "listing mutual matches";

#[async_trait]
impl QuerySpec for Matches {
    type Output = Vec<Profile>;

    fn key(&self) -> QueryKey {
        keys::matches()
    }

    async fn run(&self, _backend: &dyn Backend) -> Result<Vec<Profile>> {
        Err(ClientError::Unsupported(MATCHES_UNSUPPORTED))
    }
}

pub struct IsBlocked {
    pub target: Principal,
}

#[async_trait]
impl QuerySpec for IsBlocked {
    type Output = bool;

    fn key(&self) -> QueryKey {
        keys::is_blocked(&self.target)
    }

    async fn run(&self, backend: &dyn Backend) -> Result<bool> {
        backend.is_blocked(&self.target).await
    }
}

/// Returns whether the like completed a mutual match.
pub struct LikeProfile {
    pub target: Principal,
}

#[async_trait]
impl MutationSpec for LikeProfile {
    type Output = bool;

    fn name(&self) -> &'static str {
        "likeProfile"
    }

    async fn run(&self, backend: &dyn Backend) -> Result<bool> {
        backend.like_profile(&self.target).await
    }

    fn invalidates(&self, _matched: &bool) -> Vec<QueryKey> {
        vec![keys::discovery_feed(), keys::matches()]
    }
}

pub struct BlockUser {
    pub target: Principal,
}

#[async_trait]
impl MutationSpec for BlockUser {
    type Output = ();

    fn name(&self) -> &'static str {
        "blockUser"
    }

    async fn run(&self, backend: &dyn Backend) -> Result<()> {
        backend.block_user(&self.target).await
    }

    fn invalidates(&self, _output: &()) -> Vec<QueryKey> {
        vec![
            keys::discovery_feed(),
            keys::matches(),
            keys::is_blocked(&self.target),
        ]
    }
}

pub struct UnblockUser {
    pub target: Principal,
}

#[async_trait]
impl MutationSpec for UnblockUser {
    type Output = ();

    fn name(&self) -> &'static str {
        "unblockUser"
    }

    async fn run(&self, backend: &dyn Backend) -> Result<()> {
        backend.unblock_user(&self.target).await
    }

    fn invalidates(&self, _output: &()) -> Vec<QueryKey> {
        vec![keys::discovery_feed(), keys::is_blocked(&self.target)]
    }
}
