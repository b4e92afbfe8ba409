use async_trait::async_trait;

use kindred_shared::{Principal, Role};

use crate::backend::Backend;
use crate::cache::{ErrorPolicy, MutationSpec, QueryKey, QueryOptions, QuerySpec};
use crate::error::{ClientError, Result};
use crate::queries::keys;

pub struct CallerRole;

#[async_trait]
impl QuerySpec for CallerRole {
    type Output = Role;

    fn key(&self) -> QueryKey {
        keys::caller_role()
    }

    async fn run(&self, backend: &dyn Backend) -> Result<Role> {
        backend.get_caller_user_role().await
    }
}

/// Admin check. Never retried, and any failure reads as "not admin".
pub struct IsCallerAdmin;

#[async_trait]
impl QuerySpec for IsCallerAdmin {
    type Output = bool;

    fn key(&self) -> QueryKey {
        keys::is_caller_admin()
    }

    fn options(&self, defaults: &QueryOptions) -> QueryOptions {
        QueryOptions {
            retries: 0,
            on_error: ErrorPolicy::TreatAsFallback,
            ..defaults.clone()
        }
    }

    async fn run(&self, backend: &dyn Backend) -> Result<bool> {
        backend.is_caller_admin().await
    }

    fn fallback(&self, _error: &ClientError) -> Option<bool> {
        Some(false)
    }
}

pub struct AssignRole {
    pub user: Principal,
    pub role: Role,
}

#[async_trait]
impl MutationSpec for AssignRole {
    type Output = ();

    fn name(&self) -> &'static str {
        "assignCallerUserRole"
    }

    async fn run(&self, backend: &dyn Backend) -> Result<()> {
        backend.assign_caller_user_role(&self.user, self.role).await
    }

    fn invalidates(&self, _output: &()) -> Vec<QueryKey> {
        vec![keys::caller_role(), keys::is_caller_admin()]
    }
}
