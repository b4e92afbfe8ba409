use async_trait::async_trait;

use kindred_shared::{Principal, Profile};

use crate::backend::Backend;
use crate::cache::{MutationSpec, QueryKey, QueryOptions, QuerySpec};
use crate::error::Result;
use crate::queries::keys;

/// The caller's own profile. Absent means onboarding is required.
pub struct CallerProfile;

#[async_trait]
impl QuerySpec for CallerProfile {
    type Output = Option<Profile>;

    fn key(&self) -> QueryKey {
        keys::caller_profile()
    }

    fn options(&self, defaults: &QueryOptions) -> QueryOptions {
        QueryOptions {
            retries: 0,
            ..defaults.clone()
        }
    }

    async fn run(&self, backend: &dyn Backend) -> Result<Option<Profile>> {
        backend.get_caller_user_profile().await
    }
}

pub struct UserProfile {
    pub user: Principal,
}

#[async_trait]
impl QuerySpec for UserProfile {
    type Output = Option<Profile>;

    fn key(&self) -> QueryKey {
        keys::user_profile(&self.user)
    }

    async fn run(&self, backend: &dyn Backend) -> Result<Option<Profile>> {
        backend.get_user_profile(&self.user).await
    }
}

pub struct SaveProfile {
    pub profile: Profile,
}

#[async_trait]
impl MutationSpec for SaveProfile {
    type Output = Profile;

    fn name(&self) -> &'static str {
        "saveCallerUserProfile"
    }

    async fn run(&self, backend: &dyn Backend) -> Result<Profile> {
        backend.save_caller_user_profile(self.profile.clone()).await
    }

    fn invalidates(&self, _output: &Profile) -> Vec<QueryKey> {
        vec![keys::caller_profile()]
    }
}
