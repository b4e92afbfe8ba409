use kindred_shared::validate::initials;

use crate::app::App;
use crate::error::Result;
use crate::queries::admin::IsCallerAdmin;
use crate::queries::profile::CallerProfile;
use crate::router::Route;
use crate::views::primary_photo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    EditProfile,
    PaymentMethods,
    Admin,
    LogOut,
}

impl MenuAction {
    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::EditProfile => "Edit Profile",
            MenuAction::PaymentMethods => "Payment Methods",
            MenuAction::Admin => "Admin",
            MenuAction::LogOut => "Log out",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountMenu {
    pub display_name: String,
    pub initials: String,
    /// "{age} years old", if a profile exists.
    pub subtitle: Option<String>,
    pub photo: Option<String>,
    pub entries: Vec<MenuAction>,
}

pub struct AccountMenuView {
    app: App,
}

impl AccountMenuView {
    pub fn new(app: App) -> Self {
        Self { app }
    }

    pub async fn enter(&self) -> Result<()> {
        let profile = self.app.queries.ensure(&CallerProfile).await.map(|_| ());
        let admin = self.app.queries.ensure(&IsCallerAdmin).await.map(|_| ());
        profile.and(admin)
    }

    pub fn menu(&self) -> AccountMenu {
        let profile = self.app.queries.data(&CallerProfile);
        let profile = profile.as_deref().and_then(Option::as_ref);
        let display_name = profile.map_or_else(|| "User".to_string(), |p| p.display_name.clone());
        let is_admin = self.app.queries.data(&IsCallerAdmin).is_some_and(|a| *a);

        let mut entries = vec![MenuAction::EditProfile, MenuAction::PaymentMethods];
        if is_admin {
            entries.push(MenuAction::Admin);
        }
        entries.push(MenuAction::LogOut);

        AccountMenu {
            initials: initials(&display_name),
            subtitle: profile.map(|p| format!("{} years old", p.age)),
            photo: profile.map(primary_photo),
            display_name,
            entries,
        }
    }

    pub async fn select(&self, action: MenuAction) -> Result<()> {
        match action {
            MenuAction::EditProfile => self.app.navigator.navigate(Route::Profile { onboarding: false }),
            MenuAction::PaymentMethods => self.app.navigator.navigate(Route::PaymentMethods),
            MenuAction::Admin => self.app.navigator.navigate(Route::Admin),
            MenuAction::LogOut => self.app.logout().await?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::app_with;
    use crate::testing::{profile, MockBackend};

    #[tokio::test]
    async fn test_menu_without_profile() {
        let backend = MockBackend::new();
        let view = AccountMenuView::new(app_with(&backend, Some("aaaaa-aa")).await);
        view.enter().await.unwrap();

        let menu = view.menu();
        assert_eq!(menu.display_name, "User");
        assert_eq!(menu.initials, "U");
        assert_eq!(menu.subtitle, None);
        assert_eq!(menu.entries, [
            MenuAction::EditProfile,
            MenuAction::PaymentMethods,
            MenuAction::LogOut
        ]);
    }

    #[tokio::test]
    async fn test_admin_entry_and_subtitle() {
        let backend = MockBackend::new();
        backend.set_admin(true);
        backend.set_caller_profile(Some(profile("aaaaa-aa", "Ada Lovelace")));
        let view = AccountMenuView::new(app_with(&backend, Some("aaaaa-aa")).await);
        view.enter().await.unwrap();

        let menu = view.menu();
        assert_eq!(menu.initials, "AL");
        assert_eq!(menu.subtitle.as_deref(), Some("30 years old"));
        assert!(menu.entries.contains(&MenuAction::Admin));

        view.select(MenuAction::PaymentMethods).await.unwrap();
        assert_eq!(view.app.navigator.current(), Route::PaymentMethods);
    }

    #[tokio::test]
    async fn test_log_out_returns_to_auth() {
        let backend = MockBackend::new();
        let app = app_with(&backend, Some("aaaaa-aa")).await;
        let view = AccountMenuView::new(app.clone());

        view.select(MenuAction::LogOut).await.unwrap();
        assert_eq!(app.navigator.current(), Route::Auth);
        assert!(app.session.principal().is_none());
        assert_eq!(MenuAction::LogOut.label(), "Log out");
    }
}
