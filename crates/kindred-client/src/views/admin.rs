use kindred_shared::{Principal, Role};

use crate::app::App;
use crate::error::Result;
use crate::queries::admin::{AssignRole, CallerRole, IsCallerAdmin};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminState {
    Loading,
    AccessDenied,
    Panel {
        principal: Option<Principal>,
        role: Option<Role>,
    },
}

pub struct AdminView {
    app: App,
}

impl AdminView {
    pub fn new(app: App) -> Self {
        Self { app }
    }

    pub async fn enter(&self) -> Result<()> {
        let is_admin = self.app.queries.ensure(&IsCallerAdmin).await?;
        if *is_admin {
            if let Err(e) = self.app.queries.ensure(&CallerRole).await {
                tracing::debug!(error = %e, "Caller role unavailable");
            }
        }
        Ok(())
    }

    pub fn state(&self) -> AdminState {
        match self.app.queries.data(&IsCallerAdmin) {
            None => AdminState::Loading,
            Some(admin) if !*admin => AdminState::AccessDenied,
            Some(_) => AdminState::Panel {
                principal: self.app.session.principal(),
                role: self.app.queries.data(&CallerRole).map(|r| *r),
            },
        }
    }

    /// Text for the clipboard, if there is a principal to copy.
    pub fn copy_principal(&self) -> Option<String> {
        let principal = self.app.session.principal()?;
        self.app.notifier.success("Principal ID copied to clipboard");
        Some(principal.as_str().to_string())
    }

    pub async fn assign_role(&self, user: Principal, role: Role) -> Result<()> {
        match self.app.queries.mutate(&AssignRole { user, role }).await {
            Ok(()) => {
                self.app
                    .notifier
                    .success(format!("Role updated to {}", role.as_str()));
                Ok(())
            }
            Err(e) => {
                self.app.notifier.error("Failed to update role", e.to_string());
                Err(e)
            }
        }
    }
}
