use crate::auth::repo_types::User;
use crate::error::AppError;
use crate::habits::display::DisplayIds;

/// The identity an operator authenticated as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
}

impl From<User> for SessionUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
        }
    }
}

/// Per-operator state: who is logged in and how the last listing was
/// numbered. One per interactive session; nothing here is global.
#[derive(Debug, Default)]
pub struct Session {
    user: Option<SessionUser>,
    pub display_ids: DisplayIds,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Gate for every habit operation.
    pub fn require_user(&self) -> Result<&SessionUser, AppError> {
        self.user.as_ref().ok_or(AppError::NotLoggedIn)
    }

    /// Replaces any current identity; display numbers start over.
    pub fn sign_in(&mut self, user: SessionUser) {
        self.display_ids.clear();
        self.user = Some(user);
    }

    pub fn sign_out(&mut self) -> Option<SessionUser> {
        self.display_ids.clear();
        self.user.take()
    }
}
