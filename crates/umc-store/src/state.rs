//! Client state slices and the reducer that applies actions to them

use serde::{Deserialize, Serialize};
use umc_core::{AuthSession, ManagedUser, TokenPair};

/// Last fetched user list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSlice {
    pub users: Vec<ManagedUser>,
}

/// Everything persisted under the storage key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientState {
    #[serde(default)]
    pub auth: AuthSession,
    #[serde(default)]
    pub user: UserSlice,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Full replace of identity and credentials.
    SetUser(AuthSession),
    /// Replace credentials only.
    SetToken(TokenPair),
    /// Reset every slice to its initial state.
    Logout,
    SetAllUsers(Vec<ManagedUser>),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::SetUser(_) => "auth/setUser",
            Action::SetToken(_) => "auth/setToken",
            Action::Logout => "auth/logout",
            Action::SetAllUsers(_) => "user/setAllUser",
        }
    }
}

impl ClientState {
    pub fn reduce(self, action: Action) -> Self {
        match action {
            Action::SetUser(session) => Self { auth: session, ..self },
            Action::SetToken(pair) => Self {
                auth: AuthSession { user: self.auth.user, token: Some(pair) },
                user: self.user,
            },
            Action::Logout => Self::default(),
            Action::SetAllUsers(users) => Self { user: UserSlice { users }, ..self },
        }
    }
}
