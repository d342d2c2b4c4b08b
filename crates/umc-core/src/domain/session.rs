//! Client-side session: identity plus credential pair

use serde::{Deserialize, Serialize};

/// Identity of the logged-in user as held by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

impl SessionUser {
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Both halves are set together except during the OAuth redirect, where
/// the token arrives first and `user` is filled by a later profile fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: Option<SessionUser>,
    pub token: Option<TokenPair>,
}

impl AuthSession {
    pub fn new(user: Option<SessionUser>, token: Option<TokenPair>) -> Self {
        Self { user, token }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.token.is_none()
    }

    /// Access token, if present and non-empty.
    pub fn access_token(&self) -> Option<&str> {
        self.token
            .as_ref()
            .map(|t| t.access_token.as_str())
            .filter(|t| !t.is_empty())
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.refresh_token.as_str())
    }

    pub fn role(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.role.as_str())
    }

    /// Session after a successful refresh: same identity, same refresh
    /// token, new access token.
    pub fn refreshed(&self, access_token: String) -> Self {
        Self {
            user: self.user.clone(),
            token: Some(TokenPair {
                access_token,
                refresh_token: self.refresh_token().unwrap_or_default().to_string(),
            }),
        }
    }
}
