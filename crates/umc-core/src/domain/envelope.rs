//! Backend response envelopes

use serde::{Deserialize, Serialize};

use super::session::{SessionUser, TokenPair};

/// `{ "data": ... }` wrapper used by every backend response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// User record as returned by login, profile and edit endpoints.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub profile_image: Option<String>,
}

impl From<ProfileRecord> for SessionUser {
    fn from(record: ProfileRecord) -> Self {
        Self {
            user_id: record.id,
            email: record.email,
            first_name: record.first_name,
            role: record.role,
            last_name: record.last_name,
            profile_image: record.profile_image,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokensRecord {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<TokensRecord> for TokenPair {
    fn from(record: TokensRecord) -> Self {
        Self {
            access_token: record.access_token,
            refresh_token: record.refresh_token,
        }
    }
}

/// Login payload: `{ user, tokens }`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthPayload {
    pub user: ProfileRecord,
    pub tokens: TokensRecord,
}
