//! User administration endpoints with tag-based response caching

use serde_json::{json, Value};
use umc_core::forms::{FormSchema, ResetPasswordForm};
use umc_core::{CacheTag, Envelope, ListUsersQuery, ManagedUser, UserUpdate};

use super::decode;
use crate::error::ClientError;
use crate::gateway::Gateway;
use crate::request::{ApiRequest, MultipartBody};

/// Body of `PUT /users/{id}`.
#[derive(Debug, Clone)]
pub enum EditPayload {
    Json(UserUpdate),
    /// Form fields plus an optional profile image.
    Multipart(MultipartBody),
}

#[derive(Clone)]
pub struct UsersApi {
    gateway: Gateway,
}

impl UsersApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// GET /users/ is cached under the `Users` tag.
    pub async fn list_users(&self, query: &ListUsersQuery) -> Result<Vec<ManagedUser>, ClientError> {
        let key = query.cache_key();
        let raw = match self.gateway.session().cached(&key) {
            Some(raw) => raw,
            None => {
                let request = ApiRequest::get("/users/").query(query.params());
                let raw = self.gateway.execute(request).await?;
                self.gateway
                    .session()
                    .cache_response(key, raw.clone(), vec![CacheTag::Users]);
                raw
            }
        };
        let envelope: Envelope<Vec<ManagedUser>> = decode(raw)?;
        Ok(envelope.data)
    }

    /// GET /users/{id} is cached under `UserDetails(id)`.
    pub async fn user_details(&self, user_id: &str) -> Result<ManagedUser, ClientError> {
        let key = format!("userDetails({})", user_id);
        let raw = match self.gateway.session().cached(&key) {
            Some(raw) => raw,
            None => {
                let raw = self.gateway.execute(format!("/users/{}", user_id)).await?;
                self.gateway.session().cache_response(
                    key,
                    raw.clone(),
                    vec![CacheTag::UserDetails(user_id.to_string())],
                );
                raw
            }
        };
        let envelope: Envelope<ManagedUser> = decode(raw)?;
        Ok(envelope.data)
    }

    /// PUT /users/{id}; invalidates `Users` and `UserDetails(id)`.
    pub async fn edit_user(&self, user_id: &str, payload: EditPayload) -> Result<Value, ClientError> {
        let request = ApiRequest::put(format!("/users/{}", user_id));
        let request = match payload {
            EditPayload::Json(update) => request.json(serde_json::to_value(&update)?),
            EditPayload::Multipart(body) => request.multipart(body),
        };
        let response = self.gateway.execute(request).await?;
        self.gateway
            .session()
            .invalidate(&[CacheTag::Users, CacheTag::UserDetails(user_id.to_string())]);
        Ok(response)
    }

    /// DELETE /users/{id}; invalidates `Users`.
    pub async fn delete_user(&self, user_id: &str) -> Result<Value, ClientError> {
        let response = self
            .gateway
            .execute(ApiRequest::delete(format!("/users/{}", user_id)))
            .await?;
        self.gateway.session().invalidate(&[CacheTag::Users]);
        Ok(response)
    }

    /// POST /users/password-reset-confirm/{uuid}/
    pub async fn update_password(&self, uuid: &str, form: &ResetPasswordForm) -> Result<Value, ClientError> {
        form.check()?;
        let request = ApiRequest::post(format!("/users/password-reset-confirm/{}/", uuid)).json(json!({
            "new_password": form.password,
            "confirm_password": form.confirm_password,
        }));
        Ok(self.gateway.execute(request).await?)
    }
}
