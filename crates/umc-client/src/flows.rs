//! Session flows behind the console screens
//!
//! Each flow validates its form, calls the backend through the gateway and
//! commits the resulting session through the store entry points.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use umc_core::access::{Access, RouteGuard};
use umc_core::forms::{
    EditProfileForm, FormSchema, ForgotPasswordForm, LoginForm, ResetPasswordForm, SignupForm, UserAdminForm,
};
use umc_core::{
    AuthPayload, AuthSession, DomainError, Envelope, ListUsersQuery, ManagedUser, ProfileRecord, SessionUser,
    TokenPair,
};
use umc_shared::config::AppConfig;
use umc_store::SessionStore;

use crate::api::{decode, AuthApi, EditPayload, UsersApi};
use crate::error::ClientError;
use crate::gateway::Gateway;
use crate::request::{FilePart, MultipartBody};
use crate::transport::{HttpTransport, Transport};

#[derive(Clone)]
pub struct SessionFlows {
    store: Arc<SessionStore>,
    auth: AuthApi,
    users: UsersApi,
}

impl SessionFlows {
    pub fn new(transport: Arc<dyn Transport>, store: Arc<SessionStore>) -> Self {
        let gateway = Gateway::new(transport, store.clone());
        Self {
            store,
            auth: AuthApi::new(gateway.clone()),
            users: UsersApi::new(gateway),
        }
    }

    /// Wires an HTTP transport from the `api` settings.
    pub fn from_config(config: &AppConfig, store: Arc<SessionStore>) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(
            config.api.base_url.clone(),
            Duration::from_secs(config.api.timeout_seconds),
        )?;
        Ok(Self::new(Arc::new(transport), store))
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn auth(&self) -> &AuthApi {
        &self.auth
    }

    pub fn users(&self) -> &UsersApi {
        &self.users
    }

    pub fn guard(&self, guard: &RouteGuard) -> Access {
        guard.evaluate(&self.store.session())
    }

    fn commit_login(&self, payload: AuthPayload) -> SessionUser {
        let user = SessionUser::from(payload.user);
        let token = TokenPair::from(payload.tokens);
        self.store.set_user(AuthSession::new(Some(user.clone()), Some(token)));
        info!("Logged in as {} ({})", user.user_id, user.role);
        user
    }

    fn current_user(&self) -> Result<SessionUser, ClientError> {
        self.store
            .session()
            .user
            .ok_or_else(|| DomainError::NotAuthenticated.into())
    }

    pub async fn login(&self, form: &LoginForm) -> Result<SessionUser, ClientError> {
        let payload = self.auth.login(form).await?;
        Ok(self.commit_login(payload))
    }

    pub async fn google_login(&self, id_token: &str) -> Result<SessionUser, ClientError> {
        let payload = self.auth.google_login(id_token).await?;
        Ok(self.commit_login(payload))
    }

    pub async fn register(&self, form: &SignupForm) -> Result<Value, ClientError> {
        self.auth.register(form).await
    }

    pub async fn forgot_password(&self, form: &ForgotPasswordForm) -> Result<Value, ClientError> {
        self.auth.forgot_password(form).await
    }

    pub async fn reset_password(&self, token: &str, form: &ResetPasswordForm) -> Result<Value, ClientError> {
        self.auth.reset_password(token, form).await
    }

    pub async fn verify_email(&self, token: &str) -> Result<Value, ClientError> {
        self.auth.verify_email(token).await
    }

    /// Finishes the OAuth redirect: store the tokens with no identity, fetch
    /// the profile with them, then store the full session. A failed profile
    /// fetch leaves the token-only session in place.
    pub async fn complete_oauth(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> Result<SessionUser, ClientError> {
        let (Some(access), Some(refresh)) = (
            access_token.filter(|t| !t.is_empty()),
            refresh_token.filter(|t| !t.is_empty()),
        ) else {
            warn!("OAuth redirect carried no tokens");
            return Err(DomainError::MissingOAuthTokens.into());
        };

        let token = TokenPair { access_token: access.to_string(), refresh_token: refresh.to_string() };
        self.store.set_user(AuthSession::new(None, Some(token.clone())));

        let profile = self.auth.profile().await?;
        let user = SessionUser::from(profile);
        // The gateway may have refreshed the access token while fetching.
        let token = self.store.session().token.unwrap_or(token);
        self.store.set_user(AuthSession::new(Some(user.clone()), Some(token)));
        info!("OAuth login completed for {}", user.user_id);
        Ok(user)
    }

    /// Multipart update of the current user's profile. Response fields win,
    /// form values fill gaps; role is kept and the image is kept unless the
    /// server returns a new one.
    pub async fn update_profile(
        &self,
        form: &EditProfileForm,
        image: Option<FilePart>,
    ) -> Result<SessionUser, ClientError> {
        form.check()?;
        let current = self.current_user()?;

        let mut body = MultipartBody::new()
            .text("firstName", form.first_name.clone())
            .text("lastName", form.last_name.clone())
            .text("email", form.email.clone());
        if let Some(image) = image {
            body = body.file(FilePart { field: "profileImage".to_string(), ..image });
        }

        let response = self
            .users
            .edit_user(&current.user_id, EditPayload::Multipart(body))
            .await?;
        let updated = match decode::<Envelope<ProfileRecord>>(response) {
            Ok(envelope) => envelope.data,
            Err(e) => {
                warn!("Profile update response not understood, keeping form values: {}", e);
                ProfileRecord::default()
            }
        };

        let non_empty = |value: String, fallback: &str| {
            if value.is_empty() {
                fallback.to_string()
            } else {
                value
            }
        };
        let user = SessionUser {
            user_id: current.user_id.clone(),
            first_name: non_empty(updated.first_name, &form.first_name),
            last_name: Some(non_empty(updated.last_name.unwrap_or_default(), &form.last_name)),
            email: non_empty(updated.email, &form.email),
            role: current.role.clone(),
            profile_image: updated.profile_image.or(current.profile_image),
        };

        let token = self.store.session().token;
        self.store.set_user(AuthSession::new(Some(user.clone()), token));
        Ok(user)
    }

    /// Changes the current user's password, then ends the session.
    pub async fn update_password(&self, form: &ResetPasswordForm) -> Result<Value, ClientError> {
        let current = self.current_user()?;
        let response = self.users.update_password(&current.user_id, form).await?;
        info!("Password updated, logging out");
        self.store.logout();
        Ok(response)
    }

    /// Fetches a page of users and keeps it in the user-list slice.
    pub async fn load_users(&self, query: &ListUsersQuery) -> Result<Vec<ManagedUser>, ClientError> {
        let users = self.users.list_users(query).await?;
        self.store.set_all_users(users.clone());
        Ok(users)
    }

    pub async fn user_details(&self, user_id: &str) -> Result<ManagedUser, ClientError> {
        self.users.user_details(user_id).await
    }

    /// Admin edit of another user's record.
    pub async fn edit_user(&self, user_id: &str, form: UserAdminForm) -> Result<Value, ClientError> {
        form.check()?;
        let response = self.users.edit_user(user_id, EditPayload::Json(form.into())).await?;
        info!("User {} updated", user_id);
        Ok(response)
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<Value, ClientError> {
        let response = self.users.delete_user(user_id).await?;
        info!("User {} deleted", user_id);
        Ok(response)
    }

    pub fn logout(&self) {
        self.store.logout();
    }
}
