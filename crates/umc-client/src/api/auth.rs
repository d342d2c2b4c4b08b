//! Authentication endpoints

use serde_json::{json, Value};
use tracing::info;
use umc_core::forms::{FormSchema, ForgotPasswordForm, LoginForm, ResetPasswordForm, SignupForm};
use umc_core::{AuthPayload, DomainError, Envelope, ProfileRecord};
use umc_shared::utils::mask_email;

use super::decode;
use crate::error::ClientError;
use crate::gateway::Gateway;
use crate::request::ApiRequest;

#[derive(Clone)]
pub struct AuthApi {
    gateway: Gateway,
}

impl AuthApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// POST /auth/login/
    pub async fn login(&self, form: &LoginForm) -> Result<AuthPayload, ClientError> {
        form.check()?;
        info!("Login attempt for {}", mask_email(&form.email));
        let request = ApiRequest::post("/auth/login/")
            .json(json!({ "email": form.email, "password": form.password }));
        let envelope: Envelope<AuthPayload> = decode(self.gateway.execute(request).await?)?;
        Ok(envelope.data)
    }

    /// POST /auth/signup/
    pub async fn register(&self, form: &SignupForm) -> Result<Value, ClientError> {
        form.check()?;
        info!("Registration attempt for {}", mask_email(&form.email));
        let request = ApiRequest::post("/auth/signup/").json(serde_json::to_value(form)?);
        Ok(self.gateway.execute(request).await?)
    }

    /// POST /auth/reset-password/ with the emailed reset token.
    pub async fn reset_password(&self, token: &str, form: &ResetPasswordForm) -> Result<Value, ClientError> {
        form.check()?;
        let request = ApiRequest::post("/auth/reset-password/")
            .json(json!({ "token": token, "password": form.password }));
        Ok(self.gateway.execute(request).await?)
    }

    /// POST /auth/forgot-password/
    pub async fn forgot_password(&self, form: &ForgotPasswordForm) -> Result<Value, ClientError> {
        form.check()?;
        let request = ApiRequest::post("/auth/forgot-password/").json(json!({ "email": form.email }));
        Ok(self.gateway.execute(request).await?)
    }

    /// GET /auth/verify-email/?token=...
    pub async fn verify_email(&self, token: &str) -> Result<Value, ClientError> {
        if token.trim().is_empty() {
            return Err(DomainError::MissingVerificationToken.into());
        }
        let request = ApiRequest::get("/auth/verify-email/")
            .query(vec![("token".to_string(), token.to_string())]);
        Ok(self.gateway.execute(request).await?)
    }

    /// POST /oauth/google/ exchanging a Google ID token.
    pub async fn google_login(&self, id_token: &str) -> Result<AuthPayload, ClientError> {
        let request = ApiRequest::post("/oauth/google/").json(json!({ "idToken": id_token }));
        let envelope: Envelope<AuthPayload> = decode(self.gateway.execute(request).await?)?;
        Ok(envelope.data)
    }

    /// GET /users/profile/
    pub async fn profile(&self) -> Result<ProfileRecord, ClientError> {
        let envelope: Envelope<ProfileRecord> = decode(self.gateway.execute("/users/profile/").await?)?;
        Ok(envelope.data)
    }
}
