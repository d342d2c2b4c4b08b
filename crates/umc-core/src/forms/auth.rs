//! Login, signup and password recovery forms

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use super::{require_email, FormSchema};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LoginForm {
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
}

impl FormSchema for LoginForm {
    fn refine(&self, errors: &mut ValidationErrors) {
        require_email(errors, "email", &self.email, "Invalid email address");
    }
}

/// Serialised as the signup request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupForm {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
}

impl FormSchema for SignupForm {
    fn refine(&self, errors: &mut ValidationErrors) {
        if !self.email.is_empty() {
            require_email(errors, "email", &self.email, "Invalid email");
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ForgotPasswordForm {
    pub email: String,
}

impl FormSchema for ForgotPasswordForm {
    fn refine(&self, errors: &mut ValidationErrors) {
        require_email(errors, "email", &self.email, "Invalid email address");
    }
}

/// Used by both the emailed reset link and the in-app password update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ResetPasswordForm {
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub confirm_password: String,
}

impl FormSchema for ResetPasswordForm {
    fn refine(&self, errors: &mut ValidationErrors) {
        if self.password != self.confirm_password {
            let mut error = ValidationError::new("passwords_mismatch");
            error.message = Some("Passwords don't match".into());
            errors.add("confirm_password", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_form_valid() {
        let form = LoginForm { email: "jane@example.com".into(), password: "correct-horse".into() };
        assert!(form.check().is_ok());
    }

    #[test]
    fn test_login_form_reports_each_field() {
        let form = LoginForm { email: "jane".into(), password: "short".into() };
        let errors = form.check().unwrap_err();
        assert_eq!(errors.messages("email"), ["Invalid email address".to_string()]);
        assert_eq!(
            errors.messages("password"),
            ["Password must be at least 8 characters long".to_string()]
        );
    }

    #[test]
    fn test_signup_requires_names() {
        let form = SignupForm {
            first_name: String::new(),
            last_name: String::new(),
            email: "new@example.com".into(),
            password: "longenough".into(),
        };
        let errors = form.check().unwrap_err();
        assert_eq!(errors.messages("first_name"), ["First name is required".to_string()]);
        assert_eq!(errors.messages("last_name"), ["Last name is required".to_string()]);
        assert!(errors.messages("email").is_empty());
    }

    #[test]
    fn test_signup_body_is_camel_case() {
        let form = SignupForm {
            first_name: "A".into(),
            last_name: "B".into(),
            email: "a@b.io".into(),
            password: "12345678".into(),
        };
        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json["firstName"], "A");
        assert_eq!(json["lastName"], "B");
    }

    #[test]
    fn test_signup_empty_email_reports_required_only() {
        let form = SignupForm {
            first_name: "A".into(),
            last_name: "B".into(),
            email: String::new(),
            password: "12345678".into(),
        };
        let errors = form.check().unwrap_err();
        assert_eq!(errors.messages("email"), ["Email is required".to_string()]);
    }

    #[test]
    fn test_reset_password_mismatch() {
        let form = ResetPasswordForm {
            password: "password-one".into(),
            confirm_password: "password-two".into(),
        };
        let errors = form.check().unwrap_err();
        assert_eq!(errors.messages("confirm_password"), ["Passwords don't match".to_string()]);
        assert!(errors.messages("password").is_empty());
    }

    #[test]
    fn test_forgot_password() {
        assert!(ForgotPasswordForm { email: "x@y.com".into() }.check().is_ok());
        assert!(ForgotPasswordForm { email: "x@".into() }.check().is_err());
    }
}
