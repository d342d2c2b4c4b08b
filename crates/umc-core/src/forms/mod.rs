//! Form schemas
//!
//! Every form is checked locally before a request is built; a failing
//! form never reaches the network.

mod auth;
mod profile;

pub use auth::{ForgotPasswordForm, LoginForm, ResetPasswordForm, SignupForm};
pub use profile::{EditProfileForm, UserAdminForm};

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;
use validator::{Validate, ValidationError, ValidationErrors};

/// Per-field validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub fields: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for FormErrors {}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = BTreeMap::new();
        for (field, errs) in errors.field_errors() {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            fields.insert(field.to_string(), messages);
        }
        Self { fields }
    }
}

/// Derived field rules plus cross-field refinements.
pub trait FormSchema: Validate {
    /// Extra checks the derive cannot express.
    fn refine(&self, _errors: &mut ValidationErrors) {}

    fn check(&self) -> Result<(), FormErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(e) => e,
        };
        self.refine(&mut errors);
        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors.into())
        }
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("static email pattern")
    })
}

/// Address check used by every form carrying an email field.
pub fn validate_email(email: &str) -> bool {
    email_regex().is_match(&email.to_lowercase())
}

pub(crate) fn require_email(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    message: &'static str,
) {
    if !validate_email(value) {
        let mut error = ValidationError::new("email");
        error.message = Some(message.into());
        errors.add(field, error);
    }
}
