//! Profile and user administration forms

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use super::{require_email, FormSchema};
use crate::domain::UserUpdate;

/// The logged-in user's own profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditProfileForm {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    pub email: String,
}

impl FormSchema for EditProfileForm {
    fn refine(&self, errors: &mut ValidationErrors) {
        require_email(errors, "email", &self.email, "Invalid email address");
    }
}

/// Administrator edit of another account, including role assignment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UserAdminForm {
    #[validate(length(min = 2, message = "Name is required"))]
    pub first_name: String,
    #[validate(length(min = 2, message = "Last name is required"))]
    pub last_name: String,
    pub email: String,
    #[validate(length(min = 1, message = "Role is required"))]
    pub role: String,
    pub language: String,
    pub designation: Option<String>,
}

impl FormSchema for UserAdminForm {
    fn refine(&self, errors: &mut ValidationErrors) {
        require_email(errors, "email", &self.email, "Please enter a valid work email address.");
    }
}

impl From<UserAdminForm> for UserUpdate {
    fn from(form: UserAdminForm) -> Self {
        Self {
            first_name: Some(form.first_name),
            last_name: Some(form.last_name),
            email: Some(form.email),
            role: Some(form.role),
            language: Some(form.language),
            designation: form.designation,
        }
    }
}
