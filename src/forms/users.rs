use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

use crate::domain::types::{TypeConstraintError, Username};
use crate::domain::user::{User, UserProfileUpdate};

pub const PASSWORD_MIN_LENGTH: u64 = 8;

fn optional_email(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || value.trim().validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("email"))
    }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize, Validate)]
#[validate(schema(function = "passwords_match", skip_on_field_errors = false))]
#[serde(default)]
pub struct RegistrationForm {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[serde(skip_serializing)]
    #[validate(length(min = PASSWORD_MIN_LENGTH))]
    pub password1: String,
    #[serde(skip_serializing)]
    pub password2: String,
}

fn passwords_match(form: &RegistrationForm) -> Result<(), ValidationError> {
    if form.password1 == form.password2 {
        Ok(())
    } else {
        Err(ValidationError::new("password_mismatch"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationFormPayload {
    pub username: Username,
    pub password: String,
}

#[derive(Debug, Error)]
pub enum RegistrationFormError {
    #[error("Registration form validation failed: {0}")]
    Validation(String),
    #[error("Registration form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for RegistrationFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for RegistrationFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<RegistrationForm> for RegistrationFormPayload {
    type Error = RegistrationFormError;

    fn try_from(value: RegistrationForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            username: Username::new(value.username)?,
            password: value.password1,
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct LoginForm {
    #[validate(length(min = 1))]
    pub username: String,
    #[serde(skip_serializing)]
    #[validate(length(min = 1))]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginFormPayload {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Error)]
pub enum LoginFormError {
    #[error("Login form validation failed: {0}")]
    Validation(String),
}

impl From<ValidationErrors> for LoginFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl TryFrom<LoginForm> for LoginFormPayload {
    type Error = LoginFormError;

    fn try_from(value: LoginForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            username: value.username.trim().to_string(),
            password: value.password,
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct ProfileForm {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,
    #[serde(default)]
    #[validate(length(max = 254), custom(function = "optional_email"))]
    pub email: String,
}

impl From<&User> for ProfileForm {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.to_string(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProfileFormError {
    #[error("Profile form validation failed: {0}")]
    Validation(String),
    #[error("Profile form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for ProfileFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for ProfileFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<ProfileForm> for UserProfileUpdate {
    type Error = ProfileFormError;

    fn try_from(value: ProfileForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            username: Username::new(value.username)?,
            first_name: value.first_name.trim().to_string(),
            last_name: value.last_name.trim().to_string(),
            email: value.email.trim().to_string(),
        })
    }
}

/// Timestamp recorded for newly registered users.
pub fn date_joined_now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}
