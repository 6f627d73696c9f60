use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::types::{BodyText, TypeConstraintError};

#[derive(Debug, Default, Clone, Deserialize, Serialize, Validate)]
pub struct CommentForm {
    #[validate(length(min = 1))]
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentFormPayload {
    pub text: BodyText,
}

#[derive(Debug, Error)]
pub enum CommentFormError {
    #[error("Comment form validation failed: {0}")]
    Validation(String),
    #[error("Comment form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for CommentFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for CommentFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<CommentForm> for CommentFormPayload {
    type Error = CommentFormError;

    fn try_from(value: CommentForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            text: BodyText::new_for_field(value.text, "comment")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_comment_text() {
        let form = CommentForm {
            text: "  Nice trip!  ".to_string(),
        };
        let payload: CommentFormPayload = form.try_into().unwrap();
        assert_eq!(payload.text.as_str(), "Nice trip!");
    }

    #[test]
    fn rejects_blank_comment() {
        let form = CommentForm {
            text: "   ".to_string(),
        };
        let payload: Result<CommentFormPayload, _> = form.try_into();
        assert!(matches!(payload, Err(CommentFormError::TypeConstraint(_))));
    }

    #[test]
    fn rejects_empty_comment() {
        let payload: Result<CommentFormPayload, _> = CommentForm::default().try_into();
        assert!(matches!(payload, Err(CommentFormError::Validation(_))));
    }
}
