use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::category::NewCategory;
use crate::domain::location::NewLocation;
use crate::domain::types::{
    BodyText, CategorySlug, CategoryTitle, LocationName, TypeConstraintError,
};
use crate::forms::checkbox_checked;

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct AddCategoryForm {
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1, max = 64))]
    pub slug: String,
    pub is_published: Option<String>,
}

#[derive(Debug, Error)]
pub enum AddCategoryFormError {
    #[error("Add category form validation failed: {0}")]
    Validation(String),
    #[error("Add category form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for AddCategoryFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for AddCategoryFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<AddCategoryForm> for NewCategory {
    type Error = AddCategoryFormError;

    fn try_from(value: AddCategoryForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            title: CategoryTitle::new(value.title)?,
            description: BodyText::new_for_field(value.description, "description")?,
            slug: CategorySlug::new(value.slug)?,
            is_published: checkbox_checked(value.is_published.as_deref()),
            created_at: Utc::now().naive_utc(),
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct AddLocationForm {
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    pub is_published: Option<String>,
}

#[derive(Debug, Error)]
pub enum AddLocationFormError {
    #[error("Add location form validation failed: {0}")]
    Validation(String),
    #[error("Add location form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for AddLocationFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for AddLocationFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

impl TryFrom<AddLocationForm> for NewLocation {
    type Error = AddLocationFormError;

    fn try_from(value: AddLocationForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            name: LocationName::new(value.name)?,
            is_published: checkbox_checked(value.is_published.as_deref()),
            created_at: Utc::now().naive_utc(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_slug_must_be_url_safe() {
        let form = AddCategoryForm {
            title: "Travel".to_string(),
            description: "Trips".to_string(),
            slug: "travel notes".to_string(),
            is_published: Some("on".to_string()),
        };
        let category: Result<NewCategory, _> = form.try_into();
        assert!(matches!(category, Err(AddCategoryFormError::TypeConstraint(_))));
    }

    #[test]
    fn unchecked_box_hides_location() {
        let form = AddLocationForm {
            name: "Kazan".to_string(),
            is_published: None,
        };
        let location: NewLocation = form.try_into().unwrap();
        assert!(!location.is_published);
    }
}
