use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::post::Post;
use crate::domain::types::{
    BodyText, CategoryId, LocationId, PostTitle, TypeConstraintError,
};
use crate::forms::checkbox_checked;

/// Formats accepted for `pub_date`; the first one is what
/// `<input type="datetime-local">` submits.
const PUB_DATE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Multipart body of the create/edit post page.
#[derive(MultipartForm)]
pub struct PostForm {
    pub title: Text<String>,
    pub text: Text<String>,
    pub pub_date: Text<String>,
    pub category: Option<Text<String>>,
    pub location: Option<Text<String>>,
    pub is_published: Option<Text<String>>,
    #[multipart(limit = "10MB")]
    pub image: Option<TempFile>,
    pub image_clear: Option<Text<String>>,
}

impl PostForm {
    /// Split the text fields from the uploaded file. An empty file input is
    /// treated as no upload.
    pub fn into_parts(self) -> (PostFormData, Option<TempFile>) {
        let data = PostFormData {
            title: self.title.into_inner(),
            text: self.text.into_inner(),
            pub_date: self.pub_date.into_inner(),
            category: self.category.map(Text::into_inner).unwrap_or_default(),
            location: self.location.map(Text::into_inner).unwrap_or_default(),
            is_published: checkbox_checked(self.is_published.as_ref().map(|v| v.as_str())),
            image_clear: checkbox_checked(self.image_clear.as_ref().map(|v| v.as_str())),
        };
        let image = self.image.filter(|file| file.size > 0);
        (data, image)
    }
}

/// Text fields of the post form, also used to refill the form on errors.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct PostFormData {
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    #[validate(length(min = 1))]
    pub text: String,
    #[validate(length(min = 1))]
    pub pub_date: String,
    /// Selected category id; required.
    #[validate(length(min = 1))]
    pub category: String,
    /// Selected location id; empty for none.
    pub location: String,
    pub is_published: bool,
    pub image_clear: bool,
}

impl Default for PostFormData {
    fn default() -> Self {
        Self {
            title: String::new(),
            text: String::new(),
            pub_date: Utc::now().naive_utc().format(PUB_DATE_FORMATS[0]).to_string(),
            category: String::new(),
            location: String::new(),
            is_published: true,
            image_clear: false,
        }
    }
}

impl From<&Post> for PostFormData {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.to_string(),
            text: post.text.to_string(),
            pub_date: post.pub_date.format(PUB_DATE_FORMATS[0]).to_string(),
            category: post
                .category_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            location: post
                .location_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            is_published: post.is_published,
            image_clear: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostFormPayload {
    pub title: PostTitle,
    pub text: BodyText,
    pub pub_date: NaiveDateTime,
    pub is_published: bool,
    pub category_id: CategoryId,
    pub location_id: Option<LocationId>,
    pub clear_image: bool,
}

#[derive(Debug, Error)]
pub enum PostFormError {
    #[error("Post form validation failed: {0}")]
    Validation(String),
    #[error("Post form contains invalid data: {0}")]
    TypeConstraint(String),
    #[error("Publication date must look like YYYY-MM-DDTHH:MM")]
    InvalidPubDate,
    #[error("Selected {0} is not a valid choice")]
    InvalidChoice(&'static str),
}

impl From<ValidationErrors> for PostFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for PostFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

pub fn parse_pub_date(value: &str) -> Result<NaiveDateTime, PostFormError> {
    let value = value.trim();
    PUB_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or(PostFormError::InvalidPubDate)
}

fn parse_choice(value: &str, field: &'static str) -> Result<Option<i32>, PostFormError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<i32>()
        .map(Some)
        .map_err(|_| PostFormError::InvalidChoice(field))
}

impl TryFrom<PostFormData> for PostFormPayload {
    type Error = PostFormError;

    fn try_from(value: PostFormData) -> Result<Self, Self::Error> {
        value.validate()?;

        let category_id = parse_choice(&value.category, "category")?
            .ok_or(PostFormError::InvalidChoice("category"))?;
        let location_id = parse_choice(&value.location, "location")?;

        Ok(Self {
            title: PostTitle::new(value.title)?,
            text: BodyText::new_for_field(value.text, "text")?,
            pub_date: parse_pub_date(&value.pub_date)?,
            is_published: value.is_published,
            category_id: CategoryId::new(category_id)?,
            location_id: location_id.map(LocationId::new).transpose()?,
            clear_image: value.image_clear,
        })
    }
}
