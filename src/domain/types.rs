//! Strongly-typed value objects used by domain entities.
//!
//! Domain structs should carry these wrappers instead of raw primitives so that
//! identifiers, text values and slugs are enforced at the boundary.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Maximum length for titles and names.
pub const TITLE_MAX_LENGTH: usize = 256;
/// Maximum length for category slugs.
pub const SLUG_MAX_LENGTH: usize = 64;
/// Maximum length for usernames.
pub const USERNAME_MAX_LENGTH: usize = 150;

/// Errors produced when attempting to construct constrained domain types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// An identifier was zero or negative.
    #[error("{0} must be greater than zero")]
    NonPositiveId(&'static str),
    /// A string was empty or whitespace-only after trimming.
    #[error("{0} cannot be empty")]
    EmptyString(&'static str),
    /// A string exceeded its maximum length.
    #[error("{0} must be at most {1} characters long")]
    TooLong(&'static str, usize),
    /// Slug contains characters outside `[-a-zA-Z0-9_]`.
    #[error("{0} may contain only latin letters, digits, hyphens and underscores")]
    InvalidSlug(&'static str),
    /// Username contains characters outside `[\w.@+-]`.
    #[error("{0} may contain only letters, digits and @/./+/-/_ characters")]
    InvalidUsername(&'static str),
    /// Catch-all for custom validation failures.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

fn trim_and_require_non_empty<S: Into<String>>(
    value: S,
    field: &'static str,
) -> Result<String, TypeConstraintError> {
    let trimmed = value.into().trim().to_string();
    if trimmed.is_empty() {
        Err(TypeConstraintError::EmptyString(field))
    } else {
        Ok(trimmed)
    }
}

fn require_max_length(
    value: String,
    field: &'static str,
    max: usize,
) -> Result<String, TypeConstraintError> {
    if value.chars().count() > max {
        Err(TypeConstraintError::TooLong(field, max))
    } else {
        Ok(value)
    }
}

/// Wrapper for non-empty, trimmed strings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Trims whitespace and rejects empty inputs.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        Self::new_for_field(value, "value")
    }

    /// Same as [`Self::new`] but with field-specific error context.
    pub fn new_for_field<S: Into<String>>(
        value: S,
        field: &'static str,
    ) -> Result<Self, TypeConstraintError> {
        trim_and_require_non_empty(value, field).map(Self)
    }

    /// Borrow the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper returning the owned string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for NonEmptyString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyString {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(
            Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId($field))
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<i32> for $name {
            fn eq(&self, other: &i32) -> bool {
                self.0 == *other
            }
        }

        impl PartialEq<$name> for i32 {
            fn eq(&self, other: &$name) -> bool {
                *self == other.0
            }
        }
    };
}

/// Macro to generate string newtypes; `$check` runs on the trimmed value.
macro_rules! string_newtype {
    ($name:ident, $doc:expr, $field:expr, $max:expr, $check:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed, non-empty, length-bounded value.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let inner = NonEmptyString::new_for_field(value, $field)?.into_inner();
                let inner = require_max_length(inner, $field, $max)?;
                let check: fn(&str) -> Result<(), TypeConstraintError> = $check;
                check(&inner)?;
                Ok(Self(inner))
            }

            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                self.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }

        impl PartialEq<$name> for &str {
            fn eq(&self, other: &$name) -> bool {
                *self == other.as_str()
            }
        }
    };
}

fn any_text(_: &str) -> Result<(), TypeConstraintError> {
    Ok(())
}

fn slug_charset(value: &str) -> Result<(), TypeConstraintError> {
    if value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        Ok(())
    } else {
        Err(TypeConstraintError::InvalidSlug("slug"))
    }
}

fn username_charset(value: &str) -> Result<(), TypeConstraintError> {
    if value
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        Ok(())
    } else {
        Err(TypeConstraintError::InvalidUsername("username"))
    }
}

id_newtype!(UserId, "Unique identifier for a user.", "user_id");
id_newtype!(
    CategoryId,
    "Unique identifier for a category.",
    "category_id"
);
id_newtype!(
    LocationId,
    "Unique identifier for a location.",
    "location_id"
);
id_newtype!(PostId, "Unique identifier for a post.", "post_id");
id_newtype!(CommentId, "Unique identifier for a comment.", "comment_id");

string_newtype!(
    CategoryTitle,
    "Category title, non-empty and at most 256 characters.",
    "category title",
    TITLE_MAX_LENGTH,
    any_text
);
string_newtype!(
    CategorySlug,
    "URL-safe category identifier.",
    "slug",
    SLUG_MAX_LENGTH,
    slug_charset
);
string_newtype!(
    LocationName,
    "Location name, non-empty and at most 256 characters.",
    "location name",
    TITLE_MAX_LENGTH,
    any_text
);
string_newtype!(
    PostTitle,
    "Post title, non-empty and at most 256 characters.",
    "post title",
    TITLE_MAX_LENGTH,
    any_text
);
string_newtype!(
    Username,
    "Unique login name of a user.",
    "username",
    USERNAME_MAX_LENGTH,
    username_charset
);

/// Free-form text body of a post, description or comment.
pub type BodyText = NonEmptyString;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_non_empty_strings() {
        let value = NonEmptyString::new("  comment  ").unwrap();
        assert_eq!(value.as_str(), "comment");
    }

    #[test]
    fn rejects_non_positive_ids() {
        let err = PostId::new(0).unwrap_err();
        assert_eq!(err, TypeConstraintError::NonPositiveId("post_id"));
    }

    #[test]
    fn slug_accepts_url_safe_characters() {
        assert_eq!(CategorySlug::new(" travel_2024-x ").unwrap(), "travel_2024-x");
    }

    #[test]
    fn slug_rejects_spaces_and_cyrillic() {
        assert_eq!(
            CategorySlug::new("my travel").unwrap_err(),
            TypeConstraintError::InvalidSlug("slug")
        );
        assert!(CategorySlug::new("путешествия").is_err());
    }

    #[test]
    fn slug_is_length_bounded() {
        let long = "a".repeat(SLUG_MAX_LENGTH + 1);
        assert_eq!(
            CategorySlug::new(long).unwrap_err(),
            TypeConstraintError::TooLong("slug", SLUG_MAX_LENGTH)
        );
    }

    #[test]
    fn username_rejects_slashes() {
        assert!(Username::new("leo.tolstoy+1@x").is_ok());
        assert_eq!(
            Username::new("leo/tolstoy").unwrap_err(),
            TypeConstraintError::InvalidUsername("username")
        );
    }
}
