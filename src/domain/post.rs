use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::category::Category;
use crate::domain::location::Location;
use crate::domain::types::{BodyText, CategoryId, LocationId, PostId, PostTitle, UserId, Username};

/// A blog publication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub title: PostTitle,
    pub text: BodyText,
    /// May lie in the future for scheduled publications.
    pub pub_date: NaiveDateTime,
    pub is_published: bool,
    pub created_at: NaiveDateTime,
    /// Path relative to the media root.
    pub image: Option<String>,
    pub author_id: UserId,
    pub location_id: Option<LocationId>,
    pub category_id: Option<CategoryId>,
}

/// Post joined with the relations rendered next to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostEntry {
    pub post: Post,
    pub author_username: Username,
    pub category: Option<Category>,
    pub location: Option<Location>,
    pub comment_count: i64,
}

impl PostEntry {
    /// Whether anonymous readers may see this post at `now`.
    pub fn is_visible_at(&self, now: NaiveDateTime) -> bool {
        is_publicly_visible(
            self.post.is_published,
            self.category.as_ref().map(|c| c.is_published),
            self.post.pub_date,
            now,
        )
    }
}

/// The publication predicate shared by the home listing, the category
/// listing and the detail page.
///
/// A post without a category is never visible.
pub fn is_publicly_visible(
    is_published: bool,
    category_published: Option<bool>,
    pub_date: NaiveDateTime,
    now: NaiveDateTime,
) -> bool {
    is_published && category_published.unwrap_or(false) && pub_date <= now
}

/// Data required to insert a new [`Post`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub title: PostTitle,
    pub text: BodyText,
    pub pub_date: NaiveDateTime,
    pub is_published: bool,
    pub created_at: NaiveDateTime,
    pub image: Option<String>,
    pub author_id: UserId,
    pub location_id: Option<LocationId>,
    pub category_id: Option<CategoryId>,
}

/// Editable fields of an existing [`Post`]. Author and creation time are
/// never changed.
#[derive(Debug, Clone, PartialEq)]
pub struct PostUpdate {
    pub title: PostTitle,
    pub text: BodyText,
    pub pub_date: NaiveDateTime,
    pub is_published: bool,
    pub image: Option<String>,
    pub location_id: Option<LocationId>,
    pub category_id: Option<CategoryId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn at(secs: i64) -> NaiveDateTime {
        DateTime::from_timestamp(secs, 0).unwrap().naive_utc()
    }

    #[test]
    fn visible_requires_every_condition() {
        let now = at(1_000);
        assert!(is_publicly_visible(true, Some(true), at(1_000), now));
        assert!(!is_publicly_visible(false, Some(true), at(0), now));
        assert!(!is_publicly_visible(true, Some(false), at(0), now));
        assert!(!is_publicly_visible(true, None, at(0), now));
        assert!(!is_publicly_visible(true, Some(true), at(1_001), now));
    }
}
