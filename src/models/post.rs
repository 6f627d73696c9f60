use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::post::{NewPost as DomainNewPost, Post as DomainPost, PostUpdate};
use crate::domain::types::{BodyText, PostTitle, TypeConstraintError};

/// Diesel model representing the `posts` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::posts)]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub text: String,
    pub pub_date: NaiveDateTime,
    pub is_published: bool,
    pub created_at: NaiveDateTime,
    pub image: Option<String>,
    pub author_id: i32,
    pub location_id: Option<i32>,
    pub category_id: Option<i32>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::posts)]
pub struct NewPost {
    pub title: String,
    pub text: String,
    pub pub_date: NaiveDateTime,
    pub is_published: bool,
    pub created_at: NaiveDateTime,
    pub image: Option<String>,
    pub author_id: i32,
    pub location_id: Option<i32>,
    pub category_id: Option<i32>,
}

/// Changeset for post edits; `treat_none_as_null` lets an edit clear the
/// image, location or category.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::posts, treat_none_as_null = true)]
pub struct PostChangeset {
    pub title: String,
    pub text: String,
    pub pub_date: NaiveDateTime,
    pub is_published: bool,
    pub image: Option<String>,
    pub location_id: Option<i32>,
    pub category_id: Option<i32>,
}

impl TryFrom<Post> for DomainPost {
    type Error = TypeConstraintError;

    fn try_from(post: Post) -> Result<Self, Self::Error> {
        Ok(Self {
            id: post.id.try_into()?,
            title: PostTitle::new(post.title)?,
            text: BodyText::new_for_field(post.text, "text")?,
            pub_date: post.pub_date,
            is_published: post.is_published,
            created_at: post.created_at,
            image: post.image.filter(|image| !image.is_empty()),
            author_id: post.author_id.try_into()?,
            location_id: post.location_id.map(TryInto::try_into).transpose()?,
            category_id: post.category_id.map(TryInto::try_into).transpose()?,
        })
    }
}

impl From<DomainNewPost> for NewPost {
    fn from(post: DomainNewPost) -> Self {
        Self {
            title: post.title.into_inner(),
            text: post.text.into_inner(),
            pub_date: post.pub_date,
            is_published: post.is_published,
            created_at: post.created_at,
            image: post.image,
            author_id: post.author_id.get(),
            location_id: post.location_id.map(|id| id.get()),
            category_id: post.category_id.map(|id| id.get()),
        }
    }
}

impl From<PostUpdate> for PostChangeset {
    fn from(update: PostUpdate) -> Self {
        Self {
            title: update.title.into_inner(),
            text: update.text.into_inner(),
            pub_date: update.pub_date,
            is_published: update.is_published,
            image: update.image,
            location_id: update.location_id.map(|id| id.get()),
            category_id: update.category_id.map(|id| id.get()),
        }
    }
}
