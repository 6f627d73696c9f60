use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::comment::{
    Comment as DomainComment, CommentEntry, NewComment as DomainNewComment,
};
use crate::domain::types::{BodyText, TypeConstraintError, Username};

/// Diesel model representing the `comments` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::comments)]
pub struct Comment {
    pub id: i32,
    pub text: String,
    pub post_id: i32,
    pub author_id: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::comments)]
pub struct NewComment {
    pub text: String,
    pub post_id: i32,
    pub author_id: i32,
    pub created_at: NaiveDateTime,
}

impl TryFrom<Comment> for DomainComment {
    type Error = TypeConstraintError;

    fn try_from(comment: Comment) -> Result<Self, Self::Error> {
        Ok(Self {
            id: comment.id.try_into()?,
            text: BodyText::new_for_field(comment.text, "comment")?,
            post_id: comment.post_id.try_into()?,
            author_id: comment.author_id.try_into()?,
            created_at: comment.created_at,
        })
    }
}

impl TryFrom<(Comment, String)> for CommentEntry {
    type Error = TypeConstraintError;

    fn try_from((comment, username): (Comment, String)) -> Result<Self, Self::Error> {
        Ok(Self {
            comment: comment.try_into()?,
            author_username: Username::new(username)?,
        })
    }
}

impl From<DomainNewComment> for NewComment {
    fn from(comment: DomainNewComment) -> Self {
        Self {
            text: comment.text.into_inner(),
            post_id: comment.post_id.get(),
            author_id: comment.author_id.get(),
            created_at: comment.created_at,
        }
    }
}
