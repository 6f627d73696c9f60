use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{BodyText, CommentId, PostId, UserId, Username};

/// Reader comment attached to a post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub text: BodyText,
    pub post_id: PostId,
    pub author_id: UserId,
    pub created_at: NaiveDateTime,
}

/// Comment joined with its author's username, as shown under a post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommentEntry {
    pub comment: Comment,
    pub author_username: Username,
}

/// Data required to insert a new [`Comment`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub text: BodyText,
    pub post_id: PostId,
    pub author_id: UserId,
    pub created_at: NaiveDateTime,
}
