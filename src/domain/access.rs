//! Ownership guard consulted before every mutation of a post, comment or
//! profile.

use serde::Deserialize;

use crate::domain::auth::AuthenticatedUser;
use crate::domain::types::UserId;

/// Outcome of an ownership check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Allowed,
    /// The requester is not the owner and should be sent to this path.
    Denied(String),
}

/// Allow the request only when `requester` authored the resource.
pub fn guard_owner(owner: UserId, requester: &AuthenticatedUser, denied: &str) -> Access {
    if owner == requester.id {
        Access::Allowed
    } else {
        Access::Denied(denied.to_string())
    }
}

/// Where a non-owner lands after trying to edit or delete someone else's
/// comment.
///
/// `Index` keeps the historical behaviour; `Post` matches what the post
/// handlers do.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommentDeniedRedirect {
    #[default]
    Index,
    Post,
}

/// Which posts a visitor sees on someone else's profile page.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProfileVisibility {
    /// Every post of the profile owner, hidden and scheduled ones included.
    #[default]
    All,
    /// Hidden and scheduled posts are listed only for their author.
    OwnerOnly,
}
