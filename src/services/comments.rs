use chrono::NaiveDateTime;

use crate::domain::access::{Access, CommentDeniedRedirect, guard_owner};
use crate::domain::auth::AuthenticatedUser;
use crate::domain::comment::{Comment, NewComment};
use crate::domain::types::{CommentId, PostId};
use crate::forms::comments::{CommentForm, CommentFormPayload};
use crate::repository::{CommentReader, CommentWriter, PostReader, UserReader};
use crate::services::active_user;
use crate::urls;

use super::{ServiceError, ServiceResult};

/// Attach a comment by `user` to an existing post.
///
/// Invalid input is dropped without an error; `Ok(false)` tells the caller
/// nothing was saved.
pub fn add_comment<R>(
    post_id: PostId,
    form: CommentForm,
    user: &AuthenticatedUser,
    now: NaiveDateTime,
    repo: &R,
) -> ServiceResult<bool>
where
    R: UserReader + PostReader + CommentWriter,
{
    let author = active_user(user, repo)?;

    match repo.get_post_by_id(post_id) {
        Ok(Some(_)) => {}
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get post {post_id}: {e}");
            return Err(ServiceError::Internal);
        }
    }

    let payload: CommentFormPayload = match form.try_into() {
        Ok(payload) => payload,
        Err(e) => {
            log::info!("Discarding invalid comment on post {post_id}: {e}");
            return Ok(false);
        }
    };

    let comment = NewComment {
        text: payload.text,
        post_id,
        author_id: author.id,
        created_at: now,
    };

    match repo.create_comment(&comment) {
        Ok(_) => Ok(true),
        Err(e) => {
            log::error!("Failed to create comment: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Load a comment for editing or deletion by its author.
pub fn owned_comment<R>(
    id: CommentId,
    user: &AuthenticatedUser,
    denied: CommentDeniedRedirect,
    repo: &R,
) -> ServiceResult<Comment>
where
    R: CommentReader,
{
    let comment = match repo.get_comment_by_id(id) {
        Ok(Some(comment)) => comment,
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get comment {id}: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let redirect_to = match denied {
        CommentDeniedRedirect::Index => urls::INDEX.to_string(),
        CommentDeniedRedirect::Post => urls::post_detail(comment.post_id),
    };

    match guard_owner(comment.author_id, user, &redirect_to) {
        Access::Allowed => Ok(comment),
        Access::Denied(redirect_to) => Err(ServiceError::Forbidden { redirect_to }),
    }
}

/// Replace the text of a comment. Returns the post it belongs to.
pub fn update_comment<R>(
    id: CommentId,
    form: CommentForm,
    user: &AuthenticatedUser,
    denied: CommentDeniedRedirect,
    repo: &R,
) -> ServiceResult<PostId>
where
    R: CommentReader + CommentWriter,
{
    let comment = owned_comment(id, user, denied, repo)?;
    let payload: CommentFormPayload = form.try_into()?;

    match repo.update_comment_text(id, &payload.text) {
        Ok(_) => Ok(comment.post_id),
        Err(e) => {
            log::error!("Failed to update comment {id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Delete a comment. Returns the post it belonged to.
pub fn delete_comment<R>(
    id: CommentId,
    user: &AuthenticatedUser,
    denied: CommentDeniedRedirect,
    repo: &R,
) -> ServiceResult<PostId>
where
    R: CommentReader + CommentWriter,
{
    let comment = owned_comment(id, user, denied, repo)?;

    match repo.delete_comment(id) {
        Ok(_) => Ok(comment.post_id),
        Err(e) => {
            log::error!("Failed to delete comment {id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}
