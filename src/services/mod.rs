//! Business operations behind the HTTP handlers.
//!
//! Every function is generic over the repository traits it needs so it can be
//! exercised against `TestRepository` in unit tests.

use crate::domain::auth::AuthenticatedUser;
use crate::domain::post::PostEntry;
use crate::domain::user::User;
use crate::pagination::{Paginated, clamp_page};
use crate::repository::{PostListQuery, PostReader, UserReader};

pub mod admin;
pub mod auth;
pub mod categories;
pub mod comments;
pub mod errors;
pub mod posts;
pub mod profiles;

pub use errors::{ServiceError, ServiceResult};

/// The stored account behind the session claims.
///
/// A session whose account has been deleted counts as anonymous; flags such
/// as `is_staff` are taken from the stored row, not from the cookie.
pub(crate) fn active_user<R>(user: &AuthenticatedUser, repo: &R) -> ServiceResult<User>
where
    R: UserReader,
{
    match repo.get_user_by_id(user.id) {
        Ok(Some(account)) => Ok(account),
        Ok(None) => {
            log::warn!("Rejecting session of deleted user {}", user.id);
            Err(ServiceError::Unauthorized)
        }
        Err(e) => {
            log::error!("Failed to get user {}: {e}", user.id);
            Err(ServiceError::Internal)
        }
    }
}

/// Load one page of posts, clamping out-of-range page numbers to the
/// nearest existing page.
pub(crate) fn paginated_posts<R>(
    repo: &R,
    query: PostListQuery,
    page: usize,
    per_page: usize,
) -> ServiceResult<Paginated<PostEntry>>
where
    R: PostReader,
{
    let page = page.max(1);
    let (total, items) = match repo.list_posts(query.clone().paginate(page, per_page)) {
        Ok(result) => result,
        Err(e) => {
            log::error!("Failed to list posts: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let clamped = clamp_page(page, total, per_page);
    if clamped == page {
        return Ok(Paginated::new(items, page, total, per_page));
    }

    match repo.list_posts(query.paginate(clamped, per_page)) {
        Ok((total, items)) => Ok(Paginated::new(items, clamped, total, per_page)),
        Err(e) => {
            log::error!("Failed to list posts: {e}");
            Err(ServiceError::Internal)
        }
    }
}
