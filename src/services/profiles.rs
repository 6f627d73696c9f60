use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::access::ProfileVisibility;
use crate::domain::auth::AuthenticatedUser;
use crate::domain::post::PostEntry;
use crate::domain::user::{User, UserProfileUpdate};
use crate::forms::users::ProfileForm;
use crate::pagination::Paginated;
use crate::repository::{PostListQuery, PostOrder, PostReader, RepositoryError, UserReader, UserWriter};
use crate::services::{active_user, paginated_posts};
use crate::urls;

use super::{ServiceError, ServiceResult};

#[derive(Debug, Serialize)]
pub struct ProfilePage {
    pub profile: User,
    pub posts: Paginated<PostEntry>,
    /// The viewer is looking at their own profile.
    pub is_owner: bool,
}

/// A user's page with their posts.
///
/// With [`ProfileVisibility::All`] every post is listed to everyone,
/// including hidden and scheduled ones.
pub fn profile_page<R>(
    username: &str,
    viewer: Option<&AuthenticatedUser>,
    page: usize,
    per_page: usize,
    visibility: ProfileVisibility,
    now: NaiveDateTime,
    repo: &R,
) -> ServiceResult<ProfilePage>
where
    R: UserReader + PostReader,
{
    let profile = match repo.get_user_by_username(username) {
        Ok(Some(user)) => user,
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get user '{username}': {e}");
            return Err(ServiceError::Internal);
        }
    };

    let is_owner = viewer.is_some_and(|viewer| viewer.id == profile.id);

    let mut query = PostListQuery::default()
        .author(profile.id)
        .order(PostOrder::Newest);
    if visibility == ProfileVisibility::OwnerOnly && !is_owner {
        query = query.visible_at(now);
    }
    let posts = paginated_posts(repo, query, page, per_page)?;

    Ok(ProfilePage {
        profile,
        posts,
        is_owner,
    })
}

/// The account behind the profile edit page.
///
/// Only the requester's own record is ever editable. A session whose
/// username no longer matches the stored one is sent to the index.
pub fn profile_for_edit<R>(user: &AuthenticatedUser, repo: &R) -> ServiceResult<User>
where
    R: UserReader,
{
    let target = active_user(user, repo)?;

    if target.username != user.username {
        return Err(ServiceError::Forbidden {
            redirect_to: urls::INDEX.to_string(),
        });
    }

    Ok(target)
}

/// Save the profile form. Returns the refreshed identity claims.
pub fn update_profile<R>(
    form: ProfileForm,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<AuthenticatedUser>
where
    R: UserReader + UserWriter,
{
    let target = profile_for_edit(user, repo)?;
    let update: UserProfileUpdate = form.try_into()?;

    match repo.update_profile(target.id, &update) {
        Ok(_) => {}
        Err(RepositoryError::ConstraintViolation(_)) => {
            return Err(ServiceError::Conflict(
                "Пользователь с таким именем уже существует.".to_string(),
            ));
        }
        Err(e) => {
            log::error!("Failed to update profile of user {}: {e}", target.id);
            return Err(ServiceError::Internal);
        }
    }

    match repo.get_user_by_id(target.id) {
        Ok(Some(updated)) => Ok(AuthenticatedUser::from(&updated)),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to reload user {}: {e}", target.id);
            Err(ServiceError::Internal)
        }
    }
}
