use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::access::{Access, guard_owner};
use crate::domain::auth::AuthenticatedUser;
use crate::domain::category::Category;
use crate::domain::comment::CommentEntry;
use crate::domain::location::Location;
use crate::domain::post::{NewPost, Post, PostEntry, PostUpdate};
use crate::domain::types::PostId;
use crate::forms::posts::PostFormPayload;
use crate::pagination::Paginated;
use crate::repository::{
    CategoryReader, CommentReader, LocationReader, PostListQuery, PostOrder, PostReader,
    PostWriter, UserReader,
};
use crate::services::{active_user, paginated_posts};
use crate::urls;

use super::{ServiceError, ServiceResult};

/// Everything the post detail page renders.
#[derive(Debug, Serialize)]
pub struct PostDetail {
    pub entry: PostEntry,
    pub comments: Vec<CommentEntry>,
}

/// Options of the category and location selects on the post form.
#[derive(Debug, Serialize)]
pub struct PostFormChoices {
    pub categories: Vec<Category>,
    pub locations: Vec<Location>,
}

/// Result of a successful post update.
#[derive(Debug, PartialEq)]
pub struct UpdatedPost {
    pub id: PostId,
    /// Previously stored image that is no longer referenced.
    pub stale_image: Option<String>,
}

/// Publicly visible posts, newest first.
pub fn home_page<R>(
    page: usize,
    per_page: usize,
    now: NaiveDateTime,
    repo: &R,
) -> ServiceResult<Paginated<PostEntry>>
where
    R: PostReader,
{
    let query = PostListQuery::default()
        .visible_at(now)
        .order(PostOrder::Newest);
    paginated_posts(repo, query, page, per_page)
}

/// A visible post with its comments in creation order.
pub fn post_detail<R>(id: PostId, now: NaiveDateTime, repo: &R) -> ServiceResult<PostDetail>
where
    R: PostReader + CommentReader,
{
    let entry = match repo.get_post_entry(id, Some(now)) {
        Ok(Some(entry)) => entry,
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get post {id}: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let comments = match repo.list_comments_for_post(id) {
        Ok(comments) => comments,
        Err(e) => {
            log::error!("Failed to list comments of post {id}: {e}");
            return Err(ServiceError::Internal);
        }
    };

    Ok(PostDetail { entry, comments })
}

pub fn post_form_choices<R>(repo: &R) -> ServiceResult<PostFormChoices>
where
    R: CategoryReader + LocationReader,
{
    let categories = match repo.list_categories(None) {
        Ok((_total, categories)) => categories,
        Err(e) => {
            log::error!("Failed to list categories: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let locations = match repo.list_locations(None) {
        Ok((_total, locations)) => locations,
        Err(e) => {
            log::error!("Failed to list locations: {e}");
            return Err(ServiceError::Internal);
        }
    };

    Ok(PostFormChoices {
        categories,
        locations,
    })
}

/// Reject category or location ids that do not exist.
fn check_choices<R>(payload: &PostFormPayload, repo: &R) -> ServiceResult<()>
where
    R: CategoryReader + LocationReader,
{
    match repo.get_category_by_id(payload.category_id) {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Err(ServiceError::Form(
                "Выберите корректную категорию.".to_string(),
            ));
        }
        Err(e) => {
            log::error!("Failed to get category: {e}");
            return Err(ServiceError::Internal);
        }
    }

    if let Some(location_id) = payload.location_id {
        match repo.get_location_by_id(location_id) {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Err(ServiceError::Form(
                    "Выберите корректное местоположение.".to_string(),
                ));
            }
            Err(e) => {
                log::error!("Failed to get location: {e}");
                return Err(ServiceError::Internal);
            }
        }
    }

    Ok(())
}

/// Create a post authored by `user`.
pub fn create_post<R>(
    payload: PostFormPayload,
    image: Option<String>,
    user: &AuthenticatedUser,
    now: NaiveDateTime,
    repo: &R,
) -> ServiceResult<Post>
where
    R: UserReader + CategoryReader + LocationReader + PostWriter,
{
    let author = active_user(user, repo)?;
    check_choices(&payload, repo)?;

    let new_post = NewPost {
        title: payload.title,
        text: payload.text,
        pub_date: payload.pub_date,
        is_published: payload.is_published,
        created_at: now,
        image,
        author_id: author.id,
        location_id: payload.location_id,
        category_id: Some(payload.category_id),
    };

    match repo.create_post(&new_post) {
        Ok(post) => Ok(post),
        Err(e) => {
            log::error!("Failed to create post: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Load a post for a mutation, sending non-owners to `denied`.
fn owned_post<R>(
    id: PostId,
    user: &AuthenticatedUser,
    denied: impl FnOnce(&Post) -> String,
    repo: &R,
) -> ServiceResult<Post>
where
    R: PostReader,
{
    let post = match repo.get_post_by_id(id) {
        Ok(Some(post)) => post,
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get post {id}: {e}");
            return Err(ServiceError::Internal);
        }
    };

    match guard_owner(post.author_id, user, &denied(&post)) {
        Access::Allowed => Ok(post),
        Access::Denied(redirect_to) => Err(ServiceError::Forbidden { redirect_to }),
    }
}

/// The post behind the edit page; non-owners go back to the post.
pub fn post_for_edit<R>(id: PostId, user: &AuthenticatedUser, repo: &R) -> ServiceResult<Post>
where
    R: PostReader,
{
    owned_post(id, user, |post| urls::post_detail(post.id), repo)
}

/// The post behind the delete confirmation; non-owners go to the index.
pub fn post_for_delete<R>(id: PostId, user: &AuthenticatedUser, repo: &R) -> ServiceResult<Post>
where
    R: PostReader,
{
    owned_post(id, user, |_| urls::INDEX.to_string(), repo)
}

/// Apply an edit made by the post's author.
///
/// `uploaded_image` replaces the current image; otherwise the image is kept
/// unless the form asked to clear it.
pub fn update_post<R>(
    id: PostId,
    payload: PostFormPayload,
    uploaded_image: Option<String>,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<UpdatedPost>
where
    R: PostReader + PostWriter + CategoryReader + LocationReader,
{
    let post = post_for_edit(id, user, repo)?;
    check_choices(&payload, repo)?;

    let image = match uploaded_image {
        Some(path) => Some(path),
        None if payload.clear_image => None,
        None => post.image.clone(),
    };
    let stale_image = post.image.filter(|old| image.as_ref() != Some(old));

    let update = PostUpdate {
        title: payload.title,
        text: payload.text,
        pub_date: payload.pub_date,
        is_published: payload.is_published,
        image,
        location_id: payload.location_id,
        category_id: Some(payload.category_id),
    };

    match repo.update_post(id, &update) {
        Ok(_) => Ok(UpdatedPost { id, stale_image }),
        Err(e) => {
            log::error!("Failed to update post {id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Delete a post and its comments. Returns the image path to clean up.
pub fn delete_post<R>(
    id: PostId,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<Option<String>>
where
    R: PostReader + PostWriter,
{
    let post = post_for_delete(id, user, repo)?;

    match repo.delete_post(id) {
        Ok(_) => Ok(post.image),
        Err(e) => {
            log::error!("Failed to delete post {id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}
