use chrono::NaiveDateTime;

use crate::db::{DbConnection, DbPool};
use crate::domain::category::{Category, NewCategory};
use crate::domain::comment::{Comment, CommentEntry, NewComment};
use crate::domain::location::{Location, NewLocation};
use crate::domain::post::{NewPost, Post, PostEntry, PostUpdate};
use crate::domain::types::{
    BodyText, CategoryId, CommentId, LocationId, PostId, UserId,
};
use crate::domain::user::{NewUser, User, UserCredentials, UserProfileUpdate};
use crate::pagination::Pagination;

pub mod category;
pub mod comment;
pub mod errors;
pub mod location;
pub mod post;
#[cfg(test)]
pub mod test;
pub mod user;

pub use errors::{RepositoryError, RepositoryResult};

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Sort order of post listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostOrder {
    /// Newest publication date first.
    #[default]
    Newest,
    /// Insertion order.
    IdAscending,
}

/// Query parameters used when listing posts.
#[derive(Debug, Clone, Default)]
pub struct PostListQuery {
    /// Keep only posts visible to the public at this instant.
    pub visible_at: Option<NaiveDateTime>,
    /// Filter by category.
    pub category_id: Option<CategoryId>,
    /// Filter by author.
    pub author_id: Option<UserId>,
    pub order: PostOrder,
    /// Pagination parameters.
    pub pagination: Option<Pagination>,
}

impl PostListQuery {
    pub fn visible_at(mut self, now: NaiveDateTime) -> Self {
        self.visible_at = Some(now);
        self
    }
    pub fn category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }
    pub fn author(mut self, author_id: UserId) -> Self {
        self.author_id = Some(author_id);
        self
    }
    pub fn order(mut self, order: PostOrder) -> Self {
        self.order = order;
        self
    }
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination::new(page, per_page));
        self
    }
}

/// Read-only operations for user accounts.
pub trait UserReader {
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
    fn get_user_by_username(&self, username: &str) -> RepositoryResult<Option<User>>;
    /// Fetch a user along with the stored password hash.
    fn get_credentials(&self, username: &str) -> RepositoryResult<Option<UserCredentials>>;
    fn list_users(&self, pagination: Option<Pagination>) -> RepositoryResult<(usize, Vec<User>)>;
}

/// Write operations for user accounts.
pub trait UserWriter {
    fn create_user(&self, user: &NewUser) -> RepositoryResult<User>;
    fn update_profile(&self, id: UserId, update: &UserProfileUpdate) -> RepositoryResult<usize>;
    /// Delete a user; their posts and comments go with them.
    fn delete_user(&self, id: UserId) -> RepositoryResult<usize>;
}

/// Read-only operations for category entities.
pub trait CategoryReader {
    fn list_categories(
        &self,
        pagination: Option<Pagination>,
    ) -> RepositoryResult<(usize, Vec<Category>)>;
    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>>;
    fn get_category_by_slug(&self, slug: &str) -> RepositoryResult<Option<Category>>;
}

/// Write operations for category entities.
pub trait CategoryWriter {
    /// Persist a new category. Fails with `ConstraintViolation` on a taken slug.
    fn create_category(&self, category: &NewCategory) -> RepositoryResult<Category>;
    fn set_category_published(&self, id: CategoryId, is_published: bool)
    -> RepositoryResult<usize>;
    /// Delete a category; its posts keep existing without one.
    fn delete_category(&self, id: CategoryId) -> RepositoryResult<usize>;
}

/// Read-only operations for location entities.
pub trait LocationReader {
    fn list_locations(
        &self,
        pagination: Option<Pagination>,
    ) -> RepositoryResult<(usize, Vec<Location>)>;
    fn get_location_by_id(&self, id: LocationId) -> RepositoryResult<Option<Location>>;
}

/// Write operations for location entities.
pub trait LocationWriter {
    fn create_location(&self, location: &NewLocation) -> RepositoryResult<Location>;
    fn set_location_published(&self, id: LocationId, is_published: bool)
    -> RepositoryResult<usize>;
    /// Delete a location; its posts keep existing without one.
    fn delete_location(&self, id: LocationId) -> RepositoryResult<usize>;
}

/// Read-only operations for posts.
pub trait PostReader {
    /// List posts with their relations and comment counts.
    fn list_posts(&self, query: PostListQuery) -> RepositoryResult<(usize, Vec<PostEntry>)>;
    fn get_post_by_id(&self, id: PostId) -> RepositoryResult<Option<Post>>;
    /// Fetch a post with its relations, optionally only when publicly visible
    /// at the given instant.
    fn get_post_entry(
        &self,
        id: PostId,
        visible_at: Option<NaiveDateTime>,
    ) -> RepositoryResult<Option<PostEntry>>;
}

/// Write operations for posts.
pub trait PostWriter {
    fn create_post(&self, post: &NewPost) -> RepositoryResult<Post>;
    fn update_post(&self, id: PostId, update: &PostUpdate) -> RepositoryResult<usize>;
    fn set_post_published(&self, id: PostId, is_published: bool) -> RepositoryResult<usize>;
    /// Delete a post together with its comments.
    fn delete_post(&self, id: PostId) -> RepositoryResult<usize>;
}

/// Read-only operations for comments.
pub trait CommentReader {
    /// Comments of a post in ascending `created_at` order.
    fn list_comments_for_post(&self, post_id: PostId) -> RepositoryResult<Vec<CommentEntry>>;
    fn list_comments(
        &self,
        pagination: Option<Pagination>,
    ) -> RepositoryResult<(usize, Vec<CommentEntry>)>;
    fn get_comment_by_id(&self, id: CommentId) -> RepositoryResult<Option<Comment>>;
}

/// Write operations for comments.
pub trait CommentWriter {
    fn create_comment(&self, comment: &NewComment) -> RepositoryResult<Comment>;
    fn update_comment_text(&self, id: CommentId, text: &BodyText) -> RepositoryResult<usize>;
    fn delete_comment(&self, id: CommentId) -> RepositoryResult<usize>;
}
