use std::cell::RefCell;

use chrono::NaiveDateTime;

use crate::domain::category::{Category, NewCategory};
use crate::domain::comment::{Comment, CommentEntry, NewComment};
use crate::domain::location::{Location, NewLocation};
use crate::domain::post::{NewPost, Post, PostEntry, PostUpdate};
use crate::domain::types::{BodyText, CategoryId, CommentId, LocationId, PostId, UserId};
use crate::domain::user::{NewUser, User, UserCredentials, UserProfileUpdate};
use crate::pagination::Pagination;
use crate::repository::{
    CategoryReader, CategoryWriter, CommentReader, CommentWriter, LocationReader,
    LocationWriter, PostListQuery, PostOrder, PostReader, PostWriter, RepositoryError,
    RepositoryResult, UserReader, UserWriter,
};

#[derive(Default)]
struct State {
    users: Vec<(User, String)>,
    categories: Vec<Category>,
    locations: Vec<Location>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
}

/// Simple in-memory repository used for unit tests.
///
/// Mirrors the storage schema's delete policies: removing a category or
/// location clears the reference on posts, removing a post or user removes
/// what depends on it.
#[derive(Default)]
pub struct TestRepository {
    state: RefCell<State>,
}

fn page<T>(items: Vec<T>, pagination: Option<Pagination>) -> (usize, Vec<T>) {
    let total = items.len();
    let items = match pagination {
        Some(pagination) => items
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.per_page)
            .collect(),
        None => items,
    };
    (total, items)
}

fn next_id(ids: impl Iterator<Item = i32>) -> i32 {
    ids.max().unwrap_or(0) + 1
}

impl TestRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user: User) -> Self {
        self.state
            .borrow_mut()
            .users
            .push((user, "!unusable".to_string()));
        self
    }

    pub fn with_credentials(self, user: User, password_hash: &str) -> Self {
        self.state
            .borrow_mut()
            .users
            .push((user, password_hash.to_string()));
        self
    }

    pub fn with_categories(self, categories: Vec<Category>) -> Self {
        self.state.borrow_mut().categories.extend(categories);
        self
    }

    pub fn with_locations(self, locations: Vec<Location>) -> Self {
        self.state.borrow_mut().locations.extend(locations);
        self
    }

    pub fn with_posts(self, posts: Vec<Post>) -> Self {
        self.state.borrow_mut().posts.extend(posts);
        self
    }

    pub fn with_comments(self, comments: Vec<Comment>) -> Self {
        self.state.borrow_mut().comments.extend(comments);
        self
    }

    pub fn posts(&self) -> Vec<Post> {
        self.state.borrow().posts.clone()
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.state.borrow().comments.clone()
    }

    pub fn users(&self) -> Vec<User> {
        self.state.borrow().users.iter().map(|(u, _)| u.clone()).collect()
    }

    pub fn categories(&self) -> Vec<Category> {
        self.state.borrow().categories.clone()
    }

    fn entry(state: &State, post: &Post) -> RepositoryResult<PostEntry> {
        let author_username = state
            .users
            .iter()
            .find(|(u, _)| u.id == post.author_id)
            .map(|(u, _)| u.username.clone())
            .ok_or(RepositoryError::NotFound)?;
        let category = post
            .category_id
            .and_then(|id| state.categories.iter().find(|c| c.id == id).cloned());
        let location = post
            .location_id
            .and_then(|id| state.locations.iter().find(|l| l.id == id).cloned());
        let comment_count = state
            .comments
            .iter()
            .filter(|c| c.post_id == post.id)
            .count() as i64;
        Ok(PostEntry {
            post: post.clone(),
            author_username,
            category,
            location,
            comment_count,
        })
    }

    fn comment_entry(state: &State, comment: &Comment) -> RepositoryResult<CommentEntry> {
        let author_username = state
            .users
            .iter()
            .find(|(u, _)| u.id == comment.author_id)
            .map(|(u, _)| u.username.clone())
            .ok_or(RepositoryError::NotFound)?;
        Ok(CommentEntry {
            comment: comment.clone(),
            author_username,
        })
    }
}

impl UserReader for TestRepository {
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        let state = self.state.borrow();
        Ok(state.users.iter().find(|(u, _)| u.id == id).map(|(u, _)| u.clone()))
    }

    fn get_user_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        let state = self.state.borrow();
        Ok(state
            .users
            .iter()
            .find(|(u, _)| u.username == username)
            .map(|(u, _)| u.clone()))
    }

    fn get_credentials(&self, username: &str) -> RepositoryResult<Option<UserCredentials>> {
        let state = self.state.borrow();
        Ok(state
            .users
            .iter()
            .find(|(u, _)| u.username == username)
            .map(|(u, hash)| UserCredentials {
                user: u.clone(),
                password_hash: hash.clone(),
            }))
    }

    fn list_users(&self, pagination: Option<Pagination>) -> RepositoryResult<(usize, Vec<User>)> {
        let state = self.state.borrow();
        let users = state.users.iter().map(|(u, _)| u.clone()).collect();
        Ok(page(users, pagination))
    }
}

impl UserWriter for TestRepository {
    fn create_user(&self, user: &NewUser) -> RepositoryResult<User> {
        let mut state = self.state.borrow_mut();
        if state.users.iter().any(|(u, _)| u.username == user.username) {
            return Err(RepositoryError::ConstraintViolation(
                "UNIQUE constraint failed: users.username".to_string(),
            ));
        }
        let id = next_id(state.users.iter().map(|(u, _)| u.id.get()));
        let created = User {
            id: UserId::new(id).map_err(|e| RepositoryError::ValidationError(e.to_string()))?,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            is_staff: user.is_staff,
            date_joined: user.date_joined,
        };
        state
            .users
            .push((created.clone(), user.password_hash.clone()));
        Ok(created)
    }

    fn update_profile(&self, id: UserId, update: &UserProfileUpdate) -> RepositoryResult<usize> {
        let mut state = self.state.borrow_mut();
        if state
            .users
            .iter()
            .any(|(u, _)| u.id != id && u.username == update.username)
        {
            return Err(RepositoryError::ConstraintViolation(
                "UNIQUE constraint failed: users.username".to_string(),
            ));
        }
        let mut affected = 0;
        for (user, _) in state.users.iter_mut().filter(|(u, _)| u.id == id) {
            user.username = update.username.clone();
            user.first_name = update.first_name.clone();
            user.last_name = update.last_name.clone();
            user.email = update.email.clone();
            affected += 1;
        }
        Ok(affected)
    }

    fn delete_user(&self, id: UserId) -> RepositoryResult<usize> {
        let mut state = self.state.borrow_mut();
        let before = state.users.len();
        state.users.retain(|(u, _)| u.id != id);
        let removed_posts = state
            .posts
            .iter()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect::<Vec<_>>();
        state.posts.retain(|p| p.author_id != id);
        state
            .comments
            .retain(|c| c.author_id != id && !removed_posts.contains(&c.post_id));
        Ok(before - state.users.len())
    }
}

impl CategoryReader for TestRepository {
    fn list_categories(
        &self,
        pagination: Option<Pagination>,
    ) -> RepositoryResult<(usize, Vec<Category>)> {
        Ok(page(self.state.borrow().categories.clone(), pagination))
    }

    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>> {
        let state = self.state.borrow();
        Ok(state.categories.iter().find(|c| c.id == id).cloned())
    }

    fn get_category_by_slug(&self, slug: &str) -> RepositoryResult<Option<Category>> {
        let state = self.state.borrow();
        Ok(state.categories.iter().find(|c| c.slug == slug).cloned())
    }
}

impl CategoryWriter for TestRepository {
    fn create_category(&self, category: &NewCategory) -> RepositoryResult<Category> {
        let mut state = self.state.borrow_mut();
        if state.categories.iter().any(|c| c.slug == category.slug) {
            return Err(RepositoryError::ConstraintViolation(
                "UNIQUE constraint failed: categories.slug".to_string(),
            ));
        }
        let id = next_id(state.categories.iter().map(|c| c.id.get()));
        let created = Category {
            id: CategoryId::new(id)
                .map_err(|e| RepositoryError::ValidationError(e.to_string()))?,
            title: category.title.clone(),
            description: category.description.clone(),
            slug: category.slug.clone(),
            is_published: category.is_published,
            created_at: category.created_at,
        };
        state.categories.push(created.clone());
        Ok(created)
    }

    fn set_category_published(
        &self,
        id: CategoryId,
        is_published: bool,
    ) -> RepositoryResult<usize> {
        let mut state = self.state.borrow_mut();
        let mut affected = 0;
        for category in state.categories.iter_mut().filter(|c| c.id == id) {
            category.is_published = is_published;
            affected += 1;
        }
        Ok(affected)
    }

    fn delete_category(&self, id: CategoryId) -> RepositoryResult<usize> {
        let mut state = self.state.borrow_mut();
        let before = state.categories.len();
        state.categories.retain(|c| c.id != id);
        for post in state.posts.iter_mut().filter(|p| p.category_id == Some(id)) {
            post.category_id = None;
        }
        Ok(before - state.categories.len())
    }
}

impl LocationReader for TestRepository {
    fn list_locations(
        &self,
        pagination: Option<Pagination>,
    ) -> RepositoryResult<(usize, Vec<Location>)> {
        Ok(page(self.state.borrow().locations.clone(), pagination))
    }

    fn get_location_by_id(&self, id: LocationId) -> RepositoryResult<Option<Location>> {
        let state = self.state.borrow();
        Ok(state.locations.iter().find(|l| l.id == id).cloned())
    }
}

impl LocationWriter for TestRepository {
    fn create_location(&self, location: &NewLocation) -> RepositoryResult<Location> {
        let mut state = self.state.borrow_mut();
        let id = next_id(state.locations.iter().map(|l| l.id.get()));
        let created = Location {
            id: LocationId::new(id)
                .map_err(|e| RepositoryError::ValidationError(e.to_string()))?,
            name: location.name.clone(),
            is_published: location.is_published,
            created_at: location.created_at,
        };
        state.locations.push(created.clone());
        Ok(created)
    }

    fn set_location_published(
        &self,
        id: LocationId,
        is_published: bool,
    ) -> RepositoryResult<usize> {
        let mut state = self.state.borrow_mut();
        let mut affected = 0;
        for location in state.locations.iter_mut().filter(|l| l.id == id) {
            location.is_published = is_published;
            affected += 1;
        }
        Ok(affected)
    }

    fn delete_location(&self, id: LocationId) -> RepositoryResult<usize> {
        let mut state = self.state.borrow_mut();
        let before = state.locations.len();
        state.locations.retain(|l| l.id != id);
        for post in state.posts.iter_mut().filter(|p| p.location_id == Some(id)) {
            post.location_id = None;
        }
        Ok(before - state.locations.len())
    }
}

impl PostReader for TestRepository {
    fn list_posts(&self, query: PostListQuery) -> RepositoryResult<(usize, Vec<PostEntry>)> {
        let state = self.state.borrow();
        let mut items = state
            .posts
            .iter()
            .map(|p| Self::entry(&state, p))
            .collect::<RepositoryResult<Vec<_>>>()?;

        if let Some(now) = query.visible_at {
            items.retain(|e| e.is_visible_at(now));
        }
        if let Some(category_id) = query.category_id {
            items.retain(|e| e.post.category_id == Some(category_id));
        }
        if let Some(author_id) = query.author_id {
            items.retain(|e| e.post.author_id == author_id);
        }
        match query.order {
            PostOrder::Newest => items.sort_by(|a, b| {
                (b.post.pub_date, b.post.id).cmp(&(a.post.pub_date, a.post.id))
            }),
            PostOrder::IdAscending => items.sort_by_key(|e| e.post.id),
        }

        Ok(page(items, query.pagination))
    }

    fn get_post_by_id(&self, id: PostId) -> RepositoryResult<Option<Post>> {
        let state = self.state.borrow();
        Ok(state.posts.iter().find(|p| p.id == id).cloned())
    }

    fn get_post_entry(
        &self,
        id: PostId,
        visible_at: Option<NaiveDateTime>,
    ) -> RepositoryResult<Option<PostEntry>> {
        let state = self.state.borrow();
        let Some(post) = state.posts.iter().find(|p| p.id == id) else {
            return Ok(None);
        };
        let entry = Self::entry(&state, post)?;
        match visible_at {
            Some(now) if !entry.is_visible_at(now) => Ok(None),
            _ => Ok(Some(entry)),
        }
    }
}

impl PostWriter for TestRepository {
    fn create_post(&self, post: &NewPost) -> RepositoryResult<Post> {
        let mut state = self.state.borrow_mut();
        let id = next_id(state.posts.iter().map(|p| p.id.get()));
        let created = Post {
            id: PostId::new(id).map_err(|e| RepositoryError::ValidationError(e.to_string()))?,
            title: post.title.clone(),
            text: post.text.clone(),
            pub_date: post.pub_date,
            is_published: post.is_published,
            created_at: post.created_at,
            image: post.image.clone(),
            author_id: post.author_id,
            location_id: post.location_id,
            category_id: post.category_id,
        };
        state.posts.push(created.clone());
        Ok(created)
    }

    fn update_post(&self, id: PostId, update: &PostUpdate) -> RepositoryResult<usize> {
        let mut state = self.state.borrow_mut();
        let mut affected = 0;
        for post in state.posts.iter_mut().filter(|p| p.id == id) {
            post.title = update.title.clone();
            post.text = update.text.clone();
            post.pub_date = update.pub_date;
            post.is_published = update.is_published;
            post.image = update.image.clone();
            post.location_id = update.location_id;
            post.category_id = update.category_id;
            affected += 1;
        }
        Ok(affected)
    }

    fn set_post_published(&self, id: PostId, is_published: bool) -> RepositoryResult<usize> {
        let mut state = self.state.borrow_mut();
        let mut affected = 0;
        for post in state.posts.iter_mut().filter(|p| p.id == id) {
            post.is_published = is_published;
            affected += 1;
        }
        Ok(affected)
    }

    fn delete_post(&self, id: PostId) -> RepositoryResult<usize> {
        let mut state = self.state.borrow_mut();
        let before = state.posts.len();
        state.posts.retain(|p| p.id != id);
        state.comments.retain(|c| c.post_id != id);
        Ok(before - state.posts.len())
    }
}

impl CommentReader for TestRepository {
    fn list_comments_for_post(&self, post_id: PostId) -> RepositoryResult<Vec<CommentEntry>> {
        let state = self.state.borrow();
        let mut comments = state
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| Self::comment_entry(&state, c))
            .collect::<RepositoryResult<Vec<_>>>()?;
        comments.sort_by_key(|e| (e.comment.created_at, e.comment.id));
        Ok(comments)
    }

    fn list_comments(
        &self,
        pagination: Option<Pagination>,
    ) -> RepositoryResult<(usize, Vec<CommentEntry>)> {
        let state = self.state.borrow();
        let comments = state
            .comments
            .iter()
            .map(|c| Self::comment_entry(&state, c))
            .collect::<RepositoryResult<Vec<_>>>()?;
        Ok(page(comments, pagination))
    }

    fn get_comment_by_id(&self, id: CommentId) -> RepositoryResult<Option<Comment>> {
        let state = self.state.borrow();
        Ok(state.comments.iter().find(|c| c.id == id).cloned())
    }
}

impl CommentWriter for TestRepository {
    fn create_comment(&self, comment: &NewComment) -> RepositoryResult<Comment> {
        let mut state = self.state.borrow_mut();
        let id = next_id(state.comments.iter().map(|c| c.id.get()));
        let created = Comment {
            id: CommentId::new(id)
                .map_err(|e| RepositoryError::ValidationError(e.to_string()))?,
            text: comment.text.clone(),
            post_id: comment.post_id,
            author_id: comment.author_id,
            created_at: comment.created_at,
        };
        state.comments.push(created.clone());
        Ok(created)
    }

    fn update_comment_text(&self, id: CommentId, text: &BodyText) -> RepositoryResult<usize> {
        let mut state = self.state.borrow_mut();
        let mut affected = 0;
        for comment in state.comments.iter_mut().filter(|c| c.id == id) {
            comment.text = text.clone();
            affected += 1;
        }
        Ok(affected)
    }

    fn delete_comment(&self, id: CommentId) -> RepositoryResult<usize> {
        let mut state = self.state.borrow_mut();
        let before = state.comments.len();
        state.comments.retain(|c| c.id != id);
        Ok(before - state.comments.len())
    }
}

/// Sample entities shared by the service tests.
pub mod fixtures {
    use chrono::{DateTime, NaiveDateTime};

    use crate::domain::auth::AuthenticatedUser;
    use crate::domain::category::Category;
    use crate::domain::comment::Comment;
    use crate::domain::location::Location;
    use crate::domain::post::Post;
    use crate::domain::types::{
        BodyText, CategoryId, CategorySlug, CategoryTitle, CommentId, LocationId, LocationName,
        PostId, PostTitle, UserId, Username,
    };
    use crate::domain::user::User;

    /// Seconds since the epoch as a naive UTC timestamp.
    pub fn at(secs: i64) -> NaiveDateTime {
        DateTime::from_timestamp(secs, 0).unwrap().naive_utc()
    }

    pub fn user(id: i32, username: &str) -> User {
        User {
            id: UserId::new(id).unwrap(),
            username: Username::new(username).unwrap(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            is_staff: false,
            date_joined: at(0),
        }
    }

    pub fn claims(user: &User) -> AuthenticatedUser {
        AuthenticatedUser::from(user)
    }

    pub fn category(id: i32, slug: &str, is_published: bool) -> Category {
        Category {
            id: CategoryId::new(id).unwrap(),
            title: CategoryTitle::new(format!("Category {slug}")).unwrap(),
            description: BodyText::new("About it").unwrap(),
            slug: CategorySlug::new(slug).unwrap(),
            is_published,
            created_at: at(0),
        }
    }

    pub fn location(id: i32, name: &str) -> Location {
        Location {
            id: LocationId::new(id).unwrap(),
            name: LocationName::new(name).unwrap(),
            is_published: true,
            created_at: at(0),
        }
    }

    /// Published post dated `pub_date` seconds after the epoch.
    pub fn post(id: i32, author: i32, category: Option<i32>, pub_date: i64) -> Post {
        Post {
            id: PostId::new(id).unwrap(),
            title: PostTitle::new(format!("Post {id}")).unwrap(),
            text: BodyText::new("Some text").unwrap(),
            pub_date: at(pub_date),
            is_published: true,
            created_at: at(0),
            image: None,
            author_id: UserId::new(author).unwrap(),
            location_id: None,
            category_id: category.map(|id| CategoryId::new(id).unwrap()),
        }
    }

    pub fn comment(id: i32, post: i32, author: i32, created_at: i64) -> Comment {
        Comment {
            id: CommentId::new(id).unwrap(),
            text: BodyText::new(format!("Comment {id}")).unwrap(),
            post_id: PostId::new(post).unwrap(),
            author_id: UserId::new(author).unwrap(),
            created_at: at(created_at),
        }
    }
}
