//! Helpers for integration tests.

#![allow(dead_code)]

use blogicum::db::{DbPool, MIGRATIONS, establish_connection_pool};
use blogicum::domain::category::{Category, NewCategory};
use blogicum::domain::location::{Location, NewLocation};
use blogicum::domain::post::{NewPost, Post};
use blogicum::domain::types::{
    BodyText, CategoryId, CategorySlug, CategoryTitle, LocationId, LocationName, PostTitle,
    Username,
};
use blogicum::domain::user::{NewUser, User};
use blogicum::repository::{CategoryWriter, DieselRepository, LocationWriter, PostWriter, UserWriter};
use chrono::{DateTime, NaiveDateTime};
use diesel_migrations::MigrationHarness;
use tempfile::NamedTempFile;

/// Temporary database used in integration tests.
pub struct TestDb {
    _tempfile: NamedTempFile,
    pool: DbPool,
}

impl TestDb {
    pub fn new() -> Self {
        let tempfile = NamedTempFile::new().expect("Failed to create temp file");
        let pool = establish_connection_pool(tempfile.path().to_str().unwrap())
            .expect("Failed to establish SQLite connection.");
        let mut conn = pool
            .get()
            .expect("Failed to get SQLite connection from pool.");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("Migrations failed");
        TestDb {
            _tempfile: tempfile,
            pool,
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }
}

pub fn at(secs: i64) -> NaiveDateTime {
    DateTime::from_timestamp(secs, 0).unwrap().naive_utc()
}

pub fn create_user(repo: &DieselRepository, username: &str) -> User {
    repo.create_user(&NewUser {
        username: Username::new(username).unwrap(),
        password_hash: "!unusable".to_string(),
        first_name: String::new(),
        last_name: String::new(),
        email: String::new(),
        is_staff: false,
        date_joined: at(0),
    })
    .expect("should create user")
}

pub fn create_category(repo: &DieselRepository, slug: &str, is_published: bool) -> Category {
    repo.create_category(&NewCategory {
        title: CategoryTitle::new(format!("Category {slug}")).unwrap(),
        description: BodyText::new("About").unwrap(),
        slug: CategorySlug::new(slug).unwrap(),
        is_published,
        created_at: at(0),
    })
    .expect("should create category")
}

pub fn create_location(repo: &DieselRepository, name: &str) -> Location {
    repo.create_location(&NewLocation {
        name: LocationName::new(name).unwrap(),
        is_published: true,
        created_at: at(0),
    })
    .expect("should create location")
}

pub fn new_post(author: &User, category: Option<CategoryId>, pub_date: i64) -> NewPost {
    NewPost {
        title: PostTitle::new(format!("Post at {pub_date}")).unwrap(),
        text: BodyText::new("Text").unwrap(),
        pub_date: at(pub_date),
        is_published: true,
        created_at: at(0),
        image: None,
        author_id: author.id,
        location_id: None,
        category_id: category,
    }
}

pub fn create_post(
    repo: &DieselRepository,
    author: &User,
    category: Option<CategoryId>,
    location: Option<LocationId>,
    pub_date: i64,
) -> Post {
    let mut post = new_post(author, category, pub_date);
    post.location_id = location;
    repo.create_post(&post).expect("should create post")
}
