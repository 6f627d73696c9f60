use std::collections::HashMap;

use chrono::NaiveDateTime;
use diesel::dsl;
use diesel::prelude::*;

use crate::domain::category::Category;
use crate::domain::location::Location;
use crate::domain::post::{NewPost, Post, PostEntry, PostUpdate};
use crate::domain::types::{PostId, TypeConstraintError, Username};
use crate::models::category::Category as DbCategory;
use crate::models::location::Location as DbLocation;
use crate::models::post::{NewPost as DbNewPost, Post as DbPost, PostChangeset};
use crate::repository::{
    DieselRepository, PostListQuery, PostOrder, PostReader, PostWriter, RepositoryResult,
};
use crate::schema::{categories, comments, locations, posts, users};

/// SQL form of [`crate::domain::post::is_publicly_visible`].
type VisibleAt = dsl::And<
    dsl::And<dsl::Eq<posts::is_published, bool>, dsl::Eq<categories::is_published, bool>>,
    dsl::LtEq<posts::pub_date, NaiveDateTime>,
>;

/// Publication filter applied by every public listing and the detail page.
///
/// Works against the `posts LEFT JOIN categories` source; posts without a
/// category compare against NULL and drop out.
fn visible_at(now: NaiveDateTime) -> VisibleAt {
    posts::is_published
        .eq(true)
        .and(categories::is_published.eq(true))
        .and(posts::pub_date.le(now))
}

type PostRow = (DbPost, String, Option<DbCategory>, Option<DbLocation>);

fn into_entry(row: PostRow, comment_count: i64) -> Result<PostEntry, TypeConstraintError> {
    let (post, username, category, location) = row;
    Ok(PostEntry {
        post: post.try_into()?,
        author_username: Username::new(username)?,
        category: category.map(Category::try_from).transpose()?,
        location: location.map(Location::try_from).transpose()?,
        comment_count,
    })
}

fn comment_counts(
    conn: &mut SqliteConnection,
    post_ids: &[i32],
) -> QueryResult<HashMap<i32, i64>> {
    let counts = comments::table
        .filter(comments::post_id.eq_any(post_ids))
        .group_by(comments::post_id)
        .select((comments::post_id, dsl::count_star()))
        .load::<(i32, i64)>(conn)?;
    Ok(counts.into_iter().collect())
}

impl PostReader for DieselRepository {
    fn list_posts(&self, query: PostListQuery) -> RepositoryResult<(usize, Vec<PostEntry>)> {
        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = posts::table
                .inner_join(users::table)
                .left_join(categories::table)
                .left_join(locations::table)
                .into_boxed::<diesel::sqlite::Sqlite>();

            if let Some(now) = query.visible_at {
                items = items.filter(visible_at(now));
            }

            if let Some(category_id) = query.category_id {
                items = items.filter(posts::category_id.eq(category_id.get()));
            }

            if let Some(author_id) = query.author_id {
                items = items.filter(posts::author_id.eq(author_id.get()));
            }

            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder().select((
            posts::all_columns,
            users::username,
            categories::all_columns.nullable(),
            locations::all_columns.nullable(),
        ));

        if let Some(pagination) = &query.pagination {
            items = items
                .offset(pagination.sql_offset())
                .limit(pagination.sql_limit());
        }

        items = match query.order {
            PostOrder::Newest => items.order((posts::pub_date.desc(), posts::id.desc())),
            PostOrder::IdAscending => items.order(posts::id.asc()),
        };

        let rows = items.load::<PostRow>(&mut conn)?;

        let ids = rows.iter().map(|row| row.0.id).collect::<Vec<_>>();
        let counts = comment_counts(&mut conn, &ids)?;

        let items = rows
            .into_iter()
            .map(|row| {
                let count = counts.get(&row.0.id).copied().unwrap_or(0);
                into_entry(row, count)
            })
            .collect::<Result<Vec<PostEntry>, _>>()?;

        Ok((total, items))
    }

    fn get_post_by_id(&self, id: PostId) -> RepositoryResult<Option<Post>> {
        let mut conn = self.conn()?;

        let post = posts::table
            .filter(posts::id.eq(id.get()))
            .first::<DbPost>(&mut conn)
            .optional()?;

        Ok(post.map(TryInto::try_into).transpose()?)
    }

    fn get_post_entry(
        &self,
        id: PostId,
        visible: Option<NaiveDateTime>,
    ) -> RepositoryResult<Option<PostEntry>> {
        let mut conn = self.conn()?;

        let mut query = posts::table
            .inner_join(users::table)
            .left_join(categories::table)
            .left_join(locations::table)
            .filter(posts::id.eq(id.get()))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(now) = visible {
            query = query.filter(visible_at(now));
        }

        let row = query
            .select((
                posts::all_columns,
                users::username,
                categories::all_columns.nullable(),
                locations::all_columns.nullable(),
            ))
            .first::<PostRow>(&mut conn)
            .optional()?;

        let Some(row) = row else {
            return Ok(None);
        };

        let count = comment_counts(&mut conn, &[row.0.id])?
            .get(&row.0.id)
            .copied()
            .unwrap_or(0);

        Ok(Some(into_entry(row, count)?))
    }
}

impl PostWriter for DieselRepository {
    fn create_post(&self, post: &NewPost) -> RepositoryResult<Post> {
        let mut conn = self.conn()?;
        let db_post: DbNewPost = post.clone().into();

        let created = diesel::insert_into(posts::table)
            .values(db_post)
            .returning(DbPost::as_returning())
            .get_result(&mut conn)?;

        Ok(created.try_into()?)
    }

    fn update_post(&self, id: PostId, update: &PostUpdate) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        let changeset: PostChangeset = update.clone().into();

        let affected = diesel::update(posts::table.filter(posts::id.eq(id.get())))
            .set(changeset)
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn set_post_published(&self, id: PostId, is_published: bool) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;

        let affected = diesel::update(posts::table.filter(posts::id.eq(id.get())))
            .set(posts::is_published.eq(is_published))
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn delete_post(&self, id: PostId) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;

        // comments.post_id is ON DELETE CASCADE in the schema.
        let affected =
            diesel::delete(posts::table.filter(posts::id.eq(id.get()))).execute(&mut conn)?;

        Ok(affected)
    }
}
