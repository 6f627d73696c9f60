use diesel::prelude::*;

use crate::domain::comment::{Comment, CommentEntry, NewComment};
use crate::domain::types::{BodyText, CommentId, PostId};
use crate::models::comment::{Comment as DbComment, NewComment as DbNewComment};
use crate::pagination::Pagination;
use crate::repository::{CommentReader, CommentWriter, DieselRepository, RepositoryResult};

impl CommentReader for DieselRepository {
    fn list_comments_for_post(&self, post_id: PostId) -> RepositoryResult<Vec<CommentEntry>> {
        use crate::schema::{comments, users};

        let mut conn = self.conn()?;

        let items = comments::table
            .inner_join(users::table)
            .filter(comments::post_id.eq(post_id.get()))
            .order((comments::created_at.asc(), comments::id.asc()))
            .select((DbComment::as_select(), users::username))
            .load::<(DbComment, String)>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<CommentEntry>, _>>()?;

        Ok(items)
    }

    fn list_comments(
        &self,
        pagination: Option<Pagination>,
    ) -> RepositoryResult<(usize, Vec<CommentEntry>)> {
        use crate::schema::{comments, users};

        let mut conn = self.conn()?;

        let total = comments::table.count().get_result::<i64>(&mut conn)? as usize;

        let mut items = comments::table
            .inner_join(users::table)
            .select((DbComment::as_select(), users::username))
            .into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(pagination) = &pagination {
            items = items
                .offset(pagination.sql_offset())
                .limit(pagination.sql_limit());
        }

        let items = items
            .order((comments::created_at.asc(), comments::id.asc()))
            .load::<(DbComment, String)>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<CommentEntry>, _>>()?;

        Ok((total, items))
    }

    fn get_comment_by_id(&self, id: CommentId) -> RepositoryResult<Option<Comment>> {
        use crate::schema::comments;

        let mut conn = self.conn()?;

        let comment = comments::table
            .filter(comments::id.eq(id.get()))
            .first::<DbComment>(&mut conn)
            .optional()?;

        Ok(comment.map(TryInto::try_into).transpose()?)
    }
}

impl CommentWriter for DieselRepository {
    fn create_comment(&self, comment: &NewComment) -> RepositoryResult<Comment> {
        use crate::schema::comments;

        let mut conn = self.conn()?;
        let db_comment: DbNewComment = comment.clone().into();

        let created = diesel::insert_into(comments::table)
            .values(db_comment)
            .returning(DbComment::as_returning())
            .get_result(&mut conn)?;

        Ok(created.try_into()?)
    }

    fn update_comment_text(&self, id: CommentId, text: &BodyText) -> RepositoryResult<usize> {
        use crate::schema::comments;

        let mut conn = self.conn()?;

        let affected = diesel::update(comments::table.filter(comments::id.eq(id.get())))
            .set(comments::text.eq(text.as_str()))
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn delete_comment(&self, id: CommentId) -> RepositoryResult<usize> {
        use crate::schema::comments;

        let mut conn = self.conn()?;

        let affected = diesel::delete(comments::table.filter(comments::id.eq(id.get())))
            .execute(&mut conn)?;

        Ok(affected)
    }
}
