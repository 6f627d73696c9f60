use diesel::prelude::*;

use crate::domain::types::UserId;
use crate::domain::user::{NewUser, User, UserCredentials, UserProfileUpdate};
use crate::models::user::{NewUser as DbNewUser, User as DbUser};
use crate::pagination::Pagination;
use crate::repository::{DieselRepository, RepositoryResult, UserReader, UserWriter};

impl UserReader for DieselRepository {
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let user = users::table
            .filter(users::id.eq(id.get()))
            .first::<DbUser>(&mut conn)
            .optional()?;

        Ok(user.map(TryInto::try_into).transpose()?)
    }

    fn get_user_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let user = users::table
            .filter(users::username.eq(username))
            .first::<DbUser>(&mut conn)
            .optional()?;

        Ok(user.map(TryInto::try_into).transpose()?)
    }

    fn get_credentials(&self, username: &str) -> RepositoryResult<Option<UserCredentials>> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let user = users::table
            .filter(users::username.eq(username))
            .first::<DbUser>(&mut conn)
            .optional()?;

        Ok(user.map(TryInto::try_into).transpose()?)
    }

    fn list_users(&self, pagination: Option<Pagination>) -> RepositoryResult<(usize, Vec<User>)> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let total = users::table.count().get_result::<i64>(&mut conn)? as usize;

        let mut items = users::table.into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(pagination) = &pagination {
            items = items
                .offset(pagination.sql_offset())
                .limit(pagination.sql_limit());
        }

        let items = items
            .order(users::username.asc())
            .load::<DbUser>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<User>, _>>()?;

        Ok((total, items))
    }
}

impl UserWriter for DieselRepository {
    fn create_user(&self, user: &NewUser) -> RepositoryResult<User> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_user: DbNewUser = user.clone().into();

        let created = diesel::insert_into(users::table)
            .values(db_user)
            .returning(DbUser::as_returning())
            .get_result(&mut conn)?;

        Ok(created.try_into()?)
    }

    fn update_profile(&self, id: UserId, update: &UserProfileUpdate) -> RepositoryResult<usize> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let affected = diesel::update(users::table.filter(users::id.eq(id.get())))
            .set((
                users::username.eq(update.username.as_str()),
                users::first_name.eq(&update.first_name),
                users::last_name.eq(&update.last_name),
                users::email.eq(&update.email),
            ))
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn delete_user(&self, id: UserId) -> RepositoryResult<usize> {
        use crate::schema::users;

        let mut conn = self.conn()?;

        let affected =
            diesel::delete(users::table.filter(users::id.eq(id.get()))).execute(&mut conn)?;

        Ok(affected)
    }
}
