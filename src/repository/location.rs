use diesel::prelude::*;

use crate::domain::location::{Location, NewLocation};
use crate::domain::types::LocationId;
use crate::models::location::{Location as DbLocation, NewLocation as DbNewLocation};
use crate::pagination::Pagination;
use crate::repository::{DieselRepository, LocationReader, LocationWriter, RepositoryResult};

impl LocationReader for DieselRepository {
    fn list_locations(
        &self,
        pagination: Option<Pagination>,
    ) -> RepositoryResult<(usize, Vec<Location>)> {
        use crate::schema::locations;

        let mut conn = self.conn()?;

        let total = locations::table.count().get_result::<i64>(&mut conn)? as usize;

        let mut items = locations::table.into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(pagination) = &pagination {
            items = items
                .offset(pagination.sql_offset())
                .limit(pagination.sql_limit());
        }

        let items = items
            .order(locations::name.asc())
            .load::<DbLocation>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Location>, _>>()?;

        Ok((total, items))
    }

    fn get_location_by_id(&self, id: LocationId) -> RepositoryResult<Option<Location>> {
        use crate::schema::locations;

        let mut conn = self.conn()?;

        let location = locations::table
            .filter(locations::id.eq(id.get()))
            .first::<DbLocation>(&mut conn)
            .optional()?;

        Ok(location.map(TryInto::try_into).transpose()?)
    }
}

impl LocationWriter for DieselRepository {
    fn create_location(&self, location: &NewLocation) -> RepositoryResult<Location> {
        use crate::schema::locations;

        let mut conn = self.conn()?;
        let db_location: DbNewLocation = location.clone().into();

        let created = diesel::insert_into(locations::table)
            .values(db_location)
            .returning(DbLocation::as_returning())
            .get_result(&mut conn)?;

        Ok(created.try_into()?)
    }

    fn set_location_published(
        &self,
        id: LocationId,
        is_published: bool,
    ) -> RepositoryResult<usize> {
        use crate::schema::locations;

        let mut conn = self.conn()?;

        let affected = diesel::update(locations::table.filter(locations::id.eq(id.get())))
            .set(locations::is_published.eq(is_published))
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn delete_location(&self, id: LocationId) -> RepositoryResult<usize> {
        use crate::schema::locations;

        let mut conn = self.conn()?;

        // posts.location_id is ON DELETE SET NULL in the schema.
        let affected = diesel::delete(locations::table.filter(locations::id.eq(id.get())))
            .execute(&mut conn)?;

        Ok(affected)
    }
}
