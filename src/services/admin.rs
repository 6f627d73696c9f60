//! Staff-only back office over every blog model.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::admin::{self, ModelAdmin, display_or_empty};
use crate::domain::auth::AuthenticatedUser;
use crate::domain::category::{Category, NewCategory};
use crate::domain::location::{Location, NewLocation};
use crate::domain::types::{CategoryId, CommentId, LocationId, PostId, UserId};
use crate::forms::admin::{AddCategoryForm, AddLocationForm};
use crate::pagination::{Paginated, Pagination, clamp_page};
use crate::repository::{
    CategoryReader, CategoryWriter, CommentReader, CommentWriter, LocationReader, LocationWriter,
    PostListQuery, PostOrder, PostReader, PostWriter, RepositoryError, RepositoryResult,
    UserReader, UserWriter,
};
use crate::services::active_user;
use crate::urls;

use super::{ServiceError, ServiceResult};

/// Every repository capability the back office touches.
pub trait AdminRepository:
    UserReader
    + UserWriter
    + CategoryReader
    + CategoryWriter
    + LocationReader
    + LocationWriter
    + PostReader
    + PostWriter
    + CommentReader
    + CommentWriter
{
}

impl<T> AdminRepository for T where
    T: UserReader
        + UserWriter
        + CategoryReader
        + CategoryWriter
        + LocationReader
        + LocationWriter
        + PostReader
        + PostWriter
        + CommentReader
        + CommentWriter
{
}

/// One line of a model listing; `cells` follow `list_display`.
#[derive(Debug, Serialize, PartialEq)]
pub struct AdminRow {
    pub id: i32,
    pub cells: Vec<String>,
    /// Current publication flag for models that can toggle it.
    pub is_published: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct AdminListing {
    pub model: ModelAdmin,
    pub rows: Paginated<AdminRow>,
}

fn require_staff<R>(user: &AuthenticatedUser, repo: &R) -> ServiceResult<()>
where
    R: UserReader,
{
    if active_user(user, repo)?.is_staff {
        Ok(())
    } else {
        Err(ServiceError::Forbidden {
            redirect_to: urls::INDEX.to_string(),
        })
    }
}

fn find_model(slug: &str) -> ServiceResult<ModelAdmin> {
    admin::find(slug).ok_or(ServiceError::NotFound)
}

fn internal(action: &str) -> impl FnOnce(RepositoryError) -> ServiceError + '_ {
    move |e| {
        log::error!("Failed to {action}: {e}");
        ServiceError::Internal
    }
}

fn format_timestamp(value: NaiveDateTime) -> String {
    value.format("%d.%m.%Y %H:%M").to_string()
}

fn yes_no(value: bool) -> String {
    let label = if value { "Да" } else { "Нет" };
    label.to_string()
}

/// Models registered in the back office.
pub fn admin_index<R>(user: &AuthenticatedUser, repo: &R) -> ServiceResult<Vec<ModelAdmin>>
where
    R: UserReader,
{
    require_staff(user, repo)?;
    Ok(admin::REGISTRY.to_vec())
}

fn load_page<T>(
    page: usize,
    per_page: usize,
    load: impl Fn(Pagination) -> RepositoryResult<(usize, Vec<T>)>,
) -> RepositoryResult<(usize, usize, Vec<T>)> {
    let (total, items) = load(Pagination::new(page, per_page))?;
    let clamped = clamp_page(page, total, per_page);
    if clamped == page.max(1) {
        return Ok((page.max(1), total, items));
    }
    let (total, items) = load(Pagination::new(clamped, per_page))?;
    Ok((clamped, total, items))
}

fn category_row(category: Category) -> AdminRow {
    AdminRow {
        id: category.id.get(),
        cells: vec![
            category.title.to_string(),
            category.slug.to_string(),
            yes_no(category.is_published),
            format_timestamp(category.created_at),
        ],
        is_published: Some(category.is_published),
    }
}

fn location_row(location: Location) -> AdminRow {
    AdminRow {
        id: location.id.get(),
        cells: vec![
            location.name.to_string(),
            yes_no(location.is_published),
            format_timestamp(location.created_at),
        ],
        is_published: Some(location.is_published),
    }
}

/// Paginated table of a model in `list_display` order.
pub fn model_listing<R>(
    model: &str,
    page: usize,
    per_page: usize,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<AdminListing>
where
    R: AdminRepository,
{
    require_staff(user, repo)?;
    let model = find_model(model)?;

    let (page, total, rows) = match model.slug {
        "posts" => load_page(page, per_page, |pagination| {
            let query = PostListQuery {
                order: PostOrder::IdAscending,
                pagination: Some(pagination),
                ..Default::default()
            };
            let (total, entries) = repo.list_posts(query)?;
            let rows = entries
                .into_iter()
                .map(|entry| AdminRow {
                    id: entry.post.id.get(),
                    cells: vec![
                        entry.post.title.to_string(),
                        format_timestamp(entry.post.pub_date),
                        entry.author_username.to_string(),
                        display_or_empty(entry.location.map(|l| l.name)),
                        display_or_empty(entry.category.map(|c| c.title)),
                        yes_no(entry.post.is_published),
                        format_timestamp(entry.post.created_at),
                    ],
                    is_published: Some(entry.post.is_published),
                })
                .collect::<Vec<AdminRow>>();
            Ok((total, rows))
        }),
        "categories" => load_page(page, per_page, |pagination| {
            let (total, items) = repo.list_categories(Some(pagination))?;
            Ok((total, items.into_iter().map(category_row).collect::<Vec<_>>()))
        }),
        "locations" => load_page(page, per_page, |pagination| {
            let (total, items) = repo.list_locations(Some(pagination))?;
            Ok((total, items.into_iter().map(location_row).collect::<Vec<_>>()))
        }),
        "comments" => load_page(page, per_page, |pagination| {
            let (total, items) = repo.list_comments(Some(pagination))?;
            let rows = items
                .into_iter()
                .map(|entry| AdminRow {
                    id: entry.comment.id.get(),
                    cells: vec![
                        entry.comment.text.to_string(),
                        entry.author_username.to_string(),
                        format_timestamp(entry.comment.created_at),
                    ],
                    is_published: None,
                })
                .collect::<Vec<AdminRow>>();
            Ok((total, rows))
        }),
        "users" => load_page(page, per_page, |pagination| {
            let (total, items) = repo.list_users(Some(pagination))?;
            let rows = items
                .into_iter()
                .map(|user| AdminRow {
                    id: user.id.get(),
                    cells: vec![
                        user.username.to_string(),
                        display_or_empty(Some(user.email)),
                        display_or_empty(Some(user.first_name)),
                        display_or_empty(Some(user.last_name)),
                        yes_no(user.is_staff),
                    ],
                    is_published: None,
                })
                .collect::<Vec<AdminRow>>();
            Ok((total, rows))
        }),
        _ => return Err(ServiceError::NotFound),
    }
    .map_err(internal("load admin listing"))?;

    Ok(AdminListing {
        model,
        rows: Paginated::new(rows, page, total, per_page),
    })
}

/// Flip `is_published` of a category, location or post.
///
/// Returns the new value.
pub fn toggle_published<R>(
    model: &str,
    id: i32,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<bool>
where
    R: AdminRepository,
{
    require_staff(user, repo)?;
    let model = find_model(model)?;
    if !model.can_toggle_published() {
        return Err(ServiceError::NotFound);
    }

    let current = match model.slug {
        "posts" => repo
            .get_post_by_id(PostId::new(id)?)
            .map(|post| post.map(|p| p.is_published)),
        "categories" => repo
            .get_category_by_id(CategoryId::new(id)?)
            .map(|category| category.map(|c| c.is_published)),
        "locations" => repo
            .get_location_by_id(LocationId::new(id)?)
            .map(|location| location.map(|l| l.is_published)),
        _ => return Err(ServiceError::NotFound),
    }
    .map_err(internal("load entry"))?
    .ok_or(ServiceError::NotFound)?;

    let value = !current;
    match model.slug {
        "posts" => repo.set_post_published(PostId::new(id)?, value),
        "categories" => repo.set_category_published(CategoryId::new(id)?, value),
        _ => repo.set_location_published(LocationId::new(id)?, value),
    }
    .map_err(internal("toggle publication"))?;

    Ok(value)
}

pub fn add_category<R>(
    form: AddCategoryForm,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<Category>
where
    R: UserReader + CategoryWriter,
{
    require_staff(user, repo)?;
    let category: NewCategory = form.try_into()?;

    match repo.create_category(&category) {
        Ok(category) => Ok(category),
        Err(RepositoryError::ConstraintViolation(_)) => Err(ServiceError::Conflict(
            "Категория с таким идентификатором уже существует.".to_string(),
        )),
        Err(e) => {
            log::error!("Failed to create category: {e}");
            Err(ServiceError::Internal)
        }
    }
}

pub fn add_location<R>(
    form: AddLocationForm,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<Location>
where
    R: UserReader + LocationWriter,
{
    require_staff(user, repo)?;
    let location: NewLocation = form.try_into()?;

    repo.create_location(&location)
        .map_err(internal("create location"))
}

/// Hard-delete an entry; dependent rows follow the schema's FK actions.
pub fn delete_entry<R>(
    model: &str,
    id: i32,
    user: &AuthenticatedUser,
    repo: &R,
) -> ServiceResult<()>
where
    R: AdminRepository,
{
    require_staff(user, repo)?;
    let model = find_model(model)?;

    let affected = match model.slug {
        "posts" => repo.delete_post(PostId::new(id)?),
        "categories" => repo.delete_category(CategoryId::new(id)?),
        "locations" => repo.delete_location(LocationId::new(id)?),
        "comments" => repo.delete_comment(CommentId::new(id)?),
        "users" => repo.delete_user(UserId::new(id)?),
        _ => return Err(ServiceError::NotFound),
    }
    .map_err(internal("delete entry"))?;

    if affected == 0 {
        return Err(ServiceError::NotFound);
    }
    log::info!("Staff user '{}' deleted {} #{id}", user.username, model.slug);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::EMPTY_VALUE_DISPLAY;
    use crate::domain::user::User;
    use crate::repository::test::TestRepository;
    use crate::repository::test::fixtures::{category, claims, comment, location, post, user};

    fn admin_user() -> User {
        let mut admin = user(1, "admin");
        admin.is_staff = true;
        admin
    }

    fn staff() -> AuthenticatedUser {
        claims(&admin_user())
    }

    fn repo() -> TestRepository {
        let mut with_location = post(2, 1, Some(1), 10);
        with_location.location_id = Some(LocationId::new(1).unwrap());
        TestRepository::new()
            .with_user(admin_user())
            .with_user(user(2, "reader"))
            .with_categories(vec![category(1, "travel", true)])
            .with_locations(vec![location(1, "Kazan")])
            .with_posts(vec![post(1, 1, None, 10), with_location])
            .with_comments(vec![comment(1, 1, 2, 20)])
    }

    #[test]
    fn non_staff_is_sent_home() {
        let err = admin_index(&claims(&user(2, "reader")), &repo()).unwrap_err();
        assert_eq!(
            err,
            ServiceError::Forbidden {
                redirect_to: "/".to_string()
            }
        );
    }

    #[test]
    fn staff_flag_is_read_from_the_stored_account() {
        let mut forged = claims(&user(2, "reader"));
        forged.is_staff = true;
        let err = admin_index(&forged, &repo()).unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden { .. }));

        assert_eq!(admin_index(&staff(), &repo()).unwrap().len(), 5);
    }

    #[test]
    fn deleted_staff_session_must_log_in_again() {
        let repo = repo();
        delete_entry("users", 1, &staff(), &repo).unwrap();
        let err = delete_entry("locations", 1, &staff(), &repo).unwrap_err();
        assert_eq!(err, ServiceError::Unauthorized);
        assert_eq!(repo.users().len(), 1);
    }

    #[test]
    fn post_listing_follows_list_display() {
        let listing = model_listing("posts", 1, 10, &staff(), &repo()).unwrap();
        assert_eq!(listing.model.list_display.len(), 7);
        let first = &listing.rows.items[0];
        assert_eq!(first.cells.len(), 7);
        assert_eq!(first.cells[3], EMPTY_VALUE_DISPLAY);
        assert_eq!(first.cells[4], EMPTY_VALUE_DISPLAY);
        let second = &listing.rows.items[1];
        assert_eq!(second.cells[3], "Kazan");
        assert_eq!(second.cells[4], "Category travel");
    }

    #[test]
    fn unknown_model_is_not_found() {
        let err = model_listing("widgets", 1, 10, &staff(), &repo()).unwrap_err();
        assert_eq!(err, ServiceError::NotFound);
    }

    #[test]
    fn toggles_category_publication() {
        let repo = repo();
        assert!(!toggle_published("categories", 1, &staff(), &repo).unwrap());
        assert!(!repo.categories()[0].is_published);
        assert!(toggle_published("categories", 1, &staff(), &repo).unwrap());
    }

    #[test]
    fn comments_cannot_be_toggled() {
        let err = toggle_published("comments", 1, &staff(), &repo()).unwrap_err();
        assert_eq!(err, ServiceError::NotFound);
    }

    #[test]
    fn duplicate_slug_is_a_conflict() {
        let form = AddCategoryForm {
            title: "Travel again".to_string(),
            description: "Same slug".to_string(),
            slug: "travel".to_string(),
            is_published: Some("on".to_string()),
        };
        let err = add_category(form, &staff(), &repo()).unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[test]
    fn deleting_category_keeps_posts() {
        let repo = repo();
        delete_entry("categories", 1, &staff(), &repo).unwrap();
        let posts = repo.posts();
        assert_eq!(posts.len(), 2);
        assert!(posts.iter().all(|p| p.category_id.is_none()));
    }

    #[test]
    fn deleting_user_removes_their_posts_and_comments() {
        let repo = repo();
        delete_entry("users", 2, &staff(), &repo).unwrap();
        assert!(repo.comments().is_empty());
        assert_eq!(repo.posts().len(), 2);

        delete_entry("users", 1, &staff(), &repo).unwrap();
        assert!(repo.posts().is_empty());
    }

    #[test]
    fn deleting_missing_entry_is_not_found() {
        let err = delete_entry("locations", 9, &staff(), &repo()).unwrap_err();
        assert_eq!(err, ServiceError::NotFound);
    }
}
