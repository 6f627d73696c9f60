use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::category::Category;
use crate::domain::post::PostEntry;
use crate::pagination::Paginated;
use crate::repository::{CategoryReader, PostListQuery, PostOrder, PostReader};
use crate::services::paginated_posts;

use super::{ServiceError, ServiceResult};

#[derive(Debug, Serialize)]
pub struct CategoryPage {
    pub category: Category,
    pub posts: Paginated<PostEntry>,
}

/// Visible posts of a published category in insertion order.
///
/// Unknown and hidden categories are both reported as not found.
pub fn category_page<R>(
    slug: &str,
    page: usize,
    per_page: usize,
    now: NaiveDateTime,
    repo: &R,
) -> ServiceResult<CategoryPage>
where
    R: CategoryReader + PostReader,
{
    let category = match repo.get_category_by_slug(slug) {
        Ok(Some(category)) if category.is_published => category,
        Ok(_) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get category '{slug}': {e}");
            return Err(ServiceError::Internal);
        }
    };

    let query = PostListQuery::default()
        .visible_at(now)
        .category(category.id)
        .order(PostOrder::IdAscending);
    let posts = paginated_posts(repo, query, page, per_page)?;

    Ok(CategoryPage { category, posts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test::TestRepository;
    use crate::repository::test::fixtures::{at, category, post, user};

    fn repo() -> TestRepository {
        TestRepository::new()
            .with_user(user(1, "author"))
            .with_categories(vec![category(1, "travel", true), category(2, "hidden", false)])
    }

    #[test]
    fn missing_category_is_not_found() {
        let err = category_page("does-not-exist", 1, 10, at(100), &repo()).unwrap_err();
        assert_eq!(err, ServiceError::NotFound);
    }

    #[test]
    fn hidden_category_is_not_found() {
        let err = category_page("hidden", 1, 10, at(100), &repo()).unwrap_err();
        assert_eq!(err, ServiceError::NotFound);
    }

    #[test]
    fn lists_visible_posts_by_id() {
        let mut draft = post(4, 1, Some(1), 10);
        draft.is_published = false;
        let repo = repo().with_posts(vec![
            post(3, 1, Some(1), 5),
            post(1, 1, Some(1), 30),
            post(2, 1, None, 10),
            draft,
            post(5, 1, Some(1), 900),
        ]);

        let page = category_page("travel", 1, 10, at(100), &repo).unwrap();
        let ids: Vec<i32> = page.posts.items.iter().map(|e| e.post.id.get()).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(page.category.slug, "travel");
    }
}
