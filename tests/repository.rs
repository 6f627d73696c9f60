use blogicum::domain::comment::NewComment;
use blogicum::domain::post::PostUpdate;
use blogicum::domain::types::{BodyText, CategorySlug, CategoryTitle, PostTitle};
use blogicum::domain::category::NewCategory;
use blogicum::repository::{
    CategoryReader, CategoryWriter, CommentReader, CommentWriter, LocationWriter, PostListQuery,
    PostOrder, PostReader, PostWriter, RepositoryError, UserReader, UserWriter,
};

mod common;

use common::{at, create_category, create_location, create_post, create_user};

#[test]
fn listing_applies_publication_predicate() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();

    let author = create_user(&repo, "author");
    let open = create_category(&repo, "open", true);
    let closed = create_category(&repo, "closed", false);

    let visible = create_post(&repo, &author, Some(open.id), None, 10);
    let hidden = create_post(&repo, &author, Some(open.id), None, 20);
    repo.set_post_published(hidden.id, false).unwrap();
    create_post(&repo, &author, Some(closed.id), None, 10);
    create_post(&repo, &author, Some(open.id), None, 500);
    create_post(&repo, &author, None, None, 10);

    let (total, items) = repo
        .list_posts(PostListQuery::default().visible_at(at(100)))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].post.id, visible.id);
    assert_eq!(items[0].author_username, "author");
    assert_eq!(items[0].category.as_ref().map(|c| c.id), Some(open.id));

    assert!(repo.get_post_entry(hidden.id, Some(at(100))).unwrap().is_none());
    assert!(repo.get_post_entry(hidden.id, None).unwrap().is_some());

    let (all, _) = repo.list_posts(PostListQuery::default()).unwrap();
    assert_eq!(all, 5);
}

#[test]
fn deleting_category_or_location_keeps_posts() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();

    let author = create_user(&repo, "author");
    let category = create_category(&repo, "travel", true);
    let location = create_location(&repo, "Kazan");
    let post = create_post(&repo, &author, Some(category.id), Some(location.id), 10);

    repo.delete_category(category.id).unwrap();
    repo.delete_location(location.id).unwrap();

    let stored = repo.get_post_by_id(post.id).unwrap().expect("post survives");
    assert_eq!(stored.category_id, None);
    assert_eq!(stored.location_id, None);
}

#[test]
fn deleting_post_or_user_cascades() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();

    let author = create_user(&repo, "author");
    let reader = create_user(&repo, "reader");
    let category = create_category(&repo, "travel", true);
    let first = create_post(&repo, &author, Some(category.id), None, 10);
    let second = create_post(&repo, &author, Some(category.id), None, 20);

    for post_id in [first.id, second.id] {
        repo.create_comment(&NewComment {
            text: BodyText::new("Hello").unwrap(),
            post_id,
            author_id: reader.id,
            created_at: at(30),
        })
        .unwrap();
    }

    repo.delete_post(first.id).unwrap();
    assert!(repo.list_comments_for_post(first.id).unwrap().is_empty());
    assert_eq!(repo.list_comments_for_post(second.id).unwrap().len(), 1);

    repo.delete_user(reader.id).unwrap();
    assert!(repo.list_comments_for_post(second.id).unwrap().is_empty());

    repo.delete_user(author.id).unwrap();
    assert!(repo.get_post_by_id(second.id).unwrap().is_none());
    assert!(repo.get_user_by_username("author").unwrap().is_none());
}

#[test]
fn comments_come_back_oldest_first() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();

    let author = create_user(&repo, "author");
    let post = create_post(&repo, &author, None, None, 10);

    for created_at in [300, 100, 200, 100] {
        repo.create_comment(&NewComment {
            text: BodyText::new(format!("at {created_at}")).unwrap(),
            post_id: post.id,
            author_id: author.id,
            created_at: at(created_at),
        })
        .unwrap();
    }

    let comments = repo.list_comments_for_post(post.id).unwrap();
    let stamps: Vec<_> = comments.iter().map(|c| c.comment.created_at).collect();
    let mut sorted = stamps.clone();
    sorted.sort();
    assert_eq!(stamps, sorted);
    assert_eq!(comments[0].author_username, "author");

    let (_, with_count) = repo.list_posts(PostListQuery::default()).unwrap();
    assert_eq!(with_count[0].comment_count, 4);
}

#[test]
fn twenty_five_posts_split_into_three_pages() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();

    let author = create_user(&repo, "author");
    let category = create_category(&repo, "travel", true);
    for pub_date in 1..=25 {
        create_post(&repo, &author, Some(category.id), None, pub_date);
    }

    let sizes: Vec<usize> = (1..=3)
        .map(|page| {
            let query = PostListQuery::default()
                .visible_at(at(100))
                .paginate(page, 10);
            let (total, items) = repo.list_posts(query).unwrap();
            assert_eq!(total, 25);
            items.len()
        })
        .collect();
    assert_eq!(sizes, vec![10, 10, 5]);

    let (_, newest) = repo
        .list_posts(PostListQuery::default().visible_at(at(100)).paginate(1, 10))
        .unwrap();
    assert_eq!(newest[0].post.pub_date, at(25));

    let (_, by_id) = repo
        .list_posts(
            PostListQuery::default()
                .category(category.id)
                .order(PostOrder::IdAscending)
                .paginate(3, 10),
        )
        .unwrap();
    assert!(by_id.windows(2).all(|w| w[0].post.id < w[1].post.id));
}

#[test]
fn category_slug_is_unique() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();

    create_category(&repo, "travel", true);
    let duplicate = repo.create_category(&NewCategory {
        title: CategoryTitle::new("Another").unwrap(),
        description: BodyText::new("Same slug").unwrap(),
        slug: CategorySlug::new("travel").unwrap(),
        is_published: true,
        created_at: at(0),
    });

    assert!(matches!(
        duplicate,
        Err(RepositoryError::ConstraintViolation(_))
    ));
    assert!(repo.get_category_by_slug("travel").unwrap().is_some());
}

#[test]
fn update_rewrites_editable_fields_only() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();

    let author = create_user(&repo, "author");
    let category = create_category(&repo, "travel", true);
    let post = create_post(&repo, &author, Some(category.id), None, 10);

    let update = PostUpdate {
        title: PostTitle::new("Renamed").unwrap(),
        text: BodyText::new("New text").unwrap(),
        pub_date: at(20),
        is_published: false,
        image: Some("posts_images/a.png".to_string()),
        location_id: None,
        category_id: None,
    };
    assert_eq!(repo.update_post(post.id, &update).unwrap(), 1);

    let stored = repo.get_post_by_id(post.id).unwrap().unwrap();
    assert_eq!(stored.title, "Renamed");
    assert_eq!(stored.category_id, None);
    assert_eq!(stored.author_id, author.id);
    assert_eq!(stored.created_at, post.created_at);
    assert_eq!(stored.image.as_deref(), Some("posts_images/a.png"));
}

#[test]
fn usernames_are_unique() {
    let test_db = common::TestDb::new();
    let repo = test_db.repo();

    create_user(&repo, "author");
    let second = create_user(&repo, "second");
    let clash = repo.update_profile(
        second.id,
        &blogicum::domain::user::UserProfileUpdate {
            username: blogicum::domain::types::Username::new("author").unwrap(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
        },
    );
    assert!(matches!(clash, Err(RepositoryError::ConstraintViolation(_))));

    let credentials = repo.get_credentials("second").unwrap().unwrap();
    assert_eq!(credentials.password_hash, "!unusable");
}
