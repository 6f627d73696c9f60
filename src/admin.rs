//! Back-office listing configuration.
//!
//! Each registered model declares which columns the listing shows, in order,
//! and which of them can be changed straight from the listing.

use serde::Serialize;

/// Placeholder rendered for empty or missing values in every listing.
pub const EMPTY_VALUE_DISPLAY: &str = "Не задано";

/// Listing configuration of a single model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelAdmin {
    /// Path segment under `/admin/`.
    pub slug: &'static str,
    pub verbose_name: &'static str,
    pub list_display: &'static [&'static str],
    pub list_editable: &'static [&'static str],
}

impl ModelAdmin {
    pub fn is_editable(&self, field: &str) -> bool {
        self.list_editable.contains(&field)
    }

    /// Whether the `is_published` flag can be toggled from the listing.
    pub fn can_toggle_published(&self) -> bool {
        self.is_editable("is_published")
    }
}

pub const POST_ADMIN: ModelAdmin = ModelAdmin {
    slug: "posts",
    verbose_name: "Публикации",
    list_display: &[
        "title",
        "pub_date",
        "author",
        "location",
        "category",
        "is_published",
        "created_at",
    ],
    list_editable: &["is_published"],
};

pub const CATEGORY_ADMIN: ModelAdmin = ModelAdmin {
    slug: "categories",
    verbose_name: "Категории",
    list_display: &["title", "slug", "is_published", "created_at"],
    list_editable: &["is_published"],
};

pub const LOCATION_ADMIN: ModelAdmin = ModelAdmin {
    slug: "locations",
    verbose_name: "Местоположения",
    list_display: &["name", "is_published", "created_at"],
    list_editable: &["is_published"],
};

pub const COMMENT_ADMIN: ModelAdmin = ModelAdmin {
    slug: "comments",
    verbose_name: "Комментарии",
    list_display: &["text", "author", "created_at"],
    list_editable: &[],
};

pub const USER_ADMIN: ModelAdmin = ModelAdmin {
    slug: "users",
    verbose_name: "Пользователи",
    list_display: &["username", "email", "first_name", "last_name", "is_staff"],
    list_editable: &[],
};

/// Models shown on the back-office index, in display order.
pub const REGISTRY: [ModelAdmin; 5] = [
    POST_ADMIN,
    CATEGORY_ADMIN,
    LOCATION_ADMIN,
    COMMENT_ADMIN,
    USER_ADMIN,
];

pub fn find(slug: &str) -> Option<ModelAdmin> {
    REGISTRY.iter().copied().find(|model| model.slug == slug)
}

/// Render an optional value for a listing cell.
pub fn display_or_empty<T: ToString>(value: Option<T>) -> String {
    match value.map(|v| v.to_string()) {
        Some(value) if !value.trim().is_empty() => value,
        _ => EMPTY_VALUE_DISPLAY.to_string(),
    }
}
