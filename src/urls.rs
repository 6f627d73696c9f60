//! Paths of the public pages, kept in one place for redirects.

use url::{Url, form_urlencoded};

use crate::domain::types::PostId;

pub const INDEX: &str = "/";
pub const LOGIN: &str = "/auth/login/";

/// Placeholder origin `next` targets are resolved against.
const SAME_SITE_ORIGIN: &str = "http://blogicum.invalid/";

pub fn post_detail(id: PostId) -> String {
    format!("/posts/{id}/")
}

pub fn profile(username: &str) -> String {
    format!("/profile/{username}/")
}

/// Login page that sends the user back to `next` afterwards.
pub fn login(next: &str) -> String {
    let next: String = form_urlencoded::byte_serialize(next.as_bytes()).collect();
    format!("{LOGIN}?next={next}")
}

/// Only same-site paths are accepted as a post-login target.
///
/// The candidate is resolved against a placeholder origin and kept only if
/// it stays on that origin. Backslashes and control characters are refused
/// outright.
pub fn safe_next(next: Option<&str>) -> &str {
    let Some(path) = next else {
        return INDEX;
    };
    if !path.starts_with('/') || path.contains('\\') || path.chars().any(char::is_control) {
        return INDEX;
    }

    let Ok(origin) = Url::parse(SAME_SITE_ORIGIN) else {
        return INDEX;
    };
    match origin.join(path) {
        Ok(target) if target.origin() == origin.origin() => path,
        _ => INDEX,
    }
}
