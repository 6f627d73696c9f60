pub mod admin;
pub mod comments;
pub mod posts;
pub mod users;

/// HTML checkboxes are submitted only when ticked, with value `on` unless
/// the template sets another one.
pub(crate) fn checkbox_checked(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("on" | "true" | "1" | "yes")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkbox_values() {
        assert!(checkbox_checked(Some("on")));
        assert!(checkbox_checked(Some("true")));
        assert!(!checkbox_checked(Some("")));
        assert!(!checkbox_checked(None));
    }
}
