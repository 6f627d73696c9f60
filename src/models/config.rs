use serde::Deserialize;

use crate::domain::access::{CommentDeniedRedirect, ProfileVisibility};
use crate::pagination::DEFAULT_ITEMS_PER_PAGE;

/// Configuration options of the blog server.
///
/// Loaded from `config/default.yaml`, an optional `config/{APP_ENV}.yaml`
/// and `APP_*` environment variables, in that order.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub database_url: String,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Cookie signing key, at least 64 bytes.
    pub secret: String,
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,
    #[serde(default = "default_static_root")]
    pub static_root: String,
    #[serde(default = "default_static_url")]
    pub static_url: String,
    #[serde(default = "default_media_root")]
    pub media_root: String,
    #[serde(default = "default_media_url")]
    pub media_url: String,
    #[serde(default = "default_posts_per_page")]
    pub posts_per_page: usize,
    /// Render the 404/403/500 pages with status 200, as the legacy site did.
    #[serde(default)]
    pub error_pages_status_ok: bool,
    #[serde(default)]
    pub comment_denied_redirect: CommentDeniedRedirect,
    #[serde(default)]
    pub profile_visibility: ProfileVisibility,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_templates_dir() -> String {
    "templates".to_string()
}

fn default_static_root() -> String {
    "static".to_string()
}

fn default_static_url() -> String {
    "/static".to_string()
}

fn default_media_root() -> String {
    "media".to_string()
}

fn default_media_url() -> String {
    "/media".to_string()
}

fn default_posts_per_page() -> usize {
    DEFAULT_ITEMS_PER_PAGE
}
