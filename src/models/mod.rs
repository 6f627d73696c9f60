pub mod category;
pub mod comment;
#[cfg(feature = "server")]
pub mod config;
pub mod location;
pub mod post;
pub mod user;
