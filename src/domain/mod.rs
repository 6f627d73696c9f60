//! Framework-independent domain layer: entities, value types and the rules
//! every listing and mutation shares.

pub mod access;
pub mod auth;
pub mod category;
pub mod comment;
pub mod location;
pub mod post;
pub mod types;
pub mod user;
