//! Session-backed identity of the current visitor.
//!
//! The logged-in user is kept in the `actix-identity` cookie as serialized
//! [`AuthenticatedUser`] claims. Handlers that need a user take
//! `AuthenticatedUser` as an extractor; anonymous requests are sent to the
//! login page with a `next` parameter pointing back.

use std::fmt;
use std::future::{Ready, ready};

use actix_identity::{Identity, IdentityExt};
use actix_web::dev::Payload;
use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError};
use thiserror::Error;

use crate::domain::auth::AuthenticatedUser;
use crate::urls;

pub mod password;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to encode identity: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to attach identity to the session: {0}")]
    Session(String),
}

/// Read the current user from the identity cookie, if any.
pub fn current_user(req: &HttpRequest) -> Option<AuthenticatedUser> {
    let identity = req.get_identity().ok()?;
    let id = identity.id().ok()?;
    match serde_json::from_str(&id) {
        Ok(user) => Some(user),
        Err(e) => {
            log::warn!("Discarding malformed identity: {e}");
            None
        }
    }
}

/// Attach `user` to the session, replacing any previous identity.
pub fn login(req: &HttpRequest, user: &AuthenticatedUser) -> Result<(), AuthError> {
    let claims = serde_json::to_string(user)?;
    Identity::login(&req.extensions(), claims).map_err(|e| AuthError::Session(e.to_string()))?;
    Ok(())
}

/// Rejection produced by the [`AuthenticatedUser`] extractor.
#[derive(Debug)]
pub struct LoginRequired {
    next: String,
}

impl LoginRequired {
    fn for_request(req: &HttpRequest) -> Self {
        let next = match req.uri().path_and_query() {
            Some(path) => path.as_str().to_string(),
            None => req.path().to_string(),
        };
        Self { next }
    }
}

impl fmt::Display for LoginRequired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "login required for {}", self.next)
    }
}

impl ResponseError for LoginRequired {
    fn status_code(&self) -> StatusCode {
        StatusCode::SEE_OTHER
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::SeeOther()
            .insert_header((header::LOCATION, urls::login(&self.next)))
            .finish()
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = LoginRequired;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(current_user(req).ok_or_else(|| LoginRequired::for_request(req)))
    }
}
