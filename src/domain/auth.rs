use serde::{Deserialize, Serialize};

use crate::domain::types::{UserId, Username};
use crate::domain::user::User;

/// Identity claims kept in the session for a logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub username: Username,
    pub is_staff: bool,
}

impl From<&User> for AuthenticatedUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            is_staff: user.is_staff,
        }
    }
}
