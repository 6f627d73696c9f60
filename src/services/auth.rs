use chrono::NaiveDateTime;

use crate::auth::password::{hash_password, verify_password};
use crate::domain::auth::AuthenticatedUser;
use crate::domain::user::NewUser;
use crate::forms::users::{LoginFormPayload, RegistrationFormPayload};
use crate::repository::{RepositoryError, UserReader, UserWriter};

use super::{ServiceError, ServiceResult};

/// Create an account and return the claims to log it in with.
pub fn register<R>(
    payload: RegistrationFormPayload,
    now: NaiveDateTime,
    repo: &R,
) -> ServiceResult<AuthenticatedUser>
where
    R: UserWriter,
{
    let password_hash = hash_password(&payload.password).map_err(|e| {
        log::error!("{e}");
        ServiceError::Internal
    })?;

    let new_user = NewUser {
        username: payload.username,
        password_hash,
        first_name: String::new(),
        last_name: String::new(),
        email: String::new(),
        is_staff: false,
        date_joined: now,
    };

    match repo.create_user(&new_user) {
        Ok(user) => {
            log::info!("Registered user '{}'", user.username);
            Ok(AuthenticatedUser::from(&user))
        }
        Err(RepositoryError::ConstraintViolation(_)) => Err(ServiceError::Conflict(
            "Пользователь с таким именем уже существует.".to_string(),
        )),
        Err(e) => {
            log::error!("Failed to create user: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Check credentials and return the claims to log in with.
pub fn login<R>(payload: LoginFormPayload, repo: &R) -> ServiceResult<AuthenticatedUser>
where
    R: UserReader,
{
    let rejected =
        || ServiceError::Form("Неверное имя пользователя или пароль.".to_string());

    let credentials = match repo.get_credentials(&payload.username) {
        Ok(Some(credentials)) => credentials,
        Ok(None) => return Err(rejected()),
        Err(e) => {
            log::error!("Failed to load credentials: {e}");
            return Err(ServiceError::Internal);
        }
    };

    if !verify_password(&payload.password, &credentials.password_hash) {
        return Err(rejected());
    }

    Ok(AuthenticatedUser::from(&credentials.user))
}
