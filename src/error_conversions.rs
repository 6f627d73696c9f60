//! Error conversion glue between layers.
//!
//! The domain layer must not depend on service/repository error types, so the
//! `From` impls live here.

use crate::domain::types::TypeConstraintError;
use crate::repository::errors::RepositoryError;

impl From<TypeConstraintError> for RepositoryError {
    fn from(val: TypeConstraintError) -> Self {
        RepositoryError::ValidationError(val.to_string())
    }
}

#[cfg(feature = "server")]
mod service {
    use crate::domain::types::TypeConstraintError;
    use crate::forms::admin::{AddCategoryFormError, AddLocationFormError};
    use crate::forms::comments::CommentFormError;
    use crate::forms::posts::PostFormError;
    use crate::forms::users::{LoginFormError, ProfileFormError, RegistrationFormError};
    use crate::services::errors::ServiceError;

    impl From<TypeConstraintError> for ServiceError {
        fn from(val: TypeConstraintError) -> Self {
            ServiceError::TypeConstraint(val.to_string())
        }
    }

    macro_rules! form_error_into_service_error {
        ($($form_error:ty),* $(,)?) => {
            $(
                impl From<$form_error> for ServiceError {
                    fn from(val: $form_error) -> Self {
                        ServiceError::Form(val.to_string())
                    }
                }
            )*
        };
    }

    form_error_into_service_error!(
        PostFormError,
        CommentFormError,
        RegistrationFormError,
        LoginFormError,
        ProfileFormError,
        AddCategoryFormError,
        AddLocationFormError,
    );
}
