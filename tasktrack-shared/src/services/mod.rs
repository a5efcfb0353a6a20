/// Business operations over the store traits
///
/// - `users`: registration, lookup and login ([`UserDirectory`])
/// - `tasks`: task creation, listing and status advance with ownership
///   checks ([`TaskService`])
///
/// Both services hold their store as a trait object, so they run unchanged
/// on [`crate::store::PgStore`] and [`crate::store::MemoryStore`].

use validator::{ValidationError, ValidationErrors};

use crate::{
    auth::{jwt::JwtError, password::PasswordError},
    store::StoreError,
};

pub mod tasks;
pub mod users;

pub use tasks::{NewTask, TaskService};
pub use users::{LoginRequest, RegisterRequest, UserDirectory};

/// Error type for service operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Input failed validation
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Unknown email or wrong password (deliberately indistinguishable)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Requester does not own the resource
    #[error("Forbidden")]
    Forbidden,

    /// Resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// Resource already exists
    #[error("{0}")]
    Conflict(String),

    /// Password hashing failed
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Token could not be issued
    #[error(transparent)]
    Token(#[from] JwtError),

    /// Storage or runtime failure
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Service result type alias
pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation(_) => {
                ServiceError::Conflict("Email already registered".to_string())
            }
            StoreError::ForeignKeyViolation(_) => {
                ServiceError::NotFound("User not found".to_string())
            }
            StoreError::Database(e) => ServiceError::Internal(e.to_string()),
        }
    }
}

/// Builds a single-field validation failure
pub(crate) fn field_error(
    field: &'static str,
    code: &'static str,
    message: &'static str,
) -> ValidationErrors {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());

    let mut errors = ValidationErrors::new();
    errors.add(field, error);
    errors
}
