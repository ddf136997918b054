use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::value_objects::authorization::AuthorizationError;

#[derive(Debug, Error)]
pub enum UseCaseError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("an active subscription already exists")]
    AlreadySubscribed,
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl UseCaseError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            UseCaseError::Unauthenticated | UseCaseError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            UseCaseError::Forbidden(_) => StatusCode::FORBIDDEN,
            UseCaseError::Validation(_)
            | UseCaseError::AlreadySubscribed
            | UseCaseError::Conflict(_) => StatusCode::BAD_REQUEST,
            UseCaseError::NotFound(_) => StatusCode::NOT_FOUND,
            UseCaseError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthorizationError> for UseCaseError {
    fn from(err: AuthorizationError) -> Self {
        match err {
            AuthorizationError::Unauthenticated => UseCaseError::Unauthenticated,
            AuthorizationError::Forbidden(_) => UseCaseError::Forbidden(err.to_string()),
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, UseCaseError>;
