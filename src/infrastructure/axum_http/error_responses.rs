use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::application::usecases::error::UseCaseError;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl IntoResponse for UseCaseError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            // Don't leak internal error detail to client
            UseCaseError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        if status.is_client_error() {
            warn!(status = status.as_u16(), %message, "http: request failed");
        }

        let body = Json(ErrorResponse {
            code: status.as_u16(),
            message,
        });

        (status, body).into_response()
    }
}

/// Malformed request bodies, paths and query strings are validation errors.
pub fn json_rejection(rejection: JsonRejection) -> UseCaseError {
    UseCaseError::Validation(rejection.body_text())
}

pub fn path_rejection(rejection: PathRejection) -> UseCaseError {
    UseCaseError::Validation(rejection.body_text())
}

pub fn query_rejection(rejection: QueryRejection) -> UseCaseError {
    UseCaseError::Validation(rejection.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::to_bytes, http::StatusCode};

    async fn body_of(err: UseCaseError) -> (StatusCode, ErrorResponse) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn client_errors_carry_their_message() {
        let (status, body) = body_of(UseCaseError::NotFound("place not found".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            ErrorResponse {
                code: 404,
                message: "place not found".to_string()
            }
        );
    }

    #[tokio::test]
    async fn internal_errors_hide_detail() {
        let (status, body) =
            body_of(UseCaseError::Internal(anyhow::anyhow!("password=hunter2 in dsn"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, "Internal server error");
    }
}
