use auth::FailureKind;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::user::errors::UserError;

pub mod get_authenticated_user;
pub mod get_user;
pub mod login;
pub mod register;

const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired token";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<T>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

/// Every failure the HTTP layer can answer with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Rejected by the authentication gate
    Unauthenticated(FailureKind),
    InvalidCredentials,
    BadRequest(String),
    NotFound(String),
    InternalServerError(String),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::Unauthenticated(kind) => {
                let message = match kind {
                    FailureKind::MissingToken => "Authentication required",
                    FailureKind::Malformed
                    | FailureKind::BadSignature
                    | FailureKind::Expired
                    | FailureKind::NotYetValid => INVALID_TOKEN_MESSAGE,
                };
                (StatusCode::UNAUTHORIZED, kind.code(), message.to_string())
            }
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid credentials".to_string(),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            ApiError::InternalServerError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::InternalServerError(detail) = &self {
            tracing::error!(error = %detail, "Request failed");
        }

        let (status, error, message) = self.parts();
        (status, Json(ApiErrorBody::new(status, error, message))).into_response()
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => ApiError::NotFound(err.to_string()),
            UserError::EmailAlreadyExists(_)
            | UserError::InvalidEmail(_)
            | UserError::InvalidName(_)
            | UserError::InvalidUserId(_)
            | UserError::EmptyPassword => ApiError::BadRequest(err.to_string()),
            UserError::InvalidCredentials => ApiError::InvalidCredentials,
            UserError::Password(_) | UserError::Token(_) | UserError::DatabaseError(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Uniform error payload: `{error, status, message}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorBody {
    pub error: &'static str,
    pub status: u16,
    pub message: String,
}

impl ApiErrorBody {
    pub fn new(status: StatusCode, error: &'static str, message: String) -> Self {
        Self {
            error,
            status: status.as_u16(),
            message,
        }
    }
}
