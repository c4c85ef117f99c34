use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;

use super::get_user::UserData;
use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn get_authenticated_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let user = state
        .user_service
        .get_user_by_email(&caller.identity.subject)
        .await
        .map_err(|e| match e {
            // Valid token for an account that no longer exists.
            UserError::NotFound(_) => ApiError::InvalidCredentials,
            _ => ApiError::from(e),
        })?;

    Ok(ApiSuccess::new(StatusCode::OK, (&user).into()))
}
