use std::sync::Arc;

use auth::AuthResult;
use auth::AuthenticationGate;
use auth::GateRequest;
use auth::Identity;
use auth::Principal;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;

use crate::inbound::http::handlers::ApiError;

/// Extension type carrying the caller identity attached by the gate
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub identity: Identity,
}

/// Middleware running the authentication gate over every request.
///
/// Public routes pass through untouched. Protected routes proceed with an
/// [`AuthenticatedUser`] in the request extensions or are answered with 401.
pub async fn authenticate(
    State(gate): State<Arc<AuthenticationGate>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let result = {
        let authorization = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        gate.evaluate(&GateRequest {
            path: req.uri().path(),
            authorization,
            now: Utc::now(),
        })
    };

    match result {
        AuthResult::Authenticated(Principal::User(identity)) => {
            req.extensions_mut().insert(AuthenticatedUser { identity });
            Ok(next.run(req).await)
        }
        AuthResult::Authenticated(Principal::Anonymous) => Ok(next.run(req).await),
        AuthResult::Rejected(kind) => {
            tracing::warn!(
                path = %req.uri().path(),
                failure = kind.code(),
                "Request rejected by authentication gate"
            );
            Err(ApiError::Unauthenticated(kind))
        }
    }
}
