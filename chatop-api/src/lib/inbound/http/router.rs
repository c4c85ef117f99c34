use std::sync::Arc;
use std::time::Duration;

use auth::AuthenticationGate;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::get_authenticated_user::get_authenticated_user;
use super::handlers::get_user::get_user;
use super::handlers::login::login;
use super::handlers::register::register;
use super::middleware::authenticate;
use crate::domain::user::ports::UserServicePort;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServicePort>,
}

/// Build the HTTP application.
///
/// Every route, including ones this service does not serve, goes through the
/// authentication gate; the gate's route table decides which need a token.
pub fn create_router(
    user_service: Arc<dyn UserServicePort>,
    gate: Arc<AuthenticationGate>,
) -> Router {
    let state = AppState { user_service };

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/me", get(get_authenticated_user))
        .route("/api/user/:user_id", get(get_user))
        .layer(middleware::from_fn_with_state(gate, authenticate))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
