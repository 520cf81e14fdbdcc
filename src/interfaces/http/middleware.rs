//! Authentication and role middleware for Axum

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::application::access::Scope;
use crate::application::UserService;
use crate::domain::User;
use crate::interfaces::http::common::ApiError;

/// State for the bearer-token middleware
#[derive(Clone)]
pub struct AuthState {
    pub users: Arc<UserService>,
}

/// The live user record behind the request's access token.
///
/// Extract in handlers: `Extension(CurrentUser(user)): Extension<CurrentUser>`
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Bearer token authentication.
///
/// The token must be an access token and its subject must still exist;
/// the stored record (not the token claims) is what handlers see.
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(String::from);
    let Some(auth_header) = auth_header else {
        return ApiError::unauthorized("Missing authentication token").into_response();
    };

    let Some(token) = extract_token(&auth_header) else {
        return ApiError::unauthorized("Invalid authentication token").into_response();
    };

    match auth_state.users.authenticate(token).await {
        Ok(user) => {
            request.extensions_mut().insert(CurrentUser(user));
            next.run(request).await
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Role gate layered inside `auth_middleware`:
/// `middleware::from_fn_with_state(Scope::Administration, require_scope)`.
pub async fn require_scope(
    State(scope): State<Scope>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(CurrentUser(user)) = request.extensions().get::<CurrentUser>() else {
        return ApiError::unauthorized("Missing authentication token").into_response();
    };

    if let Err(e) = scope.require(user) {
        tracing::warn!(
            target: "audit",
            user_id = %user.user_id,
            role = %user.role,
            path = %request.uri().path(),
            "Access denied"
        );
        return ApiError::from(e).into_response();
    }

    next.run(request).await
}
