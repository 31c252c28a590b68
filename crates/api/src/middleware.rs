use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

use cronocodex_auth::AuthError;

use crate::app::errors::auth_error_to_response;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// Requires `Authorization: Bearer <token>` and attaches the authenticated
/// [`PrincipalContext`] to the request.
pub async fn auth_middleware(
    State(services): State<Arc<AppServices>>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = match extract_bearer(req.headers()) {
        Ok(token) => token,
        Err(e) => return auth_error_to_response(e),
    };

    let principal = match services.gate.authenticate(token).await {
        Ok(principal) => principal,
        Err(e) => return auth_error_to_response(e),
    };

    req.extensions_mut().insert(PrincipalContext::new(principal));
    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::TokenInvalid)?;

    let header = header.to_str().map_err(|_| AuthError::TokenInvalid)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::TokenInvalid)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(AuthError::TokenInvalid);
    }

    Ok(token)
}
