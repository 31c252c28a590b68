use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use cronocodex_auth::AuthError;

use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    let (Some(email), Some(password)) = (dto::required(&body.email), body.password.as_deref()) else {
        return errors::bad_request("email and password are required");
    };
    if password.is_empty() {
        return errors::bad_request("email and password are required");
    }

    let session = match services.gate.login(email, password).await {
        Ok(session) => session,
        Err(e) => return errors::auth_error_to_response(e),
    };

    match services.accounts.get(session.principal.id) {
        Ok(Some(account)) => (
            StatusCode::OK,
            Json(dto::session_to_json(&session.token, session.expires_at, &account)),
        )
            .into_response(),
        Ok(None) => errors::auth_error_to_response(AuthError::InvalidCredentials),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.accounts.get(principal.principal_id()) {
        Ok(Some(account)) => (
            StatusCode::OK,
            Json(serde_json::json!({ "user": dto::account_to_json(&account) })),
        )
            .into_response(),
        Ok(None) => errors::auth_error_to_response(AuthError::TokenInvalid),
        Err(e) => errors::store_error_to_response(e),
    }
}
