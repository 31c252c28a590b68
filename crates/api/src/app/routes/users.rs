use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{patch, post},
    Json, Router,
};

use cronocodex_auth::Role;
use cronocodex_core::PrincipalId;
use cronocodex_infra::NewAccount;

use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_user).get(list_users))
        .route("/:id/active", patch(set_active))
}

/// Create a direct report of the caller. The caller becomes the supervisor.
pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateUserRequest>,
) -> axum::response::Response {
    let (Some(full_name), Some(email), Some(role)) = (
        dto::required(&body.full_name),
        dto::required(&body.email),
        dto::required(&body.role),
    ) else {
        return errors::bad_request("fullName, email, password and role are required");
    };
    let password = match body.password.as_deref() {
        Some(p) if !p.is_empty() => p,
        _ => return errors::bad_request("fullName, email, password and role are required"),
    };

    let role = match errors::parse_role(role) {
        Ok(role) => role,
        Err(resp) => return resp,
    };
    if let Err(e) = services.gate.authorize_create(principal.principal(), role) {
        return errors::auth_error_to_response(e);
    }

    let credential = services.gate.hasher().derive(password);
    match services.accounts.insert_account(NewAccount {
        full_name: full_name.to_string(),
        email: email.to_string(),
        role,
        supervisor_id: Some(principal.principal_id()),
        credential,
    }) {
        Ok(account) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "user": dto::account_to_json(&account) })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// General admins see everyone; everyone else sees their direct reports.
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let listed = if principal.role() == Role::GeneralAdmin {
        services.accounts.list_all()
    } else {
        services.accounts.list_by_supervisor(principal.principal_id())
    };

    match listed {
        Ok(accounts) => {
            let users: Vec<_> = accounts.iter().map(dto::account_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "users": users }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn set_active(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::SetActiveRequest>,
) -> axum::response::Response {
    let target: PrincipalId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if let Err(e) = services.gate.authorize_manage(principal.principal(), target).await {
        return errors::auth_error_to_response(e);
    }

    match services.accounts.set_active(target, body.active) {
        Ok(account) => (
            StatusCode::OK,
            Json(serde_json::json!({ "user": dto::account_to_json(&account) })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
