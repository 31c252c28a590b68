use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};

use cronocodex_core::{AbsenceRequestId, DomainError};
use cronocodex_infra::NewAbsenceRequest;

use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_request))
        .route("/me", get(list_mine))
        .route("/pending", get(list_pending))
        .route("/:id", patch(decide_request))
}

pub async fn create_request(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateAbsenceRequest>,
) -> axum::response::Response {
    let (Some(start), Some(end)) = (dto::required(&body.start_date), dto::required(&body.end_date)) else {
        return errors::bad_request("startDate and endDate are required");
    };
    let start_date = match errors::parse_date("startDate", start) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let end_date = match errors::parse_date("endDate", end) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let kind = match dto::required(&body.kind).map(errors::parse_absence_kind).transpose() {
        Ok(kind) => kind,
        Err(resp) => return resp,
    };

    match services.absences.create(NewAbsenceRequest {
        owner_id: principal.principal_id(),
        start_date,
        end_date,
        kind,
        comment: body.comment,
    }) {
        Ok(request) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "request": dto::absence_to_json(&request) })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_mine(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.absences.list_for(principal.principal_id()) {
        Ok(requests) => {
            let requests: Vec<_> = requests.iter().map(dto::absence_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "requests": requests }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Pending requests the caller may decide.
pub async fn list_pending(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let scope = match services.gate.approval_scope(principal.principal()) {
        Ok(scope) => scope,
        Err(e) => return errors::auth_error_to_response(e),
    };

    match services.absences.list_pending(&scope, &*services.accounts) {
        Ok(pending) => {
            let requests: Vec<_> = pending
                .iter()
                .map(|(request, owner)| dto::pending_absence_to_json(request, owner))
                .collect();
            (StatusCode::OK, Json(serde_json::json!({ "requests": requests }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn decide_request(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::DecideAbsenceRequest>,
) -> axum::response::Response {
    // Roles without an approval scope learn nothing about request ids.
    if let Err(e) = services.gate.approval_scope(principal.principal()) {
        return errors::auth_error_to_response(e);
    }

    let id: AbsenceRequestId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Some(status) = dto::required(&body.status) else {
        return errors::bad_request("status is required");
    };
    let status = match errors::parse_decision(status) {
        Ok(status) => status,
        Err(resp) => return resp,
    };

    let request = match services.absences.get(id) {
        Ok(Some(request)) => request,
        Ok(None) => return errors::store_error_to_response(DomainError::not_found().into()),
        Err(e) => return errors::store_error_to_response(e),
    };
    if let Err(e) = services
        .gate
        .authorize_decision(principal.principal(), request.owner_id)
        .await
    {
        return errors::auth_error_to_response(e);
    }

    match services
        .absences
        .decide(id, status, principal.principal_id(), body.decision_comment)
    {
        Ok(request) => (
            StatusCode::OK,
            Json(serde_json::json!({ "request": dto::absence_to_json(&request) })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
