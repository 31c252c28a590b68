use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use cronocodex_core::PrincipalId;

use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(record_event))
        .route("/me", get(list_mine))
        .route("/:user_id", get(list_for_user))
}

/// Record a time event for the caller, stamped with the server clock.
pub async fn record_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::RecordTimeEventRequest>,
) -> axum::response::Response {
    let Some(kind) = dto::required(&body.kind) else {
        return errors::bad_request("type is required");
    };
    let kind = match errors::parse_time_event_kind(kind) {
        Ok(kind) => kind,
        Err(resp) => return resp,
    };

    match services.time_events.record(principal.principal_id(), kind, body.notes) {
        Ok(event) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "event": dto::time_event_to_json(&event) })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_mine(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    list_events(&services, principal.principal_id())
}

/// Events of one account: the caller's own, or one under their oversight.
pub async fn list_for_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(user_id): Path<String>,
) -> axum::response::Response {
    let owner: PrincipalId = match errors::parse_id(&user_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if let Err(e) = services.gate.authorize_records(principal.principal(), owner).await {
        return errors::auth_error_to_response(e);
    }
    list_events(&services, owner)
}

fn list_events(services: &AppServices, owner: PrincipalId) -> axum::response::Response {
    match services.time_events.list_for(owner) {
        Ok(events) => {
            let events: Vec<_> = events.iter().map(dto::time_event_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "events": events }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
