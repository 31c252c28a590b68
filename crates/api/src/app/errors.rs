use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;
use serde_json::json;

use cronocodex_auth::{AuthError, Role};
use cronocodex_core::DomainError;
use cronocodex_infra::{AbsenceKind, AbsenceStatus, StoreError, TimeEventKind};

/// Auth failures carry no detail beyond their kind.
pub fn auth_error_to_response(err: AuthError) -> Response {
    match err {
        AuthError::InvalidCredentials => {
            json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", "invalid credentials")
        }
        AuthError::TokenInvalid => {
            json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "unauthenticated")
        }
        AuthError::Forbidden => json_error(StatusCode::FORBIDDEN, "forbidden", "not authorized"),
        AuthError::CollaboratorUnavailable => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "unavailable",
            "service temporarily unavailable",
        ),
    }
}

pub fn store_error_to_response(err: StoreError) -> Response {
    match err {
        StoreError::Domain(DomainError::Validation(msg)) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        StoreError::Domain(DomainError::InvalidId(msg)) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_id", msg)
        }
        StoreError::Domain(DomainError::InvariantViolation(msg)) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        StoreError::Domain(DomainError::NotFound) => {
            json_error(StatusCode::NOT_FOUND, "not_found", "not found")
        }
        StoreError::Domain(DomainError::Conflict(msg)) => {
            json_error(StatusCode::CONFLICT, "conflict", msg)
        }
        StoreError::Unavailable(msg) => {
            tracing::warn!(error = %msg, "store unavailable");
            json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "unavailable",
                "service temporarily unavailable",
            )
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn bad_request(message: impl Into<String>) -> Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", message)
}

pub fn parse_role(s: &str) -> Result<Role, Response> {
    s.trim().to_uppercase().parse::<Role>().map_err(|_| {
        json_error(
            StatusCode::BAD_REQUEST,
            "invalid_role",
            "role must be one of: GENERAL_ADMIN, AREA_MANAGER, HR_ADMIN, WORKER",
        )
    })
}

pub fn parse_time_event_kind(s: &str) -> Result<TimeEventKind, Response> {
    match s.trim().to_uppercase().as_str() {
        "CLOCK_IN" => Ok(TimeEventKind::ClockIn),
        "CLOCK_OUT" => Ok(TimeEventKind::ClockOut),
        "BREAK_START" => Ok(TimeEventKind::BreakStart),
        "BREAK_END" => Ok(TimeEventKind::BreakEnd),
        _ => Err(json_error(
            StatusCode::BAD_REQUEST,
            "invalid_event_type",
            "type must be one of: CLOCK_IN, CLOCK_OUT, BREAK_START, BREAK_END",
        )),
    }
}

pub fn parse_absence_kind(s: &str) -> Result<AbsenceKind, Response> {
    match s.trim().to_uppercase().as_str() {
        "VACATION" => Ok(AbsenceKind::Vacation),
        "SICK_LEAVE" => Ok(AbsenceKind::SickLeave),
        "PERSONAL" => Ok(AbsenceKind::Personal),
        "OTHER" => Ok(AbsenceKind::Other),
        _ => Err(json_error(
            StatusCode::BAD_REQUEST,
            "invalid_absence_type",
            "type must be one of: VACATION, SICK_LEAVE, PERSONAL, OTHER",
        )),
    }
}

/// Only terminal statuses are valid decisions.
pub fn parse_decision(s: &str) -> Result<AbsenceStatus, Response> {
    match s.trim().to_uppercase().as_str() {
        "APPROVED" => Ok(AbsenceStatus::Approved),
        "REJECTED" => Ok(AbsenceStatus::Rejected),
        _ => Err(json_error(
            StatusCode::BAD_REQUEST,
            "invalid_status",
            "status must be APPROVED or REJECTED",
        )),
    }
}

pub fn parse_date(field: &'static str, s: &str) -> Result<NaiveDate, Response> {
    s.trim()
        .parse()
        .map_err(|_| bad_request(format!("{field} must be a YYYY-MM-DD date")))
}

pub fn parse_id<T>(s: &str) -> Result<T, Response>
where
    T: std::str::FromStr<Err = DomainError>,
{
    s.parse()
        .map_err(|e| store_error_to_response(StoreError::Domain(e)))
}
