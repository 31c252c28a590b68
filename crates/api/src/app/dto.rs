use chrono::{DateTime, Utc};
use serde::Deserialize;

use cronocodex_auth::PrincipalStatus;
use cronocodex_infra::{AbsenceRequest, AccountRecord, TimeEvent};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct RecordTimeEventRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAbsenceRequest {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecideAbsenceRequest {
    pub status: Option<String>,
    #[serde(alias = "comment")]
    pub decision_comment: Option<String>,
}

/// Present and non-blank, trimmed.
pub fn required<'a>(value: &'a Option<String>) -> Option<&'a str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// -------------------------
// Response mapping
// -------------------------

/// Public view of an account. Never includes credential material.
pub fn account_to_json(a: &AccountRecord) -> serde_json::Value {
    serde_json::json!({
        "id": a.id.to_string(),
        "fullName": a.full_name,
        "email": a.email,
        "role": a.role.as_str(),
        "supervisorId": a.supervisor_id.map(|id| id.to_string()),
        "active": a.status == PrincipalStatus::Active,
        "createdAt": a.created_at,
    })
}

pub fn session_to_json(token: &str, expires_at: DateTime<Utc>, account: &AccountRecord) -> serde_json::Value {
    serde_json::json!({
        "token": token,
        "expiresAt": expires_at,
        "user": account_to_json(account),
    })
}

pub fn time_event_to_json(e: &TimeEvent) -> serde_json::Value {
    serde_json::json!({
        "id": e.id.to_string(),
        "userId": e.owner_id.to_string(),
        "type": e.kind,
        "timestamp": e.recorded_at,
        "notes": e.notes,
    })
}

pub fn absence_to_json(r: &AbsenceRequest) -> serde_json::Value {
    serde_json::json!({
        "id": r.id.to_string(),
        "userId": r.owner_id.to_string(),
        "startDate": r.start_date,
        "endDate": r.end_date,
        "type": r.kind,
        "comment": r.comment,
        "status": r.status,
        "approverId": r.approver_id.map(|id| id.to_string()),
        "decisionComment": r.decision_comment,
        "createdAt": r.created_at,
        "updatedAt": r.updated_at,
    })
}

/// Pending request with the requester's name, for approver queues.
pub fn pending_absence_to_json(r: &AbsenceRequest, owner: &AccountRecord) -> serde_json::Value {
    let mut value = absence_to_json(r);
    value["employeeName"] = serde_json::Value::String(owner.full_name.clone());
    value["employeeEmail"] = serde_json::Value::String(owner.email.clone());
    value
}
