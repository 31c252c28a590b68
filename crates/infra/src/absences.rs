//! Absence (vacation/leave) requests and their approval state.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use cronocodex_auth::ApprovalScope;
use cronocodex_core::{AbsenceRequestId, DomainError, PrincipalId};

use crate::directory::{AccountDirectory, AccountRecord};
use crate::store::{InMemoryStore, KeyedStore};
use crate::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AbsenceKind {
    #[default]
    Vacation,
    SickLeave,
    Personal,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AbsenceStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsenceRequest {
    pub id: AbsenceRequestId,
    pub owner_id: PrincipalId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub kind: AbsenceKind,
    pub comment: Option<String>,
    pub status: AbsenceStatus,
    pub approver_id: Option<PrincipalId>,
    pub decision_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAbsenceRequest {
    pub owner_id: PrincipalId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub kind: Option<AbsenceKind>,
    pub comment: Option<String>,
}

pub struct AbsenceStore<S = InMemoryStore<AbsenceRequestId, AbsenceRequest>> {
    store: S,
}

impl AbsenceStore {
    pub fn in_memory() -> Self {
        Self::new(InMemoryStore::new())
    }
}

impl<S> AbsenceStore<S>
where
    S: KeyedStore<AbsenceRequestId, AbsenceRequest>,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn create(&self, new: NewAbsenceRequest) -> Result<AbsenceRequest, StoreError> {
        if new.end_date < new.start_date {
            return Err(DomainError::validation("end date precedes start date").into());
        }

        let now = Utc::now();
        let request = AbsenceRequest {
            id: AbsenceRequestId::new(),
            owner_id: new.owner_id,
            start_date: new.start_date,
            end_date: new.end_date,
            kind: new.kind.unwrap_or_default(),
            comment: non_blank(new.comment),
            status: AbsenceStatus::Pending,
            approver_id: None,
            decision_comment: None,
            created_at: now,
            updated_at: now,
        };
        self.store.upsert(request.id, request.clone())?;
        tracing::info!(request_id = %request.id, owner_id = %request.owner_id, "absence requested");
        Ok(request)
    }

    pub fn get(&self, id: AbsenceRequestId) -> Result<Option<AbsenceRequest>, StoreError> {
        self.store.get(&id)
    }

    /// Requests of one account, newest first.
    pub fn list_for(&self, owner_id: PrincipalId) -> Result<Vec<AbsenceRequest>, StoreError> {
        let mut requests: Vec<_> = self
            .store
            .list()?
            .into_iter()
            .filter(|r| r.owner_id == owner_id)
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(requests)
    }

    /// Pending requests inside `scope`, oldest first, with the owner's account.
    pub fn list_pending<A, E>(
        &self,
        scope: &ApprovalScope,
        accounts: &AccountDirectory<A, E>,
    ) -> Result<Vec<(AbsenceRequest, AccountRecord)>, StoreError>
    where
        A: KeyedStore<PrincipalId, AccountRecord>,
        E: KeyedStore<String, PrincipalId>,
    {
        let mut pending = Vec::new();
        for request in self.store.list()? {
            if request.status != AbsenceStatus::Pending {
                continue;
            }
            let Some(owner) = accounts.get(request.owner_id)? else {
                continue;
            };
            if scope.admits(accounts.supervisor_chain(owner.id)?) {
                pending.push((request, owner));
            }
        }
        pending.sort_by(|(a, _), (b, _)| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(pending)
    }

    /// Record an approval decision. Only pending requests can be decided.
    pub fn decide(
        &self,
        id: AbsenceRequestId,
        status: AbsenceStatus,
        approver_id: PrincipalId,
        decision_comment: Option<String>,
    ) -> Result<AbsenceRequest, StoreError> {
        if status == AbsenceStatus::Pending {
            return Err(DomainError::validation("decision must approve or reject").into());
        }

        let decision_comment = non_blank(decision_comment);
        let now = Utc::now();
        let request = self
            .store
            .update(&id, &mut |request| {
                if request.status != AbsenceStatus::Pending {
                    return Err(DomainError::conflict("request already decided").into());
                }
                request.status = status;
                request.approver_id = Some(approver_id);
                request.decision_comment = decision_comment.clone();
                request.updated_at = now;
                Ok(())
            })?
            .ok_or(DomainError::NotFound)?;

        tracing::info!(request_id = %id, approver_id = %approver_id, status = ?status, "absence decided");
        Ok(request)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn request(owner_id: PrincipalId) -> NewAbsenceRequest {
        NewAbsenceRequest {
            owner_id,
            start_date: date("2026-08-03"),
            end_date: date("2026-08-14"),
            kind: None,
            comment: Some("summer".to_string()),
        }
    }

    #[test]
    fn create_defaults_to_pending_vacation() {
        let store = AbsenceStore::in_memory();
        let created = store.create(request(PrincipalId::new())).unwrap();
        assert_eq!(created.kind, AbsenceKind::Vacation);
        assert_eq!(created.status, AbsenceStatus::Pending);
        assert_eq!(store.get(created.id).unwrap(), Some(created));
    }

    #[test]
    fn create_rejects_inverted_dates() {
        let store = AbsenceStore::in_memory();
        let mut bad = request(PrincipalId::new());
        bad.end_date = date("2026-08-01");
        assert!(matches!(
            store.create(bad),
            Err(StoreError::Domain(DomainError::Validation(_)))
        ));
    }

    #[test]
    fn decide_only_once() {
        let store = AbsenceStore::in_memory();
        let created = store.create(request(PrincipalId::new())).unwrap();
        let approver = PrincipalId::new();

        assert!(store.decide(created.id, AbsenceStatus::Pending, approver, None).is_err());

        let decided = store
            .decide(created.id, AbsenceStatus::Approved, approver, Some(" enjoy ".to_string()))
            .unwrap();
        assert_eq!(decided.status, AbsenceStatus::Approved);
        assert_eq!(decided.approver_id, Some(approver));
        assert_eq!(decided.decision_comment.as_deref(), Some("enjoy"));

        assert!(matches!(
            store.decide(created.id, AbsenceStatus::Rejected, approver, None),
            Err(StoreError::Domain(DomainError::Conflict(_)))
        ));
        assert!(matches!(
            store.decide(AbsenceRequestId::new(), AbsenceStatus::Rejected, approver, None),
            Err(StoreError::Domain(DomainError::NotFound))
        ));
    }

    #[test]
    fn concurrent_decisions_have_one_winner() {
        use std::sync::{Arc, Barrier};
        use std::thread;

        let store = Arc::new(AbsenceStore::in_memory());
        for _ in 0..200 {
            let created = store.create(request(PrincipalId::new())).unwrap();
            let barrier = Arc::new(Barrier::new(2));

            let handles: Vec<_> = [AbsenceStatus::Approved, AbsenceStatus::Rejected]
                .into_iter()
                .map(|status| {
                    let store = store.clone();
                    let barrier = barrier.clone();
                    thread::spawn(move || {
                        barrier.wait();
                        store.decide(created.id, status, PrincipalId::new(), None)
                    })
                })
                .collect();

            let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
            let winners: Vec<_> = outcomes.iter().filter_map(|o| o.as_ref().ok()).collect();
            assert_eq!(winners.len(), 1);
            assert!(outcomes.iter().any(|o| matches!(
                o,
                Err(StoreError::Domain(DomainError::Conflict(_)))
            )));
            assert_eq!(store.get(created.id).unwrap().unwrap().status, winners[0].status);
        }
    }
}
