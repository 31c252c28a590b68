use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cronocodex_core::{PrincipalId, TimeEventId};

use crate::store::{InMemoryStore, KeyedStore};
use crate::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeEventKind {
    ClockIn,
    ClockOut,
    BreakStart,
    BreakEnd,
}

/// A clock-in/clock-out style event; the timestamp is always server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEvent {
    pub id: TimeEventId,
    pub owner_id: PrincipalId,
    pub kind: TimeEventKind,
    pub recorded_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Append-only per-account time log.
pub struct TimeEventLog<S = InMemoryStore<TimeEventId, TimeEvent>> {
    store: S,
}

impl TimeEventLog {
    pub fn in_memory() -> Self {
        Self::new(InMemoryStore::new())
    }
}

impl<S> TimeEventLog<S>
where
    S: KeyedStore<TimeEventId, TimeEvent>,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn record(
        &self,
        owner_id: PrincipalId,
        kind: TimeEventKind,
        notes: Option<String>,
    ) -> Result<TimeEvent, StoreError> {
        let event = TimeEvent {
            id: TimeEventId::new(),
            owner_id,
            kind,
            recorded_at: Utc::now(),
            notes: notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        };
        self.store.upsert(event.id, event.clone())?;
        tracing::debug!(owner_id = %owner_id, kind = ?kind, "time event recorded");
        Ok(event)
    }

    /// Events of one account, newest first.
    pub fn list_for(&self, owner_id: PrincipalId) -> Result<Vec<TimeEvent>, StoreError> {
        let mut events: Vec<_> = self
            .store
            .list()?
            .into_iter()
            .filter(|e| e.owner_id == owner_id)
            .collect();
        events.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at).then(b.id.cmp(&a.id)));
        Ok(events)
    }
}
