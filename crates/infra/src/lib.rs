//! Infrastructure layer: keyed record storage and the account directory.
//!
//! Everything here is in-memory; the auth core only sees it through
//! `cronocodex_auth::PrincipalDirectory`.

pub mod absences;
pub mod directory;
pub mod error;
pub mod store;
pub mod time_events;

#[cfg(test)]
mod integration_tests;

pub use absences::{AbsenceKind, AbsenceRequest, AbsenceStatus, AbsenceStore, NewAbsenceRequest};
pub use directory::{AccountDirectory, AccountRecord, InMemoryAccountDirectory, NewAccount};
pub use error::StoreError;
pub use store::{InMemoryStore, KeyedStore};
pub use time_events::{TimeEvent, TimeEventKind, TimeEventLog};
