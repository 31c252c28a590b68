use std::sync::Arc;

use cronocodex_auth::{AuthConfig, AuthGate};
use cronocodex_infra::{AbsenceStore, InMemoryAccountDirectory, TimeEventLog};

pub type SharedDirectory = Arc<InMemoryAccountDirectory>;

/// Everything the handlers need, shared behind one `Arc`.
pub struct AppServices {
    pub gate: AuthGate<SharedDirectory>,
    pub accounts: SharedDirectory,
    pub time_events: TimeEventLog,
    pub absences: AbsenceStore,
}

impl AppServices {
    pub fn in_memory(auth: AuthConfig) -> Self {
        let accounts = Arc::new(InMemoryAccountDirectory::in_memory());
        Self {
            gate: AuthGate::new(auth, accounts.clone()),
            accounts,
            time_events: TimeEventLog::in_memory(),
            absences: AbsenceStore::in_memory(),
        }
    }
}
