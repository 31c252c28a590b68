//! Account directory: the principal/credential collaborator of the auth core.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use cronocodex_auth::{
    Credential, DirectoryError, Principal, PrincipalDirectory, PrincipalStatus, Role,
    SupervisorChain, normalize_identifier,
};
use cronocodex_core::{DomainError, PrincipalId};

use crate::store::{InMemoryStore, KeyedStore};
use crate::StoreError;

/// Stored account.
#[derive(Debug, Clone)]
pub struct AccountRecord {
    pub id: PrincipalId,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub supervisor_id: Option<PrincipalId>,
    pub status: PrincipalStatus,
    pub credential: Credential,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountRecord {
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            role: self.role,
            supervisor_id: self.supervisor_id,
            status: self.status,
        }
    }
}

/// Input for [`AccountDirectory::insert_account`].
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub supervisor_id: Option<PrincipalId>,
    pub credential: Credential,
}

/// Accounts keyed by id, plus a unique login-identifier index.
///
/// # Invariants
/// - Emails are unique after trimming and lower-casing.
/// - Only a `GeneralAdmin` may be stored without a supervisor, and a
///   `GeneralAdmin` never has one.
/// - A supervisor must already exist when its report is stored, so the
///   supervisor relation is a forest.
/// - `role` and `supervisor_id` never change after insertion.
pub struct AccountDirectory<A, E> {
    accounts: A,
    by_email: E,
}

pub type InMemoryAccountDirectory =
    AccountDirectory<InMemoryStore<PrincipalId, AccountRecord>, InMemoryStore<String, PrincipalId>>;

impl InMemoryAccountDirectory {
    pub fn in_memory() -> Self {
        Self::new(InMemoryStore::new(), InMemoryStore::new())
    }
}

impl<A, E> AccountDirectory<A, E>
where
    A: KeyedStore<PrincipalId, AccountRecord>,
    E: KeyedStore<String, PrincipalId>,
{
    pub fn new(accounts: A, by_email: E) -> Self {
        Self { accounts, by_email }
    }

    pub fn insert_account(&self, new: NewAccount) -> Result<AccountRecord, StoreError> {
        let full_name = new.full_name.trim().to_string();
        if full_name.is_empty() {
            return Err(DomainError::validation("full name cannot be empty").into());
        }
        let email = normalize_identifier(&new.email);
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::validation("invalid email format").into());
        }

        match (new.role, new.supervisor_id) {
            (Role::GeneralAdmin, None) => {}
            (Role::GeneralAdmin, Some(_)) => {
                return Err(DomainError::invariant("a general admin has no supervisor").into());
            }
            (_, None) => {
                return Err(DomainError::invariant("account requires a supervisor").into());
            }
            (_, Some(supervisor_id)) => {
                if self.accounts.get(&supervisor_id)?.is_none() {
                    return Err(DomainError::invariant("supervisor does not exist").into());
                }
            }
        }

        let id = PrincipalId::new();
        if !self.by_email.insert_if_absent(email.clone(), id)? {
            return Err(DomainError::conflict("email already registered").into());
        }

        let now = Utc::now();
        let record = AccountRecord {
            id,
            full_name,
            email,
            role: new.role,
            supervisor_id: new.supervisor_id,
            status: PrincipalStatus::Active,
            credential: new.credential,
            created_at: now,
            updated_at: now,
        };
        if let Err(err) = self.accounts.upsert(id, record.clone()) {
            // Release the email so a retry can claim it.
            if let Err(cleanup) = self.by_email.remove(&record.email) {
                tracing::warn!(error = %cleanup, "failed to release email reservation");
            }
            return Err(err);
        }

        tracing::info!(principal_id = %id, role = %record.role, "account created");
        Ok(record)
    }

    pub fn get(&self, id: PrincipalId) -> Result<Option<AccountRecord>, StoreError> {
        self.accounts.get(&id)
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, StoreError> {
        match self.by_email.get(&normalize_identifier(email))? {
            Some(id) => self.accounts.get(&id),
            None => Ok(None),
        }
    }

    /// Every account, newest first.
    pub fn list_all(&self) -> Result<Vec<AccountRecord>, StoreError> {
        let mut all = self.accounts.list()?;
        newest_first(&mut all);
        Ok(all)
    }

    /// Direct reports of `supervisor_id`, newest first.
    pub fn list_by_supervisor(&self, supervisor_id: PrincipalId) -> Result<Vec<AccountRecord>, StoreError> {
        let mut reports: Vec<_> = self
            .accounts
            .list()?
            .into_iter()
            .filter(|a| a.supervisor_id == Some(supervisor_id))
            .collect();
        newest_first(&mut reports);
        Ok(reports)
    }

    pub fn any_with_role(&self, role: Role) -> Result<bool, StoreError> {
        Ok(self.accounts.list()?.iter().any(|a| a.role == role))
    }

    /// Toggle the active flag. Nothing else about an account is mutable.
    pub fn set_active(&self, id: PrincipalId, active: bool) -> Result<AccountRecord, StoreError> {
        let status = if active {
            PrincipalStatus::Active
        } else {
            PrincipalStatus::Deactivated
        };
        let now = Utc::now();
        let record = self
            .accounts
            .update(&id, &mut |record| {
                record.status = status;
                record.updated_at = now;
                Ok(())
            })?
            .ok_or(DomainError::NotFound)?;

        tracing::info!(principal_id = %id, active, "account status changed");
        Ok(record)
    }

    /// Supervisor and second-level supervisor of `id`.
    pub fn supervisor_chain(&self, id: PrincipalId) -> Result<SupervisorChain, StoreError> {
        let direct = self.accounts.get(&id)?.and_then(|a| a.supervisor_id);
        let second_level = match direct {
            Some(sup) => self.accounts.get(&sup)?.and_then(|a| a.supervisor_id),
            None => None,
        };
        Ok(SupervisorChain { direct, second_level })
    }
}

fn newest_first(records: &mut [AccountRecord]) {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

fn unavailable(err: StoreError) -> DirectoryError {
    DirectoryError::Unavailable(err.to_string())
}

#[async_trait]
impl<A, E> PrincipalDirectory for AccountDirectory<A, E>
where
    A: KeyedStore<PrincipalId, AccountRecord>,
    E: KeyedStore<String, PrincipalId>,
{
    async fn find_by_id(&self, id: PrincipalId) -> Result<Option<Principal>, DirectoryError> {
        Ok(self.get(id).map_err(unavailable)?.map(|a| a.principal()))
    }

    async fn find_credential(
        &self,
        identifier: &str,
    ) -> Result<Option<(Principal, Credential)>, DirectoryError> {
        Ok(self
            .find_by_email(identifier)
            .map_err(unavailable)?
            .map(|a| (a.principal(), a.credential)))
    }
}
