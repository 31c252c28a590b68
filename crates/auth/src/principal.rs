use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use cronocodex_core::PrincipalId;

use crate::{Credential, Role};

/// Account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalStatus {
    /// Account can log in and act.
    #[default]
    Active,
    /// Account is switched off; existing tokens stop working.
    Deactivated,
}

/// The authenticated actor for one request.
///
/// # Invariants
/// - `role` and `supervisor_id` are fixed at creation (no re-parenting, no role change).
/// - Only a root `GeneralAdmin` has no supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub role: Role,
    pub supervisor_id: Option<PrincipalId>,
    pub status: PrincipalStatus,
}

impl Principal {
    pub fn is_active(&self) -> bool {
        self.status == PrincipalStatus::Active
    }
}

/// The account store could not answer.
///
/// This is an infrastructure fault, not a security decision.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("principal directory unavailable: {0}")]
    Unavailable(String),
}

/// Read-only view of the account store consumed by the auth core.
///
/// Implementations may block on network/storage; callers hold no auth state
/// across these calls.
#[async_trait]
pub trait PrincipalDirectory: Send + Sync {
    async fn find_by_id(&self, id: PrincipalId) -> Result<Option<Principal>, DirectoryError>;

    /// Look up a principal and its stored credential by login identifier.
    async fn find_credential(
        &self,
        identifier: &str,
    ) -> Result<Option<(Principal, Credential)>, DirectoryError>;
}

#[async_trait]
impl<S> PrincipalDirectory for Arc<S>
where
    S: PrincipalDirectory + ?Sized,
{
    async fn find_by_id(&self, id: PrincipalId) -> Result<Option<Principal>, DirectoryError> {
        (**self).find_by_id(id).await
    }

    async fn find_credential(
        &self,
        identifier: &str,
    ) -> Result<Option<(Principal, Credential)>, DirectoryError> {
        (**self).find_credential(identifier).await
    }
}
