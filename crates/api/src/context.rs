use cronocodex_auth::{Principal, Role};
use cronocodex_core::PrincipalId;

/// Principal context for a request.
///
/// Holds the principal as re-resolved from the directory at authentication
/// time, not the role snapshot carried by the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal.id
    }

    pub fn role(&self) -> Role {
        self.principal.role
    }
}
