use thiserror::Error;

/// Outcome of a failed authentication or authorization step.
///
/// Variants carry no detail on purpose: callers see one generic outcome per
/// category. The specific reason is only ever logged.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// Wrong identifier or wrong secret (never says which).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Malformed, mis-signed or expired token, or the account behind it is gone.
    #[error("unauthenticated")]
    TokenInvalid,

    /// Authenticated but not permitted to perform the action.
    #[error("not authorized")]
    Forbidden,

    /// The principal/credential store could not answer.
    #[error("principal directory unavailable")]
    CollaboratorUnavailable,
}

impl AuthError {
    /// Only infrastructure faults are worth retrying; security decisions are final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::CollaboratorUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_collaborator_faults_are_retryable() {
        assert!(AuthError::CollaboratorUnavailable.is_retryable());
        assert!(!AuthError::InvalidCredentials.is_retryable());
        assert!(!AuthError::TokenInvalid.is_retryable());
        assert!(!AuthError::Forbidden.is_retryable());
    }
}
