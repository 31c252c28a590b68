//! `cronocodex-auth`: authentication and hierarchical authorization core.
//!
//! This crate is decoupled from HTTP and storage: account lookups
//! go through the [`PrincipalDirectory`] trait, everything else is pure.

pub mod authorize;
pub mod claims;
pub mod error;
pub mod password;
pub mod principal;
pub mod roles;
pub mod token;

pub use authorize::{
    ApprovalScope, AuthConfig, AuthGate, Session, SupervisorChain, normalize_identifier,
};
pub use claims::{TokenClaims, TokenValidationError, validate_claims};
pub use error::AuthError;
pub use password::{Credential, HashParams, PasswordHasher};
pub use principal::{DirectoryError, Principal, PrincipalDirectory, PrincipalStatus};
pub use roles::{Role, ScopeRule, UnknownRole, approver_scope, can_create};
pub use token::{DEFAULT_TOKEN_TTL_SECS, EmptySecret, MAX_TOKEN_TTL_SECS, SigningSecret, TokenCodec};
