//! Authorization gate: token → principal → allow/deny.
//!
//! - Reads only (through [`PrincipalDirectory`]); never mutates anything
//! - Every denial is the same [`AuthError::Forbidden`]; the reason is logged, not returned
//! - No retries; a directory fault surfaces as [`AuthError::CollaboratorUnavailable`]

use chrono::{DateTime, Duration, Utc};
use cronocodex_core::PrincipalId;

use crate::token::{DEFAULT_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS, SigningSecret, TokenCodec, expiry};
use crate::{
    AuthError, Credential, DirectoryError, PasswordHasher, Principal, PrincipalDirectory, Role,
    ScopeRule, approver_scope, can_create,
};

/// Startup configuration for the gate.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub signing_secret: SigningSecret,
    pub token_ttl: Duration,
}

impl AuthConfig {
    pub fn new(signing_secret: SigningSecret) -> Self {
        Self {
            signing_secret,
            token_ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
        }
    }

    /// Clamped to between one second and [`MAX_TOKEN_TTL_SECS`].
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl.clamp(Duration::seconds(1), Duration::seconds(MAX_TOKEN_TTL_SECS));
        self
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub principal: Principal,
    pub expires_at: DateTime<Utc>,
}

/// A subject's supervisor chain, as far up as scope checks need.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupervisorChain {
    pub direct: Option<PrincipalId>,
    pub second_level: Option<PrincipalId>,
}

/// Which pending requests a given approver may see and decide on.
///
/// Handed to storage so it can filter a pending-request query; decisions
/// re-check membership through the gate instead of trusting a fetched list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovalScope {
    pub approver: PrincipalId,
    pub rule: ScopeRule,
}

impl ApprovalScope {
    pub fn for_principal(principal: &Principal) -> Self {
        Self {
            approver: principal.id,
            rule: approver_scope(principal.role),
        }
    }

    pub fn admits(&self, chain: SupervisorChain) -> bool {
        let me = Some(self.approver);
        match self.rule {
            ScopeRule::Unscoped => true,
            ScopeRule::DirectOrSecondLevel => chain.direct == me || chain.second_level == me,
            ScopeRule::Direct => chain.direct == me,
            ScopeRule::Empty => false,
        }
    }
}

/// Composes the hasher, token codec and role policy over a principal directory.
pub struct AuthGate<D> {
    directory: D,
    codec: TokenCodec,
    hasher: PasswordHasher,
    token_ttl: Duration,
    // Checked against when the identifier is unknown, so timing matches a wrong password.
    decoy: Credential,
}

impl<D> AuthGate<D>
where
    D: PrincipalDirectory,
{
    pub fn new(config: AuthConfig, directory: D) -> Self {
        let hasher = PasswordHasher::new();
        let decoy = hasher.derive("decoy-credential");
        Self {
            directory,
            codec: TokenCodec::new(config.signing_secret),
            hasher,
            token_ttl: config.token_ttl,
            decoy,
        }
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Check credentials and issue a session token.
    ///
    /// Unknown identifier, wrong secret and deactivated account are
    /// indistinguishable to the caller.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<Session, AuthError> {
        let identifier = normalize_identifier(identifier);
        let found = self
            .directory
            .find_credential(&identifier)
            .await
            .map_err(unavailable)?;

        let Some((principal, credential)) = found else {
            std::hint::black_box(PasswordHasher::verify(secret, &self.decoy));
            tracing::info!("login rejected: unknown identifier");
            return Err(AuthError::InvalidCredentials);
        };

        if !PasswordHasher::verify(secret, &credential) {
            tracing::info!(principal_id = %principal.id, "login rejected: wrong secret");
            return Err(AuthError::InvalidCredentials);
        }
        if !principal.is_active() {
            tracing::info!(principal_id = %principal.id, "login rejected: account deactivated");
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        let token = self.codec.issue(principal.id, principal.role, self.token_ttl, now);
        tracing::info!(principal_id = %principal.id, role = %principal.role, "login succeeded");

        Ok(Session {
            token,
            principal,
            expires_at: expiry(now, self.token_ttl),
        })
    }

    /// Resolve the live principal behind a bearer token.
    pub async fn authenticate(&self, token: &str) -> Result<Principal, AuthError> {
        let claims = self.codec.verify(token, Utc::now())?;

        let principal = self
            .directory
            .find_by_id(claims.sub)
            .await
            .map_err(unavailable)?
            .ok_or_else(|| {
                tracing::debug!(principal_id = %claims.sub, "token subject no longer exists");
                AuthError::TokenInvalid
            })?;

        if !principal.is_active() {
            tracing::debug!(principal_id = %principal.id, "token subject is deactivated");
            return Err(AuthError::TokenInvalid);
        }
        if principal.role != claims.role {
            tracing::debug!(principal_id = %principal.id, "token role snapshot disagrees with account");
            return Err(AuthError::TokenInvalid);
        }

        Ok(principal)
    }

    /// May `actor` create an account of kind `desired`?
    pub fn authorize_create(&self, actor: &Principal, desired: Role) -> Result<(), AuthError> {
        if can_create(actor.role, desired) {
            Ok(())
        } else {
            Err(deny(actor, "role may not create this kind of account"))
        }
    }

    /// The scope to filter pending requests with. Denied for roles that never approve.
    pub fn approval_scope(&self, actor: &Principal) -> Result<ApprovalScope, AuthError> {
        let scope = ApprovalScope::for_principal(actor);
        if scope.rule.is_empty() {
            return Err(deny(actor, "role has no approver scope"));
        }
        Ok(scope)
    }

    /// May `actor` look after `subject_id` (see its records, decide its requests)?
    ///
    /// Resolves the subject's supervisor chain now, not from any earlier listing.
    pub async fn authorize_oversight(
        &self,
        actor: &Principal,
        subject_id: PrincipalId,
    ) -> Result<(), AuthError> {
        let scope = self.approval_scope(actor)?;

        let Some(subject) = self.find(subject_id).await? else {
            return Err(deny(actor, "subject does not exist"));
        };

        let mut chain = SupervisorChain {
            direct: subject.supervisor_id,
            second_level: None,
        };
        if scope.rule.needs_second_level() {
            if let Some(direct) = subject.supervisor_id {
                chain.second_level = self.find(direct).await?.and_then(|p| p.supervisor_id);
            }
        }

        if scope.admits(chain) {
            Ok(())
        } else {
            Err(deny(actor, "subject is outside approver scope"))
        }
    }

    /// May `actor` decide on a request owned by `owner_id`?
    pub async fn authorize_decision(
        &self,
        actor: &Principal,
        owner_id: PrincipalId,
    ) -> Result<(), AuthError> {
        self.authorize_oversight(actor, owner_id).await
    }

    /// May `actor` read `owner_id`'s records? Always for one's own.
    pub async fn authorize_records(
        &self,
        actor: &Principal,
        owner_id: PrincipalId,
    ) -> Result<(), AuthError> {
        if actor.id == owner_id {
            return Ok(());
        }
        self.authorize_oversight(actor, owner_id).await
    }

    /// May `actor` toggle `target_id`'s active flag?
    ///
    /// General admins may manage anyone but themselves; everyone else only
    /// their direct reports.
    pub async fn authorize_manage(
        &self,
        actor: &Principal,
        target_id: PrincipalId,
    ) -> Result<(), AuthError> {
        if actor.id == target_id {
            return Err(deny(actor, "cannot manage own account"));
        }
        let Some(target) = self.find(target_id).await? else {
            return Err(deny(actor, "target does not exist"));
        };
        if actor.role == Role::GeneralAdmin || target.supervisor_id == Some(actor.id) {
            Ok(())
        } else {
            Err(deny(actor, "target is not a direct report"))
        }
    }

    async fn find(&self, id: PrincipalId) -> Result<Option<Principal>, AuthError> {
        self.directory.find_by_id(id).await.map_err(unavailable)
    }
}

/// Identifiers are compared trimmed and lower-cased.
pub fn normalize_identifier(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}

fn deny(actor: &Principal, reason: &'static str) -> AuthError {
    tracing::debug!(principal_id = %actor.id, role = %actor.role, reason, "authorization denied");
    AuthError::Forbidden
}

fn unavailable(err: DirectoryError) -> AuthError {
    tracing::warn!(error = %err, "principal directory lookup failed");
    AuthError::CollaboratorUnavailable
}
