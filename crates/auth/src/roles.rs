use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Account kind.
///
/// The set is closed: the creation chain and approver scopes below are total
/// over these four variants and are domain policy, not deployment config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    GeneralAdmin,
    AreaManager,
    HrAdmin,
    Worker,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::GeneralAdmin,
        Role::AreaManager,
        Role::HrAdmin,
        Role::Worker,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::GeneralAdmin => "GENERAL_ADMIN",
            Role::AreaManager => "AREA_MANAGER",
            Role::HrAdmin => "HR_ADMIN",
            Role::Worker => "WORKER",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Creation chain
// ─────────────────────────────────────────────────────────────────────────────

/// Creator role → roles it may instantiate.
///
/// Exactly one step down the chain; no role creates its own kind.
const CREATION_CHAIN: [(Role, &[Role]); 4] = [
    (Role::GeneralAdmin, &[Role::AreaManager]),
    (Role::AreaManager, &[Role::HrAdmin]),
    (Role::HrAdmin, &[Role::Worker]),
    (Role::Worker, &[]),
];

/// Whether `creator` may create an account of kind `target`.
pub fn can_create(creator: Role, target: Role) -> bool {
    CREATION_CHAIN
        .iter()
        .find(|(role, _)| *role == creator)
        .is_some_and(|(_, allowed)| allowed.contains(&target))
}

// ─────────────────────────────────────────────────────────────────────────────
// Approver scopes
// ─────────────────────────────────────────────────────────────────────────────

/// Which part of the supervisor forest an approver role reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeRule {
    /// Every pending request.
    Unscoped,
    /// Subjects whose direct supervisor, or whose supervisor's supervisor, is the approver.
    ///
    /// Exactly two levels; deeper hierarchies are not covered.
    DirectOrSecondLevel,
    /// Subjects whose direct supervisor is the approver.
    Direct,
    /// Never approves anything.
    Empty,
}

impl ScopeRule {
    pub fn is_empty(&self) -> bool {
        matches!(self, ScopeRule::Empty)
    }

    /// Whether resolving this rule needs the subject's second-level supervisor.
    pub fn needs_second_level(&self) -> bool {
        matches!(self, ScopeRule::DirectOrSecondLevel)
    }
}

const APPROVER_SCOPES: [(Role, ScopeRule); 4] = [
    (Role::GeneralAdmin, ScopeRule::Unscoped),
    (Role::AreaManager, ScopeRule::DirectOrSecondLevel),
    (Role::HrAdmin, ScopeRule::Direct),
    (Role::Worker, ScopeRule::Empty),
];

/// Scope rule for an approver role.
pub fn approver_scope(role: Role) -> ScopeRule {
    APPROVER_SCOPES
        .iter()
        .find(|(r, _)| *r == role)
        .map(|(_, rule)| *rule)
        .unwrap_or(ScopeRule::Empty)
}
