use thiserror::Error;

use cronocodex_core::DomainError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The record or request was rejected by a domain rule.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The backing store cannot answer (e.g. poisoned lock, lost connection).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
