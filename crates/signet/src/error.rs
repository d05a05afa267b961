//! Error types for the registry.

use signet_core::{CoreError, Identity, RegistryError};
use signet_store::StoreError;
use thiserror::Error;

use crate::treasury::TreasuryError;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum SignetError {
    /// A precondition failed. Nothing was changed.
    #[error("rejected: {0}")]
    Rejected(#[from] RegistryError),

    /// Signature or encoding failure on a submitted call.
    #[error("call error: {0}")]
    Call(#[from] CoreError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// The fee transfer failed or could not be compensated.
    #[error("treasury error: {0}")]
    Treasury(#[from] TreasuryError),

    /// A signed call reused or regressed its caller's nonce.
    #[error("stale nonce for {caller}: got {nonce}, last accepted {last}")]
    StaleNonce {
        caller: Identity,
        nonce: u64,
        last: u64,
    },

    /// Invalid registry configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Stored state broke a registry invariant.
    #[error("invariant violated: {0}")]
    Invariant(String),
}

impl SignetError {
    /// The precondition failure, if this is one.
    pub fn rejection(&self) -> Option<&RegistryError> {
        match self {
            Self::Rejected(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, SignetError>;
