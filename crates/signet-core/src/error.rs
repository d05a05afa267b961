//! Error types for the Signet core.

use thiserror::Error;

use crate::crypto::Identity;
use crate::types::{Amount, ContentId};

/// Errors from cryptographic and encoding primitives.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("malformed call: {0}")]
    MalformedCall(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Precondition failures for registry operations.
///
/// Every variant is a caller-input fault detected before any state is
/// touched. An operation that returns one of these has changed nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("insufficient fee: required {required}, paid {paid}")]
    InsufficientFee { required: Amount, paid: Amount },

    #[error("content already registered: {0}")]
    AlreadyRegistered(ContentId),

    #[error("content not found: {0}")]
    NotFound(ContentId),

    #[error("caller {caller} is not the creator of {content_id}")]
    NotOwner {
        content_id: ContentId,
        caller: Identity,
    },

    #[error("caller {0} is not the admin")]
    NotAdmin(Identity),

    #[error("{voucher} has already vouched for {content_id}")]
    AlreadyVouched {
        content_id: ContentId,
        voucher: Identity,
    },

    #[error("creator cannot vouch for their own content: {0}")]
    SelfVouch(ContentId),

    #[error("only human-created content can be vouched for: {0}")]
    WrongCreationType(ContentId),

    #[error("content id must not be empty")]
    EmptyContentId,

    #[error("vouch threshold must be positive")]
    InvalidThreshold,

    #[error("batch registration is disabled")]
    BatchRegistrationDisabled,

    #[error("operation does not accept a payment (got {0})")]
    UnexpectedPayment(Amount),
}

/// Result type for registry planning.
pub type Result<T> = std::result::Result<T, RegistryError>;
