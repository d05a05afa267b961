//! # Signet Core
//!
//! Pure primitives for the Signet content provenance registry: records,
//! vouches, access configuration and signed calls.
//!
//! This crate contains no I/O and no storage. Every operation is a planner
//! that inspects a snapshot and returns a [`Transition`] describing what
//! should change; the `signet` crate applies transitions atomically.
//!
//! ## Key Types
//!
//! - [`ContentRecord`] - The provenance claim for one piece of content
//! - [`AccessConfig`] - Admin, fee collector, fee and vouch threshold
//! - [`Transition`] - Writes, notifications and an optional fee transfer
//! - [`SignedCall`] - A call authenticated by its caller's Ed25519 key
//!
//! ## Canonicalization
//!
//! Signed calls are encoded as deterministic CBOR. See [`canonical`].

pub mod access;
pub mod call;
pub mod canonical;
pub mod content;
pub mod crypto;
pub mod error;
pub mod event;
pub mod guard;
pub mod record;
pub mod transition;
pub mod types;
pub mod vouch;

pub use access::{
    plan_set_fee_collector, plan_set_registration_fee, plan_set_vouch_threshold,
    plan_transfer_admin, AccessConfig, DEFAULT_VOUCH_THRESHOLD,
};
pub use call::{Call, SignedCall};
pub use content::{plan_register, plan_update_creation_type, FeeGate, Registration};
pub use crypto::{Blake3Hash, Identity, Keypair, Signature};
pub use error::{CoreError, RegistryError};
pub use event::{ConfigChange, Notification};
pub use record::{ContentRecord, CreationType, VerificationStatus};
pub use transition::{FeeTransfer, Transition, Write};
pub use types::{Amount, ContentId, Timestamp};
pub use vouch::plan_vouch;
