//! Store trait: the abstract interface for registry persistence.
//!
//! The registry reads snapshots through the query methods and applies every
//! operation as one [`Write`] changeset through [`Store::commit`].
//! Implementations include SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use signet_core::{AccessConfig, ContentId, ContentRecord, Identity, Write};

use crate::error::Result;

/// The Store trait: async interface for registry persistence.
///
/// All methods are async to support both sync (SQLite) and async backends.
/// For SQLite, we use `spawn_blocking` internally to avoid blocking the runtime.
///
/// # Design Notes
///
/// - **Absent records**: `get_record` returns `None`; the registry maps
///   that to the all-default [`ContentRecord`].
/// - **Atomic commits**: `commit` applies every write or none of them.
/// - **Conflict backstop**: `commit` rejects an `InsertRecord` for a taken id,
///   an `UpdateRecord` for a missing one, an `InsertVouch` for an existing
///   pair and an `AdvanceNonce` that does not increase the stored nonce.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Content Records
    // ─────────────────────────────────────────────────────────────────────────

    /// Get the record for a content id.
    async fn get_record(&self, content_id: &ContentId) -> Result<Option<ContentRecord>>;

    /// All records in registration order.
    async fn list_records(&self) -> Result<Vec<ContentRecord>>;

    /// Content ids registered by a creator, in registration order.
    async fn creator_content(&self, creator: &Identity) -> Result<Vec<ContentId>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Vouches
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether `voucher` has vouched for `content_id`.
    async fn has_vouched(&self, content_id: &ContentId, voucher: &Identity) -> Result<bool>;

    /// Identities that vouched for a content id, in vouch order.
    async fn vouchers(&self, content_id: &ContentId) -> Result<Vec<Identity>>;

    /// Number of stored vouches for a content id.
    async fn count_vouches(&self, content_id: &ContentId) -> Result<u64>;

    // ─────────────────────────────────────────────────────────────────────────
    // Access Configuration and Nonces
    // ─────────────────────────────────────────────────────────────────────────

    /// The configuration singleton, if genesis has been written.
    async fn get_config(&self) -> Result<Option<AccessConfig>>;

    /// The highest signed-call nonce accepted from a caller.
    async fn last_nonce(&self, caller: &Identity) -> Result<Option<u64>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Mutation
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply a changeset atomically.
    async fn commit(&self, writes: &[Write]) -> Result<()>;
}
