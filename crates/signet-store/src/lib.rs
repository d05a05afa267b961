//! # Signet Store
//!
//! Persistence for registry state: content records, the vouch set, the
//! per-creator index, the access configuration and signed-call nonces.
//!
//! - [`Store`]: reads plus one atomic `commit` of planned writes
//! - [`SqliteStore`]: durable, one SQLite transaction per commit
//! - [`MemoryStore`]: in-process, for tests and ephemeral registries
//!
//! ## Usage
//!
//! ```rust,no_run
//! use signet_store::{SqliteStore, Store};
//!
//! async fn example() -> signet_store::Result<()> {
//!     let store = SqliteStore::open("data/signet.db")?;
//!     let records = store.list_records().await?;
//!     println!("{} records", records.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Changesets**: every registry operation is one `commit`, all or nothing
//! - **Conflicts**: duplicate records or vouches are rejected at commit time
//!   even if the caller skipped its own checks

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::Store;
