//! # Signet
//!
//! The unified API for the Signet content provenance registry: creators
//! register authorship claims, other identities vouch for human-created
//! claims, and an admin tunes fees and the vouch threshold.
//!
//! ## Overview
//!
//! - **ContentRegistry**: one record per content id, self-attested on
//!   registration, reclassifiable only by its creator
//! - **VouchLedger**: one vouch per identity per content; the vote that
//!   reaches the threshold promotes the record to community vouched
//! - **AccessConfig**: admin, fee collector, registration fee and threshold
//!
//! ## Usage
//!
//! ```rust,no_run
//! use signet::{Registry, RegistryConfig};
//! use signet::core::{Amount, CreationType, Keypair, Registration};
//! use signet::store::SqliteStore;
//!
//! async fn example() -> signet::Result<()> {
//!     let admin = Keypair::generate();
//!     let creator = Keypair::generate();
//!
//!     let store = SqliteStore::open("signet.db")?;
//!     let mut registry =
//!         Registry::open(store, RegistryConfig::with_admin(admin.identity())).await?;
//!
//!     let claim = Registration::new("sha256:ab12", "https://bsky.app/post/1", CreationType::HumanCreated)
//!         .platform_source("bluesky");
//!     registry.register(&creator.identity(), claim, Amount::ZERO).await?;
//!
//!     let report = registry.verification_report(&"sha256:ab12".into()).await?;
//!     println!("{}", report);
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `signet::core` - Records, calls, planners and crypto
//! - `signet::store` - Storage abstraction and SQLite

pub mod clock;
pub mod config;
pub mod error;
pub mod registry;
pub mod report;
pub mod treasury;

// Re-export component crates
pub use signet_core as core;
pub use signet_store as store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{BatchPolicy, GenesisConfig, RegistryConfig};
pub use error::{Result, SignetError};
pub use registry::Registry;
pub use report::{ReportDetails, VerificationReport};
pub use treasury::{LedgerTreasury, TransferReceipt, Treasury, TreasuryError};

// Re-export commonly used core types
pub use signet_core::{
    AccessConfig, Amount, Call, ContentId, ContentRecord, CreationType, Identity, Keypair,
    Notification, Registration, RegistryError, SignedCall, VerificationStatus,
};
