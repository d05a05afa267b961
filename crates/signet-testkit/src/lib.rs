//! # Signet Testkit
//!
//! Testing utilities for the Signet registry.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: A ready registry with deterministic parties, a manual
//!   clock and an inspectable treasury
//! - **Generators**: Proptest strategies for calls and operation sessions
//! - **Model**: A plain reference model of the registry rules
//! - **Invariants**: Whole-store consistency checks
//! - **Faults**: Treasuries and stores that fail on purpose
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use signet_testkit::fixtures::{parties, TestFixture};
//!
//! async fn example() {
//!     let mut fixture = TestFixture::new().await;
//!     let people = parties(4);
//!
//!     fixture.register_human(&people[0], "h1").await;
//!     fixture.vouch_all("h1", &people[1..]).await;
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use signet_testkit::generators::ops;
//!
//! proptest! {
//!     #[test]
//!     fn sessions_keep_invariants(session in ops(40)) {
//!         // replay `session` against a fixture and a `Model`
//!     }
//! }
//! ```

pub mod faults;
pub mod fixtures;
pub mod generators;
pub mod invariants;
pub mod model;

pub use faults::{AuditedTreasury, FlakyStore, RejectingTreasury};
pub use fixtures::{names, parties, party, TestFixture};
pub use generators::{call, op, ops, Op};
pub use invariants::check_store;
pub use model::{Expected, Model};
