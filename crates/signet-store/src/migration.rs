//! SQLite schema versions.
//!
//! `schema_migrations` records every applied version; opening a database
//! applies whatever versions are missing, in one transaction.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

pub const CURRENT_VERSION: u32 = 1;

/// Bring `conn` up to [`CURRENT_VERSION`]. Safe to call on every open.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "schema version {} was written by a newer build (this build knows {})",
            current, CURRENT_VERSION
        )));
    }

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
        }

        tx.commit()?;
        tracing::debug!(from = current, to = CURRENT_VERSION, "schema migrated");
    }

    Ok(())
}

fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "no migration for version {}",
            version
        ))),
    }
}

/// Records, vouches, the creator index, configuration and call nonces.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- One row per registered content id; rowid gives registration order
        CREATE TABLE content_records (
            content_id TEXT PRIMARY KEY,
            creator BLOB NOT NULL,            -- 32 bytes, Ed25519 public key
            content_locator TEXT NOT NULL,
            registered_at INTEGER NOT NULL,   -- Unix ms, never 0 for stored rows
            creation_type INTEGER NOT NULL,   -- CreationType as u8
            status INTEGER NOT NULL,          -- VerificationStatus as u8
            context TEXT NOT NULL,
            vouch_count INTEGER NOT NULL,
            platform_source TEXT NOT NULL
        );

        -- Vouch set; rowid gives vouch order
        CREATE TABLE vouches (
            content_id TEXT NOT NULL,
            voucher BLOB NOT NULL,
            PRIMARY KEY (content_id, voucher)
        );

        -- Append-only per-creator content list
        CREATE TABLE creator_index (
            creator BLOB NOT NULL,
            position INTEGER NOT NULL,
            content_id TEXT NOT NULL,
            PRIMARY KEY (creator, position)
        );

        -- Configuration singleton
        CREATE TABLE access_config (
            id INTEGER PRIMARY KEY CHECK (id = 0),
            admin BLOB NOT NULL,
            fee_collector BLOB NOT NULL,
            registration_fee BLOB NOT NULL,   -- 16 bytes, big-endian u128
            vouch_threshold INTEGER NOT NULL
        );

        -- Highest accepted signed-call nonce per caller
        CREATE TABLE call_nonces (
            caller BLOB PRIMARY KEY,
            nonce INTEGER NOT NULL
        );
        "#,
    )?;

    Ok(())
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}
