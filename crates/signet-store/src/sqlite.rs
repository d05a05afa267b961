//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend for the Signet registry. It uses
//! rusqlite with bundled SQLite, wrapped in async via tokio::spawn_blocking.
//! Each commit runs inside one SQLite transaction.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

use signet_core::{
    AccessConfig, Amount, ContentId, ContentRecord, CreationType, Identity, VerificationStatus,
    Write,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::Store;

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file (and missing parent directories) and runs migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation on the connection off the async runtime.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Poisoned(e.to_string()))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Row conversion
// ─────────────────────────────────────────────────────────────────────────────

const RECORD_COLUMNS: &str = "creator, content_id, content_locator, registered_at, creation_type,
     status, context, vouch_count, platform_source";

fn invalid_column(idx: usize, name: &str, ty: Type) -> rusqlite::Error {
    rusqlite::Error::InvalidColumnType(idx, name.into(), ty)
}

fn identity_at(row: &rusqlite::Row<'_>, idx: usize, name: &str) -> rusqlite::Result<Identity> {
    let bytes: Vec<u8> = row.get(idx)?;
    let bytes: [u8; 32] = bytes
        .try_into()
        .map_err(|_| invalid_column(idx, name, Type::Blob))?;
    Ok(Identity::from_bytes(bytes))
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<ContentRecord> {
    let creation_type = CreationType::from_u8(row.get(4)?)
        .ok_or_else(|| invalid_column(4, "creation_type", Type::Integer))?;
    let status = VerificationStatus::from_u8(row.get(5)?)
        .ok_or_else(|| invalid_column(5, "status", Type::Integer))?;

    Ok(ContentRecord {
        creator: identity_at(row, 0, "creator")?,
        content_id: ContentId::new(row.get::<_, String>(1)?),
        content_locator: row.get(2)?,
        registered_at: row.get(3)?,
        creation_type,
        status,
        context: row.get(6)?,
        vouch_count: row.get::<_, i64>(7)? as u64,
        platform_source: row.get(8)?,
    })
}

fn row_to_config(row: &rusqlite::Row<'_>) -> rusqlite::Result<AccessConfig> {
    let fee: Vec<u8> = row.get(2)?;
    let fee: [u8; 16] = fee
        .try_into()
        .map_err(|_| invalid_column(2, "registration_fee", Type::Blob))?;

    Ok(AccessConfig {
        admin: identity_at(row, 0, "admin")?,
        fee_collector: identity_at(row, 1, "fee_collector")?,
        registration_fee: Amount::from_be_bytes(fee),
        vouch_threshold: row.get::<_, i64>(3)? as u64,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Writes
// ─────────────────────────────────────────────────────────────────────────────

fn record_exists(conn: &Connection, content_id: &ContentId) -> Result<bool> {
    Ok(conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM content_records WHERE content_id = ?1)",
        params![content_id.as_str()],
        |row| row.get(0),
    )?)
}

fn apply_write(conn: &Connection, write: &Write) -> Result<()> {
    match write {
        Write::InsertRecord(record) => {
            if record_exists(conn, &record.content_id)? {
                return Err(StoreError::Conflict(format!(
                    "record already exists: {}",
                    record.content_id
                )));
            }
            conn.execute(
                "INSERT INTO content_records (
                    creator, content_id, content_locator, registered_at, creation_type,
                    status, context, vouch_count, platform_source
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    record.creator.as_bytes().as_slice(),
                    record.content_id.as_str(),
                    record.content_locator,
                    record.registered_at,
                    record.creation_type.to_u8(),
                    record.status.to_u8(),
                    record.context,
                    record.vouch_count as i64,
                    record.platform_source,
                ],
            )?;
        }
        Write::UpdateRecord(record) => {
            let changed = conn.execute(
                "UPDATE content_records SET
                    creator = ?1, content_locator = ?3, registered_at = ?4, creation_type = ?5,
                    status = ?6, context = ?7, vouch_count = ?8, platform_source = ?9
                 WHERE content_id = ?2",
                params![
                    record.creator.as_bytes().as_slice(),
                    record.content_id.as_str(),
                    record.content_locator,
                    record.registered_at,
                    record.creation_type.to_u8(),
                    record.status.to_u8(),
                    record.context,
                    record.vouch_count as i64,
                    record.platform_source,
                ],
            )?;
            if changed == 0 {
                return Err(StoreError::Conflict(format!(
                    "cannot update missing record: {}",
                    record.content_id
                )));
            }
        }
        Write::InsertVouch {
            content_id,
            voucher,
        } => {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM vouches WHERE content_id = ?1 AND voucher = ?2)",
                params![content_id.as_str(), voucher.as_bytes().as_slice()],
                |row| row.get(0),
            )?;
            if exists {
                return Err(StoreError::Conflict(format!(
                    "{} already vouched for {}",
                    voucher, content_id
                )));
            }
            conn.execute(
                "INSERT INTO vouches (content_id, voucher) VALUES (?1, ?2)",
                params![content_id.as_str(), voucher.as_bytes().as_slice()],
            )?;
        }
        Write::AppendCreatorIndex {
            creator,
            content_id,
        } => {
            conn.execute(
                "INSERT INTO creator_index (creator, position, content_id)
                 SELECT ?1, COALESCE(MAX(position) + 1, 0), ?2
                 FROM creator_index WHERE creator = ?1",
                params![creator.as_bytes().as_slice(), content_id.as_str()],
            )?;
        }
        Write::PutConfig(config) => {
            conn.execute(
                "INSERT OR REPLACE INTO access_config
                    (id, admin, fee_collector, registration_fee, vouch_threshold)
                 VALUES (0, ?1, ?2, ?3, ?4)",
                params![
                    config.admin.as_bytes().as_slice(),
                    config.fee_collector.as_bytes().as_slice(),
                    config.registration_fee.to_be_bytes().as_slice(),
                    config.vouch_threshold as i64,
                ],
            )?;
        }
        Write::AdvanceNonce { caller, nonce } => {
            let last = read_nonce(conn, caller)?;
            if last.is_some_and(|last| *nonce <= last) {
                return Err(StoreError::Conflict(format!(
                    "nonce {} does not advance caller {}",
                    nonce, caller
                )));
            }
            conn.execute(
                "INSERT OR REPLACE INTO call_nonces (caller, nonce) VALUES (?1, ?2)",
                params![caller.as_bytes().as_slice(), *nonce as i64],
            )?;
        }
    }

    Ok(())
}

fn read_nonce(conn: &Connection, caller: &Identity) -> Result<Option<u64>> {
    let nonce: Option<i64> = conn
        .query_row(
            "SELECT nonce FROM call_nonces WHERE caller = ?1",
            params![caller.as_bytes().as_slice()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(nonce.map(|n| n as u64))
}

#[async_trait]
impl Store for SqliteStore {
    async fn get_record(&self, content_id: &ContentId) -> Result<Option<ContentRecord>> {
        let content_id = content_id.clone();
        self.run(move |conn| {
            conn.query_row(
                &format!(
                    "SELECT {} FROM content_records WHERE content_id = ?1",
                    RECORD_COLUMNS
                ),
                params![content_id.as_str()],
                row_to_record,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn list_records(&self) -> Result<Vec<ContentRecord>> {
        self.run(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM content_records ORDER BY rowid",
                RECORD_COLUMNS
            ))?;
            let records = stmt
                .query_map([], row_to_record)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        })
        .await
    }

    async fn creator_content(&self, creator: &Identity) -> Result<Vec<ContentId>> {
        let creator = *creator;
        self.run(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT content_id FROM creator_index WHERE creator = ?1 ORDER BY position",
            )?;
            let ids = stmt
                .query_map(params![creator.as_bytes().as_slice()], |row| {
                    row.get::<_, String>(0).map(ContentId::new)
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(ids)
        })
        .await
    }

    async fn has_vouched(&self, content_id: &ContentId, voucher: &Identity) -> Result<bool> {
        let content_id = content_id.clone();
        let voucher = *voucher;
        self.run(move |conn| {
            Ok(conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM vouches WHERE content_id = ?1 AND voucher = ?2)",
                params![content_id.as_str(), voucher.as_bytes().as_slice()],
                |row| row.get(0),
            )?)
        })
        .await
    }

    async fn vouchers(&self, content_id: &ContentId) -> Result<Vec<Identity>> {
        let content_id = content_id.clone();
        self.run(move |conn| {
            let mut stmt =
                conn.prepare("SELECT voucher FROM vouches WHERE content_id = ?1 ORDER BY rowid")?;
            let vouchers = stmt
                .query_map(params![content_id.as_str()], |row| {
                    identity_at(row, 0, "voucher")
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(vouchers)
        })
        .await
    }

    async fn count_vouches(&self, content_id: &ContentId) -> Result<u64> {
        let content_id = content_id.clone();
        self.run(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM vouches WHERE content_id = ?1",
                params![content_id.as_str()],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
        .await
    }

    async fn get_config(&self) -> Result<Option<AccessConfig>> {
        self.run(|conn| {
            conn.query_row(
                "SELECT admin, fee_collector, registration_fee, vouch_threshold
                 FROM access_config WHERE id = 0",
                [],
                row_to_config,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn last_nonce(&self, caller: &Identity) -> Result<Option<u64>> {
        let caller = *caller;
        self.run(move |conn| read_nonce(conn, &caller)).await
    }

    async fn commit(&self, writes: &[Write]) -> Result<()> {
        let writes = writes.to_vec();
        self.run(move |conn| {
            // Dropping the transaction on an early return rolls it back.
            let tx = conn.transaction()?;
            for write in &writes {
                apply_write(&tx, write)?;
            }
            tx.commit()?;
            tracing::debug!(writes = writes.len(), "sqlite store commit");
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signet_core::Keypair;

    fn record(creator: Identity, id: &str) -> ContentRecord {
        ContentRecord {
            creator,
            content_id: ContentId::new(id),
            content_locator: format!("ipfs://{}", id),
            registered_at: 1_700_000_000_000,
            creation_type: CreationType::HumanCreated,
            status: VerificationStatus::SelfAttested,
            context: "ink on paper".into(),
            vouch_count: 0,
            platform_source: "instagram".into(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_record() {
        let store = SqliteStore::open_memory().unwrap();
        let creator = Keypair::generate().identity();
        let r = record(creator, "h1");

        store.commit(&[Write::InsertRecord(r.clone())]).await.unwrap();

        let loaded = store.get_record(&r.content_id).await.unwrap().unwrap();
        assert_eq!(loaded, r);
        assert!(store.get_record(&ContentId::new("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_record() {
        let store = SqliteStore::open_memory().unwrap();
        let creator = Keypair::generate().identity();
        let mut r = record(creator, "h1");
        store.commit(&[Write::InsertRecord(r.clone())]).await.unwrap();

        r.vouch_count = 3;
        r.status = VerificationStatus::CommunityVouched;
        store.commit(&[Write::UpdateRecord(r.clone())]).await.unwrap();

        assert_eq!(store.get_record(&r.content_id).await.unwrap(), Some(r));
    }

    #[tokio::test]
    async fn test_failed_commit_rolls_back() {
        let store = SqliteStore::open_memory().unwrap();
        let creator = Keypair::generate().identity();
        let voucher = Keypair::generate().identity();
        let r = record(creator, "h1");
        store.commit(&[Write::InsertRecord(r.clone())]).await.unwrap();

        // The vouch lands first, then the duplicate insert aborts the changeset.
        let result = store
            .commit(&[
                Write::InsertVouch {
                    content_id: r.content_id.clone(),
                    voucher,
                },
                Write::InsertRecord(r.clone()),
            ])
            .await;

        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert!(!store.has_vouched(&r.content_id, &voucher).await.unwrap());
        assert_eq!(store.count_vouches(&r.content_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_vouch_order_and_duplicates() {
        let store = SqliteStore::open_memory().unwrap();
        let creator = Keypair::generate().identity();
        let r = record(creator, "h1");
        store.commit(&[Write::InsertRecord(r.clone())]).await.unwrap();

        let vouchers: Vec<_> = (0..3).map(|_| Keypair::generate().identity()).collect();
        for v in &vouchers {
            store
                .commit(&[Write::InsertVouch {
                    content_id: r.content_id.clone(),
                    voucher: *v,
                }])
                .await
                .unwrap();
        }

        assert_eq!(store.vouchers(&r.content_id).await.unwrap(), vouchers);
        let dup = store
            .commit(&[Write::InsertVouch {
                content_id: r.content_id.clone(),
                voucher: vouchers[0],
            }])
            .await;
        assert!(matches!(dup, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_creator_index_is_ordered_per_creator() {
        let store = SqliteStore::open_memory().unwrap();
        let alice = Keypair::generate().identity();
        let bob = Keypair::generate().identity();

        for (creator, id) in [(alice, "a1"), (bob, "b1"), (alice, "a2"), (alice, "a3")] {
            store
                .commit(&[Write::AppendCreatorIndex {
                    creator,
                    content_id: ContentId::new(id),
                }])
                .await
                .unwrap();
        }

        let ids: Vec<_> = store
            .creator_content(&alice)
            .await
            .unwrap()
            .into_iter()
            .map(ContentId::into_string)
            .collect();
        assert_eq!(ids, vec!["a1", "a2", "a3"]);
        assert_eq!(store.creator_content(&bob).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_config_round_trips_large_fee() {
        let store = SqliteStore::open_memory().unwrap();
        let admin = Keypair::generate().identity();
        let config = AccessConfig {
            registration_fee: Amount::new(u128::MAX - 7),
            vouch_threshold: 12,
            ..AccessConfig::genesis(admin)
        };

        store.commit(&[Write::PutConfig(config.clone())]).await.unwrap();
        assert_eq!(store.get_config().await.unwrap(), Some(config));
    }

    #[tokio::test]
    async fn test_nonce_must_advance() {
        let store = SqliteStore::open_memory().unwrap();
        let caller = Keypair::generate().identity();
        assert_eq!(store.last_nonce(&caller).await.unwrap(), None);

        store
            .commit(&[Write::AdvanceNonce { caller, nonce: 1 }])
            .await
            .unwrap();
        assert!(store
            .commit(&[Write::AdvanceNonce { caller, nonce: 1 }])
            .await
            .is_err());
        assert_eq!(store.last_nonce(&caller).await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_persistence_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("signet.db");
        let creator = Keypair::generate().identity();
        let r = record(creator, "h1");

        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .commit(&[
                    Write::InsertRecord(r.clone()),
                    Write::AppendCreatorIndex {
                        creator,
                        content_id: r.content_id.clone(),
                    },
                ])
                .await
                .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get_record(&r.content_id).await.unwrap(), Some(r.clone()));
        assert_eq!(store.list_records().await.unwrap(), vec![r]);
    }
}
