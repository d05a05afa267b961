//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use signet_core::{AccessConfig, ContentId, ContentRecord, Identity, Write};

use crate::error::{Result, StoreError};
use crate::traits::Store;

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Records indexed by content id.
    records: HashMap<ContentId, ContentRecord>,

    /// Content ids in registration order.
    order: Vec<ContentId>,

    /// Vouchers per content id, in vouch order.
    vouches: HashMap<ContentId, Vec<Identity>>,

    /// Vouch membership for O(1) lookup.
    vouched: HashSet<(ContentId, Identity)>,

    /// Creator -> content ids, in registration order.
    creator_index: HashMap<Identity, Vec<ContentId>>,

    /// The configuration singleton.
    config: Option<AccessConfig>,

    /// Highest accepted nonce per caller.
    nonces: HashMap<Identity, u64>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStoreInner {
    /// Check a whole changeset against current state plus the writes staged
    /// before it. Nothing is mutated.
    fn validate(&self, writes: &[Write]) -> Result<()> {
        let mut inserted: HashSet<&ContentId> = HashSet::new();
        let mut vouched: HashSet<(&ContentId, &Identity)> = HashSet::new();
        let mut nonces: HashMap<&Identity, u64> = HashMap::new();

        for write in writes {
            match write {
                Write::InsertRecord(record) => {
                    let id = &record.content_id;
                    if self.records.contains_key(id) || !inserted.insert(id) {
                        return Err(StoreError::Conflict(format!(
                            "record already exists: {}",
                            id
                        )));
                    }
                }
                Write::UpdateRecord(record) => {
                    let id = &record.content_id;
                    if !self.records.contains_key(id) && !inserted.contains(id) {
                        return Err(StoreError::Conflict(format!(
                            "cannot update missing record: {}",
                            id
                        )));
                    }
                }
                Write::InsertVouch {
                    content_id,
                    voucher,
                } => {
                    let pair = (content_id.clone(), *voucher);
                    if self.vouched.contains(&pair) || !vouched.insert((content_id, voucher)) {
                        return Err(StoreError::Conflict(format!(
                            "{} already vouched for {}",
                            voucher, content_id
                        )));
                    }
                }
                Write::AdvanceNonce { caller, nonce } => {
                    let last = nonces
                        .get(caller)
                        .copied()
                        .or_else(|| self.nonces.get(caller).copied());
                    if last.is_some_and(|last| *nonce <= last) {
                        return Err(StoreError::Conflict(format!(
                            "nonce {} does not advance caller {}",
                            nonce, caller
                        )));
                    }
                    nonces.insert(caller, *nonce);
                }
                Write::AppendCreatorIndex { .. } | Write::PutConfig(_) => {}
            }
        }

        Ok(())
    }

    /// Apply a validated changeset.
    fn apply(&mut self, writes: &[Write]) {
        for write in writes {
            match write {
                Write::InsertRecord(record) => {
                    self.order.push(record.content_id.clone());
                    self.records
                        .insert(record.content_id.clone(), record.clone());
                }
                Write::UpdateRecord(record) => {
                    self.records
                        .insert(record.content_id.clone(), record.clone());
                }
                Write::InsertVouch {
                    content_id,
                    voucher,
                } => {
                    self.vouched.insert((content_id.clone(), *voucher));
                    self.vouches
                        .entry(content_id.clone())
                        .or_default()
                        .push(*voucher);
                }
                Write::AppendCreatorIndex {
                    creator,
                    content_id,
                } => {
                    self.creator_index
                        .entry(*creator)
                        .or_default()
                        .push(content_id.clone());
                }
                Write::PutConfig(config) => {
                    self.config = Some(config.clone());
                }
                Write::AdvanceNonce { caller, nonce } => {
                    self.nonces.insert(*caller, *nonce);
                }
            }
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_record(&self, content_id: &ContentId) -> Result<Option<ContentRecord>> {
        Ok(self.read()?.records.get(content_id).cloned())
    }

    async fn list_records(&self) -> Result<Vec<ContentRecord>> {
        let inner = self.read()?;
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.records.get(id).cloned())
            .collect())
    }

    async fn creator_content(&self, creator: &Identity) -> Result<Vec<ContentId>> {
        Ok(self
            .read()?
            .creator_index
            .get(creator)
            .cloned()
            .unwrap_or_default())
    }

    async fn has_vouched(&self, content_id: &ContentId, voucher: &Identity) -> Result<bool> {
        Ok(self
            .read()?
            .vouched
            .contains(&(content_id.clone(), *voucher)))
    }

    async fn vouchers(&self, content_id: &ContentId) -> Result<Vec<Identity>> {
        Ok(self
            .read()?
            .vouches
            .get(content_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn count_vouches(&self, content_id: &ContentId) -> Result<u64> {
        Ok(self
            .read()?
            .vouches
            .get(content_id)
            .map_or(0, |v| v.len() as u64))
    }

    async fn get_config(&self) -> Result<Option<AccessConfig>> {
        Ok(self.read()?.config.clone())
    }

    async fn last_nonce(&self, caller: &Identity) -> Result<Option<u64>> {
        Ok(self.read()?.nonces.get(caller).copied())
    }

    async fn commit(&self, writes: &[Write]) -> Result<()> {
        let mut inner = self.write()?;
        inner.validate(writes)?;
        inner.apply(writes);
        tracing::debug!(writes = writes.len(), "memory store commit");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signet_core::{Amount, CreationType, Keypair, VerificationStatus};

    fn record(creator: Identity, id: &str) -> ContentRecord {
        ContentRecord {
            creator,
            content_id: ContentId::new(id),
            content_locator: format!("https://example.com/{}", id),
            registered_at: 1_000,
            creation_type: CreationType::HumanCreated,
            status: VerificationStatus::SelfAttested,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_commit_and_read_back() {
        let store = MemoryStore::new();
        let creator = Keypair::generate().identity();
        let r = record(creator, "h1");

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

        assert_eq!(store.get_record(&r.content_id).await.unwrap(), Some(r.clone()));
        assert_eq!(
            store.creator_content(&creator).await.unwrap(),
            vec![r.content_id.clone()]
        );
        assert!(store.get_record(&ContentId::new("other")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_insert_conflicts_and_applies_nothing() {
        let store = MemoryStore::new();
        let creator = Keypair::generate().identity();
        let r = record(creator, "h1");
        store.commit(&[Write::InsertRecord(r.clone())]).await.unwrap();

        let other = Keypair::generate().identity();
        let result = store
            .commit(&[
                Write::AppendCreatorIndex {
                    creator: other,
                    content_id: r.content_id.clone(),
                },
                Write::InsertRecord(record(other, "h1")),
            ])
            .await;

        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert!(store.creator_content(&other).await.unwrap().is_empty());
        assert_eq!(store.get_record(&r.content_id).await.unwrap().unwrap().creator, creator);
    }

    #[tokio::test]
    async fn test_duplicate_vouch_conflicts() {
        let store = MemoryStore::new();
        let creator = Keypair::generate().identity();
        let voucher = Keypair::generate().identity();
        let r = record(creator, "h1");
        let vouch = Write::InsertVouch {
            content_id: r.content_id.clone(),
            voucher,
        };

        store.commit(&[Write::InsertRecord(r.clone()), vouch.clone()]).await.unwrap();
        assert!(store.has_vouched(&r.content_id, &voucher).await.unwrap());
        assert_eq!(store.count_vouches(&r.content_id).await.unwrap(), 1);

        assert!(matches!(
            store.commit(&[vouch]).await,
            Err(StoreError::Conflict(_))
        ));
        assert_eq!(store.vouchers(&r.content_id).await.unwrap(), vec![voucher]);
    }

    #[tokio::test]
    async fn test_update_missing_record_conflicts() {
        let store = MemoryStore::new();
        let creator = Keypair::generate().identity();
        let result = store.commit(&[Write::UpdateRecord(record(creator, "ghost"))]).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_nonce_must_advance() {
        let store = MemoryStore::new();
        let caller = Keypair::generate().identity();

        store
            .commit(&[Write::AdvanceNonce { caller, nonce: 5 }])
            .await
            .unwrap();
        assert_eq!(store.last_nonce(&caller).await.unwrap(), Some(5));

        assert!(store
            .commit(&[Write::AdvanceNonce { caller, nonce: 5 }])
            .await
            .is_err());
        store
            .commit(&[Write::AdvanceNonce { caller, nonce: 6 }])
            .await
            .unwrap();
        assert_eq!(store.last_nonce(&caller).await.unwrap(), Some(6));
    }

    #[tokio::test]
    async fn test_config_singleton() {
        let store = MemoryStore::new();
        assert!(store.get_config().await.unwrap().is_none());

        let admin = Keypair::generate().identity();
        let mut config = AccessConfig::genesis(admin);
        store.commit(&[Write::PutConfig(config.clone())]).await.unwrap();

        config.registration_fee = Amount::new(42);
        store.commit(&[Write::PutConfig(config.clone())]).await.unwrap();
        assert_eq!(store.get_config().await.unwrap(), Some(config));
    }

    #[tokio::test]
    async fn test_list_records_in_registration_order() {
        let store = MemoryStore::new();
        let creator = Keypair::generate().identity();
        for id in ["c", "a", "b"] {
            store.commit(&[Write::InsertRecord(record(creator, id))]).await.unwrap();
        }

        let ids: Vec<_> = store
            .list_records()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.content_id.into_string())
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }
}
