//! Fault injection for the atomicity paths.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use signet::{LedgerTreasury, TransferReceipt, Treasury, TreasuryError};
use signet_core::{AccessConfig, ContentId, ContentRecord, FeeTransfer, Identity, Write};
use signet_store::{Result, Store, StoreError};

/// A treasury that refuses every transfer.
#[derive(Debug, Default)]
pub struct RejectingTreasury {
    attempts: AtomicUsize,
}

impl RejectingTreasury {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Treasury for RejectingTreasury {
    async fn forward(&self, _transfer: &FeeTransfer) -> std::result::Result<TransferReceipt, TreasuryError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(TreasuryError::Rejected("collector unreachable".into()))
    }

    async fn reverse(&self, receipt: &TransferReceipt) -> std::result::Result<(), TreasuryError> {
        Err(TreasuryError::UnknownTransfer(receipt.id))
    }
}

/// A ledger treasury that counts reversals.
#[derive(Debug, Default)]
pub struct AuditedTreasury {
    pub ledger: LedgerTreasury,
    reversals: AtomicUsize,
}

impl AuditedTreasury {
    pub fn reversals(&self) -> usize {
        self.reversals.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Treasury for AuditedTreasury {
    async fn forward(&self, transfer: &FeeTransfer) -> std::result::Result<TransferReceipt, TreasuryError> {
        self.ledger.forward(transfer).await
    }

    async fn reverse(&self, receipt: &TransferReceipt) -> std::result::Result<(), TreasuryError> {
        self.reversals.fetch_add(1, Ordering::SeqCst);
        self.ledger.reverse(receipt).await
    }

    async fn settle(&self, receipt: &TransferReceipt) -> std::result::Result<(), TreasuryError> {
        self.ledger.settle(receipt).await
    }
}

/// Wraps a store and fails the next commit on demand.
pub struct FlakyStore<S> {
    inner: S,
    fail_next: Arc<AtomicBool>,
}

impl<S: Store> FlakyStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            fail_next: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle that arms the failure from outside the registry.
    pub fn trigger(&self) -> Arc<AtomicBool> {
        self.fail_next.clone()
    }
}

#[async_trait]
impl<S: Store> Store for FlakyStore<S> {
    async fn get_record(&self, content_id: &ContentId) -> Result<Option<ContentRecord>> {
        self.inner.get_record(content_id).await
    }

    async fn list_records(&self) -> Result<Vec<ContentRecord>> {
        self.inner.list_records().await
    }

    async fn creator_content(&self, creator: &Identity) -> Result<Vec<ContentId>> {
        self.inner.creator_content(creator).await
    }

    async fn has_vouched(&self, content_id: &ContentId, voucher: &Identity) -> Result<bool> {
        self.inner.has_vouched(content_id, voucher).await
    }

    async fn vouchers(&self, content_id: &ContentId) -> Result<Vec<Identity>> {
        self.inner.vouchers(content_id).await
    }

    async fn count_vouches(&self, content_id: &ContentId) -> Result<u64> {
        self.inner.count_vouches(content_id).await
    }

    async fn get_config(&self) -> Result<Option<AccessConfig>> {
        self.inner.get_config().await
    }

    async fn last_nonce(&self, caller: &Identity) -> Result<Option<u64>> {
        self.inner.last_nonce(caller).await
    }

    async fn commit(&self, writes: &[Write]) -> Result<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "injected commit failure",
            )));
        }
        self.inner.commit(writes).await
    }
}
