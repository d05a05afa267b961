//! Fee custody.
//!
//! The registry never holds fees. A paid registration forwards the whole
//! payment to the fee collector through a [`Treasury`] before the record is
//! committed. If the commit fails the transfer is reversed, otherwise it is
//! settled and can no longer be reversed.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use signet_core::{Amount, FeeTransfer, Identity};
use thiserror::Error;

/// Errors from fee transfers.
#[derive(Debug, Error)]
pub enum TreasuryError {
    /// The transfer was refused. No value moved.
    #[error("transfer rejected: {0}")]
    Rejected(String),

    /// Reversal of a transfer this treasury does not know.
    #[error("unknown transfer: {0}")]
    UnknownTransfer(u64),

    /// The treasury could not be reached or its state is unusable.
    #[error("treasury unavailable: {0}")]
    Unavailable(String),
}

/// Proof of a completed transfer, needed to reverse it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub id: u64,
    pub transfer: FeeTransfer,
}

/// Moves registration fees to the fee collector.
///
/// Implementations must not call back into the registry.
#[async_trait]
pub trait Treasury: Send + Sync {
    /// Deliver `transfer.amount` to `transfer.to`.
    async fn forward(&self, transfer: &FeeTransfer) -> Result<TransferReceipt, TreasuryError>;

    /// Undo a forwarded transfer.
    async fn reverse(&self, receipt: &TransferReceipt) -> Result<(), TreasuryError>;

    /// The registry committed the operation that paid `receipt`; it will
    /// never be reversed.
    async fn settle(&self, _receipt: &TransferReceipt) -> Result<(), TreasuryError> {
        Ok(())
    }
}

/// In-process ledger crediting collector balances.
#[derive(Debug, Default)]
pub struct LedgerTreasury {
    inner: Mutex<Ledger>,
}

#[derive(Debug, Default)]
struct Ledger {
    next_id: u64,
    balances: HashMap<Identity, Amount>,
    open: HashMap<u64, FeeTransfer>,
}

impl LedgerTreasury {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total received by an identity.
    pub fn balance(&self, who: &Identity) -> Amount {
        self.inner
            .lock()
            .map(|ledger| ledger.balances.get(who).copied().unwrap_or_default())
            .unwrap_or_default()
    }

    /// Transfers forwarded but neither settled nor reversed.
    pub fn open_transfers(&self) -> usize {
        self.inner.lock().map(|ledger| ledger.open.len()).unwrap_or_default()
    }

    /// Sum of all balances.
    pub fn total(&self) -> Amount {
        self.inner
            .lock()
            .map(|ledger| {
                ledger
                    .balances
                    .values()
                    .fold(Amount::ZERO, |acc, v| acc.saturating_add(*v))
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl Treasury for LedgerTreasury {
    async fn forward(&self, transfer: &FeeTransfer) -> Result<TransferReceipt, TreasuryError> {
        let mut ledger = self
            .inner
            .lock()
            .map_err(|e| TreasuryError::Unavailable(e.to_string()))?;

        let balance = ledger.balances.entry(transfer.to).or_default();
        let credited = balance
            .value()
            .checked_add(transfer.amount.value())
            .ok_or_else(|| TreasuryError::Rejected("collector balance overflow".into()))?;
        *balance = Amount::new(credited);

        ledger.next_id += 1;
        let id = ledger.next_id;
        ledger.open.insert(id, *transfer);

        Ok(TransferReceipt {
            id,
            transfer: *transfer,
        })
    }

    async fn reverse(&self, receipt: &TransferReceipt) -> Result<(), TreasuryError> {
        let mut ledger = self
            .inner
            .lock()
            .map_err(|e| TreasuryError::Unavailable(e.to_string()))?;

        let transfer = ledger
            .open
            .remove(&receipt.id)
            .ok_or(TreasuryError::UnknownTransfer(receipt.id))?;

        let balance = ledger.balances.entry(transfer.to).or_default();
        *balance = balance.checked_sub(transfer.amount).unwrap_or_default();
        Ok(())
    }

    async fn settle(&self, receipt: &TransferReceipt) -> Result<(), TreasuryError> {
        let mut ledger = self
            .inner
            .lock()
            .map_err(|e| TreasuryError::Unavailable(e.to_string()))?;

        ledger
            .open
            .remove(&receipt.id)
            .map(|_| ())
            .ok_or(TreasuryError::UnknownTransfer(receipt.id))
    }
}
