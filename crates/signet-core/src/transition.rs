//! Planned state changes.
//!
//! Operations never mutate state directly. A planner inspects a snapshot,
//! checks every precondition, and returns a [`Transition`]: the writes to
//! apply, the notifications to publish once they are applied, and an
//! optional fee to forward. The runtime commits a transition atomically or
//! not at all.

use crate::access::AccessConfig;
use crate::crypto::Identity;
use crate::event::Notification;
use crate::record::ContentRecord;
use crate::types::{Amount, ContentId};

/// A single write against the registry stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    /// Create a record. Must not overwrite an existing one.
    InsertRecord(ContentRecord),
    /// Replace an existing record.
    UpdateRecord(ContentRecord),
    /// Mark `(content_id, voucher)` as vouched. Must not already be set.
    InsertVouch {
        content_id: ContentId,
        voucher: Identity,
    },
    /// Append to the creator's ordered content list.
    AppendCreatorIndex {
        creator: Identity,
        content_id: ContentId,
    },
    /// Replace the access configuration singleton.
    PutConfig(AccessConfig),
    /// Record the highest accepted signed-call nonce for a caller.
    AdvanceNonce { caller: Identity, nonce: u64 },
}

/// A registration fee to forward to the fee collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeTransfer {
    pub from: Identity,
    pub to: Identity,
    pub amount: Amount,
}

/// The full effect of one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    writes: Vec<Write>,
    notifications: Vec<Notification>,
    fee: Option<FeeTransfer>,
}

impl Transition {
    /// Create an empty transition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a write.
    pub fn write(mut self, write: Write) -> Self {
        self.writes.push(write);
        self
    }

    /// Append a notification.
    pub fn notify(mut self, notification: Notification) -> Self {
        self.notifications.push(notification);
        self
    }

    /// Attach a fee transfer.
    pub fn with_fee(mut self, fee: FeeTransfer) -> Self {
        self.fee = Some(fee);
        self
    }

    /// Append a write in place.
    pub fn push_write(&mut self, write: Write) {
        self.writes.push(write);
    }

    pub fn writes(&self) -> &[Write] {
        &self.writes
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn fee(&self) -> Option<&FeeTransfer> {
        self.fee.as_ref()
    }

    /// The record this transition creates or updates, if any.
    pub fn record(&self) -> Option<&ContentRecord> {
        self.writes.iter().find_map(|w| match w {
            Write::InsertRecord(r) | Write::UpdateRecord(r) => Some(r),
            _ => None,
        })
    }

    /// The configuration this transition installs, if any.
    pub fn config(&self) -> Option<&AccessConfig> {
        self.writes.iter().find_map(|w| match w {
            Write::PutConfig(c) => Some(c),
            _ => None,
        })
    }

    /// Split into parts for committing.
    pub fn into_parts(self) -> (Vec<Write>, Vec<Notification>, Option<FeeTransfer>) {
        (self.writes, self.notifications, self.fee)
    }
}
