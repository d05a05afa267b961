//! ContentRegistry: creating records and changing their classification.
//!
//! A record is created once per content id and is self-attested from the
//! start. Afterwards only its creator may reclassify it; moving a record
//! away from a human claim drops any community promotion back to
//! self-attested, but keeps the vouches already counted.

use serde::{Deserialize, Serialize};

use crate::access::AccessConfig;
use crate::crypto::Identity;
use crate::error::Result;
use crate::event::Notification;
use crate::guard::{ensure_absent, ensure_content_id, ensure_exists, ensure_fee, ensure_owner};
use crate::record::{ContentRecord, CreationType, VerificationStatus};
use crate::transition::{FeeTransfer, Transition, Write};
use crate::types::{Amount, ContentId, Timestamp};

/// What a creator submits when registering content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub content_id: ContentId,
    pub content_locator: String,
    pub creation_type: CreationType,
    #[serde(default)]
    pub platform_source: String,
    #[serde(default)]
    pub context: String,
}

impl Registration {
    /// A registration with empty platform and context.
    pub fn new(
        content_id: impl Into<ContentId>,
        content_locator: impl Into<String>,
        creation_type: CreationType,
    ) -> Self {
        Self {
            content_id: content_id.into(),
            content_locator: content_locator.into(),
            creation_type,
            platform_source: String::new(),
            context: String::new(),
        }
    }

    pub fn platform_source(mut self, platform: impl Into<String>) -> Self {
        self.platform_source = platform.into();
        self
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }
}

/// How registration is paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeGate {
    /// Fee-gated path: `paid` must cover the configured fee and is forwarded.
    Paid(Amount),
    /// Batch path: no fee is checked or moved.
    Waived,
}

/// Plan a registration.
///
/// Checks, in order: non-empty id, fee (when gated), absence of a record.
pub fn plan_register(
    config: &AccessConfig,
    existing: &ContentRecord,
    caller: &Identity,
    registration: Registration,
    gate: FeeGate,
    now: Timestamp,
) -> Result<Transition> {
    ensure_content_id(&registration.content_id)?;
    if let FeeGate::Paid(paid) = gate {
        ensure_fee(config, paid)?;
    }
    ensure_absent(existing, &registration.content_id)?;

    let content_id = registration.content_id;
    let record = ContentRecord {
        creator: *caller,
        content_id: content_id.clone(),
        content_locator: registration.content_locator,
        registered_at: now,
        creation_type: registration.creation_type,
        status: VerificationStatus::SelfAttested,
        context: registration.context,
        vouch_count: 0,
        platform_source: registration.platform_source,
    };

    let mut transition = Transition::new()
        .write(Write::InsertRecord(record))
        .write(Write::AppendCreatorIndex {
            creator: *caller,
            content_id: content_id.clone(),
        })
        .notify(Notification::ContentRegistered {
            content_id: content_id.clone(),
            creator: *caller,
            creation_type: registration.creation_type,
            registered_at: now,
        })
        .notify(Notification::StatusChanged {
            content_id,
            status: VerificationStatus::SelfAttested,
        });

    if let FeeGate::Paid(paid) = gate {
        if !paid.is_zero() {
            transition = transition.with_fee(FeeTransfer {
                from: *caller,
                to: config.fee_collector,
                amount: paid,
            });
        }
    }

    Ok(transition)
}

/// Plan a creator reclassifying their content.
pub fn plan_update_creation_type(
    record: &ContentRecord,
    content_id: &ContentId,
    caller: &Identity,
    creation_type: CreationType,
) -> Result<Transition> {
    ensure_exists(record, content_id)?;
    ensure_owner(record, caller)?;

    let mut next = record.clone();
    next.creation_type = creation_type;

    let reset = !creation_type.is_human() && record.status != VerificationStatus::Unverified;
    if reset {
        next.status = VerificationStatus::SelfAttested;
    }

    let mut transition = Transition::new().write(Write::UpdateRecord(next));
    if reset {
        transition = transition.notify(Notification::StatusChanged {
            content_id: content_id.clone(),
            status: VerificationStatus::SelfAttested,
        });
    }

    Ok(transition.notify(Notification::CreationTypeChanged {
        content_id: content_id.clone(),
        creation_type,
    }))
}
