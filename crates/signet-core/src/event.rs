//! Notifications emitted by committed operations.

use serde::{Deserialize, Serialize};

use crate::crypto::Identity;
use crate::record::{CreationType, VerificationStatus};
use crate::types::{Amount, ContentId, Timestamp};

/// Which configuration field an admin call replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "field", content = "value")]
pub enum ConfigChange {
    FeeCollector(Identity),
    RegistrationFee(Amount),
    VouchThreshold(u64),
    Admin(Identity),
}

/// A notification for external observers.
///
/// Planned alongside the state change and delivered only once the change
/// has been committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum Notification {
    ContentRegistered {
        content_id: ContentId,
        creator: Identity,
        creation_type: CreationType,
        registered_at: Timestamp,
    },
    StatusChanged {
        content_id: ContentId,
        status: VerificationStatus,
    },
    CreationTypeChanged {
        content_id: ContentId,
        creation_type: CreationType,
    },
    VouchRecorded {
        content_id: ContentId,
        voucher: Identity,
        vouch_count: u64,
    },
    ConfigUpdated {
        admin: Identity,
        change: ConfigChange,
    },
}

impl Notification {
    /// The content this notification concerns, if any.
    pub fn content_id(&self) -> Option<&ContentId> {
        match self {
            Self::ContentRegistered { content_id, .. }
            | Self::StatusChanged { content_id, .. }
            | Self::CreationTypeChanged { content_id, .. }
            | Self::VouchRecorded { content_id, .. } => Some(content_id),
            Self::ConfigUpdated { .. } => None,
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ContentRegistered { .. } => "content_registered",
            Self::StatusChanged { .. } => "status_changed",
            Self::CreationTypeChanged { .. } => "creation_type_changed",
            Self::VouchRecorded { .. } => "vouch_recorded",
            Self::ConfigUpdated { .. } => "config_updated",
        }
    }
}
