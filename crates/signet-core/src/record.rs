//! Content records: the creator's claim and its verification level.

use serde::{Deserialize, Serialize};

use crate::crypto::Identity;
use crate::types::{ContentId, Timestamp};

/// How the creator says the content was produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum CreationType {
    #[default]
    Undeclared = 0,
    HumanCreated = 1,
    AiAssisted = 2,
    AiGenerated = 3,
}

impl CreationType {
    /// Convert to the wire code.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Try to parse from the wire code.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Undeclared),
            1 => Some(Self::HumanCreated),
            2 => Some(Self::AiAssisted),
            3 => Some(Self::AiGenerated),
            _ => None,
        }
    }

    /// Whether this is a claim of human authorship.
    pub fn is_human(self) -> bool {
        self == Self::HumanCreated
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Undeclared => "Undeclared",
            Self::HumanCreated => "Human-created",
            Self::AiAssisted => "AI-assisted",
            Self::AiGenerated => "AI-generated",
        }
    }
}

/// Aggregate trust level of a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum VerificationStatus {
    #[default]
    Unverified = 0,
    SelfAttested = 1,
    CommunityVouched = 2,
}

impl VerificationStatus {
    /// Convert to the wire code.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Try to parse from the wire code.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Unverified),
            1 => Some(Self::SelfAttested),
            2 => Some(Self::CommunityVouched),
            _ => None,
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Unverified => "Unverified",
            Self::SelfAttested => "Self-attested",
            Self::CommunityVouched => "Community vouched",
        }
    }
}

/// A registered authorship claim.
///
/// `Default` is the zero record returned by queries for unknown ids; it is
/// distinguished from a real record only by `registered_at == 0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Who registered the content. Never changes.
    pub creator: Identity,
    pub content_id: ContentId,
    /// Where the content lives (e.g. a social post URL).
    pub content_locator: String,
    /// Registration time; zero means the record does not exist.
    pub registered_at: Timestamp,
    pub creation_type: CreationType,
    pub status: VerificationStatus,
    /// Free-text provenance note supplied at registration.
    pub context: String,
    pub vouch_count: u64,
    pub platform_source: String,
}

impl ContentRecord {
    /// Whether this record was actually registered.
    pub fn exists(&self) -> bool {
        self.registered_at != 0
    }

    /// Whether the creator claims human authorship.
    pub fn is_human_claim(&self) -> bool {
        self.creation_type.is_human()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_does_not_exist() {
        let record = ContentRecord::default();
        assert!(!record.exists());
        assert_eq!(record.status, VerificationStatus::Unverified);
        assert_eq!(record.creation_type, CreationType::Undeclared);
        assert_eq!(record.vouch_count, 0);
    }

    #[test]
    fn test_creation_type_codes() {
        for code in 0..=3u8 {
            let kind = CreationType::from_u8(code).unwrap();
            assert_eq!(kind.to_u8(), code);
        }
        assert_eq!(CreationType::from_u8(4), None);
    }

    #[test]
    fn test_status_codes() {
        for code in 0..=2u8 {
            let status = VerificationStatus::from_u8(code).unwrap();
            assert_eq!(status.to_u8(), code);
        }
        assert_eq!(VerificationStatus::from_u8(3), None);
    }

    #[test]
    fn test_only_human_created_is_human() {
        assert!(CreationType::HumanCreated.is_human());
        assert!(!CreationType::AiAssisted.is_human());
        assert!(!CreationType::AiGenerated.is_human());
        assert!(!CreationType::Undeclared.is_human());
    }

    #[test]
    fn test_status_serde_names() {
        let json = serde_json::to_string(&VerificationStatus::CommunityVouched).unwrap();
        assert_eq!(json, "\"community_vouched\"");
    }
}
