//! Human-readable verification reports.

use std::fmt;

use serde::Serialize;
use signet_core::{ContentId, ContentRecord, Timestamp};

/// Summary of a content id's provenance, as shown to someone checking it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub exists: bool,
    pub content_id: ContentId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ReportDetails>,
}

/// Fields present only for registered content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportDetails {
    /// Creator identity, hex.
    pub creator: String,
    pub registered_at: Timestamp,
    pub creation_type: &'static str,
    pub status: &'static str,
    pub context: String,
    pub vouches: u64,
    pub uri: String,
    pub platform_source: String,
    /// Whether the record is human-created and community vouched.
    pub human_verified: bool,
}

impl VerificationReport {
    pub fn from_record(content_id: &ContentId, record: &ContentRecord) -> Self {
        let details = record.exists().then(|| ReportDetails {
            creator: record.creator.to_hex(),
            registered_at: record.registered_at,
            creation_type: record.creation_type.label(),
            status: record.status.label(),
            context: record.context.clone(),
            vouches: record.vouch_count,
            uri: record.content_locator.clone(),
            platform_source: record.platform_source.clone(),
            human_verified: record.is_human_claim()
                && record.status == signet_core::VerificationStatus::CommunityVouched,
        });

        Self {
            exists: details.is_some(),
            content_id: content_id.clone(),
            details,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(d) = &self.details else {
            return writeln!(f, "No verification found for {}", self.content_id);
        };

        writeln!(f, "Signet - Human Content Verification")?;
        writeln!(f, "Content:            {}", self.content_id)?;
        writeln!(f, "Creator:            {}", d.creator)?;
        writeln!(f, "Verified As:        {}", d.creation_type)?;
        writeln!(f, "Verification Level: {}", d.status)?;
        writeln!(f, "Vouches:            {}", d.vouches)?;
        writeln!(f, "Registered At:      {}", d.registered_at)?;
        if !d.platform_source.is_empty() {
            writeln!(f, "Platform:           {}", d.platform_source)?;
        }
        if !d.context.is_empty() {
            writeln!(f, "Context:            {}", d.context)?;
        }
        writeln!(f, "Original Content:   {}", d.uri)
    }
}
