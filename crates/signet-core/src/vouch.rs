//! VouchLedger: independent corroboration of human-created claims.
//!
//! Each identity may vouch once per content, never for its own content, and
//! only while the content is classified as human-created. The vote that
//! first brings a self-attested record to the threshold promotes it.

use crate::access::AccessConfig;
use crate::crypto::Identity;
use crate::error::Result;
use crate::event::Notification;
use crate::guard::{ensure_exists, ensure_human_claim, ensure_not_creator, ensure_not_vouched};
use crate::record::{ContentRecord, VerificationStatus};
use crate::transition::{Transition, Write};
use crate::types::ContentId;

/// Plan a vouch.
///
/// Checks, in order: record exists, voucher has not vouched, voucher is not
/// the creator, record claims human creation.
pub fn plan_vouch(
    config: &AccessConfig,
    record: &ContentRecord,
    content_id: &ContentId,
    already_vouched: bool,
    voucher: &Identity,
) -> Result<Transition> {
    ensure_exists(record, content_id)?;
    ensure_not_vouched(already_vouched, content_id, voucher)?;
    ensure_not_creator(record, voucher)?;
    ensure_human_claim(record)?;

    let mut next = record.clone();
    next.vouch_count += 1;

    let promote = next.vouch_count >= config.vouch_threshold
        && record.status == VerificationStatus::SelfAttested;
    if promote {
        next.status = VerificationStatus::CommunityVouched;
    }

    let vouch_count = next.vouch_count;
    let mut transition = Transition::new()
        .write(Write::InsertVouch {
            content_id: content_id.clone(),
            voucher: *voucher,
        })
        .write(Write::UpdateRecord(next));

    if promote {
        transition = transition.notify(Notification::StatusChanged {
            content_id: content_id.clone(),
            status: VerificationStatus::CommunityVouched,
        });
    }

    Ok(transition.notify(Notification::VouchRecorded {
        content_id: content_id.clone(),
        voucher: *voucher,
        vouch_count,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;
    use crate::error::RegistryError;
    use crate::record::CreationType;

    fn human_record(creator: Identity) -> ContentRecord {
        ContentRecord {
            creator,
            content_id: ContentId::new("h1"),
            content_locator: "uri".into(),
            registered_at: 1_000,
            creation_type: CreationType::HumanCreated,
            status: VerificationStatus::SelfAttested,
            ..Default::default()
        }
    }

    fn threshold(n: u64) -> AccessConfig {
        AccessConfig {
            vouch_threshold: n,
            ..AccessConfig::default()
        }
    }

    #[test]
    fn test_vouch_increments_and_records() {
        let creator = Keypair::generate().identity();
        let voucher = Keypair::generate().identity();
        let record = human_record(creator);
        let id = record.content_id.clone();

        let t = plan_vouch(&threshold(3), &record, &id, false, &voucher).unwrap();

        assert_eq!(t.record().unwrap().vouch_count, 1);
        assert_eq!(t.record().unwrap().status, VerificationStatus::SelfAttested);
        assert!(t.writes().contains(&Write::InsertVouch {
            content_id: id,
            voucher,
        }));
        let names: Vec<_> = t.notifications().iter().map(|n| n.name()).collect();
        assert_eq!(names, vec!["vouch_recorded"]);
    }

    #[test]
    fn test_promotion_on_reaching_threshold() {
        let creator = Keypair::generate().identity();
        let voucher = Keypair::generate().identity();
        let mut record = human_record(creator);
        record.vouch_count = 2;
        let id = record.content_id.clone();

        let t = plan_vouch(&threshold(3), &record, &id, false, &voucher).unwrap();

        assert_eq!(t.record().unwrap().status, VerificationStatus::CommunityVouched);
        let names: Vec<_> = t.notifications().iter().map(|n| n.name()).collect();
        assert_eq!(names, vec!["status_changed", "vouch_recorded"]);
    }

    #[test]
    fn test_no_second_promotion() {
        let creator = Keypair::generate().identity();
        let voucher = Keypair::generate().identity();
        let mut record = human_record(creator);
        record.vouch_count = 3;
        record.status = VerificationStatus::CommunityVouched;
        let id = record.content_id.clone();

        let t = plan_vouch(&threshold(3), &record, &id, false, &voucher).unwrap();

        assert_eq!(t.record().unwrap().vouch_count, 4);
        assert_eq!(t.notifications().len(), 1);
    }

    #[test]
    fn test_unverified_record_never_promoted() {
        let creator = Keypair::generate().identity();
        let voucher = Keypair::generate().identity();
        let mut record = human_record(creator);
        record.status = VerificationStatus::Unverified;
        let id = record.content_id.clone();

        let t = plan_vouch(&threshold(1), &record, &id, false, &voucher).unwrap();
        assert_eq!(t.record().unwrap().status, VerificationStatus::Unverified);
    }

    #[test]
    fn test_precondition_order() {
        let creator = Keypair::generate().identity();
        let id = ContentId::new("h1");

        // Missing record wins over everything else.
        assert_eq!(
            plan_vouch(&threshold(3), &ContentRecord::default(), &id, true, &creator),
            Err(RegistryError::NotFound(id.clone()))
        );

        // Already vouched is reported before self-vouch.
        let mut record = human_record(creator);
        assert!(matches!(
            plan_vouch(&threshold(3), &record, &id, true, &creator),
            Err(RegistryError::AlreadyVouched { .. })
        ));

        // Self-vouch is reported before the creation type check.
        record.creation_type = CreationType::AiGenerated;
        assert_eq!(
            plan_vouch(&threshold(3), &record, &id, false, &creator),
            Err(RegistryError::SelfVouch(id.clone()))
        );

        let other = Keypair::generate().identity();
        assert_eq!(
            plan_vouch(&threshold(3), &record, &id, false, &other),
            Err(RegistryError::WrongCreationType(id))
        );
    }
}
