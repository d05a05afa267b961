//! Precondition checks.
//!
//! Each guard inspects a snapshot and returns a typed failure. Planners
//! compose them at the top of every operation, in the order the operation
//! documents, before building any write.

use crate::access::AccessConfig;
use crate::crypto::Identity;
use crate::error::{RegistryError, Result};
use crate::record::ContentRecord;
use crate::types::{Amount, ContentId};

/// The id must be a non-empty fingerprint.
pub fn ensure_content_id(content_id: &ContentId) -> Result<()> {
    if content_id.is_empty() {
        return Err(RegistryError::EmptyContentId);
    }
    Ok(())
}

/// The record must exist.
pub fn ensure_exists(record: &ContentRecord, content_id: &ContentId) -> Result<()> {
    if !record.exists() {
        return Err(RegistryError::NotFound(content_id.clone()));
    }
    Ok(())
}

/// No record may exist yet for this id.
pub fn ensure_absent(record: &ContentRecord, content_id: &ContentId) -> Result<()> {
    if record.exists() {
        return Err(RegistryError::AlreadyRegistered(content_id.clone()));
    }
    Ok(())
}

/// The caller must be the record's creator.
pub fn ensure_owner(record: &ContentRecord, caller: &Identity) -> Result<()> {
    if record.creator != *caller {
        return Err(RegistryError::NotOwner {
            content_id: record.content_id.clone(),
            caller: *caller,
        });
    }
    Ok(())
}

/// The caller must be the current admin.
pub fn ensure_admin(config: &AccessConfig, caller: &Identity) -> Result<()> {
    if config.admin != *caller {
        return Err(RegistryError::NotAdmin(*caller));
    }
    Ok(())
}

/// Non-payable operations must arrive without a payment.
pub fn ensure_unpaid(value: Amount) -> Result<()> {
    if !value.is_zero() {
        return Err(RegistryError::UnexpectedPayment(value));
    }
    Ok(())
}

/// The paid amount must cover the registration fee.
pub fn ensure_fee(config: &AccessConfig, paid: Amount) -> Result<()> {
    if paid < config.registration_fee {
        return Err(RegistryError::InsufficientFee {
            required: config.registration_fee,
            paid,
        });
    }
    Ok(())
}

/// The voucher must not have vouched for this content before.
pub fn ensure_not_vouched(
    already_vouched: bool,
    content_id: &ContentId,
    voucher: &Identity,
) -> Result<()> {
    if already_vouched {
        return Err(RegistryError::AlreadyVouched {
            content_id: content_id.clone(),
            voucher: *voucher,
        });
    }
    Ok(())
}

/// The voucher must not be the creator.
pub fn ensure_not_creator(record: &ContentRecord, voucher: &Identity) -> Result<()> {
    if record.creator == *voucher {
        return Err(RegistryError::SelfVouch(record.content_id.clone()));
    }
    Ok(())
}

/// Only claimed-human content can be vouched for.
pub fn ensure_human_claim(record: &ContentRecord) -> Result<()> {
    if !record.is_human_claim() {
        return Err(RegistryError::WrongCreationType(record.content_id.clone()));
    }
    Ok(())
}

/// Thresholds are positive.
pub fn ensure_threshold(threshold: u64) -> Result<()> {
    if threshold == 0 {
        return Err(RegistryError::InvalidThreshold);
    }
    Ok(())
}
