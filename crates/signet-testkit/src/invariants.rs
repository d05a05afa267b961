//! Whole-store invariant checks.

use std::collections::HashSet;

use signet_core::VerificationStatus;
use signet_store::Store;

/// Check every stored record:
///
/// - a stored record has a registration time
/// - `vouch_count` equals the number of stored vouches
/// - the creator never vouched for their own content
/// - each record appears exactly once in its creator's index
/// - a community vouched record claims human creation
///
/// Returns a description of the first violation found.
pub async fn check_store<S: Store + ?Sized>(store: &S) -> Result<(), String> {
    let records = store.list_records().await.map_err(|e| e.to_string())?;
    let mut creators = HashSet::new();

    for record in &records {
        let id = &record.content_id;

        if !record.exists() {
            return Err(format!("{} stored without registration time", id));
        }

        let vouchers = store.vouchers(id).await.map_err(|e| e.to_string())?;
        if vouchers.len() as u64 != record.vouch_count {
            return Err(format!(
                "{}: vouch_count {} but {} vouches stored",
                id,
                record.vouch_count,
                vouchers.len()
            ));
        }

        let unique: HashSet<_> = vouchers.iter().collect();
        if unique.len() != vouchers.len() {
            return Err(format!("{}: duplicate voucher", id));
        }

        if vouchers.contains(&record.creator) {
            return Err(format!("{}: creator vouched for own content", id));
        }

        if record.status == VerificationStatus::CommunityVouched && !record.is_human_claim() {
            return Err(format!("{}: community vouched without a human claim", id));
        }

        creators.insert(record.creator);
    }

    let mut indexed = 0usize;
    for creator in creators {
        let ids = store
            .creator_content(&creator)
            .await
            .map_err(|e| e.to_string())?;
        for id in &ids {
            let owned = records
                .iter()
                .any(|r| &r.content_id == id && r.creator == creator);
            if !owned {
                return Err(format!("{} indexed under a creator that does not own it", id));
            }
        }
        indexed += ids.len();
    }

    if indexed != records.len() {
        return Err(format!(
            "{} records but {} creator index entries",
            records.len(),
            indexed
        ));
    }

    Ok(())
}
