//! The registry: one state object owning records, vouches and configuration.

use std::sync::Arc;

use signet_core::{
    plan_register, plan_set_fee_collector, plan_set_registration_fee, plan_set_vouch_threshold,
    plan_transfer_admin, plan_update_creation_type, plan_vouch, AccessConfig, Amount, Call,
    ContentId, ContentRecord, CreationType, FeeGate, Identity, Notification, Registration,
    RegistryError, SignedCall, Transition, VerificationStatus, Write,
};
use signet_core::guard::ensure_unpaid;
use signet_store::Store;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::{BatchPolicy, RegistryConfig};
use crate::error::{Result, SignetError};
use crate::report::VerificationReport;
use crate::treasury::{LedgerTreasury, Treasury};

/// The content provenance registry.
///
/// Every mutating method takes `&mut self`, so operations on one registry
/// run one at a time. Each one either commits all of its writes, forwards
/// its fee and publishes its notifications, or changes nothing.
pub struct Registry<S: Store> {
    store: Arc<S>,
    config: RegistryConfig,
    treasury: Arc<dyn Treasury>,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<Notification>,
}

impl<S: Store> Registry<S> {
    /// Open a registry over a store.
    ///
    /// Writes the genesis access configuration if the store has none yet.
    pub async fn open(store: S, config: RegistryConfig) -> Result<Self> {
        config.validate()?;

        if store.get_config().await?.is_none() {
            let genesis = config.genesis.to_access_config();
            if genesis.admin.is_zero() {
                warn!("genesis admin is unset; configuration can never be changed");
            }
            store.commit(&[Write::PutConfig(genesis)]).await?;
            info!(admin = %config.genesis.admin, "registry initialized");
        } else {
            debug!("registry opened with stored configuration");
        }

        let (events, _) = broadcast::channel(config.event_buffer);
        Ok(Self {
            store: Arc::new(store),
            config,
            treasury: Arc::new(LedgerTreasury::new()),
            clock: Arc::new(SystemClock),
            events,
        })
    }

    /// Use a different fee treasury.
    pub fn with_treasury(mut self, treasury: Arc<dyn Treasury>) -> Self {
        self.treasury = treasury;
        self
    }

    /// Use a different clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Receive notifications for every committed operation from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.events.subscribe()
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // ContentRegistry
    // ─────────────────────────────────────────────────────────────────────────

    /// Register content, paying `paid` toward the registration fee.
    ///
    /// The whole payment is forwarded to the fee collector.
    #[tracing::instrument(skip_all, fields(caller = %caller, content_id = %registration.content_id))]
    pub async fn register(
        &mut self,
        caller: &Identity,
        registration: Registration,
        paid: Amount,
    ) -> Result<Vec<Notification>> {
        self.execute(caller, Call::Register(registration), paid, None)
            .await
    }

    /// Register content without a fee, subject to the batch policy.
    #[tracing::instrument(skip_all, fields(caller = %caller, content_id = %content_id))]
    pub async fn register_batch(
        &mut self,
        caller: &Identity,
        content_id: ContentId,
        content_locator: impl Into<String>,
        creation_type: CreationType,
    ) -> Result<Vec<Notification>> {
        let call = Call::RegisterBatch {
            content_id,
            content_locator: content_locator.into(),
            creation_type,
        };
        self.execute(caller, call, Amount::ZERO, None).await
    }

    /// Reclassify content. Only its creator may do this.
    #[tracing::instrument(skip_all, fields(caller = %caller, content_id = %content_id))]
    pub async fn update_creation_type(
        &mut self,
        caller: &Identity,
        content_id: ContentId,
        creation_type: CreationType,
    ) -> Result<Vec<Notification>> {
        let call = Call::UpdateCreationType {
            content_id,
            creation_type,
        };
        self.execute(caller, call, Amount::ZERO, None).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // VouchLedger
    // ─────────────────────────────────────────────────────────────────────────

    /// Vouch for a human-created claim.
    #[tracing::instrument(skip_all, fields(voucher = %voucher, content_id = %content_id))]
    pub async fn vouch(
        &mut self,
        voucher: &Identity,
        content_id: ContentId,
    ) -> Result<Vec<Notification>> {
        self.execute(voucher, Call::Vouch { content_id }, Amount::ZERO, None)
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // AccessConfig
    // ─────────────────────────────────────────────────────────────────────────

    #[tracing::instrument(skip_all, fields(caller = %caller))]
    pub async fn set_fee_collector(
        &mut self,
        caller: &Identity,
        collector: Identity,
    ) -> Result<Vec<Notification>> {
        self.execute(caller, Call::SetFeeCollector { collector }, Amount::ZERO, None)
            .await
    }

    #[tracing::instrument(skip_all, fields(caller = %caller))]
    pub async fn set_registration_fee(
        &mut self,
        caller: &Identity,
        fee: Amount,
    ) -> Result<Vec<Notification>> {
        self.execute(caller, Call::SetRegistrationFee { fee }, Amount::ZERO, None)
            .await
    }

    #[tracing::instrument(skip_all, fields(caller = %caller))]
    pub async fn set_vouch_threshold(
        &mut self,
        caller: &Identity,
        threshold: u64,
    ) -> Result<Vec<Notification>> {
        self.execute(caller, Call::SetVouchThreshold { threshold }, Amount::ZERO, None)
            .await
    }

    #[tracing::instrument(skip_all, fields(caller = %caller))]
    pub async fn transfer_admin(
        &mut self,
        caller: &Identity,
        admin: Identity,
    ) -> Result<Vec<Notification>> {
        self.execute(caller, Call::TransferAdmin { admin }, Amount::ZERO, None)
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Signed calls
    // ─────────────────────────────────────────────────────────────────────────

    /// Authenticate and run a signed call.
    ///
    /// The payment is the envelope's signed `value`; only `Register` may
    /// carry one. A rejected call does not consume its nonce.
    #[tracing::instrument(skip_all, fields(caller = %signed.caller, nonce = signed.nonce, op = signed.call.name()))]
    pub async fn submit(&mut self, signed: &SignedCall) -> Result<Vec<Notification>> {
        if let Err(e) = signed.verify() {
            debug!(call_id = %signed.id(), "signature rejected");
            return Err(e.into());
        }

        if let Some(last) = self.store.last_nonce(&signed.caller).await? {
            if signed.nonce <= last {
                debug!(last, "stale nonce");
                return Err(SignetError::StaleNonce {
                    caller: signed.caller,
                    nonce: signed.nonce,
                    last,
                });
            }
        }

        let advance = Write::AdvanceNonce {
            caller: signed.caller,
            nonce: signed.nonce,
        };
        self.execute(&signed.caller, signed.call.clone(), signed.value, Some(advance))
            .await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// The record for a content id, or the all-default record if none.
    pub async fn get_record(&self, content_id: &ContentId) -> Result<ContentRecord> {
        Ok(self
            .store
            .get_record(content_id)
            .await?
            .unwrap_or_default())
    }

    pub async fn has_vouched(&self, content_id: &ContentId, voucher: &Identity) -> Result<bool> {
        Ok(self.store.has_vouched(content_id, voucher).await?)
    }

    /// Content registered by `creator`, in registration order.
    pub async fn list_creator_content(&self, creator: &Identity) -> Result<Vec<ContentId>> {
        Ok(self.store.creator_content(creator).await?)
    }

    /// Whether the content claims human creation, and its status.
    pub async fn is_human_verified(
        &self,
        content_id: &ContentId,
    ) -> Result<(bool, VerificationStatus)> {
        let record = self.get_record(content_id).await?;
        Ok((record.is_human_claim(), record.status))
    }

    /// Current access configuration.
    pub async fn access_config(&self) -> Result<AccessConfig> {
        self.store
            .get_config()
            .await?
            .ok_or_else(|| SignetError::Invariant("access configuration missing".into()))
    }

    /// Identities that vouched for a content id, in vouch order.
    pub async fn vouchers(&self, content_id: &ContentId) -> Result<Vec<Identity>> {
        Ok(self.store.vouchers(content_id).await?)
    }

    pub async fn verification_report(&self, content_id: &ContentId) -> Result<VerificationReport> {
        let record = self.get_record(content_id).await?;
        Ok(VerificationReport::from_record(content_id, &record))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Execution
    // ─────────────────────────────────────────────────────────────────────────

    /// Plan, pay, commit, publish.
    async fn execute(
        &mut self,
        caller: &Identity,
        call: Call,
        value: Amount,
        extra: Option<Write>,
    ) -> Result<Vec<Notification>> {
        let op = call.name();
        let transition = match self.plan(caller, call, value).await {
            Ok(t) => t,
            Err(e) => {
                debug!(op, error = %e, "operation rejected");
                return Err(e);
            }
        };

        let (mut writes, notifications, fee) = transition.into_parts();
        writes.extend(extra);

        if self.config.verify_invariants {
            self.check_planned(&writes).await?;
        }

        // The fee moves before anything is written; a failed transfer
        // leaves no trace.
        let receipt = match fee {
            Some(fee) => Some(self.treasury.forward(&fee).await?),
            None => None,
        };

        if let Err(e) = self.store.commit(&writes).await {
            if let Some(receipt) = &receipt {
                warn!(transfer = receipt.id, error = %e, "commit failed; reversing fee transfer");
                if let Err(reverse) = self.treasury.reverse(receipt).await {
                    error!(transfer = receipt.id, error = %reverse, "fee reversal failed");
                }
            }
            return Err(e.into());
        }

        if let Some(receipt) = &receipt {
            if let Err(e) = self.treasury.settle(receipt).await {
                warn!(transfer = receipt.id, error = %e, "fee settlement failed");
            }
        }

        info!(
            op,
            writes = writes.len(),
            fee = ?receipt.as_ref().map(|r| r.transfer.amount),
            "committed"
        );

        for notification in &notifications {
            // No subscribers is not an error.
            let _ = self.events.send(notification.clone());
        }

        Ok(notifications)
    }

    /// Read the snapshot a call needs and plan it.
    async fn plan(&self, caller: &Identity, call: Call, value: Amount) -> Result<Transition> {
        if !matches!(call, Call::Register(_)) {
            ensure_unpaid(value)?;
        }
        let config = self.access_config().await?;

        let transition = match call {
            Call::Register(registration) => {
                let existing = self.get_record(&registration.content_id).await?;
                plan_register(
                    &config,
                    &existing,
                    caller,
                    registration,
                    FeeGate::Paid(value),
                    self.clock.now(),
                )?
            }
            Call::RegisterBatch {
                content_id,
                content_locator,
                creation_type,
            } => {
                self.ensure_batch_allowed(&config, caller)?;
                let existing = self.get_record(&content_id).await?;
                plan_register(
                    &config,
                    &existing,
                    caller,
                    Registration::new(content_id, content_locator, creation_type),
                    FeeGate::Waived,
                    self.clock.now(),
                )?
            }
            Call::Vouch { content_id } => {
                let record = self.get_record(&content_id).await?;
                let already = self.store.has_vouched(&content_id, caller).await?;
                plan_vouch(&config, &record, &content_id, already, caller)?
            }
            Call::UpdateCreationType {
                content_id,
                creation_type,
            } => {
                let record = self.get_record(&content_id).await?;
                plan_update_creation_type(&record, &content_id, caller, creation_type)?
            }
            Call::SetFeeCollector { collector } => {
                plan_set_fee_collector(&config, caller, collector)?
            }
            Call::SetRegistrationFee { fee } => plan_set_registration_fee(&config, caller, fee)?,
            Call::SetVouchThreshold { threshold } => {
                plan_set_vouch_threshold(&config, caller, threshold)?
            }
            Call::TransferAdmin { admin } => plan_transfer_admin(&config, caller, admin)?,
        };

        Ok(transition)
    }

    fn ensure_batch_allowed(
        &self,
        config: &AccessConfig,
        caller: &Identity,
    ) -> std::result::Result<(), RegistryError> {
        match self.config.batch_policy {
            BatchPolicy::Open => Ok(()),
            BatchPolicy::AdminOnly if *caller == config.admin => Ok(()),
            BatchPolicy::AdminOnly => Err(RegistryError::NotAdmin(*caller)),
            BatchPolicy::Disabled => Err(RegistryError::BatchRegistrationDisabled),
        }
    }

    /// Check a planned changeset against the stored vouches before anything
    /// is paid or written.
    async fn check_planned(&self, writes: &[Write]) -> Result<()> {
        let violation = |msg: String| Err(SignetError::Invariant(msg));

        for write in writes {
            let record = match write {
                Write::InsertRecord(r) | Write::UpdateRecord(r) => r,
                Write::InsertVouch { content_id, .. } => {
                    let counted = writes.iter().any(|w| {
                        matches!(w, Write::UpdateRecord(r) if &r.content_id == content_id)
                    });
                    if !counted {
                        return violation(format!("vouch for {} without a count update", content_id));
                    }
                    continue;
                }
                _ => continue,
            };
            let content_id = &record.content_id;

            if !record.exists() {
                return violation(format!("{} written without registration time", content_id));
            }

            let mut planned = 0u64;
            for w in writes {
                if let Write::InsertVouch { content_id: id, voucher } = w {
                    if id == content_id {
                        if *voucher == record.creator {
                            return violation(format!("creator vouching for {}", content_id));
                        }
                        planned += 1;
                    }
                }
            }

            let stored = self.store.count_vouches(content_id).await?;
            if stored + planned != record.vouch_count {
                return violation(format!(
                    "{} would count {} vouches but {} exist",
                    content_id,
                    record.vouch_count,
                    stored + planned
                ));
            }
            if self.store.has_vouched(content_id, &record.creator).await? {
                return violation(format!("creator vouched for {}", content_id));
            }
            if record.status == VerificationStatus::CommunityVouched && !record.is_human_claim() {
                return violation(format!("{} vouched without a human claim", content_id));
            }
        }

        Ok(())
    }
}
