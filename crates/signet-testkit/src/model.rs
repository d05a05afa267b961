//! A plain reference model of the registry rules.
//!
//! The model answers "what should happen" for generated sessions so that
//! property tests can compare it against the real registry step by step.
//! Calls arrive unpaid, so a non-zero registration fee rejects `Register`.

use std::collections::{HashMap, HashSet};

use signet_core::{
    AccessConfig, Amount, Call, ContentId, ContentRecord, CreationType, Identity, RegistryError,
    VerificationStatus,
};

/// Expected registry state.
#[derive(Debug, Clone)]
pub struct Model {
    pub config: AccessConfig,
    pub records: HashMap<ContentId, ContentRecord>,
    pub vouches: HashSet<(ContentId, Identity)>,
    pub creator_index: HashMap<Identity, Vec<ContentId>>,
}

/// What the model predicts for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    Rejected(RegistryError),
    /// Accepted; `promoted` is true when the call promotes a record.
    Accepted { promoted: bool },
}

impl Model {
    pub fn new(config: AccessConfig) -> Self {
        Self {
            config,
            records: HashMap::new(),
            vouches: HashSet::new(),
            creator_index: HashMap::new(),
        }
    }

    /// Apply an unpaid call from `caller`, returning the predicted outcome.
    pub fn apply(&mut self, caller: &Identity, call: &Call) -> Expected {
        match self.step(caller, call) {
            Ok(promoted) => Expected::Accepted { promoted },
            Err(e) => Expected::Rejected(e),
        }
    }

    fn step(&mut self, caller: &Identity, call: &Call) -> Result<bool, RegistryError> {
        match call {
            Call::Register(r) => self.register(caller, &r.content_id, r.creation_type, true),
            Call::RegisterBatch {
                content_id,
                creation_type,
                ..
            } => self.register(caller, content_id, *creation_type, false),
            Call::Vouch { content_id } => self.vouch(caller, content_id),
            Call::UpdateCreationType {
                content_id,
                creation_type,
            } => self.update(caller, content_id, *creation_type),
            Call::SetVouchThreshold { threshold } => {
                self.admin_only(caller)?;
                if *threshold == 0 {
                    return Err(RegistryError::InvalidThreshold);
                }
                self.config.vouch_threshold = *threshold;
                Ok(false)
            }
            Call::SetFeeCollector { collector } => {
                self.admin_only(caller)?;
                self.config.fee_collector = *collector;
                Ok(false)
            }
            Call::SetRegistrationFee { fee } => {
                self.admin_only(caller)?;
                self.config.registration_fee = *fee;
                Ok(false)
            }
            Call::TransferAdmin { admin } => {
                self.admin_only(caller)?;
                self.config.admin = *admin;
                Ok(false)
            }
        }
    }

    fn admin_only(&self, caller: &Identity) -> Result<(), RegistryError> {
        if *caller != self.config.admin {
            return Err(RegistryError::NotAdmin(*caller));
        }
        Ok(())
    }

    fn register(
        &mut self,
        caller: &Identity,
        content_id: &ContentId,
        creation_type: CreationType,
        fee_gated: bool,
    ) -> Result<bool, RegistryError> {
        if content_id.is_empty() {
            return Err(RegistryError::EmptyContentId);
        }
        if fee_gated && !self.config.registration_fee.is_zero() {
            return Err(RegistryError::InsufficientFee {
                required: self.config.registration_fee,
                paid: Amount::ZERO,
            });
        }
        if self.records.contains_key(content_id) {
            return Err(RegistryError::AlreadyRegistered(content_id.clone()));
        }
        self.records.insert(
            content_id.clone(),
            ContentRecord {
                creator: *caller,
                content_id: content_id.clone(),
                creation_type,
                status: VerificationStatus::SelfAttested,
                ..Default::default()
            },
        );
        self.creator_index
            .entry(*caller)
            .or_default()
            .push(content_id.clone());
        Ok(false)
    }

    fn vouch(&mut self, voucher: &Identity, content_id: &ContentId) -> Result<bool, RegistryError> {
        let threshold = self.config.vouch_threshold;
        let record = self
            .records
            .get_mut(content_id)
            .ok_or_else(|| RegistryError::NotFound(content_id.clone()))?;

        if self.vouches.contains(&(content_id.clone(), *voucher)) {
            return Err(RegistryError::AlreadyVouched {
                content_id: content_id.clone(),
                voucher: *voucher,
            });
        }
        if record.creator == *voucher {
            return Err(RegistryError::SelfVouch(content_id.clone()));
        }
        if record.creation_type != CreationType::HumanCreated {
            return Err(RegistryError::WrongCreationType(content_id.clone()));
        }

        self.vouches.insert((content_id.clone(), *voucher));
        record.vouch_count += 1;
        let promoted =
            record.vouch_count >= threshold && record.status == VerificationStatus::SelfAttested;
        if promoted {
            record.status = VerificationStatus::CommunityVouched;
        }
        Ok(promoted)
    }

    fn update(
        &mut self,
        caller: &Identity,
        content_id: &ContentId,
        creation_type: CreationType,
    ) -> Result<bool, RegistryError> {
        let record = self
            .records
            .get_mut(content_id)
            .ok_or_else(|| RegistryError::NotFound(content_id.clone()))?;
        if record.creator != *caller {
            return Err(RegistryError::NotOwner {
                content_id: content_id.clone(),
                caller: *caller,
            });
        }

        record.creation_type = creation_type;
        if creation_type != CreationType::HumanCreated
            && record.status != VerificationStatus::Unverified
        {
            record.status = VerificationStatus::SelfAttested;
        }
        Ok(false)
    }

    /// Expected record, or the default record if absent.
    pub fn record(&self, content_id: &ContentId) -> ContentRecord {
        self.records.get(content_id).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::party;

    #[test]
    fn test_model_promotes_once() {
        let admin = party(0).identity();
        let creator = party(1).identity();
        let mut model = Model::new(AccessConfig::genesis(admin));
        let id = ContentId::new("h1");

        model.apply(
            &creator,
            &Call::RegisterBatch {
                content_id: id.clone(),
                content_locator: String::new(),
                creation_type: CreationType::HumanCreated,
            },
        );

        let promotions: Vec<bool> = (2..=5)
            .map(|i| {
                match model.apply(&party(i).identity(), &Call::Vouch { content_id: id.clone() }) {
                    Expected::Accepted { promoted } => promoted,
                    Expected::Rejected(e) => panic!("unexpected rejection: {}", e),
                }
            })
            .collect();

        assert_eq!(promotions, vec![false, false, true, false]);
        assert_eq!(model.record(&id).vouch_count, 4);
    }

    #[test]
    fn test_model_admin_calls() {
        let admin = party(0).identity();
        let heir = party(1).identity();
        let mut model = Model::new(AccessConfig::genesis(admin));

        let fee = Call::SetRegistrationFee { fee: Amount::new(3) };
        assert_eq!(
            model.apply(&heir, &fee),
            Expected::Rejected(RegistryError::NotAdmin(heir))
        );
        assert_eq!(model.apply(&admin, &fee), Expected::Accepted { promoted: false });
        model.apply(&admin, &Call::SetFeeCollector { collector: heir });
        model.apply(&admin, &Call::TransferAdmin { admin: heir });

        assert_eq!(model.config.registration_fee, Amount::new(3));
        assert_eq!(model.config.fee_collector, heir);
        assert_eq!(model.config.admin, heir);
        assert_eq!(
            model.apply(&admin, &Call::SetVouchThreshold { threshold: 1 }),
            Expected::Rejected(RegistryError::NotAdmin(admin))
        );
    }

    #[test]
    fn test_model_fee_gates_only_register() {
        let admin = party(0).identity();
        let creator = party(1).identity();
        let mut model = Model::new(AccessConfig::genesis(admin));
        model.apply(&admin, &Call::SetRegistrationFee { fee: Amount::new(5) });

        let paid = Call::Register(signet_core::Registration::new(
            "h1",
            "",
            CreationType::HumanCreated,
        ));
        assert_eq!(
            model.apply(&creator, &paid),
            Expected::Rejected(RegistryError::InsufficientFee {
                required: Amount::new(5),
                paid: Amount::ZERO,
            })
        );

        let batch = Call::RegisterBatch {
            content_id: ContentId::new("h1"),
            content_locator: String::new(),
            creation_type: CreationType::HumanCreated,
        };
        assert_eq!(model.apply(&creator, &batch), Expected::Accepted { promoted: false });
        assert_eq!(model.record(&ContentId::new("h1")).creator, creator);
    }
}
