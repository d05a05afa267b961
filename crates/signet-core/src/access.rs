//! AccessConfig: the admin-owned registry settings.
//!
//! One singleton holds the admin identity, the fee collector, the
//! registration fee and the vouch threshold. Only the current admin may
//! change any of them, one field per call. Changes never act retroactively:
//! a record already promoted under a lower threshold stays promoted.

use serde::{Deserialize, Serialize};

use crate::crypto::Identity;
use crate::error::Result;
use crate::event::{ConfigChange, Notification};
use crate::guard::{ensure_admin, ensure_threshold};
use crate::transition::{Transition, Write};
use crate::types::Amount;

/// Vouches needed for community promotion unless configured otherwise.
pub const DEFAULT_VOUCH_THRESHOLD: u64 = 3;

/// The configuration singleton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
    pub admin: Identity,
    pub fee_collector: Identity,
    pub registration_fee: Amount,
    pub vouch_threshold: u64,
}

impl AccessConfig {
    /// Genesis configuration: the deployer administers and collects fees.
    pub fn genesis(admin: Identity) -> Self {
        Self {
            admin,
            fee_collector: admin,
            registration_fee: Amount::ZERO,
            vouch_threshold: DEFAULT_VOUCH_THRESHOLD,
        }
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self::genesis(Identity::ZERO)
    }
}

/// Plan a fee collector change.
pub fn plan_set_fee_collector(
    config: &AccessConfig,
    caller: &Identity,
    collector: Identity,
) -> Result<Transition> {
    ensure_admin(config, caller)?;

    let next = AccessConfig {
        fee_collector: collector,
        ..config.clone()
    };
    Ok(updated(next, *caller, ConfigChange::FeeCollector(collector)))
}

/// Plan a registration fee change.
pub fn plan_set_registration_fee(
    config: &AccessConfig,
    caller: &Identity,
    fee: Amount,
) -> Result<Transition> {
    ensure_admin(config, caller)?;

    let next = AccessConfig {
        registration_fee: fee,
        ..config.clone()
    };
    Ok(updated(next, *caller, ConfigChange::RegistrationFee(fee)))
}

/// Plan a vouch threshold change.
pub fn plan_set_vouch_threshold(
    config: &AccessConfig,
    caller: &Identity,
    threshold: u64,
) -> Result<Transition> {
    ensure_admin(config, caller)?;
    ensure_threshold(threshold)?;

    let next = AccessConfig {
        vouch_threshold: threshold,
        ..config.clone()
    };
    Ok(updated(next, *caller, ConfigChange::VouchThreshold(threshold)))
}

/// Plan handing the admin role to another identity.
pub fn plan_transfer_admin(
    config: &AccessConfig,
    caller: &Identity,
    admin: Identity,
) -> Result<Transition> {
    ensure_admin(config, caller)?;

    let next = AccessConfig {
        admin,
        ..config.clone()
    };
    Ok(updated(next, *caller, ConfigChange::Admin(admin)))
}

fn updated(next: AccessConfig, admin: Identity, change: ConfigChange) -> Transition {
    Transition::new()
        .write(Write::PutConfig(next))
        .notify(Notification::ConfigUpdated { admin, change })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;
    use crate::error::RegistryError;

    #[test]
    fn test_admin_updates_single_field() {
        let admin = Keypair::generate().identity();
        let config = AccessConfig::genesis(admin);

        let t = plan_set_registration_fee(&config, &admin, Amount::new(500)).unwrap();
        let next = t.config().unwrap();

        assert_eq!(next.registration_fee, Amount::new(500));
        assert_eq!(next.admin, config.admin);
        assert_eq!(next.fee_collector, config.fee_collector);
        assert_eq!(next.vouch_threshold, config.vouch_threshold);
        assert_eq!(t.notifications().len(), 1);
    }

    #[test]
    fn test_non_admin_rejected_for_every_setter() {
        let admin = Keypair::generate().identity();
        let intruder = Keypair::generate().identity();
        let config = AccessConfig::genesis(admin);

        let expected = Err(RegistryError::NotAdmin(intruder));
        assert_eq!(plan_set_fee_collector(&config, &intruder, intruder), expected);
        assert_eq!(plan_set_registration_fee(&config, &intruder, Amount::ZERO), expected);
        assert_eq!(plan_set_vouch_threshold(&config, &intruder, 5), expected);
        assert_eq!(plan_transfer_admin(&config, &intruder, intruder), expected);
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let admin = Keypair::generate().identity();
        let config = AccessConfig::genesis(admin);
        assert_eq!(
            plan_set_vouch_threshold(&config, &admin, 0),
            Err(RegistryError::InvalidThreshold)
        );
    }

    #[test]
    fn test_not_admin_checked_before_threshold_validity() {
        let admin = Keypair::generate().identity();
        let other = Keypair::generate().identity();
        let config = AccessConfig::genesis(admin);
        assert_eq!(
            plan_set_vouch_threshold(&config, &other, 0),
            Err(RegistryError::NotAdmin(other))
        );
    }

    #[test]
    fn test_transfer_admin() {
        let admin = Keypair::generate().identity();
        let successor = Keypair::generate().identity();
        let config = AccessConfig::genesis(admin);

        let t = plan_transfer_admin(&config, &admin, successor).unwrap();
        let next = t.config().unwrap();
        assert_eq!(next.admin, successor);

        // The previous admin has no power under the new config.
        assert!(plan_set_vouch_threshold(next, &admin, 1).is_err());
        assert!(plan_set_vouch_threshold(next, &successor, 1).is_ok());
    }

    #[test]
    fn test_genesis_defaults() {
        let admin = Keypair::generate().identity();
        let config = AccessConfig::genesis(admin);
        assert_eq!(config.vouch_threshold, DEFAULT_VOUCH_THRESHOLD);
        assert_eq!(config.fee_collector, admin);
        assert!(config.registration_fee.is_zero());
    }
}
