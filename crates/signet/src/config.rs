//! Registry configuration.
//!
//! The genesis block seeds the access configuration the first time a store
//! is opened; afterwards the stored configuration is authoritative and only
//! changes through admin calls.

use std::path::Path;

use serde::{Deserialize, Serialize};
use signet_core::{AccessConfig, Amount, Identity, DEFAULT_VOUCH_THRESHOLD};

use crate::error::{Result, SignetError};

/// Initial access configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisConfig {
    pub admin: Identity,
    /// Defaults to the admin.
    pub fee_collector: Option<Identity>,
    pub registration_fee: Amount,
    pub vouch_threshold: u64,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            admin: Identity::ZERO,
            fee_collector: None,
            registration_fee: Amount::ZERO,
            vouch_threshold: DEFAULT_VOUCH_THRESHOLD,
        }
    }
}

impl GenesisConfig {
    pub fn to_access_config(&self) -> AccessConfig {
        AccessConfig {
            admin: self.admin,
            fee_collector: self.fee_collector.unwrap_or(self.admin),
            registration_fee: self.registration_fee,
            vouch_threshold: self.vouch_threshold,
        }
    }
}

/// Who may use fee-free batch registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// Any caller.
    #[default]
    Open,
    /// Only the current admin.
    AdminOnly,
    /// Nobody.
    Disabled,
}

/// Configuration for a registry instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub genesis: GenesisConfig,
    pub batch_policy: BatchPolicy,
    /// Capacity of the notification broadcast channel.
    pub event_buffer: usize,
    /// Re-check record invariants after every commit.
    pub verify_invariants: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            genesis: GenesisConfig::default(),
            batch_policy: BatchPolicy::Open,
            event_buffer: 256,
            verify_invariants: false,
        }
    }
}

impl RegistryConfig {
    /// Default configuration administered by `admin`.
    pub fn with_admin(admin: Identity) -> Self {
        Self {
            genesis: GenesisConfig {
                admin,
                ..GenesisConfig::default()
            },
            ..Self::default()
        }
    }

    /// Parse a JSON configuration. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SignetError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| SignetError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| SignetError::Config(e.to_string()))
    }

    /// Reject settings the registry cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.genesis.vouch_threshold == 0 {
            return Err(SignetError::Config(
                "genesis vouch_threshold must be positive".into(),
            ));
        }
        if self.event_buffer == 0 {
            return Err(SignetError::Config("event_buffer must be positive".into()));
        }
        Ok(())
    }
}
