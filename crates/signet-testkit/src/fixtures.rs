//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use signet::{LedgerTreasury, ManualClock, Registry, RegistryConfig};
use signet_core::{
    Amount, ContentId, CreationType, Identity, Keypair, Notification, Registration,
};
use signet_store::{MemoryStore, Store};

/// Fixed start time for fixture clocks (2025-01-14T16:00:00Z).
pub const GENESIS_TIME: i64 = 1_736_870_400_000;

/// A registry over a memory store, with a deterministic admin, a manual
/// clock and an inspectable treasury.
pub struct TestFixture<S: Store = MemoryStore> {
    pub admin: Keypair,
    pub registry: Registry<S>,
    pub treasury: Arc<LedgerTreasury>,
    pub clock: Arc<ManualClock>,
}

impl TestFixture<MemoryStore> {
    /// Fixture with default configuration and invariant checking on.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Fixture whose configuration is adjusted by `tweak` before opening.
    pub async fn with_config(tweak: impl FnOnce(&mut RegistryConfig)) -> Self {
        Self::over(MemoryStore::new(), tweak).await
    }
}

impl<S: Store> TestFixture<S> {
    /// Fixture over an arbitrary store.
    pub async fn over(store: S, tweak: impl FnOnce(&mut RegistryConfig)) -> Self {
        let admin = party(0);
        let mut config = RegistryConfig {
            verify_invariants: true,
            ..RegistryConfig::with_admin(admin.identity())
        };
        tweak(&mut config);

        let treasury = Arc::new(LedgerTreasury::new());
        let clock = Arc::new(ManualClock::new(GENESIS_TIME));
        let registry = Registry::open(store, config)
            .await
            .expect("open registry")
            .with_treasury(treasury.clone())
            .with_clock(clock.clone());

        Self {
            admin,
            registry,
            treasury,
            clock,
        }
    }

    pub fn admin_id(&self) -> Identity {
        self.admin.identity()
    }

    /// Register human-created content for `creator`, paying the current fee.
    pub async fn register_human(&mut self, creator: &Identity, id: &str) -> Vec<Notification> {
        self.register(creator, id, CreationType::HumanCreated).await
    }

    /// Register content of any type, paying the current fee.
    pub async fn register(
        &mut self,
        creator: &Identity,
        id: &str,
        creation_type: CreationType,
    ) -> Vec<Notification> {
        let fee = self
            .registry
            .access_config()
            .await
            .expect("config")
            .registration_fee;
        let registration = Registration::new(id, locator(id), creation_type);
        self.clock.advance(1_000);
        self.registry
            .register(creator, registration, fee)
            .await
            .expect("register")
    }

    /// Vouch from each identity in turn, returning the notifications of the
    /// last vouch.
    pub async fn vouch_all(&mut self, id: &str, vouchers: &[Identity]) -> Vec<Notification> {
        let mut last = Vec::new();
        for voucher in vouchers {
            last = self
                .registry
                .vouch(voucher, ContentId::new(id))
                .await
                .expect("vouch");
        }
        last
    }

    /// Change the vouch threshold as admin.
    pub async fn set_threshold(&mut self, threshold: u64) {
        let admin = self.admin_id();
        self.registry
            .set_vouch_threshold(&admin, threshold)
            .await
            .expect("set threshold");
    }

    /// Change the registration fee as admin.
    pub async fn set_fee(&mut self, fee: u128) {
        let admin = self.admin_id();
        self.registry
            .set_registration_fee(&admin, Amount::new(fee))
            .await
            .expect("set fee");
    }
}

/// A deterministic party. Index 0 is the fixture admin.
pub fn party(index: u8) -> Keypair {
    let mut seed = [0u8; 32];
    seed[0] = index;
    seed[31] = 0x5e;
    Keypair::from_seed(&seed)
}

/// Identities for parties `1..=count` (never the admin).
pub fn parties(count: u8) -> Vec<Identity> {
    (1..=count).map(|i| party(i).identity()).collect()
}

/// Locator used by fixture registrations.
pub fn locator(id: &str) -> String {
    format!("at://did:plc:fixture/app.bsky.feed.post/{}", id)
}

/// Event names, for compact assertions.
pub fn names(notifications: &[Notification]) -> Vec<&'static str> {
    notifications.iter().map(Notification::name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parties_are_distinct_from_admin() {
        let admin = party(0).identity();
        let others = parties(5);
        assert_eq!(others.len(), 5);
        assert!(!others.contains(&admin));
        for (i, a) in others.iter().enumerate() {
            for b in &others[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[tokio::test]
    async fn test_fixture_registers_with_fee() {
        let mut fixture = TestFixture::new().await;
        fixture.set_fee(25).await;

        let creator = party(1).identity();
        fixture.register_human(&creator, "h1").await;

        assert_eq!(fixture.treasury.balance(&fixture.admin_id()), Amount::new(25));
        let record = fixture.registry.get_record(&"h1".into()).await.unwrap();
        assert_eq!(record.registered_at, GENESIS_TIME + 1_000);
    }
}
