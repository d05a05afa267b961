//! Proptest generators for property-based testing.

use proptest::prelude::*;

use signet_core::{Amount, Call, ContentId, CreationType, Identity, Keypair, Registration};

use crate::fixtures::party;

/// Parties that generated operations act as, besides the admin (index 0).
pub const PARTIES: u8 = 6;

/// Content ids generated operations draw from. Small, so collisions happen.
pub const CONTENT_IDS: [&str; 4] = ["h1", "h2", "h3", "h4"];

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random identity.
pub fn identity() -> impl Strategy<Value = Identity> {
    any::<[u8; 32]>().prop_map(Identity::from_bytes)
}

/// Generate a CreationType, biased toward human-created.
pub fn creation_type() -> impl Strategy<Value = CreationType> {
    prop_oneof![
        3 => Just(CreationType::HumanCreated),
        1 => Just(CreationType::Undeclared),
        1 => Just(CreationType::AiAssisted),
        1 => Just(CreationType::AiGenerated),
    ]
}

/// Generate a free-form content id.
pub fn content_id() -> impl Strategy<Value = ContentId> {
    "[a-z0-9:]{1,24}".prop_map(ContentId::new)
}

/// Generate a full registration.
pub fn registration() -> impl Strategy<Value = Registration> {
    (
        content_id(),
        "https://[a-z]{1,12}\\.example/[a-z0-9]{0,16}",
        creation_type(),
        "[a-z]{0,10}",
        ".{0,40}",
    )
        .prop_map(|(id, locator, kind, platform, context)| {
            Registration::new(id, locator, kind)
                .platform_source(platform)
                .context(context)
        })
}

/// Generate any call.
pub fn call() -> impl Strategy<Value = Call> {
    prop_oneof![
        registration().prop_map(Call::Register),
        (content_id(), "[a-z:/.]{0,32}", creation_type()).prop_map(|(id, locator, kind)| {
            Call::RegisterBatch {
                content_id: id,
                content_locator: locator,
                creation_type: kind,
            }
        }),
        content_id().prop_map(|content_id| Call::Vouch { content_id }),
        (content_id(), creation_type()).prop_map(|(content_id, creation_type)| {
            Call::UpdateCreationType {
                content_id,
                creation_type,
            }
        }),
        identity().prop_map(|collector| Call::SetFeeCollector { collector }),
        any::<u128>().prop_map(|fee| Call::SetRegistrationFee {
            fee: Amount::new(fee)
        }),
        any::<u64>().prop_map(|threshold| Call::SetVouchThreshold { threshold }),
        identity().prop_map(|admin| Call::TransferAdmin { admin }),
    ]
}

/// One step of a generated registry session.
///
/// Parties are fixture indices; 0 is the admin.
#[derive(Debug, Clone)]
pub enum Op {
    Register {
        creator: u8,
        id: usize,
        creation_type: CreationType,
    },
    RegisterBatch {
        creator: u8,
        id: usize,
        creation_type: CreationType,
    },
    Vouch {
        voucher: u8,
        id: usize,
    },
    UpdateCreationType {
        caller: u8,
        id: usize,
        creation_type: CreationType,
    },
    SetVouchThreshold {
        caller: u8,
        threshold: u64,
    },
    SetFeeCollector {
        caller: u8,
        collector: u8,
    },
    SetRegistrationFee {
        caller: u8,
        fee: u128,
    },
    TransferAdmin {
        caller: u8,
        admin: u8,
    },
}

impl Op {
    /// Identity the operation runs as.
    pub fn caller(&self) -> Identity {
        let index = match self {
            Self::Register { creator, .. } | Self::RegisterBatch { creator, .. } => *creator,
            Self::Vouch { voucher, .. } => *voucher,
            Self::UpdateCreationType { caller, .. }
            | Self::SetVouchThreshold { caller, .. }
            | Self::SetFeeCollector { caller, .. }
            | Self::SetRegistrationFee { caller, .. }
            | Self::TransferAdmin { caller, .. } => *caller,
        };
        party(index).identity()
    }

    /// The registry call the operation performs.
    pub fn to_call(&self) -> Call {
        let content_id = |id: &usize| ContentId::new(CONTENT_IDS[*id]);
        match self {
            Self::Register {
                id, creation_type, ..
            } => Call::Register(Registration::new(
                content_id(id),
                crate::fixtures::locator(CONTENT_IDS[*id]),
                *creation_type,
            )),
            Self::RegisterBatch {
                id, creation_type, ..
            } => Call::RegisterBatch {
                content_id: content_id(id),
                content_locator: crate::fixtures::locator(CONTENT_IDS[*id]),
                creation_type: *creation_type,
            },
            Self::Vouch { id, .. } => Call::Vouch {
                content_id: content_id(id),
            },
            Self::UpdateCreationType {
                id, creation_type, ..
            } => Call::UpdateCreationType {
                content_id: content_id(id),
                creation_type: *creation_type,
            },
            Self::SetVouchThreshold { threshold, .. } => Call::SetVouchThreshold {
                threshold: *threshold,
            },
            Self::SetFeeCollector { collector, .. } => Call::SetFeeCollector {
                collector: party(*collector).identity(),
            },
            Self::SetRegistrationFee { fee, .. } => Call::SetRegistrationFee {
                fee: Amount::new(*fee),
            },
            Self::TransferAdmin { admin, .. } => Call::TransferAdmin {
                admin: party(*admin).identity(),
            },
        }
    }
}

fn party_index() -> impl Strategy<Value = u8> {
    0..=PARTIES
}

fn id_index() -> impl Strategy<Value = usize> {
    0..CONTENT_IDS.len()
}

/// Callers for admin operations, mostly the genesis admin.
fn admin_caller() -> impl Strategy<Value = u8> {
    prop_oneof![4 => Just(0u8), 1 => party_index()]
}

/// Generate a single operation, weighted toward vouching.
pub fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => (party_index(), id_index(), creation_type()).prop_map(|(creator, id, creation_type)| {
            Op::Register { creator, id, creation_type }
        }),
        1 => (party_index(), id_index(), creation_type()).prop_map(|(creator, id, creation_type)| {
            Op::RegisterBatch { creator, id, creation_type }
        }),
        6 => (party_index(), id_index()).prop_map(|(voucher, id)| Op::Vouch { voucher, id }),
        1 => (party_index(), id_index(), creation_type()).prop_map(|(caller, id, creation_type)| {
            Op::UpdateCreationType { caller, id, creation_type }
        }),
        1 => (admin_caller(), 0u64..=5)
            .prop_map(|(caller, threshold)| Op::SetVouchThreshold { caller, threshold }),
        1 => (admin_caller(), party_index())
            .prop_map(|(caller, collector)| Op::SetFeeCollector { caller, collector }),
        1 => (admin_caller(), prop_oneof![3 => Just(0u128), 1 => 1u128..=3])
            .prop_map(|(caller, fee)| Op::SetRegistrationFee { caller, fee }),
        1 => (admin_caller(), party_index())
            .prop_map(|(caller, admin)| Op::TransferAdmin { caller, admin }),
    ]
}

/// Generate a session of up to `max` operations.
pub fn ops(max: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op(), 1..=max)
}
