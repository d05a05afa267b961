//! Golden vectors for the signed call encoding.
//!
//! Any client that submits calls must produce identical:
//! - signing bytes (SIGN_DOMAIN || canonical envelope without signature)
//! - signature (deterministic Ed25519)
//! - call bytes
//! - call id

use serde::{Deserialize, Serialize};
use signet::core::canonical::{signing_bytes, ID_DOMAIN, SIGN_DOMAIN};
use signet::core::Blake3Hash;
use signet::{
    Amount, Call, ContentId, CreationType, Identity, Keypair, Registration, SignedCall,
};

/// A single golden vector.
#[derive(Debug, Serialize, Deserialize)]
pub struct GoldenVector {
    pub name: String,
    pub caller_seed: String, // 32 bytes hex
    pub caller: String,      // 32 bytes hex (derived)
    pub nonce: u64,
    pub value: String, // 16 bytes big-endian
    pub op: String,

    pub signing_bytes: String,
    pub signature: String, // 64 bytes
    pub call_bytes: String,
    pub call_id: String, // 32 bytes
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn generate_vector(name: &str, seed: [u8; 32], nonce: u64, call: Call) -> GoldenVector {
    generate_paid_vector(name, seed, nonce, Amount::ZERO, call)
}

fn generate_paid_vector(
    name: &str,
    seed: [u8; 32],
    nonce: u64,
    value: Amount,
    call: Call,
) -> GoldenVector {
    let keypair = Keypair::from_seed(&seed);
    let caller = keypair.identity();

    let message = signing_bytes(&caller, nonce, value, &call);
    let op = call.name().to_string();
    let signed = SignedCall::sign_paying(&keypair, nonce, call, value);
    let bytes = signed.to_bytes();

    GoldenVector {
        name: name.to_string(),
        caller_seed: to_hex(&seed),
        caller: caller.to_hex(),
        nonce,
        value: to_hex(&value.to_be_bytes()),
        op,
        signing_bytes: to_hex(&message),
        signature: signed.signature.to_hex(),
        call_bytes: to_hex(&bytes),
        call_id: signed.id().to_hex(),
    }
}

fn generate_all_vectors() -> Vec<GoldenVector> {
    let seed = |b: u8| [b; 32];
    vec![
        generate_vector(
            "register_minimal",
            seed(1),
            1,
            Call::Register(Registration::new("h1", "", CreationType::HumanCreated)),
        ),
        generate_vector(
            "register_full",
            seed(1),
            2,
            Call::Register(
                Registration::new(
                    "at://did:plc:abc/app.bsky.feed.post/3k2a",
                    "https://bsky.app/profile/abc/post/3k2a",
                    CreationType::AiAssisted,
                )
                .platform_source("bluesky")
                .context("sketched by hand, colored with a model"),
            ),
        ),
        generate_paid_vector(
            "register_paid",
            seed(1),
            4,
            Amount::new(2_500),
            Call::Register(Registration::new("h2", "", CreationType::HumanCreated)),
        ),
        generate_vector(
            "register_batch",
            seed(2),
            1,
            Call::RegisterBatch {
                content_id: ContentId::new("batch-0001"),
                content_locator: "ipfs://bafy".into(),
                creation_type: CreationType::Undeclared,
            },
        ),
        generate_vector(
            "vouch",
            seed(3),
            u64::MAX,
            Call::Vouch {
                content_id: ContentId::new("h1"),
            },
        ),
        generate_vector(
            "update_creation_type",
            seed(1),
            3,
            Call::UpdateCreationType {
                content_id: ContentId::new("h1"),
                creation_type: CreationType::AiGenerated,
            },
        ),
        generate_vector(
            "set_fee_collector",
            seed(0),
            1,
            Call::SetFeeCollector {
                collector: Identity::from_bytes([0xfe; 32]),
            },
        ),
        generate_vector(
            "set_registration_fee_large",
            seed(0),
            2,
            Call::SetRegistrationFee {
                fee: Amount::new(u128::MAX),
            },
        ),
        generate_vector(
            "set_vouch_threshold",
            seed(0),
            24,
            Call::SetVouchThreshold { threshold: 24 },
        ),
        generate_vector(
            "transfer_admin",
            seed(0),
            25,
            Call::TransferAdmin {
                admin: Identity::from_bytes([0x11; 32]),
            },
        ),
    ]
}

#[test]
fn test_generate_vectors() {
    let vectors = generate_all_vectors();
    assert_eq!(vectors.len(), 10);

    for v in &vectors {
        assert_eq!(v.caller.len(), 64, "caller width for {}", v.name);
        assert_eq!(v.signature.len(), 128, "signature width for {}", v.name);
        assert_eq!(v.call_id.len(), 64, "call id width for {}", v.name);
        assert_eq!(v.value.len(), 32, "value width for {}", v.name);
        assert!(
            v.signing_bytes.starts_with(&to_hex(SIGN_DOMAIN)),
            "signing bytes must start with the domain for {}",
            v.name
        );
    }
}

#[test]
fn test_vectors_deterministic() {
    let first = generate_all_vectors();
    let second = generate_all_vectors();

    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.signing_bytes, b.signing_bytes, "signing bytes mismatch for {}", a.name);
        assert_eq!(a.signature, b.signature, "signature mismatch for {}", a.name);
        assert_eq!(a.call_bytes, b.call_bytes, "call bytes mismatch for {}", a.name);
        assert_eq!(a.call_id, b.call_id, "call id mismatch for {}", a.name);
    }
}

#[test]
fn test_vectors_are_distinct() {
    let vectors = generate_all_vectors();
    for (i, a) in vectors.iter().enumerate() {
        for b in &vectors[i + 1..] {
            assert_ne!(a.call_id, b.call_id, "{} and {} share an id", a.name, b.name);
        }
    }
}

#[test]
fn test_vectors_verify() {
    for (v, seed) in generate_all_vectors().iter().zip([1u8, 1, 1, 2, 3, 1, 0, 0, 0, 0]) {
        let keypair = Keypair::from_seed(&[seed; 32]);
        assert_eq!(keypair.identity().to_hex(), v.caller, "caller for {}", v.name);

        let bytes: Vec<u8> = (0..v.call_bytes.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&v.call_bytes[i..i + 2], 16).unwrap())
            .collect();
        let signed = SignedCall::from_bytes(&bytes).unwrap();

        assert!(signed.verify().is_ok(), "verify failed for {}", v.name);
        assert_eq!(signed.nonce, v.nonce, "nonce for {}", v.name);
        assert_eq!(
            to_hex(&signed.value.to_be_bytes()),
            v.value,
            "value for {}",
            v.name
        );
        assert_eq!(signed.call.name(), v.op, "op for {}", v.name);
        assert_eq!(signed.id().to_hex(), v.call_id, "id for {}", v.name);
        assert_eq!(
            Blake3Hash::hash_with_domain(ID_DOMAIN, &bytes).to_hex(),
            v.call_id,
            "id derivation for {}",
            v.name
        );
    }
}

#[test]
#[ignore]
fn print_golden_vectors_json() {
    let vectors = generate_all_vectors();
    println!("{}", serde_json::to_string_pretty(&vectors).unwrap());
}

#[test]
fn test_reject_tampered_nonce() {
    let keypair = Keypair::from_seed(&[9; 32]);
    let mut signed = SignedCall::sign(
        &keypair,
        1,
        Call::Vouch {
            content_id: ContentId::new("h1"),
        },
    );
    signed.nonce = 2;
    assert!(signed.verify().is_err());
}

#[test]
fn test_reject_tampered_value() {
    let keypair = Keypair::from_seed(&[9; 32]);
    let mut signed = SignedCall::sign_paying(
        &keypair,
        1,
        Call::Register(Registration::new("h1", "", CreationType::HumanCreated)),
        Amount::new(10),
    );
    signed.value = Amount::new(11);
    assert!(signed.verify().is_err());
}

#[test]
fn test_reject_foreign_signature() {
    let call = Call::SetVouchThreshold { threshold: 1 };
    let mut signed = SignedCall::sign(&Keypair::from_seed(&[4; 32]), 1, call);
    signed.caller = Keypair::from_seed(&[5; 32]).identity();
    assert!(signed.verify().is_err());
}

#[test]
fn test_domain_prefix_exact_bytes() {
    assert_eq!(SIGN_DOMAIN, b"signet/call/v1");
    assert_eq!(SIGN_DOMAIN.len(), 14);

    assert_eq!(ID_DOMAIN, b"signet/call-id/v1");
    assert_eq!(ID_DOMAIN.len(), 17);

    assert!(SIGN_DOMAIN.iter().all(|&b| b != 0));
    assert!(ID_DOMAIN.iter().all(|&b| b != 0));
}
