//! Vouching and signed-call benchmarks.
//!
//! Run with: `cargo bench -p signet-testkit --bench vouch`

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};

use signet_core::{
    plan_vouch, AccessConfig, Call, ContentId, ContentRecord, CreationType, SignedCall,
    VerificationStatus,
};
use signet_testkit::{parties, party, TestFixture};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create Tokio runtime")
}

fn bench_plan_vouch(c: &mut Criterion) {
    let creator = party(1).identity();
    let voucher = party(2).identity();
    let config = AccessConfig::genesis(party(0).identity());
    let id = ContentId::new("h1");
    let record = ContentRecord {
        creator,
        content_id: id.clone(),
        creation_type: CreationType::HumanCreated,
        status: VerificationStatus::SelfAttested,
        registered_at: 1,
        vouch_count: 2,
        ..Default::default()
    };

    c.bench_function("plan_vouch", |b| {
        b.iter(|| plan_vouch(&config, black_box(&record), &id, false, &voucher).unwrap())
    });
}

fn bench_signed_call(c: &mut Criterion) {
    let keypair = party(3);
    let call = Call::Vouch {
        content_id: ContentId::new("at://did:plc:bench/app.bsky.feed.post/3k2a"),
    };
    let signed = SignedCall::sign(&keypair, 7, call.clone());
    let bytes = signed.to_bytes();

    let mut group = c.benchmark_group("signed_call");
    group.throughput(Throughput::Elements(1));
    group.bench_function("sign", |b| {
        b.iter(|| SignedCall::sign(&keypair, 7, black_box(call.clone())))
    });
    group.bench_function("decode_verify", |b| {
        b.iter(|| {
            let decoded = SignedCall::from_bytes(black_box(&bytes)).unwrap();
            decoded.verify().unwrap();
        })
    });
    group.finish();
}

fn bench_registry_vouch(c: &mut Criterion) {
    let rt = runtime();
    let people = parties(4);

    let mut group = c.benchmark_group("registry");
    group.throughput(Throughput::Elements(1));
    group.bench_function("promoting_vouch", |b| {
        b.iter_batched(
            || {
                rt.block_on(async {
                    let mut fixture = TestFixture::new().await;
                    fixture.register_human(&people[0], "h1").await;
                    fixture.vouch_all("h1", &people[1..3]).await;
                    fixture
                })
            },
            |mut fixture| {
                rt.block_on(async {
                    fixture
                        .registry
                        .vouch(&people[3], ContentId::new("h1"))
                        .await
                        .unwrap()
                })
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_plan_vouch,
    bench_signed_call,
    bench_registry_vouch
);
criterion_main!(benches);
