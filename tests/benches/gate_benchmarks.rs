//! # Ticket Gate Benchmarks
//!
//! | Path | Target |
//! |------|--------|
//! | HMAC sign + verify | < 10μs |
//! | QR payload decode | < 10μs |
//! | Full verify (decode → ledger commit) | < 100μs in-memory |
//!
//! The door budget is one scan every few seconds, so these mostly guard
//! against accidental regressions in the hot path.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use shared_types::{ManualClock, ScopeId, TicketId, TicketRedemptionRecord};
use std::sync::Arc;
use std::time::Duration;
use tg_01_qr_codes::{
    canonical_message, decode, sign, verify, verify_code, CodeIssuanceApi, CodeIssuer,
    RandomNonceSource, SigningKeyring, SigningSecret,
};
use tg_02_redemption_ledger::{InMemoryRecordStore, LedgerClient};
use tg_03_verification::{VerificationApi, VerificationService};

const T0: u64 = 1_700_000_000;

fn keyring() -> Arc<SigningKeyring> {
    let secret: Vec<u8> = (0..32).map(|_| rand::thread_rng().gen()).collect();
    Arc::new(SigningKeyring::new(SigningSecret::new(secret).unwrap()))
}

fn scope() -> ScopeId {
    ScopeId::new("event-7").unwrap()
}

// ============================================================================
// TG-01: Signing and wire codec
// ============================================================================

fn bench_signing(c: &mut Criterion) {
    let mut group = c.benchmark_group("tg-01-signing");
    group.measurement_time(Duration::from_secs(5));

    let keyring = keyring();
    let issuer = CodeIssuer::new(
        Arc::clone(&keyring),
        Arc::new(ManualClock::new(T0)),
        RandomNonceSource,
    );
    let code = issuer.mint_rotating(TicketId(42), &scope());
    let message = canonical_message(&code.claims);
    let secret = keyring.secret_for(&scope());

    group.bench_function("hmac_sign", |b| b.iter(|| black_box(sign(&message, secret))));
    group.bench_function("hmac_verify", |b| {
        b.iter(|| black_box(verify(&message, secret, &code.signature)))
    });
    group.bench_function("verify_code", |b| {
        b.iter(|| black_box(verify_code(&code, &keyring)))
    });
    group.bench_function("mint_rotating", |b| {
        b.iter(|| black_box(issuer.generate_code(TicketId(42), &scope())))
    });

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("tg-01-codec");

    let issuer = CodeIssuer::new(keyring(), Arc::new(ManualClock::new(T0)), RandomNonceSource);
    let rotating = issuer.generate_code(TicketId(42), &scope());
    let legacy = issuer.generate_static_code(TicketId(42), &scope());

    group.bench_function("decode_rotating", |b| b.iter(|| black_box(decode(&rotating))));
    group.bench_function("decode_legacy", |b| b.iter(|| black_box(decode(&legacy))));
    group.bench_function("decode_garbage", |b| {
        b.iter(|| black_box(decode("{\"ticketId\":\"not-a-number\"}")))
    });

    group.finish();
}

// ============================================================================
// TG-03: Full verification pipeline
// ============================================================================

fn bench_verify_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("tg-03-verification");
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();

    // Each iteration redeems a distinct ticket, so every scan takes the
    // full path through the ledger commit.
    for batch in [1u64, 100] {
        group.throughput(Throughput::Elements(batch));
        group.bench_with_input(BenchmarkId::new("redeem", batch), &batch, |b, &batch| {
            b.iter_batched(
                || {
                    let keyring = keyring();
                    let clock = Arc::new(ManualClock::new(T0));
                    let ledger = LedgerClient::new(InMemoryRecordStore::with_records(
                        (0..batch).map(|i| TicketRedemptionRecord::issued(TicketId(i), scope(), None)),
                    ));
                    let issuer =
                        CodeIssuer::new(Arc::clone(&keyring), Arc::clone(&clock), RandomNonceSource);
                    let codes: Vec<String> = (0..batch)
                        .map(|i| issuer.generate_code(TicketId(i), &scope()))
                        .collect();
                    (VerificationService::new(keyring, ledger, clock), codes)
                },
                |(service, codes)| {
                    rt.block_on(async {
                        for code in &codes {
                            black_box(service.verify(code).await);
                        }
                    })
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }

    let keyring = keyring();
    let clock = Arc::new(ManualClock::new(T0));
    let service = VerificationService::new(
        Arc::clone(&keyring),
        LedgerClient::new(InMemoryRecordStore::new()),
        Arc::clone(&clock),
    );
    let mut forged = CodeIssuer::new(keyring, clock, RandomNonceSource).mint_rotating(TicketId(1), &scope());
    forged.signature[0] ^= 1;
    let forged = tg_01_qr_codes::encode(&forged);
    group.bench_function("reject_forged", |b| {
        b.iter(|| rt.block_on(async { black_box(service.verify(&forged).await) }))
    });

    group.finish();
}

criterion_group!(benches, bench_signing, bench_decode, bench_verify_pipeline);
criterion_main!(benches);
