//! # Registration Ledger Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | rl-01 Hash Chain | digest of one link, verification of a chain |
//! | rl-02 Verification Code | candidate generation, QR rendering |
//! | rl-04 Registration | full register pipeline, in-memory adapters |

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rl_01_hash_chain::{compute_link, verify_chain, ChainLink};
use rl_02_verification_code::{CodeGenerator, QrEncoder};
use rl_tests::fixtures::{sent_invoice, Ledger};
use rl_04_registration::RegistrationApi;
use shared_types::{InvoiceId, IssuerConfig, IssuerId};

fn config() -> IssuerConfig {
    IssuerConfig::new("B12345678", "Acme Servicios SL").with_enabled(true)
}

fn build_chain(len: usize) -> Vec<ChainLink> {
    let config = config();
    let start = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
    let mut links: Vec<ChainLink> = Vec::with_capacity(len);
    for i in 0..len {
        let previous = links.last().map(|l| l.digest);
        let invoice = sent_invoice(&format!("inv-{}", i));
        let at = start + Duration::milliseconds(i as i64);
        links.push(compute_link(&invoice, &config, previous.as_ref(), at).unwrap());
    }
    links
}

fn bench_hash_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("rl-01-hash-chain");
    let config = config();
    let invoice = sent_invoice("inv-1");
    let at = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();

    group.bench_function("compute_link", |b| {
        b.iter(|| compute_link(black_box(&invoice), &config, None, at).unwrap())
    });

    for len in [100, 1_000] {
        let chain = build_chain(len);
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::new("verify_chain", len), &chain, |b, chain| {
            b.iter(|| verify_chain(black_box(chain)).is_ok())
        });
    }
    group.finish();
}

fn bench_verification_code(c: &mut Criterion) {
    let mut group = c.benchmark_group("rl-02-verification-code");
    let generator = CodeGenerator::default();
    let issuer = IssuerId::new("B12345678");
    let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();

    group.bench_function("candidate", |b| {
        b.iter(|| generator.candidate(black_box(date), &issuer).unwrap())
    });

    let encoder = QrEncoder::default();
    let url = "https://prewww2.aeat.es/wlpl/TIKE-CONT/ValidarQR?csv=20260115-B12345678-ABCD-1234";
    group.bench_function("qr_encode", |b| b.iter(|| encoder.encode(black_box(url))));
    group.finish();
}

fn bench_register_pipeline(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let ledger = Ledger::enabled();
    let mut next = 0u64;

    c.bench_function("rl-04-register", |b| {
        b.iter(|| {
            next += 1;
            let id = format!("bench-{}", next);
            runtime.block_on(async {
                ledger.service.upsert_invoice(sent_invoice(&id)).await.unwrap();
                ledger.service.register(&InvoiceId::new(id)).await.unwrap()
            })
        })
    });
}

criterion_group!(
    benches,
    bench_hash_chain,
    bench_verification_code,
    bench_register_pipeline
);
criterion_main!(benches);
