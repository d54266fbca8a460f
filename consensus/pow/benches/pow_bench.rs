use consensus_core::header::Header;
use consensus_core::{Hash, ZERO_HASH};
use consensus_pow::State;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_header() -> Header {
    let mut header = Header::from_precomputed_hash(ZERO_HASH, vec![Hash::from_le_u64([1, 0, 0, 0])]);
    header.bits = 0x1f00ffff;
    header.timestamp = 1715866200000;
    header.finalize();
    header
}

fn bench_state_creation(c: &mut Criterion) {
    let header = bench_header();
    c.bench_function("pow/state_new", |b| b.iter(|| State::new(black_box(&header))));
}

fn bench_pow_iteration(c: &mut Criterion) {
    let header = bench_header();
    let state = State::new(&header);
    let mut nonce = 0u64;
    c.bench_function("pow/calculate_pow", |b| {
        b.iter(|| {
            nonce = nonce.wrapping_add(1);
            black_box(state.calculate_pow(nonce))
        })
    });
}

criterion_group!(benches, bench_state_creation, bench_pow_iteration);
criterion_main!(benches);
