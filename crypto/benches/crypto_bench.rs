use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use poaw_crypto::{sha256, CanonicalEncoder};
use poaw_types::BlockHash;

fn sha256_bench(c: &mut Criterion) {
    let data = [42u8; 1024];
    c.bench_function("sha256_1KiB", |b| b.iter(|| sha256(black_box(&data))));
}

fn block_digest_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("block_digest");
    let previous = BlockHash::new([7u8; 32]);
    for tx_count in [0usize, 10, 100] {
        group.bench_with_input(BenchmarkId::new("txs", tx_count), &tx_count, |b, &n| {
            b.iter(|| {
                let mut enc = CanonicalEncoder::new(b"poaw-bench");
                enc.put_u64(black_box(12)).put_u64(1_700_000_000).put_u64(n as u64);
                for i in 0..n {
                    enc.put_str("alice").put_str("bob").put_f64(i as f64 * 0.5).put_u64(i as u64);
                }
                enc.put_hash(&previous)
                    .put_optional_bytes(Some(&[1u8; 256]))
                    .put_optional_bytes(Some(&[2u8; 64]))
                    .put_str("bench-node");
                enc.finish()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, sha256_bench, block_digest_bench);
criterion_main!(benches);
