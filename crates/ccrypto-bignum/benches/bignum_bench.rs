//! Big-number benchmarks.
//!
//! Run with: cargo bench -p ccrypto-bignum

use ccrypto_bignum::{reducer_for, BigInt};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_arith(c: &mut Criterion) {
    let mut group = c.benchmark_group("bignum");

    for size in [256, 512, 1024, 2048, 4096] {
        let bytes = vec![0xFFu8; size / 8];
        let a = BigInt::from_bytes_be(&bytes);
        let b = BigInt::from_bytes_be(&bytes[..size / 16]);

        group.bench_with_input(BenchmarkId::new("mul", size), &size, |bench, _| {
            bench.iter(|| a.mul(&a));
        });

        group.bench_with_input(BenchmarkId::new("add", size), &size, |bench, _| {
            bench.iter(|| a.add(&a));
        });

        group.bench_with_input(BenchmarkId::new("divmod", size), &size, |bench, _| {
            bench.iter(|| a.divmod(&b));
        });

        group.bench_with_input(BenchmarkId::new("to_radix10", size), &size, |bench, _| {
            bench.iter(|| a.to_radix(10));
        });
    }

    group.finish();
}

fn bench_exp(c: &mut Criterion) {
    let mut group = c.benchmark_group("mod_exp");
    group.sample_size(20);

    for size in [256usize, 1024, 2048] {
        // 2^size - 1 is odd, so this measures the Montgomery path.
        let m = BigInt::from_u64(1).shl(size).sub(&BigInt::from_u64(1));
        let base = BigInt::from_u64(0x1234_5678_9abc_def1);
        let exp = m.shr(1);
        let reducer = reducer_for(&m).unwrap();

        group.bench_with_input(BenchmarkId::new("montgomery", size), &size, |bench, _| {
            bench.iter(|| reducer.exp_mod(&base, &exp));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_arith, bench_exp);
criterion_main!(benches);
