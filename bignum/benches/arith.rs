use bignum::{BigInt, DivScratch, MulConfig};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Deterministic value with `limbs` pseudo-random limbs.
fn value(limbs: usize, seed: u64) -> BigInt {
    let mut s = seed | 1;
    let mut raw = vec![limbs as u32];
    raw.extend((0..limbs).map(|_| {
        s ^= s << 13;
        s ^= s >> 7;
        s ^= s << 17;
        s as u32 | 1
    }));
    BigInt::from_raw(raw)
}

fn bench_mul(c: &mut Criterion) {
    let mut group = c.benchmark_group("mul");
    let schoolbook = {
        let mut cfg = MulConfig::default();
        cfg.karatsuba_threshold = usize::MAX;
        cfg.parallel_threshold = usize::MAX;
        cfg
    };
    let serial = {
        let mut cfg = MulConfig::default();
        cfg.parallel_threshold = usize::MAX;
        cfg
    };
    let parallel = MulConfig::default();

    for limbs in [16usize, 128, 512, 2048] {
        let a = value(limbs, 1);
        let b = value(limbs, 2);
        for (name, cfg) in [("schoolbook", &schoolbook), ("karatsuba", &serial), ("default", &parallel)] {
            group.bench_with_input(BenchmarkId::new(name, limbs), &limbs, |bench, _| {
                bench.iter(|| {
                    let mut x = a.clone();
                    x.mul_with(black_box(&b), cfg).unwrap();
                    x
                })
            });
        }
    }
    group.finish();
}

fn bench_div(c: &mut Criterion) {
    let mut group = c.benchmark_group("div");
    let mut scratch = DivScratch::new();
    for (n, d) in [(64usize, 1usize), (64, 2), (256, 64), (1024, 512)] {
        let a = value(n, 3);
        let b = value(d, 4);
        group.bench_function(BenchmarkId::new("rem_with", format!("{n}/{d}")), |bench| {
            bench.iter(|| {
                let mut x = a.clone();
                x.rem_with(black_box(&b), &mut scratch);
                x
            })
        });
    }
    group.finish();
}

fn bench_decimal(c: &mut Criterion) {
    let mut group = c.benchmark_group("decimal");
    for limbs in [4usize, 64, 512] {
        let v = value(limbs, 5);
        let text = v.to_string();
        group.bench_with_input(BenchmarkId::new("to_string", limbs), &v, |bench, v| {
            bench.iter(|| black_box(v).to_string())
        });
        group.bench_with_input(BenchmarkId::new("parse", limbs), &text, |bench, text| {
            bench.iter(|| BigInt::parse_decimal(black_box(text)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_mul, bench_div, bench_decimal);
criterion_main!(benches);
