#![allow(missing_docs)]
use criterion::{Criterion, criterion_group, criterion_main};
use guardian_afk_utils::random::MonumentRandom;
use std::hint::black_box;

fn bench_from_seed(c: &mut Criterion) {
    c.bench_function("monument_random from_seed", |b| {
        b.iter(|| {
            black_box(MonumentRandom::from_seed(black_box(12345)));
        });
    });
}

fn bench_next_i32_bounded_power_of_two(c: &mut Criterion) {
    let mut rng = MonumentRandom::from_seed(0);
    c.bench_function("monument_random next_i32_bounded(32)", |b| {
        b.iter(|| {
            black_box(rng.next_i32_bounded(black_box(32)));
        });
    });
}

fn bench_next_i32_bounded_rejection(c: &mut Criterion) {
    let mut rng = MonumentRandom::from_seed(0);
    c.bench_function("monument_random next_i32_bounded(27)", |b| {
        b.iter(|| {
            black_box(rng.next_i32_bounded(black_box(27)));
        });
    });
}

fn bench_triangular(c: &mut Criterion) {
    let mut rng = MonumentRandom::from_seed(0);
    c.bench_function("monument_random triangular(27)", |b| {
        b.iter(|| {
            black_box(rng.triangular(black_box(27)));
        });
    });
}

fn bench_region_seed_and_two_draws(c: &mut Criterion) {
    c.bench_function("monument_random region candidate (seed + 2 draws)", |b| {
        b.iter(|| {
            let mut rng = MonumentRandom::from_seed(black_box(-141));
            black_box(rng.triangular(27));
            black_box(rng.triangular(27));
        });
    });
}

criterion_group!(
    benches,
    bench_from_seed,
    bench_next_i32_bounded_power_of_two,
    bench_next_i32_bounded_rejection,
    bench_triangular,
    bench_region_seed_and_two_draws,
);
criterion_main!(benches);
