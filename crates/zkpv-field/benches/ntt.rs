use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use zkpv_field::{
    coset::{evaluate_on_coset_pow2, DEFAULT_SHIFT},
    ntt::{forward_ntt_in_place, inverse_ntt_in_place},
    Goldilocks as F,
};

fn lcg_vec(n: usize, seed: u64) -> Vec<F> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            F::from_u64(state)
        })
        .collect()
}

fn bench_transforms(c: &mut Criterion) {
    let mut group = c.benchmark_group("goldilocks_transforms");
    for &k in &[10usize, 14, 16] {
        let n = 1usize << k;
        group.throughput(Throughput::Elements(n as u64));
        let base = lcg_vec(n, 2024);

        group.bench_function(BenchmarkId::new("forward", format!("2^{k}")), |b| {
            b.iter_batched(
                || base.clone(),
                |mut v| {
                    forward_ntt_in_place(black_box(&mut v));
                    v
                },
                BatchSize::LargeInput,
            )
        });

        group.bench_function(BenchmarkId::new("inverse", format!("2^{k}")), |b| {
            b.iter_batched(
                || base.clone(),
                |mut v| {
                    inverse_ntt_in_place(black_box(&mut v));
                    v
                },
                BatchSize::LargeInput,
            )
        });

        // Blowup-8 coset LDE of a polynomial an eighth of the domain size, as the prover does.
        let coeffs = &base[..n / 8];
        group.bench_function(BenchmarkId::new("coset_lde_x8", format!("2^{k}")), |b| {
            b.iter(|| evaluate_on_coset_pow2(black_box(coeffs), k, F::from_u64(DEFAULT_SHIFT)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_transforms);
criterion_main!(benches);
