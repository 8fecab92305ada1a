use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pwrkit_stats::distribution::{Distribution, NoncentralF, NoncentralT};
use pwrkit_stats::{
    pwr_anova_test, pwr_chisq_test, pwr_r_test, pwr_t2n_test, pwr_t_test, Alternative, TTestKind,
};

fn bench_distributions(c: &mut Criterion) {
    let mut group = c.benchmark_group("distribution");

    let nct = NoncentralT::new(126.0, 2.8).unwrap();
    group.bench_function("noncentral_t_sf", |b| b.iter(|| nct.sf(black_box(1.98))));

    let small = NoncentralF::new(3.0, 96.0, 6.25).unwrap();
    group.bench_function("noncentral_f_sf_small_lambda", |b| {
        b.iter(|| small.sf(black_box(2.7)))
    });

    let large = NoncentralF::new(3.0, 4000.0, 5000.0).unwrap();
    group.bench_function("noncentral_f_sf_large_lambda", |b| {
        b.iter(|| large.sf(black_box(2.6)))
    });

    group.finish();
}

fn bench_forward(c: &mut Criterion) {
    let mut group = c.benchmark_group("power");

    group.bench_function("t_two_sample", |b| {
        b.iter(|| {
            pwr_t_test(
                Some(black_box(64.0)),
                Some(0.5),
                Some(0.05),
                None,
                TTestKind::TwoSample,
                Alternative::TwoSided,
            )
        })
    });

    group.bench_function("anova", |b| {
        b.iter(|| pwr_anova_test(Some(4.0), Some(black_box(25.0)), Some(0.25), Some(0.05), None))
    });

    group.finish();
}

fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve");

    group.bench_function("t_sample_size", |b| {
        b.iter(|| {
            pwr_t_test(
                None,
                Some(black_box(0.5)),
                Some(0.05),
                Some(0.8),
                TTestKind::TwoSample,
                Alternative::TwoSided,
            )
        })
    });

    group.bench_function("t2n_second_size", |b| {
        b.iter(|| {
            pwr_t2n_test(
                Some(1000.0),
                None,
                Some(black_box(0.5)),
                Some(0.05),
                Some(0.9),
                Alternative::TwoSided,
            )
        })
    });

    group.bench_function("r_effect_size", |b| {
        b.iter(|| {
            pwr_r_test(
                Some(100.0),
                None,
                Some(0.05),
                Some(black_box(0.8)),
                Alternative::TwoSided,
            )
        })
    });

    group.bench_function("chisq_sig_level", |b| {
        b.iter(|| pwr_chisq_test(Some(0.25), Some(300.0), 30.0, None, Some(black_box(0.8))))
    });

    group.finish();
}

criterion_group!(benches, bench_distributions, bench_forward, bench_solve);
criterion_main!(benches);
