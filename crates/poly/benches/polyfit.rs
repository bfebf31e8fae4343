use criterion::{black_box, criterion_group, criterion_main, Criterion};
use linfa::prelude::Fit;
use lsqfit_poly::{LstsqMethod, MonomialBasis, PolynomialFit};
use lsqfit_synth::SyntheticPolynomial;
use ndarray::array;
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

fn criterion_polyfit(c: &mut Criterion) {
    let nts = vec![100, 1000, 10000];
    let methods = [
        LstsqMethod::Svd,
        LstsqMethod::Qr,
        LstsqMethod::NormalEquations,
    ];

    let mut group = c.benchmark_group("polyfit");
    for nt in nts {
        let dataset = SyntheticPolynomial::new(array![-2.0, 0.25, 1.0, 0.1])
            .with_rng(Xoshiro256Plus::seed_from_u64(42))
            .sample_dataset(nt);
        for method in methods {
            group.bench_function(format!("polyfit {} {}", method, nt), |b| {
                b.iter(|| {
                    black_box(
                        PolynomialFit::<f64, MonomialBasis>::params(MonomialBasis(3))
                            .method(method)
                            .fit(&dataset)
                            .expect("Polynomial fitted"),
                    );
                });
            });
        }
    }
    group.finish();
}

criterion_group!(benches, criterion_polyfit);
criterion_main!(benches);
