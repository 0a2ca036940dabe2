use criterion::black_box;
use criterion::Criterion;
use criterion::{criterion_group, criterion_main};
use mtgp::kernel::{ConvolutionIntegrator, Smoothness};
use mtgp::misc::QuadTolerance;

fn bench_convolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("Convolution integral");
    let pairs = [
        ("SE x SE", Smoothness::SquaredExponential, Smoothness::SquaredExponential),
        ("5/2 x 7/2", Smoothness::Matern52, Smoothness::Matern72),
        ("SE x 1.5", Smoothness::SquaredExponential, Smoothness::GeneralMatern(1.5)),
        ("4.5 x 4.5", Smoothness::GeneralMatern(4.5), Smoothness::GeneralMatern(4.5)),
    ];
    for (name, first, second) in pairs {
        let conv = ConvolutionIntegrator::new(first, second, QuadTolerance::default());
        group.bench_function(name, |b| {
            b.iter(|| black_box(conv.integrate(1.3, 0.7, 2.1).unwrap()))
        });
    }
}

criterion_group!(convolution_benches, bench_convolution);
criterion_main!(convolution_benches);
