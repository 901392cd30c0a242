//! Vector primitive benchmarks

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pf_simd::math::{div_approx, exp2_approx, log2_approx, rsqrt_approx};
use pf_simd::Vf32;

fn bench_arithmetic(c: &mut Criterion) {
    let a = Vf32::new(0.1, 0.2, 0.3, 0.4);
    let b = Vf32::new(1.1, 1.2, 1.3, 1.4);
    let k = Vf32::splat(0.997);

    c.bench_function("vf32_mul_add_chain_64", |bench| {
        bench.iter(|| {
            let mut acc = black_box(a);
            for _ in 0..64 {
                acc = acc.mul_add(black_box(k), black_box(b));
            }
            black_box(acc)
        })
    });

    c.bench_function("vf32_sum_h", |bench| {
        bench.iter(|| black_box(black_box(a).sum_h()))
    });
}

fn bench_block_io(c: &mut Criterion) {
    let src = vec![0.25f32; 1024];
    let mut dst = vec![0.0f32; 1024];
    let gain = Vf32::splat(0.5);

    c.bench_function("vf32_block_gain_1024", |bench| {
        bench.iter(|| {
            for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
                (Vf32::from_slice(s) * gain).write_to(d);
            }
            black_box(dst[0])
        })
    });
}

fn bench_approx_math(c: &mut Criterion) {
    let x = Vf32::new(0.5, 1.7, 44.1, 1000.0);

    c.bench_function("log2_approx", |bench| {
        bench.iter(|| black_box(log2_approx(black_box(x))))
    });
    c.bench_function("exp2_approx", |bench| {
        bench.iter(|| black_box(exp2_approx(black_box(x))))
    });
    c.bench_function("rsqrt_approx", |bench| {
        bench.iter(|| black_box(rsqrt_approx(black_box(x))))
    });
    c.bench_function("div_approx", |bench| {
        bench.iter(|| black_box(div_approx(black_box(Vf32::splat(1.0)), black_box(x))))
    });
    c.bench_function("div_exact", |bench| {
        bench.iter(|| black_box(black_box(Vf32::splat(1.0)) / black_box(x)))
    });
}

criterion_group!(benches, bench_arithmetic, bench_block_io, bench_approx_math);
criterion_main!(benches);
