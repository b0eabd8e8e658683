//! Float text formatting and parsing under each policy.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sylib_bench::float_samples;
use sylib_core::FloatTextPolicy;
use sylib_core::float_text::{format_float_text, parse_hex_float};

fn bench_format(c: &mut Criterion) {
    let samples = float_samples(1024);
    let mut group = c.benchmark_group("putfloat_text");
    for policy in [FloatTextPolicy::HexMinimal, FloatTextPolicy::Decimal] {
        group.bench_with_input(BenchmarkId::new(policy.as_str(), samples.len()), &samples, |b, samples| {
            b.iter(|| {
                for &v in samples {
                    black_box(format_float_text(v, policy));
                }
            });
        });
    }
    group.finish();
}

fn bench_parse_hex(c: &mut Criterion) {
    let tokens: Vec<String> = float_samples(1024)
        .into_iter()
        .map(|v| format_float_text(v, FloatTextPolicy::HexMinimal))
        .collect();
    c.bench_function("parse_hex_float", |b| {
        b.iter(|| {
            for token in &tokens {
                black_box(parse_hex_float(token.as_bytes()));
            }
        });
    });
}

criterion_group!(benches, bench_format, bench_parse_hex);
criterion_main!(benches);
