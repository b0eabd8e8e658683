//! Console read/write benchmarks.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use sylib_bench::int_array_text;
use sylib_core::{FloatTextPolicy, FormatArg, Runtime};

fn bench_read_int_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("getarray");
    for &size in &[16usize, 256, 4096] {
        let text = int_array_text(size);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("runtime", size), &text, |b, text| {
            let mut buffer = vec![0; size];
            b.iter(|| {
                let mut rt =
                    Runtime::with_policy(text.as_bytes(), Vec::new(), FloatTextPolicy::Decimal);
                black_box(rt.read_int_array(&mut buffer));
            });
        });
    }
    group.finish();
}

fn bench_write_int_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("putarray");
    for &size in &[16usize, 256, 4096] {
        let values: Vec<i32> = (0..size as i32).map(|i| i * 7919 - 40_000).collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("runtime", size), &values, |b, values| {
            b.iter(|| {
                let mut rt = Runtime::with_policy(&b""[..], Vec::new(), FloatTextPolicy::Decimal);
                rt.write_int_array(values.len() as i32, values);
                black_box(rt.into_output());
            });
        });
    }
    group.finish();
}

fn bench_putf(c: &mut Criterion) {
    let args = [
        FormatArg::SignedInt(-12345),
        FormatArg::Str(b"label"),
        FormatArg::Float(3.25),
        FormatArg::UnsignedInt(0xdead_beef),
    ];
    c.bench_function("putf_mixed", |b| {
        b.iter(|| {
            let mut rt = Runtime::with_policy(&b""[..], Vec::new(), FloatTextPolicy::HexMinimal);
            black_box(rt.write_formatted(black_box(b"%8d %-10s %.3f %#x\n"), &args));
        });
    });
}

criterion_group!(benches, bench_read_int_array, bench_write_int_array, bench_putf);
criterion_main!(benches);
