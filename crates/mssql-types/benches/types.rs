//! Benchmarks for native value encoding and decoding.

#![allow(clippy::unwrap_used, missing_docs)]

use chrono::{DateTime, Utc};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use mssql_types::{
    ParamValue, decode_utf16_string, encode_decimal, encode_utf16, from_timestamp_offset_struct,
    numeric_to_f64, to_timestamp_offset_struct,
};
use std::hint::black_box;

/// Benchmark UTF-16 string encoding (Rust String → SQL_C_WCHAR units).
fn bench_utf16_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("utf16_encode");

    let cases = [
        ("short", "Hello"),
        ("medium", "This is a typical database column value with some content"),
        ("unicode", "日本語テスト文字列 émoji et accénts"),
    ];
    for (name, s) in cases {
        group.throughput(Throughput::Bytes(s.len() as u64));
        group.bench_function(name, |b| b.iter(|| encode_utf16(black_box(s), None)));
    }

    let long = "Lorem ipsum dolor sit amet. ".repeat(64);
    group.throughput(Throughput::Bytes(long.len() as u64));
    group.bench_function("long_capped", |b| {
        b.iter(|| encode_utf16(black_box(&long), Some(4000)))
    });

    group.finish();
}

/// Benchmark UTF-16 decoding of a NUL-padded output buffer.
fn bench_utf16_decode(c: &mut Criterion) {
    let mut units = encode_utf16("This is a typical database column value", None);
    units.resize(256, 0);
    c.bench_function("utf16_decode_padded", |b| {
        b.iter(|| decode_utf16_string(black_box(&units)).unwrap())
    });
}

/// Benchmark timestamp-with-offset conversion both ways.
fn bench_timestamp_offset(c: &mut Criterion) {
    let mut group = c.benchmark_group("timestamp_offset");
    let at: DateTime<Utc> = DateTime::from_timestamp_millis(1_705_326_330_500).unwrap();

    group.bench_function("encode", |b| {
        b.iter(|| to_timestamp_offset_struct(black_box(at), black_box(-300)).unwrap())
    });

    let ts = to_timestamp_offset_struct(at, -300).unwrap();
    group.bench_function("decode", |b| {
        b.iter(|| from_timestamp_offset_struct(black_box(&ts)).unwrap())
    });

    group.finish();
}

/// Benchmark decimal encoding with and without a requested scale.
fn bench_decimal(c: &mut Criterion) {
    let mut group = c.benchmark_group("decimal");

    group.bench_function("natural_scale", |b| {
        b.iter(|| encode_decimal(black_box(12345.6789), None, None).unwrap())
    });
    group.bench_function("fixed_scale", |b| {
        b.iter(|| encode_decimal(black_box(12345.6789), Some(18), Some(2)).unwrap())
    });

    let (numeric, _, _) = encode_decimal(12345.6789, None, None).unwrap();
    group.bench_function("to_f64", |b| b.iter(|| numeric_to_f64(black_box(&numeric)).unwrap()));

    group.finish();
}

/// Benchmark host-style coercions.
fn bench_coerce(c: &mut Criterion) {
    let mut group = c.benchmark_group("coerce");

    let text = ParamValue::from(" 42.5 ");
    group.bench_function("text_to_f64", |b| b.iter(|| black_box(&text).to_f64().unwrap()));

    let number = ParamValue::Number(1234.5);
    group.bench_function("number_to_text", |b| {
        b.iter(|| black_box(&number).to_text().unwrap())
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_utf16_encode,
    bench_utf16_decode,
    bench_timestamp_offset,
    bench_decimal,
    bench_coerce,
);
criterion_main!(benches);
