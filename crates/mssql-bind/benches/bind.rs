//! Benchmarks for parameter binding and output decoding.

#![allow(clippy::unwrap_used, missing_docs)]

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use mssql_bind::{BindConfig, ParamValue, ParameterSet, SqlDataType, TypedParam, bind_value, unbind};
use std::hint::black_box;

/// Benchmark scalar binding across the inferred families.
fn bench_scalar_bind(c: &mut Criterion) {
    let mut group = c.benchmark_group("scalar_bind");
    let config = BindConfig::default();

    let cases = [
        ("int32", ParamValue::Int32(42)),
        ("bigint", ParamValue::Number(9_007_199_254_740_991.0)),
        ("double", ParamValue::Number(2.75)),
        ("string", ParamValue::from("This is a typical database column value")),
        ("date", ParamValue::date_from_millis(1_705_326_330_500).unwrap()),
    ];
    for (name, value) in &cases {
        group.bench_function(*name, |b| {
            b.iter(|| bind_value(black_box(value), &config).unwrap())
        });
    }

    let numeric = ParamValue::typed(
        TypedParam::new(SqlDataType::Numeric.code(), 12345.6789)
            .precision(18)
            .scale(4),
    );
    group.bench_function("numeric", |b| {
        b.iter(|| bind_value(black_box(&numeric), &config).unwrap())
    });

    group.finish();
}

/// Benchmark column-wise array binding.
fn bench_array_bind(c: &mut Criterion) {
    let mut group = c.benchmark_group("array_bind");
    let config = BindConfig::default();

    for len in [16usize, 256, 4096] {
        let ints = ParamValue::Array((0..len as i32).map(ParamValue::Int32).collect());
        group.throughput(Throughput::Elements(len as u64));
        group.bench_function(format!("int32_{len}"), |b| {
            b.iter(|| bind_value(black_box(&ints), &config).unwrap())
        });

        let strings = ParamValue::Array(
            (0..len)
                .map(|i| ParamValue::String(format!("row-{i}")))
                .collect(),
        );
        group.bench_function(format!("string_{len}"), |b| {
            b.iter(|| bind_value(black_box(&strings), &config).unwrap())
        });
    }

    group.finish();
}

/// Benchmark a full statement's parameter set.
fn bench_parameter_set(c: &mut Criterion) {
    let values = vec![
        ParamValue::Int32(1),
        ParamValue::from("customer"),
        ParamValue::Number(19.99),
        ParamValue::Bool(true),
        ParamValue::Null,
    ];
    c.bench_function("parameter_set_5", |b| {
        b.iter(|| ParameterSet::from_values(black_box(&values), BindConfig::default()).unwrap())
    });
}

/// Benchmark decoding bound values back.
fn bench_unbind(c: &mut Criterion) {
    let mut group = c.benchmark_group("unbind");
    let config = BindConfig::default();

    let string = bind_value(&ParamValue::from("Hello, World!"), &config).unwrap();
    group.bench_function("string", |b| b.iter(|| unbind(black_box(&string)).unwrap()));

    let date = bind_value(&ParamValue::date_from_millis(0).unwrap(), &config).unwrap();
    group.bench_function("date", |b| b.iter(|| unbind(black_box(&date)).unwrap()));

    group.finish();
}

criterion_group!(
    benches,
    bench_scalar_bind,
    bench_array_bind,
    bench_parameter_set,
    bench_unbind,
);
criterion_main!(benches);
