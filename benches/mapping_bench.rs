#![allow(clippy::unwrap_used, clippy::uninlined_format_args)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hyper_tag::{MappingOptions, Nesting, TagMapped, TagMapper, TypeRegistry};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(TagMapped, Default, Clone)]
struct Order {
    id: u64,
    customer: String,
    lines: Vec<Line>,
    totals: Vec<f64>,
    attributes: HashMap<String, String>,
    note: Option<String>,
}

#[derive(TagMapped, Default, Clone)]
struct Line {
    sku: String,
    quantity: u32,
    price: f64,
}

fn sample_order(lines: usize) -> Order {
    Order {
        id: 7,
        customer: "ACME".into(),
        lines: (0..lines)
            .map(|i| Line {
                sku: format!("SKU-{}", i),
                quantity: i as u32,
                price: i as f64 * 1.25,
            })
            .collect(),
        totals: vec![1.0; lines],
        attributes: [("channel".to_string(), "web".to_string())].into(),
        note: None,
    }
}

fn bench_mapping(c: &mut Criterion) {
    let mut group = c.benchmark_group("mapping");

    for nesting in [Nesting::Embedded, Nesting::Boxed] {
        let mapper = TagMapper::with_registry(Arc::new(TypeRegistry::new()))
            .with_options(MappingOptions::raising().with_nesting(nesting));

        for &lines in &[1usize, 100] {
            let order = sample_order(lines);
            let tag = mapper.serialize(&order).unwrap().unwrap();
            let bytes = mapper.serialize_to_bytes(&order).unwrap().unwrap();

            group.bench_function(format!("serialize_{:?}_{}", nesting, lines), |b| {
                b.iter(|| mapper.serialize(black_box(&order)).unwrap())
            });
            group.bench_function(format!("deserialize_{:?}_{}", nesting, lines), |b| {
                b.iter(|| mapper.deserialize::<Order>(black_box(&tag)).unwrap())
            });
            group.bench_function(format!("bytes_roundtrip_{:?}_{}", nesting, lines), |b| {
                b.iter(|| mapper.deserialize_from_bytes::<Order>(black_box(&bytes)).unwrap())
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_mapping);
criterion_main!(benches);
