//! Facade Tax Benchmarks
//!
//! Measures overhead at each layer:
//! - A0: Core data structure (FxHashMap baseline)
//! - A1: Transport layer (MemoryStore text commands)
//! - B:  Facade layer (typed values through the codec)
//!
//! Run with: cargo bench --bench facade_tax

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use typedkv::{Connection, HashCommands, MemoryStore, StringCommands};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Reading {
    sensor: String,
    celsius: f64,
    tags: Vec<String>,
}

fn reading(i: usize) -> Reading {
    Reading {
        sensor: format!("sensor-{}", i % 64),
        celsius: i as f64 * 0.5,
        tags: vec!["roof".into(), "north".into()],
    }
}

/// A0: Raw HashMap baseline - the theoretical minimum
fn bench_a0_hashmap(c: &mut Criterion) {
    let mut group = c.benchmark_group("facade_tax/A0");
    group.measurement_time(Duration::from_secs(5));

    let mut map: FxHashMap<String, String> = FxHashMap::default();

    group.bench_function("hashmap_insert", |b| {
        let mut i = 0;
        b.iter(|| {
            i += 1;
            map.insert(format!("key{}", i), i.to_string());
        });
    });

    for i in 0..10000 {
        map.insert(format!("read_key{}", i), i.to_string());
    }

    group.bench_function("hashmap_get", |b| {
        let mut i = 0;
        b.iter(|| {
            i = (i + 1) % 10000;
            black_box(map.get(&format!("read_key{}", i)));
        });
    });

    group.finish();
}

/// A1: Transport layer - text in, text out
fn bench_a1_transport(c: &mut Criterion) {
    let mut group = c.benchmark_group("facade_tax/A1");
    group.measurement_time(Duration::from_secs(5));

    let store = MemoryStore::new();

    group.bench_function("transport_set", |b| {
        let mut i = 0;
        b.iter(|| {
            i += 1;
            store.set(&format!("key{}", i), &i.to_string()).unwrap();
        });
    });

    for i in 0..10000 {
        store
            .set(&format!("read_key{}", i), &i.to_string())
            .unwrap();
    }

    group.bench_function("transport_get", |b| {
        let mut i = 0;
        b.iter(|| {
            i = (i + 1) % 10000;
            black_box(store.get(&format!("read_key{}", i)).unwrap());
        });
    });

    group.bench_function("transport_hset", |b| {
        let mut i = 0;
        b.iter(|| {
            i += 1;
            store
                .hset("hash", &format!("field{}", i % 1000), &i.to_string())
                .unwrap();
        });
    });

    group.finish();
}

/// B: Facade layer - typed values through the codec
fn bench_b_facade(c: &mut Criterion) {
    let mut group = c.benchmark_group("facade_tax/B");
    group.measurement_time(Duration::from_secs(5));

    let conn = Connection::new(Arc::new(MemoryStore::new()));

    group.bench_function("facade_set_int", |b| {
        let mut i = 0i64;
        b.iter(|| {
            i += 1;
            conn.values().set(&format!("key{}", i), &i).unwrap();
        });
    });

    for i in 0..10000i64 {
        conn.values().set(&format!("read_key{}", i), &i).unwrap();
    }

    group.bench_function("facade_get_int", |b| {
        let mut i = 0;
        b.iter(|| {
            i = (i + 1) % 10000;
            black_box(conn.values().get::<i64>(&format!("read_key{}", i)).unwrap());
        });
    });

    group.bench_function("facade_hash_put", |b| {
        let mut i = 0i64;
        b.iter(|| {
            i += 1;
            conn.hashes()
                .put("hash", &format!("field{}", i % 1000), &i)
                .unwrap();
        });
    });

    group.finish();
}

/// Direct comparison at each layer
fn bench_layer_comparison(c: &mut Criterion) {
    let mut group = c.benchmark_group("facade_tax/comparison");
    group.measurement_time(Duration::from_secs(10));

    let mut map: FxHashMap<String, String> = FxHashMap::default();
    group.bench_function(BenchmarkId::new("put", "A0_hashmap"), |b| {
        let mut i = 0;
        b.iter(|| {
            i += 1;
            map.insert(format!("key{}", i), i.to_string());
        });
    });

    let store = MemoryStore::new();
    group.bench_function(BenchmarkId::new("put", "A1_transport"), |b| {
        let mut i = 0;
        b.iter(|| {
            i += 1;
            store.set(&format!("key{}", i), &i.to_string()).unwrap();
        });
    });

    let conn = Connection::from_store(MemoryStore::new());
    group.bench_function(BenchmarkId::new("put", "B_facade"), |b| {
        let mut i = 0i64;
        b.iter(|| {
            i += 1;
            conn.values().set(&format!("key{}", i), &i).unwrap();
        });
    });

    group.finish();
}

/// Structured values pay for JSON on every call
fn bench_structured_values(c: &mut Criterion) {
    let mut group = c.benchmark_group("facade_tax/structured");
    group.measurement_time(Duration::from_secs(5));

    let conn = Connection::from_store(MemoryStore::new());
    for i in 0..1000 {
        conn.values().set(&format!("r{}", i), &reading(i)).unwrap();
    }

    group.bench_function("set_struct", |b| {
        let mut i = 0;
        b.iter(|| {
            i = (i + 1) % 1000;
            conn.values().set(&format!("w{}", i), &reading(i)).unwrap();
        });
    });

    group.bench_function("get_struct", |b| {
        let mut i = 0;
        b.iter(|| {
            i = (i + 1) % 1000;
            black_box(conn.values().get::<Reading>(&format!("r{}", i)).unwrap());
        });
    });

    group.bench_function("scan_keys", |b| {
        b.iter(|| black_box(conn.keys("r1*").unwrap().len()));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_a0_hashmap,
    bench_a1_transport,
    bench_b_facade,
    bench_layer_comparison,
    bench_structured_values,
);
criterion_main!(benches);
