//! Health Tree Benchmarks — Per-request Hot Path
//!
//! Decoding and flattening run on every /metrics and /healthz request.
//!
//! Run with: cargo bench --bench flatten_bench

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use forwarder_sidecar::domain::health::HealthNode;
use forwarder_sidecar::ports::health_source::HealthDocument;

/// Roughly the shape of a real forwarder health report.
const SAMPLE: &str = r#"{"entry":[{"content":{
    "health":"green",
    "features":{
        "File Monitor Input":{"health":"green","features":{
            "Forwarder Ingestion Latency":{"health":"green"},
            "Ingestion Latency":{"health":"green"},
            "Large and Archive File Reader-0":{"health":"green"},
            "Real-time Reader-0":{"health":"green"}
        }},
        "Splunkd Connection":{"health":"green","features":{
            "TCPOutAutoLB-0":{"health":"green"},
            "TCPOutAutoLB-1":{"health":"yellow","reasons":{"yellow":{"1":{"indicator":"s2s_connections","reason":"slow"}}}}
        }},
        "S2S Port":{"health":"green"}
    }
}}]}"#;

fn bench_decode(c: &mut Criterion) {
    c.bench_function("health_document_decode", |b| {
        b.iter(|| {
            let _doc: HealthDocument = serde_json::from_str(black_box(SAMPLE)).unwrap();
        });
    });
}

fn bench_flatten(c: &mut Criterion) {
    let root: HealthNode = serde_json::from_str::<HealthDocument>(SAMPLE)
        .unwrap()
        .into_root()
        .unwrap();

    c.bench_function("health_tree_flatten", |b| {
        b.iter(|| {
            let _flat = black_box(&root).flatten();
        });
    });
}

criterion_group!(benches, bench_decode, bench_flatten);
criterion_main!(benches);
