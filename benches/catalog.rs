//! Catalog and selection benchmarks
//!
//! Benchmarks for catalog reads and region resolution using criterion

use chrono::{Duration, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use snapcap::*;

fn populated_catalog(dir: &std::path::Path, count: usize, runtime: &tokio::runtime::Runtime) -> CatalogStore {
    let store = CatalogStore::open(dir.join("catalog.json"));
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    runtime.block_on(async {
        for i in 0..count {
            let mut record = ScreenshotRecord::new(
                ScreenshotType::Regional,
                1920,
                1080,
                base + Duration::seconds(i as i64),
            );
            record.title = Some(format!("Screenshot {}", i));
            record.tags = Some(if i % 10 == 0 { "vacation,trip" } else { "work" }.to_string());
            store.add(record).await.unwrap();
        }
    });
    store
}

fn bench_catalog_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog");
    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build().unwrap();

    for count in [10usize, 100, 1000] {
        let dir = tempfile::tempdir().unwrap();
        let store = populated_catalog(dir.path(), count, &runtime);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("list_all", count), &store, |b, store| {
            b.iter(|| runtime.block_on(store.list_all()).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("search", count), &store, |b, store| {
            b.iter(|| runtime.block_on(store.search("vacation")).unwrap())
        });
    }

    group.finish();
}

fn bench_region_resolution(c: &mut Criterion) {
    let monitors = vec![
        DisplayInfo {
            x: -1920,
            is_primary: false,
            ..Default::default()
        },
        DisplayInfo {
            scale_factor: 1.5,
            width: 3840,
            height: 2160,
            ..Default::default()
        },
    ];
    let desktop = VirtualDesktop::from_monitors(monitors).unwrap();

    c.bench_function("selector_drag", |b| {
        b.iter(|| {
            let mut selector = RegionSelector::begin(desktop.clone());
            selector.on_presented();
            let outcome = selector.run((0..50).map(|i| match i {
                0 => SelectorEvent::PointerDown(LogicalPoint::new(2000.0, 100.0)),
                49 => SelectorEvent::PointerUp(LogicalPoint::new(2600.0, 700.0)),
                i => SelectorEvent::PointerMove(LogicalPoint::new(2000.0 + i as f64 * 10.0, 100.0 + i as f64 * 10.0)),
            }));
            criterion::black_box(outcome)
        })
    });
}

criterion_group!(benches, bench_catalog_queries, bench_region_resolution);
criterion_main!(benches);
