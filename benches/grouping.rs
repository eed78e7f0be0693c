use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use csv_grouper::{Catalog, FileSchema, grouping::partition};
use tempfile::TempDir;

const FAMILIES: usize = 12;

/// Field sets drawn from a handful of overlapping families so that
/// thresholds between 0.5 and 1.0 produce different groupings.
fn synthetic_headers(idx: usize) -> Vec<String> {
    let family = idx % FAMILIES;
    let mut headers: Vec<String> = (0..8).map(|col| format!("f{family}_c{col}")).collect();
    if idx % 3 == 0 {
        headers.push(format!("extra_{}", idx % 5));
    }
    if idx % 4 == 0 {
        headers.push(format!("f{}_c0", (family + 1) % FAMILIES));
    }
    headers
}

fn synthetic_schemas(count: usize) -> Vec<Arc<FileSchema>> {
    (0..count)
        .map(|idx| Arc::new(FileSchema::new(format!("/bench/{idx}.csv"), synthetic_headers(idx))))
        .collect()
}

fn generate_directory(files: usize, rows: usize) -> TempDir {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    for idx in 0..files {
        let path = temp_dir.path().join(format!("file_{idx:04}.csv"));
        write_file(&path, &synthetic_headers(idx), rows);
    }
    temp_dir
}

fn write_file(path: &Path, headers: &[String], rows: usize) {
    let mut file = File::create(path).expect("create csv");
    writeln!(file, "{}", headers.join(",")).expect("header");
    for row in 0..rows {
        let values: Vec<String> = (0..headers.len())
            .map(|col| match col % 3 {
                0 => format!("{}", row + 2),
                1 => format!("{}.{}", row, col),
                _ => format!("2024-01-{:02}", (row % 28) + 1),
            })
            .collect();
        writeln!(file, "{}", values.join(",")).expect("row");
    }
}

fn bench_partition(c: &mut Criterion) {
    let schemas = synthetic_schemas(2_000);
    let mut group = c.benchmark_group("partition");

    for threshold in [1.0, 0.8, 0.5] {
        group.bench_function(format!("threshold_{threshold}"), |b| {
            b.iter_batched(
                || schemas.clone(),
                |input| partition(input, threshold).expect("partition"),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_scan(c: &mut Criterion) {
    let temp_dir = generate_directory(200, 500);
    let mut group = c.benchmark_group("scan");

    group.bench_function("scan_and_group", |b| {
        b.iter(|| {
            let mut catalog = Catalog::default();
            catalog
                .scan_directory(temp_dir.path(), false, "*.csv")
                .expect("scan");
            catalog.group_by_similarity(0.8).expect("group");
        });
    });

    group.finish();
    drop(temp_dir);
}

criterion_group!(benches, bench_partition, bench_scan);
criterion_main!(benches);
