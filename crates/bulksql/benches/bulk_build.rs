use bulksql::classify::{DriverError, ErrorClassifier};
use bulksql::{BulkUpdate, Insert, Row, Transaction, Upsert, row};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

/// `n` rows of `{id, name, score, active}`.
fn build_rows(n: usize) -> Vec<Row> {
    (0..n as i64)
        .map(|i| {
            row! {
                "id" => i,
                "name" => format!("user{i}"),
                "score" => i * 3,
                "active" => i % 2 == 0,
            }
        })
        .collect()
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk_build/insert");

    for n in [1, 10, 100, 1000] {
        let stmt = Insert::new("users", build_rows(n), true);
        group.bench_with_input(BenchmarkId::from_parameter(n), &stmt, |b, stmt| {
            b.iter(|| black_box(stmt.build()));
        });
    }

    group.finish();
}

fn bench_upsert(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk_build/upsert");

    for n in [1, 10, 100, 1000] {
        let stmt = Upsert::new("users", build_rows(n), ["name", "score"], true);
        group.bench_with_input(BenchmarkId::from_parameter(n), &stmt, |b, stmt| {
            b.iter(|| black_box(stmt.build()));
        });
    }

    group.finish();
}

fn bench_bulk_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk_build/bulk_update");

    for n in [1, 10, 100, 1000] {
        let stmt = BulkUpdate::new("users", "id", build_rows(n), ["name", "score", "active"], true);
        group.bench_with_input(BenchmarkId::from_parameter(n), &stmt, |b, stmt| {
            b.iter(|| black_box(stmt.build()));
        });
    }

    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk_build/classify");
    let classifier = ErrorClassifier::new();

    for depth in [1, 4, 16] {
        let mut err = DriverError::new("Deadlock found when trying to get lock").with_code(1213);
        for i in 1..depth {
            err = DriverError::new(format!("wrapper {i}")).with_source(err);
        }
        group.bench_with_input(BenchmarkId::from_parameter(depth), &err, |b, err| {
            b.iter(|| black_box(classifier.classify(err)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert,
    bench_upsert,
    bench_bulk_update,
    bench_classify
);
criterion_main!(benches);
