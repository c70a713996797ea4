use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use jobly::{ColumnAliases, FieldMap, JobFilter, compile_filter, compile_partial_update};

const ALIASES: ColumnAliases = ColumnAliases::new(&[("col0", "column_zero"), ("col3", "column_three")]);

/// A FieldMap with `n` fields: col0 = 0, col1 = 1, ...
fn build_fields(n: usize) -> FieldMap {
    (0..n).map(|i| (format!("col{i}"), i as i64)).collect()
}

fn bench_partial_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("builders/partial_update");

    for n in [1, 5, 10, 50, 100] {
        let fields = build_fields(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &fields, |b, fields| {
            b.iter(|| {
                let mut clause = compile_partial_update(fields.clone(), &ALIASES).unwrap();
                black_box(clause.push_bind(1_i32));
                black_box(clause);
            });
        });
    }

    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("builders/filter");

    let cases = [
        ("empty", JobFilter::new()),
        ("salary", JobFilter::new().min_salary(50_000)),
        (
            "all",
            JobFilter::new()
                .min_salary(50_000)
                .has_equity(true)
                .title("engineer"),
        ),
    ];

    for (name, filter) in cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), &filter, |b, filter| {
            b.iter(|| black_box(compile_filter(filter)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_partial_update, bench_filter);
criterion_main!(benches);
