//! Benchmarks for filter compilation, SQL rendering and update diffing.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use serde_json::{Value, json};
use tabula::query::{
    AdvancedSearchComposer, DiffEngine, FilterCompiler, QueryParams, Record, WhereInput,
    compute_batch_update,
};
use tabula::schema::{
    AdvancedSearchDescriptor, EntitySchema, FieldDescriptor, FieldKind, FilterDescriptor,
    RelationSpec, SearchKind,
};

/// An entity with one descriptor of every kind.
fn orders() -> EntitySchema {
    EntitySchema::new("orders")
        .field(FieldDescriptor::new("status", FieldKind::Select))
        .field(FieldDescriptor::new("name", FieldKind::Text))
        .field(FieldDescriptor::relation(
            "customer",
            RelationSpec::new("customers", "name"),
        ))
        .field(FieldDescriptor::new("tags", FieldKind::Select).multi_valued())
        .field(FieldDescriptor::new("total", FieldKind::Currency))
        .field(FieldDescriptor::new("shipped_at", FieldKind::Date))
        .field(FieldDescriptor::new("delivered_at", FieldKind::Date))
        .field(FieldDescriptor::new("picked_at", FieldKind::Datetime))
        .field(FieldDescriptor::new("urgent", FieldKind::Boolean))
        .field(FieldDescriptor::new("notes", FieldKind::Textarea))
        .filter(FilterDescriptor::select("status"))
        .filter(FilterDescriptor::select("customer"))
        .filter(FilterDescriptor::select("tags"))
        .filter(FilterDescriptor::number_range("total"))
        .filter(
            FilterDescriptor::date_range("moved")
                .with_related_fields(["shipped_at", "delivered_at"]),
        )
        .filter(FilterDescriptor::checkbox("urgent"))
        .search(AdvancedSearchDescriptor::new("name", SearchKind::Text))
        .search(AdvancedSearchDescriptor::new("total", SearchKind::NumberRange))
}

fn full_params() -> QueryParams {
    QueryParams::from_query_string(
        "filter_status=open&filter_customer=42&filter_tags=red,green,blue\
         &filter_total_min=10&filter_total_max=500&filter_moved_from=2024-01-01\
         &filter_moved_to=2024-03-31&filter_urgent=true\
         &advanced_name=acme&advanced_total_min=5&advanced_logic=OR",
    )
}

fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap_or_default()
}

fn bench_filter_compilation(c: &mut Criterion) {
    let entity = orders();
    let mut group = c.benchmark_group("filter_compilation");

    let single = QueryParams::from([("filter_status", "open")]);
    group.bench_function("single_select", |b| {
        let compiler = FilterCompiler::new(&entity);
        b.iter(|| black_box(compiler.compile(black_box(&single))))
    });

    let params = full_params();
    group.bench_function("all_descriptors", |b| {
        let compiler = FilterCompiler::new(&entity);
        b.iter(|| black_box(compiler.compile(black_box(&params))))
    });

    group.bench_function("quick_plus_advanced_or", |b| {
        let compiler = FilterCompiler::new(&entity);
        let composer = AdvancedSearchComposer::new(&entity);
        b.iter(|| {
            let mut where_input = WhereInput::new();
            compiler.apply(&mut where_input, &params);
            composer.apply(&mut where_input, &params);
            black_box(where_input)
        })
    });

    group.finish();
}

fn bench_rendering(c: &mut Criterion) {
    let entity = orders();
    let params = full_params();
    let mut where_input = WhereInput::new();
    FilterCompiler::new(&entity).apply(&mut where_input, &params);
    AdvancedSearchComposer::new(&entity).apply(&mut where_input, &params);

    let mut group = c.benchmark_group("rendering");
    group.bench_function("to_json", |b| b.iter(|| black_box(where_input.to_json())));
    group.bench_function("to_sql", |b| {
        b.iter(|| black_box(where_input.clone().into_filter().to_sql(0)))
    });
    group.finish();
}

fn bench_diff(c: &mut Criterion) {
    let entity = orders();
    let engine = DiffEngine::new(&entity);
    let original = record(json!({
        "id": 1,
        "status": "open",
        "name": "Acme",
        "customer_id": 42,
        "total": 120.5,
        "shipped_at": "2024-01-02",
        "picked_at": "2024-01-02T09:00:00Z",
        "urgent": false,
        "notes": null,
    }));
    let unchanged = record(json!({
        "status": "open",
        "name": "Acme",
        "customer": "42",
        "total": "120.5",
        "shipped_at": "2024-01-02T00:00:00",
        "picked_at": "2024-01-02T10:00:00+01:00",
        "urgent": "false",
        "notes": "",
    }));
    let changed = record(json!({
        "status": "closed",
        "customer": 7,
        "shipped_at": "2024-01-05",
        "urgent": true,
        "notes": "Leave at gate",
    }));

    let mut group = c.benchmark_group("diff");
    group.bench_function("noop", |b| {
        b.iter(|| black_box(engine.compute(&original, black_box(&unchanged))))
    });
    group.bench_function("five_changes", |b| {
        b.iter(|| black_box(engine.compute(&original, black_box(&changed))))
    });
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let entity = orders();
    let proposed = record(json!({ "status": "closed", "urgent": true, "notes": "" }));

    let mut group = c.benchmark_group("batch");
    for size in [10usize, 100, 1000] {
        let rows: Vec<Record> = (0..size)
            .map(|i| {
                let status = if i % 2 == 0 { "open" } else { "closed" };
                record(json!({ "id": i, "status": status, "urgent": false }))
            })
            .collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &rows, |b, rows| {
            b.iter(|| black_box(compute_batch_update(rows, &proposed, &entity)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_filter_compilation,
    bench_rendering,
    bench_diff,
    bench_batch,
);
criterion_main!(benches);
