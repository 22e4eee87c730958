//! Benchmarks for prism-view.
//!
//! Target: single record incremental update well under a full rebuild.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use prism_collection::Collection;
use prism_core::{Comparator, Record, Value};
use prism_reactive::Model;
use prism_view::{FilterSpec, SubCollection};
use std::rc::Rc;

fn make_widget(id: i64) -> Rc<Model> {
    Rc::new(
        Model::new()
            .with("id", id)
            .with("awesomeness", id % 10)
            .with("sweet", id % 2 == 0),
    )
}

fn make_base(size: i64) -> Collection<Model> {
    Collection::builder()
        .comparator(Comparator::field("awesomeness"))
        .models((0..size).map(make_widget))
        .build()
        .unwrap()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for size in [100, 1000, 10000] {
        let base = make_base(size);
        group.bench_with_input(BenchmarkId::new("where_sweet", size), &base, |b, base| {
            b.iter(|| SubCollection::new(base.clone(), FilterSpec::new().where_eq("sweet", true)))
        });
        group.bench_with_input(BenchmarkId::new("sorted_window", size), &base, |b, base| {
            b.iter(|| SubCollection::new(base.clone(), FilterSpec::new().sort_by("id").offset(10).limit(50)))
        });
    }

    group.finish();
}

fn bench_incremental(c: &mut Criterion) {
    let mut group = c.benchmark_group("incremental");

    for size in [100, 1000, 10000] {
        let base = make_base(size);
        let view = SubCollection::new(base.clone(), FilterSpec::new().where_eq("sweet", true));

        // Add then remove, so the base stays the same size
        group.bench_with_input(BenchmarkId::new("add_remove", size), &size, |b, &size| {
            b.iter(|| {
                let widget = make_widget(size);
                base.add(widget.clone()).unwrap();
                base.remove(black_box(&widget));
            })
        });

        let member = base.at(0).unwrap();
        group.bench_with_input(BenchmarkId::new("toggle_watched", size), &member, |b, member| {
            b.iter(|| {
                let sweet = member.field("sweet") == Some(Value::Boolean(true));
                member.set("sweet", !sweet);
            })
        });

        black_box(view.len());
    }

    group.finish();
}

fn bench_sorted_incremental(c: &mut Criterion) {
    let mut group = c.benchmark_group("incremental/sorted");

    for size in [100, 1000, 10000] {
        let base = make_base(size);
        let view = SubCollection::new(base.clone(), FilterSpec::new().sort_by("id").limit(100));

        group.bench_with_input(BenchmarkId::new("add_remove_front", size), &size, |b, _| {
            b.iter(|| {
                let widget = make_widget(-1);
                base.add(widget.clone()).unwrap();
                base.remove(black_box(&widget));
            })
        });

        let member = base.at(base.len() / 2).unwrap();
        let mut rank = 0i64;
        group.bench_function(BenchmarkId::new("unwatched_change", size), |b| {
            b.iter(|| {
                rank = (rank + 7) % 10;
                member.set("awesomeness", rank);
            })
        });

        black_box(view.len());
    }

    group.finish();
}

fn bench_reconfigure(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconfigure");

    for size in [100, 1000, 10000] {
        let base = make_base(size);
        let view = SubCollection::new(base.clone(), FilterSpec::new().sort_by("id").limit(20));

        let mut offset = 0;
        group.bench_function(BenchmarkId::new("page", size), |b| {
            b.iter(|| {
                offset = (offset + 20) % 200;
                view.set_offset(Some(offset));
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_incremental,
    bench_sorted_incremental,
    bench_reconfigure,
);
criterion_main!(benches);
