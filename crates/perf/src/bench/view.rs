//! View construction and maintenance timings

use crate::report::{BenchEntry, Report};
use crate::utils::*;
use prism_collection::Collection;
use prism_core::{Comparator, Record, Value};
use prism_reactive::Model;
use prism_view::{FilterSpec, SubCollection};
use std::rc::Rc;

pub fn run(report: &mut Report) {
    build(report);
    incremental(report);
    paging(report);
}

fn make_widget(id: usize) -> Rc<Model> {
    Rc::new(
        Model::new()
            .with("id", id as i64)
            .with("awesomeness", (id % 10) as i64)
            .with("sweet", id % 2 == 0),
    )
}

fn make_base(size: usize) -> Collection<Model> {
    let base = Collection::new();
    base.set_comparator(Some(Comparator::field("awesomeness")));
    let _ = base.add_many((0..size).map(make_widget));
    base
}

fn build(report: &mut Report) {
    println!("  View construction:");

    for &size in &SIZES {
        let base = make_base(size);
        let result = measure(ITERATIONS, || {
            SubCollection::new(base.clone(), FilterSpec::new().where_eq("sweet", true).sort_by("id"))
        });
        let throughput = result.throughput(size);
        report.add("View", BenchEntry::new("build sorted", Some(size), result).throughput(throughput));
    }
}

fn incremental(report: &mut Report) {
    println!("  Incremental maintenance:");

    for &size in &SIZES {
        let base = make_base(size);
        let view = SubCollection::new(base.clone(), FilterSpec::new().where_eq("sweet", true).sort_by("id"));

        let result = measure(ITERATIONS * 10, || {
            let widget = make_widget(size);
            let _ = base.add(widget.clone());
            base.remove(&widget)
        });
        report.add(
            "View",
            BenchEntry::new("add + remove", Some(size), result).target_us("<100μs", 100.0),
        );

        let member = base.at(0);
        let result = measure(ITERATIONS * 10, || {
            if let Some(member) = &member {
                let sweet = member.field("sweet") == Some(Value::Boolean(true));
                member.set("sweet", !sweet);
            }
        });
        report.add(
            "View",
            BenchEntry::new("toggle watched", Some(size), result).target_us("<100μs", 100.0),
        );

        tracing::debug!(size, visible = view.len(), "incremental run done");
    }
}

fn paging(report: &mut Report) {
    println!("  Window paging:");

    for &size in &SIZES {
        let base = make_base(size);
        let view = SubCollection::new(base.clone(), FilterSpec::new().sort_by("id").limit(20));

        let mut offset = 0;
        let result = measure(ITERATIONS, || {
            offset = (offset + 20) % size;
            view.set_offset(Some(offset));
        });
        report.add("View", BenchEntry::new("next page", Some(size), result));
    }
}
