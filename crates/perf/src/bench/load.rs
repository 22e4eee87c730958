//! Bulk loading a base collection under an active view and a nested view.
//!
//! Every item is active and four in five are cool, so the active view takes
//! everything and the cool view, stacked on it, takes most of that.

use crate::report::{BenchEntry, Report};
use crate::utils::*;
use prism_collection::Collection;
use prism_core::{Record, Value};
use prism_reactive::Model;
use prism_view::{FilterSpec, Predicate, SubCollection};
use std::cell::Cell;
use std::rc::Rc;

#[derive(Clone, Copy)]
enum Scenario {
    SetAll,
    AddEach,
    Reset,
}

impl Scenario {
    fn name(self) -> &'static str {
        match self {
            Scenario::SetAll => "set all at once",
            Scenario::AddEach => "add on each item",
            Scenario::Reset => "reset",
        }
    }
}

struct Fixture {
    base: Collection<Model>,
    active: SubCollection<Model>,
    cool: SubCollection<Model>,
    active_calls: Rc<Cell<usize>>,
    cool_calls: Rc<Cell<usize>>,
    items: Vec<Rc<Model>>,
}

/// Predicate on a boolean field that counts its evaluations.
fn counted(field: &'static str, calls: Rc<Cell<usize>>) -> Predicate<Model> {
    Predicate::new(move |item: &Model| {
        calls.set(calls.get() + 1);
        item.field(field) == Some(Value::Boolean(true))
    })
}

fn fixture(scenario: Scenario, seed: u64) -> Fixture {
    let base = Collection::new();
    if let Scenario::Reset = scenario {
        // Previous instances of the same ids, all replaced by the reset.
        let _ = base.add_many(make_items(LOAD_SIZE, seed.wrapping_add(1)));
    }

    let active_calls = Rc::new(Cell::new(0));
    let cool_calls = Rc::new(Cell::new(0));
    let active = SubCollection::new(
        base.clone(),
        FilterSpec::new().predicate(counted("active", active_calls.clone())).watch("active"),
    );
    let cool = SubCollection::new(
        active.clone(),
        FilterSpec::new().predicate(counted("cool", cool_calls.clone())).watch("cool"),
    );
    active_calls.set(0);
    cool_calls.set(0);

    Fixture {
        base,
        active,
        cool,
        active_calls,
        cool_calls,
        items: make_items(LOAD_SIZE, seed),
    }
}

fn load(scenario: Scenario, fixture: &Fixture) {
    let items = fixture.items.iter().cloned();
    let loaded = match scenario {
        Scenario::SetAll => fixture.base.set(items),
        Scenario::AddEach => items.map(|item| fixture.base.add(item).map(|_| ())).collect(),
        Scenario::Reset => fixture.base.reset(items),
    };
    if let Err(err) = loaded {
        tracing::error!(scenario = scenario.name(), %err, "bulk load failed");
    }
}

pub fn run(report: &mut Report) {
    println!("  Bulk load ({} items):", LOAD_SIZE);

    for scenario in [Scenario::SetAll, Scenario::AddEach, Scenario::Reset] {
        // One counted pass for predicate calls and final sizes.
        let counted = fixture(scenario, 7);
        load(scenario, &counted);
        let calls = counted.active_calls.get() + counted.cool_calls.get();
        tracing::info!(
            scenario = scenario.name(),
            active_ran = counted.active_calls.get(),
            cool_ran = counted.cool_calls.get(),
            items = counted.base.len(),
            active = counted.active.len(),
            cool = counted.cool.len(),
            "bulk load"
        );

        let mut seed = 0;
        let result = measure_with_setup(
            ITERATIONS,
            || {
                seed += 1;
                fixture(scenario, seed)
            },
            |fixture| load(scenario, &fixture),
        );
        let throughput = result.throughput(LOAD_SIZE);
        report.add(
            "Bulk load",
            BenchEntry::new(scenario.name(), Some(LOAD_SIZE), result)
                .throughput(throughput)
                .calls(calls),
        );
    }
}
