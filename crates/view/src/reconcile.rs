//! Incremental reconciliation of source events.
//!
//! `decide` classifies a source event against the current view state, and
//! `plan` turns the classification into either a localized `Patch` or a
//! request for a full materialization. Both only read state; the view
//! commits the result afterwards.

use crate::materialize::SortCheck;
use crate::state::{Patch, ViewState};
use alloc::rc::Rc;
use core::cmp::Ordering;
use hashbrown::HashSet;
use prism_collection::Source;
use prism_core::{Cid, Event, Record};

/// What a source event means for a view.
#[derive(Debug)]
pub enum Action<M> {
    /// Membership and order are unaffected.
    Ignore,
    /// Recompute from the source.
    Materialize(SortCheck),
    /// The record should enter the view.
    Insert(Rc<M>),
    /// The record should leave the view.
    Remove(Rc<M>),
    /// The record stays but its position may have changed.
    Reposition(Rc<M>),
}

/// How to bring the view up to date.
#[derive(Debug)]
pub enum Plan<M> {
    Nothing,
    Materialize(SortCheck),
    Patch(Patch<M>, SortCheck),
}

/// Classifies a source event.
pub fn decide<M: Record + 'static>(state: &ViewState<M>, event: &Event<M>) -> Action<M> {
    match event {
        Event::PropertyChanged { record, field } if state.spec.cares_about(field) => {
            let was = state.indexes.contains(record);
            let now = state.spec.predicates.test(record);
            tracing::trace!(cid = record.cid(), field = field.as_str(), was, now, "re-testing membership");
            match (was, now) {
                (true, false) => Action::Remove(record.clone()),
                (false, true) => Action::Insert(record.clone()),
                (true, true) if state.spec.comparator.is_some() => Action::Reposition(record.clone()),
                _ => Action::Ignore,
            }
        }
        Event::Add(record) => {
            if state.indexes.contains(record) || !state.spec.predicates.test(record) {
                Action::Ignore
            } else {
                Action::Insert(record.clone())
            }
        }
        Event::Remove(record) if state.indexes.contains(record) => Action::Remove(record.clone()),
        Event::Reset => Action::Materialize(state.full_check()),
        // A reordered source can reorder ties and unsorted views alike.
        Event::Sort => Action::Materialize(SortCheck::Sequence),
        _ => Action::Ignore,
    }
}

/// Turns an action into a plan.
pub fn plan<M: Record + 'static>(state: &ViewState<M>, source: &dyn Source<M>, action: Action<M>) -> Plan<M> {
    let check = state.local_check();
    match action {
        Action::Ignore => Plan::Nothing,
        Action::Materialize(check) => Plan::Materialize(check),
        Action::Insert(record) => {
            if !source.contains(&record) {
                return Plan::Nothing;
            }
            if state.filtered.is_empty() {
                return Plan::Materialize(check);
            }
            match insertion_point(state, source, &record, None) {
                Some(at) => Plan::Patch(Patch::Insert { at, record }, check),
                None => Plan::Materialize(check),
            }
        }
        Action::Remove(record) => match state.filtered_position(&record) {
            Some(at) => Plan::Patch(Patch::Remove { at }, check),
            None => Plan::Nothing,
        },
        Action::Reposition(record) => {
            let Some(from) = state.filtered_position(&record) else {
                return Plan::Nothing;
            };
            match insertion_point(state, source, &record, Some(from)) {
                Some(to) if to == from => Plan::Nothing,
                Some(to) => Plan::Patch(Patch::Move { from, to }, check),
                None => Plan::Materialize(check),
            }
        }
    }
}

/// Finds where `record` belongs in `filtered`, ignoring the entry at `skip`.
///
/// Returns `None` if the record's source position is needed and the source
/// does not hold it.
fn insertion_point<M: Record + 'static>(
    state: &ViewState<M>,
    source: &dyn Source<M>,
    record: &M,
    skip: Option<usize>,
) -> Option<usize> {
    let filtered = &state.filtered;
    let len = filtered.len() - usize::from(skip.is_some());
    let nth = |i: usize| match skip {
        Some(skip) if i >= skip => &filtered[i + 1],
        _ => &filtered[i],
    };

    let Some(comparator) = &state.spec.comparator else {
        return source_rank(state, source, record);
    };

    let lo = partition(len, |i| comparator.cmp(nth(i), record) == Ordering::Less);
    let hi = partition(len, |i| comparator.cmp(nth(i), record) != Ordering::Greater);
    if lo == hi {
        return Some(lo);
    }

    // Ties keep source order.
    let tied: HashSet<Cid> = (lo..hi).map(|i| nth(i).cid()).collect();
    let cid = record.cid();
    let mut before = 0;
    for member in source.models() {
        if member.cid() == cid {
            return Some(lo + before);
        }
        if tied.contains(&member.cid()) {
            before += 1;
        }
    }
    None
}

/// Counts view members that precede `record` in the source.
fn source_rank<M: Record + 'static>(state: &ViewState<M>, source: &dyn Source<M>, record: &M) -> Option<usize> {
    let cid = record.cid();
    let count = source.len();
    if count > 0 && source.at(count - 1).is_some_and(|last| last.cid() == cid) {
        return Some(state.filtered.len() - usize::from(state.indexes.contains(record)));
    }

    let mut before = 0;
    for member in source.models() {
        if member.cid() == cid {
            return Some(before);
        }
        if state.indexes.contains_cid(member.cid()) {
            before += 1;
        }
    }
    None
}

/// Returns the first index in `0..len` for which `pred` is false.
fn partition(len: usize, pred: impl Fn(usize) -> bool) -> usize {
    let (mut lo, mut hi) = (0, len);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if pred(mid) {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}
