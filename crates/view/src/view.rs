//! The view handle.

use crate::materialize::{materialize, Diff, SortCheck};
use crate::predicate::Predicate;
use crate::proxy::should_proxy;
use crate::reconcile::{decide, plan, Plan};
use crate::spec::{FilterSpec, ParsedSpec};
use crate::state::ViewState;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;
use prism_collection::Source;
use prism_core::{Comparator, Error, Event, Record, Result};
use prism_index::Lookup;
use prism_reactive::{Callback, ChangeSet, Emitter, SubscriptionId};

struct Inner<M: Record + 'static> {
    source: Rc<dyn Source<M>>,
    state: RefCell<ViewState<M>>,
    events: Emitter<Event<M>>,
    changes: Emitter<ChangeSet<M>>,
    /// Reorders made with no comparator active, which publish no `Sort`.
    reorders: Emitter<()>,
    subscription: Cell<Option<SubscriptionId>>,
    reorder_subscription: Cell<Option<SubscriptionId>>,
}

impl<M: Record + 'static> Inner<M> {
    fn release(&self) -> bool {
        if let Some(id) = self.reorder_subscription.take() {
            self.source.unsubscribe_reorder(id);
        }
        match self.subscription.take() {
            Some(id) => self.source.unsubscribe(id),
            None => false,
        }
    }
}

impl<M: Record + 'static> Drop for Inner<M> {
    fn drop(&mut self) {
        self.release();
    }
}

/// A filtered, sorted and windowed view over a source, kept up to date
/// incrementally as the source changes.
///
/// The view publishes `Add` and `Remove` for its own visible membership, and
/// `Sort` when its visible order changed while a comparator is active. It
/// re-publishes `Reset` and any other source event naming a visible record,
/// and can be used as the source of another view.
///
/// A configuration change that panics inside a predicate or comparator
/// leaves the view exactly as it was.
///
/// `SubCollection` is a cheap handle; clones share the same view. The view
/// stops listening to its source when `detach` is called or the last handle
/// is dropped.
pub struct SubCollection<M: Record + 'static> {
    inner: Rc<Inner<M>>,
}

impl<M: Record + 'static> Clone for SubCollection<M> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<M: Record + 'static> SubCollection<M> {
    /// Creates a view over `source`.
    ///
    /// A `collection` named in `spec` is ignored.
    pub fn new<S>(source: S, spec: FilterSpec<M>) -> Self
    where
        S: Source<M> + 'static,
    {
        Self::attach(Rc::new(source), spec)
    }

    /// Creates a view over the `collection` named in `spec`.
    pub fn build(mut spec: FilterSpec<M>) -> Result<Self> {
        let source = spec.take_collection().ok_or(Error::MissingCollection)?;
        Ok(Self::attach(source, spec))
    }

    fn attach(source: Rc<dyn Source<M>>, mut spec: FilterSpec<M>) -> Self {
        spec.take_collection();
        let state = ViewState::new(source.index_names());
        let view = Self {
            inner: Rc::new(Inner {
                source,
                state: RefCell::new(state),
                events: Emitter::new(),
                changes: Emitter::new(),
                reorders: Emitter::new(),
                subscription: Cell::new(None),
                reorder_subscription: Cell::new(None),
            }),
        };
        view.reconfigure(move |current| current.apply(spec));

        let weak = Rc::downgrade(&view.inner);
        let handler: Callback<Event<M>> = Rc::new(move |event: &Event<M>| {
            if let Some(inner) = weak.upgrade() {
                SubCollection { inner }.on_source_event(event);
            }
        });
        let id = view.inner.source.subscribe(handler);
        view.inner.subscription.set(Some(id));

        let weak = Rc::downgrade(&view.inner);
        let handler: Callback<()> = Rc::new(move |_: &()| {
            if let Some(inner) = weak.upgrade() {
                SubCollection { inner }.on_source_reorder();
            }
        });
        let id = view.inner.source.subscribe_reorder(handler);
        view.inner.reorder_subscription.set(id);
        view
    }

    /// Appends a predicate.
    pub fn add_filter(&self, predicate: Predicate<M>) {
        self.reconfigure(|spec| spec.predicates.add(predicate));
    }

    /// Removes a predicate previously added, matched by identity.
    pub fn remove_filter(&self, predicate: &Predicate<M>) {
        self.reconfigure(|spec| {
            spec.predicates.remove(predicate);
        });
    }

    /// Removes every predicate, watched field, limit and offset. Ordering
    /// stays.
    pub fn clear_filters(&self) {
        self.reconfigure(ParsedSpec::clear_filters);
    }

    /// Removes `old` (every current predicate when `None`), then appends
    /// `new`, with a single refresh.
    pub fn swap_filters(&self, new: Vec<Predicate<M>>, old: Option<Vec<Predicate<M>>>) {
        self.reconfigure(|spec| match old {
            Some(old) => spec.predicates.swap(new, old),
            None => {
                spec.predicates.clear();
                spec.predicates.swap(new, Vec::new());
            }
        });
    }

    /// Merges `spec` into the configuration, from a blank slate when `clear`.
    pub fn configure(&self, mut spec: FilterSpec<M>, clear: bool) {
        spec.take_collection();
        tracing::debug!(clear, spec = ?spec, "configuring view");
        self.reconfigure(|current| {
            if clear {
                *current = ParsedSpec::blank();
            }
            current.apply(spec);
        });
    }

    /// Like `configure`, taking a JSON spec.
    ///
    /// The view is left untouched if the JSON is rejected.
    pub fn configure_json(&self, json: &str, clear: bool) -> Result<()> {
        let spec = FilterSpec::from_json(json)?;
        self.configure(spec, clear);
        Ok(())
    }

    /// Sets or clears the limit.
    pub fn set_limit(&self, limit: Option<usize>) {
        self.reconfigure(|spec| spec.limit = limit);
    }

    /// Sets or clears the offset.
    pub fn set_offset(&self, offset: Option<usize>) {
        self.reconfigure(|spec| spec.offset = offset);
    }

    /// Sets or clears the ordering.
    pub fn set_comparator(&self, comparator: Option<Comparator<M>>) {
        self.reconfigure(|spec| spec.comparator = comparator);
    }

    /// Re-tests membership whenever `field` changes.
    pub fn watch(&self, field: &str) {
        self.inner.state.borrow_mut().spec.watched.watch(field);
    }

    /// Stops re-testing membership when `field` changes.
    pub fn unwatch(&self, field: &str) {
        self.inner.state.borrow_mut().spec.watched.unwatch(field);
    }

    /// Clears every predicate, the ordering and the window.
    pub fn reset(&self) {
        self.configure(FilterSpec::new(), true);
    }

    /// Returns the visible record at `index`.
    pub fn at(&self, index: usize) -> Option<Rc<M>> {
        self.inner.state.borrow().models.get(index).cloned()
    }

    /// Looks up a visible record by key, cid or record.
    ///
    /// Returns `None` for records in the source that this view excludes.
    pub fn get<'a>(&self, query: impl Into<Lookup<'a, M>>, index: Option<&str>) -> Option<Rc<M>> {
        let state = self.inner.state.borrow();
        state
            .indexes
            .lookup(&query.into(), index)
            .filter(|r| state.visible.contains(&r.cid()))
    }

    /// Like `get`, but fails on an undeclared index name.
    pub fn try_get<'a>(&self, query: impl Into<Lookup<'a, M>>, index: Option<&str>) -> Result<Option<Rc<M>>> {
        let state = self.inner.state.borrow();
        Ok(state
            .indexes
            .try_lookup(&query.into(), index)?
            .filter(|r| state.visible.contains(&r.cid())))
    }

    /// Returns true if the record is visible.
    pub fn contains(&self, record: &M) -> bool {
        self.inner.state.borrow().visible.contains(&record.cid())
    }

    /// Number of visible records.
    pub fn len(&self) -> usize {
        self.inner.state.borrow().models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Always true.
    pub fn is_collection(&self) -> bool {
        true
    }

    /// Snapshot of the visible records, in order.
    pub fn models(&self) -> Vec<Rc<M>> {
        self.inner.state.borrow().models.clone()
    }

    /// Number of records passing the predicates, before windowing.
    pub fn filtered_len(&self) -> usize {
        self.inner.state.borrow().filtered.len()
    }

    /// Snapshot of the records passing the predicates, before windowing.
    pub fn filtered(&self) -> Vec<Rc<M>> {
        self.inner.state.borrow().filtered.clone()
    }

    pub fn limit(&self) -> Option<usize> {
        self.inner.state.borrow().spec.limit
    }

    pub fn offset(&self) -> Option<usize> {
        self.inner.state.borrow().spec.offset
    }

    pub fn comparator(&self) -> Option<Comparator<M>> {
        self.inner.state.borrow().spec.comparator.clone()
    }

    /// Number of active predicates.
    pub fn filter_count(&self) -> usize {
        self.inner.state.borrow().spec.predicates.len()
    }

    /// Watched fields, in the order they were first watched.
    pub fn watched(&self) -> Vec<String> {
        self.inner
            .state
            .borrow()
            .spec
            .watched
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// The source this view reads from.
    pub fn collection(&self) -> Rc<dyn Source<M>> {
        self.inner.source.clone()
    }

    /// Stops listening to the source. The view keeps its last state.
    pub fn detach(&self) {
        if self.inner.release() {
            tracing::debug!("view detached");
        }
    }

    /// Returns true until `detach` is called.
    pub fn is_attached(&self) -> bool {
        self.inner.subscription.get().is_some()
    }

    /// Subscribes to the view's events.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&Event<M>) + 'static,
    {
        self.inner.events.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.events.unsubscribe(id)
    }

    /// Receives one change set per update that changed visible membership
    /// or order.
    pub fn observe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&ChangeSet<M>) + 'static,
    {
        self.inner.changes.subscribe(handler)
    }

    pub fn unobserve(&self, id: SubscriptionId) -> bool {
        self.inner.changes.unsubscribe(id)
    }

    fn on_source_event(&self, event: &Event<M>) {
        self.refresh_keys(event);

        let plan = {
            let state = self.inner.state.borrow();
            let action = decide(&state, event);
            plan(&state, &*self.inner.source, action)
        };
        let diff = match plan {
            Plan::Nothing => None,
            Plan::Materialize(check) => Some(self.materialize(check)),
            Plan::Patch(patch, check) => Some(self.inner.state.borrow_mut().apply(patch, check)),
        };
        if let Some(diff) = diff {
            self.publish(diff);
        }

        let proxied = should_proxy(&self.inner.state.borrow(), event);
        if proxied {
            self.inner.events.emit(event);
        }
    }

    /// Re-reads index keys of a member whose indexed field changed.
    fn refresh_keys(&self, event: &Event<M>) {
        let (Some(field), Some(record)) = (event.changed_field(), event.record()) else {
            return;
        };
        let stale = {
            let state = self.inner.state.borrow();
            state.indexes.has_index(field) && state.indexes.contains(record)
        };
        if stale {
            self.inner.state.borrow_mut().indexes.reindex(record);
        }
    }

    /// The source reordered without a sort event.
    fn on_source_reorder(&self) {
        let diff = self.materialize(SortCheck::Sequence);
        self.publish(diff);
    }

    /// Applies a configuration change with a full pass.
    ///
    /// The edit is made on a copy, and the copy only replaces the running
    /// configuration once materialization over it has returned.
    fn reconfigure<F>(&self, edit: F)
    where
        F: FnOnce(&mut ParsedSpec<M>),
    {
        let (spec, had_comparator) = {
            let state = self.inner.state.borrow();
            let mut spec = state.spec.clone();
            edit(&mut spec);
            (spec, state.spec.comparator.is_some())
        };
        let filtered = materialize(self.inner.source.models(), &spec.predicates, spec.comparator.as_ref());

        // Dropping a comparator restores source order, which is a reorder too.
        let check = if had_comparator || spec.comparator.is_some() {
            SortCheck::Sequence
        } else {
            SortCheck::Never
        };
        let diff = {
            let mut state = self.inner.state.borrow_mut();
            state.spec = spec;
            let diff = state.replace(filtered, check);
            tracing::debug!(
                filters = state.spec.predicates.len(),
                filtered = state.filtered.len(),
                visible = state.models.len(),
                sorted = diff.sorted,
                "reconfigured view"
            );
            diff
        };
        self.publish(diff);
    }

    fn materialize(&self, check: SortCheck) -> Diff<M> {
        let filtered = {
            let state = self.inner.state.borrow();
            materialize(
                self.inner.source.models(),
                &state.spec.predicates,
                state.spec.comparator.as_ref(),
            )
        };

        let mut state = self.inner.state.borrow_mut();
        let diff = state.replace(filtered, check);
        tracing::debug!(
            filtered = state.filtered.len(),
            visible = state.models.len(),
            removed = diff.removed.len(),
            added = diff.added.len(),
            sorted = diff.sorted,
            "materialized view"
        );
        diff
    }

    fn publish(&self, diff: Diff<M>) {
        if diff.is_empty() {
            return;
        }
        let announced = diff.sorted && self.inner.state.borrow().spec.comparator.is_some();
        let current = if self.inner.changes.is_empty() {
            None
        } else {
            Some(self.models())
        };

        for record in &diff.removed {
            self.inner.events.emit(&Event::Remove(record.clone()));
        }
        for record in &diff.added {
            self.inner.events.emit(&Event::Add(record.clone()));
        }
        if announced {
            self.inner.events.emit(&Event::Sort);
        } else if diff.sorted {
            self.inner.reorders.emit(&());
        }

        if let Some(current_result) = current {
            self.inner.changes.emit(&ChangeSet {
                added: diff.added,
                removed: diff.removed,
                sorted: diff.sorted,
                current_result,
            });
        }
    }
}

impl<M: Record + 'static> Source<M> for SubCollection<M> {
    fn models(&self) -> Vec<Rc<M>> {
        SubCollection::models(self)
    }

    fn len(&self) -> usize {
        SubCollection::len(self)
    }

    fn at(&self, index: usize) -> Option<Rc<M>> {
        SubCollection::at(self, index)
    }

    fn position(&self, record: &M) -> Option<usize> {
        let cid = record.cid();
        let state = self.inner.state.borrow();
        if !state.visible.contains(&cid) {
            return None;
        }
        state.models.iter().position(|r| r.cid() == cid)
    }

    fn contains(&self, record: &M) -> bool {
        SubCollection::contains(self, record)
    }

    fn index_names(&self) -> Vec<String> {
        self.inner.source.index_names()
    }

    fn subscribe(&self, handler: Callback<Event<M>>) -> SubscriptionId {
        self.inner.events.subscribe_rc(handler)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.events.unsubscribe(id)
    }

    fn subscribe_reorder(&self, handler: Callback<()>) -> Option<SubscriptionId> {
        Some(self.inner.reorders.subscribe_rc(handler))
    }

    fn unsubscribe_reorder(&self, id: SubscriptionId) -> bool {
        self.inner.reorders.unsubscribe(id)
    }
}

impl<M: Record + 'static> fmt::Debug for SubCollection<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("SubCollection")
            .field("len", &state.models.len())
            .field("filtered", &state.filtered.len())
            .field("filters", &state.spec.predicates.len())
            .field("comparator", &state.spec.comparator)
            .field("limit", &state.spec.limit)
            .field("offset", &state.spec.offset)
            .field("attached", &self.inner.subscription.get().is_some())
            .finish()
    }
}
