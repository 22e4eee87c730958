//! Base collection.
//!
//! `Collection` is the authoritative, ordered owner of a set of observable
//! records. It keeps a main index (unique) plus any extra indexes, relays its
//! members' attribute changes as `Event::PropertyChanged`, and publishes every
//! membership change to its subscribers.

use crate::source::Source;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::cmp::Ordering;
use core::fmt;
use hashbrown::{HashMap, HashSet};
use prism_core::{read_property, Cid, Comparator, Error, Event, Record, Result, Value};
use prism_index::{IndexStore, Lookup};
use prism_reactive::{Callback, Emitter, FieldChange, Observable, SubscriptionId};

/// Default main index name.
pub const DEFAULT_MAIN_INDEX: &str = "id";

/// Builder for `Collection`.
pub struct CollectionBuilder<M> {
    main_index: String,
    indexes: Vec<String>,
    comparator: Option<Comparator<M>>,
    models: Vec<Rc<M>>,
}

impl<M: Observable + 'static> CollectionBuilder<M> {
    fn new() -> Self {
        Self {
            main_index: DEFAULT_MAIN_INDEX.to_string(),
            indexes: Vec::new(),
            comparator: None,
            models: Vec::new(),
        }
    }

    /// Sets the main (unique) index field.
    pub fn main_index(mut self, name: impl Into<String>) -> Self {
        self.main_index = name.into();
        self
    }

    /// Declares an extra, non-unique index field.
    pub fn index(mut self, name: impl Into<String>) -> Self {
        self.indexes.push(name.into());
        self
    }

    /// Keeps the collection sorted by `comparator`.
    pub fn comparator(mut self, comparator: Comparator<M>) -> Self {
        self.comparator = Some(comparator);
        self
    }

    /// Initial members.
    pub fn models<I>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = Rc<M>>,
    {
        self.models.extend(models);
        self
    }

    /// Builds the collection, failing if two initial members share a main key.
    pub fn build(self) -> Result<Collection<M>> {
        let mut names = Vec::with_capacity(self.indexes.len() + 1);
        names.push(self.main_index.clone());
        names.extend(self.indexes);

        let collection = Collection {
            inner: Rc::new(Inner {
                state: RefCell::new(State {
                    models: Vec::new(),
                    comparator: self.comparator,
                    main_index: self.main_index,
                    indexes: IndexStore::new(names),
                    listeners: HashMap::new(),
                }),
                events: Emitter::new(),
            }),
        };
        if !self.models.is_empty() {
            collection.reset(self.models)?;
        }
        Ok(collection)
    }
}

struct State<M> {
    models: Vec<Rc<M>>,
    comparator: Option<Comparator<M>>,
    main_index: String,
    indexes: IndexStore<M>,
    /// Attribute-change subscriptions on members, by cid.
    listeners: HashMap<Cid, SubscriptionId>,
}

impl<M: Observable> State<M> {
    fn main_key(&self, record: &M) -> Option<Value> {
        read_property(record, &self.main_index).filter(|v| !v.is_null())
    }

    /// Rejects records whose main key clashes with each other or, when
    /// `against_members` is set, with a different current member.
    fn check_unique(&self, records: &[Rc<M>], against_members: bool) -> Result<()> {
        let mut seen: HashMap<Value, Cid> = HashMap::new();
        for record in records {
            let Some(key) = self.main_key(record) else {
                continue;
            };
            if against_members {
                if let Some(existing) = self.indexes.find(&self.main_index, &key) {
                    if existing.cid() != record.cid() {
                        return Err(Error::unique_constraint(self.main_index.clone(), key));
                    }
                }
            }
            match seen.get(&key) {
                Some(&cid) if cid != record.cid() => {
                    return Err(Error::unique_constraint(self.main_index.clone(), key));
                }
                _ => {
                    seen.insert(key, record.cid());
                }
            }
        }
        Ok(())
    }

    fn insertion_point(&self, record: &M) -> usize {
        match &self.comparator {
            Some(comparator) => self
                .models
                .partition_point(|m| comparator.cmp(m, record) != Ordering::Greater),
            None => self.models.len(),
        }
    }
}

struct Inner<M: Observable> {
    state: RefCell<State<M>>,
    events: Emitter<Event<M>>,
}

impl<M: Observable> Inner<M> {
    fn relay(&self, record: Rc<M>, field: &str) {
        {
            let mut state = self.state.borrow_mut();
            if !state.indexes.contains(&record) {
                return;
            }
            state.indexes.reindex(&record);
        }
        self.events.emit(&Event::PropertyChanged {
            record,
            field: field.to_string(),
        });
    }
}

impl<M: Observable> Drop for Inner<M> {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        for record in &state.models {
            if let Some(id) = state.listeners.remove(&record.cid()) {
                record.changes().unsubscribe(id);
            }
        }
    }
}

/// An ordered, observable, indexed set of records.
///
/// `Collection` is a cheap handle; clones share the same members.
pub struct Collection<M: Observable + 'static> {
    inner: Rc<Inner<M>>,
}

impl<M: Observable + 'static> Clone for Collection<M> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<M: Observable + 'static> Default for Collection<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Observable + 'static> Collection<M> {
    /// Creates an empty, unsorted collection indexed by `"id"`.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner {
                state: RefCell::new(State {
                    models: Vec::new(),
                    comparator: None,
                    main_index: DEFAULT_MAIN_INDEX.to_string(),
                    indexes: IndexStore::new([DEFAULT_MAIN_INDEX]),
                    listeners: HashMap::new(),
                }),
                events: Emitter::new(),
            }),
        }
    }

    /// Returns a builder.
    pub fn builder() -> CollectionBuilder<M> {
        CollectionBuilder::new()
    }

    /// Adds a record.
    ///
    /// Returns `Ok(false)` if the record is already a member.
    pub fn add(&self, record: Rc<M>) -> Result<bool> {
        Ok(self.add_many(core::iter::once(record))? == 1)
    }

    /// Adds several records, returning how many were new.
    ///
    /// Nothing is added if any record's main key clashes.
    pub fn add_many<I>(&self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = Rc<M>>,
    {
        let added = {
            let mut state = self.inner.state.borrow_mut();
            let mut seen = HashSet::new();
            let fresh: Vec<Rc<M>> = records
                .into_iter()
                .filter(|r| !state.indexes.contains_cid(r.cid()) && seen.insert(r.cid()))
                .collect();
            state.check_unique(&fresh, true)?;

            for record in &fresh {
                let at = state.insertion_point(record);
                state.models.insert(at, record.clone());
                state.indexes.put(record.clone());
                let id = self.listen(record);
                state.listeners.insert(record.cid(), id);
                tracing::trace!(cid = record.cid(), at, "collection add");
            }
            fresh
        };

        for record in &added {
            self.inner.events.emit(&Event::Add(record.clone()));
        }
        Ok(added.len())
    }

    /// Removes a record, returning the stored instance if it was a member.
    pub fn remove(&self, record: &M) -> Option<Rc<M>> {
        let removed = {
            let mut state = self.inner.state.borrow_mut();
            let cid = record.cid();
            let at = state.models.iter().position(|m| m.cid() == cid)?;
            let removed = state.models.remove(at);
            state.indexes.delete(&removed);
            if let Some(id) = state.listeners.remove(&cid) {
                removed.changes().unsubscribe(id);
            }
            tracing::trace!(cid, at, "collection remove");
            removed
        };

        self.inner.events.emit(&Event::Remove(removed.clone()));
        Some(removed)
    }

    /// Replaces every member and publishes a single `Reset`.
    pub fn reset<I>(&self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = Rc<M>>,
    {
        {
            let mut state = self.inner.state.borrow_mut();
            let mut seen = HashSet::new();
            let mut incoming: Vec<Rc<M>> = records.into_iter().filter(|r| seen.insert(r.cid())).collect();
            state.check_unique(&incoming, false)?;

            let previous = core::mem::take(&mut state.models);
            for record in &previous {
                if let Some(id) = state.listeners.remove(&record.cid()) {
                    record.changes().unsubscribe(id);
                }
            }

            if let Some(comparator) = &state.comparator {
                comparator.sort(&mut incoming);
            }
            state.indexes.rebuild(incoming.iter());
            for record in &incoming {
                let id = self.listen(record);
                state.listeners.insert(record.cid(), id);
            }
            tracing::debug!(previous = previous.len(), current = incoming.len(), "collection reset");
            state.models = incoming;
        }

        self.inner.events.emit(&Event::Reset);
        Ok(())
    }

    /// Replaces the membership, publishing one `Remove` per departing member
    /// and one `Add` per new one.
    pub fn set<I>(&self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = Rc<M>>,
    {
        let incoming: Vec<Rc<M>> = records.into_iter().collect();
        self.inner.state.borrow().check_unique(&incoming, false)?;

        let departing: Vec<Rc<M>> = self
            .models()
            .into_iter()
            .filter(|m| !incoming.iter().any(|r| r.cid() == m.cid()))
            .collect();
        for record in departing {
            self.remove(&record);
        }
        self.add_many(incoming)?;
        Ok(())
    }

    /// Re-sorts by the collection comparator, publishing `Sort`.
    ///
    /// Returns false if the collection has no comparator.
    pub fn sort(&self) -> bool {
        {
            let mut state = self.inner.state.borrow_mut();
            let State {
                models, comparator, ..
            } = &mut *state;
            match comparator {
                Some(comparator) => comparator.sort(models),
                None => return false,
            }
        }
        self.inner.events.emit(&Event::Sort);
        true
    }

    /// Reorders members by a one-off comparator, publishing `Sort`.
    pub fn sort_by(&self, comparator: &Comparator<M>) {
        comparator.sort(&mut self.inner.state.borrow_mut().models);
        self.inner.events.emit(&Event::Sort);
    }

    /// Replaces the comparator and re-sorts when one is given.
    pub fn set_comparator(&self, comparator: Option<Comparator<M>>) {
        self.inner.state.borrow_mut().comparator = comparator;
        self.sort();
    }

    /// Returns the comparator, if any.
    pub fn comparator(&self) -> Option<Comparator<M>> {
        self.inner.state.borrow().comparator.clone()
    }

    /// Looks a member up by main key, cid, record, or a named index.
    pub fn get<'a>(&self, query: impl Into<Lookup<'a, M>>, index: Option<&str>) -> Option<Rc<M>> {
        self.inner.state.borrow().indexes.lookup(&query.into(), index)
    }

    /// Returns the member at `index`.
    pub fn at(&self, index: usize) -> Option<Rc<M>> {
        self.inner.state.borrow().models.get(index).cloned()
    }

    /// Returns true if the record is a member.
    pub fn contains(&self, record: &M) -> bool {
        self.inner.state.borrow().indexes.contains(record)
    }

    /// Returns the number of members.
    pub fn len(&self) -> usize {
        self.inner.state.borrow().models.len()
    }

    /// Returns true if there are no members.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a snapshot of the members, in order.
    pub fn models(&self) -> Vec<Rc<M>> {
        self.inner.state.borrow().models.clone()
    }

    /// Returns the main index name.
    pub fn main_index(&self) -> String {
        self.inner.state.borrow().main_index.clone()
    }

    /// Publishes a custom event by name, e.g. `"highlight"` or `"change:rank"`.
    pub fn trigger(&self, name: &str, record: Option<Rc<M>>) {
        self.inner.events.emit(&Event::decode(name, record));
    }

    /// Subscribes to every event this collection publishes.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&Event<M>) + 'static,
    {
        self.inner.events.subscribe(handler)
    }

    /// Removes a subscription.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.events.unsubscribe(id)
    }

    fn listen(&self, record: &Rc<M>) -> SubscriptionId {
        let collection = Rc::downgrade(&self.inner);
        let member = Rc::downgrade(record);
        record.changes().subscribe(move |change: &FieldChange| {
            if let (Some(inner), Some(record)) = (collection.upgrade(), member.upgrade()) {
                inner.relay(record, &change.field);
            }
        })
    }
}

impl<M: Observable + 'static> Source<M> for Collection<M> {
    fn models(&self) -> Vec<Rc<M>> {
        Collection::models(self)
    }

    fn len(&self) -> usize {
        Collection::len(self)
    }

    fn at(&self, index: usize) -> Option<Rc<M>> {
        Collection::at(self, index)
    }

    fn position(&self, record: &M) -> Option<usize> {
        let cid = record.cid();
        self.inner.state.borrow().models.iter().position(|m| m.cid() == cid)
    }

    fn contains(&self, record: &M) -> bool {
        Collection::contains(self, record)
    }

    fn index_names(&self) -> Vec<String> {
        self.inner
            .state
            .borrow()
            .indexes
            .names()
            .into_iter()
            .map(ToString::to_string)
            .collect()
    }

    fn subscribe(&self, handler: Callback<Event<M>>) -> SubscriptionId {
        self.inner.events.subscribe_rc(handler)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.events.unsubscribe(id)
    }
}

impl<M: Observable + 'static> fmt::Debug for Collection<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Collection")
            .field("len", &state.models.len())
            .field("main_index", &state.main_index)
            .field("comparator", &state.comparator)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use core::cell::Cell;
    use prism_reactive::Model;

    fn model(id: i64) -> Rc<Model> {
        Rc::new(Model::new().with("id", id))
    }

    fn names(log: &Rc<RefCell<Vec<String>>>) -> Vec<String> {
        log.borrow().clone()
    }

    fn record_events(collection: &Collection<Model>) -> Rc<RefCell<Vec<String>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_clone = log.clone();
        collection.subscribe(move |event: &Event<Model>| {
            log_clone.borrow_mut().push(event.name().into_owned());
        });
        log
    }

    fn ids(collection: &Collection<Model>) -> Vec<i64> {
        collection
            .models()
            .iter()
            .filter_map(|m| m.get("id").and_then(|v| v.as_i64()))
            .collect()
    }

    #[test]
    fn test_add_emits_add() {
        let collection = Collection::new();
        let log = record_events(&collection);

        assert_eq!(collection.add(model(1)), Ok(true));
        assert_eq!(collection.len(), 1);
        assert_eq!(names(&log), vec!["add"]);
    }

    #[test]
    fn test_add_same_record_is_noop() {
        let collection = Collection::new();
        let m = model(1);
        collection.add(m.clone()).unwrap();
        let log = record_events(&collection);

        assert_eq!(collection.add(m), Ok(false));
        assert_eq!(collection.len(), 1);
        assert!(names(&log).is_empty());
    }

    #[test]
    fn test_add_duplicate_main_key() {
        let collection = Collection::new();
        collection.add(model(1)).unwrap();

        let err = collection.add(model(1)).unwrap_err();
        assert_eq!(err, Error::unique_constraint("id", Value::Int64(1)));
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_add_many_is_all_or_nothing() {
        let collection = Collection::new();
        let result = collection.add_many(vec![model(1), model(2), model(1)]);
        assert!(result.is_err());
        assert!(collection.is_empty());
    }

    #[test]
    fn test_sorted_insert() {
        let collection = Collection::builder()
            .comparator(Comparator::field("id"))
            .build()
            .unwrap();
        collection.add_many(vec![model(3), model(1), model(2)]).unwrap();
        assert_eq!(ids(&collection), vec![1, 2, 3]);
    }

    #[test]
    fn test_remove_emits_and_stops_relaying() {
        let collection = Collection::new();
        let m = model(1);
        collection.add(m.clone()).unwrap();
        let log = record_events(&collection);

        assert!(collection.remove(&m).is_some());
        assert!(collection.remove(&m).is_none());
        m.set("name", "gone");

        assert_eq!(names(&log), vec!["remove"]);
        assert!(m.changes().is_empty());
    }

    #[test]
    fn test_property_change_is_relayed() {
        let collection = Collection::new();
        let m = model(1);
        collection.add(m.clone()).unwrap();
        let log = record_events(&collection);

        m.set("sweet", true);
        assert_eq!(names(&log), vec!["change:sweet"]);
    }

    #[test]
    fn test_main_key_change_is_reindexed() {
        let collection = Collection::new();
        let m = model(1);
        collection.add(m.clone()).unwrap();

        m.set("id", 10i64);
        assert!(collection.get(1i64, None).is_none());
        assert!(collection.get(10i64, None).is_some());
    }

    #[test]
    fn test_reset_emits_single_reset() {
        let collection = Collection::new();
        let old = model(1);
        collection.add(old.clone()).unwrap();
        let log = record_events(&collection);

        collection.reset(vec![model(2), model(3)]).unwrap();
        assert_eq!(ids(&collection), vec![2, 3]);
        assert_eq!(names(&log), vec!["reset"]);
        assert!(old.changes().is_empty());
    }

    #[test]
    fn test_set_emits_per_record() {
        let collection = Collection::new();
        let keep = model(1);
        let drop = model(2);
        collection.add_many(vec![keep.clone(), drop.clone()]).unwrap();
        let log = record_events(&collection);

        collection.set(vec![keep, model(3)]).unwrap();
        assert_eq!(ids(&collection), vec![1, 3]);
        assert_eq!(names(&log), vec!["remove", "add"]);
    }

    #[test]
    fn test_sort_by_emits_sort() {
        let collection = Collection::builder()
            .models(vec![model(1), model(2), model(3)])
            .build()
            .unwrap();
        let log = record_events(&collection);

        collection.sort_by(&Comparator::key(|m: &Model| {
            Value::Int64(-m.get("id").and_then(|v| v.as_i64()).unwrap_or(0))
        }));
        assert_eq!(ids(&collection), vec![3, 2, 1]);
        assert_eq!(names(&log), vec!["sort"]);
        assert!(!collection.sort());
    }

    #[test]
    fn test_get_by_cid_and_named_index() {
        let collection = Collection::builder().index("slug").build().unwrap();
        let m = Rc::new(Model::new().with("id", 1i64).with("slug", "one"));
        collection.add(m.clone()).unwrap();

        assert!(collection.get(Lookup::cid(m.cid()), None).is_some());
        assert!(collection.get("one", Some("slug")).is_some());
        assert!(collection.get(Lookup::record(&*m), None).is_some());
        assert_eq!(Source::index_names(&collection), vec!["id", "slug"]);
    }

    #[test]
    fn test_trigger_custom_event() {
        let collection = Collection::new();
        let m = model(1);
        collection.add(m.clone()).unwrap();
        let log = record_events(&collection);

        collection.trigger("highlight", Some(m));
        assert_eq!(names(&log), vec!["highlight"]);
    }

    #[test]
    fn test_drop_releases_model_subscriptions() {
        let m = model(1);
        {
            let collection = Collection::new();
            collection.add(m.clone()).unwrap();
            assert_eq!(m.changes().len(), 1);
        }
        assert!(m.changes().is_empty());
    }

    #[test]
    fn test_subscriber_may_mutate_during_add() {
        let collection = Collection::new();
        let calls = Rc::new(Cell::new(0));

        let handle = collection.clone();
        let calls_clone = calls.clone();
        collection.subscribe(move |event: &Event<Model>| {
            if let Event::Add(record) = event {
                calls_clone.set(calls_clone.get() + 1);
                if record.get("id") == Some(Value::Int64(1)) {
                    handle.add(model(2)).unwrap();
                }
            }
        });

        collection.add(model(1)).unwrap();
        assert_eq!(calls.get(), 2);
        assert_eq!(collection.len(), 2);
    }
}
