//! View configuration.
//!
//! A `FilterSpec` is a typed description of what a view should contain:
//! equality `where` clauses, predicate functions, an ordering, a window and
//! extra watched fields. Specs are merged into a view's `ParsedSpec`, either
//! on top of the current configuration or from a blank slate.

use crate::json;
use crate::predicate::{Predicate, PredicateSet};
use crate::watch::WatchSet;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use prism_collection::Source;
use prism_core::{read_property, Comparator, Record, Result, Value};

/// Declarative view configuration.
///
/// `limit` and `offset` are tri-state: left untouched (`None`), set
/// (`Some(Some(n))`, `0` included) or explicitly cleared (`Some(None)`).
pub struct FilterSpec<M: Record + 'static> {
    pub(crate) where_eq: Vec<(String, Value)>,
    pub(crate) filters: Vec<Predicate<M>>,
    pub(crate) comparator: Option<Comparator<M>>,
    pub(crate) limit: Option<Option<usize>>,
    pub(crate) offset: Option<Option<usize>>,
    pub(crate) watched: Vec<String>,
    pub(crate) collection: Option<Rc<dyn Source<M>>>,
}

impl<M: Record + 'static> Default for FilterSpec<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Record + 'static> FilterSpec<M> {
    /// Creates an empty spec.
    pub fn new() -> Self {
        Self {
            where_eq: Vec::new(),
            filters: Vec::new(),
            comparator: None,
            limit: None,
            offset: None,
            watched: Vec::new(),
            collection: None,
        }
    }

    /// Parses a JSON spec.
    ///
    /// Accepted keys are `where`, `comparator` (a field name), `limit`,
    /// `offset` and `watched`. Predicates cannot be expressed in JSON.
    pub fn from_json(input: &str) -> Result<Self> {
        json::parse(input)
    }

    /// Requires `field` to equal `value`. The field is watched.
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_eq.push((field.into(), value.into()));
        self
    }

    /// Adds a predicate closure.
    pub fn filter<F>(self, test: F) -> Self
    where
        F: Fn(&M) -> bool + 'static,
    {
        self.predicate(Predicate::new(test))
    }

    /// Adds a predicate handle, keeping its identity for later removal.
    pub fn predicate(mut self, predicate: Predicate<M>) -> Self {
        self.filters.push(predicate);
        self
    }

    /// Adds several predicates, in order.
    pub fn filters<I>(mut self, predicates: I) -> Self
    where
        I: IntoIterator<Item = Predicate<M>>,
    {
        self.filters.extend(predicates);
        self
    }

    /// Orders the view.
    pub fn comparator(mut self, comparator: Comparator<M>) -> Self {
        self.comparator = Some(comparator);
        self
    }

    /// Orders the view ascending by a field.
    pub fn sort_by(self, field: impl Into<String>) -> Self {
        self.comparator(Comparator::field(field))
    }

    /// Shows at most `limit` records. `0` shows none.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(Some(limit));
        self
    }

    /// Clears any limit.
    pub fn no_limit(mut self) -> Self {
        self.limit = Some(None);
        self
    }

    /// Skips the first `offset` records.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(Some(offset));
        self
    }

    /// Clears any offset.
    pub fn no_offset(mut self) -> Self {
        self.offset = Some(None);
        self
    }

    /// Re-tests membership whenever `field` changes.
    pub fn watch(mut self, field: impl Into<String>) -> Self {
        self.watched.push(field.into());
        self
    }

    /// Names the source a view built with `SubCollection::build` reads from.
    pub fn collection<S>(mut self, source: S) -> Self
    where
        S: Source<M> + 'static,
    {
        self.collection = Some(Rc::new(source));
        self
    }

    pub(crate) fn take_collection(&mut self) -> Option<Rc<dyn Source<M>>> {
        self.collection.take()
    }
}

impl<M: Record + 'static> fmt::Debug for FilterSpec<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterSpec")
            .field("where", &self.where_eq)
            .field("filters", &self.filters.len())
            .field("comparator", &self.comparator)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .field("watched", &self.watched)
            .field("collection", &self.collection.is_some())
            .finish()
    }
}

/// The configuration a view is currently running with.
pub struct ParsedSpec<M: ?Sized> {
    pub predicates: PredicateSet<M>,
    pub watched: WatchSet,
    pub comparator: Option<Comparator<M>>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl<M: ?Sized> Clone for ParsedSpec<M> {
    fn clone(&self) -> Self {
        Self {
            predicates: self.predicates.clone(),
            watched: self.watched.clone(),
            comparator: self.comparator.clone(),
            limit: self.limit,
            offset: self.offset,
        }
    }
}

impl<M: Record + 'static> Default for ParsedSpec<M> {
    fn default() -> Self {
        Self::blank()
    }
}

impl<M: Record + 'static> ParsedSpec<M> {
    /// No predicates, no ordering, no window.
    pub fn blank() -> Self {
        Self {
            predicates: PredicateSet::new(),
            watched: WatchSet::new(),
            comparator: None,
            limit: None,
            offset: None,
        }
    }

    /// Merges `spec` into this configuration.
    pub fn apply(&mut self, spec: FilterSpec<M>) {
        for (field, value) in spec.where_eq {
            self.watched.watch(field.clone());
            self.predicates.add(Predicate::new(move |record: &M| {
                read_property(record, &field).as_ref() == Some(&value)
            }));
        }
        for predicate in spec.filters {
            self.predicates.add(predicate);
        }
        if let Some(comparator) = spec.comparator {
            self.comparator = Some(comparator);
        }
        if let Some(limit) = spec.limit {
            self.limit = limit;
        }
        if let Some(offset) = spec.offset {
            self.offset = offset;
        }
        self.watched.extend(spec.watched);
    }

    /// Drops predicates, watched fields and the window. Ordering stays.
    pub fn clear_filters(&mut self) {
        self.predicates.clear();
        self.watched.clear();
        self.limit = None;
        self.offset = None;
    }

    /// Returns true if `field` drives ordering or membership.
    pub fn cares_about(&self, field: &str) -> bool {
        self.watched.contains(field)
            || self
                .comparator
                .as_ref()
                .and_then(Comparator::field_name)
                .is_some_and(|name| name == field)
    }

    /// Returns true if the window shows every filtered record.
    pub fn unbounded(&self) -> bool {
        self.limit.is_none() && self.offset.unwrap_or(0) == 0
    }
}
