//! Named index store for view membership.
//!
//! An `IndexStore` maps every declared index name to a `HashIndex` over the
//! records it currently holds, plus a cid index that is always present.
//! Records without a value (or with `Null`) for an index are simply absent
//! from that index.

use crate::hash::HashIndex;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use hashbrown::HashMap;
use prism_core::{read_property, Cid, Error, Record, Result, Value};

/// A lookup query against an `IndexStore`.
pub enum Lookup<'a, M: ?Sized> {
    /// Look up by an index key. Never matched against cids.
    Key(Value),
    /// Look up by cid only.
    Cid(Cid),
    /// Look up by a record's own index key, falling back to its cid.
    Record(&'a M),
}

impl<'a, M: ?Sized> Lookup<'a, M> {
    /// Creates a key lookup.
    pub fn key(value: impl Into<Value>) -> Self {
        Lookup::Key(value.into())
    }

    /// Creates a cid lookup.
    pub fn cid(cid: Cid) -> Self {
        Lookup::Cid(cid)
    }

    /// Creates a record lookup.
    pub fn record(record: &'a M) -> Self {
        Lookup::Record(record)
    }
}

impl<M: ?Sized> From<Value> for Lookup<'_, M> {
    fn from(value: Value) -> Self {
        Lookup::Key(value)
    }
}

impl<M: ?Sized> From<i64> for Lookup<'_, M> {
    fn from(value: i64) -> Self {
        Lookup::Key(Value::Int64(value))
    }
}

impl<M: ?Sized> From<&str> for Lookup<'_, M> {
    fn from(value: &str) -> Self {
        Lookup::Key(Value::from(value))
    }
}

struct Entry<M> {
    record: Rc<M>,
    /// Key per declared index, in declaration order.
    keys: Vec<Option<Value>>,
}

/// Exclusively owned set of named indexes over a group of records.
pub struct IndexStore<M> {
    indexes: Vec<(String, HashIndex<Value>)>,
    records: HashMap<Cid, Entry<M>>,
}

impl<M: Record> IndexStore<M> {
    /// Creates a store for the given index names. The first is the main index.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut indexes: Vec<(String, HashIndex<Value>)> = Vec::new();
        for name in names {
            let name = name.into();
            if !indexes.iter().any(|(existing, _)| *existing == name) {
                indexes.push((name, HashIndex::new()));
            }
        }
        Self {
            indexes,
            records: HashMap::new(),
        }
    }

    /// Returns the main index name, if any index was declared.
    pub fn main_index(&self) -> Option<&str> {
        self.indexes.first().map(|(name, _)| name.as_str())
    }

    /// Returns the declared index names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.indexes.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Returns true if `name` is a declared index or the cid index.
    pub fn has_index(&self, name: &str) -> bool {
        name == "cid" || self.position(name).is_some()
    }

    /// Clears the store and indexes every record in `records`.
    pub fn rebuild<'r, I>(&mut self, records: I)
    where
        I: IntoIterator<Item = &'r Rc<M>>,
        M: 'r,
    {
        self.clear();
        for record in records {
            self.put(record.clone());
        }
    }

    /// Indexes one record. Re-putting a record refreshes its keys.
    pub fn put(&mut self, record: Rc<M>) {
        let cid = record.cid();
        if self.records.contains_key(&cid) {
            self.delete_cid(cid);
        }

        let keys: Vec<Option<Value>> = self
            .indexes
            .iter()
            .map(|(name, _)| read_property(&*record, name).filter(|v| !v.is_null()))
            .collect();

        for ((_, index), key) in self.indexes.iter_mut().zip(keys.iter()) {
            if let Some(key) = key {
                index.add(key.clone(), cid);
            }
        }
        self.records.insert(cid, Entry { record, keys });
    }

    /// Removes a record, returning true if it was present.
    ///
    /// The keys the record was indexed under are used, so this is correct
    /// even after the record's fields changed.
    pub fn delete(&mut self, record: &M) -> bool {
        self.delete_cid(record.cid())
    }

    fn delete_cid(&mut self, cid: Cid) -> bool {
        let Some(entry) = self.records.remove(&cid) else {
            return false;
        };
        for ((_, index), key) in self.indexes.iter_mut().zip(entry.keys.iter()) {
            if let Some(key) = key {
                index.remove(key, Some(cid));
            }
        }
        true
    }

    /// Re-reads a record's keys after a field change.
    pub fn reindex(&mut self, record: &Rc<M>) {
        if self.records.contains_key(&record.cid()) {
            self.put(record.clone());
        }
    }

    /// Returns true if the record is in the store.
    #[inline]
    pub fn contains(&self, record: &M) -> bool {
        self.records.contains_key(&record.cid())
    }

    /// Returns true if a record with this cid is in the store.
    #[inline]
    pub fn contains_cid(&self, cid: Cid) -> bool {
        self.records.contains_key(&cid)
    }

    /// Finds a record.
    ///
    /// Key lookups consult `index` (the main index when `None`) and nothing
    /// else, so a numeric key can never be mistaken for a cid. Record lookups
    /// fall back to the record's own cid. Naming the `cid` index reads an
    /// integer key as a cid.
    pub fn lookup(&self, query: &Lookup<'_, M>, index: Option<&str>) -> Option<Rc<M>> {
        if index == Some("cid") {
            return match query {
                Lookup::Key(key) => key_as_cid(key).and_then(|cid| self.by_cid(cid)),
                Lookup::Cid(cid) => self.by_cid(*cid),
                Lookup::Record(record) => self.by_cid(record.cid()),
            };
        }

        let position = match index {
            Some(name) => self.position(name),
            None if self.indexes.is_empty() => None,
            None => Some(0),
        };

        match query {
            Lookup::Cid(cid) => self.by_cid(*cid),
            Lookup::Key(key) => position.and_then(|pos| self.by_key(pos, key)),
            Lookup::Record(record) => position
                .and_then(|pos| {
                    let name = &self.indexes[pos].0;
                    read_property(*record, name).and_then(|key| self.by_key(pos, &key))
                })
                .or_else(|| self.by_cid(record.cid())),
        }
    }

    /// Exact key lookup in one named index, with no cid fallback.
    pub fn find(&self, index: &str, key: &Value) -> Option<Rc<M>> {
        self.position(index).and_then(|pos| self.by_key(pos, key))
    }

    /// Like `lookup`, but rejects index names the store does not know.
    pub fn try_lookup(&self, query: &Lookup<'_, M>, index: Option<&str>) -> Result<Option<Rc<M>>> {
        match index {
            Some(name) if !self.has_index(name) => Err(Error::index_not_found(name.to_string())),
            _ => Ok(self.lookup(query, index)),
        }
    }

    /// Returns the number of records in the store.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the store is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Removes every record from every index.
    pub fn clear(&mut self) {
        for (_, index) in self.indexes.iter_mut() {
            index.clear();
        }
        self.records.clear();
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.indexes.iter().position(|(n, _)| n == name)
    }

    fn by_key(&self, position: usize, key: &Value) -> Option<Rc<M>> {
        self.indexes[position]
            .1
            .first(key)
            .and_then(|cid| self.by_cid(cid))
    }

    fn by_cid(&self, cid: Cid) -> Option<Rc<M>> {
        self.records.get(&cid).map(|entry| entry.record.clone())
    }
}

fn key_as_cid(key: &Value) -> Option<Cid> {
    match key {
        Value::Int32(_) | Value::Int64(_) => key.as_i64().and_then(|v| Cid::try_from(v).ok()),
        _ => None,
    }
}
