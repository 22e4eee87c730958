//! Record ordering.

use crate::record::{read_property, Record};
use crate::value::Value;
use alloc::rc::Rc;
use alloc::string::String;
use core::cmp::Ordering;
use core::fmt;

/// Key extraction function.
pub type KeyFn<M> = Rc<dyn Fn(&M) -> Value>;

/// Two-argument ordering function.
pub type CompareFn<M> = Rc<dyn Fn(&M, &M) -> Ordering>;

/// How records are ordered.
///
/// Every form sorts ascending. Callers sort with stable algorithms, so ties
/// keep their incoming relative order.
pub enum Comparator<M: ?Sized> {
    /// Natural `Value` order of a named property; missing values sort first.
    Field(String),
    /// Natural `Value` order of an extracted key.
    Key(KeyFn<M>),
    /// Arbitrary two-argument ordering.
    Compare(CompareFn<M>),
}

impl<M: Record + ?Sized> Comparator<M> {
    /// Orders by a named property.
    pub fn field(name: impl Into<String>) -> Self {
        Comparator::Field(name.into())
    }

    /// Orders by an extracted key.
    pub fn key<F>(f: F) -> Self
    where
        F: Fn(&M) -> Value + 'static,
    {
        Comparator::Key(Rc::new(f))
    }

    /// Orders with a two-argument function.
    pub fn compare<F>(f: F) -> Self
    where
        F: Fn(&M, &M) -> Ordering + 'static,
    {
        Comparator::Compare(Rc::new(f))
    }

    /// Returns the property name for field comparators.
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Comparator::Field(name) => Some(name.as_str()),
            _ => None,
        }
    }

    /// Compares two records.
    pub fn cmp(&self, a: &M, b: &M) -> Ordering {
        match self {
            Comparator::Field(name) => read_property(a, name).cmp(&read_property(b, name)),
            Comparator::Key(key) => key(a).cmp(&key(b)),
            Comparator::Compare(compare) => compare(a, b),
        }
    }

    /// Stable-sorts a slice of shared records.
    pub fn sort(&self, records: &mut [Rc<M>]) {
        records.sort_by(|a, b| self.cmp(a, b));
    }
}

impl<M: ?Sized> Clone for Comparator<M> {
    fn clone(&self) -> Self {
        match self {
            Comparator::Field(name) => Comparator::Field(name.clone()),
            Comparator::Key(key) => Comparator::Key(key.clone()),
            Comparator::Compare(compare) => Comparator::Compare(compare.clone()),
        }
    }
}

impl<M: ?Sized> fmt::Debug for Comparator<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparator::Field(name) => f.debug_tuple("Field").field(name).finish(),
            Comparator::Key(_) => f.write_str("Key(..)"),
            Comparator::Compare(_) => f.write_str("Compare(..)"),
        }
    }
}
