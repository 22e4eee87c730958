//! Predicates and the ordered predicate set.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

/// A boolean test over one record.
///
/// Predicates are compared by identity: two clones of the same `Predicate`
/// are equal, two predicates built from identical closures are not.
pub struct Predicate<M: ?Sized> {
    test: Rc<dyn Fn(&M) -> bool>,
}

impl<M: ?Sized> Predicate<M> {
    /// Wraps a closure.
    pub fn new<F>(test: F) -> Self
    where
        F: Fn(&M) -> bool + 'static,
    {
        Self { test: Rc::new(test) }
    }

    /// Runs the predicate.
    #[inline]
    pub fn test(&self, record: &M) -> bool {
        (self.test)(record)
    }

    /// Returns true if both handles refer to the same predicate.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.test, &other.test)
    }
}

impl<M: ?Sized> Clone for Predicate<M> {
    fn clone(&self) -> Self {
        Self {
            test: self.test.clone(),
        }
    }
}

impl<M: ?Sized> fmt::Debug for Predicate<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// Ordered predicates combined with logical AND.
pub struct PredicateSet<M: ?Sized> {
    predicates: Vec<Predicate<M>>,
}

impl<M: ?Sized> Default for PredicateSet<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: ?Sized> PredicateSet<M> {
    /// Creates an empty set, which accepts every record.
    pub fn new() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }

    /// Appends a predicate.
    pub fn add(&mut self, predicate: Predicate<M>) {
        self.predicates.push(predicate);
    }

    /// Removes the first predicate identical to `predicate`.
    ///
    /// Returns false if it was not in the set.
    pub fn remove(&mut self, predicate: &Predicate<M>) -> bool {
        match self.predicates.iter().position(|p| p.ptr_eq(predicate)) {
            Some(at) => {
                self.predicates.remove(at);
                true
            }
            None => false,
        }
    }

    /// Removes every predicate in `old`, then appends every predicate in `new`.
    pub fn swap<I, J>(&mut self, new: I, old: J)
    where
        I: IntoIterator<Item = Predicate<M>>,
        J: IntoIterator<Item = Predicate<M>>,
    {
        for predicate in old {
            self.remove(&predicate);
        }
        self.predicates.extend(new);
    }

    /// Removes every predicate.
    pub fn clear(&mut self) {
        self.predicates.clear();
    }

    /// Returns true if every predicate accepts the record.
    pub fn test(&self, record: &M) -> bool {
        self.predicates.iter().all(|p| p.test(record))
    }

    /// Returns the predicates in order.
    pub fn iter(&self) -> impl Iterator<Item = &Predicate<M>> {
        self.predicates.iter()
    }

    /// Returns the number of predicates.
    #[inline]
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Returns true if the set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl<M: ?Sized> Clone for PredicateSet<M> {
    fn clone(&self) -> Self {
        Self {
            predicates: self.predicates.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use core::cell::Cell;

    #[test]
    fn test_empty_set_accepts_everything() {
        let set: PredicateSet<i64> = PredicateSet::new();
        assert!(set.test(&-1));
        assert!(set.is_empty());
    }

    #[test]
    fn test_all_must_accept() {
        let mut set = PredicateSet::new();
        set.add(Predicate::new(|v: &i64| *v > 5));
        set.add(Predicate::new(|v: &i64| v % 2 == 0));

        assert!(set.test(&8));
        assert!(!set.test(&7));
        assert!(!set.test(&4));
    }

    #[test]
    fn test_short_circuit() {
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();

        let mut set = PredicateSet::new();
        set.add(Predicate::new(|_: &i64| false));
        set.add(Predicate::new(move |_: &i64| {
            calls_clone.set(calls_clone.get() + 1);
            true
        }));

        assert!(!set.test(&1));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_remove_by_identity() {
        let positive = Predicate::new(|v: &i64| *v > 0);
        let lookalike = Predicate::new(|v: &i64| *v > 0);

        let mut set = PredicateSet::new();
        set.add(positive.clone());
        set.add(positive.clone());

        assert!(!set.remove(&lookalike));
        assert!(set.remove(&positive));
        assert_eq!(set.len(), 1);
        assert!(set.remove(&positive));
        assert!(!set.remove(&positive));
    }

    #[test]
    fn test_swap() {
        let small = Predicate::new(|v: &i64| *v < 10);
        let even = Predicate::new(|v: &i64| v % 2 == 0);
        let odd = Predicate::new(|v: &i64| v % 2 == 1);

        let mut set = PredicateSet::new();
        set.add(small.clone());
        set.add(even.clone());
        set.swap(vec![odd], vec![even]);

        assert_eq!(set.len(), 2);
        assert!(set.test(&3));
        assert!(!set.test(&4));
        assert!(set.iter().next().is_some_and(|p| p.ptr_eq(&small)));
    }
}
