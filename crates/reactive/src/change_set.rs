//! Change set for tracking view membership changes.
//!
//! A ChangeSet summarises the difference between two states of a view,
//! containing the records that entered and left it and whether its order
//! changed.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

/// A batch of changes to a view's visible membership.
///
/// This struct tracks:
/// - `added`: Records that entered the view
/// - `removed`: Records that left the view
/// - `sorted`: Whether the visible order changed
/// - `current_result`: The complete visible membership after the changes
pub struct ChangeSet<M> {
    /// Records that were added to the view
    pub added: Vec<Rc<M>>,
    /// Records that were removed from the view
    pub removed: Vec<Rc<M>>,
    /// Whether the visible order changed, announced with a sort event or not
    pub sorted: bool,
    /// The complete visible membership after applying changes
    pub current_result: Vec<Rc<M>>,
}

impl<M> Default for ChangeSet<M> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            removed: Vec::new(),
            sorted: false,
            current_result: Vec::new(),
        }
    }
}

impl<M> ChangeSet<M> {
    /// Creates a new empty change set.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a change set representing an initial result set.
    ///
    /// All records are treated as additions.
    pub fn initial(records: Vec<Rc<M>>) -> Self {
        Self {
            added: records.clone(),
            removed: Vec::new(),
            sorted: false,
            current_result: records,
        }
    }

    /// Returns true if there are no changes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && !self.sorted
    }

    /// Returns the number of membership changes.
    #[inline]
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len()
    }

    /// Merges another change set into this one, keeping the later result.
    pub fn merge(&mut self, other: ChangeSet<M>) {
        self.added.extend(other.added);
        self.removed.extend(other.removed);
        self.sorted |= other.sorted;
        self.current_result = other.current_result;
    }

    /// Clears all changes.
    pub fn clear(&mut self) {
        self.added.clear();
        self.removed.clear();
        self.sorted = false;
    }

    /// Records an added record.
    #[inline]
    pub fn add(&mut self, record: Rc<M>) {
        self.added.push(record);
    }

    /// Records a removed record.
    #[inline]
    pub fn remove(&mut self, record: Rc<M>) {
        self.removed.push(record);
    }
}

impl<M> Clone for ChangeSet<M> {
    fn clone(&self) -> Self {
        Self {
            added: self.added.clone(),
            removed: self.removed.clone(),
            sorted: self.sorted,
            current_result: self.current_result.clone(),
        }
    }
}

impl<M> fmt::Debug for ChangeSet<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeSet")
            .field("added", &self.added.len())
            .field("removed", &self.removed.len())
            .field("sorted", &self.sorted)
            .field("current_result", &self.current_result.len())
            .finish()
    }
}
