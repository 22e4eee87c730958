//! Watched field names.

use alloc::string::String;
use alloc::vec::Vec;

/// Ordered, de-duplicated set of field names whose change re-tests membership.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WatchSet {
    fields: Vec<String>,
}

impl WatchSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field. Returns false if it was already watched.
    pub fn watch(&mut self, field: impl Into<String>) -> bool {
        let field = field.into();
        if self.contains(&field) {
            return false;
        }
        self.fields.push(field);
        true
    }

    /// Removes a field. Returns false if it was not watched.
    pub fn unwatch(&mut self, field: &str) -> bool {
        let before = self.fields.len();
        self.fields.retain(|f| f != field);
        self.fields.len() != before
    }

    /// Adds every field in `fields`.
    pub fn extend<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            self.watch(field);
        }
    }

    #[inline]
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
