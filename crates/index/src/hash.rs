//! Hash index implementation for prism.
//!
//! This module provides a hash-based index for O(1) point lookups from a key
//! to the cids of the records carrying it.

use alloc::vec::Vec;
use core::hash::Hash;
use hashbrown::HashMap;
use prism_core::Cid;

/// A hash-based index for O(1) point queries.
///
/// Keys may repeat: a view can briefly hold two records sharing an id while
/// its source is mid-update, so every cid carrying a key is kept.
#[derive(Debug)]
pub struct HashIndex<K> {
    /// The underlying map from keys to cids, in insertion order per key.
    map: HashMap<K, Vec<Cid>>,
    /// Number of (key, cid) entries.
    entries: usize,
}

impl<K: Eq + Hash + Clone> Default for HashIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone> HashIndex<K> {
    /// Creates a new hash index.
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
            entries: 0,
        }
    }

    /// Adds a key/cid pair.
    pub fn add(&mut self, key: K, cid: Cid) {
        self.map.entry(key).or_default().push(cid);
        self.entries += 1;
    }

    /// Returns every cid stored under a key.
    pub fn get(&self, key: &K) -> Vec<Cid> {
        self.map.get(key).cloned().unwrap_or_default()
    }

    /// Returns the first cid stored under a key.
    pub fn first(&self, key: &K) -> Option<Cid> {
        self.map.get(key).and_then(|cids| cids.first().copied())
    }

    /// Removes one cid from a key, or the whole key when `cid` is `None`.
    pub fn remove(&mut self, key: &K, cid: Option<Cid>) {
        match cid {
            Some(cid) => {
                if let Some(cids) = self.map.get_mut(key) {
                    let original_len = cids.len();
                    cids.retain(|&c| c != cid);
                    self.entries -= original_len - cids.len();
                    if cids.is_empty() {
                        self.map.remove(key);
                    }
                }
            }
            None => {
                if let Some(cids) = self.map.remove(key) {
                    self.entries -= cids.len();
                }
            }
        }
    }

    /// Returns true if the key is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Returns the number of (key, cid) entries.
    pub fn len(&self) -> usize {
        self.entries
    }

    /// Returns true if the index holds nothing.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.map.clear();
        self.entries = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_hash_index_repeated_keys() {
        let mut index: HashIndex<i32> = HashIndex::new();

        index.add(1, 100);
        index.add(1, 101);
        index.add(2, 200);

        assert_eq!(index.get(&1), vec![100, 101]);
        assert_eq!(index.first(&1), Some(100));
        assert_eq!(index.get(&3), Vec::<Cid>::new());
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_hash_index_remove() {
        let mut index: HashIndex<i32> = HashIndex::new();

        index.add(1, 100);
        index.add(1, 101);
        index.add(2, 200);

        // Remove specific value
        index.remove(&1, Some(100));
        assert_eq!(index.get(&1), vec![101]);
        assert_eq!(index.first(&1), Some(101));

        // Remove all values for key
        index.remove(&1, None);
        assert_eq!(index.get(&1), Vec::<Cid>::new());
        assert!(!index.contains_key(&1));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_hash_index_remove_nonexistent() {
        let mut index: HashIndex<i32> = HashIndex::new();

        index.add(1, 100);
        index.remove(&999, None);
        index.remove(&1, Some(999)); // Wrong cid
        assert_eq!(index.len(), 1);
        assert!(index.contains_key(&1));
    }

    #[test]
    fn test_hash_index_clear() {
        let mut index: HashIndex<i32> = HashIndex::default();

        index.add(1, 100);
        index.add(2, 200);
        index.clear();

        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn test_hash_index_large_scale() {
        let mut index: HashIndex<i32> = HashIndex::new();

        for i in 0..1000 {
            index.add(i, i as u64);
        }
        assert_eq!(index.len(), 1000);

        // Delete half
        for i in (0..1000).step_by(2) {
            index.remove(&i, None);
        }
        assert_eq!(index.len(), 500);
        assert!(index.contains_key(&1));
        assert!(!index.contains_key(&2));
    }
}
