//! Prism Index - Index implementations for prism views.
//!
//! This crate provides:
//!
//! - `HashIndex`: O(1) point queries from a key to record cids
//! - `IndexStore`: A set of named hash indexes plus a cid index, owned by one view
//! - `Lookup`: Key, cid or record queries against an `IndexStore`
//!
//! # Example
//!
//! ```rust
//! use prism_index::HashIndex;
//!
//! let mut hash: HashIndex<i32> = HashIndex::new();
//! hash.add(10, 100);
//! hash.add(10, 101);
//! assert_eq!(hash.get(&10), vec![100, 101]);
//! assert_eq!(hash.first(&10), Some(100));
//! ```

#![no_std]

extern crate alloc;

pub mod hash;
pub mod store;

pub use hash::HashIndex;
pub use store::{IndexStore, Lookup};
