//! Prism Collection - Base collections for prism views.
//!
//! - `Source`: The interface a view reads members and notifications from
//! - `Collection`: An ordered, indexed, observable set of records
//!
//! # Example
//!
//! ```rust
//! use prism_collection::Collection;
//! use prism_reactive::Model;
//! use std::rc::Rc;
//!
//! let people = Collection::new();
//! people.add(Rc::new(Model::new().with("id", 1i64))).unwrap();
//! assert!(people.add(Rc::new(Model::new().with("id", 1i64))).is_err());
//! assert_eq!(people.len(), 1);
//! ```

#![no_std]

extern crate alloc;

pub mod collection;
pub mod source;

pub use collection::{Collection, CollectionBuilder, DEFAULT_MAIN_INDEX};
pub use source::Source;
