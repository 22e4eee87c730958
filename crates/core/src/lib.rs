//! Prism Core - Core types shared by every prism crate.
//!
//! This crate provides the foundational types for prism views:
//!
//! - `Value`: Property values records report (Null, Boolean, Int32, Int64, Float64, String)
//! - `Record`: The capability a record type must provide (cid, field access, accessor)
//! - `Comparator`: Field, key-extraction or two-argument record ordering
//! - `Event`: Typed collection notifications, decoded once from `"change:<field>"` style names
//! - `Error`: Error types for configuration and collection operations
//!
//! # Example
//!
//! ```rust
//! use prism_core::{next_cid, read_property, Cid, Record, Value};
//!
//! struct Widget {
//!     cid: Cid,
//!     id: i64,
//! }
//!
//! impl Record for Widget {
//!     fn cid(&self) -> Cid {
//!         self.cid
//!     }
//!
//!     fn field(&self, name: &str) -> Option<Value> {
//!         match name {
//!             "id" => Some(Value::Int64(self.id)),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let widget = Widget { cid: next_cid(), id: 7 };
//! assert_eq!(read_property(&widget, "id"), Some(Value::Int64(7)));
//! ```

#![no_std]

extern crate alloc;

mod comparator;
mod error;
mod event;
mod record;
mod value;

pub use comparator::{CompareFn, Comparator, KeyFn};
pub use error::{Error, Result};
pub use event::{Event, CHANGE_PREFIX};
pub use record::{next_cid, read_property, Cid, Record};
pub use value::Value;
