//! Prism View - Incrementally maintained views over observable collections.
//!
//! A `SubCollection` is a filtered, sorted and windowed projection of a
//! source collection. It subscribes to the source and keeps itself current
//! one event at a time, publishing the minimal `Add`/`Remove`/`Sort` events
//! for its own visible membership.
//!
//! # Core Concepts
//!
//! - `FilterSpec`: Typed (or JSON) view configuration
//! - `Predicate`: A record test, removable by identity
//! - `SubCollection`: The view, usable itself as a source for further views
//!
//! Every update is computed under a shared borrow, committed, and only then
//! published, so subscribers may read the view or mutate its source from
//! inside an event handler.
//!
//! # Example
//!
//! ```rust
//! use prism_collection::Collection;
//! use prism_reactive::Model;
//! use prism_view::{FilterSpec, SubCollection};
//! use std::rc::Rc;
//!
//! let widgets = Collection::new();
//! for id in 0..10i64 {
//!     let widget = Model::new().with("id", id).with("sweet", id % 2 == 0);
//!     widgets.add(Rc::new(widget)).unwrap();
//! }
//!
//! let sweet = SubCollection::new(
//!     widgets.clone(),
//!     FilterSpec::new().where_eq("sweet", true).limit(3),
//! );
//! assert_eq!(sweet.len(), 3);
//! assert_eq!(sweet.filtered_len(), 5);
//!
//! // Watched fields are re-tested as they change.
//! widgets.at(0).unwrap().set("sweet", false);
//! assert_eq!(sweet.filtered_len(), 4);
//! ```

#![no_std]

extern crate alloc;

mod json;
mod materialize;
mod proxy;
mod reconcile;
mod state;

pub mod predicate;
pub mod spec;
pub mod view;
pub mod watch;

pub use predicate::{Predicate, PredicateSet};
pub use spec::{FilterSpec, ParsedSpec};
pub use view::SubCollection;
pub use watch::WatchSet;
