//! Prism Reactive - Publish/subscribe plumbing for prism.
//!
//! This crate implements the notification layer the rest of prism is wired
//! with. Collections, views and records all publish through an `Emitter`;
//! subscribers are plain closures identified by a `SubscriptionId`.
//!
//! # Core Concepts
//!
//! - `Emitter`: Synchronous, re-entrancy tolerant publisher
//! - `SubscriptionManager`: Ordered registry of subscriptions
//! - `Model`: Observable record with dynamic attributes
//! - `ChangeSet`: Batched summary of a view's membership changes
//!
//! # Example
//!
//! ```rust
//! use prism_reactive::{FieldChange, Model, Observable};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let model = Model::new().with("sweet", true);
//! let changes = Rc::new(Cell::new(0));
//!
//! let counter = changes.clone();
//! model.changes().subscribe(move |_: &FieldChange| counter.set(counter.get() + 1));
//!
//! model.set("sweet", false);
//! model.set("sweet", false); // unchanged, nothing published
//! assert_eq!(changes.get(), 1);
//! ```

#![no_std]

extern crate alloc;

pub mod change_set;
pub mod model;
pub mod subscription;

pub use change_set::ChangeSet;
pub use model::{FieldChange, Model, Observable};
pub use subscription::{Callback, Emitter, Subscription, SubscriptionId, SubscriptionManager};
