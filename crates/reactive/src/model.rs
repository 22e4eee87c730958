//! Observable records.
//!
//! `Model` is the stock record type: a cid plus a map of named attributes.
//! Setting an attribute to a different value publishes a `FieldChange`, which
//! a base collection relays to its own subscribers as
//! `Event::PropertyChanged`.

use crate::subscription::Emitter;
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use prism_core::{next_cid, Cid, Record, Value};

/// A single attribute change on a model.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldChange {
    /// Name of the changed attribute
    pub field: String,
    /// Value before the change, `None` if the attribute was unset
    pub previous: Option<Value>,
}

/// Records whose property changes can be observed.
pub trait Observable: Record {
    /// Emitter publishing this record's attribute changes.
    fn changes(&self) -> &Emitter<FieldChange>;
}

/// An observable record with dynamic attributes.
pub struct Model {
    cid: Cid,
    attributes: RefCell<BTreeMap<String, Value>>,
    changes: Emitter<FieldChange>,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// Creates a model with no attributes and a fresh cid.
    pub fn new() -> Self {
        Self {
            cid: next_cid(),
            attributes: RefCell::new(BTreeMap::new()),
            changes: Emitter::new(),
        }
    }

    /// Builder-style attribute initialisation. Publishes nothing.
    pub fn with(self, field: &str, value: impl Into<Value>) -> Self {
        self.attributes
            .borrow_mut()
            .insert(field.to_string(), value.into());
        self
    }

    /// Sets an attribute.
    ///
    /// Returns true and publishes a `FieldChange` if the stored value changed.
    pub fn set(&self, field: &str, value: impl Into<Value>) -> bool {
        let value = value.into();
        let previous = {
            let mut attributes = self.attributes.borrow_mut();
            if attributes.get(field) == Some(&value) {
                return false;
            }
            attributes.insert(field.to_string(), value)
        };

        tracing::trace!(cid = self.cid, field, "model attribute changed");
        self.changes.emit(&FieldChange {
            field: field.to_string(),
            previous,
        });
        true
    }

    /// Removes an attribute, publishing a `FieldChange` if it was set.
    pub fn unset(&self, field: &str) -> bool {
        let previous = self.attributes.borrow_mut().remove(field);
        if previous.is_none() {
            return false;
        }

        self.changes.emit(&FieldChange {
            field: field.to_string(),
            previous,
        });
        true
    }

    /// Returns a snapshot of all attributes in name order.
    pub fn attributes(&self) -> Vec<(String, Value)> {
        self.attributes
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl Record for Model {
    fn cid(&self) -> Cid {
        self.cid
    }

    fn field(&self, name: &str) -> Option<Value> {
        self.attributes.borrow().get(name).cloned()
    }
}

impl Observable for Model {
    fn changes(&self) -> &Emitter<FieldChange> {
        &self.changes
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("cid", &self.cid)
            .field("attributes", &self.attributes.borrow())
            .finish()
    }
}
