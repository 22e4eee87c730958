//! The narrow interface a view needs from the collection it is built on.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use prism_core::{Event, Record};
use prism_reactive::{Callback, SubscriptionId};

/// An ordered, observable set of records a view can be built on.
///
/// Implemented by the base `Collection` and by views themselves, so views
/// can be stacked.
pub trait Source<M: Record> {
    /// Returns a snapshot of the current members, in order.
    fn models(&self) -> Vec<Rc<M>>;

    /// Returns the number of members.
    fn len(&self) -> usize;

    /// Returns true if there are no members.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the member at `index`.
    fn at(&self, index: usize) -> Option<Rc<M>>;

    /// Returns the position of a member, matched by cid.
    fn position(&self, record: &M) -> Option<usize> {
        let cid = record.cid();
        self.models().iter().position(|m| m.cid() == cid)
    }

    /// Returns true if the record is a member, matched by cid.
    fn contains(&self, record: &M) -> bool {
        self.position(record).is_some()
    }

    /// Declared index names. The first one is the main index.
    fn index_names(&self) -> Vec<String>;

    /// Registers a handler for every notification this source emits.
    fn subscribe(&self, handler: Callback<Event<M>>) -> SubscriptionId;

    /// Removes a handler registered with `subscribe`.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    /// Registers a handler for reorders this source makes without emitting
    /// `Event::Sort`.
    ///
    /// Sources that announce every reorder with `Event::Sort` keep the
    /// default and return `None`.
    fn subscribe_reorder(&self, _handler: Callback<()>) -> Option<SubscriptionId> {
        None
    }

    /// Removes a handler registered with `subscribe_reorder`.
    fn unsubscribe_reorder(&self, _id: SubscriptionId) -> bool {
        false
    }
}
