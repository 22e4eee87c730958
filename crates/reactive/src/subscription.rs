//! Subscription management and event emission.
//!
//! This module provides subscription IDs, a manager for tracking active
//! subscriptions, and the `Emitter` every collection, view and model uses to
//! publish notifications.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

/// Unique identifier for a subscription.
pub type SubscriptionId = u64;

/// Callback type for notifications.
pub type Callback<E> = Rc<dyn Fn(&E)>;

/// A subscription to an emitter.
pub struct Subscription<E> {
    /// Unique identifier
    id: SubscriptionId,
    /// Callback to invoke on notifications
    callback: Callback<E>,
    /// Whether this subscription is active
    active: Cell<bool>,
}

impl<E> Subscription<E> {
    /// Creates a new subscription.
    pub fn new(id: SubscriptionId, callback: Callback<E>) -> Self {
        Self {
            id,
            callback,
            active: Cell::new(true),
        }
    }

    /// Returns the subscription ID.
    #[inline]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Returns whether this subscription is active.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Deactivates this subscription.
    #[inline]
    pub fn deactivate(&self) {
        self.active.set(false);
    }

    /// Notifies this subscription.
    pub fn notify(&self, event: &E) {
        if self.is_active() {
            (self.callback)(event);
        }
    }
}

/// Tracks subscriptions in subscription order.
pub struct SubscriptionManager<E> {
    /// Active subscriptions, ordered by id
    subscriptions: BTreeMap<SubscriptionId, Rc<Subscription<E>>>,
    /// Next subscription ID to assign
    next_id: SubscriptionId,
}

impl<E> Default for SubscriptionManager<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> SubscriptionManager<E> {
    /// Creates a new subscription manager.
    pub fn new() -> Self {
        Self {
            subscriptions: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Registers a callback and returns its subscription ID.
    pub fn subscribe(&mut self, callback: Callback<E>) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;

        self.subscriptions
            .insert(id, Rc::new(Subscription::new(id, callback)));

        id
    }

    /// Unsubscribes by ID.
    ///
    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        match self.subscriptions.remove(&id) {
            Some(subscription) => {
                subscription.deactivate();
                true
            }
            None => false,
        }
    }

    /// Returns the current subscriptions in subscription order.
    pub fn snapshot(&self) -> Vec<Rc<Subscription<E>>> {
        self.subscriptions.values().cloned().collect()
    }

    /// Returns the number of active subscriptions.
    #[inline]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Returns true if there are no subscriptions.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Returns all subscription IDs.
    pub fn subscription_ids(&self) -> Vec<SubscriptionId> {
        self.subscriptions.keys().copied().collect()
    }

    /// Clears all subscriptions.
    pub fn clear(&mut self) {
        for subscription in self.subscriptions.values() {
            subscription.deactivate();
        }
        self.subscriptions.clear();
    }
}

/// Publishes events to subscribers.
///
/// The subscriber list is snapshotted before each emission and no borrow is
/// held while callbacks run, so callbacks may subscribe, unsubscribe or emit
/// again. A subscription removed during an emission is skipped for the rest
/// of it.
pub struct Emitter<E> {
    subscriptions: RefCell<SubscriptionManager<E>>,
}

impl<E> Default for Emitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Emitter<E> {
    /// Creates an emitter with no subscribers.
    pub fn new() -> Self {
        Self {
            subscriptions: RefCell::new(SubscriptionManager::new()),
        }
    }

    /// Subscribes a callback.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&E) + 'static,
    {
        self.subscribe_rc(Rc::new(callback))
    }

    /// Subscribes an already shared callback.
    pub fn subscribe_rc(&self, callback: Callback<E>) -> SubscriptionId {
        self.subscriptions.borrow_mut().subscribe(callback)
    }

    /// Unsubscribes by ID.
    ///
    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscriptions.borrow_mut().unsubscribe(id)
    }

    /// Delivers an event to every current subscriber, in subscription order.
    pub fn emit(&self, event: &E) {
        let subscriptions = self.subscriptions.borrow().snapshot();
        for subscription in subscriptions {
            subscription.notify(event);
        }
    }

    /// Returns the number of subscribers.
    pub fn len(&self) -> usize {
        self.subscriptions.borrow().len()
    }

    /// Returns true if nobody is subscribed.
    pub fn is_empty(&self) -> bool {
        self.subscriptions.borrow().is_empty()
    }

    /// Drops every subscription.
    pub fn clear(&self) {
        self.subscriptions.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_subscription_new() {
        let sub: Subscription<u32> = Subscription::new(1, Rc::new(|_: &u32| {}));
        assert_eq!(sub.id(), 1);
        assert!(sub.is_active());
    }

    #[test]
    fn test_subscription_notify_inactive() {
        let called = Rc::new(Cell::new(false));
        let called_clone = called.clone();

        let sub = Subscription::new(1, Rc::new(move |_: &u32| called_clone.set(true)));
        sub.deactivate();
        sub.notify(&7);

        assert!(!called.get());
    }

    #[test]
    fn test_subscription_manager_subscribe() {
        let mut manager: SubscriptionManager<u32> = SubscriptionManager::new();

        let id1 = manager.subscribe(Rc::new(|_: &u32| {}));
        let id2 = manager.subscribe(Rc::new(|_: &u32| {}));

        assert_eq!(id1, 1);
        assert_eq!(id2, 2);
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.subscription_ids(), vec![1, 2]);
    }

    #[test]
    fn test_subscription_manager_unsubscribe() {
        let mut manager: SubscriptionManager<u32> = SubscriptionManager::new();

        let id = manager.subscribe(Rc::new(|_: &u32| {}));
        assert!(manager.unsubscribe(id));
        assert!(manager.is_empty());
        assert!(!manager.unsubscribe(id)); // Already removed
    }

    #[test]
    fn test_emitter_delivers_in_subscription_order() {
        let emitter: Emitter<u32> = Emitter::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        for tag in 0..3u32 {
            let seen = seen.clone();
            emitter.subscribe(move |value: &u32| seen.borrow_mut().push((tag, *value)));
        }
        emitter.emit(&9);

        assert_eq!(*seen.borrow(), vec![(0, 9), (1, 9), (2, 9)]);
    }

    #[test]
    fn test_emitter_unsubscribe_during_emit() {
        let emitter: Rc<Emitter<u32>> = Rc::new(Emitter::new());
        let count = Rc::new(Cell::new(0));

        // The first subscriber removes the second (id 2) mid-emission.
        let handle = emitter.clone();
        emitter.subscribe(move |_| {
            handle.unsubscribe(2);
        });
        let count_clone = count.clone();
        emitter.subscribe(move |_| count_clone.set(count_clone.get() + 1));

        emitter.emit(&1);
        emitter.emit(&2);

        assert_eq!(count.get(), 0);
        assert_eq!(emitter.len(), 1);
    }

    #[test]
    fn test_emitter_reentrant_emit() {
        let emitter: Rc<Emitter<u32>> = Rc::new(Emitter::new());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let handle = emitter.clone();
        let seen_clone = seen.clone();
        emitter.subscribe(move |value: &u32| {
            seen_clone.borrow_mut().push(*value);
            if *value > 0 {
                handle.emit(&(value - 1));
            }
        });
        emitter.emit(&2);

        assert_eq!(*seen.borrow(), vec![2, 1, 0]);
    }

    #[test]
    fn test_emitter_subscribe_during_emit() {
        let emitter: Rc<Emitter<u32>> = Rc::new(Emitter::new());
        let late_calls = Rc::new(Cell::new(0));

        let handle = emitter.clone();
        let late = late_calls.clone();
        emitter.subscribe(move |_| {
            let late = late.clone();
            handle.subscribe(move |_| late.set(late.get() + 1));
        });

        emitter.emit(&0);
        assert_eq!(late_calls.get(), 0);
        assert_eq!(emitter.len(), 2);

        emitter.emit(&0);
        assert_eq!(late_calls.get(), 1);
    }

    #[test]
    fn test_emitter_clear() {
        let emitter: Emitter<u32> = Emitter::new();
        emitter.subscribe(|_| {});
        emitter.subscribe(|_| {});
        assert_eq!(emitter.len(), 2);

        emitter.clear();
        assert!(emitter.is_empty());
    }
}
