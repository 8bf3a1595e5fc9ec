use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::subscription;
use crate::transaction::Transaction;

pub type SubscriberId = usize;
pub type PublisherId = usize;

/// Delivered to every subscriber of a publisher when its value changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChangeEvent {
    pub source: PublisherId,
    pub transaction: Option<Transaction>,
}

/// Anything that can be attributed a state read and told about the change.
///
/// Renderers are the main implementors; tests use counting subscribers.
pub trait Subscriber {
    fn subscriber_id(&self) -> SubscriberId;
    fn on_change(&self, event: &ChangeEvent);
}

struct PublisherInner {
    id: PublisherId,
    owner: Cell<Option<SubscriberId>>,
    subscribers: RefCell<Vec<Weak<dyn Subscriber>>>,
}

/// The notification core shared by [`StateCell`] and published fields of
/// observable objects.
///
/// Subscribers are held weakly: a renderer that has been torn down simply
/// stops receiving events.
#[derive(Clone)]
pub struct ChangePublisher {
    inner: Rc<PublisherInner>,
}

impl ChangePublisher {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(PublisherInner {
                id: crate::next_publisher_id(),
                owner: Cell::new(None),
                subscribers: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn id(&self) -> PublisherId {
        self.inner.id
    }

    /// Marks the renderer that owns this publisher. Writes performed during
    /// that renderer's own render pass are rejected.
    pub fn set_owner(&self, owner: Option<SubscriberId>) {
        self.inner.owner.set(owner);
    }

    pub fn owner(&self) -> Option<SubscriberId> {
        self.inner.owner.get()
    }

    /// Records the current renderer, if any, as a subscriber.
    pub fn track(&self) {
        if let Some(current) = subscription::current() {
            self.subscribe(&current);
        }
    }

    pub fn subscribe(&self, subscriber: &Rc<dyn Subscriber>) {
        let id = subscriber.subscriber_id();
        let mut subscribers = self.inner.subscribers.borrow_mut();
        subscribers.retain(|w| w.strong_count() > 0);
        let already_registered = subscribers
            .iter()
            .any(|w| w.upgrade().map(|s| s.subscriber_id() == id).unwrap_or(false));
        if !already_registered {
            subscribers.push(Rc::downgrade(subscriber));
        }
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        self.inner
            .subscribers
            .borrow_mut()
            .retain(|w| w.upgrade().map(|s| s.subscriber_id() != id).unwrap_or(false));
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .borrow()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Panics if the owning renderer is in the middle of its own render.
    pub fn assert_writable(&self) {
        if let Some(owner) = self.owner() {
            assert!(
                !subscription::is_rendering(owner),
                "state written during its owner's render pass (renderer {owner})"
            );
        }
    }

    /// Broadcasts a change to every live subscriber, synchronously, tagged
    /// with the transaction currently configured on this thread.
    pub fn send(&self) {
        let event = ChangeEvent {
            source: self.inner.id,
            transaction: subscription::current_transaction(),
        };
        let subscribers: Vec<Rc<dyn Subscriber>> = {
            let mut subscribers = self.inner.subscribers.borrow_mut();
            subscribers.retain(|w| w.strong_count() > 0);
            subscribers.iter().filter_map(|w| w.upgrade()).collect()
        };
        log::trace!(
            "publisher {} notifying {} subscribers",
            self.inner.id,
            subscribers.len()
        );
        for subscriber in subscribers {
            subscriber.on_change(&event);
        }
    }
}

impl Default for ChangePublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ChangePublisher {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for ChangePublisher {}

impl fmt::Debug for ChangePublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangePublisher")
            .field("id", &self.inner.id)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

struct StateInner<T> {
    value: RefCell<T>,
    publisher: ChangePublisher,
}

/// A mutable value box with change detection.
///
/// A cell has an identity distinct from its value: two cells holding equal
/// values are still different cells, and clones share the same storage.
pub struct StateCell<T> {
    inner: Rc<StateInner<T>>,
}

impl<T> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> PartialEq for StateCell<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Eq for StateCell<T> {}

impl<T: 'static> StateCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(StateInner {
                value: RefCell::new(value),
                publisher: ChangePublisher::new(),
            }),
        }
    }

    /// Creates a cell owned by the renderer `owner`.
    pub fn with_owner(value: T, owner: SubscriberId) -> Self {
        let cell = Self::new(value);
        cell.inner.publisher.set_owner(Some(owner));
        cell
    }

    pub fn id(&self) -> PublisherId {
        self.inner.publisher.id()
    }

    pub fn publisher(&self) -> &ChangePublisher {
        &self.inner.publisher
    }

    pub fn subscribe(&self, subscriber: &Rc<dyn Subscriber>) {
        self.inner.publisher.subscribe(subscriber);
    }

    /// Reads the value, subscribing the current renderer.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.inner.publisher.track();
        let value = self.inner.value.borrow();
        f(&value)
    }

    /// Stores `value` and notifies unconditionally.
    pub fn replace(&self, value: T) {
        self.inner.publisher.assert_writable();
        *self.inner.value.borrow_mut() = value;
        self.inner.publisher.send();
    }

    /// Mutates the value in place and notifies unconditionally.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        self.inner.publisher.assert_writable();
        let result = {
            let mut value = self.inner.value.borrow_mut();
            f(&mut value)
        };
        self.inner.publisher.send();
        result
    }
}

impl<T: Clone + 'static> StateCell<T> {
    pub fn get(&self) -> T {
        self.with(|value| value.clone())
    }
}

impl<T: PartialEq + 'static> StateCell<T> {
    /// Stores `value` if it differs from the current one. Returns whether a
    /// change was broadcast.
    pub fn set(&self, value: T) -> bool {
        self.inner.publisher.assert_writable();
        {
            let mut current = self.inner.value.borrow_mut();
            if *current == value {
                return false;
            }
            *current = value;
        }
        self.inner.publisher.send();
        true
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for StateCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateCell")
            .field("id", &self.id())
            .field("value", &*self.inner.value.borrow())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
