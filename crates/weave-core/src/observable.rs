//! Reference-counted objects with published fields.
//!
//! An observable object owns one [`ChangePublisher`] and any number of
//! [`Published`] fields sharing it. Reading any field subscribes the current
//! renderer to the object; writing a field with a different value notifies
//! every subscriber, exactly like a [`crate::StateCell`] write.

use std::cell::RefCell;
use std::fmt;

use crate::state::ChangePublisher;

pub trait ObservableObject {
    /// The publisher shared by every published field of this object.
    fn object_will_change(&self) -> &ChangePublisher;
}

pub struct Published<T> {
    value: RefCell<T>,
    publisher: ChangePublisher,
}

impl<T> Published<T> {
    pub fn new(publisher: &ChangePublisher, value: T) -> Self {
        Self {
            value: RefCell::new(value),
            publisher: publisher.clone(),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.publisher.track();
        let value = self.value.borrow();
        f(&value)
    }

    /// Stores `value` and notifies unconditionally.
    pub fn replace(&self, value: T) {
        self.publisher.assert_writable();
        *self.value.borrow_mut() = value;
        self.publisher.send();
    }
}

impl<T: Clone> Published<T> {
    pub fn get(&self) -> T {
        self.with(|value| value.clone())
    }
}

impl<T: PartialEq> Published<T> {
    /// Stores `value` if it differs from the current one.
    pub fn set(&self, value: T) -> bool {
        self.publisher.assert_writable();
        {
            let mut current = self.value.borrow_mut();
            if *current == value {
                return false;
            }
            *current = value;
        }
        self.publisher.send();
        true
    }
}

impl<T: fmt::Debug> fmt::Debug for Published<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Published").field(&*self.value.borrow()).finish()
    }
}
