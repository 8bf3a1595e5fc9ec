//! Get/set accessor pairs that proxy state without owning it.

use std::fmt;
use std::rc::Rc;

use crate::state::StateCell;
use crate::subscription;
use crate::transaction::Transaction;

/// A pair of read/write functions.
///
/// A binding never owns storage. It is usually derived from a [`StateCell`]
/// and handed to a child so the child can write back into its parent's state.
/// Projections derive a binding to one field of a larger value while keeping
/// the read/write contract intact.
pub struct Binding<T> {
    read: Rc<dyn Fn() -> T>,
    write: Rc<dyn Fn(T)>,
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Self {
            read: Rc::clone(&self.read),
            write: Rc::clone(&self.write),
        }
    }
}

impl<T: 'static> Binding<T> {
    pub fn new(read: impl Fn() -> T + 'static, write: impl Fn(T) + 'static) -> Self {
        Self {
            read: Rc::new(read),
            write: Rc::new(write),
        }
    }

    pub fn get(&self) -> T {
        (self.read)()
    }

    pub fn set(&self, value: T) {
        (self.write)(value)
    }

    /// Reads, mutates and writes back the full value.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut value = self.get();
        f(&mut value);
        self.set(value);
    }

    /// Derives a binding to a part of the value.
    ///
    /// Writes through the projection read the whole value, replace the part
    /// and write the whole value back through `self`.
    pub fn project<U: 'static>(
        &self,
        read: impl Fn(&T) -> U + 'static,
        write: impl Fn(&mut T, U) + 'static,
    ) -> Binding<U> {
        let reader = self.clone();
        let writer = self.clone();
        Binding::new(
            move || read(&reader.get()),
            move |part| {
                let mut whole = writer.get();
                write(&mut whole, part);
                writer.set(whole);
            },
        )
    }

    /// Derives a read-only binding; writes through it are dropped.
    pub fn map<U: 'static>(&self, read: impl Fn(&T) -> U + 'static) -> Binding<U> {
        let reader = self.clone();
        Binding::new(
            move || read(&reader.get()),
            |_| log::debug!("write through a read-only binding ignored"),
        )
    }

    /// Derives a binding whose writes run under `transaction`.
    pub fn with_transaction(&self, transaction: Transaction) -> Binding<T> {
        let reader = self.clone();
        let writer = self.clone();
        Binding::new(
            move || reader.get(),
            move |value| subscription::with_transaction(transaction, || writer.set(value)),
        )
    }
}

impl<T: Clone + 'static> Binding<T> {
    /// A binding that always reads `value` and ignores writes.
    pub fn constant(value: T) -> Self {
        Binding::new(move || value.clone(), |_| {})
    }
}

impl<T: Clone + PartialEq + 'static> Binding<T> {
    /// Proxies `cell`. Reads subscribe the current renderer; writes keep the
    /// cell's value-equality short circuit.
    pub fn from_cell(cell: &StateCell<T>) -> Self {
        let reader = cell.clone();
        let writer = cell.clone();
        Binding::new(
            move || reader.get(),
            move |value| {
                writer.set(value);
            },
        )
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding").field("value", &self.get()).finish()
    }
}
