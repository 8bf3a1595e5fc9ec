//! Deferred, breadth-first operation scheduling.
//!
//! Work emitted while a tree is being traversed is parked on an
//! [`OperationQueue`] and executed once the traversal has finished. Each
//! operation remembers the renderer that was active when it was enqueued and
//! runs with that renderer re-pushed onto the subscription stack, so state it
//! reads is attributed correctly.
//!
//! Draining proceeds in rounds: a round runs a snapshot of the queue, and
//! anything enqueued while it runs waits for the next round.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::config::RuntimeConfig;
use crate::error::QueueError;
use crate::state::Subscriber;
use crate::subscription;

type Operation = Box<dyn FnOnce() + 'static>;

struct QueuedOperation {
    renderer: Option<Rc<dyn Subscriber>>,
    operation: Operation,
}

struct QueueInner {
    name: &'static str,
    max_rounds: usize,
    pending: RefCell<Vec<QueuedOperation>>,
}

/// Outcome of a successful [`OperationQueue::drain`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub rounds: usize,
    pub executed: usize,
}

/// A shared handle to a deferred-operation queue. Clones share storage.
#[derive(Clone)]
pub struct OperationQueue {
    inner: Rc<QueueInner>,
}

impl OperationQueue {
    pub fn new(name: &'static str) -> Self {
        Self::with_config(name, &RuntimeConfig::default())
    }

    pub fn with_config(name: &'static str, config: &RuntimeConfig) -> Self {
        Self {
            inner: Rc::new(QueueInner {
                name,
                max_rounds: config.max_drain_rounds.max(1),
                pending: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// Parks `operation`, capturing the currently active renderer.
    pub fn enqueue(&self, operation: impl FnOnce() + 'static) {
        let renderer = subscription::current();
        self.inner.pending.borrow_mut().push(QueuedOperation {
            renderer,
            operation: Box::new(operation),
        });
    }

    pub fn len(&self) -> usize {
        self.inner.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.pending.borrow().is_empty()
    }

    /// Runs queued operations round by round until a round enqueues nothing.
    ///
    /// Stops with [`QueueError::RoundLimitExceeded`] once the configured
    /// number of rounds has run and work is still pending; that work is
    /// discarded.
    pub fn drain(&self) -> Result<DrainReport, QueueError> {
        let mut report = DrainReport::default();
        loop {
            let batch = std::mem::take(&mut *self.inner.pending.borrow_mut());
            if batch.is_empty() {
                return Ok(report);
            }
            if report.rounds == self.inner.max_rounds {
                let error = QueueError::RoundLimitExceeded {
                    queue: self.inner.name,
                    rounds: report.rounds,
                    pending: batch.len(),
                };
                log::error!("{error}; discarding pending operations");
                return Err(error);
            }
            report.rounds += 1;
            log::trace!(
                "queue `{}` round {}: {} operations",
                self.inner.name,
                report.rounds,
                batch.len()
            );
            for QueuedOperation {
                renderer,
                operation,
            } in batch
            {
                subscription::enter_frame(renderer, operation);
                report.executed += 1;
            }
        }
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for OperationQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationQueue")
            .field("name", &self.inner.name)
            .field("pending", &self.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/queue_tests.rs"]
mod tests;
