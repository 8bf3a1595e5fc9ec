use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use ahash::RandomState;
use hashbrown::HashSet;

use crate::config::RuntimeConfig;
use crate::platform::RuntimeScheduler;
use crate::queue::OperationQueue;
use crate::state::SubscriberId;

struct RuntimeInner {
    scheduler: Arc<dyn RuntimeScheduler>,
    config: RuntimeConfig,
    owner_thread: ThreadId,
    needs_frame: Cell<bool>,
    invalid: RefCell<HashSet<SubscriberId, RandomState>>,
    invalid_order: RefCell<Vec<SubscriberId>>,
}

impl RuntimeInner {
    fn new(scheduler: Arc<dyn RuntimeScheduler>, config: RuntimeConfig) -> Self {
        Self {
            scheduler,
            config,
            owner_thread: thread::current().id(),
            needs_frame: Cell::new(false),
            invalid: RefCell::new(HashSet::with_hasher(RandomState::new())),
            invalid_order: RefCell::new(Vec::new()),
        }
    }

    fn schedule(&self) {
        self.needs_frame.set(true);
        self.scheduler.schedule_frame();
    }

    fn register_invalid(&self, id: SubscriberId) {
        let mut invalid = self.invalid.borrow_mut();
        if invalid.insert(id) {
            self.invalid_order.borrow_mut().push(id);
            drop(invalid);
            self.schedule();
        }
    }

    fn mark_rendered(&self, id: SubscriberId) {
        if self.invalid.borrow_mut().remove(&id) {
            self.invalid_order.borrow_mut().retain(|pending| *pending != id);
        }
    }

    fn take_invalid(&self) -> Vec<SubscriberId> {
        self.invalid.borrow_mut().clear();
        std::mem::take(&mut *self.invalid_order.borrow_mut())
    }

    fn has_invalid(&self) -> bool {
        !self.invalid.borrow().is_empty()
    }
}

/// Owns the bookkeeping shared by every renderer of one UI: which renderers
/// are waiting for a re-render, and whether the host should schedule a frame.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self::with_config(scheduler, RuntimeConfig::default())
    }

    pub fn with_config(scheduler: Arc<dyn RuntimeScheduler>, config: RuntimeConfig) -> Self {
        Self {
            inner: Rc::new(RuntimeInner::new(scheduler, config)),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle(Rc::downgrade(&self.inner))
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    pub fn needs_frame(&self) -> bool {
        self.inner.needs_frame.get()
    }

    pub fn set_needs_frame(&self, value: bool) {
        self.inner.needs_frame.set(value);
    }

    pub fn has_invalid(&self) -> bool {
        self.inner.has_invalid()
    }

    /// Drains the renderers invalidated since the last call, in the order
    /// they were first invalidated.
    pub fn take_invalid(&self) -> Vec<SubscriberId> {
        self.inner.take_invalid()
    }

    /// Creates an operation queue that honours this runtime's round limit.
    pub fn new_queue(&self, name: &'static str) -> OperationQueue {
        OperationQueue::with_config(name, &self.inner.config)
    }

    pub fn assert_ui_thread(&self) {
        assert_eq!(
            thread::current().id(),
            self.inner.owner_thread,
            "weave runtime used off its owning thread"
        );
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.inner.config)
            .field("needs_frame", &self.inner.needs_frame.get())
            .field("invalid", &self.inner.invalid_order.borrow().len())
            .finish()
    }
}

#[derive(Default)]
pub struct DefaultScheduler;

impl RuntimeScheduler for DefaultScheduler {
    fn schedule_frame(&self) {}
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(Arc::new(DefaultScheduler))
    }
}

/// Weak handle held by renderers. Every call is a no-op once the runtime has
/// been dropped.
#[derive(Clone)]
pub struct RuntimeHandle(Weak<RuntimeInner>);

impl RuntimeHandle {
    pub fn schedule(&self) {
        if let Some(inner) = self.0.upgrade() {
            inner.schedule();
        }
    }

    pub fn register_invalid(&self, id: SubscriberId) {
        if let Some(inner) = self.0.upgrade() {
            inner.register_invalid(id);
        }
    }

    pub fn mark_rendered(&self, id: SubscriberId) {
        if let Some(inner) = self.0.upgrade() {
            inner.mark_rendered(id);
        }
    }

    pub fn take_invalid(&self) -> Vec<SubscriberId> {
        self.0
            .upgrade()
            .map(|inner| inner.take_invalid())
            .unwrap_or_default()
    }

    pub fn has_invalid(&self) -> bool {
        self.0
            .upgrade()
            .map(|inner| inner.has_invalid())
            .unwrap_or(false)
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl fmt::Debug for RuntimeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RuntimeHandle").field(&self.is_alive()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingScheduler {
        frames: AtomicUsize,
    }

    impl RuntimeScheduler for CountingScheduler {
        fn schedule_frame(&self) {
            self.frames.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn invalidation_requests_one_frame_per_renderer() {
        let scheduler = Arc::new(CountingScheduler::default());
        let runtime = Runtime::new(scheduler.clone());
        let handle = runtime.handle();

        handle.register_invalid(3);
        handle.register_invalid(1);
        handle.register_invalid(3);

        assert!(runtime.needs_frame());
        assert_eq!(scheduler.frames.load(Ordering::SeqCst), 2);
        assert_eq!(runtime.take_invalid(), vec![3, 1]);
        assert!(!runtime.has_invalid());
    }

    #[test]
    fn mark_rendered_drops_a_pending_invalidation() {
        let runtime = Runtime::default();
        let handle = runtime.handle();
        handle.register_invalid(4);
        handle.register_invalid(5);
        handle.mark_rendered(4);
        assert_eq!(runtime.take_invalid(), vec![5]);
    }

    #[test]
    fn handle_outlives_runtime_quietly() {
        let handle = Runtime::default().handle();
        assert!(!handle.is_alive());
        handle.register_invalid(1);
        assert!(handle.take_invalid().is_empty());
    }

    #[test]
    fn queues_inherit_the_round_limit() {
        let config = RuntimeConfig::default().with_max_drain_rounds(2);
        let runtime = Runtime::with_config(Arc::new(DefaultScheduler), config);
        let queue = runtime.new_queue("build");
        assert_eq!(queue.name(), "build");
        assert_eq!(queue.drain().map(|report| report.rounds), Ok(0));
    }
}
