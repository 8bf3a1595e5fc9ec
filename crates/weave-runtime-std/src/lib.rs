//! Frame scheduling backed by Rust's `std` library.
//!
//! Hosts without an event loop of their own construct a [`StdRuntime`],
//! hand its [`Runtime`] to a render tree and poll
//! [`StdRuntime::take_frame_request`] (or register a waker) to learn when a
//! render pass is due.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use weave_core::{Runtime, RuntimeConfig, RuntimeHandle, RuntimeScheduler};

type FrameWaker = Arc<dyn Fn() + Send + Sync + 'static>;

/// Scheduler that records frame requests in an atomic flag.
pub struct StdScheduler {
    frame_requested: AtomicBool,
    frame_waker: RwLock<Option<FrameWaker>>,
}

impl StdScheduler {
    pub fn new() -> Self {
        Self {
            frame_requested: AtomicBool::new(false),
            frame_waker: RwLock::new(None),
        }
    }

    /// Returns whether a frame has been requested since the last call.
    pub fn take_frame_request(&self) -> bool {
        self.frame_requested.swap(false, Ordering::SeqCst)
    }

    /// Registers a waker invoked whenever a new frame is scheduled.
    pub fn set_frame_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        *self
            .frame_waker
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(waker));
    }

    pub fn clear_frame_waker(&self) {
        *self
            .frame_waker
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn wake(&self) {
        let waker = self
            .frame_waker
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(waker) = waker {
            waker();
        }
    }
}

impl Default for StdScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StdScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdScheduler")
            .field(
                "frame_requested",
                &self.frame_requested.load(Ordering::SeqCst),
            )
            .finish()
    }
}

impl RuntimeScheduler for StdScheduler {
    fn schedule_frame(&self) {
        if !self.frame_requested.swap(true, Ordering::SeqCst) {
            log::trace!("frame requested");
        }
        self.wake();
    }
}

/// A [`Runtime`] paired with the [`StdScheduler`] driving it.
#[derive(Clone)]
pub struct StdRuntime {
    scheduler: Arc<StdScheduler>,
    runtime: Runtime,
}

impl StdRuntime {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Uses `WEAVE_MAX_DRAIN_ROUNDS` and `WEAVE_DEBUG` from the environment.
    pub fn from_env() -> Self {
        Self::with_config(RuntimeConfig::from_env())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        let scheduler = Arc::new(StdScheduler::default());
        let runtime = Runtime::with_config(scheduler.clone(), config);
        Self { scheduler, runtime }
    }

    pub fn runtime(&self) -> Runtime {
        self.runtime.clone()
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.handle()
    }

    pub fn scheduler(&self) -> Arc<StdScheduler> {
        Arc::clone(&self.scheduler)
    }

    pub fn take_frame_request(&self) -> bool {
        self.scheduler.take_frame_request()
    }

    pub fn set_frame_waker(&self, waker: impl Fn() + Send + Sync + 'static) {
        self.scheduler.set_frame_waker(waker);
    }

    pub fn clear_frame_waker(&self) {
        self.scheduler.clear_frame_waker();
    }
}

impl fmt::Debug for StdRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdRuntime")
            .field("scheduler", &self.scheduler)
            .field("runtime", &self.runtime)
            .finish()
    }
}

impl Default for StdRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use weave_core::StateCell;
    use weave_ui::{MemoryHost, RenderTree, RenderableRegistry, ViewDescription};

    use super::StdRuntime;

    #[test]
    fn state_write_requests_a_frame_and_rerenders() {
        let runtime = StdRuntime::new();
        let woken = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&woken);
        runtime.set_frame_waker(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let slot: Rc<RefCell<Option<StateCell<i32>>>> = Rc::new(RefCell::new(None));
        let captured = Rc::clone(&slot);
        let counter_view = ViewDescription::component("Counter", move |scope| {
            let count = scope.state(|| 0);
            captured.borrow_mut().replace(count.clone());
            let spacing = count.get() as f32;
            ViewDescription::vstack(Vec::new()).spacing(spacing)
        });

        let mut tree = RenderTree::with_runtime(
            MemoryHost::new(),
            RenderableRegistry::new(),
            runtime.runtime(),
        );
        tree.mount(counter_view).expect("initial mount");
        assert!(!runtime.take_frame_request());

        let count = slot.borrow().clone().expect("state captured during render");
        count.set(1);

        assert!(runtime.take_frame_request());
        assert_eq!(woken.load(Ordering::SeqCst), 1);
        assert_eq!(tree.process_invalid(), Ok(1));
        let content = tree.content().expect("component mounted");
        assert_eq!(tree.render_count(content), Some(2));
    }
}
