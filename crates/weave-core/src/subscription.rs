//! Process-wide render attribution.
//!
//! The subscription stack records which renderer is currently evaluating a
//! view description. Any state read while a frame is on top of the stack is
//! attributed to that frame's subscriber. A second stack carries the
//! transaction that state writes should be tagged with.
//!
//! Frames come in two kinds. A render frame is pushed while a renderer
//! evaluates its body; an attribution frame only routes reads to a renderer,
//! for example while its diff is applied or its queued operations run.
//! Only render frames count as the owner being mid-render.
//!
//! Both stacks live in thread-local storage because the UI is owned by a
//! single thread. Frames are pushed and popped through guards so that a
//! panicking render cannot leave a stale renderer on the stack.

use std::cell::RefCell;
use std::rc::Rc;

use crate::state::{Subscriber, SubscriberId};
use crate::transaction::Transaction;

thread_local! {
    static RENDERERS: RefCell<Vec<Frame>> = RefCell::new(Vec::new());
    static TRANSACTIONS: RefCell<Vec<Transaction>> = RefCell::new(Vec::new());
}

struct Frame {
    subscriber: Option<Rc<dyn Subscriber>>,
    rendering: bool,
}

struct FrameGuard;

impl Drop for FrameGuard {
    fn drop(&mut self) {
        RENDERERS.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

struct TransactionGuard;

impl Drop for TransactionGuard {
    fn drop(&mut self) {
        TRANSACTIONS.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Runs `f` as the render pass of `subscriber`.
///
/// Reads are attributed to `subscriber`, and writes to state it owns are
/// rejected until `f` returns.
pub fn enter_render<R>(subscriber: Rc<dyn Subscriber>, f: impl FnOnce() -> R) -> R {
    push(Some(subscriber), true, f)
}

/// Runs `f` with `subscriber` attributed as the current renderer.
pub fn enter<R>(subscriber: Rc<dyn Subscriber>, f: impl FnOnce() -> R) -> R {
    enter_frame(Some(subscriber), f)
}

/// Runs `f` with the given attribution frame on top of the stack.
///
/// A `None` frame masks any renderer below it, so reads inside `f` are not
/// attributed to anyone.
pub fn enter_frame<R>(frame: Option<Rc<dyn Subscriber>>, f: impl FnOnce() -> R) -> R {
    push(frame, false, f)
}

fn push<R>(subscriber: Option<Rc<dyn Subscriber>>, rendering: bool, f: impl FnOnce() -> R) -> R {
    RENDERERS.with(|stack| {
        stack.borrow_mut().push(Frame {
            subscriber,
            rendering,
        })
    });
    let guard = FrameGuard;
    let result = f();
    drop(guard);
    result
}

/// Runs `f` without attributing reads to the current renderer.
pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
    enter_frame(None, f)
}

/// Returns the subscriber on top of the stack, if any.
pub fn current() -> Option<Rc<dyn Subscriber>> {
    RENDERERS.with(|stack| {
        stack
            .borrow()
            .last()
            .and_then(|frame| frame.subscriber.clone())
    })
}

/// Returns true if a renderer is currently attributed.
pub fn is_active() -> bool {
    current().is_some()
}

/// Returns true if `id` has a render frame anywhere on the stack, i.e. it is
/// in the middle of its own render pass.
pub fn is_rendering(id: SubscriberId) -> bool {
    RENDERERS.with(|stack| {
        stack.borrow().iter().any(|frame| {
            frame.rendering
                && frame
                    .subscriber
                    .as_ref()
                    .is_some_and(|subscriber| subscriber.subscriber_id() == id)
        })
    })
}

/// Number of frames currently pushed.
pub fn depth() -> usize {
    RENDERERS.with(|stack| stack.borrow().len())
}

/// Runs `f` with `transaction` attached to every state write it performs.
pub fn with_transaction<R>(transaction: Transaction, f: impl FnOnce() -> R) -> R {
    TRANSACTIONS.with(|stack| stack.borrow_mut().push(transaction));
    let guard = TransactionGuard;
    let result = f();
    drop(guard);
    result
}

/// The transaction configured by the innermost [`with_transaction`] call.
pub fn current_transaction() -> Option<Transaction> {
    TRANSACTIONS.with(|stack| stack.borrow().last().copied())
}

/// Clears both stacks.
///
/// Hosts call this between render passes when recovering from a panic that
/// unwound through foreign code without running the guards.
pub fn reset() {
    RENDERERS.with(|stack| stack.borrow_mut().clear());
    TRANSACTIONS.with(|stack| stack.borrow_mut().clear());
}
