//! Per-traversal configuration handed from parent to child.
//!
//! A [`Context`] is copied at every traversal step and never mutated after it
//! is handed down. It carries the resolved attributes of the node being
//! rendered, a weak reference to the hosting screen, the active transaction
//! and the two operation queues of the tree.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use weave_core::{OperationQueue, Runtime, Transaction};

use crate::attributes::Attributes;
use crate::screen::HostScreen;
use crate::view::ViewDescription;

/// How a subtree came to be the root of another screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferKind {
    /// Pushed by navigation from the current screen.
    Navigation,
    /// Assigned directly as the content of the target screen.
    Direct,
}

#[derive(Clone)]
pub struct Context {
    attributes: Attributes,
    screen: Weak<HostScreen>,
    transaction: Option<Transaction>,
    depth: usize,
    build_queue: OperationQueue,
    layout_queue: OperationQueue,
}

impl Context {
    pub fn root(runtime: &Runtime, screen: &Rc<HostScreen>) -> Self {
        Self {
            attributes: Attributes::default(),
            screen: Rc::downgrade(screen),
            transaction: None,
            depth: 0,
            build_queue: runtime.new_queue("build"),
            layout_queue: runtime.new_queue("layout"),
        }
    }

    /// The context of `description` rendered under `self`: inherited
    /// attributes fall back to the parent's, local ones are the child's own.
    pub fn child(&self, description: &ViewDescription) -> Self {
        Self {
            attributes: description.attributes().merge(&self.attributes),
            depth: self.depth + 1,
            ..self.clone()
        }
    }

    /// Layers `attributes` over this context with the shallow rule.
    pub fn merge_from(&self, attributes: &Attributes) -> Self {
        Self {
            attributes: attributes.merge(&self.attributes),
            ..self.clone()
        }
    }

    /// Layers `attributes` over this context, local attributes included.
    pub fn complete(&self, attributes: &Attributes) -> Self {
        Self {
            attributes: attributes.complete_merge(&self.attributes),
            ..self.clone()
        }
    }

    pub fn with_transaction(&self, transaction: impl Into<Option<Transaction>>) -> Self {
        Self {
            transaction: transaction.into(),
            ..self.clone()
        }
    }

    /// The context a subtree starts from once it becomes the root of
    /// `target`. Only inherited attributes survive. The accent color comes
    /// from the presenting screen's tint for navigation, and from the
    /// context itself for direct assignment, each falling back to the other
    /// source.
    pub fn transfer_to_screen(&self, target: &Rc<HostScreen>, kind: TransferKind) -> Self {
        let mut attributes = self.attributes.inherited_only();
        let own_accent = self.attributes.inherited.accent_color;
        attributes.inherited.accent_color = match kind {
            TransferKind::Navigation => self
                .screen
                .upgrade()
                .and_then(|source| source.tint())
                .or(own_accent),
            TransferKind::Direct => own_accent.or_else(|| target.tint()),
        };
        Self {
            attributes,
            screen: Rc::downgrade(target),
            transaction: None,
            depth: 0,
            build_queue: self.build_queue.clone(),
            layout_queue: self.layout_queue.clone(),
        }
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn screen(&self) -> Option<Rc<HostScreen>> {
        self.screen.upgrade()
    }

    /// Runs `f` against the hosting screen; a no-op once it is gone.
    pub fn with_screen<R>(&self, f: impl FnOnce(&HostScreen) -> R) -> Option<R> {
        match self.screen.upgrade() {
            Some(screen) => Some(f(&screen)),
            None => {
                log::debug!("hosting screen gone; skipping screen operation");
                None
            }
        }
    }

    pub fn transaction(&self) -> Option<Transaction> {
        self.transaction
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn build_queue(&self) -> &OperationQueue {
        &self.build_queue
    }

    pub fn layout_queue(&self) -> &OperationQueue {
        &self.layout_queue
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("depth", &self.depth)
            .field("transaction", &self.transaction)
            .field("screen", &self.screen.upgrade().map(|s| s.name().to_owned()))
            .field("attributes", &self.attributes)
            .finish()
    }
}

thread_local! {
    static CURRENT: RefCell<Vec<Context>> = const { RefCell::new(Vec::new()) };
}

struct ContextGuard;

impl Drop for ContextGuard {
    fn drop(&mut self) {
        CURRENT.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Makes `context` readable through [`with_current`] while `f` runs.
pub fn enter<R>(context: Context, f: impl FnOnce() -> R) -> R {
    CURRENT.with(|stack| stack.borrow_mut().push(context));
    let _guard = ContextGuard;
    f()
}

/// Reads the context of the render pass in progress.
///
/// # Panics
///
/// Panics when called outside a render pass.
pub fn with_current<R>(f: impl FnOnce(&Context) -> R) -> R {
    let context = try_current();
    match context {
        Some(context) => f(&context),
        None => panic!("context read outside of a render pass"),
    }
}

pub fn try_current() -> Option<Context> {
    CURRENT.with(|stack| stack.borrow().last().cloned())
}
