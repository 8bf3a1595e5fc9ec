//! Re-evaluation units.
//!
//! A [`Renderer`] owns one component's body. Evaluating it pushes the
//! renderer onto the subscription stack so every state read inside the body
//! subscribes it; a later change marks it invalid and registers it with the
//! runtime for the next render pass.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use weave_core::{
    subscription, Binding, ChangeEvent, ObservableObject, RuntimeHandle, StateCell, Subscriber,
    SubscriberId, Transaction,
};

use crate::context::{self, Context};
use crate::view::ViewDescription;

struct RendererInner {
    id: SubscriberId,
    name: &'static str,
    runtime: RuntimeHandle,
    depth: usize,
    invalid: Cell<bool>,
    active: Cell<bool>,
    transaction: Cell<Option<Transaction>>,
    slots: RefCell<Vec<Box<dyn Any>>>,
    render_count: Cell<usize>,
}

impl Subscriber for RendererInner {
    fn subscriber_id(&self) -> SubscriberId {
        self.id
    }

    fn on_change(&self, event: &ChangeEvent) {
        if !self.active.get() {
            return;
        }
        if event.transaction.is_some() || !self.invalid.get() {
            self.transaction.set(event.transaction);
        }
        self.invalid.set(true);
        log::trace!("renderer `{}` ({}) invalidated", self.name, self.id);
        self.runtime.register_invalid(self.id);
    }
}

#[derive(Clone)]
pub struct Renderer {
    inner: Rc<RendererInner>,
}

impl Renderer {
    pub fn new(runtime: RuntimeHandle, name: &'static str, depth: usize) -> Self {
        Self {
            inner: Rc::new(RendererInner {
                id: weave_core::next_subscriber_id(),
                name,
                runtime,
                depth,
                invalid: Cell::new(false),
                active: Cell::new(true),
                transaction: Cell::new(None),
                slots: RefCell::new(Vec::new()),
                render_count: Cell::new(0),
            }),
        }
    }

    pub fn id(&self) -> SubscriberId {
        self.inner.id
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    pub fn depth(&self) -> usize {
        self.inner.depth
    }

    pub fn is_invalid(&self) -> bool {
        self.inner.invalid.get()
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.get()
    }

    pub fn render_count(&self) -> usize {
        self.inner.render_count.get()
    }

    /// Transaction of the change that invalidated this renderer, if any.
    pub fn take_transaction(&self) -> Option<Transaction> {
        self.inner.transaction.take()
    }

    pub fn as_subscriber(&self) -> Rc<dyn Subscriber> {
        self.inner.clone()
    }

    /// Runs `body` with this renderer attributed and `context` current.
    pub fn evaluate(
        &self,
        context: &Context,
        body: &dyn Fn(&mut RenderScope<'_>) -> ViewDescription,
    ) -> ViewDescription {
        self.inner.invalid.set(false);
        self.inner.runtime.mark_rendered(self.inner.id);
        let mut scope = RenderScope {
            renderer: self,
            context,
            slot: 0,
        };
        let description = subscription::enter_render(self.as_subscriber(), || {
            context::enter(context.clone(), || body(&mut scope))
        });
        let used = scope.slot;
        let mut slots = self.inner.slots.borrow_mut();
        if slots.len() > used {
            slots.truncate(used);
        }
        drop(slots);
        self.inner
            .render_count
            .set(self.inner.render_count.get() + 1);
        description
    }

    /// Runs `f` with reads attributed to this renderer, outside of its body.
    /// Writes to state this renderer owns are allowed.
    pub fn attribute<R>(&self, f: impl FnOnce() -> R) -> R {
        subscription::enter(self.as_subscriber(), f)
    }

    /// Stops reacting to changes and drops remembered values.
    pub fn deactivate(&self) {
        self.inner.active.set(false);
        self.inner.invalid.set(false);
        self.inner.runtime.mark_rendered(self.inner.id);
        let slots = std::mem::take(&mut *self.inner.slots.borrow_mut());
        drop(slots);
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("invalid", &self.inner.invalid.get())
            .field("active", &self.inner.active.get())
            .field("renders", &self.inner.render_count.get())
            .finish()
    }
}

/// What a component body sees while it is evaluated.
///
/// Remembered values live in call-order slots: the n-th `remember` of one
/// evaluation reads the value stored by the n-th `remember` of the previous
/// one.
pub struct RenderScope<'a> {
    renderer: &'a Renderer,
    context: &'a Context,
    slot: usize,
}

impl<'a> RenderScope<'a> {
    pub fn context(&self) -> &Context {
        self.context
    }

    pub fn transaction(&self) -> Option<Transaction> {
        self.context.transaction()
    }

    pub fn renderer_id(&self) -> SubscriberId {
        self.renderer.id()
    }

    pub fn remember<T: Clone + 'static>(&mut self, init: impl FnOnce() -> T) -> T {
        let index = self.slot;
        self.slot += 1;
        let mut slots = self.renderer.inner.slots.borrow_mut();
        if let Some(value) = slots.get(index).and_then(|slot| slot.downcast_ref::<T>()) {
            return value.clone();
        }
        // Values are created without holding the slot table, so `init` may
        // itself read state.
        drop(slots);
        let value = init();
        slots = self.renderer.inner.slots.borrow_mut();
        let boxed: Box<dyn Any> = Box::new(value.clone());
        if index < slots.len() {
            log::debug!(
                "renderer `{}` slot {index} changed type; resetting",
                self.renderer.name()
            );
            slots[index] = boxed;
        } else {
            slots.push(boxed);
        }
        value
    }

    /// A cell owned by this renderer. It survives re-renders; writing it
    /// from this renderer's own body panics.
    pub fn state<T: 'static>(&mut self, init: impl FnOnce() -> T) -> StateCell<T> {
        let owner = self.renderer.id();
        self.remember(|| StateCell::with_owner(init(), owner))
    }

    /// A binding to a cell owned by this renderer.
    pub fn binding<T: Clone + PartialEq + 'static>(
        &mut self,
        init: impl FnOnce() -> T,
    ) -> (StateCell<T>, Binding<T>) {
        let cell = self.state(init);
        let binding = Binding::from_cell(&cell);
        (cell, binding)
    }

    /// An observable object created on first render and kept across
    /// re-renders. Any published change re-renders this renderer.
    pub fn state_object<O: ObservableObject + 'static>(
        &mut self,
        init: impl FnOnce() -> O,
    ) -> Rc<O> {
        let object = self.remember(|| Rc::new(init()));
        self.observe(&*object);
        object
    }

    /// Subscribes to an object owned elsewhere.
    pub fn observed_object<O: ObservableObject + 'static>(&mut self, object: &Rc<O>) -> Rc<O> {
        self.observe(&**object);
        Rc::clone(object)
    }

    fn observe<O: ObservableObject + ?Sized>(&self, object: &O) {
        object
            .object_will_change()
            .subscribe(&self.renderer.as_subscriber());
    }
}
