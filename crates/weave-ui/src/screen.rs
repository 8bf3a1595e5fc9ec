//! The hosting screen of a rendered tree.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use weave_core::WidgetId;
use weave_graphics::Color;
use weave_layout::{ConstraintRegistry, ConstraintSet};

/// Liveness marker of a widget. The side table owns the only strong
/// reference; callbacks registered against the widget hold it weakly.
#[derive(Debug)]
pub struct WidgetToken {
    id: WidgetId,
}

impl WidgetToken {
    pub fn new(id: WidgetId) -> Rc<Self> {
        Rc::new(Self { id })
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }
}

struct LifecycleEntry {
    widget: WidgetId,
    token: Weak<WidgetToken>,
    callback: Rc<dyn Fn()>,
}

impl LifecycleEntry {
    fn is_live(&self) -> bool {
        self.token.strong_count() > 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Lifecycle {
    Appear,
    Disappear,
}

pub struct HostScreen {
    name: String,
    tint: Cell<Option<Color>>,
    loaded: Cell<bool>,
    appear: RefCell<Vec<LifecycleEntry>>,
    disappear: RefCell<Vec<LifecycleEntry>>,
    pending: RefCell<Vec<ConstraintSet>>,
}

impl HostScreen {
    pub fn new(name: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            tint: Cell::new(None),
            loaded: Cell::new(false),
            appear: RefCell::new(Vec::new()),
            disappear: RefCell::new(Vec::new()),
            pending: RefCell::new(Vec::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tint(&self) -> Option<Color> {
        self.tint.get()
    }

    pub fn set_tint(&self, tint: Option<Color>) {
        self.tint.set(tint);
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.get()
    }

    pub fn set_loaded(&self, loaded: bool) {
        self.loaded.set(loaded);
    }

    fn entries(&self, lifecycle: Lifecycle) -> &RefCell<Vec<LifecycleEntry>> {
        match lifecycle {
            Lifecycle::Appear => &self.appear,
            Lifecycle::Disappear => &self.disappear,
        }
    }

    fn register(
        &self,
        lifecycle: Lifecycle,
        token: &Rc<WidgetToken>,
        callback: impl Fn() + 'static,
    ) {
        let mut entries = self.entries(lifecycle).borrow_mut();
        entries.retain(|entry| entry.is_live() && entry.widget != token.id);
        entries.push(LifecycleEntry {
            widget: token.id,
            token: Rc::downgrade(token),
            callback: Rc::new(callback),
        });
    }

    /// Sets the appear callback of a widget, replacing any previous one.
    pub fn on_appear(&self, token: &Rc<WidgetToken>, callback: impl Fn() + 'static) {
        self.register(Lifecycle::Appear, token, callback);
    }

    /// Sets the disappear callback of a widget, replacing any previous one.
    pub fn on_disappear(&self, token: &Rc<WidgetToken>, callback: impl Fn() + 'static) {
        self.register(Lifecycle::Disappear, token, callback);
    }

    fn fire(&self, lifecycle: Lifecycle, widget: Option<WidgetId>) -> usize {
        let callbacks: Vec<Rc<dyn Fn()>> = {
            let mut entries = self.entries(lifecycle).borrow_mut();
            entries.retain(LifecycleEntry::is_live);
            entries
                .iter()
                .filter(|entry| widget.map_or(true, |id| entry.widget == id))
                .map(|entry| Rc::clone(&entry.callback))
                .collect()
        };
        for callback in &callbacks {
            callback();
        }
        callbacks.len()
    }

    pub fn appear(&self, widget: WidgetId) -> usize {
        self.fire(Lifecycle::Appear, Some(widget))
    }

    pub fn disappear(&self, widget: WidgetId) -> usize {
        self.fire(Lifecycle::Disappear, Some(widget))
    }

    /// Fires the appear callback of every live widget on this screen.
    pub fn appear_all(&self) -> usize {
        self.fire(Lifecycle::Appear, None)
    }

    pub fn disappear_all(&self) -> usize {
        self.fire(Lifecycle::Disappear, None)
    }

    /// Drops both callbacks of `widget`.
    pub fn forget(&self, widget: WidgetId) {
        for lifecycle in [Lifecycle::Appear, Lifecycle::Disappear] {
            self.entries(lifecycle)
                .borrow_mut()
                .retain(|entry| entry.is_live() && entry.widget != widget);
        }
    }

    pub fn callback_count(&self) -> usize {
        [&self.appear, &self.disappear]
            .iter()
            .map(|entries| entries.borrow().iter().filter(|e| e.is_live()).count())
            .sum()
    }

    /// Parks constraints until the screen's hierarchy is attached.
    pub fn queue_constraints(&self, set: ConstraintSet) {
        if !set.is_empty() {
            self.pending.borrow_mut().push(set);
        }
    }

    pub fn pending_constraints(&self) -> usize {
        self.pending.borrow().iter().map(ConstraintSet::len).sum()
    }

    /// Activates every parked constraint whose widgets are still alive.
    pub fn flush_constraints(
        &self,
        registry: &mut ConstraintRegistry,
        is_live: impl Fn(WidgetId) -> bool,
    ) -> usize {
        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        let mut activated = 0;
        for set in pending {
            let live = set
                .iter()
                .all(|c| is_live(c.item) && c.target.widget().map_or(true, &is_live));
            if live {
                activated += registry.activate(set).len();
            } else {
                log::debug!("dropping parked constraints of a destroyed widget");
            }
        }
        activated
    }
}

impl fmt::Debug for HostScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostScreen")
            .field("name", &self.name)
            .field("loaded", &self.loaded.get())
            .field("tint", &self.tint.get())
            .field("pending_constraints", &self.pending_constraints())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_layout::{Alignment, LayoutSolver, SolveRequest};

    #[test]
    fn callbacks_of_dropped_widgets_are_skipped() {
        let screen = HostScreen::new("menu");
        let hits = Rc::new(Cell::new(0));
        let live = WidgetToken::new(1);
        let dead = WidgetToken::new(2);
        for token in [&live, &dead] {
            let hits = hits.clone();
            screen.on_appear(token, move || hits.set(hits.get() + 1));
        }
        drop(dead);

        assert_eq!(screen.appear_all(), 1);
        assert_eq!(hits.get(), 1);
        assert_eq!(screen.appear(2), 0);
    }

    #[test]
    fn registering_again_replaces_the_callback() {
        let screen = HostScreen::new("menu");
        let token = WidgetToken::new(4);
        screen.on_disappear(&token, || {});
        screen.on_disappear(&token, || {});
        assert_eq!(screen.callback_count(), 1);
        screen.forget(4);
        assert_eq!(screen.callback_count(), 0);
    }

    #[test]
    fn parked_constraints_flush_once() {
        let screen = HostScreen::new("menu");
        let set = LayoutSolver::new().solve(
            &SolveRequest::align(1, 2, Alignment::CENTER),
            &ConstraintRegistry::new(),
        );
        let count = set.len();
        screen.queue_constraints(set);
        assert_eq!(screen.pending_constraints(), count);

        let mut registry = ConstraintRegistry::new();
        assert_eq!(screen.flush_constraints(&mut registry, |_| true), count);
        assert_eq!(screen.flush_constraints(&mut registry, |_| true), 0);
        assert_eq!(registry.len(), count);
    }

    #[test]
    fn parked_constraints_of_destroyed_widgets_are_dropped() {
        let screen = HostScreen::new("menu");
        screen.queue_constraints(LayoutSolver::new().solve(
            &SolveRequest::expand(1, 2),
            &ConstraintRegistry::new(),
        ));
        let mut registry = ConstraintRegistry::new();
        assert_eq!(screen.flush_constraints(&mut registry, |id| id != 2), 0);
        assert!(registry.is_empty());
    }
}
