//! The entry point hosts drive: mounting content and processing frames.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use weave_core::{Runtime, WidgetId};
use weave_layout::ConstraintRegistry;

use crate::context::Context;
use crate::error::WidgetError;
use crate::reconciler::{AppliedDiff, Reconciler};
use crate::renderable::RenderableRegistry;
use crate::screen::HostScreen;
use crate::view::{ContainerKind, ViewDescription};
use crate::widget::WidgetHost;

/// A description tree mounted into a widget host under one screen.
///
/// Rendering is pull-based: state writes only mark renderers invalid and
/// request a frame; [`RenderTree::process_invalid`] re-renders them.
pub struct RenderTree<H: WidgetHost + 'static> {
    runtime: Runtime,
    reconciler: Rc<RefCell<Reconciler<H>>>,
    screen: Rc<HostScreen>,
    context: Context,
    root: Option<WidgetId>,
}

impl<H: WidgetHost + 'static> RenderTree<H> {
    pub fn new(host: H, renderables: RenderableRegistry) -> Self {
        Self::with_runtime(host, renderables, Runtime::default())
    }

    pub fn with_runtime(host: H, renderables: RenderableRegistry, runtime: Runtime) -> Self {
        let screen = HostScreen::new("root");
        let context = Context::root(&runtime, &screen);
        let reconciler = Reconciler::new(host, renderables, runtime.clone());
        Self {
            runtime,
            reconciler,
            screen,
            context,
            root: None,
        }
    }

    /// Builds `content` inside a fresh screen widget, replacing whatever was
    /// mounted before. Returns the screen widget.
    pub fn mount(&mut self, content: ViewDescription) -> Result<WidgetId, WidgetError> {
        self.runtime.assert_ui_thread();
        self.unmount();
        let root = ViewDescription::container(ContainerKind::Screen, vec![content]);
        let id = self
            .reconciler
            .borrow_mut()
            .build(&root, &self.context, None)?;
        self.root = Some(id);
        log::debug!("mounted screen widget {id}");
        self.settle()?;
        Ok(id)
    }

    /// Destroys the mounted tree, firing disappear callbacks.
    pub fn unmount(&mut self) {
        if let Some(root) = self.root.take() {
            self.reconciler.borrow_mut().destroy(root);
        }
        self.screen.set_loaded(false);
    }

    /// Runs deferred builds, finishes attaching the screen and then runs
    /// layout-phase work. Never called with the reconciler borrowed.
    fn settle(&mut self) -> Result<(), WidgetError> {
        self.context.build_queue().drain()?;
        if !self.screen.is_loaded() {
            self.screen.set_loaded(true);
        }
        let flushed = self.reconciler.borrow_mut().flush_constraints(&self.screen);
        if flushed > 0 {
            log::trace!("activated {flushed} parked constraint sets");
        }
        self.context.layout_queue().drain()?;
        Ok(())
    }

    pub fn needs_render(&self) -> bool {
        self.runtime.has_invalid()
    }

    /// Re-renders every invalid renderer, shallowest first, until a pass
    /// invalidates nothing. Returns the number of passes.
    pub fn process_invalid(&mut self) -> Result<usize, WidgetError> {
        self.runtime.assert_ui_thread();
        let limit = self.runtime.config().max_drain_rounds;
        let mut rounds = 0;
        while self.runtime.has_invalid() {
            if rounds == limit {
                let dropped = self.runtime.take_invalid();
                log::error!(
                    "render pass still dirty after {rounds} rounds; dropping {} renderers",
                    dropped.len()
                );
                return Err(WidgetError::RenderLoop { rounds });
            }
            rounds += 1;
            let invalid = self.runtime.take_invalid();
            let mut targets: Vec<(usize, WidgetId)> = {
                let reconciler = self.reconciler.borrow();
                invalid
                    .iter()
                    .filter_map(|renderer| reconciler.widget_for_renderer(*renderer))
                    .collect()
            };
            targets.sort_by_key(|(depth, _)| *depth);
            for (_, widget) in targets {
                self.reconciler.borrow_mut().rerender(widget)?;
            }
            self.settle()?;
        }
        self.runtime.set_needs_frame(false);
        Ok(rounds)
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn screen(&self) -> &Rc<HostScreen> {
        &self.screen
    }

    /// The screen widget.
    pub fn root(&self) -> Option<WidgetId> {
        self.root
    }

    /// The widget built for the mounted content.
    pub fn content(&self) -> Option<WidgetId> {
        let root = self.root?;
        self.children_of(root).first().copied()
    }

    pub fn children_of(&self, id: WidgetId) -> Vec<WidgetId> {
        self.reconciler.borrow().widgets().children(id)
    }

    pub fn description_of(&self, id: WidgetId) -> Option<ViewDescription> {
        self.reconciler.borrow().widgets().description(id)
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.reconciler.borrow().widgets().contains(id)
    }

    pub fn host(&self) -> Ref<'_, H> {
        Ref::map(self.reconciler.borrow(), |reconciler| reconciler.host())
    }

    pub fn host_mut(&self) -> RefMut<'_, H> {
        RefMut::map(self.reconciler.borrow_mut(), |reconciler| reconciler.host_mut())
    }

    pub fn registry(&self) -> Ref<'_, ConstraintRegistry> {
        Ref::map(self.reconciler.borrow(), |reconciler| reconciler.constraints())
    }

    pub fn render_count(&self, id: WidgetId) -> Option<usize> {
        self.reconciler
            .borrow()
            .renderer(id)
            .map(|renderer| renderer.render_count())
    }

    pub fn record_diffs(&self, enabled: bool) {
        self.reconciler.borrow_mut().record_diffs(enabled);
    }

    pub fn take_recorded_diffs(&self) -> Vec<AppliedDiff> {
        self.reconciler.borrow_mut().take_recorded_diffs()
    }
}

impl<H: WidgetHost + 'static> Drop for RenderTree<H> {
    fn drop(&mut self) {
        if let Ok(mut reconciler) = self.reconciler.try_borrow_mut() {
            if let Some(root) = self.root.take() {
                reconciler.destroy(root);
            }
        }
    }
}
