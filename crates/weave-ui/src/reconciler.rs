//! Applying descriptions to the live widget tree.
//!
//! The reconciler owns the widget host and the side table. Each live widget
//! has an entry holding the description that last rendered it, so the next
//! pass diffs against that description instead of a separate shadow tree.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use weave_core::{Runtime, RuntimeConfig, SubscriberId, Transaction, WidgetId};
use weave_graphics::EdgeInsets;
use weave_layout::{
    Alignment, ConstraintRegistry, ConstraintSet, ConstraintTarget, Expansion, LayoutSolver,
    SolveRequest,
};

use crate::context::Context;
use crate::diff::{diff_keyed, diff_positional, DiffOperation};
use crate::error::WidgetError;
use crate::renderable::{ContainerWidget, RenderableRegistry};
use crate::renderer::Renderer;
use crate::screen::WidgetToken;
use crate::side_table::{WidgetEntry, WidgetTable};
use crate::view::{ChildMode, ContainerKind, ViewDescription, ViewNode};
use crate::widget::WidgetHost;

/// Operations applied to the children of one widget.
#[derive(Clone, Debug)]
pub struct AppliedDiff {
    pub parent: WidgetId,
    pub operations: Vec<DiffOperation>,
}

pub struct Reconciler<H: WidgetHost + 'static> {
    host: H,
    widgets: WidgetTable,
    renderables: RenderableRegistry,
    constraints: ConstraintRegistry,
    solver: LayoutSolver,
    runtime: Runtime,
    config: RuntimeConfig,
    recorded: Option<Vec<AppliedDiff>>,
    this: Weak<RefCell<Reconciler<H>>>,
}

impl<H: WidgetHost + 'static> Reconciler<H> {
    pub fn new(host: H, renderables: RenderableRegistry, runtime: Runtime) -> Rc<RefCell<Self>> {
        let config = runtime.config().clone();
        Rc::new_cyclic(|this| {
            RefCell::new(Self {
                host,
                widgets: WidgetTable::new(),
                renderables,
                constraints: ConstraintRegistry::new(),
                solver: LayoutSolver::new(),
                runtime,
                config,
                recorded: None,
                this: this.clone(),
            })
        })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn constraints(&self) -> &ConstraintRegistry {
        &self.constraints
    }

    pub fn widgets(&self) -> &WidgetTable {
        &self.widgets
    }

    pub fn renderer(&self, id: WidgetId) -> Option<Renderer> {
        self.widgets.get(id).and_then(|entry| entry.renderer.clone())
    }

    /// The widget owning `renderer`, with the renderer's depth.
    pub fn widget_for_renderer(&self, renderer: SubscriberId) -> Option<(usize, WidgetId)> {
        let widget = self.widgets.owner_of(renderer)?;
        let depth = self.renderer(widget)?.depth();
        Some((depth, widget))
    }

    pub fn record_diffs(&mut self, enabled: bool) {
        self.recorded = enabled.then(Vec::new);
    }

    pub fn take_recorded_diffs(&mut self) -> Vec<AppliedDiff> {
        self.recorded
            .as_mut()
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Creates the widget subtree for `description` under `parent`.
    pub fn build(
        &mut self,
        description: &ViewDescription,
        parent_context: &Context,
        parent: Option<WidgetId>,
    ) -> Result<WidgetId, WidgetError> {
        if let ViewNode::Fragment(_) = description.node() {
            let wrapped = wrap_fragment(description);
            return self.build(&wrapped, parent_context, parent);
        }

        let context = parent_context.child(description);
        let id = match description.node() {
            ViewNode::Component(_) => self
                .host
                .create(Box::new(ContainerWidget::new(ContainerKind::Host))),
            _ => {
                let kind = description.kind();
                let renderable = self
                    .renderables
                    .get(kind)
                    .ok_or(WidgetError::Unregistered { kind })?;
                renderable.create_view(description, &context, &mut self.host)
            }
        };
        log::trace!("created widget {id} for {:?}", description.kind());

        let token = WidgetToken::new(id);
        self.widgets.insert(
            id,
            WidgetEntry {
                description: description.clone(),
                context: context.clone(),
                parent,
                children: Vec::new(),
                renderer: None,
                token: Rc::clone(&token),
                children_built: false,
            },
        );
        self.register_lifecycle(&token, None, description, &context);
        if description.attributes().local.on_appear.is_some() {
            enqueue_appear(&context, id);
        }

        let built = match description.node() {
            ViewNode::Container(spec) if spec.lazy => {
                self.defer_children(id, &context);
                Ok(())
            }
            ViewNode::Container(_) => self.build_children(id),
            ViewNode::Component(_) => self.render_component(id, context.transaction()),
            ViewNode::Leaf(_) | ViewNode::Fragment(_) => Ok(()),
        };
        if let Err(error) = built {
            log::debug!("discarding partially built widget {id}: {error}");
            self.discard(id);
            return Err(error);
        }
        Ok(id)
    }

    fn build_children(&mut self, id: WidgetId) -> Result<(), WidgetError> {
        let (children, context) = match self.widgets.get(id) {
            Some(entry) => (entry.description.flatten_children(), entry.context.clone()),
            None => return Ok(()),
        };
        let mut built = Vec::with_capacity(children.len());
        let mut result = Ok(());
        for (index, child) in children.iter().enumerate() {
            let child_id = match self.build(child, &context, Some(id)) {
                Ok(child_id) => child_id,
                Err(error) => {
                    result = Err(error);
                    break;
                }
            };
            if let Err(error) = self.attach(id, index, child_id) {
                self.discard(child_id);
                result = Err(error);
                break;
            }
            built.push(child_id);
        }
        if let Some(entry) = self.widgets.get_mut(id) {
            entry.children = built;
            entry.children_built = true;
        }
        result
    }

    fn defer_children(&self, id: WidgetId, context: &Context) {
        let this = self.this.clone();
        context.build_queue().enqueue(move || {
            let Some(reconciler) = this.upgrade() else {
                return;
            };
            let Ok(mut reconciler) = reconciler.try_borrow_mut() else {
                log::error!("deferred build of widget {id} ran during a reconciliation");
                return;
            };
            let pending = reconciler
                .widgets
                .get(id)
                .is_some_and(|entry| !entry.children_built);
            if pending {
                if let Err(error) = reconciler.build_children(id) {
                    log::warn!("deferred build of widget {id} failed: {error}");
                }
            }
        });
    }

    fn attach(&mut self, parent: WidgetId, index: usize, child: WidgetId) -> Result<(), WidgetError> {
        self.host.get_mut(parent)?.insert_child(index, child);
        self.layout_child(parent, child);
        Ok(())
    }

    fn parent_kind(&self, parent: WidgetId) -> Option<ContainerKind> {
        match self.widgets.get(parent)?.description.node() {
            ViewNode::Container(spec) => Some(spec.kind),
            ViewNode::Component(_) => Some(ContainerKind::Host),
            ViewNode::Leaf(_) | ViewNode::Fragment(_) => None,
        }
    }

    fn layout_child(&mut self, parent: WidgetId, child: WidgetId) {
        let Some(parent_kind) = self.parent_kind(parent) else {
            return;
        };
        if !parent_kind.constrains_children() {
            return;
        }
        let (Some(parent_entry), Some(child_entry)) =
            (self.widgets.get(parent), self.widgets.get(child))
        else {
            return;
        };
        let local = &child_entry.description.attributes().local;
        let expansion = local.expansion.unwrap_or_default();
        let mut request = if parent_kind == ContainerKind::Host || expansion == Expansion::ALL {
            SolveRequest::expand(parent, child)
        } else {
            SolveRequest::align(parent, child, local.alignment.unwrap_or(Alignment::CENTER))
                .expansion(expansion)
        };
        request = request.ignoring_safe_area(local.ignores_safe_area.unwrap_or_default());
        if parent_kind != ContainerKind::Host {
            let padding = parent_entry.description.attributes().local.padding;
            request = request.insets(padding.unwrap_or(EdgeInsets::ZERO));
        }
        if parent_kind == ContainerKind::Screen {
            request = request.also_bound_by(ConstraintTarget::Window);
        }
        let context = child_entry.context.clone();
        let set = self.solver.solve(&request, &self.constraints);
        self.commit_layout(&context, set);
    }

    /// Activates `set`, or parks it on the screen while the screen's
    /// hierarchy is still being attached.
    fn commit_layout(&mut self, context: &Context, set: ConstraintSet) {
        match context.screen() {
            Some(screen) if !screen.is_loaded() => screen.queue_constraints(set),
            Some(_) => {
                self.constraints.activate(set);
            }
            None => {
                log::debug!("no hosting screen; activating constraints directly");
                self.constraints.activate(set);
            }
        }
    }

    fn relayout(&mut self, id: WidgetId) {
        let Some(parent) = self.widgets.get(id).and_then(|entry| entry.parent) else {
            return;
        };
        self.constraints.release_item(id);
        self.layout_child(parent, id);
    }

    /// Activates constraints parked on `screen` whose widgets still exist.
    pub fn flush_constraints(&mut self, screen: &crate::screen::HostScreen) -> usize {
        let widgets = &self.widgets;
        screen.flush_constraints(&mut self.constraints, |id| widgets.contains(id))
    }

    fn register_lifecycle(
        &self,
        token: &Rc<WidgetToken>,
        previous: Option<&ViewDescription>,
        description: &ViewDescription,
        context: &Context,
    ) {
        let local = &description.attributes().local;
        let had_callbacks = previous.is_some_and(|previous| {
            let local = &previous.attributes().local;
            local.on_appear.is_some() || local.on_disappear.is_some()
        });
        if !had_callbacks && local.on_appear.is_none() && local.on_disappear.is_none() {
            return;
        }
        context.with_screen(|screen| {
            if had_callbacks {
                screen.forget(token.id());
            }
            if let Some(chain) = local.on_appear.clone() {
                screen.on_appear(token, move || chain.invoke());
            }
            if let Some(chain) = local.on_disappear.clone() {
                screen.on_disappear(token, move || chain.invoke());
            }
        });
    }

    fn child_descriptions(&self, id: WidgetId) -> Vec<ViewDescription> {
        self.widgets
            .children(id)
            .into_iter()
            .filter_map(|child| self.widgets.description(child))
            .collect()
    }

    /// Evaluates the component owned by widget `id` and reconciles its body.
    fn render_component(
        &mut self,
        id: WidgetId,
        inherited: Option<Transaction>,
    ) -> Result<(), WidgetError> {
        let Some(entry) = self.widgets.get(id) else {
            return Ok(());
        };
        let ViewNode::Component(spec) = entry.description.node() else {
            return Ok(());
        };
        let body = Rc::clone(&spec.body);
        let name = spec.name;
        let component = entry.description.clone();
        let context = entry.context.clone();
        let existing = entry.renderer.clone();
        let renderer = match existing {
            Some(renderer) => renderer,
            None => {
                let renderer = Renderer::new(self.runtime.handle(), name, context.depth());
                self.widgets.set_renderer(id, renderer.clone());
                renderer
            }
        };

        let render_context = context.with_transaction(renderer.take_transaction().or(inherited));
        let output = renderer.evaluate(&render_context, &*body);
        let output = finalize_body(output, &component);
        log::trace!("rendered `{name}` into {:?}", output.kind());

        let previous = self.child_descriptions(id);
        let operations = diff_positional(&previous, std::slice::from_ref(&output));
        renderer.attribute(|| self.apply(id, &render_context, operations))
    }

    /// Re-renders the component at `id` if its renderer is still invalid.
    pub fn rerender(&mut self, id: WidgetId) -> Result<bool, WidgetError> {
        let Some(renderer) = self.renderer(id) else {
            return Ok(false);
        };
        if !renderer.is_active() || !renderer.is_invalid() {
            return Ok(false);
        }
        self.render_component(id, None)?;
        Ok(true)
    }

    /// Brings widget `id` in line with `next`, which has the same kind as
    /// the description that last rendered it.
    pub fn update(
        &mut self,
        id: WidgetId,
        next: &ViewDescription,
        parent_context: &Context,
    ) -> Result<(), WidgetError> {
        let context = parent_context.child(next);
        let Some(entry) = self.widgets.get_mut(id) else {
            log::debug!("update of unknown widget {id} skipped");
            return Ok(());
        };
        let previous = std::mem::replace(&mut entry.description, next.clone());
        entry.context = context.clone();
        let token = Rc::clone(&entry.token);
        let children_built = entry.children_built;

        self.register_lifecycle(&token, Some(&previous), next, &context);
        if previous.attributes().local.layout_key() != next.attributes().local.layout_key() {
            self.relayout(id);
        }

        match next.node() {
            ViewNode::Component(_) => self.render_component(id, context.transaction()),
            ViewNode::Fragment(_) => Ok(()),
            ViewNode::Leaf(_) | ViewNode::Container(_) => {
                let kind = next.kind();
                match self.renderables.get(kind) {
                    Some(renderable) => {
                        if let Err(error) =
                            renderable.update_view(id, next, &context, &mut self.host)
                        {
                            log::debug!("update of widget {id} skipped: {error}");
                        }
                    }
                    None => log::debug!("no renderable for {kind:?}; update skipped"),
                }
                if children_built {
                    let children = next.flatten_children();
                    self.reconcile_children(id, &children, next.child_mode())?;
                }
                Ok(())
            }
        }
    }

    /// Diffs `children` against the live children of `parent` and applies
    /// the result.
    pub fn reconcile_children(
        &mut self,
        parent: WidgetId,
        children: &[ViewDescription],
        mode: ChildMode,
    ) -> Result<(), WidgetError> {
        let Some(context) = self.widgets.get(parent).map(|entry| entry.context.clone()) else {
            return Ok(());
        };
        let previous = self.child_descriptions(parent);
        let operations = match mode {
            ChildMode::Keyed => diff_keyed(&previous, children),
            ChildMode::Positional => diff_positional(&previous, children),
        };
        self.apply(parent, &context, operations)
    }

    fn apply(
        &mut self,
        parent: WidgetId,
        context: &Context,
        operations: Vec<DiffOperation>,
    ) -> Result<(), WidgetError> {
        if self.config.debug_diffs {
            log::debug!("widget {parent}: {operations:?}");
        }
        if let Some(recorded) = &mut self.recorded {
            recorded.push(AppliedDiff {
                parent,
                operations: operations.clone(),
            });
        }
        let mut children = self.widgets.children(parent);
        let mut result = Ok(());
        for operation in operations {
            if let Err(error) = self.apply_one(parent, context, &mut children, operation) {
                result = Err(error);
                break;
            }
        }
        if let Some(entry) = self.widgets.get_mut(parent) {
            entry.children = children;
            entry.children_built = true;
        }
        result
    }

    fn apply_one(
        &mut self,
        parent: WidgetId,
        context: &Context,
        children: &mut Vec<WidgetId>,
        operation: DiffOperation,
    ) -> Result<(), WidgetError> {
        match operation {
            DiffOperation::Remove { index } => {
                if index >= children.len() {
                    log::warn!("remove({index}) out of range under widget {parent}");
                    return Ok(());
                }
                let child = children.remove(index);
                self.host.get_mut(parent)?.remove_child(index);
                self.destroy(child);
            }
            DiffOperation::Insert { index, description } => {
                let index = index.min(children.len());
                let child = self.build(&description, context, Some(parent))?;
                if let Err(error) = self.attach(parent, index, child) {
                    self.discard(child);
                    return Err(error);
                }
                children.insert(index, child);
            }
            DiffOperation::Move { from, to } => {
                if from >= children.len() || to >= children.len() {
                    log::warn!("move({from} -> {to}) out of range under widget {parent}");
                    return Ok(());
                }
                let child = children.remove(from);
                children.insert(to, child);
                self.host.get_mut(parent)?.move_child(from, to);
            }
            DiffOperation::Update { index, next, .. } => {
                let Some(&child) = children.get(index) else {
                    log::warn!("update({index}) out of range under widget {parent}");
                    return Ok(());
                };
                self.update(child, &next, context)?;
            }
        }
        Ok(())
    }

    /// Destroys `id` and its subtree: disappear callbacks fire, renderers
    /// stop, constraints are released and the side-table entries go away.
    pub fn destroy(&mut self, id: WidgetId) {
        self.teardown(id, true);
    }

    /// Tears down a subtree that never finished building. Its disappear
    /// callbacks are dropped without firing.
    fn discard(&mut self, id: WidgetId) {
        self.teardown(id, false);
    }

    fn teardown(&mut self, id: WidgetId, notify: bool) {
        let Some(entry) = self.widgets.remove(id) else {
            return;
        };
        entry.context.with_screen(|screen| {
            if notify {
                screen.disappear(id);
            }
            screen.forget(id);
        });
        if let Some(renderer) = &entry.renderer {
            renderer.deactivate();
        }
        for child in entry.children.iter().rev() {
            self.teardown(*child, notify);
        }
        self.constraints.release(id);
        if let Err(error) = self.host.destroy(id) {
            log::debug!("destroying widget {id}: {error}");
        }
        log::trace!("destroyed widget {id}");
    }
}

fn wrap_fragment(fragment: &ViewDescription) -> ViewDescription {
    ViewDescription::vstack(fragment.flatten_children())
        .with_attributes(fragment.attributes().clone())
}

/// The root of a component body, completed with the component's own
/// attributes. Lifecycle callbacks stay with the component's host widget.
fn finalize_body(output: ViewDescription, component: &ViewDescription) -> ViewDescription {
    let output = match output.node() {
        ViewNode::Fragment(_) => wrap_fragment(&output),
        _ => output,
    };
    let mut attributes = output.attributes().complete_merge(component.attributes());
    attributes.local.on_appear = output.attributes().local.on_appear.clone();
    attributes.local.on_disappear = output.attributes().local.on_disappear.clone();
    output.with_attributes(attributes)
}

fn enqueue_appear(context: &Context, id: WidgetId) {
    let Some(screen) = context.screen() else {
        return;
    };
    let screen = Rc::downgrade(&screen);
    context.layout_queue().enqueue(move || {
        if let Some(screen) = screen.upgrade() {
            screen.appear(id);
        }
    });
}
