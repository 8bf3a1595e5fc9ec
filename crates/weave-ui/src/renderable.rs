//! Dispatch from node kinds to the collaborators that build native widgets.

use std::rc::Rc;

use ahash::RandomState;
use hashbrown::HashMap;

use weave_core::WidgetId;
use weave_graphics::{Color, EdgeInsets};

use crate::context::Context;
use crate::error::WidgetError;
use crate::view::{ContainerKind, LeafKind, NodeKind, ViewDescription, ViewNode};
use crate::widget::{NativeWidget, WidgetHost};

/// Creates and updates the native widget of one node kind.
///
/// `update_view` is only called with a widget produced by `create_view` for
/// a description of the same kind, and must leave the widget in the same
/// state when called twice with the same inputs.
pub trait Renderable {
    fn create_view(
        &self,
        description: &ViewDescription,
        context: &Context,
        host: &mut dyn WidgetHost,
    ) -> WidgetId;

    fn update_view(
        &self,
        widget: WidgetId,
        description: &ViewDescription,
        context: &Context,
        host: &mut dyn WidgetHost,
    ) -> Result<(), WidgetError>;
}

pub struct RenderableRegistry {
    entries: HashMap<NodeKind, Rc<dyn Renderable>, RandomState>,
}

impl RenderableRegistry {
    /// A registry with every container kind registered.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        let containers: Rc<dyn Renderable> = Rc::new(ContainerRenderable);
        for kind in ContainerKind::ALL {
            registry
                .entries
                .insert(NodeKind::Container(kind), Rc::clone(&containers));
        }
        registry
    }

    pub fn empty() -> Self {
        Self {
            entries: HashMap::default(),
        }
    }

    pub fn register(&mut self, kind: NodeKind, renderable: impl Renderable + 'static) {
        self.entries.insert(kind, Rc::new(renderable));
    }

    /// Registers one renderable for several leaf kinds.
    pub fn register_leaves(
        &mut self,
        kinds: impl IntoIterator<Item = LeafKind>,
        renderable: Rc<dyn Renderable>,
    ) {
        for kind in kinds {
            self.entries
                .insert(NodeKind::Leaf(kind), Rc::clone(&renderable));
        }
    }

    pub fn get(&self, kind: NodeKind) -> Option<Rc<dyn Renderable>> {
        self.entries.get(&kind).cloned()
    }

    pub fn contains(&self, kind: NodeKind) -> bool {
        self.entries.contains_key(&kind)
    }
}

impl Default for RenderableRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Native counterpart of every container kind.
#[derive(Clone, Debug, PartialEq)]
pub struct ContainerWidget {
    pub kind: ContainerKind,
    pub spacing: f32,
    pub background: Option<Color>,
    pub padding: EdgeInsets,
    pub title: Option<String>,
    children: Vec<WidgetId>,
}

impl ContainerWidget {
    pub fn new(kind: ContainerKind) -> Self {
        Self {
            kind,
            spacing: 0.0,
            background: None,
            padding: EdgeInsets::ZERO,
            title: None,
            children: Vec::new(),
        }
    }

    pub fn child_ids(&self) -> &[WidgetId] {
        &self.children
    }

    fn apply(&mut self, description: &ViewDescription, context: &Context) {
        if let ViewNode::Container(spec) = description.node() {
            self.spacing = spec.spacing;
        }
        let local = &context.attributes().local;
        self.background = local.background;
        self.padding = local.padding.unwrap_or(EdgeInsets::ZERO);
        self.title = local.navigation_title.as_deref().map(str::to_owned);
    }
}

impl NativeWidget for ContainerWidget {
    fn insert_child(&mut self, index: usize, child: WidgetId) {
        let index = index.min(self.children.len());
        self.children.insert(index, child);
    }

    fn remove_child(&mut self, index: usize) {
        if index < self.children.len() {
            self.children.remove(index);
        }
    }

    fn move_child(&mut self, from: usize, to: usize) {
        if from < self.children.len() {
            let child = self.children.remove(from);
            let to = to.min(self.children.len());
            self.children.insert(to, child);
        }
    }

    fn children(&self) -> Vec<WidgetId> {
        self.children.clone()
    }

    fn label(&self) -> String {
        format!("{:?}", self.kind)
    }
}

pub struct ContainerRenderable;

impl Renderable for ContainerRenderable {
    fn create_view(
        &self,
        description: &ViewDescription,
        context: &Context,
        host: &mut dyn WidgetHost,
    ) -> WidgetId {
        let kind = match description.node() {
            ViewNode::Container(spec) => spec.kind,
            _ => ContainerKind::Host,
        };
        let mut widget = ContainerWidget::new(kind);
        widget.apply(description, context);
        host.create(Box::new(widget))
    }

    fn update_view(
        &self,
        widget: WidgetId,
        description: &ViewDescription,
        context: &Context,
        host: &mut dyn WidgetHost,
    ) -> Result<(), WidgetError> {
        host.with_widget::<ContainerWidget, _>(widget, |container| {
            container.apply(description, context)
        })
    }
}
