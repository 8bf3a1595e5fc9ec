//! Immutable view descriptions.
//!
//! A [`ViewDescription`] is a cheap-to-clone handle describing what one node
//! of the UI should look like for a single render pass. Nodes are a closed
//! set of kinds; the reconciler dispatches on [`NodeKind`] through a
//! [`crate::RenderableRegistry`].

use std::fmt;
use std::rc::Rc;

use ahash::RandomState;
use indexmap::IndexMap;

use weave_graphics::{Color, EdgeInsets, Font, LayoutDirection};
use weave_layout::{Alignment, EdgeSet, Expansion};

use crate::attributes::{Attributes, HandlerChain};
use crate::renderer::RenderScope;

/// Explicit identity of a description inside a keyed collection.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ViewKey {
    Int(i64),
    Str(Rc<str>),
}

impl From<i64> for ViewKey {
    fn from(value: i64) -> Self {
        ViewKey::Int(value)
    }
}

impl From<i32> for ViewKey {
    fn from(value: i32) -> Self {
        ViewKey::Int(i64::from(value))
    }
}

/// Indices past `i64::MAX` become string keys so they never collide.
impl From<usize> for ViewKey {
    fn from(value: usize) -> Self {
        i64::try_from(value)
            .map(ViewKey::Int)
            .unwrap_or_else(|_| ViewKey::Str(value.to_string().into()))
    }
}

impl From<&str> for ViewKey {
    fn from(value: &str) -> Self {
        ViewKey::Str(value.into())
    }
}

impl From<String> for ViewKey {
    fn from(value: String) -> Self {
        ViewKey::Str(value.into())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LeafKind {
    Text,
    Image,
    Button,
    TextField,
    Toggle,
    Spacer,
    Custom(&'static str),
}

impl LeafKind {
    pub const BUILTIN: [LeafKind; 6] = [
        LeafKind::Text,
        LeafKind::Image,
        LeafKind::Button,
        LeafKind::TextField,
        LeafKind::Toggle,
        LeafKind::Spacer,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    VStack,
    HStack,
    ZStack,
    List,
    Scroll,
    /// Root of a hosting screen.
    Screen,
    /// Single-child widget owning a component's renderer.
    Host,
}

impl ContainerKind {
    pub const ALL: [ContainerKind; 7] = [
        ContainerKind::VStack,
        ContainerKind::HStack,
        ContainerKind::ZStack,
        ContainerKind::List,
        ContainerKind::Scroll,
        ContainerKind::Screen,
        ContainerKind::Host,
    ];

    /// Containers whose children are positioned by generated constraints
    /// rather than by the native container itself.
    pub fn constrains_children(self) -> bool {
        matches!(
            self,
            ContainerKind::ZStack | ContainerKind::Screen | ContainerKind::Host
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Leaf(LeafKind),
    Container(ContainerKind),
    Component(&'static str),
    Fragment,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Color(Color),
}

impl PropValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropValue::Int(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(value.into())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(value.into())
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float(value)
    }
}

impl From<Color> for PropValue {
    fn from(value: Color) -> Self {
        PropValue::Color(value)
    }
}

pub type Props = IndexMap<&'static str, PropValue, RandomState>;

#[derive(Clone, Debug, PartialEq)]
pub struct LeafSpec {
    pub kind: LeafKind,
    pub props: Props,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChildMode {
    #[default]
    Positional,
    Keyed,
}

#[derive(Clone, Debug)]
pub struct ContainerSpec {
    pub kind: ContainerKind,
    pub mode: ChildMode,
    pub spacing: f32,
    /// Children are built on the build queue after the traversal.
    pub lazy: bool,
    pub children: Vec<ViewDescription>,
}

pub type ComponentBody = Rc<dyn Fn(&mut RenderScope<'_>) -> ViewDescription>;

#[derive(Clone)]
pub struct ComponentSpec {
    pub name: &'static str,
    pub body: ComponentBody,
}

impl fmt::Debug for ComponentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentSpec")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
pub enum ViewNode {
    Leaf(LeafSpec),
    Container(ContainerSpec),
    Component(ComponentSpec),
    Fragment(Vec<ViewDescription>),
}

#[derive(Clone, Debug)]
struct ViewInner {
    node: ViewNode,
    attributes: Attributes,
    key: Option<ViewKey>,
}

#[derive(Clone)]
pub struct ViewDescription(Rc<ViewInner>);

impl ViewDescription {
    fn from_node(node: ViewNode) -> Self {
        Self(Rc::new(ViewInner {
            node,
            attributes: Attributes::default(),
            key: None,
        }))
    }

    pub fn leaf(kind: LeafKind) -> Self {
        Self::from_node(ViewNode::Leaf(LeafSpec {
            kind,
            props: Props::default(),
        }))
    }

    pub fn text(text: impl Into<PropValue>) -> Self {
        Self::leaf(LeafKind::Text).prop("text", text)
    }

    pub fn container(kind: ContainerKind, children: Vec<ViewDescription>) -> Self {
        let mode = match kind {
            ContainerKind::List => ChildMode::Keyed,
            _ => ChildMode::Positional,
        };
        Self::from_node(ViewNode::Container(ContainerSpec {
            kind,
            mode,
            spacing: 0.0,
            lazy: false,
            children,
        }))
    }

    pub fn vstack(children: Vec<ViewDescription>) -> Self {
        Self::container(ContainerKind::VStack, children)
    }

    pub fn hstack(children: Vec<ViewDescription>) -> Self {
        Self::container(ContainerKind::HStack, children)
    }

    pub fn zstack(children: Vec<ViewDescription>) -> Self {
        Self::container(ContainerKind::ZStack, children)
    }

    /// A keyed collection.
    pub fn list(children: Vec<ViewDescription>) -> Self {
        Self::container(ContainerKind::List, children)
    }

    pub fn fragment(children: Vec<ViewDescription>) -> Self {
        Self::from_node(ViewNode::Fragment(children))
    }

    pub fn component(
        name: &'static str,
        body: impl Fn(&mut RenderScope<'_>) -> ViewDescription + 'static,
    ) -> Self {
        Self::from_node(ViewNode::Component(ComponentSpec {
            name,
            body: Rc::new(body),
        }))
    }

    pub fn node(&self) -> &ViewNode {
        &self.0.node
    }

    pub fn kind(&self) -> NodeKind {
        match &self.0.node {
            ViewNode::Leaf(leaf) => NodeKind::Leaf(leaf.kind),
            ViewNode::Container(container) => NodeKind::Container(container.kind),
            ViewNode::Component(component) => NodeKind::Component(component.name),
            ViewNode::Fragment(_) => NodeKind::Fragment,
        }
    }

    pub fn key(&self) -> Option<&ViewKey> {
        self.0.key.as_ref()
    }

    pub fn attributes(&self) -> &Attributes {
        &self.0.attributes
    }

    pub fn prop_value(&self, name: &str) -> Option<&PropValue> {
        match &self.0.node {
            ViewNode::Leaf(leaf) => leaf.props.get(name),
            _ => None,
        }
    }

    pub fn ptr_eq(&self, other: &ViewDescription) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Children with fragments spliced in place. A fragment's inherited
    /// attributes become the fallback of each child it contributes.
    pub fn flatten_children(&self) -> Vec<ViewDescription> {
        let mut out = Vec::new();
        match &self.0.node {
            ViewNode::Container(container) => flatten_into(&container.children, &mut out),
            ViewNode::Fragment(children) => flatten_into(children, &mut out),
            ViewNode::Leaf(_) | ViewNode::Component(_) => {}
        }
        out
    }

    pub fn child_mode(&self) -> ChildMode {
        match &self.0.node {
            ViewNode::Container(container) => container.mode,
            _ => ChildMode::Positional,
        }
    }

    fn edit(mut self, f: impl FnOnce(&mut ViewInner)) -> Self {
        f(Rc::make_mut(&mut self.0));
        self
    }

    pub fn with_key(self, key: impl Into<ViewKey>) -> Self {
        let key = key.into();
        self.edit(|inner| inner.key = Some(key))
    }

    pub fn with_attributes(self, attributes: Attributes) -> Self {
        self.edit(|inner| inner.attributes = attributes)
    }

    pub fn prop(self, name: &'static str, value: impl Into<PropValue>) -> Self {
        let value = value.into();
        self.edit(|inner| {
            if let ViewNode::Leaf(leaf) = &mut inner.node {
                leaf.props.insert(name, value);
            } else {
                log::debug!("prop `{name}` ignored on a non-leaf description");
            }
        })
    }

    pub fn keyed(self) -> Self {
        self.edit(|inner| {
            if let ViewNode::Container(container) = &mut inner.node {
                container.mode = ChildMode::Keyed;
            }
        })
    }

    pub fn positional(self) -> Self {
        self.edit(|inner| {
            if let ViewNode::Container(container) = &mut inner.node {
                container.mode = ChildMode::Positional;
            }
        })
    }

    pub fn lazy(self) -> Self {
        self.edit(|inner| {
            if let ViewNode::Container(container) = &mut inner.node {
                container.lazy = true;
            }
        })
    }

    pub fn spacing(self, spacing: f32) -> Self {
        self.edit(|inner| {
            if let ViewNode::Container(container) = &mut inner.node {
                container.spacing = spacing;
            }
        })
    }

    pub fn foreground_color(self, color: Color) -> Self {
        self.edit(|inner| inner.attributes.inherited.foreground_color = Some(color))
    }

    pub fn accent_color(self, color: Color) -> Self {
        self.edit(|inner| inner.attributes.inherited.accent_color = Some(color))
    }

    pub fn font(self, font: Font) -> Self {
        self.edit(|inner| inner.attributes.inherited.font = Some(font))
    }

    pub fn layout_direction(self, direction: LayoutDirection) -> Self {
        self.edit(|inner| inner.attributes.inherited.layout_direction = Some(direction))
    }

    pub fn disabled(self, disabled: bool) -> Self {
        self.edit(|inner| inner.attributes.inherited.disabled = Some(disabled))
    }

    /// Appends `handler` to the submit chain this node passes down.
    pub fn on_submit(self, handler: impl Fn() + 'static) -> Self {
        self.edit(|inner| {
            let chain = match &inner.attributes.inherited.on_submit {
                Some(chain) => chain.then(handler),
                None => HandlerChain::new(handler),
            };
            inner.attributes.inherited.on_submit = Some(chain);
        })
    }

    pub fn background(self, color: Color) -> Self {
        self.edit(|inner| inner.attributes.local.background = Some(color))
    }

    pub fn padding(self, insets: EdgeInsets) -> Self {
        self.edit(|inner| inner.attributes.local.padding = Some(insets))
    }

    pub fn alignment(self, alignment: Alignment) -> Self {
        self.edit(|inner| inner.attributes.local.alignment = Some(alignment))
    }

    pub fn expand(self, expansion: Expansion) -> Self {
        self.edit(|inner| inner.attributes.local.expansion = Some(expansion))
    }

    pub fn ignores_safe_area(self, edges: EdgeSet) -> Self {
        self.edit(|inner| inner.attributes.local.ignores_safe_area = Some(edges))
    }

    pub fn navigation_title(self, title: &str) -> Self {
        let title: Rc<str> = title.into();
        self.edit(|inner| inner.attributes.local.navigation_title = Some(title))
    }

    pub fn presented(self, presented: bool) -> Self {
        self.edit(|inner| inner.attributes.local.is_presented = Some(presented))
    }

    pub fn on_appear(self, handler: impl Fn() + 'static) -> Self {
        self.edit(|inner| inner.attributes.local.on_appear = Some(HandlerChain::new(handler)))
    }

    pub fn on_disappear(self, handler: impl Fn() + 'static) -> Self {
        self.edit(|inner| inner.attributes.local.on_disappear = Some(HandlerChain::new(handler)))
    }
}

fn flatten_into(children: &[ViewDescription], out: &mut Vec<ViewDescription>) {
    for child in children {
        match &child.0.node {
            ViewNode::Fragment(nested) => {
                let fragment_attributes = child.attributes().inherited_only();
                let start = out.len();
                flatten_into(nested, out);
                for spliced in &mut out[start..] {
                    let merged = spliced.attributes().merge(&fragment_attributes);
                    *spliced = spliced.clone().with_attributes(merged);
                }
            }
            _ => out.push(child.clone()),
        }
    }
}

impl fmt::Debug for ViewDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("ViewDescription");
        debug.field("kind", &self.kind());
        if let Some(key) = self.key() {
            debug.field("key", key);
        }
        if let ViewNode::Leaf(leaf) = &self.0.node {
            if !leaf.props.is_empty() {
                debug.field("props", &leaf.props);
            }
        }
        debug.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn index_keys_do_not_wrap() {
        assert_eq!(ViewKey::from(7usize), ViewKey::Int(7));
        let huge = ViewKey::from(usize::MAX);
        assert_ne!(huge, ViewKey::Int(-1));
        assert_eq!(huge, ViewKey::from(usize::MAX.to_string().as_str()));
    }

    #[test]
    fn builders_copy_on_write() {
        let base = ViewDescription::text("Shio");
        let keyed = base.clone().with_key(1);
        assert!(base.key().is_none());
        assert_eq!(keyed.key(), Some(&ViewKey::Int(1)));
        assert_eq!(base.kind(), NodeKind::Leaf(LeafKind::Text));
    }

    #[test]
    fn lists_default_to_keyed_children() {
        assert_eq!(ViewDescription::list(vec![]).child_mode(), ChildMode::Keyed);
        assert_eq!(
            ViewDescription::vstack(vec![]).child_mode(),
            ChildMode::Positional
        );
    }

    #[test]
    fn fragments_splice_and_pass_inherited_attributes() {
        let stack = ViewDescription::vstack(vec![
            ViewDescription::text("a"),
            ViewDescription::fragment(vec![
                ViewDescription::text("b").foreground_color(Color::GREEN),
                ViewDescription::fragment(vec![ViewDescription::text("c")]),
            ])
            .foreground_color(Color::RED)
            .background(Color::BLUE),
        ]);

        let children = stack.flatten_children();
        let texts: Vec<_> = children
            .iter()
            .map(|c| c.prop_value("text").and_then(PropValue::as_str).map(str::to_owned))
            .collect();
        assert_eq!(
            texts,
            vec![Some("a".into()), Some("b".into()), Some("c".into())]
        );
        let colors: Vec<_> = children
            .iter()
            .map(|c| c.attributes().inherited.foreground_color)
            .collect();
        assert_eq!(colors, vec![None, Some(Color::GREEN), Some(Color::RED)]);
        assert!(children.iter().all(|c| c.attributes().local.background.is_none()));
    }
}
