//! View descriptions, reconciliation and render passes.
//!
//! Components describe their UI as immutable [`ViewDescription`] trees. A
//! [`RenderTree`] turns those descriptions into native widgets through a
//! [`WidgetHost`], keeps a side table of what rendered each widget, and on
//! every frame re-renders only the components whose state changed.

mod attributes;
pub mod context;
mod diff;
mod error;
mod reconciler;
mod renderable;
mod renderer;
mod screen;
mod side_table;
mod tree;
mod view;
mod widget;

pub use attributes::{Attributes, HandlerChain, InheritedAttributes, LocalAttributes};
pub use context::{Context, TransferKind};
pub use diff::{diff_keyed, diff_positional, steps, DiffOperation, DiffStep};
pub use error::WidgetError;
pub use reconciler::{AppliedDiff, Reconciler};
pub use renderable::{ContainerRenderable, ContainerWidget, Renderable, RenderableRegistry};
pub use renderer::{RenderScope, Renderer};
pub use screen::{HostScreen, WidgetToken};
pub use side_table::{WidgetEntry, WidgetTable};
pub use tree::RenderTree;
pub use view::{
    ChildMode, ComponentBody, ComponentSpec, ContainerKind, ContainerSpec, LeafKind, LeafSpec,
    NodeKind, PropValue, Props, ViewDescription, ViewKey, ViewNode,
};
pub use widget::{AsAny, MemoryHost, NativeWidget, WidgetHost};

pub use weave_core::{Binding, ObservableObject, Published, StateCell, Transaction, WidgetId};

pub mod prelude {
    pub use crate::{
        ContainerKind, Context, LeafKind, RenderScope, RenderTree, ViewDescription, WidgetError,
    };
    pub use weave_core::{Animation, Binding, StateCell, Transaction};
    pub use weave_graphics::prelude::*;
    pub use weave_layout::prelude::*;
}
