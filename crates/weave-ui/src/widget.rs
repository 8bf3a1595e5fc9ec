//! The native widget contract and an in-memory host.

use std::any::{type_name, Any};
use std::fmt::Write as _;

use weave_core::WidgetId;

use crate::error::WidgetError;

pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A platform-level UI object. Child bookkeeping is index-based and mirrors
/// the order of the description's children.
pub trait NativeWidget: AsAny {
    fn insert_child(&mut self, _index: usize, _child: WidgetId) {}
    fn remove_child(&mut self, _index: usize) {}
    fn move_child(&mut self, _from: usize, _to: usize) {}
    fn children(&self) -> Vec<WidgetId> {
        Vec::new()
    }
    fn label(&self) -> String {
        let name = std::any::type_name_of_val(self);
        name.rsplit("::").next().unwrap_or(name).to_owned()
    }
}

/// Owner of native widgets.
pub trait WidgetHost {
    fn create(&mut self, widget: Box<dyn NativeWidget>) -> WidgetId;
    fn get(&self, id: WidgetId) -> Result<&dyn NativeWidget, WidgetError>;
    fn get_mut(&mut self, id: WidgetId) -> Result<&mut dyn NativeWidget, WidgetError>;
    /// Destroys `id` only; children are destroyed by the caller.
    fn destroy(&mut self, id: WidgetId) -> Result<(), WidgetError>;
    fn contains(&self, id: WidgetId) -> bool;
}

impl<'a> dyn WidgetHost + 'a {
    /// Runs `f` on the widget `id` downcast to `W`.
    pub fn with_widget<W: NativeWidget + 'static, R>(
        &mut self,
        id: WidgetId,
        f: impl FnOnce(&mut W) -> R,
    ) -> Result<R, WidgetError> {
        let widget = self.get_mut(id)?;
        let typed = widget
            .as_any_mut()
            .downcast_mut::<W>()
            .ok_or(WidgetError::TypeMismatch {
                id,
                expected: type_name::<W>(),
            })?;
        Ok(f(typed))
    }
}

#[derive(Default)]
pub struct MemoryHost {
    widgets: Vec<Option<Box<dyn NativeWidget>>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_widget<W: NativeWidget + 'static, R>(
        &mut self,
        id: WidgetId,
        f: impl FnOnce(&mut W) -> R,
    ) -> Result<R, WidgetError> {
        (self as &mut dyn WidgetHost).with_widget(id, f)
    }

    /// Reads the widget `id` as `W`.
    pub fn widget<W: NativeWidget + 'static>(&self, id: WidgetId) -> Result<&W, WidgetError> {
        self.get(id)?
            .as_any()
            .downcast_ref::<W>()
            .ok_or(WidgetError::TypeMismatch {
                id,
                expected: type_name::<W>(),
            })
    }

    pub fn len(&self) -> usize {
        self.widgets.iter().filter(|w| w.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dump_tree(&self, root: Option<WidgetId>) -> String {
        let mut output = String::new();
        match root {
            Some(root) => self.dump_widget(&mut output, root, 0),
            None => output.push_str("(no root)\n"),
        }
        output
    }

    fn dump_widget(&self, output: &mut String, id: WidgetId, depth: usize) {
        let indent = "  ".repeat(depth);
        match self.widgets.get(id).and_then(|slot| slot.as_deref()) {
            Some(widget) => {
                let _ = writeln!(output, "{indent}[{id}] {}", widget.label());
                for child in widget.children() {
                    self.dump_widget(output, child, depth + 1);
                }
            }
            None => {
                let _ = writeln!(output, "{indent}[{id}] (missing)");
            }
        }
    }
}

impl WidgetHost for MemoryHost {
    fn create(&mut self, widget: Box<dyn NativeWidget>) -> WidgetId {
        let id = self.widgets.len();
        self.widgets.push(Some(widget));
        id
    }

    fn get(&self, id: WidgetId) -> Result<&dyn NativeWidget, WidgetError> {
        self.widgets
            .get(id)
            .and_then(|slot| slot.as_deref())
            .ok_or(WidgetError::Missing { id })
    }

    fn get_mut(&mut self, id: WidgetId) -> Result<&mut dyn NativeWidget, WidgetError> {
        match self.widgets.get_mut(id) {
            Some(Some(widget)) => Ok(widget.as_mut()),
            _ => Err(WidgetError::Missing { id }),
        }
    }

    fn destroy(&mut self, id: WidgetId) -> Result<(), WidgetError> {
        let slot = self.widgets.get_mut(id).ok_or(WidgetError::Missing { id })?;
        slot.take().map(drop).ok_or(WidgetError::Missing { id })
    }

    fn contains(&self, id: WidgetId) -> bool {
        matches!(self.widgets.get(id), Some(Some(_)))
    }
}
