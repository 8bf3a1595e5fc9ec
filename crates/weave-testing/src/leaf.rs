//! A leaf widget that records the attributes it was rendered with.

use std::cell::RefCell;
use std::rc::Rc;

use weave_core::WidgetId;
use weave_graphics::{Color, Font};
use weave_ui::{
    Context, LeafKind, NativeWidget, Props, Renderable, ViewDescription, ViewNode, WidgetError,
    WidgetHost,
};

#[derive(Clone, Debug, PartialEq)]
pub struct LeafWidget {
    pub kind: LeafKind,
    pub props: Props,
    pub foreground: Option<Color>,
    pub accent: Option<Color>,
    pub font: Option<Font>,
    pub disabled: bool,
}

impl LeafWidget {
    fn new(kind: LeafKind) -> Self {
        Self {
            kind,
            props: Props::default(),
            foreground: None,
            accent: None,
            font: None,
            disabled: false,
        }
    }

    fn apply(&mut self, description: &ViewDescription, context: &Context) {
        if let ViewNode::Leaf(spec) = description.node() {
            self.kind = spec.kind;
            self.props = spec.props.clone();
        }
        let inherited = &context.attributes().inherited;
        self.foreground = inherited.foreground_color;
        self.accent = inherited.accent_color;
        self.font = inherited.font;
        self.disabled = inherited.disabled.unwrap_or(false);
    }

    pub fn text(&self) -> Option<&str> {
        self.props.get("text").and_then(|value| value.as_str())
    }
}

impl NativeWidget for LeafWidget {
    fn label(&self) -> String {
        match self.text() {
            Some(text) => format!("{:?} {text:?}", self.kind),
            None => format!("{:?}", self.kind),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogEntry {
    Created { widget: WidgetId, kind: LeafKind },
    Updated { widget: WidgetId, kind: LeafKind },
}

impl LogEntry {
    pub fn widget(&self) -> WidgetId {
        match self {
            LogEntry::Created { widget, .. } | LogEntry::Updated { widget, .. } => *widget,
        }
    }
}

pub type RenderLog = Rc<RefCell<Vec<LogEntry>>>;

/// Builds [`LeafWidget`]s and logs every create and update call.
#[derive(Clone, Default)]
pub struct LeafRenderable {
    log: RenderLog,
}

impl LeafRenderable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> RenderLog {
        Rc::clone(&self.log)
    }
}

impl Renderable for LeafRenderable {
    fn create_view(
        &self,
        description: &ViewDescription,
        context: &Context,
        host: &mut dyn WidgetHost,
    ) -> WidgetId {
        let kind = match description.node() {
            ViewNode::Leaf(spec) => spec.kind,
            _ => LeafKind::Custom("unknown"),
        };
        let mut widget = LeafWidget::new(kind);
        widget.apply(description, context);
        let id = host.create(Box::new(widget));
        self.log
            .borrow_mut()
            .push(LogEntry::Created { widget: id, kind });
        id
    }

    fn update_view(
        &self,
        widget: WidgetId,
        description: &ViewDescription,
        context: &Context,
        host: &mut dyn WidgetHost,
    ) -> Result<(), WidgetError> {
        let kind = host.with_widget::<LeafWidget, _>(widget, |leaf| {
            leaf.apply(description, context);
            leaf.kind
        })?;
        self.log
            .borrow_mut()
            .push(LogEntry::Updated { widget, kind });
        Ok(())
    }
}
