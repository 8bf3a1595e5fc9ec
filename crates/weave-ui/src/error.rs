use thiserror::Error;

use weave_core::{QueueError, WidgetId};

use crate::view::NodeKind;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    #[error("widget {id} missing")]
    Missing { id: WidgetId },
    #[error("widget {id} type mismatch; expected {expected}")]
    TypeMismatch { id: WidgetId, expected: &'static str },
    #[error("no renderable registered for {kind:?}")]
    Unregistered { kind: NodeKind },
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error("renderers still invalid after {rounds} render rounds")]
    RenderLoop { rounds: usize },
}
