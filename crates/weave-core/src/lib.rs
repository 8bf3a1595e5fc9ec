#![doc = r"Reactive state, render attribution and deferred operations for Weave."]

pub mod binding;
pub mod config;
pub mod error;
pub mod observable;
pub mod platform;
pub mod queue;
pub mod runtime;
pub mod state;
pub mod subscription;
pub mod transaction;

pub use binding::Binding;
pub use config::RuntimeConfig;
pub use error::QueueError;
pub use observable::{ObservableObject, Published};
pub use platform::RuntimeScheduler;
pub use queue::{DrainReport, OperationQueue};
pub use runtime::{DefaultScheduler, Runtime, RuntimeHandle};
pub use state::{ChangeEvent, ChangePublisher, PublisherId, StateCell, Subscriber, SubscriberId};
pub use subscription::{current_transaction, with_transaction};
pub use transaction::{Animation, Curve, Transaction};

use std::sync::atomic::{AtomicUsize, Ordering};

/// Identity of a native widget as handed out by a widget host.
pub type WidgetId = usize;

static NEXT_SUBSCRIBER_ID: AtomicUsize = AtomicUsize::new(1);
static NEXT_PUBLISHER_ID: AtomicUsize = AtomicUsize::new(1);

/// Allocates a process-unique subscriber identity.
pub fn next_subscriber_id() -> SubscriberId {
    NEXT_SUBSCRIBER_ID.fetch_add(1, Ordering::Relaxed)
}

pub(crate) fn next_publisher_id() -> PublisherId {
    NEXT_PUBLISHER_ID.fetch_add(1, Ordering::Relaxed)
}
