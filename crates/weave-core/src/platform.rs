//! Platform abstraction traits for Weave runtime services.
//!
//! These traits allow Weave to delegate frame scheduling to the host
//! windowing system, so the runtime never owns an event loop of its own.

/// Schedules work for the Weave runtime.
///
/// Implementations are responsible for asking the host to run a render pass
/// soon. The request is a hint: the host decides when the pass actually
/// happens, but it must happen on the thread that owns the UI.
pub trait RuntimeScheduler: Send + Sync {
    /// Request that the host schedule a new frame.
    fn schedule_frame(&self);
}
