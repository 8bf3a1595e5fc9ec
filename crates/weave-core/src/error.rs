use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The queue kept producing work after the configured number of rounds.
    #[error("operation queue `{queue}` still held {pending} operations after {rounds} rounds")]
    RoundLimitExceeded {
        queue: &'static str,
        rounds: usize,
        pending: usize,
    },
}
