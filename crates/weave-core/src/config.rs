//! Runtime configuration.

use std::env;

/// Default number of breadth-first rounds a drain may run before it gives up.
pub const DEFAULT_MAX_DRAIN_ROUNDS: usize = 64;

const MAX_DRAIN_ROUNDS_VAR: &str = "WEAVE_MAX_DRAIN_ROUNDS";
const DEBUG_VAR: &str = "WEAVE_DEBUG";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Upper bound on drain rounds for every operation queue and on
    /// re-render rounds of a single render pass.
    pub max_drain_rounds: usize,
    /// Log every computed diff at debug level.
    pub debug_diffs: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_drain_rounds: DEFAULT_MAX_DRAIN_ROUNDS,
            debug_diffs: false,
        }
    }
}

impl RuntimeConfig {
    /// Reads `WEAVE_MAX_DRAIN_ROUNDS` and `WEAVE_DEBUG` on top of the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = env::var(MAX_DRAIN_ROUNDS_VAR) {
            match raw.trim().parse::<usize>() {
                Ok(rounds) if rounds > 0 => config.max_drain_rounds = rounds,
                _ => log::warn!("ignoring invalid {MAX_DRAIN_ROUNDS_VAR}={raw:?}"),
            }
        }
        config.debug_diffs = env::var_os(DEBUG_VAR).is_some();
        config
    }

    pub fn with_max_drain_rounds(mut self, rounds: usize) -> Self {
        self.max_drain_rounds = rounds.max(1);
        self
    }

    pub fn with_debug_diffs(mut self, enabled: bool) -> Self {
        self.debug_diffs = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_limit_is_never_zero() {
        let config = RuntimeConfig::default().with_max_drain_rounds(0);
        assert_eq!(config.max_drain_rounds, 1);
    }
}
