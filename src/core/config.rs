//! # Orchestrator configuration.
//!
//! Provides [`OrchestratorConfig`] centralized settings for the activation runtime.
//!
//! ## Sentinel values
//! - `pool_size = 0` → clamped to 1 (a pool needs at least one slot)
//! - `start_timeout = 0s` → no timeout on `start()`
//! - `stop_timeout = 0s` → no timeout on `stop()`

use std::time::Duration;

/// Default number of worker pool slots.
pub const DEFAULT_POOL_SIZE: usize = 5;

/// Global configuration for the orchestrator.
///
/// ## Field semantics
/// - `pool_size`: concurrent execution slots shared by module starts and scheduling passes
/// - `start_timeout`: per-module `start()` bound; expiry counts as a start failure
/// - `stop_timeout`: per-module `stop()` bound; expiry counts as a stop failure
/// - `bus_capacity`: event bus ring buffer size (min 1)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct OrchestratorConfig {
    /// Number of worker pool slots.
    ///
    /// No more than this many module starts and scheduling passes run at once.
    pub pool_size: usize,

    /// Per-module start timeout (`Duration::ZERO` = wait forever).
    pub start_timeout: Duration,

    /// Per-module stop timeout (`Duration::ZERO` = wait forever).
    pub stop_timeout: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,
}

impl OrchestratorConfig {
    /// Returns the pool size clamped to a minimum of 1.
    #[inline]
    pub fn pool_size_clamped(&self) -> usize {
        self.pool_size.max(1)
    }

    /// Returns the start timeout as an `Option` (`None` = no timeout).
    #[inline]
    pub fn start_timeout(&self) -> Option<Duration> {
        Some(self.start_timeout).filter(|d| !d.is_zero())
    }

    /// Returns the stop timeout as an `Option` (`None` = no timeout).
    #[inline]
    pub fn stop_timeout(&self) -> Option<Duration> {
        Some(self.stop_timeout).filter(|d| !d.is_zero())
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for OrchestratorConfig {
    /// Default configuration:
    ///
    /// - `pool_size = 5`
    /// - `start_timeout = 0s` (no timeout)
    /// - `stop_timeout = 0s` (no timeout)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            start_timeout: Duration::ZERO,
            stop_timeout: Duration::ZERO,
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels() {
        let cfg = OrchestratorConfig {
            pool_size: 0,
            bus_capacity: 0,
            ..OrchestratorConfig::default()
        };
        assert_eq!(cfg.pool_size_clamped(), 1);
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.start_timeout(), None);
        assert_eq!(cfg.stop_timeout(), None);
    }

    #[test]
    fn timeouts_are_passed_through() {
        let cfg = OrchestratorConfig {
            start_timeout: Duration::from_millis(250),
            ..OrchestratorConfig::default()
        };
        assert_eq!(cfg.start_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(cfg.pool_size_clamped(), DEFAULT_POOL_SIZE);
    }
}
