//! # Watch configuration.
//!
//! Provides [`WatchConfig`], the limits and sampling rate applied to every call of a
//! watched operation. The value is threaded explicitly through construction; there is
//! no process-wide default that can be mutated.
//!
//! ## Sentinel values
//! - `max_time = None` → no time watchdog is started
//! - `max_memory_mb = None` → no memory watchdog is started
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use watchmen::WatchConfig;
//!
//! let mut cfg = WatchConfig::default();
//! assert!(!cfg.has_limits());
//!
//! cfg.max_time = Some(Duration::from_secs(5));
//! cfg.sample_interval = Duration::from_millis(50);
//! assert!(cfg.validate().is_ok());
//! ```

use std::time::Duration;

use crate::error::ConfigError;

/// Default polling interval of every watchdog.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(200);

/// Limits and sampling rate for supervised calls.
///
/// ## Field semantics
/// - `max_time`: wall-clock budget, counted from the time watchdog's first tick
/// - `max_memory_mb`: RSS ceiling in MB, summed over the process and its descendants
/// - `sample_interval`: period between two watchdog ticks (best effort)
#[derive(Clone, Debug, PartialEq)]
pub struct WatchConfig {
    /// Maximum wall-clock time (`None` = unlimited).
    pub max_time: Option<Duration>,

    /// Maximum resident memory in MB (`None` = unlimited).
    pub max_memory_mb: Option<f64>,

    /// Watchdog polling period.
    pub sample_interval: Duration,
}

impl WatchConfig {
    /// Returns `true` if at least one watchdog will be started.
    #[inline]
    pub fn has_limits(&self) -> bool {
        self.max_time.is_some() || self.max_memory_mb.is_some()
    }

    /// Checks that every configured value is strictly positive (and finite for memory).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(t) = self.max_time {
            if t.is_zero() {
                return Err(ConfigError::MaxTime(t));
            }
        }
        if let Some(mb) = self.max_memory_mb {
            if !mb.is_finite() || mb <= 0.0 {
                return Err(ConfigError::MaxMemory(mb));
            }
        }
        if self.sample_interval.is_zero() {
            return Err(ConfigError::SampleInterval(self.sample_interval));
        }
        Ok(())
    }
}

impl Default for WatchConfig {
    /// Default configuration:
    ///
    /// - `max_time = None`
    /// - `max_memory_mb = None`
    /// - `sample_interval = 200ms`
    fn default() -> Self {
        Self {
            max_time: None,
            max_memory_mb: None,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
        }
    }
}
