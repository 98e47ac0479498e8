//! Builder for [`Watch`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::WatchConfig;
use crate::core::{default_sampler_factory, SamplerFactory, Supervisor};
use crate::error::ConfigError;
use crate::sampler::Sampler;

use super::watched::Watch;

/// Builder for constructing a [`Watch`] with optional limits.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use watchmen::Watch;
///
/// let w = Watch::builder()
///     .max_time(Duration::from_secs(1))
///     .max_memory_mb(100.0)
///     .sample_rate(Duration::from_millis(50))
///     .build()
///     .unwrap();
/// assert_eq!(w.config().max_memory_mb, Some(100.0));
///
/// assert!(Watch::builder().max_memory_mb(-1.0).build().is_err());
/// ```
#[derive(Default)]
pub struct WatchBuilder {
    cfg: WatchConfig,
    sampler: Option<SamplerFactory>,
}

impl WatchBuilder {
    /// Creates a builder with [`WatchConfig::default`] (no limits, 200ms sampling).
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, cfg: WatchConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets the wall-clock budget.
    pub fn max_time(mut self, limit: Duration) -> Self {
        self.cfg.max_time = Some(limit);
        self
    }

    /// Sets the wall-clock budget in (fractional) seconds.
    ///
    /// Negative or non-finite values are rejected by [`build`](Self::build).
    pub fn max_time_secs(mut self, secs: f64) -> Self {
        self.cfg.max_time = Some(Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO));
        self
    }

    /// Sets the RSS ceiling in MB.
    pub fn max_memory_mb(mut self, mb: f64) -> Self {
        self.cfg.max_memory_mb = Some(mb);
        self
    }

    /// Overrides the polling interval of the watchdogs.
    pub fn sample_rate(mut self, interval: Duration) -> Self {
        self.cfg.sample_interval = interval;
        self
    }

    /// Uses a custom process-information backend.
    ///
    /// The factory is called once per watchdog of every supervised call. The memory
    /// watchdog samples RSS with it; both watchdogs use it to check the process is alive.
    pub fn sampler<S, F>(mut self, factory: F) -> Self
    where
        S: Sampler,
        F: Fn() -> S + Send + Sync + 'static,
    {
        self.sampler = Some(Arc::new(move || Box::new(factory()) as Box<dyn Sampler>));
        self
    }

    /// Validates the configuration and builds the [`Watch`].
    pub fn build(self) -> Result<Watch, ConfigError> {
        self.cfg.validate()?;
        let sampler = self.sampler.unwrap_or_else(default_sampler_factory);
        Ok(Watch::from_supervisor(Supervisor::new(self.cfg, sampler)))
    }
}

impl fmt::Debug for WatchBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchBuilder")
            .field("cfg", &self.cfg)
            .field("custom_sampler", &self.sampler.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_limits() {
        let w = WatchBuilder::new()
            .max_time_secs(1.5)
            .max_memory_mb(64.0)
            .build()
            .expect("valid config");
        assert_eq!(w.config().max_time, Some(Duration::from_millis(1500)));
        assert_eq!(w.config().max_memory_mb, Some(64.0));
        assert_eq!(w.config().sample_interval, Duration::from_millis(200));
    }

    #[test]
    fn rejects_invalid_values() {
        assert_eq!(
            WatchBuilder::new().max_time_secs(-2.0).build().err(),
            Some(ConfigError::MaxTime(Duration::ZERO))
        );
        assert_eq!(
            WatchBuilder::new().max_memory_mb(0.0).build().err(),
            Some(ConfigError::MaxMemory(0.0))
        );
        assert_eq!(
            WatchBuilder::new().sample_rate(Duration::ZERO).build().err(),
            Some(ConfigError::SampleInterval(Duration::ZERO))
        );
    }

    #[test]
    fn config_replaces_everything() {
        let cfg = WatchConfig {
            max_time: Some(Duration::from_secs(3)),
            max_memory_mb: None,
            sample_interval: Duration::from_millis(10),
        };
        let w = WatchBuilder::new()
            .max_memory_mb(5.0)
            .config(cfg.clone())
            .build()
            .expect("valid config");
        assert_eq!(w.config(), &cfg);
    }
}
