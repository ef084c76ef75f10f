use crate::error::Error;
use crate::metric::LoadMetric;

/// Validated configuration for a [`crate::manager::LoadManager`].
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    pub(crate) refresh_rate: u64,
    pub(crate) load_metric: LoadMetric,
    pub(crate) window_size: usize,
}

impl ManagerConfig {
    /// Create a new config with defaults (`refresh_rate=1`, `load_metric=cum_req`,
    /// `window_size=100`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the refresh interval, in seconds. Must be at least 1.
    pub fn refresh_rate(mut self, seconds: u64) -> Result<Self, Error> {
        if seconds == 0 {
            return Err(Error::InvalidRefreshRate);
        }
        self.refresh_rate = seconds;
        Ok(self)
    }

    /// Set which load metric the refresher uses.
    pub fn load_metric(mut self, metric: LoadMetric) -> Self {
        self.load_metric = metric;
        self
    }

    /// Set the moving-statistics window's sample capacity. Must be at least 2.
    pub fn window_size(mut self, size: usize) -> Result<Self, Error> {
        if size < 2 {
            return Err(Error::InvalidWindowSize);
        }
        self.window_size = size;
        Ok(self)
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            refresh_rate: 1,
            load_metric: LoadMetric::default(),
            window_size: 100,
        }
    }
}

/// Builder for creating a [`crate::manager::LoadManager`] with custom configuration.
pub struct ManagerConfigBuilder {
    config: ManagerConfig,
}

impl ManagerConfigBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: ManagerConfig::default(),
        }
    }

    /// Set the refresh interval, in seconds. Must be at least 1.
    pub fn refresh_rate(mut self, seconds: u64) -> Result<Self, Error> {
        self.config = self.config.refresh_rate(seconds)?;
        Ok(self)
    }

    /// Set which load metric the refresher uses.
    pub fn load_metric(mut self, metric: LoadMetric) -> Self {
        self.config = self.config.load_metric(metric);
        self
    }

    /// Set the moving-statistics window's sample capacity. Must be at least 2.
    pub fn window_size(mut self, size: usize) -> Result<Self, Error> {
        self.config = self.config.window_size(size)?;
        Ok(self)
    }

    /// Build a [`crate::manager::LoadManager`] with the configured settings, starting its
    /// background refresher.
    pub fn build(self) -> crate::manager::LoadManager {
        crate::manager::LoadManager::with_config(self.config)
    }
}

impl Default for ManagerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
