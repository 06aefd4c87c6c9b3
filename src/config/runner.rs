//! Runner timing and feature discovery configuration.

use std::time::Duration;

use serde::Deserialize;

/// Default per-step timeout (milliseconds).
pub const DEFAULT_STEP_TIMEOUT_MS: u64 = 120_000;
/// Default wait for the reporting batch to finish (milliseconds).
pub const DEFAULT_BATCH_WAIT_MS: u64 = 60_000;
/// Default health-check path appended to each service URL.
pub const DEFAULT_HEALTH_PATH: &str = "/info";

/// Runner configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Upper bound for a single step, in milliseconds.
    pub step_timeout_ms: u64,
    /// How long "the client waits its execution" sleeps, in milliseconds.
    pub batch_wait_ms: u64,
    /// Path of the health check on every service.
    pub health_path: String,
    /// Per-request HTTP timeout, in milliseconds.
    pub http_timeout_ms: u64,
    /// Feature file or directory run by default.
    pub features: String,
    /// Scenarios allowed to run at once. Steps within a scenario never overlap.
    pub max_concurrent_scenarios: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            step_timeout_ms: DEFAULT_STEP_TIMEOUT_MS,
            batch_wait_ms: DEFAULT_BATCH_WAIT_MS,
            health_path: DEFAULT_HEALTH_PATH.to_string(),
            http_timeout_ms: 30_000,
            features: "features".to_string(),
            max_concurrent_scenarios: 1,
        }
    }
}

impl RunnerConfig {
    pub fn step_timeout(&self) -> Duration {
        Duration::from_millis(self.step_timeout_ms)
    }

    pub fn batch_wait(&self) -> Duration {
        Duration::from_millis(self.batch_wait_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runner_config_default() {
        let runner = RunnerConfig::default();
        assert_eq!(runner.step_timeout(), Duration::from_secs(120));
        assert_eq!(runner.batch_wait(), Duration::from_secs(60));
        assert_eq!(runner.health_path, "/info");
        assert_eq!(runner.max_concurrent_scenarios, 1);
    }

    #[test]
    fn test_batch_wait_fits_in_step_timeout() {
        let runner = RunnerConfig::default();
        assert!(runner.batch_wait() < runner.step_timeout());
    }
}
