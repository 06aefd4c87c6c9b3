//! Application configuration.
//!
//! Aggregates service endpoints, organization, PSP credentials and runner
//! settings into a single Config struct that can be loaded from YAML files
//! or environment variables.

mod runner;
mod services;

pub use runner::{
    RunnerConfig, DEFAULT_BATCH_WAIT_MS, DEFAULT_HEALTH_PATH, DEFAULT_STEP_TIMEOUT_MS,
};
pub use services::{
    OrganizationConfig, PspConfig, ServiceEndpoint, ServicesConfig, DEFAULT_BATCH_FUNCTION,
    DEFAULT_KEY_HEADER, FUNCTIONS_KEY_HEADER,
};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "reporting-bdd.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "REPORTING_BDD_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "REPORTING_BDD";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "REPORTING_BDD_LOG";

use serde::Deserialize;

use crate::error::ConfigError;

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External service endpoints.
    pub services: ServicesConfig,
    /// Organization the scenarios act for.
    pub organization: OrganizationConfig,
    /// PSP identity used towards Node.
    pub psp: PspConfig,
    /// Step timeout, batch wait and feature location.
    pub runner: RunnerConfig,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `reporting-bdd.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that make a step fail regardless of the services.
    ///
    /// The batch wait runs inside a single step, so it must end before the
    /// step timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.runner.batch_wait_ms >= self.runner.step_timeout_ms {
            return Err(ConfigError::Invalid(format!(
                "runner.batch_wait_ms ({}) must be less than runner.step_timeout_ms ({})",
                self.runner.batch_wait_ms, self.runner.step_timeout_ms
            )));
        }
        Ok(())
    }

    /// Config with every service at `base_url` plus a per-service path.
    ///
    /// Used by tests that stand up a single mock host for all services.
    pub fn for_base_url(base_url: &str) -> Self {
        let at = |path: &str| ServiceEndpoint::at(format!("{}{}", base_url, path));
        let mut config = Self::default();
        config.services.gpd = at("/gpd");
        config.services.api_config = at("/apiconfig");
        config.services.gpd_payments = at("/payments");
        config.services.reporting_analysis = at("/analysis");
        config.services.reporting_batch =
            at("/batch").with_key_header(FUNCTIONS_KEY_HEADER);
        config.services.node = at("/node");
        config
    }
}
