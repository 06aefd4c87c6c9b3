//! External service clients.
//!
//! [`Services`] is built once per process from [`Config`] and shared,
//! read-only, by every scenario.

mod http;

pub use http::{ServiceClient, ServiceResponse};

use std::time::Duration;

use crate::config::{Config, PspConfig};
use crate::error::ConfigError;

pub const GPD: &str = "gpd";
pub const API_CONFIG: &str = "api-config";
pub const GPD_PAYMENTS: &str = "gpd-payments";
pub const REPORTING_ANALYSIS: &str = "reporting-analysis";
pub const REPORTING_BATCH: &str = "reporting-batch";
pub const NODE: &str = "node";

/// Clients and settings the step actions call through.
#[derive(Debug, Clone)]
pub struct Services {
    pub gpd: ServiceClient,
    pub api_config: ServiceClient,
    pub gpd_payments: ServiceClient,
    pub reporting_analysis: ServiceClient,
    pub reporting_batch: ServiceClient,
    pub node: ServiceClient,
    /// Timer function triggered on the batch host.
    pub batch_function: String,
    /// Fiscal code of the organization the scenarios act for.
    pub organization: String,
    pub psp: PspConfig,
    pub health_path: String,
    pub batch_wait: Duration,
}

impl Services {
    /// Build clients sharing one connection pool.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(config.runner.http_timeout())
            .build()?;
        let services = &config.services;

        Ok(Self {
            gpd: ServiceClient::new(GPD, &services.gpd, http.clone()),
            api_config: ServiceClient::new(API_CONFIG, &services.api_config, http.clone()),
            gpd_payments: ServiceClient::new(GPD_PAYMENTS, &services.gpd_payments, http.clone()),
            reporting_analysis: ServiceClient::new(
                REPORTING_ANALYSIS,
                &services.reporting_analysis,
                http.clone(),
            ),
            reporting_batch: ServiceClient::new(
                REPORTING_BATCH,
                &services.reporting_batch,
                http.clone(),
            ),
            node: ServiceClient::new(NODE, &services.node, http),
            batch_function: services.reporting_batch_function.clone(),
            organization: config.organization.fiscal_code.clone(),
            psp: config.psp.clone(),
            health_path: config.runner.health_path.clone(),
            batch_wait: config.runner.batch_wait(),
        })
    }
}
