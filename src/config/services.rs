//! Service endpoint configuration.
//!
//! One endpoint per external collaborator reached by the step actions.

use serde::Deserialize;

/// Default header carrying the API management subscription key.
pub const DEFAULT_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
/// Header carrying the function host key for admin triggers.
pub const FUNCTIONS_KEY_HEADER: &str = "x-functions-key";
/// Default name of the timer function behind the reporting batch.
pub const DEFAULT_BATCH_FUNCTION: &str = "ReportingBatchFunction";

/// Endpoint of a single external service.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceEndpoint {
    /// Base URL, without trailing slash (e.g. `https://api.dev.example.it/gpd/api/v1`).
    pub url: String,
    /// Subscription key sent on every request, if set.
    pub subscription_key: Option<String>,
    /// Header name used for `subscription_key`.
    pub key_header: String,
}

impl Default for ServiceEndpoint {
    fn default() -> Self {
        Self {
            url: String::new(),
            subscription_key: None,
            key_header: DEFAULT_KEY_HEADER.to_string(),
        }
    }
}

impl ServiceEndpoint {
    /// Endpoint at `url` with no subscription key.
    pub fn at(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Set the subscription key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.subscription_key = Some(key.into());
        self
    }

    /// Set the header the subscription key travels in.
    pub fn with_key_header(mut self, header: impl Into<String>) -> Self {
        self.key_header = header.into();
        self
    }
}

/// Endpoints for every service the steps talk to.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    /// Debt position management.
    pub gpd: ServiceEndpoint,
    /// Platform configuration (health-checked only).
    pub api_config: ServiceEndpoint,
    /// Payments facade (health-checked only).
    pub gpd_payments: ServiceEndpoint,
    /// Read API over analysed report flows.
    pub reporting_analysis: ServiceEndpoint,
    /// Function host running the reporting batch.
    pub reporting_batch: ServiceEndpoint,
    /// Timer function name triggered through the admin API.
    pub reporting_batch_function: String,
    /// Payments node receiving report flows.
    pub node: ServiceEndpoint,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            gpd: ServiceEndpoint::default(),
            api_config: ServiceEndpoint::default(),
            gpd_payments: ServiceEndpoint::default(),
            reporting_analysis: ServiceEndpoint::default(),
            reporting_batch: ServiceEndpoint::default().with_key_header(FUNCTIONS_KEY_HEADER),
            reporting_batch_function: DEFAULT_BATCH_FUNCTION.to_string(),
            node: ServiceEndpoint::default(),
        }
    }
}

/// Creditor institution the scenarios act for.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrganizationConfig {
    /// Fiscal code of the organization.
    pub fiscal_code: String,
}

impl Default for OrganizationConfig {
    fn default() -> Self {
        Self {
            fiscal_code: "77777777777".to_string(),
        }
    }
}

/// PSP credentials used when sending report flows to Node.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PspConfig {
    pub id: String,
    pub broker_id: String,
    pub channel_id: String,
    pub password: String,
}

impl Default for PspConfig {
    fn default() -> Self {
        Self {
            id: "60000000001".to_string(),
            broker_id: "60000000001".to_string(),
            channel_id: "60000000001_01".to_string(),
            password: "pwdpwdpwd".to_string(),
        }
    }
}
