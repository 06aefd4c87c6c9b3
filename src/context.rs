//! Per-scenario state threaded between steps.

use tracing::debug;

use crate::clients::ServiceResponse;
use crate::model::{DebtPosition, ReportFlow};

/// The scenario "bundle".
///
/// Created fresh when a scenario starts and dropped when it ends. Only the
/// last response is kept; recording a new one replaces it.
#[derive(Debug, Clone, Default)]
pub struct ScenarioContext {
    /// Fiscal code of the organization this scenario acts for.
    pub organization: String,
    /// Last service response, read by assertion steps.
    pub response: Option<ServiceResponse>,
    /// Debt position created by an earlier step.
    pub debt_position: Option<DebtPosition>,
    /// Report flow sent to Node by an earlier step.
    pub report_flow: Option<ReportFlow>,
}

impl ScenarioContext {
    pub fn new(organization: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            ..Self::default()
        }
    }

    /// Replace the tracked response.
    pub fn record_response(&mut self, response: ServiceResponse) {
        debug!(status = response.status, "recording response");
        self.response = Some(response);
    }

    pub fn response(&self) -> Option<&ServiceResponse> {
        self.response.as_ref()
    }
}
