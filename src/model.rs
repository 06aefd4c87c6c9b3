//! Entities created and read by the step actions.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Format of flow timestamps on the wire (`dataOraFlusso`).
pub const FLOW_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Build information a service exposes on its health endpoint.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppInfo {
    pub name: Option<String>,
    pub version: Option<String>,
    pub environment: Option<String>,
}

/// Debt position created in GPD during a scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct DebtPosition {
    pub iupd: String,
    pub organization: String,
    pub iuv: String,
    pub transfer_id: String,
    /// Amount in euro cents.
    pub amount: u64,
    pub published: bool,
    pub paid: bool,
}

/// Report flow sent to Node during a scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportFlow {
    pub flow_id: String,
    pub flow_date: NaiveDateTime,
    pub organization: String,
    pub iuv: String,
    /// Amount in euro cents.
    pub amount: u64,
}

impl ReportFlow {
    /// Flow timestamp as sent to Node and expected by the analysis API.
    pub fn flow_date_param(&self) -> String {
        self.flow_date.format(FLOW_DATE_FORMAT).to_string()
    }
}

/// Element of the analysis flow list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlowSummary {
    #[serde(rename = "identificativoFlusso")]
    pub flow_id: String,
    #[serde(rename = "dataOraFlusso")]
    pub flow_date: String,
}

/// Renders cents as a decimal euro amount (`12345` -> `123.45`).
pub fn format_euros(cents: u64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}
