//! Error types for step execution, registration, and configuration.

use std::time::Duration;

use crate::registry::ParamKind;

/// Result type for step actions.
pub type StepResult = std::result::Result<(), StepError>;

/// Errors raised while matching or executing a step.
///
/// Every variant propagates unmodified to the runner, which marks the
/// scenario failed and skips its remaining steps.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    /// A dependency did not answer its health check with a 2xx status.
    #[error("{service} health check failed: {reason}")]
    HealthCheck {
        service: &'static str,
        reason: String,
    },

    /// A service answered with a status the action does not accept.
    #[error("{service} {operation} returned status {status}: {body}")]
    UnexpectedStatus {
        service: &'static str,
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// The request never produced a response.
    #[error("{service} {operation} transport error: {source}")]
    Transport {
        service: &'static str,
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The service has no base URL in the loaded configuration.
    #[error("{service} is not configured (empty url)")]
    NotConfigured { service: &'static str },

    /// Node rejected a report flow with a SOAP KO outcome.
    #[error("node rejected flow {flow_id}: {fault}")]
    NodeFault { flow_id: String, fault: String },

    /// An assertion on the last response did not hold.
    #[error("assertion failed: {0}")]
    Assertion(String),

    /// An assertion ran before any step stored a response.
    #[error("no response recorded in this scenario")]
    MissingResponse,

    /// A list assertion ran against a body that is not a JSON array.
    #[error("expected a list of flows, got {actual}")]
    NotAList { actual: &'static str },

    /// A step needs an entity that no earlier step created.
    #[error("no {0} available in this scenario")]
    MissingEntity(&'static str),

    /// The action did not settle within the step timeout.
    #[error("step \"{step}\" timed out after {after:?}")]
    Timeout { step: String, after: Duration },

    /// No registered pattern matches the step text.
    #[error("undefined step: \"{0}\"")]
    Undefined(String),

    /// More than one registered pattern matches the step text.
    #[error("ambiguous step \"{step}\" matches {candidates:?}")]
    Ambiguous {
        step: String,
        candidates: Vec<String>,
    },

    /// A captured parameter could not be read as its declared kind.
    #[error("parameter {index} expected {expected}, got {raw:?}")]
    Parameter {
        index: usize,
        expected: ParamKind,
        raw: String,
    },

    /// The world was created before a harness was installed.
    #[error("no harness installed for this process")]
    NotInstalled,
}

impl StepError {
    /// Returns true if this error came from talking to a service.
    pub fn is_service_error(&self) -> bool {
        matches!(
            self,
            StepError::HealthCheck { .. }
                | StepError::UnexpectedStatus { .. }
                | StepError::Transport { .. }
                | StepError::NotConfigured { .. }
                | StepError::NodeFault { .. }
        )
    }

    /// Returns true if this error is an assertion on scenario state.
    pub fn is_assertion(&self) -> bool {
        matches!(
            self,
            StepError::Assertion(_) | StepError::MissingResponse | StepError::NotAList { .. }
        )
    }
}

/// Errors raised while building the step registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown placeholder {{{name}}} in pattern \"{pattern}\"")]
    UnknownPlaceholder { pattern: String, name: String },

    #[error("unbalanced brace in pattern \"{0}\"")]
    UnbalancedBrace(String),

    #[error("pattern \"{0}\" is already registered")]
    Duplicate(String),

    #[error("pattern compiled to an invalid regex: {0}")]
    Regex(#[from] regex::Error),
}

/// Errors raised while loading configuration or building clients.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_status_display() {
        let err = StepError::UnexpectedStatus {
            service: "gpd",
            operation: "create debt position",
            status: 400,
            body: "bad iupd".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "gpd create debt position returned status 400: bad iupd"
        );
        assert!(err.is_service_error());
        assert!(!err.is_assertion());
    }

    #[test]
    fn test_timeout_display() {
        let err = StepError::Timeout {
            step: "the client waits its execution".to_string(),
            after: Duration::from_secs(120),
        };
        assert_eq!(
            err.to_string(),
            "step \"the client waits its execution\" timed out after 120s"
        );
    }

    #[test]
    fn test_parameter_display() {
        let err = StepError::Parameter {
            index: 0,
            expected: ParamKind::Int,
            raw: "99999999999999999999".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "parameter 0 expected int, got \"99999999999999999999\""
        );
    }

    #[test]
    fn test_assertion_classification() {
        assert!(StepError::MissingResponse.is_assertion());
        assert!(StepError::NotAList { actual: "object" }.is_assertion());
        assert!(!StepError::NotInstalled.is_assertion());
    }

    #[test]
    fn test_unknown_placeholder_display() {
        let err = RegistryError::UnknownPlaceholder {
            pattern: "a {colour} flow".to_string(),
            name: "colour".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unknown placeholder {colour} in pattern \"a {colour} flow\""
        );
    }
}
