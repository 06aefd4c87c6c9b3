//! Thin HTTP wrapper shared by every service client.
//!
//! Resolves paths against the configured base URL, attaches the
//! subscription key header, and turns responses into [`ServiceResponse`].

use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ServiceEndpoint;
use crate::error::StepError;

/// Maximum number of body characters carried into error messages.
const ERROR_BODY_CHARS: usize = 200;

/// Status code and body of the last service call.
///
/// JSON bodies are parsed; anything else (XML, plain text, empty) is kept
/// verbatim as a JSON string.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceResponse {
    pub status: u16,
    pub body: Value,
}

impl ServiceResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Read status and body from a reqwest response.
    pub async fn read(response: reqwest::Response) -> reqwest::Result<Self> {
        let status = response.status().as_u16();
        let text = response.text().await?;
        let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));
        Ok(Self { status, body })
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text: string bodies unwrapped, JSON re-serialized.
    pub fn body_text(&self) -> String {
        match &self.body {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }

    /// The body as a JSON array, or `NotAList` naming what it was instead.
    pub fn as_list(&self) -> Result<&Vec<Value>, StepError> {
        self.body.as_array().ok_or(StepError::NotAList {
            actual: json_type_name(&self.body),
        })
    }

    /// Pass the response through if `accepted(status)`, else fail with
    /// `UnexpectedStatus`.
    pub fn ensure(
        self,
        service: &'static str,
        operation: &'static str,
        accepted: impl FnOnce(u16) -> bool,
    ) -> Result<Self, StepError> {
        if accepted(self.status) {
            return Ok(self);
        }
        let body: String = self.body_text().chars().take(ERROR_BODY_CHARS).collect();
        warn!(
            service,
            operation,
            status = self.status,
            body = %body,
            "service returned unexpected status"
        );
        Err(StepError::UnexpectedStatus {
            service,
            operation,
            status: self.status,
            body,
        })
    }

    /// Shorthand for `ensure` accepting any 2xx.
    pub fn ensure_success(
        self,
        service: &'static str,
        operation: &'static str,
    ) -> Result<Self, StepError> {
        self.ensure(service, operation, |status| (200..300).contains(&status))
    }
}

/// JSON type name used in `NotAList` errors.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Client for one external service.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    name: &'static str,
    base_url: String,
    key: Option<(String, String)>,
    http: Client,
}

impl ServiceClient {
    pub fn new(name: &'static str, endpoint: &ServiceEndpoint, http: Client) -> Self {
        Self {
            name,
            base_url: endpoint.url.trim_end_matches('/').to_string(),
            key: endpoint
                .subscription_key
                .clone()
                .map(|key| (endpoint.key_header.clone(), key)),
            http,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `path`, which must start with `/`.
    pub fn url(&self, path: &str) -> Result<String, StepError> {
        if self.base_url.is_empty() {
            return Err(StepError::NotConfigured { service: self.name });
        }
        Ok(format!("{}{}", self.base_url, path))
    }

    /// Request builder with the subscription key attached.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, StepError> {
        let mut request = self.http.request(method, self.url(path)?);
        if let Some((header, key)) = &self.key {
            request = request.header(header.as_str(), key.as_str());
        }
        Ok(request)
    }

    pub fn get(&self, path: &str) -> Result<RequestBuilder, StepError> {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> Result<RequestBuilder, StepError> {
        self.request(Method::POST, path)
    }

    /// Send `request` and read the response, whatever its status.
    pub async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<ServiceResponse, StepError> {
        let response = request
            .send()
            .await
            .map_err(|source| self.transport_error(operation, source))?;
        let response = ServiceResponse::read(response)
            .await
            .map_err(|source| self.transport_error(operation, source))?;

        debug!(
            service = self.name,
            operation,
            status = response.status,
            "service call completed"
        );
        Ok(response)
    }

    fn transport_error(&self, operation: &'static str, source: reqwest::Error) -> StepError {
        warn!(
            service = self.name,
            operation,
            error = %source,
            "service call failed"
        );
        StepError::Transport {
            service: self.name,
            operation,
            source,
        }
    }
}
