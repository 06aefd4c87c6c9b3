//! Step registry: phrase patterns bound to asynchronous actions.
//!
//! The registry is the dispatch table between step text and the code that
//! runs it. Matching ignores the Given/When/Then keyword, exactly one
//! binding must match, and each action runs to completion (or timeout)
//! before the caller moves on. Nothing is caught or retried here.

mod args;
mod pattern;

pub use args::{StepArg, StepArgs};
pub use pattern::{ParamKind, StepPattern};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tracing::{debug, warn};

use crate::clients::Services;
use crate::config::DEFAULT_STEP_TIMEOUT_MS;
use crate::context::ScenarioContext;
use crate::error::{RegistryError, StepError, StepResult};

/// Boxed action bound to a pattern.
pub type StepAction = Arc<
    dyn for<'a> Fn(&'a mut ScenarioContext, &'a Services, StepArgs) -> BoxFuture<'a, StepResult>
        + Send
        + Sync,
>;

/// Gherkin keyword a binding was registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Given,
    When,
    Then,
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Keyword::Given => "Given",
            Keyword::When => "When",
            Keyword::Then => "Then",
        };
        f.write_str(name)
    }
}

/// A pattern and the action it runs.
pub struct StepBinding {
    pub keyword: Keyword,
    pub pattern: StepPattern,
    action: StepAction,
}

impl fmt::Debug for StepBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepBinding")
            .field("keyword", &self.keyword)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

/// Ordered set of step bindings plus the per-step timeout.
pub struct StepRegistry {
    bindings: Vec<StepBinding>,
    step_timeout: Duration,
}

impl fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepRegistry")
            .field("bindings", &self.bindings.len())
            .field("step_timeout", &self.step_timeout)
            .finish()
    }
}

impl Default for StepRegistry {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_STEP_TIMEOUT_MS))
    }
}

impl StepRegistry {
    pub fn new(step_timeout: Duration) -> Self {
        Self {
            bindings: Vec::new(),
            step_timeout,
        }
    }

    pub fn step_timeout(&self) -> Duration {
        self.step_timeout
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Registered `(keyword, pattern)` pairs in registration order.
    pub fn patterns(&self) -> impl Iterator<Item = (Keyword, &str)> {
        self.bindings.iter().map(|b| (b.keyword, b.pattern.as_str()))
    }

    /// Bind `pattern` to `action`.
    ///
    /// Fails if the pattern does not parse or the same pattern text is
    /// already registered.
    pub fn register<F>(
        &mut self,
        keyword: Keyword,
        pattern: &str,
        action: F,
    ) -> Result<&mut Self, RegistryError>
    where
        F: for<'a> Fn(&'a mut ScenarioContext, &'a Services, StepArgs) -> BoxFuture<'a, StepResult>
            + Send
            + Sync
            + 'static,
    {
        let pattern = StepPattern::parse(pattern)?;
        if self.bindings.iter().any(|b| b.pattern == pattern) {
            return Err(RegistryError::Duplicate(pattern.as_str().to_string()));
        }
        self.bindings.push(StepBinding {
            keyword,
            pattern,
            action: Arc::new(action),
        });
        Ok(self)
    }

    pub fn given<F>(&mut self, pattern: &str, action: F) -> Result<&mut Self, RegistryError>
    where
        F: for<'a> Fn(&'a mut ScenarioContext, &'a Services, StepArgs) -> BoxFuture<'a, StepResult>
            + Send
            + Sync
            + 'static,
    {
        self.register(Keyword::Given, pattern, action)
    }

    pub fn when<F>(&mut self, pattern: &str, action: F) -> Result<&mut Self, RegistryError>
    where
        F: for<'a> Fn(&'a mut ScenarioContext, &'a Services, StepArgs) -> BoxFuture<'a, StepResult>
            + Send
            + Sync
            + 'static,
    {
        self.register(Keyword::When, pattern, action)
    }

    pub fn then<F>(&mut self, pattern: &str, action: F) -> Result<&mut Self, RegistryError>
    where
        F: for<'a> Fn(&'a mut ScenarioContext, &'a Services, StepArgs) -> BoxFuture<'a, StepResult>
            + Send
            + Sync
            + 'static,
    {
        self.register(Keyword::Then, pattern, action)
    }

    /// The single binding matching `text`, with its typed arguments.
    pub fn find(&self, text: &str) -> Result<(&StepBinding, StepArgs), StepError> {
        let mut matches = self.bindings.iter().filter(|b| b.pattern.is_match(text));
        let Some(binding) = matches.next() else {
            return Err(StepError::Undefined(text.to_string()));
        };

        let rest: Vec<&StepBinding> = matches.collect();
        if !rest.is_empty() {
            let candidates = std::iter::once(binding)
                .chain(rest)
                .map(|b| b.pattern.as_str().to_string())
                .collect();
            return Err(StepError::Ambiguous {
                step: text.to_string(),
                candidates,
            });
        }

        let args = binding
            .pattern
            .extract(text)
            .unwrap_or_else(|| Ok(StepArgs::default()))?;
        Ok((binding, args))
    }

    /// Run the action bound to `text` and wait for it to settle.
    ///
    /// If the action is still pending when the step timeout elapses it is
    /// dropped and the step fails with `Timeout`.
    pub async fn dispatch(
        &self,
        text: &str,
        ctx: &mut ScenarioContext,
        services: &Services,
    ) -> StepResult {
        let (binding, args) = self.find(text)?;
        debug!(
            keyword = %binding.keyword,
            pattern = binding.pattern.as_str(),
            "dispatching step"
        );

        match tokio::time::timeout(self.step_timeout, (binding.action)(ctx, services, args)).await
        {
            Ok(result) => result,
            Err(_) => {
                warn!(step = text, after = ?self.step_timeout, "step timed out");
                Err(StepError::Timeout {
                    step: text.to_string(),
                    after: self.step_timeout,
                })
            }
        }
    }
}
