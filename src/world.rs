//! Cucumber world and runner wiring.
//!
//! A [`Harness`] (registry plus service clients) is installed once per
//! process. Each scenario gets a fresh [`ReportingWorld`] holding its own
//! [`ScenarioContext`]; the catch-all steps expanded by
//! [`step_definitions!`](crate::step_definitions) forward every step's text
//! to the registry.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use cucumber::World;

use crate::clients::Services;
use crate::config::Config;
use crate::context::ScenarioContext;
use crate::error::{ConfigError, StepError, StepResult};
use crate::hooks;
use crate::registry::StepRegistry;
use crate::steps;

/// Shared, immutable state for every scenario in the process.
#[derive(Debug)]
pub struct Harness {
    pub registry: StepRegistry,
    pub services: Services,
}

impl Harness {
    pub fn new(registry: StepRegistry, services: Services) -> Self {
        Self { registry, services }
    }

    /// Reporting registry and clients for `config`.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(
            steps::reporting_registry(config.runner.step_timeout())?,
            Services::from_config(config)?,
        ))
    }
}

static HARNESS: OnceLock<Arc<Harness>> = OnceLock::new();

/// Install the process harness. Returns false if one was already installed.
pub fn install(harness: Harness) -> bool {
    HARNESS.set(Arc::new(harness)).is_ok()
}

pub fn installed() -> Option<Arc<Harness>> {
    HARNESS.get().cloned()
}

#[derive(World)]
#[world(init = Self::new)]
pub struct ReportingWorld {
    context: ScenarioContext,
    harness: Option<Arc<Harness>>,
}

impl std::fmt::Debug for ReportingWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportingWorld")
            .field("context", &self.context)
            .field("installed", &self.harness.is_some())
            .finish()
    }
}

impl ReportingWorld {
    async fn new() -> Self {
        let harness = installed();
        let organization = harness
            .as_ref()
            .map(|h| h.services.organization.clone())
            .unwrap_or_default();
        Self::with_harness(organization, harness)
    }

    pub fn with_harness(organization: impl Into<String>, harness: Option<Arc<Harness>>) -> Self {
        Self {
            context: ScenarioContext::new(organization),
            harness,
        }
    }

    pub fn context(&self) -> &ScenarioContext {
        &self.context
    }

    /// Dispatch `text` through the installed registry.
    pub async fn run_step(&mut self, text: &str) -> StepResult {
        let harness = self.harness.clone().ok_or(StepError::NotInstalled)?;
        harness
            .registry
            .dispatch(text, &mut self.context, &harness.services)
            .await
    }

    /// Like [`run_step`](Self::run_step), failing the cucumber step on error.
    pub async fn step(&mut self, text: &str) {
        if let Err(e) = self.run_step(text).await {
            panic!("{}", e);
        }
    }
}

/// Run every feature under `features` and exit non-zero on failure.
///
/// Command line arguments belong to the caller; cucumber's own CLI is not
/// parsed.
pub async fn run_features(features: impl AsRef<Path>, max_concurrent_scenarios: usize) {
    ReportingWorld::cucumber()
        .with_default_cli()
        .max_concurrent_scenarios(max_concurrent_scenarios)
        .before(|_feature, _rule, scenario, _world| {
            hooks::announce_scenario(&scenario.name);
            Box::pin(async {})
        })
        .fail_on_skipped()
        .run_and_exit(features.as_ref())
        .await;
}

/// Expand the catch-all Given/When/Then steps in the calling crate.
///
/// Each step matches any text and hands the captured text to
/// [`ReportingWorld::step`](crate::world::ReportingWorld::step). The capture
/// must not be named `step`: cucumber binds that name to the gherkin step.
#[macro_export]
macro_rules! step_definitions {
    () => {
        #[::cucumber::given(regex = r"^(.+)$")]
        async fn reporting_given(world: &mut $crate::world::ReportingWorld, text: String) {
            world.step(&text).await;
        }

        #[::cucumber::when(regex = r"^(.+)$")]
        async fn reporting_when(world: &mut $crate::world::ReportingWorld, text: String) {
            world.step(&text).await;
        }

        #[::cucumber::then(regex = r"^(.+)$")]
        async fn reporting_then(world: &mut $crate::world::ReportingWorld, text: String) {
            world.step(&text).await;
        }
    };
}
