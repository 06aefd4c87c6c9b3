//! Reporting acceptance suite against in-process mocks.
//!
//! Starts the mock platform, installs a harness pointing at it and runs
//! `features/reporting.feature` end to end.

mod common;

use reporting_bdd::world::{self, Harness};
use reporting_bdd::Config;

use common::MockPlatform;

reporting_bdd::step_definitions!();

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("reporting_bdd=debug".parse().unwrap()),
        )
        .init();

    let platform = MockPlatform::start().await;

    let mut config = Config::for_base_url(&platform.url());
    config.runner.batch_wait_ms = 50;
    config.runner.step_timeout_ms = 10_000;
    config.runner.http_timeout_ms = 5_000;

    let harness = Harness::from_config(&config).expect("Failed to build harness");
    assert!(world::install(harness), "harness already installed");

    world::run_features("features/reporting.feature", 1).await;
}
