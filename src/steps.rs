//! Phrase table for the reporting acceptance suite.

use std::time::Duration;

use futures::FutureExt;

use crate::actions::{assertions, gpd, health, reporting};
use crate::error::RegistryError;
use crate::registry::StepRegistry;

/// Registry with every reporting phrase bound to its action.
pub fn reporting_registry(step_timeout: Duration) -> Result<StepRegistry, RegistryError> {
    let mut registry = StepRegistry::new(step_timeout);

    // Preconditions
    registry
        .given("GPD service running", |_, services, _| {
            health::check_gpd(services).boxed()
        })?
        .given("APIConfig service running", |_, services, _| {
            health::check_api_config(services).boxed()
        })?
        .given("GPD Payments service running", |_, services, _| {
            health::check_gpd_payments(services).boxed()
        })?
        .given("reporting analysis service running", |_, services, _| {
            health::check_reporting_analysis(services).boxed()
        })?
        .given("a not paid debt position", |ctx, services, _| {
            gpd::generate_debt_position(ctx, services, true).boxed()
        })?
        .given("a paid debt position", |ctx, services, _| {
            gpd::generate_and_pay_debt_position(ctx, services).boxed()
        })?
        .given("a report flow sent to Node", |ctx, services, _| {
            reporting::send_report_flow_to_node(ctx, services).boxed()
        })?;

    // Actions
    registry
        .when(
            "the reporting batch analyzes the reporting flows for the organization",
            |_, services, _| reporting::force_reporting_batch_start(services).boxed(),
        )?
        .when("the client waits its execution", |_, services, _| {
            reporting::wait_reporting_process_execution(services).boxed()
        })?
        .when(
            "the client asks the flow list for the organization",
            |ctx, services, _| reporting::retrieve_report_flow_list(ctx, services).boxed(),
        )?
        .when(
            "the client asks the detail for one of the report flows",
            |ctx, services, _| reporting::retrieve_report_flow(ctx, services).boxed(),
        )?;

    // Outcomes
    registry
        .then("the client receives status code {int}", |ctx, _, args| {
            let result = args
                .int(0)
                .and_then(|code| assertions::assert_status_code(ctx.response(), code));
            futures::future::ready(result).boxed()
        })?
        .then("the client receives a non-empty list of flows", |ctx, _, _| {
            futures::future::ready(assertions::assert_non_empty_list(ctx.response())).boxed()
        })?
        .then("the client receives an empty list of flows", |ctx, _, _| {
            futures::future::ready(assertions::assert_empty_list(ctx.response())).boxed()
        })?;

    Ok(registry)
}
