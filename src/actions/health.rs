//! Health checks for the backing services.

use tracing::{info, warn};

use crate::clients::{ServiceClient, Services};
use crate::error::{StepError, StepResult};
use crate::model::AppInfo;

/// Call `{base}{health_path}` and require a 2xx answer.
///
/// The body is read as [`AppInfo`] when it parses; a healthy service with
/// an unexpected body is still healthy.
pub async fn check(service: &ServiceClient, health_path: &str) -> Result<AppInfo, StepError> {
    let request = service.get(health_path)?;
    let response = request.send().await.map_err(|e| {
        warn!(service = service.name(), error = %e, "health check unreachable");
        StepError::HealthCheck {
            service: service.name(),
            reason: e.to_string(),
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        warn!(service = service.name(), status = %status, "health check failed");
        return Err(StepError::HealthCheck {
            service: service.name(),
            reason: format!("status {}", status.as_u16()),
        });
    }

    let info = response.json::<AppInfo>().await.unwrap_or_default();
    info!(
        service = service.name(),
        name = info.name.as_deref().unwrap_or("-"),
        version = info.version.as_deref().unwrap_or("-"),
        environment = info.environment.as_deref().unwrap_or("-"),
        "service healthy"
    );
    Ok(info)
}

pub async fn check_gpd(services: &Services) -> StepResult {
    check(&services.gpd, &services.health_path).await.map(drop)
}

pub async fn check_api_config(services: &Services) -> StepResult {
    check(&services.api_config, &services.health_path)
        .await
        .map(drop)
}

pub async fn check_gpd_payments(services: &Services) -> StepResult {
    check(&services.gpd_payments, &services.health_path)
        .await
        .map(drop)
}

pub async fn check_reporting_analysis(services: &Services) -> StepResult {
    check(&services.reporting_analysis, &services.health_path)
        .await
        .map(drop)
}
