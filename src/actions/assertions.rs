//! Assertions on the last recorded response.

use crate::clients::ServiceResponse;
use crate::error::{StepError, StepResult};

pub fn assert_status_code(response: Option<&ServiceResponse>, expected: i64) -> StepResult {
    let response = response.ok_or(StepError::MissingResponse)?;
    if i64::from(response.status) == expected {
        return Ok(());
    }
    Err(StepError::Assertion(format!(
        "expected status code {}, got {}",
        expected, response.status
    )))
}

pub fn assert_non_empty_list(response: Option<&ServiceResponse>) -> StepResult {
    let flows = response.ok_or(StepError::MissingResponse)?.as_list()?;
    if flows.is_empty() {
        return Err(StepError::Assertion(
            "expected a non-empty list of flows, got an empty list".to_string(),
        ));
    }
    Ok(())
}

pub fn assert_empty_list(response: Option<&ServiceResponse>) -> StepResult {
    let flows = response.ok_or(StepError::MissingResponse)?.as_list()?;
    if !flows.is_empty() {
        return Err(StepError::Assertion(format!(
            "expected an empty list of flows, got {} flows",
            flows.len()
        )));
    }
    Ok(())
}
