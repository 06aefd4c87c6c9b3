//! Debt position creation and payment in GPD.

use chrono::{Duration, NaiveDateTime, Utc};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::clients::{Services, GPD};
use crate::context::ScenarioContext;
use crate::error::{StepError, StepResult};
use crate::model::DebtPosition;

/// Amount of every generated position, in euro cents.
pub const DEBT_AMOUNT_CENTS: u64 = 10_000;

const DEBTOR_FISCAL_CODE: &str = "VRDGPP80A01H501Z";
const DEBTOR_NAME: &str = "Giuseppe Verdi";
const COMPANY_NAME: &str = "Acceptance Test Company";
const TRANSFER_CATEGORY: &str = "9/0101108TS/";
const TRANSFER_IBAN: &str = "IT0000000000000000000000000";
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Create a debt position for the scenario's organization.
///
/// With `publish` the position is published on creation, so it can be paid
/// straight away.
pub async fn generate_debt_position(
    ctx: &mut ScenarioContext,
    services: &Services,
    publish: bool,
) -> StepResult {
    let position = new_debt_position(&ctx.organization, publish);
    let path = if publish {
        format!(
            "/organizations/{}/debtpositions?toPublish=true",
            position.organization
        )
    } else {
        format!("/organizations/{}/debtpositions", position.organization)
    };

    let payload = debt_position_payload(&position, Utc::now().naive_utc());
    let request = services.gpd.post(&path)?.json(&payload);
    services
        .gpd
        .send("create debt position", request)
        .await?
        .ensure(GPD, "create debt position", |status| status == 201)?;

    info!(
        iupd = %position.iupd,
        iuv = %position.iuv,
        organization = %position.organization,
        published = position.published,
        "debt position created"
    );
    ctx.debt_position = Some(position);
    Ok(())
}

/// Create a published debt position and pay its payment option.
pub async fn generate_and_pay_debt_position(
    ctx: &mut ScenarioContext,
    services: &Services,
) -> StepResult {
    generate_debt_position(ctx, services, true).await?;
    let position = ctx
        .debt_position
        .as_mut()
        .ok_or(StepError::MissingEntity("debt position"))?;

    let path = format!(
        "/organizations/{}/paymentoptions/{}/pay",
        position.organization, position.iuv
    );
    let body = json!({
        "paymentDate": Utc::now().naive_utc().format(DATE_FORMAT).to_string(),
        "paymentMethod": "creditCard",
        "pspCompany": services.psp.id,
        "idReceipt": Uuid::new_v4().to_string(),
    });
    let request = services.gpd.post(&path)?.json(&body);
    services
        .gpd
        .send("pay payment option", request)
        .await?
        .ensure(GPD, "pay payment option", |status| status == 200)?;

    position.paid = true;
    info!(iuv = %position.iuv, "payment option paid");
    Ok(())
}

/// Fresh position with random IUV and IUPD.
pub fn new_debt_position(organization: &str, publish: bool) -> DebtPosition {
    let iuv = new_iuv();
    DebtPosition {
        iupd: format!("BDD-{}", iuv),
        organization: organization.to_string(),
        iuv,
        transfer_id: "1".to_string(),
        amount: DEBT_AMOUNT_CENTS,
        published: publish,
        paid: false,
    }
}

/// 17-digit payment notice code.
pub fn new_iuv() -> String {
    format!(
        "{:017}",
        Uuid::new_v4().as_u128() % 100_000_000_000_000_000
    )
}

/// GPD request body for `position`, with one payment option and one transfer.
pub fn debt_position_payload(position: &DebtPosition, now: NaiveDateTime) -> Value {
    let due_date = now + Duration::days(30);
    let retention_date = now + Duration::days(90);

    json!({
        "iupd": position.iupd,
        "type": "F",
        "fiscalCode": DEBTOR_FISCAL_CODE,
        "fullName": DEBTOR_NAME,
        "companyName": COMPANY_NAME,
        "switchToExpired": false,
        "paymentOption": [{
            "iuv": position.iuv,
            "amount": position.amount,
            "description": "Reporting acceptance test",
            "isPartialPayment": false,
            "dueDate": due_date.format(DATE_FORMAT).to_string(),
            "retentionDate": retention_date.format(DATE_FORMAT).to_string(),
            "fee": 0,
            "transfer": [{
                "idTransfer": position.transfer_id,
                "amount": position.amount,
                "organizationFiscalCode": position.organization,
                "remittanceInformation": format!("Reporting acceptance {}", position.iuv),
                "category": TRANSFER_CATEGORY,
                "iban": TRANSFER_IBAN,
            }],
        }],
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_new_iuv_is_17_digits() {
        for _ in 0..50 {
            let iuv = new_iuv();
            assert_eq!(iuv.len(), 17);
            assert!(iuv.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_new_debt_position() {
        let position = new_debt_position("77777777777", true);
        assert_eq!(position.organization, "77777777777");
        assert_eq!(position.iupd, format!("BDD-{}", position.iuv));
        assert_eq!(position.amount, DEBT_AMOUNT_CENTS);
        assert!(position.published);
        assert!(!position.paid);
    }

    #[test]
    fn test_payload_single_option_and_transfer() {
        let position = new_debt_position("77777777777", false);
        let now = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let payload = debt_position_payload(&position, now);

        assert_eq!(payload["iupd"], position.iupd);
        assert_eq!(payload["type"], "F");
        let options = payload["paymentOption"].as_array().unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0]["iuv"], position.iuv);
        assert_eq!(options[0]["dueDate"], "2024-01-31T12:00:00.000");
        assert_eq!(options[0]["retentionDate"], "2024-03-31T12:00:00.000");

        let transfers = options[0]["transfer"].as_array().unwrap();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0]["organizationFiscalCode"], "77777777777");
        assert_eq!(transfers[0]["amount"], DEBT_AMOUNT_CENTS);
    }
}
