//! Report flow submission to Node, batch trigger and analysis reads.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{NaiveDateTime, SubsecRound, Utc};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use super::gpd::{new_iuv, DEBT_AMOUNT_CENTS};
use crate::clients::{Services, NODE, REPORTING_ANALYSIS, REPORTING_BATCH};
use crate::config::PspConfig;
use crate::context::ScenarioContext;
use crate::error::{StepError, StepResult};
use crate::model::{format_euros, FlowSummary, ReportFlow};

const SOAP_ACTION: &str = "nodoInviaFlussoRendicontazione";

/// Build a one-payment flow, send it to Node and keep it in the context.
///
/// The payment reuses the scenario's debt position when there is one.
pub async fn send_report_flow_to_node(ctx: &mut ScenarioContext, services: &Services) -> StepResult {
    let (iuv, amount) = match &ctx.debt_position {
        Some(position) => (position.iuv.clone(), position.amount),
        None => (new_iuv(), DEBT_AMOUNT_CENTS),
    };
    let flow_date = Utc::now().naive_utc().trunc_subsecs(0);
    let flow = ReportFlow {
        flow_id: new_flow_id(flow_date, &services.psp.id),
        flow_date,
        organization: ctx.organization.clone(),
        iuv,
        amount,
    };

    let envelope = send_flow_envelope(&flow, &services.psp);
    let request = services
        .node
        .post("/")?
        .header("SOAPAction", SOAP_ACTION)
        .header(reqwest::header::CONTENT_TYPE, "text/xml; charset=utf-8")
        .body(envelope);
    let response = services
        .node
        .send("send report flow", request)
        .await?
        .ensure_success(NODE, "send report flow")?;

    if let Some(fault) = soap_fault(&response.body_text()) {
        warn!(flow_id = %flow.flow_id, fault = %fault, "node rejected report flow");
        return Err(StepError::NodeFault {
            flow_id: flow.flow_id,
            fault,
        });
    }

    info!(
        flow_id = %flow.flow_id,
        organization = %flow.organization,
        iuv = %flow.iuv,
        "report flow sent to node"
    );
    ctx.report_flow = Some(flow);
    Ok(())
}

/// Manually fire the reporting batch timer function.
pub async fn force_reporting_batch_start(services: &Services) -> StepResult {
    let path = format!("/admin/functions/{}", services.batch_function);
    let request = services
        .reporting_batch
        .post(&path)?
        .json(&json!({ "input": "" }));
    let response = services
        .reporting_batch
        .send("trigger batch", request)
        .await?
        .ensure_success(REPORTING_BATCH, "trigger batch")?;

    info!(
        function = %services.batch_function,
        status = response.status,
        "reporting batch triggered"
    );
    Ok(())
}

/// Give the batch time to finish. There is no completion signal to poll.
pub async fn wait_reporting_process_execution(services: &Services) -> StepResult {
    info!(wait = ?services.batch_wait, "waiting for reporting batch");
    tokio::time::sleep(services.batch_wait).await;
    Ok(())
}

/// Fetch the organization's flow list into the context, whatever the status.
pub async fn retrieve_report_flow_list(ctx: &mut ScenarioContext, services: &Services) -> StepResult {
    let path = format!("/organizations/{}/reportings", ctx.organization);
    let request = services.reporting_analysis.get(&path)?;
    let response = services
        .reporting_analysis
        .send("list report flows", request)
        .await?;
    ctx.record_response(response);
    Ok(())
}

/// Fetch one flow's detail into the context.
///
/// Uses the flow sent in this scenario, falling back to the first element of
/// the last list response.
pub async fn retrieve_report_flow(ctx: &mut ScenarioContext, services: &Services) -> StepResult {
    let (flow_id, flow_date) = flow_to_retrieve(ctx).ok_or(StepError::MissingEntity("report flow"))?;
    let path = format!(
        "/organizations/{}/reportings/{}/date/{}",
        ctx.organization, flow_id, flow_date
    );
    let request = services.reporting_analysis.get(&path)?;
    let response = services
        .reporting_analysis
        .send("get report flow", request)
        .await?;

    if !response.is_success() {
        warn!(
            service = REPORTING_ANALYSIS,
            flow_id = %flow_id,
            status = response.status,
            "report flow detail not available"
        );
    }
    ctx.record_response(response);
    Ok(())
}

fn flow_to_retrieve(ctx: &ScenarioContext) -> Option<(String, String)> {
    if let Some(flow) = &ctx.report_flow {
        return Some((flow.flow_id.clone(), flow.flow_date_param()));
    }
    let first = ctx.response()?.as_list().ok()?.first()?;
    let summary = serde_json::from_value::<FlowSummary>(first.clone()).ok()?;
    Some((summary.flow_id, summary.flow_date))
}

/// `YYYY-MM-DD{psp}-{unique}`.
pub fn new_flow_id(flow_date: NaiveDateTime, psp_id: &str) -> String {
    let unique = Uuid::new_v4().simple().to_string();
    format!(
        "{}{}-{}",
        flow_date.format("%Y-%m-%d"),
        psp_id,
        &unique[..10]
    )
}

/// FlussoRiversamento document for `flow` with a single payment.
pub fn flow_xml(flow: &ReportFlow, psp_id: &str) -> String {
    let flow_date = flow.flow_date_param();
    let regulation_date = flow.flow_date.format("%Y-%m-%d");
    let amount = format_euros(flow.amount);

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<FlussoRiversamento xmlns="http://www.digitpa.gov.it/schemas/2011/Pagamenti/">
  <versioneOggetto>1.0</versioneOggetto>
  <identificativoFlusso>{flow_id}</identificativoFlusso>
  <dataOraFlusso>{flow_date}</dataOraFlusso>
  <identificativoUnivocoRegolamento>SCT-{flow_id}</identificativoUnivocoRegolamento>
  <dataRegolamento>{regulation_date}</dataRegolamento>
  <istitutoMittente>
    <identificativoUnivocoMittente>
      <tipoIdentificativoUnivoco>B</tipoIdentificativoUnivoco>
      <codiceIdentificativoUnivoco>{psp_id}</codiceIdentificativoUnivoco>
    </identificativoUnivocoMittente>
    <denominazioneMittente>{psp_id}</denominazioneMittente>
  </istitutoMittente>
  <istitutoRicevente>
    <identificativoUnivocoRicevente>
      <tipoIdentificativoUnivoco>G</tipoIdentificativoUnivoco>
      <codiceIdentificativoUnivoco>{organization}</codiceIdentificativoUnivoco>
    </identificativoUnivocoRicevente>
    <denominazioneRicevente>{organization}</denominazioneRicevente>
  </istitutoRicevente>
  <numeroTotalePagamenti>1</numeroTotalePagamenti>
  <importoTotalePagamenti>{amount}</importoTotalePagamenti>
  <datiSingoliPagamenti>
    <identificativoUnivocoVersamento>{iuv}</identificativoUnivocoVersamento>
    <identificativoUnivocoRiscossione>{iuv}</identificativoUnivocoRiscossione>
    <indiceDatiSingoloPagamento>1</indiceDatiSingoloPagamento>
    <singoloImportoPagato>{amount}</singoloImportoPagato>
    <codiceEsitoSingoloPagamento>0</codiceEsitoSingoloPagamento>
    <dataEsitoSingoloPagamento>{regulation_date}</dataEsitoSingoloPagamento>
  </datiSingoliPagamenti>
</FlussoRiversamento>"#,
        flow_id = xml_escape(&flow.flow_id),
        organization = xml_escape(&flow.organization),
        iuv = xml_escape(&flow.iuv),
        psp_id = xml_escape(psp_id),
    )
}

/// SOAP request carrying the base64 flow document.
pub fn send_flow_envelope(flow: &ReportFlow, psp: &PspConfig) -> String {
    let encoded = STANDARD.encode(flow_xml(flow, &psp.id));
    format!(
        r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns:ws="http://ws.pagamenti.telematici.gov/">
  <soapenv:Header/>
  <soapenv:Body>
    <ws:nodoInviaFlussoRendicontazione>
      <identificativoPSP>{psp_id}</identificativoPSP>
      <identificativoIntermediarioPSP>{broker_id}</identificativoIntermediarioPSP>
      <identificativoCanale>{channel_id}</identificativoCanale>
      <password>{password}</password>
      <identificativoDominio>{organization}</identificativoDominio>
      <identificativoFlusso>{flow_id}</identificativoFlusso>
      <dataOraFlusso>{flow_date}</dataOraFlusso>
      <xmlRendicontazione>{encoded}</xmlRendicontazione>
    </ws:nodoInviaFlussoRendicontazione>
  </soapenv:Body>
</soapenv:Envelope>"#,
        psp_id = xml_escape(&psp.id),
        broker_id = xml_escape(&psp.broker_id),
        channel_id = xml_escape(&psp.channel_id),
        password = xml_escape(&psp.password),
        organization = xml_escape(&flow.organization),
        flow_id = xml_escape(&flow.flow_id),
        flow_date = flow.flow_date_param(),
    )
}

/// Escape text for use in element content.
pub fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Fault description when a Node response carries `<esito>KO</esito>`.
pub fn soap_fault(body: &str) -> Option<String> {
    if tag_text(body, "esito")? != "KO" {
        return None;
    }
    let fault = tag_text(body, "faultCode")
        .or_else(|| tag_text(body, "description"))
        .unwrap_or("KO");
    Some(fault.to_string())
}

fn tag_text<'a>(body: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let start = body.find(&open)? + open.len();
    let end = body[start..].find(&close)? + start;
    Some(body[start..end].trim())
}
