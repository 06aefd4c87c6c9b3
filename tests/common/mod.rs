//! In-process mock of the reporting platform.
//!
//! One axum server on a random port stands in for all six services, each
//! under its own path prefix (see `Config::for_base_url`). Flows sent to the
//! Node mock only show up in the analysis mock after the batch trigger.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use reporting_bdd::model::FlowSummary;

/// Debt position as stored by the GPD mock.
#[derive(Debug, Clone)]
pub struct MockPosition {
    pub organization: String,
    pub iupd: String,
    pub iuv: String,
    pub published: bool,
    pub paid: bool,
}

#[derive(Debug, Default)]
pub struct PlatformState {
    pub positions: Vec<MockPosition>,
    /// Flows accepted by Node, not analysed yet.
    pub pending_flows: HashMap<String, Vec<FlowSummary>>,
    /// Flows exposed by the analysis API.
    pub analysed_flows: HashMap<String, Vec<FlowSummary>>,
    pub unhealthy: HashSet<String>,
    pub node_ko: bool,
    pub create_status: Option<u16>,
    pub batch_triggers: Vec<String>,
    pub subscription_keys: Vec<String>,
}

type Shared = Arc<RwLock<PlatformState>>;

/// Mock platform server.
pub struct MockPlatform {
    state: Shared,
    _handle: JoinHandle<()>,
    addr: SocketAddr,
}

impl MockPlatform {
    /// Start on a random available port.
    pub async fn start() -> Self {
        let state: Shared = Arc::new(RwLock::new(PlatformState::default()));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock platform");
        let addr = listener.local_addr().expect("Failed to get local address");

        let app = Router::new()
            .route("/gpd/info", get(|s: State<Shared>| health(s, "gpd")))
            .route("/apiconfig/info", get(|s: State<Shared>| health(s, "apiconfig")))
            .route("/payments/info", get(|s: State<Shared>| health(s, "payments")))
            .route("/analysis/info", get(|s: State<Shared>| health(s, "analysis")))
            .route(
                "/gpd/organizations/:org/debtpositions",
                post(create_debt_position),
            )
            .route(
                "/gpd/organizations/:org/paymentoptions/:iuv/pay",
                post(pay_payment_option),
            )
            .route("/node", post(node_send_flow))
            .route("/node/", post(node_send_flow))
            .route("/batch/admin/functions/:name", post(trigger_batch))
            .route("/analysis/organizations/:org/reportings", get(list_flows))
            .route(
                "/analysis/organizations/:org/reportings/:flow_id/date/:date",
                get(get_flow),
            )
            .with_state(state.clone());

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Mock platform failed");
        });

        Self {
            state,
            _handle: handle,
            addr,
        }
    }

    /// Base URL, e.g. "http://127.0.0.1:12345".
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Make the health check of `prefix` ("gpd", "analysis", ...) answer 503.
    pub async fn set_unhealthy(&self, prefix: &str) {
        self.state.write().await.unhealthy.insert(prefix.to_string());
    }

    /// Make Node answer every flow with a KO outcome.
    pub async fn set_node_ko(&self, ko: bool) {
        self.state.write().await.node_ko = ko;
    }

    /// Force the status returned by debt position creation.
    pub async fn set_create_status(&self, status: u16) {
        self.state.write().await.create_status = Some(status);
    }

    /// Seed the analysis API with a flow for `organization`.
    pub async fn seed_flow(&self, organization: &str, flow_id: &str, flow_date: &str) {
        self.state
            .write()
            .await
            .analysed_flows
            .entry(organization.to_string())
            .or_default()
            .push(FlowSummary {
                flow_id: flow_id.to_string(),
                flow_date: flow_date.to_string(),
            });
    }

    pub async fn positions(&self) -> Vec<MockPosition> {
        self.state.read().await.positions.clone()
    }

    pub async fn batch_triggers(&self) -> Vec<String> {
        self.state.read().await.batch_triggers.clone()
    }

    pub async fn subscription_keys(&self) -> Vec<String> {
        self.state.read().await.subscription_keys.clone()
    }

    pub async fn analysed_flows(&self, organization: &str) -> Vec<FlowSummary> {
        self.state
            .read()
            .await
            .analysed_flows
            .get(organization)
            .cloned()
            .unwrap_or_default()
    }
}

async fn health(State(state): State<Shared>, prefix: &'static str) -> impl IntoResponse {
    if state.read().await.unhealthy.contains(prefix) {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"status": "DOWN"})));
    }
    (
        StatusCode::OK,
        Json(json!({"name": prefix, "version": "0.0.0-mock", "environment": "test"})),
    )
}

async fn create_debt_position(
    State(state): State<Shared>,
    Path(org): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let mut state = state.write().await;
    if let Some(key) = headers
        .get("Ocp-Apim-Subscription-Key")
        .and_then(|v| v.to_str().ok())
    {
        state.subscription_keys.push(key.to_string());
    }
    if let Some(status) = state.create_status {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, Json(json!({"title": "forced failure"})));
    }

    let iupd = body["iupd"].as_str().unwrap_or_default().to_string();
    let iuv = body["paymentOption"][0]["iuv"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    if iupd.is_empty() || iuv.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"title": "missing iupd or iuv"})),
        );
    }

    state.positions.push(MockPosition {
        organization: org,
        iupd,
        iuv,
        published: params.get("toPublish").map(String::as_str) == Some("true"),
        paid: false,
    });
    (StatusCode::CREATED, Json(body))
}

async fn pay_payment_option(
    State(state): State<Shared>,
    Path((org, iuv)): Path<(String, String)>,
) -> impl IntoResponse {
    let mut state = state.write().await;
    let Some(position) = state
        .positions
        .iter_mut()
        .find(|p| p.organization == org && p.iuv == iuv)
    else {
        return (StatusCode::NOT_FOUND, Json(json!({"title": "not found"})));
    };
    if !position.published || position.paid {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"title": "not payable"})),
        );
    }
    position.paid = true;
    (StatusCode::OK, Json(json!({"iuv": iuv, "status": "PO_PAID"})))
}

async fn node_send_flow(State(state): State<Shared>, body: String) -> impl IntoResponse {
    let mut state = state.write().await;
    if state.node_ko {
        return (StatusCode::OK, node_response("KO", Some("PPT_SEMANTICA")));
    }

    let organization = tag(&body, "identificativoDominio");
    let flow_id = tag(&body, "identificativoFlusso");
    let flow_date = tag(&body, "dataOraFlusso");
    let document = tag(&body, "xmlRendicontazione")
        .and_then(|encoded| STANDARD.decode(encoded).ok())
        .and_then(|bytes| String::from_utf8(bytes).ok());

    match (organization, flow_id, flow_date, document) {
        (Some(organization), Some(flow_id), Some(flow_date), Some(document))
            if document.contains(flow_id) =>
        {
            state
                .pending_flows
                .entry(organization.to_string())
                .or_default()
                .push(FlowSummary {
                    flow_id: flow_id.to_string(),
                    flow_date: flow_date.to_string(),
                });
            (StatusCode::OK, node_response("OK", None))
        }
        _ => (StatusCode::OK, node_response("KO", Some("PPT_SINTASSI_XSD"))),
    }
}

async fn trigger_batch(State(state): State<Shared>, Path(name): Path<String>) -> StatusCode {
    let mut state = state.write().await;
    state.batch_triggers.push(name);
    let pending = std::mem::take(&mut state.pending_flows);
    for (organization, flows) in pending {
        state
            .analysed_flows
            .entry(organization)
            .or_default()
            .extend(flows);
    }
    StatusCode::ACCEPTED
}

async fn list_flows(State(state): State<Shared>, Path(org): Path<String>) -> impl IntoResponse {
    let flows = state
        .read()
        .await
        .analysed_flows
        .get(&org)
        .cloned()
        .unwrap_or_default();
    Json(flows)
}

async fn get_flow(
    State(state): State<Shared>,
    Path((org, flow_id, date)): Path<(String, String, String)>,
) -> impl IntoResponse {
    let state = state.read().await;
    let found = state
        .analysed_flows
        .get(&org)
        .and_then(|flows| {
            flows
                .iter()
                .find(|f| f.flow_id == flow_id && f.flow_date == date)
        })
        .cloned();
    match found {
        Some(flow) => (
            StatusCode::OK,
            Json(json!({
                "identificativoFlusso": flow.flow_id,
                "dataOraFlusso": flow.flow_date,
                "numeroTotalePagamenti": 1,
            })),
        ),
        None => (StatusCode::NOT_FOUND, Json(json!({"title": "flow not found"}))),
    }
}

fn node_response(esito: &str, fault: Option<&str>) -> String {
    let fault = fault
        .map(|code| format!("<fault><faultCode>{}</faultCode></fault>", code))
        .unwrap_or_default();
    format!(
        "<soapenv:Envelope xmlns:soapenv=\"http://schemas.xmlsoap.org/soap/envelope/\"><soapenv:Body>\
         <nodoInviaFlussoRendicontazioneRisposta>{}<esito>{}</esito></nodoInviaFlussoRendicontazioneRisposta>\
         </soapenv:Body></soapenv:Envelope>",
        fault, esito
    )
}

fn tag<'a>(body: &'a str, name: &str) -> Option<&'a str> {
    let open = format!("<{}>", name);
    let close = format!("</{}>", name);
    let start = body.find(&open)? + open.len();
    let end = body[start..].find(&close)? + start;
    Some(body[start..end].trim())
}
