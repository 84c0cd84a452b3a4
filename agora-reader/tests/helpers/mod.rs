//! Test helpers: in-process mock record store
//!
//! Serves `/v0/{base}/{table}` and `/v0/{base}/{table}/{id}` from fixed
//! records, evaluates the two formula shapes the reader emits, and records
//! every request so tests can assert on call counts and parameters.

#![allow(dead_code)]

use agora_common::config::{LinkageStrategy, RevalidationWindow, SortSpec, StoreSettings};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

pub const BASE_ID: &str = "appTest";
pub const TOPICS_TABLE: &str = "Topics";
pub const VIEWPOINTS_TABLE: &str = "Viewpoints";
pub const API_KEY: &str = "keyTest123";

/// How the mock answers list queries on the viewpoints table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewpointMode {
    Normal,
    Reject(u16),
    Malformed,
}

/// One request as seen by the mock
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub table: String,
    pub id: Option<String>,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
}

struct MockState {
    topics: Vec<Value>,
    viewpoints: Vec<Value>,
    viewpoint_mode: ViewpointMode,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Running mock record store
pub struct MockStore {
    pub addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockStore {
    pub async fn start(topics: Vec<Value>, viewpoints: Vec<Value>) -> Self {
        Self::start_with_mode(topics, viewpoints, ViewpointMode::Normal).await
    }

    pub async fn start_with_mode(topics: Vec<Value>, viewpoints: Vec<Value>, viewpoint_mode: ViewpointMode) -> Self {
        let state = Arc::new(MockState {
            topics,
            viewpoints,
            viewpoint_mode,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v0/:base/:table", get(list_records))
            .route("/v0/:base/:table/:id", get(get_record))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock store");
        let addr = listener.local_addr().expect("mock store address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock store server");
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }

    pub fn requests_to(&self, table: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.table == table)
            .collect()
    }

    pub fn settings(&self, linkage: LinkageStrategy) -> StoreSettings {
        settings_for(&self.url(), linkage)
    }
}

/// Settings pointing at an arbitrary store URL
pub fn settings_for(api_url: &str, linkage: LinkageStrategy) -> StoreSettings {
    StoreSettings {
        api_url: api_url.to_string(),
        base_id: BASE_ID.to_string(),
        topics_table: TOPICS_TABLE.to_string(),
        viewpoints_table: VIEWPOINTS_TABLE.to_string(),
        api_key: API_KEY.to_string(),
        newest_view: None,
        sort: None,
        revalidation: RevalidationWindow::from_secs(60),
        linkage,
        bind_addr: "127.0.0.1:0".to_string(),
    }
}

pub fn forward() -> LinkageStrategy {
    LinkageStrategy::ForwardRefs {
        field: "Viewpoints".to_string(),
    }
}

pub fn back_reference() -> LinkageStrategy {
    LinkageStrategy::BackReference {
        field: "Topic".to_string(),
    }
}

pub fn sort_by_created() -> SortSpec {
    SortSpec {
        field: "Created".to_string(),
        direction: agora_common::config::SortDirection::Desc,
    }
}

pub fn record(id: &str, fields: Value) -> Value {
    json!({ "id": id, "createdTime": "2024-05-01T12:00:00.000Z", "fields": fields })
}

fn record_request(state: &MockState, table: &str, id: Option<&str>, query: &HashMap<String, String>, headers: &HeaderMap) {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.requests.lock().unwrap().push(RecordedRequest {
        table: table.to_string(),
        id: id.map(str::to_string),
        query: query.clone(),
        authorization,
    });
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", API_KEY))
        .unwrap_or(false)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": {"type": "AUTHENTICATION_REQUIRED"}})),
    )
        .into_response()
}

fn table_records<'a>(state: &'a MockState, table: &str) -> Option<&'a [Value]> {
    match table {
        TOPICS_TABLE => Some(&state.topics),
        VIEWPOINTS_TABLE => Some(&state.viewpoints),
        _ => None,
    }
}

async fn get_record(
    State(state): State<Arc<MockState>>,
    Path((_base, table, id)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    record_request(&state, &table, Some(&id), &HashMap::new(), &headers);

    if !authorized(&headers) {
        return unauthorized();
    }

    let found = table_records(&state, &table)
        .and_then(|records| records.iter().find(|r| r["id"] == id.as_str()));

    match found {
        Some(record) => Json(record.clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "NOT_FOUND"})),
        )
            .into_response(),
    }
}

async fn list_records(
    State(state): State<Arc<MockState>>,
    Path((_base, table)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    record_request(&state, &table, None, &query, &headers);

    if !authorized(&headers) {
        return unauthorized();
    }

    if table == VIEWPOINTS_TABLE {
        match state.viewpoint_mode {
            ViewpointMode::Reject(status) => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                return (status, "INVALID_FILTER_BY_FORMULA").into_response();
            }
            ViewpointMode::Malformed => {
                return Json(json!({"rows": []})).into_response();
            }
            ViewpointMode::Normal => {}
        }
    }

    let Some(records) = table_records(&state, &table) else {
        return (StatusCode::NOT_FOUND, "TABLE_NOT_FOUND").into_response();
    };

    let mut matched: Vec<Value> = match query.get("filterByFormula") {
        Some(formula) => records
            .iter()
            .filter(|r| formula_matches(formula, r))
            .cloned()
            .collect(),
        None => records.to_vec(),
    };

    if let Some(max) = query.get("maxRecords").and_then(|m| m.parse::<usize>().ok()) {
        matched.truncate(max);
    }

    Json(json!({ "records": matched })).into_response()
}

/// Evaluate `OR(RECORD_ID()="a",...)` or `{Field}="value"` against a record
fn formula_matches(formula: &str, record: &Value) -> bool {
    if let Some(inner) = formula.strip_prefix("OR(").and_then(|f| f.strip_suffix(')')) {
        return inner
            .split(',')
            .filter_map(|term| term.strip_prefix("RECORD_ID()=\""))
            .filter_map(|term| term.strip_suffix('"'))
            .any(|id| record["id"] == id);
    }

    if let Some((field, value)) = formula
        .strip_prefix('{')
        .and_then(|f| f.split_once("}=\""))
    {
        let value = value.strip_suffix('"').unwrap_or(value);
        return match &record["fields"][field] {
            Value::String(s) => s == value,
            Value::Array(items) => items.iter().any(|item| item == value),
            _ => false,
        };
    }

    false
}
