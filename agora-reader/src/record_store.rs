//! Record store API client
//!
//! Authenticated read access to a schema-flexible record store:
//! - `GET /v0/{base}/{table}/{id}` for a single record
//! - `GET /v0/{base}/{table}?filterByFormula=...` for filtered lists
//!
//! One outbound call per invocation, no retries.

use agora_common::config::{SortSpec, StoreSettings};
use reqwest::Url;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

use crate::formula::Formula;

const USER_AGENT: &str = concat!("agora-reader/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Record store client errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport-level failure (connect, timeout, body read)
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    /// Store answered with a non-success status
    #[error("Record store rejected request {status}: {body}")]
    RemoteRejected { status: u16, body: String },

    /// Response body is not `{id, fields}` / `{records: [...]}`
    #[error("Malformed record store response: {0}")]
    MalformedResponse(String),
}

/// Untyped `{id, fields}` payload as returned by the store
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawRecord {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl RawRecord {
    /// Raw field value, if present
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

#[derive(Debug, Deserialize)]
struct RecordList {
    records: Vec<RawRecord>,
    #[serde(default)]
    offset: Option<String>,
}

/// Parameters of a list query
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Server-side predicate; `None` lists all records
    pub formula: Option<Formula>,
    pub page_size: Option<usize>,
    pub max_records: Option<usize>,
    pub sort: Option<SortSpec>,
    /// Named view the store applies before filtering
    pub view: Option<String>,
}

impl ListQuery {
    pub fn filtered(formula: Formula, page_size: usize) -> Self {
        Self {
            formula: Some(formula),
            page_size: Some(page_size),
            ..Default::default()
        }
    }

    /// Query string pairs in the order the store documents them
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(formula) = &self.formula {
            pairs.push(("filterByFormula", formula.as_str().to_string()));
        }
        if let Some(page_size) = self.page_size {
            pairs.push(("pageSize", page_size.to_string()));
        }
        if let Some(max_records) = self.max_records {
            pairs.push(("maxRecords", max_records.to_string()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort[0][field]", sort.field.clone()));
            pairs.push(("sort[0][direction]", sort.direction.as_str().to_string()));
        }
        if let Some(view) = &self.view {
            pairs.push(("view", view.clone()));
        }
        pairs
    }
}

/// Record store API client
#[derive(Clone)]
pub struct RecordStoreClient {
    http_client: reqwest::Client,
    api_url: Url,
    base_id: String,
    api_key: String,
}

impl RecordStoreClient {
    pub fn new(settings: &StoreSettings) -> Result<Self, StoreError> {
        let api_url = Url::parse(&settings.api_url)
            .map_err(|e| StoreError::Unavailable(format!("Invalid store URL '{}': {}", settings.api_url, e)))?;
        if api_url.cannot_be_a_base() {
            return Err(StoreError::Unavailable(format!(
                "Invalid store URL '{}': not a base URL",
                settings.api_url
            )));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self {
            http_client,
            api_url,
            base_id: settings.base_id.clone(),
            api_key: settings.api_key.clone(),
        })
    }

    /// `{api_url}/v0/{base}/{table}` followed by `extra`, each a single
    /// percent-encoded path segment
    fn record_url(&self, table: &str, extra: Option<&str>) -> Result<Url, StoreError> {
        let mut url = self.api_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StoreError::Unavailable(format!("Invalid store URL '{}'", self.api_url)))?;
            segments.pop_if_empty().extend(["v0", self.base_id.as_str(), table]);
            if let Some(segment) = extra {
                segments.push(segment);
            }
        }
        Ok(url)
    }

    /// Fetch one record by id
    ///
    /// Returns `Ok(None)` when the store reports the record does not exist.
    /// Ids that cannot name a record (empty, `.`, `..`) are not sent.
    pub async fn fetch_one(&self, table: &str, id: &str) -> Result<Option<RawRecord>, StoreError> {
        if matches!(id, "" | "." | "..") {
            tracing::info!(table = %table, id = %id, "Record id cannot name a record");
            return Ok(None);
        }

        let url = self.record_url(table, Some(id))?;

        tracing::debug!(table = %table, id = %id, url = %url, "Fetching record");

        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            tracing::info!(table = %table, id = %id, "Record not found");
            return Ok(None);
        }

        let body = read_body(response, status).await?;

        let record: RawRecord = serde_json::from_str(&body)
            .map_err(|e| StoreError::MalformedResponse(e.to_string()))?;
        ensure_id(&record)?;

        tracing::debug!(table = %table, id = %record.id, fields = record.fields.len(), "Retrieved record");

        Ok(Some(record))
    }

    /// Fetch the records matching `query`, in store response order
    pub async fn fetch_many(&self, table: &str, query: &ListQuery) -> Result<Vec<RawRecord>, StoreError> {
        let url = self.record_url(table, None)?;
        let params = query.to_query_pairs();

        tracing::debug!(
            table = %table,
            formula = query.formula.as_ref().map(|f| f.as_str()).unwrap_or(""),
            page_size = ?query.page_size,
            view = ?query.view,
            "Listing records"
        );

        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.api_key)
            .query(&params)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let status = response.status();
        let body = read_body(response, status).await?;

        let list: RecordList = serde_json::from_str(&body)
            .map_err(|e| StoreError::MalformedResponse(e.to_string()))?;
        list.records.iter().try_for_each(ensure_id)?;

        if list.offset.is_some() {
            tracing::debug!(table = %table, "More records available beyond this page; not followed");
        }

        tracing::info!(table = %table, records = list.records.len(), "Listed records");

        Ok(list.records)
    }
}

fn ensure_id(record: &RawRecord) -> Result<(), StoreError> {
    if record.id.is_empty() {
        return Err(StoreError::MalformedResponse(
            "record has an empty id".to_string(),
        ));
    }
    Ok(())
}

async fn read_body(response: reqwest::Response, status: reqwest::StatusCode) -> Result<String, StoreError> {
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), body = %body, "Record store rejected request");
        return Err(StoreError::RemoteRejected {
            status: status.as_u16(),
            body,
        });
    }

    response
        .text()
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))
}
