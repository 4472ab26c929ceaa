//! # In-Memory Record Client
//!
//! A [`RecordClient`] backed by process memory. It follows the hosted store's
//! observable contract closely enough to exercise repositories end to end:
//!
//! - identifiers are assigned per collection, starting at 1
//! - fetches project the selected fields (plus `Id`), apply AND-ed filters
//!   and a single sort directive
//! - updates merge the sent fields onto the stored record
//! - deletes and updates report one result per record
//!
//! Failures can be injected to simulate an unhealthy store, and requests are
//! recorded so tests can inspect exactly what went over the "wire". Only the
//! most recent [`REQUEST_LOG_LIMIT`] requests are kept.

use async_trait::async_trait;
use serde_json::Value;
use shared::RecordId;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use super::{
    BatchResponse, Condition, DeleteParams, Envelope, FetchParams, FetchResponse, FieldSelector, GetParams,
    GetResponse, Operator, OrderBy, RecordClient, RecordData, RecordError, RecordResult, SortDirection,
    WriteParams, ID_FIELD,
};

/// Number of requests the client remembers; older ones are dropped first
pub const REQUEST_LOG_LIMIT: usize = 1024;

/// Failure mode applied to every request until cleared
#[derive(Debug, Clone, PartialEq)]
pub enum InjectedFailure {
    /// Answer with `success: false` and this message
    Unsuccessful(String),
    /// Writes succeed overall but every record in the batch fails; reads behave
    /// like `Unsuccessful`
    Rejected(String),
    /// Fail the request itself
    Fault(String),
}

/// A request as received by the in-memory store
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedRequest {
    Fetch { collection: String, params: FetchParams },
    Get { collection: String, id: RecordId, params: GetParams },
    Create { collection: String, params: WriteParams },
    Update { collection: String, params: WriteParams },
    Delete { collection: String, params: DeleteParams },
}

#[derive(Default)]
struct Table {
    last_id: i64,
    rows: BTreeMap<i64, RecordData>,
}

impl Table {
    fn insert(&mut self, mut record: RecordData) -> RecordData {
        self.last_id += 1;
        record.insert(ID_FIELD.to_string(), Value::from(self.last_id));
        self.rows.insert(self.last_id, record.clone());
        record
    }
}

#[derive(Default)]
struct MemoryState {
    tables: HashMap<String, Table>,
    failure: Option<InjectedFailure>,
    requests: VecDeque<RecordedRequest>,
}

impl MemoryState {
    fn record(&mut self, request: RecordedRequest) {
        if self.requests.len() == REQUEST_LOG_LIMIT {
            self.requests.pop_front();
        }
        self.requests.push_back(request);
    }
}

/// In-memory record store; clones share the same tables
#[derive(Clone, Default)]
pub struct MemoryRecordClient {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryRecordClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following request fail in the given way
    pub async fn inject_failure(&self, failure: InjectedFailure) {
        self.state.lock().await.failure = Some(failure);
    }

    pub async fn clear_failure(&self) {
        self.state.lock().await.failure = None;
    }

    /// Store a record directly, bypassing request handling; returns its id
    pub async fn seed(&self, collection: &str, record: RecordData) -> RecordId {
        let mut state = self.state.lock().await;
        let stored = state.tables.entry(collection.to_string()).or_default().insert(record);
        RecordId(stored[ID_FIELD].as_i64().unwrap_or_default())
    }

    /// Every stored record of a collection in id order, with all fields
    pub async fn records(&self, collection: &str) -> Vec<RecordData> {
        let state = self.state.lock().await;
        state
            .tables
            .get(collection)
            .map(|table| table.rows.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Retained requests, oldest first
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().await.requests.iter().cloned().collect()
    }
}

fn fault(failure: &InjectedFailure) -> Option<RecordError> {
    match failure {
        InjectedFailure::Fault(message) => Some(RecordError::Fault(message.clone())),
        _ => None,
    }
}

fn failure_message(failure: &InjectedFailure) -> String {
    match failure {
        InjectedFailure::Unsuccessful(message)
        | InjectedFailure::Rejected(message)
        | InjectedFailure::Fault(message) => message.clone(),
    }
}

/// Read-side failure: faults raise, everything else is an unsuccessful envelope
fn read_failure<T>(failure: &Option<InjectedFailure>) -> Option<Result<Envelope<T>, RecordError>> {
    let failure = failure.as_ref()?;
    Some(match fault(failure) {
        Some(err) => Err(err),
        None => Ok(Envelope::failed(failure_message(failure))),
    })
}

/// Write-side failure: `Rejected` fails each of `count` records individually
fn write_failure(failure: &Option<InjectedFailure>, count: usize) -> Option<Result<BatchResponse, RecordError>> {
    let failure = failure.as_ref()?;
    Some(match failure {
        InjectedFailure::Fault(message) => Err(RecordError::Fault(message.clone())),
        InjectedFailure::Unsuccessful(message) => Ok(BatchResponse::failed(message.clone())),
        InjectedFailure::Rejected(message) => Ok(BatchResponse::ok(
            (0..count).map(|_| RecordResult::rejected(message.clone())).collect(),
        )),
    })
}

/// Text form of a scalar, used when a filter compares across types
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", f as i64)),
            _ => Some(n.to_string()),
        },
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn values_equal(stored: &Value, wanted: &Value) -> bool {
    match (stored, wanted) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        _ => scalar_text(stored) == scalar_text(wanted),
    }
}

fn matches(record: &RecordData, condition: &Condition) -> bool {
    let stored = record.get(&condition.field_name).unwrap_or(&Value::Null);
    condition.values.iter().any(|wanted| match condition.operator {
        Operator::EqualTo => values_equal(stored, wanted),
        Operator::StartsWith => match (scalar_text(stored), scalar_text(wanted)) {
            (Some(text), Some(prefix)) => text.starts_with(&prefix),
            _ => false,
        },
    })
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        _ => scalar_text(a).cmp(&scalar_text(b)),
    }
}

fn sort_records(records: &mut [RecordData], order_by: &[OrderBy]) {
    records.sort_by(|a, b| {
        order_by
            .iter()
            .map(|order| {
                let left = a.get(&order.field_name).unwrap_or(&Value::Null);
                let right = b.get(&order.field_name).unwrap_or(&Value::Null);
                match order.direction {
                    SortDirection::Ascending => compare_values(left, right),
                    SortDirection::Descending => compare_values(right, left),
                }
            })
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}

/// Keep `Id` and the selected fields; an empty selection keeps everything
fn project(record: &RecordData, fields: &[FieldSelector]) -> RecordData {
    if fields.is_empty() {
        return record.clone();
    }

    let mut projected = RecordData::new();
    if let Some(id) = record.get(ID_FIELD) {
        projected.insert(ID_FIELD.to_string(), id.clone());
    }
    for selector in fields {
        let value = record.get(selector.name()).cloned().unwrap_or(Value::Null);
        projected.insert(selector.name().to_string(), value);
    }
    projected
}

#[async_trait]
impl RecordClient for MemoryRecordClient {
    async fn fetch_records(&self, collection: &str, params: &FetchParams) -> Result<FetchResponse, RecordError> {
        let mut state = self.state.lock().await;
        state.record(RecordedRequest::Fetch {
            collection: collection.to_string(),
            params: params.clone(),
        });
        if let Some(response) = read_failure(&state.failure) {
            return response;
        }

        let mut records: Vec<RecordData> = state
            .tables
            .get(collection)
            .map(|table| {
                table
                    .rows
                    .values()
                    .filter(|record| params.conditions.iter().all(|condition| matches(record, condition)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        sort_records(&mut records, &params.order_by);
        let records: Vec<RecordData> = records.iter().map(|record| project(record, &params.fields)).collect();

        debug!("Fetched {} records from in-memory {}", records.len(), collection);
        Ok(Envelope::ok(Some(records)))
    }

    async fn get_record_by_id(&self, collection: &str, id: RecordId, params: &GetParams) -> Result<GetResponse, RecordError> {
        let mut state = self.state.lock().await;
        state.record(RecordedRequest::Get {
            collection: collection.to_string(),
            id,
            params: params.clone(),
        });
        if let Some(response) = read_failure(&state.failure) {
            return response;
        }

        let record = state
            .tables
            .get(collection)
            .and_then(|table| table.rows.get(&id.value()))
            .map(|record| project(record, &params.fields));

        Ok(Envelope::ok(record))
    }

    async fn create_record(&self, collection: &str, params: &WriteParams) -> Result<BatchResponse, RecordError> {
        let mut state = self.state.lock().await;
        state.record(RecordedRequest::Create {
            collection: collection.to_string(),
            params: params.clone(),
        });
        if let Some(response) = write_failure(&state.failure, params.records.len()) {
            return response;
        }

        let table = state.tables.entry(collection.to_string()).or_default();
        let results = params
            .records
            .iter()
            .map(|record| RecordResult::accepted(Some(table.insert(record.clone()))))
            .collect();

        Ok(BatchResponse::ok(results))
    }

    async fn update_record(&self, collection: &str, params: &WriteParams) -> Result<BatchResponse, RecordError> {
        let mut state = self.state.lock().await;
        state.record(RecordedRequest::Update {
            collection: collection.to_string(),
            params: params.clone(),
        });
        if let Some(response) = write_failure(&state.failure, params.records.len()) {
            return response;
        }

        let table = state.tables.entry(collection.to_string()).or_default();
        let results = params
            .records
            .iter()
            .map(|record| {
                let id = match record.get(ID_FIELD).and_then(Value::as_i64) {
                    Some(id) => id,
                    None => return RecordResult::rejected("Id is required for update"),
                };
                match table.rows.get_mut(&id) {
                    Some(stored) => {
                        for (field, value) in record {
                            if field != ID_FIELD {
                                stored.insert(field.clone(), value.clone());
                            }
                        }
                        RecordResult::accepted(Some(stored.clone()))
                    }
                    None => RecordResult::rejected(format!("Record {} not found", id)),
                }
            })
            .collect();

        Ok(BatchResponse::ok(results))
    }

    async fn delete_record(&self, collection: &str, params: &DeleteParams) -> Result<BatchResponse, RecordError> {
        let mut state = self.state.lock().await;
        state.record(RecordedRequest::Delete {
            collection: collection.to_string(),
            params: params.clone(),
        });
        if let Some(response) = write_failure(&state.failure, params.record_ids.len()) {
            return response;
        }

        let table = state.tables.entry(collection.to_string()).or_default();
        let results = params
            .record_ids
            .iter()
            .map(|id| match table.rows.remove(&id.value()) {
                Some(_) => RecordResult::accepted(None),
                None => RecordResult::rejected(format!("Record {} not found", id)),
            })
            .collect();

        Ok(BatchResponse::ok(results))
    }
}
