//! # Record Repository
//!
//! Typed CRUD over one collection of the record store. A repository is a thin
//! facade: it builds the request parameters from the entity's
//! [`RecordSchema`], makes exactly one client call, and folds the response
//! envelope into an [`Outcome`].
//!
//! ## Key Responsibilities
//!
//! - **Field Selection**: every read asks for the schema's field list
//! - **Write Coercion**: create and update payloads are rebuilt through the schema
//! - **Envelope Handling**: `success: false`, fully rejected batches and client
//!   faults all become `Outcome::Failure`
//! - **Sentinels**: the plain methods return `[]`, `None` or `false` on failure
//!   and never propagate an error; the `*_outcome` twins return the tagged value
//!
//! Every failure is logged once, with the collection and the operation.

use serde_json::Value;
use shared::{AsRecordId, RecordId};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::entities::Entity;
use super::outcome::Outcome;
use super::schema::{now_timestamp, RecordSchema, WriteMode};
use crate::storage::{
    Condition, DeleteParams, FetchParams, GetParams, RecordClient, RecordData, RecordError, WriteParams, ID_FIELD,
};

pub struct RecordRepository<E, C> {
    client: Arc<C>,
    _entity: PhantomData<fn() -> E>,
}

impl<E, C> Clone for RecordRepository<E, C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity, C: RecordClient> RecordRepository<E, C> {
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            _entity: PhantomData,
        }
    }

    pub fn schema(&self) -> &'static RecordSchema {
        E::SCHEMA
    }

    fn collection(&self) -> &'static str {
        E::SCHEMA.collection
    }

    /// Log a failed or empty outcome and hand it back unchanged
    pub(crate) fn report<T>(&self, operation: &str, outcome: Outcome<T>) -> Outcome<T> {
        match &outcome {
            Outcome::Failure(err) => error!("Failed {} on {}: {}", operation, self.collection(), err),
            Outcome::NotFound => debug!("No {} record found in {} for {}", E::SCHEMA.label, self.collection(), operation),
            Outcome::Success(_) => {}
        }
        outcome
    }

    fn decode(&self, record: RecordData) -> Result<E, RecordError> {
        serde_json::from_value(Value::Object(record)).map_err(|e| RecordError::Decode {
            collection: self.collection().to_string(),
            message: e.to_string(),
        })
    }

    /// Decode a list, skipping records that do not fit the entity type
    fn decode_all(&self, records: Vec<RecordData>) -> Vec<E> {
        records
            .into_iter()
            .filter_map(|record| match self.decode(record) {
                Ok(entity) => Some(entity),
                Err(e) => {
                    warn!("Failed to parse {} record: {}. Skipping.", E::SCHEMA.label, e);
                    None
                }
            })
            .collect()
    }

    fn draft_data(draft: &E::Draft) -> Result<RecordData, RecordError> {
        match serde_json::to_value(draft).map_err(RecordError::Encode)? {
            Value::Object(data) => Ok(data),
            other => Err(RecordError::Fault(format!("draft serialized to a non-object value: {}", other))),
        }
    }

    /// Raw records of the collection; `ordered` applies the schema's default sort
    pub(crate) async fn fetch_raw(&self, conditions: Vec<Condition>, ordered: bool) -> Result<Vec<RecordData>, RecordError> {
        let params = FetchParams {
            fields: E::SCHEMA.selection(),
            conditions,
            order_by: if ordered { E::SCHEMA.order_by() } else { Vec::new() },
        };

        let response = self.client.fetch_records(self.collection(), &params).await?;
        Ok(response.into_data()?.unwrap_or_default())
    }

    pub(crate) async fn get_raw(&self, id: RecordId) -> Result<Option<RecordData>, RecordError> {
        let params = GetParams {
            fields: E::SCHEMA.selection(),
        };

        let response = self.client.get_record_by_id(self.collection(), id, &params).await?;
        response.into_data()
    }

    /// Filtered, unsorted listing used by the entity-specific queries
    pub(crate) async fn query_outcome(&self, operation: &str, conditions: Vec<Condition>) -> Outcome<Vec<E>> {
        let result = self.fetch_raw(conditions, false).await;
        self.report(operation, result.map(|records| self.decode_all(records)).into())
    }

    pub async fn list_outcome(&self) -> Outcome<Vec<E>> {
        let result = self.fetch_raw(Vec::new(), true).await;
        let outcome = self.report("list", result.map(|records| self.decode_all(records)).into());
        if let Outcome::Success(records) = &outcome {
            debug!("Fetched {} {} records", records.len(), E::SCHEMA.label);
        }
        outcome
    }

    /// All records of the collection in the default order; empty on failure
    pub async fn list(&self) -> Vec<E> {
        self.list_outcome().await.ok().unwrap_or_default()
    }

    pub async fn get_by_id_outcome(&self, id: impl AsRecordId) -> Outcome<E> {
        let result = match id.as_record_id() {
            Ok(id) => self.get_raw(id).await,
            Err(e) => Err(e.into()),
        };

        let result = result.and_then(|record| record.map(|record| self.decode(record)).transpose());
        self.report("get", Outcome::from_optional(result))
    }

    pub async fn get_by_id(&self, id: impl AsRecordId) -> Option<E> {
        self.get_by_id_outcome(id).await.ok()
    }

    async fn create_record(&self, data: &RecordData) -> Result<E, RecordError> {
        let record = E::SCHEMA.write_fields(data, WriteMode::Create, &now_timestamp());
        let params = WriteParams { records: vec![record] };

        info!("Creating {} record in {}", E::SCHEMA.label, self.collection());
        let response = self.client.create_record(self.collection(), &params).await?;
        self.decode(response.into_first_record()?)
    }

    /// Create from loosely typed field values, e.g. form input
    pub async fn create_from_outcome(&self, data: &RecordData) -> Outcome<E> {
        let result = self.create_record(data).await;
        self.report("create", result.into())
    }

    pub async fn create_from(&self, data: &RecordData) -> Option<E> {
        self.create_from_outcome(data).await.ok()
    }

    pub async fn create_outcome(&self, draft: &E::Draft) -> Outcome<E> {
        match Self::draft_data(draft) {
            Ok(data) => self.create_from_outcome(&data).await,
            Err(e) => self.report("create", Outcome::Failure(e)),
        }
    }

    pub async fn create(&self, draft: &E::Draft) -> Option<E> {
        self.create_outcome(draft).await.ok()
    }

    async fn update_record(&self, id: RecordId, data: &RecordData) -> Result<E, RecordError> {
        let mut record = E::SCHEMA.write_fields(data, WriteMode::Update, &now_timestamp());
        record.insert(ID_FIELD.to_string(), Value::from(id.value()));
        let params = WriteParams { records: vec![record] };

        info!("Updating {} record {} in {}", E::SCHEMA.label, id, self.collection());
        let response = self.client.update_record(self.collection(), &params).await?;
        self.decode(response.into_first_record()?)
    }

    /// Replace every writable field of a record with the given values; fields
    /// missing from `data` are written as null
    pub async fn update_from_outcome(&self, id: impl AsRecordId, data: &RecordData) -> Outcome<E> {
        let result = match id.as_record_id() {
            Ok(id) => self.update_record(id, data).await,
            Err(e) => Err(e.into()),
        };
        self.report("update", result.into())
    }

    pub async fn update_from(&self, id: impl AsRecordId, data: &RecordData) -> Option<E> {
        self.update_from_outcome(id, data).await.ok()
    }

    pub async fn update_outcome(&self, id: impl AsRecordId, draft: &E::Draft) -> Outcome<E> {
        match Self::draft_data(draft) {
            Ok(data) => self.update_from_outcome(id, &data).await,
            Err(e) => self.report("update", Outcome::Failure(e)),
        }
    }

    pub async fn update(&self, id: impl AsRecordId, draft: &E::Draft) -> Option<E> {
        self.update_outcome(id, draft).await.ok()
    }

    pub async fn delete_outcome(&self, id: impl AsRecordId) -> Outcome<()> {
        let result = match id.as_record_id() {
            Ok(id) => {
                info!("Deleting {} record {} from {}", E::SCHEMA.label, id, self.collection());
                let params = DeleteParams { record_ids: vec![id] };
                match self.client.delete_record(self.collection(), &params).await {
                    Ok(response) => response.into_any_success(),
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e.into()),
        };
        self.report("delete", result.into())
    }

    /// `true` when the store confirmed the deletion
    pub async fn delete(&self, id: impl AsRecordId) -> bool {
        self.delete_outcome(id).await.is_success()
    }
}
