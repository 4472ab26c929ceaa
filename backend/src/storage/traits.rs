//! # Storage Traits
//!
//! The record store is consumed through [`RecordClient`], a generic CRUD
//! interface over named collections. Repositories are written against this
//! trait only, so the hosted store, the in-memory store used by tests, or any
//! other backend can be injected at construction time.

use async_trait::async_trait;
use shared::RecordId;

use super::{BatchResponse, DeleteParams, FetchParams, FetchResponse, GetParams, GetResponse, RecordError, WriteParams};

/// Generic record store client
///
/// Every method performs exactly one request. `Err` means the request itself
/// faulted (transport, HTTP status, unexpected payload); an answer with
/// `success: false` comes back as `Ok` with the flag cleared so that callers
/// see the store's own message.
#[async_trait]
pub trait RecordClient: Send + Sync {
    /// List records of a collection, optionally filtered and sorted
    async fn fetch_records(&self, collection: &str, params: &FetchParams) -> Result<FetchResponse, RecordError>;

    /// Read one record; a missing record is `success: true` with no data
    async fn get_record_by_id(&self, collection: &str, id: RecordId, params: &GetParams) -> Result<GetResponse, RecordError>;

    /// Create every record of the batch; the store assigns identifiers
    async fn create_record(&self, collection: &str, params: &WriteParams) -> Result<BatchResponse, RecordError>;

    /// Replace the fields of existing records, matched by their `Id` field
    async fn update_record(&self, collection: &str, params: &WriteParams) -> Result<BatchResponse, RecordError>;

    /// Delete records by identifier
    async fn delete_record(&self, collection: &str, params: &DeleteParams) -> Result<BatchResponse, RecordError>;
}
