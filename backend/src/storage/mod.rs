//! # Storage Module
//!
//! Everything that talks to a record store lives here: the [`RecordClient`]
//! abstraction, the wire parameter and envelope types it exchanges, and the
//! two client implementations.
//!
//! ## Clients
//!
//! - **HttpRecordClient**: the hosted record store, over HTTPS with JSON bodies
//! - **MemoryRecordClient**: process-local tables with failure injection, used
//!   by tests and for running without network access
//!
//! ## Design Principles
//!
//! - **Repository Pattern**: domain code only sees `RecordClient`
//! - **Dependency Injection**: a client is built once and shared by all repositories
//! - **Wire Fidelity**: parameter types serialize to the store's exact JSON names

pub mod envelope;
pub mod error;
pub mod http;
pub mod memory;
pub mod params;
pub mod traits;

pub use envelope::{BatchResponse, Envelope, FetchResponse, GetResponse, RecordResult};
pub use error::RecordError;
pub use http::HttpRecordClient;
pub use memory::{InjectedFailure, MemoryRecordClient, RecordedRequest};
pub use params::{
    record_id_of, Condition, DeleteParams, FetchParams, FieldSelector, GetParams, Operator, OrderBy,
    RecordData, SortDirection, WriteParams, ID_FIELD,
};
pub use traits::RecordClient;
