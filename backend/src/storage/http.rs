//! # HTTP Record Client
//!
//! [`RecordClient`] for the hosted record store. Each trait method is a single
//! JSON `POST`:
//!
//! ```text
//! POST {api_url}/projects/{project_id}/tables/{collection}/fetch
//! POST {api_url}/projects/{project_id}/tables/{collection}/records/{id}
//! POST {api_url}/projects/{project_id}/tables/{collection}/create
//! POST {api_url}/projects/{project_id}/tables/{collection}/update
//! POST {api_url}/projects/{project_id}/tables/{collection}/delete
//! ```
//!
//! Requests carry the public key as a bearer token plus an `X-Project-Id`
//! header. A 2xx body is decoded as the response envelope; any other status
//! becomes [`RecordError::Status`] with the message the store put in the body.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shared::RecordId;
use std::time::Duration;
use tracing::{debug, warn};

use super::{
    BatchResponse, DeleteParams, FetchParams, FetchResponse, GetParams, GetResponse, RecordClient, RecordError,
    WriteParams,
};
use crate::config::ClientConfig;

const PROJECT_HEADER: &str = "X-Project-Id";

#[derive(Clone)]
pub struct HttpRecordClient {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    public_key: String,
}

impl HttpRecordClient {
    pub fn new(config: &ClientConfig) -> Result<Self, RecordError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            public_key: config.public_key.clone(),
        })
    }

    fn table_url(&self, collection: &str, action: &str) -> String {
        format!(
            "{}/projects/{}/tables/{}/{}",
            self.base_url, self.project_id, collection, action
        )
    }

    async fn post<P, R>(&self, collection: &str, url: String, body: &P) -> Result<R, RecordError>
    where
        P: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        debug!("POST {}", url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.public_key)
            .header(PROJECT_HEADER, &self.project_id)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = status_message(status, &bytes);
            warn!("Record store answered {} for {}: {}", status.as_u16(), collection, message);
            return Err(RecordError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| RecordError::Decode {
            collection: collection.to_string(),
            message: e.to_string(),
        })
    }
}

/// Error text for a non-2xx answer: the body's `message` or `data.message`,
/// else the status reason
fn status_message(status: StatusCode, body: &[u8]) -> String {
    let from_body = serde_json::from_slice::<Value>(body).ok().and_then(|value| {
        value
            .get("message")
            .or_else(|| value.pointer("/data/message"))
            .and_then(Value::as_str)
            .map(str::to_string)
    });

    from_body.unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown status").to_string())
}

#[async_trait]
impl RecordClient for HttpRecordClient {
    async fn fetch_records(&self, collection: &str, params: &FetchParams) -> Result<FetchResponse, RecordError> {
        self.post(collection, self.table_url(collection, "fetch"), params).await
    }

    async fn get_record_by_id(&self, collection: &str, id: RecordId, params: &GetParams) -> Result<GetResponse, RecordError> {
        let url = self.table_url(collection, &format!("records/{}", id));
        self.post(collection, url, params).await
    }

    async fn create_record(&self, collection: &str, params: &WriteParams) -> Result<BatchResponse, RecordError> {
        self.post(collection, self.table_url(collection, "create"), params).await
    }

    async fn update_record(&self, collection: &str, params: &WriteParams) -> Result<BatchResponse, RecordError> {
        self.post(collection, self.table_url(collection, "update"), params).await
    }

    async fn delete_record(&self, collection: &str, params: &DeleteParams) -> Result<BatchResponse, RecordError> {
        self.post(collection, self.table_url(collection, "delete"), params).await
    }
}
