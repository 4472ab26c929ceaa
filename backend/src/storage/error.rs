use shared::RecordIdError;
use thiserror::Error;

/// Everything that can go wrong between a repository and the record store.
///
/// Repositories never hand these to sentinel callers; they are logged and
/// carried inside [`crate::domain::Outcome::Failure`] for callers that want them.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The store answered with `success: false`
    #[error("{0}")]
    Unsuccessful(String),

    /// The envelope reported success but no record in the batch succeeded
    #[error("no record in the batch succeeded: {0}")]
    Rejected(String),

    /// Non-2xx HTTP answer; the message comes from the response body when it has one
    #[error("record store returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("request to record store failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Any other fault raised by a client implementation
    #[error("record store fault: {0}")]
    Fault(String),

    #[error("invalid record id: {0}")]
    InvalidId(#[from] RecordIdError),

    #[error("failed to encode record: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode {collection} record: {message}")]
    Decode { collection: String, message: String },
}
