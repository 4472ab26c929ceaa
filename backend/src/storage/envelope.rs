//! # Response Envelopes
//!
//! Every record store call answers with an envelope: a `success` flag, an
//! optional `message`, and either a payload (`data`) or per-record outcomes
//! (`results`). The helpers here fold an envelope into a `Result` so that the
//! repository layer has a single place where "did this work" is decided.

use serde::{Deserialize, Serialize};

use super::{RecordData, RecordError};

const UNSUCCESSFUL: &str = "record store reported an unsuccessful request";

/// Envelope for reads (`fetch` and `get by id`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default = "none")]
    pub data: Option<T>,
}

fn none<T>() -> Option<T> {
    None
}

pub type FetchResponse = Envelope<Vec<RecordData>>;
pub type GetResponse = Envelope<RecordData>;

impl<T> Envelope<T> {
    pub fn ok(data: Option<T>) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }

    /// Unwrap the payload, turning `success: false` into an error
    pub fn into_data(self) -> Result<Option<T>, RecordError> {
        if !self.success {
            return Err(RecordError::Unsuccessful(
                self.message.unwrap_or_else(|| UNSUCCESSFUL.to_string()),
            ));
        }
        Ok(self.data)
    }
}

/// Outcome of one record inside a create/update/delete batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<RecordData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RecordResult {
    pub fn accepted(data: Option<RecordData>) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Envelope for writes (`create`, `update`, `delete`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub results: Vec<RecordResult>,
}

impl BatchResponse {
    pub fn ok(results: Vec<RecordResult>) -> Self {
        Self {
            success: true,
            message: None,
            results,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            results: Vec::new(),
        }
    }

    fn check(&self) -> Result<(), RecordError> {
        if self.success {
            Ok(())
        } else {
            Err(RecordError::Unsuccessful(
                self.message.clone().unwrap_or_else(|| UNSUCCESSFUL.to_string()),
            ))
        }
    }

    fn rejection(&self) -> RecordError {
        let messages: Vec<&str> = self
            .results
            .iter()
            .filter_map(|result| result.message.as_deref())
            .collect();

        if messages.is_empty() {
            RecordError::Rejected(format!("{} result(s), none successful", self.results.len()))
        } else {
            RecordError::Rejected(messages.join("; "))
        }
    }

    /// The record returned by the first successful result
    pub fn into_first_record(self) -> Result<RecordData, RecordError> {
        self.check()?;

        if !self.results.iter().any(|result| result.success) {
            return Err(self.rejection());
        }

        self.results
            .into_iter()
            .find(|result| result.success)
            .and_then(|result| result.data)
            .ok_or_else(|| {
                RecordError::Rejected("accepted record came back without data".to_string())
            })
    }

    /// Succeeds when at least one result in the batch succeeded
    pub fn into_any_success(self) -> Result<(), RecordError> {
        self.check()?;

        if self.results.iter().any(|result| result.success) {
            Ok(())
        } else {
            Err(self.rejection())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> RecordData {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_unsuccessful_envelope_keeps_message() {
        let envelope: FetchResponse =
            serde_json::from_value(json!({"success": false, "message": "Invalid field month_c"}))
                .unwrap();

        match envelope.into_data() {
            Err(RecordError::Unsuccessful(message)) => assert_eq!(message, "Invalid field month_c"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_missing_data_is_none() {
        let envelope: GetResponse = serde_json::from_value(json!({"success": true})).unwrap();
        assert_eq!(envelope.into_data().unwrap(), None);

        let envelope: GetResponse =
            serde_json::from_value(json!({"success": true, "data": null})).unwrap();
        assert_eq!(envelope.into_data().unwrap(), None);
    }

    #[test]
    fn test_first_successful_record_wins() {
        let response = BatchResponse::ok(vec![
            RecordResult::rejected("duplicate"),
            RecordResult::accepted(Some(record(json!({"Id": 2})))),
            RecordResult::accepted(Some(record(json!({"Id": 3})))),
        ]);

        assert_eq!(response.into_first_record().unwrap(), record(json!({"Id": 2})));
    }

    #[test]
    fn test_batch_without_success_is_rejected() {
        let response = BatchResponse::ok(vec![RecordResult::rejected("Field amount_c is required")]);

        match response.into_first_record() {
            Err(RecordError::Rejected(message)) => assert_eq!(message, "Field amount_c is required"),
            other => panic!("unexpected result: {:?}", other),
        }

        assert!(BatchResponse::ok(Vec::new()).into_any_success().is_err());
    }

    #[test]
    fn test_failed_batch_reports_envelope_message() {
        let response = BatchResponse::failed("Access denied");
        match response.into_any_success() {
            Err(RecordError::Unsuccessful(message)) => assert_eq!(message, "Access denied"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
