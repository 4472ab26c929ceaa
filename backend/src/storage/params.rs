//! # Request Parameters
//!
//! Parameter objects sent to the record store. Field and key names follow the
//! store's JSON contract exactly, so these types serialize straight onto the
//! wire:
//!
//! ```json
//! {
//!   "fields": [{"field": {"Name": "category_c"}}],
//!   "where": [{"FieldName": "month_c", "Operator": "EqualTo", "Values": ["2024-01"]}],
//!   "orderBy": [{"fieldName": "date_c", "sorttype": "DESC"}]
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::RecordId;

use super::RecordError;

/// A record as the store sees it: a flat map of field name to scalar value
pub type RecordData = serde_json::Map<String, Value>;

/// Name of the identifier field on every stored record
pub const ID_FIELD: &str = "Id";

/// Read the store-assigned identifier of a raw record from `collection`
pub fn record_id_of(collection: &str, record: &RecordData) -> Result<RecordId, RecordError> {
    let malformed = |message: String| RecordError::Decode {
        collection: collection.to_string(),
        message,
    };

    match record.get(ID_FIELD) {
        Some(Value::Number(n)) => n
            .as_i64()
            .map(RecordId)
            .ok_or_else(|| malformed(format!("record has a non-integer Id: {}", n))),
        Some(Value::String(s)) => Ok(s.parse::<RecordId>()?),
        _ => Err(malformed("record has no Id".to_string())),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldName {
    #[serde(rename = "Name")]
    pub name: String,
}

/// One entry of a field selection list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSelector {
    pub field: FieldName,
}

impl FieldSelector {
    pub fn new(name: &str) -> Self {
        Self {
            field: FieldName {
                name: name.to_string(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.field.name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    EqualTo,
    StartsWith,
}

/// Filter predicate. A record matches when its field matches any of `values`;
/// multiple conditions in one request are AND-ed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "FieldName")]
    pub field_name: String,
    #[serde(rename = "Operator")]
    pub operator: Operator,
    #[serde(rename = "Values")]
    pub values: Vec<Value>,
}

impl Condition {
    pub fn equal_to(field: &str, value: impl Into<Value>) -> Self {
        Self {
            field_name: field.to_string(),
            operator: Operator::EqualTo,
            values: vec![value.into()],
        }
    }

    pub fn starts_with(field: &str, prefix: &str) -> Self {
        Self {
            field_name: field.to_string(),
            operator: Operator::StartsWith,
            values: vec![Value::String(prefix.to_string())],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "ASC")]
    Ascending,
    #[serde(rename = "DESC")]
    Descending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    #[serde(rename = "fieldName")]
    pub field_name: String,
    #[serde(rename = "sorttype")]
    pub direction: SortDirection,
}

/// Parameters for listing a collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchParams {
    pub fields: Vec<FieldSelector>,
    #[serde(rename = "where", default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(rename = "orderBy", default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<OrderBy>,
}

/// Parameters for reading a single record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetParams {
    pub fields: Vec<FieldSelector>,
}

/// Parameters for create and update batches; update records carry their `Id`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteParams {
    pub records: Vec<RecordData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteParams {
    #[serde(rename = "RecordIds")]
    pub record_ids: Vec<RecordId>,
}
