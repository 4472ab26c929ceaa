use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Identifier assigned by the remote record store when a record is created.
///
/// The backend never generates these; it only coerces externally supplied
/// values (numbers, form strings) into one before they go on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl RecordId {
    pub fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId(value)
    }
}

/// Parse the leading integer of a string, the way loosely typed form input is
/// read: surrounding whitespace is ignored, an optional sign is accepted, and
/// parsing stops at the first non-digit ("12abc" -> 12, "7.9" -> 7).
impl FromStr for RecordId {
    type Err = RecordIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (negative, rest) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let digits_len = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
        if digits_len == 0 {
            return Err(RecordIdError::NotANumber(s.to_string()));
        }

        let magnitude = rest[..digits_len]
            .parse::<i64>()
            .map_err(|_| RecordIdError::OutOfRange(s.to_string()))?;

        Ok(RecordId(if negative { -magnitude } else { magnitude }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordIdError {
    NotANumber(String),
    OutOfRange(String),
}

impl fmt::Display for RecordIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordIdError::NotANumber(raw) => write!(f, "Record ID '{}' is not a number", raw),
            RecordIdError::OutOfRange(raw) => write!(f, "Record ID '{}' is out of range", raw),
        }
    }
}

impl std::error::Error for RecordIdError {}

/// Anything a caller may hand in as a record identifier.
pub trait AsRecordId {
    fn as_record_id(&self) -> Result<RecordId, RecordIdError>;
}

impl AsRecordId for RecordId {
    fn as_record_id(&self) -> Result<RecordId, RecordIdError> {
        Ok(*self)
    }
}

impl AsRecordId for i64 {
    fn as_record_id(&self) -> Result<RecordId, RecordIdError> {
        Ok(RecordId(*self))
    }
}

impl AsRecordId for i32 {
    fn as_record_id(&self) -> Result<RecordId, RecordIdError> {
        Ok(RecordId(i64::from(*self)))
    }
}

impl AsRecordId for u32 {
    fn as_record_id(&self) -> Result<RecordId, RecordIdError> {
        Ok(RecordId(i64::from(*self)))
    }
}

impl AsRecordId for u64 {
    fn as_record_id(&self) -> Result<RecordId, RecordIdError> {
        i64::try_from(*self)
            .map(RecordId)
            .map_err(|_| RecordIdError::OutOfRange(self.to_string()))
    }
}

impl AsRecordId for f64 {
    fn as_record_id(&self) -> Result<RecordId, RecordIdError> {
        if !self.is_finite() {
            return Err(RecordIdError::NotANumber(self.to_string()));
        }
        let truncated = self.trunc();
        if truncated < i64::MIN as f64 || truncated > i64::MAX as f64 {
            return Err(RecordIdError::OutOfRange(self.to_string()));
        }
        Ok(RecordId(truncated as i64))
    }
}

impl AsRecordId for str {
    fn as_record_id(&self) -> Result<RecordId, RecordIdError> {
        self.parse()
    }
}

impl AsRecordId for String {
    fn as_record_id(&self) -> Result<RecordId, RecordIdError> {
        self.as_str().parse()
    }
}

impl<T: AsRecordId + ?Sized> AsRecordId for &T {
    fn as_record_id(&self) -> Result<RecordId, RecordIdError> {
        (**self).as_record_id()
    }
}

/// Direction of money for categories and transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Money coming in
    Income,
    /// Money going out
    Expense,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Income => "income",
            EntryKind::Expense => "expense",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = EntryKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(EntryKind::Income),
            "expense" => Ok(EntryKind::Expense),
            _ => Err(EntryKindError::Unknown(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryKindError {
    Unknown(String),
}

impl fmt::Display for EntryKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKindError::Unknown(raw) => {
                write!(f, "Unknown entry type '{}', expected income or expense", raw)
            }
        }
    }
}

impl std::error::Error for EntryKindError {}

/// Decode a field that the record store may send as `null`, using the
/// type's default instead.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode a text field, keeping the text form of numbers and booleans.
/// Anything else, including `null`, reads as an empty string.
pub fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

/// Decode a flag that form input may have stored as `"true"`, `1` or similar
pub fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s == "1"
        }
        Some(Value::Number(n)) => n.as_f64().map_or(false, |f| f != 0.0),
        _ => false,
    })
}

/// Decode an entry type case-insensitively; unknown or empty values read as `None`
pub fn lenient_kind<'de, D>(deserializer: D) -> Result<Option<EntryKind>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    })
}

/// Monthly spending limit for one category (collection `budget_c`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    #[serde(rename = "Id")]
    pub id: RecordId,
    /// Display name, usually the category
    #[serde(rename = "Name", default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(rename = "category_c", default, deserialize_with = "lenient_text")]
    pub category: String,
    #[serde(rename = "monthly_limit_c", default, deserialize_with = "null_as_default")]
    pub monthly_limit: f64,
    /// Month token, e.g. "2024-01"
    #[serde(rename = "month_c", default, deserialize_with = "lenient_text")]
    pub month: String,
    #[serde(rename = "year_c", default, deserialize_with = "null_as_default")]
    pub year: i32,
}

/// Writable fields of a budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetDraft {
    /// Falls back to the category when absent
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "category_c")]
    pub category: String,
    #[serde(rename = "monthly_limit_c")]
    pub monthly_limit: f64,
    #[serde(rename = "month_c")]
    pub month: String,
    #[serde(rename = "year_c")]
    pub year: i32,
}

impl From<&Budget> for BudgetDraft {
    fn from(budget: &Budget) -> Self {
        BudgetDraft {
            name: Some(budget.name.clone()),
            category: budget.category.clone(),
            monthly_limit: budget.monthly_limit,
            month: budget.month.clone(),
            year: budget.year,
        }
    }
}

/// Income or expense category (collection `category_c`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "Id")]
    pub id: RecordId,
    #[serde(rename = "Name", default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(rename = "name_c", default, deserialize_with = "lenient_text")]
    pub display_name: String,
    #[serde(rename = "type_c", default, deserialize_with = "lenient_kind")]
    pub kind: Option<EntryKind>,
    /// Hex color, e.g. "#4CAF50"
    #[serde(rename = "color_c", default, deserialize_with = "lenient_text")]
    pub color: String,
    #[serde(rename = "is_custom_c", default, deserialize_with = "lenient_bool")]
    pub is_custom: bool,
}

/// Writable fields of a category.
///
/// `is_custom` only applies to updates: every category created through the
/// backend is stored as custom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDraft {
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "name_c")]
    pub display_name: String,
    #[serde(rename = "type_c")]
    pub kind: EntryKind,
    #[serde(rename = "color_c")]
    pub color: String,
    #[serde(rename = "is_custom_c")]
    pub is_custom: bool,
}

impl From<&Category> for CategoryDraft {
    fn from(category: &Category) -> Self {
        CategoryDraft {
            name: Some(category.name.clone()),
            display_name: category.display_name.clone(),
            kind: category.kind.unwrap_or(EntryKind::Expense),
            color: category.color.clone(),
            is_custom: category.is_custom,
        }
    }
}

/// Savings target and progress toward it (collection `savings_goal_c`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsGoal {
    #[serde(rename = "Id")]
    pub id: RecordId,
    #[serde(rename = "Name", default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(rename = "title_c", default, deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(rename = "target_amount_c", default, deserialize_with = "null_as_default")]
    pub target_amount: f64,
    #[serde(rename = "current_amount_c", default, deserialize_with = "null_as_default")]
    pub current_amount: f64,
    /// Date string, e.g. "2024-12-31"
    #[serde(rename = "deadline_c", default, deserialize_with = "lenient_text")]
    pub deadline: String,
    /// RFC 3339 timestamp stamped by the backend at creation
    #[serde(rename = "created_at_c", default, deserialize_with = "lenient_text")]
    pub created_at: String,
}

/// Writable fields of a savings goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsGoalDraft {
    #[serde(rename = "title_c")]
    pub title: String,
    #[serde(rename = "target_amount_c")]
    pub target_amount: f64,
    /// Defaults to 0 on creation
    #[serde(rename = "current_amount_c", default, skip_serializing_if = "Option::is_none")]
    pub current_amount: Option<f64>,
    #[serde(rename = "deadline_c")]
    pub deadline: String,
}

impl From<&SavingsGoal> for SavingsGoalDraft {
    fn from(goal: &SavingsGoal) -> Self {
        SavingsGoalDraft {
            title: goal.title.clone(),
            target_amount: goal.target_amount,
            current_amount: Some(goal.current_amount),
            deadline: goal.deadline.clone(),
        }
    }
}

/// Single income or expense entry (collection `transaction_c`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "Id")]
    pub id: RecordId,
    #[serde(rename = "Name", default, deserialize_with = "lenient_text")]
    pub name: String,
    /// Signed amount as entered
    #[serde(rename = "amount_c", default, deserialize_with = "null_as_default")]
    pub amount: f64,
    #[serde(rename = "category_c", default, deserialize_with = "lenient_text")]
    pub category: String,
    #[serde(rename = "type_c", default, deserialize_with = "lenient_kind")]
    pub kind: Option<EntryKind>,
    #[serde(rename = "description_c", default, deserialize_with = "lenient_text")]
    pub description: String,
    /// Date string, e.g. "2024-01-15"
    #[serde(rename = "date_c", default, deserialize_with = "lenient_text")]
    pub date: String,
    #[serde(rename = "created_at_c", default, deserialize_with = "lenient_text")]
    pub created_at: String,
}

/// Writable fields of a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraft {
    #[serde(rename = "amount_c")]
    pub amount: f64,
    #[serde(rename = "category_c")]
    pub category: String,
    #[serde(rename = "type_c")]
    pub kind: EntryKind,
    #[serde(rename = "description_c")]
    pub description: String,
    #[serde(rename = "date_c")]
    pub date: String,
}

impl From<&Transaction> for TransactionDraft {
    fn from(transaction: &Transaction) -> Self {
        TransactionDraft {
            amount: transaction.amount,
            category: transaction.category.clone(),
            kind: transaction.kind.unwrap_or(EntryKind::Expense),
            description: transaction.description.clone(),
            date: transaction.date.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_record_id() {
        assert_eq!("42".parse::<RecordId>(), Ok(RecordId(42)));
        assert_eq!("  17 ".parse::<RecordId>(), Ok(RecordId(17)));
        assert_eq!("-3".parse::<RecordId>(), Ok(RecordId(-3)));

        // Leading integer wins, trailing garbage is ignored
        assert_eq!("12abc".parse::<RecordId>(), Ok(RecordId(12)));
        assert_eq!("7.9".parse::<RecordId>(), Ok(RecordId(7)));
    }

    #[test]
    fn test_parse_record_id_rejects_non_numbers() {
        assert!(matches!("".parse::<RecordId>(), Err(RecordIdError::NotANumber(_))));
        assert!(matches!("abc".parse::<RecordId>(), Err(RecordIdError::NotANumber(_))));
        assert!(matches!("-".parse::<RecordId>(), Err(RecordIdError::NotANumber(_))));
        assert!(matches!(
            "99999999999999999999".parse::<RecordId>(),
            Err(RecordIdError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_as_record_id_conversions() {
        assert_eq!(5_i32.as_record_id(), Ok(RecordId(5)));
        assert_eq!(5_u64.as_record_id(), Ok(RecordId(5)));
        assert_eq!(9.99_f64.as_record_id(), Ok(RecordId(9)));
        assert_eq!("8".as_record_id(), Ok(RecordId(8)));
        assert_eq!(String::from("11").as_record_id(), Ok(RecordId(11)));
        assert!(f64::NAN.as_record_id().is_err());
        assert!(u64::MAX.as_record_id().is_err());
    }

    #[test]
    fn test_entry_kind_round_trip_names() {
        assert_eq!("income".parse::<EntryKind>(), Ok(EntryKind::Income));
        assert_eq!(" Expense ".parse::<EntryKind>(), Ok(EntryKind::Expense));
        assert!("transfer".parse::<EntryKind>().is_err());
        assert_eq!(serde_json::to_value(EntryKind::Income).unwrap(), json!("income"));
    }

    #[test]
    fn test_records_tolerate_nulls_and_extra_fields() {
        let raw = json!({
            "Id": 3,
            "Name": null,
            "title_c": "Emergency fund",
            "target_amount_c": 1000.0,
            "current_amount_c": null,
            "deadline_c": "2024-12-31",
            "CreatedOn": "2024-01-01T00:00:00Z"
        });

        let goal: SavingsGoal = serde_json::from_value(raw).unwrap();
        assert_eq!(goal.id, RecordId(3));
        assert_eq!(goal.name, "");
        assert_eq!(goal.current_amount, 0.0);
        assert_eq!(goal.created_at, "");
    }

    #[test]
    fn test_draft_uses_wire_names() {
        let draft = BudgetDraft {
            name: None,
            category: "Food".to_string(),
            monthly_limit: 500.0,
            month: "2024-01".to_string(),
            year: 2024,
        };

        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(
            value,
            json!({
                "category_c": "Food",
                "monthly_limit_c": 500.0,
                "month_c": "2024-01",
                "year_c": 2024
            })
        );
    }

    #[test]
    fn test_lenient_fields_accept_form_values() {
        let raw = json!({
            "Id": 4,
            "Name": 2024,
            "name_c": "Gifts",
            "type_c": "Expense",
            "color_c": null,
            "is_custom_c": "true"
        });

        let category: Category = serde_json::from_value(raw).unwrap();
        assert_eq!(category.name, "2024");
        assert_eq!(category.kind, Some(EntryKind::Expense));
        assert_eq!(category.color, "");
        assert!(category.is_custom);

        let raw = json!({"Id": 5, "type_c": "", "amount_c": 3.5});
        let transaction: Transaction = serde_json::from_value(raw).unwrap();
        assert_eq!(transaction.kind, None);

        let raw = json!({"Id": 6, "type_c": "transfer", "is_custom_c": 0});
        let category: Category = serde_json::from_value(raw).unwrap();
        assert_eq!(category.kind, None);
        assert!(!category.is_custom);
    }
}
