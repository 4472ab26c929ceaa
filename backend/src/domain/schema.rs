//! # Record Schemas
//!
//! A [`RecordSchema`] describes one collection: its name, the fields a
//! repository selects, the default sort, and how each writable field is
//! filled on create and update. Write payloads are always built from the
//! schema, never sent as the caller handed them in, so every request carries
//! the same field set with the same types.
//!
//! ## Fill Rules
//!
//! - `Draft`: take the caller's value from the field's sources, coerced to the field kind
//! - `DraftOr(literal)`: as `Draft`, but an empty value falls back to the literal
//! - `Literal(literal)`: always send the literal
//! - `Now`: send the current UTC timestamp
//! - `Skip`: leave the field out of the request
//!
//! "Empty" follows loose truthiness: null, missing, `""`, `false` and `0`.

use chrono::{SecondsFormat, Utc};
use serde_json::{Number, Value};

use crate::storage::{FieldSelector, OrderBy, RecordData, SortDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Parsed as a float from numbers or numeric strings
    Decimal,
    /// Parsed as an integer; fractions are truncated
    Integer,
    Boolean,
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    Bool(bool),
    Number(f64),
    Text(&'static str),
}

impl Literal {
    fn to_value(self) -> Value {
        match self {
            Literal::Bool(b) => Value::Bool(b),
            Literal::Number(n) => Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null),
            Literal::Text(s) => Value::String(s.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    Draft,
    DraftOr(Literal),
    Literal(Literal),
    Now,
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Input keys consulted in order; empty means the field's own name
    pub sources: &'static [&'static str],
    pub on_create: Fill,
    pub on_update: Fill,
}

impl FieldSpec {
    const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            sources: &[],
            on_create: Fill::Draft,
            on_update: Fill::Draft,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub const fn decimal(name: &'static str) -> Self {
        Self::new(name, FieldKind::Decimal)
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub const fn timestamp(name: &'static str) -> Self {
        Self::new(name, FieldKind::Timestamp)
    }

    pub const fn sources(self, sources: &'static [&'static str]) -> Self {
        Self { sources, ..self }
    }

    /// Same rule for create and update
    pub const fn fill(self, fill: Fill) -> Self {
        Self {
            on_create: fill,
            on_update: fill,
            ..self
        }
    }

    pub const fn on_create(self, fill: Fill) -> Self {
        Self { on_create: fill, ..self }
    }

    pub const fn on_update(self, fill: Fill) -> Self {
        Self { on_update: fill, ..self }
    }

    fn rule(&self, mode: WriteMode) -> Fill {
        match mode {
            WriteMode::Create => self.on_create,
            WriteMode::Update => self.on_update,
        }
    }

    /// Raw input value: a single source is taken as is, several sources
    /// yield the first non-empty one
    fn pick(&self, data: &RecordData) -> Value {
        let own = [self.name];
        let sources: &[&str] = if self.sources.is_empty() { &own } else { self.sources };

        if let [only] = sources {
            return data.get(*only).cloned().unwrap_or(Value::Null);
        }

        sources
            .iter()
            .filter_map(|source| data.get(*source))
            .find(|value| is_truthy(value))
            .cloned()
            .unwrap_or(Value::Null)
    }

    fn coerce(&self, value: Value) -> Value {
        match self.kind {
            FieldKind::Decimal => parse_decimal(&value),
            FieldKind::Integer => parse_integer(&value),
            FieldKind::Text | FieldKind::Boolean | FieldKind::Timestamp => value,
        }
    }
}

/// Default sort of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: &'static str,
    pub direction: SortDirection,
}

#[derive(Debug, PartialEq)]
pub struct RecordSchema {
    pub collection: &'static str,
    /// Human readable entity name used in log lines
    pub label: &'static str,
    pub fields: &'static [FieldSpec],
    pub order: Option<SortKey>,
}

impl RecordSchema {
    /// Field list sent with every read
    pub fn selection(&self) -> Vec<FieldSelector> {
        self.fields.iter().map(|field| FieldSelector::new(field.name)).collect()
    }

    pub fn order_by(&self) -> Vec<OrderBy> {
        self.order
            .iter()
            .map(|key| OrderBy {
                field_name: key.field.to_string(),
                direction: key.direction,
            })
            .collect()
    }

    /// Build the write payload for `data`. Every field not skipped by its
    /// rule is present in the result, as `null` when nothing usable was given.
    pub fn write_fields(&self, data: &RecordData, mode: WriteMode, now: &str) -> RecordData {
        let mut record = RecordData::new();

        for field in self.fields {
            let value = match field.rule(mode) {
                Fill::Skip => continue,
                Fill::Now => Value::String(now.to_string()),
                Fill::Literal(literal) => literal.to_value(),
                Fill::Draft => field.coerce(field.pick(data)),
                Fill::DraftOr(fallback) => {
                    let picked = field.pick(data);
                    if is_truthy(&picked) {
                        field.coerce(picked)
                    } else {
                        field.coerce(fallback.to_value())
                    }
                }
            };
            record.insert(field.name.to_string(), value);
        }

        record
    }
}

/// Current UTC time as written to timestamp fields, e.g. `2024-01-31T09:15:00.123Z`
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Length of the longest numeric prefix of `s`: sign, digits, fraction, exponent
fn numeric_prefix_len(s: &str, allow_fraction: bool) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if !allow_fraction {
        return if digits == 0 { 0 } else { i };
    }

    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if digits > 0 || j > frac_start {
            digits += j - frac_start;
            i = j;
        }
    }
    if digits == 0 {
        return 0;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+') | Some(b'-')) {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    i
}

fn parse_decimal(value: &Value) -> Value {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim_start();
            let len = numeric_prefix_len(s, true);
            if len == 0 {
                None
            } else {
                s[..len].parse::<f64>().ok()
            }
        }
        _ => None,
    };

    parsed
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn parse_integer(value: &Value) -> Value {
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => {
            let s = s.trim_start();
            let len = numeric_prefix_len(s, false);
            if len == 0 {
                None
            } else {
                s[..len].parse::<i64>().ok()
            }
        }
        _ => None,
    };

    parsed.map(Value::from).unwrap_or(Value::Null)
}
