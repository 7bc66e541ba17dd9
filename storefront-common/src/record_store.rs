// storefront-common/src/record_store.rs
//! The record store seam the services talk to.
//!
//! Records are plain JSON objects keyed by column name, with the store-assigned
//! identifier under [`ID_FIELD`].

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;

use crate::error::StoreError;

pub type Record = Map<String, Value>;
pub type RecordId = i64;

pub const ID_FIELD: &str = "Id";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Field equals one of the values. Numbers compare numerically.
    EqualTo,
    /// Field text contains one of the values, ignoring case.
    Contains,
    /// Field text equals one of the values exactly.
    ExactMatch,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    pub values: Vec<Value>,
}

impl Condition {
    pub fn new(field: &str, operator: Operator, values: Vec<Value>) -> Self {
        Condition {
            field: field.to_string(),
            operator,
            values,
        }
    }

    /// Does `record` satisfy this condition? An empty value list matches nothing.
    pub fn matches(&self, record: &Record) -> bool {
        let field_value = record.get(&self.field).unwrap_or(&Value::Null);
        self.values.iter().any(|wanted| match self.operator {
            Operator::EqualTo => values_equal(field_value, wanted),
            Operator::Contains => match (field_value.as_str(), wanted.as_str()) {
                (Some(have), Some(want)) => have.to_lowercase().contains(&want.to_lowercase()),
                _ => false,
            },
            Operator::ExactMatch => match (field_value.as_str(), wanted.as_str()) {
                (Some(have), Some(want)) => have == want,
                _ => values_equal(field_value, wanted),
            },
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub limit: usize,
    pub offset: usize,
}

/// Replace the id held in `field` with the referenced record from `table`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Reference {
    pub field: String,
    pub table: String,
    /// Columns to keep from the referenced record; empty keeps all of them.
    #[serde(default)]
    pub fields: Vec<String>,
}

/// Query parameters for [`RecordStore::fetch_records`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct FetchParams {
    /// Columns to return besides `Id`; empty returns every column.
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub order_by: Vec<OrderBy>,
    #[serde(default)]
    pub paging: Option<Paging>,
    #[serde(default)]
    pub references: Vec<Reference>,
}

impl FetchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn order_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.order_by.push(OrderBy {
            field: field.to_string(),
            direction,
        });
        self
    }

    pub fn page(mut self, limit: usize, offset: usize) -> Self {
        self.paging = Some(Paging { limit, offset });
        self
    }

    pub fn expand(mut self, field: &str, table: &str, fields: &[&str]) -> Self {
        self.references.push(Reference {
            field: field.to_string(),
            table: table.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        });
        self
    }
}

/// Per-record result of a batch write.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RecordOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Record>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RecordOutcome {
    pub fn succeeded(data: Record) -> Self {
        RecordOutcome {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        RecordOutcome {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Storage backend for table-shaped records.
///
/// Implementations are shared between request handlers, so they must be
/// `Send + Sync`. Failures that concern a single record in a batch are
/// reported as failed [`RecordOutcome`]s; `Err` is reserved for the store
/// itself being unusable.
pub trait RecordStore: Send + Sync {
    fn fetch_records(&self, table: &str, params: &FetchParams) -> Result<Vec<Record>, StoreError>;

    fn get_record_by_id(
        &self,
        table: &str,
        id: RecordId,
        fields: &[String],
    ) -> Result<Option<Record>, StoreError>;

    /// Insert new records. The store assigns each one an `Id`.
    fn create_records(&self, table: &str, records: Vec<Record>) -> Result<Vec<RecordOutcome>, StoreError>;

    /// Merge the given columns into existing records, matched on `Id`.
    fn update_records(&self, table: &str, records: Vec<Record>) -> Result<Vec<RecordOutcome>, StoreError>;

    fn delete_records(&self, table: &str, ids: &[RecordId]) -> Result<Vec<RecordOutcome>, StoreError>;
}

pub fn record_id(record: &Record) -> Option<RecordId> {
    record.get(ID_FIELD).and_then(Value::as_i64)
}

/// Keep `Id` plus the listed columns. An empty list keeps everything.
pub fn project(record: &Record, fields: &[String]) -> Record {
    if fields.is_empty() {
        return record.clone();
    }
    record
        .iter()
        .filter(|(key, _)| key.as_str() == ID_FIELD || fields.iter().any(|f| f == *key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Ordering used for `OrderBy`: null < bool < number < string; other values tie.
/// Two strings that both parse as RFC 3339 compare as instants, whatever their offsets.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            _ => 4,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(_), Value::Number(_)) => {
            let x = a.as_f64().unwrap_or_default();
            let y = b.as_f64().unwrap_or_default();
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => {
            match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                (Ok(tx), Ok(ty)) => tx.cmp(&ty),
                _ => x.cmp(y),
            }
        }
        _ => rank(a).cmp(&rank(b)),
    }
}
