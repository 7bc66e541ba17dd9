// storefront-common/src/services/mod.rs
//! Data-access services. Each one wraps an injected [`RecordStore`], builds
//! the query or record payload, and reshapes store records into the models
//! in [`crate::models`].

mod cart;
mod product;
mod review;

pub use cart::CartService;
pub use product::ProductService;
pub use review::ReviewService;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::warn;

use crate::error::{ServiceError, ServiceResult};
use crate::record_store::{record_id, Record, RecordId, RecordOutcome};

// --- Record field readers ---

fn id_of(table: &str, record: &Record) -> ServiceResult<RecordId> {
    record_id(record).ok_or_else(|| ServiceError::malformed(table, "missing integer Id"))
}

fn text(record: &Record, field: &str) -> String {
    record.get(field).and_then(Value::as_str).unwrap_or_default().to_string()
}

fn optional_text(record: &Record, field: &str) -> Option<String> {
    record
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn integer(table: &str, record: &Record, field: &str) -> ServiceResult<i64> {
    record
        .get(field)
        .and_then(Value::as_i64)
        .ok_or_else(|| ServiceError::malformed(table, format!("field '{}' is not an integer", field)))
}

fn number(record: &Record, field: &str) -> Option<f64> {
    record.get(field).and_then(Value::as_f64)
}

fn flag(record: &Record, field: &str) -> bool {
    record.get(field).and_then(Value::as_bool).unwrap_or(false)
}

fn timestamp(table: &str, record: &Record, field: &str) -> ServiceResult<DateTime<Utc>> {
    let raw = record
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ServiceError::malformed(table, format!("field '{}' is missing", field)))?;
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| ServiceError::malformed(table, format!("field '{}': {}", field, e)))
}

/// Comma-joined list column. An empty or absent column is an empty list.
fn split_list(record: &Record, field: &str) -> Vec<String> {
    match record.get(field) {
        Some(Value::String(joined)) if !joined.is_empty() => {
            joined.split(',').map(str::to_string).collect()
        }
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn into_record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => Record::new(),
    }
}

fn join_list(items: &[String]) -> Value {
    Value::String(items.join(","))
}

fn now_rfc3339() -> Value {
    Value::String(Utc::now().to_rfc3339())
}

/// Split a batch write into its successful records, logging each failure.
/// Fails only when nothing in the batch succeeded.
fn successful_records(table: &str, action: &str, outcomes: Vec<RecordOutcome>) -> ServiceResult<Vec<Record>> {
    let (succeeded, failed): (Vec<_>, Vec<_>) = outcomes.into_iter().partition(|o| o.success);

    if !failed.is_empty() {
        let messages: Vec<String> = failed
            .iter()
            .map(|o| o.message.clone().unwrap_or_else(|| "unknown error".to_string()))
            .collect();
        warn!("Failed to {} {} records in '{}': {}", action, failed.len(), table, messages.join("; "));
        if succeeded.is_empty() {
            return Err(ServiceError::rejected(table, messages.join("; ")));
        }
    }

    Ok(succeeded.into_iter().filter_map(|o| o.data).collect())
}

fn first_successful(table: &str, action: &str, outcomes: Vec<RecordOutcome>) -> ServiceResult<Record> {
    successful_records(table, action, outcomes)?
        .into_iter()
        .next()
        .ok_or_else(|| ServiceError::rejected(table, format!("{} returned no records", action)))
}

/// True when every record in a delete batch went through.
fn all_deleted(table: &str, outcomes: &[RecordOutcome]) -> bool {
    let failed = outcomes.iter().filter(|o| !o.success).count();
    if failed > 0 {
        warn!("Failed to delete {} records in '{}'", failed, table);
    }
    failed == 0 && !outcomes.is_empty()
}
